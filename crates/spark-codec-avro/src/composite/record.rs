//! record：按声明顺序排列的字段序列。
//!
//! # 教案式说明
//! - **契约 (What)**：
//!   - 二进制编解码严格按声明顺序逐字段处理，与调用方 `Map` 的迭代顺序无关；
//!   - 编码时缺失的字段先回退到 schema 的 `default`，没有默认值时以 `Null` 试探字段编码器
//!     （可空 union 因此自然取 null 分支），试探失败即 `MissingField`；
//!   - 文本解码接受任意字段顺序，但每个声明字段必须恰好出现一次：缺失或重复返回 `FieldCountMismatch`，
//!     未声明的键返回 `UnknownField`。
//! - **风险 (Trade-offs)**：调用方 `Map` 中多余的键在编码时被忽略，不视为错误。

use std::collections::BTreeMap;

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::text;
use crate::sink::Sink;
use crate::tree::{CodecId, CodecTree, Composite};
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct RecordField {
    name: String,
    codec: CodecId,
    default: Option<Value>,
}

impl RecordField {
    pub(crate) fn new(name: String, codec: CodecId) -> Self {
        Self {
            name,
            codec,
            default: None,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn codec(&self) -> CodecId {
        self.codec
    }

    pub(crate) fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

#[derive(Debug)]
pub(crate) struct RecordCodec {
    type_name: String,
    fields: Vec<RecordField>,
}

impl RecordCodec {
    pub(crate) fn new(type_name: String, fields: Vec<RecordField>) -> Self {
        Self { type_name, fields }
    }

    pub(crate) fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub(crate) fn set_default(&mut self, field: usize, value: Value) {
        if let Some(field) = self.fields.get_mut(field) {
            field.default = Some(value);
        }
    }

    fn field_context(&self, field: &RecordField) -> String {
        format!("record {:?} field {:?}", self.type_name, field.name)
    }

    /// `found` 为已读到的不同字段数。
    fn count_mismatch(&self, found: usize) -> AvroError {
        AvroError::FieldCountMismatch {
            record: self.type_name.clone(),
            found,
            expected: self.fields.len(),
        }
    }

    fn fields_of<'v>(&self, datum: &'v Value) -> Result<&'v BTreeMap<String, Value>> {
        datum
            .as_map()
            .ok_or_else(|| AvroError::mismatch("record", datum))
    }

    /// 为单个字段挑选要编码的值并交给 `encode`。
    fn encode_field<F>(
        &self,
        tree: &CodecTree,
        out: &mut Sink<'_>,
        field: &RecordField,
        supplied: Option<&Value>,
        encode: F,
    ) -> Result<()>
    where
        F: Fn(&CodecTree, CodecId, &mut Sink<'_>, &Value) -> Result<()>,
    {
        match supplied.or(field.default.as_ref()) {
            Some(value) => encode(tree, field.codec, out, value)
                .map_err(|err| err.within(self.field_context(field))),
            None => encode(tree, field.codec, out, &Value::Null).map_err(|_| {
                AvroError::MissingField {
                    record: self.type_name.clone(),
                    field: field.name.clone(),
                }
            }),
        }
    }
}

impl Composite for RecordCodec {
    fn binary_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let mut values = BTreeMap::new();
        for field in &self.fields {
            let value = tree
                .binary_decode(field.codec, cursor)
                .map_err(|err| err.within(self.field_context(field)))?;
            values.insert(field.name.clone(), value);
        }
        Ok(Value::Map(values))
    }

    fn binary_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let supplied = self.fields_of(datum)?;
        for field in &self.fields {
            self.encode_field(
                tree,
                out,
                field,
                supplied.get(&field.name),
                CodecTree::binary_encode,
            )?;
        }
        Ok(())
    }

    fn text_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        text::expect_byte(cursor, b'{')?;
        let mut values = BTreeMap::new();
        if text::peek_significant(cursor)? == b'}' {
            cursor.advance(1);
        } else {
            loop {
                let key = text::decode_key(cursor)?;
                let Some(field) = self.fields.iter().find(|field| field.name == key) else {
                    return Err(AvroError::UnknownField {
                        record: self.type_name.clone(),
                        field: key,
                    });
                };
                if values.contains_key(&key) {
                    return Err(self.count_mismatch(values.len()));
                }
                text::expect_byte(cursor, b':')?;
                let value = tree
                    .text_decode(field.codec, cursor)
                    .map_err(|err| err.within(self.field_context(field)))?;
                values.insert(key, value);
                match text::peek_significant(cursor)? {
                    b',' => cursor.advance(1),
                    b'}' => {
                        cursor.advance(1);
                        break;
                    }
                    found => {
                        return Err(text::malformed(
                            cursor.position(),
                            format!("expected: ',' or '}}'; received: {:?}", found as char),
                        ));
                    }
                }
            }
        }
        if values.len() != self.fields.len() {
            return Err(self.count_mismatch(values.len()));
        }
        Ok(Value::Map(values))
    }

    fn text_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let supplied = self.fields_of(datum)?;
        out.push(b'{');
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                out.push(b',');
            }
            text::encode_string(out, &field.name);
            out.push(b':');
            self.encode_field(
                tree,
                out,
                field,
                supplied.get(&field.name),
                CodecTree::text_encode,
            )?;
        }
        out.push(b'}');
        Ok(())
    }
}
