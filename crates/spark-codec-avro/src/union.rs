//! union：按名称标签选择成员。
//!
//! ## 教案目的（Why）
//! - map 与 record 都接受键值集合，int 与 double 都接受数字，单凭数据形态无法唯一确定成员；
//!   因此成员选择**只**依据调用方给出的名称标签，从不做结构推断。
//!
//! ## 契约说明（What）
//! - 编码：裸 `Null` 选中名为 `null` 的成员；`{全名: 值}` 选中同名成员；其余一律 `NoMatchingMember`；
//! - 二进制：先写 long 形式的成员下标，再写成员载荷；解码时下标越界返回 `IndexOutOfRange`；
//! - 文本：null 写作 `null`，其余写作 `{"全名":值}`；
//! - 解码结果：null 成员返回裸 `Null`，其余包装为单键 `Map`；
//! - 数值转换由成员自身的编码器完成（见 [`crate::numeric`]），union 只负责选择成员。

use std::collections::HashMap;

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::{text, varint};
use crate::sink::Sink;
use crate::tree::{CodecId, CodecTree, Composite};
use crate::value::Value;

const NULL_MEMBER: &str = "null";

#[derive(Debug)]
pub(crate) struct UnionCodec {
    members: Vec<CodecId>,
    allowed: Vec<String>,
    index_by_name: HashMap<String, usize>,
}

impl UnionCodec {
    /// `names[i]` 是 `members[i]` 的全名，调用方保证两两不同。
    pub(crate) fn new(members: Vec<CodecId>, names: Vec<String>) -> Self {
        let index_by_name = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();
        Self {
            members,
            allowed: names,
            index_by_name,
        }
    }

    pub(crate) fn members(&self) -> &[CodecId] {
        &self.members
    }

    fn no_match(&self, received: impl Into<String>) -> AvroError {
        AvroError::NoMatchingMember {
            allowed: self.allowed.clone(),
            received: received.into(),
        }
    }

    fn member_index(&self, name: &str) -> Result<usize> {
        self.index_by_name
            .get(name)
            .copied()
            .ok_or_else(|| self.no_match(name))
    }

    /// 解析名称标签，返回成员下标与待编码的内层值。
    fn select<'v>(&self, datum: &'v Value) -> Result<(usize, &'v Value)> {
        match datum {
            Value::Null => Ok((self.member_index(NULL_MEMBER)?, datum)),
            Value::Map(tagged) if tagged.len() == 1 => {
                let Some((name, inner)) = tagged.iter().next() else {
                    return Err(self.no_match("map"));
                };
                Ok((self.member_index(name)?, inner))
            }
            other => Err(self.no_match(other.kind_label())),
        }
    }

    fn member_context(&self, index: usize) -> String {
        format!("union member {:?}", self.allowed[index])
    }

    fn wrap(&self, index: usize, value: Value) -> Value {
        Value::union(self.allowed[index].clone(), value)
    }
}

impl Composite for UnionCodec {
    fn binary_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let mut probe = *cursor;
        let branch = varint::decode_long(&mut probe)?;
        let index = usize::try_from(branch)
            .ok()
            .filter(|index| *index < self.members.len())
            .ok_or_else(|| AvroError::IndexOutOfRange {
                type_name: "union".to_owned(),
                index: branch,
                len: self.members.len(),
            })?;
        let value = tree
            .binary_decode(self.members[index], &mut probe)
            .map_err(|err| err.within(self.member_context(index)))?;
        *cursor = probe;
        Ok(self.wrap(index, value))
    }

    fn binary_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let (index, inner) = self.select(datum)?;
        // 成员数量来自 schema 中的 JSON 数组，转换无损。
        varint::encode_long(out, index as i64);
        tree.binary_encode(self.members[index], out, inner)
            .map_err(|err| err.within(self.member_context(index)))
    }

    fn text_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let mut probe = *cursor;
        if text::peek_significant(&mut probe)? == b'n' {
            let index = self.member_index(NULL_MEMBER)?;
            text::decode_null(&mut probe)?;
            *cursor = probe;
            return Ok(self.wrap(index, Value::Null));
        }
        text::expect_byte(&mut probe, b'{')?;
        let name = text::decode_key(&mut probe)?;
        let index = self.member_index(&name)?;
        text::expect_byte(&mut probe, b':')?;
        let value = tree
            .text_decode(self.members[index], &mut probe)
            .map_err(|err| err.within(self.member_context(index)))?;
        text::expect_byte(&mut probe, b'}')?;
        *cursor = probe;
        Ok(self.wrap(index, value))
    }

    fn text_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let (index, inner) = self.select(datum)?;
        if datum == &Value::Null {
            out.extend_from_slice(b"null");
            return Ok(());
        }
        out.push(b'{');
        text::encode_string(out, &self.allowed[index]);
        out.push(b':');
        tree.text_encode(self.members[index], out, inner)
            .map_err(|err| err.within(self.member_context(index)))?;
        out.push(b'}');
        Ok(())
    }
}
