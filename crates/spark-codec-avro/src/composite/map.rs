//! map：字符串键到同构值的映射。
//!
//! - 二进制：块式分帧，每个条目为 `(string 键, 值)`；键必须是合法 UTF-8；
//! - 文本：JSON 对象；
//! - 重复键按“后写覆盖”处理，二进制与文本一致。

use std::collections::BTreeMap;

use crate::composite::block;
use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::{binary, text};
use crate::sink::Sink;
use crate::tree::{CodecId, CodecTree, Composite};
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct MapCodec {
    values: CodecId,
}

impl MapCodec {
    pub(crate) fn new(values: CodecId) -> Self {
        Self { values }
    }

    pub(crate) fn values(&self) -> CodecId {
        self.values
    }
}

fn value_context(key: &str) -> String {
    format!("map value for key {key:?}")
}

impl Composite for MapCodec {
    fn binary_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let max_block_count = tree.options().max_block_count;
        let mut entries = BTreeMap::new();
        loop {
            let count = block::read_block_count(cursor, max_block_count)?;
            if count == 0 {
                return Ok(Value::Map(entries));
            }
            for _ in 0..count {
                let position = cursor.position();
                let raw = binary::decode_length_prefixed(cursor)?;
                let key = core::str::from_utf8(raw)
                    .map_err(|_| AvroError::InvalidMapKey { position })?
                    .to_owned();
                let value = tree
                    .binary_decode(self.values, cursor)
                    .map_err(|err| err.within(value_context(&key)))?;
                entries.insert(key, value);
            }
        }
    }

    fn binary_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let Value::Map(entries) = datum else {
            return Err(AvroError::mismatch("map", datum));
        };
        block::encode_blocks(
            out,
            entries.iter(),
            tree.options().max_block_count,
            |out, (key, value)| {
                binary::encode_length_prefixed(out, key.as_bytes());
                tree.binary_encode(self.values, out, value)
                    .map_err(|err| err.within(value_context(key)))
            },
        )
    }

    fn text_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        text::expect_byte(cursor, b'{')?;
        let mut entries = BTreeMap::new();
        if text::peek_significant(cursor)? == b'}' {
            cursor.advance(1);
            return Ok(Value::Map(entries));
        }
        loop {
            let key = text::decode_key(cursor)?;
            text::expect_byte(cursor, b':')?;
            let value = tree
                .text_decode(self.values, cursor)
                .map_err(|err| err.within(value_context(&key)))?;
            entries.insert(key, value);
            match text::peek_significant(cursor)? {
                b',' => cursor.advance(1),
                b'}' => {
                    cursor.advance(1);
                    return Ok(Value::Map(entries));
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

    fn text_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let Value::Map(entries) = datum else {
            return Err(AvroError::mismatch("map", datum));
        };
        out.push(b'{');
        for (index, (key, value)) in entries.iter().enumerate() {
            if index > 0 {
                out.push(b',');
            }
            text::encode_string(out, key);
            out.push(b':');
            tree.text_encode(self.values, out, value)
                .map_err(|err| err.within(value_context(key)))?;
        }
        out.push(b'}');
        Ok(())
    }
}
