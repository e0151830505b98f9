//! enum：有序符号表，二进制载荷为 int 下标。

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::{text, varint};
use crate::sink::Sink;
use crate::tree::{CodecTree, Composite};
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct EnumCodec {
    type_name: String,
    symbols: Vec<String>,
}

impl EnumCodec {
    pub(crate) fn new(type_name: String, symbols: Vec<String>) -> Self {
        Self { type_name, symbols }
    }

    pub(crate) fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn index_of(&self, datum: &Value) -> Result<usize> {
        let symbol = datum
            .as_str()
            .ok_or_else(|| AvroError::mismatch("string", datum))?;
        self.symbols
            .iter()
            .position(|candidate| candidate == symbol)
            .ok_or_else(|| AvroError::UnknownSymbol {
                type_name: self.type_name.clone(),
                symbol: symbol.to_owned(),
            })
    }
}

impl Composite for EnumCodec {
    fn binary_decode(&self, _tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let mut probe = *cursor;
        let index = varint::decode_int(&mut probe)?;
        let symbol = usize::try_from(index)
            .ok()
            .and_then(|index| self.symbols.get(index))
            .ok_or_else(|| AvroError::IndexOutOfRange {
                type_name: self.type_name.clone(),
                index: i64::from(index),
                len: self.symbols.len(),
            })?;
        *cursor = probe;
        Ok(Value::String(symbol.clone()))
    }

    fn binary_encode(&self, _tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let index = self.index_of(datum)?;
        // 符号数量来自 schema 中的 JSON 数组，远小于 i32::MAX。
        varint::encode_int(out, index as i32);
        Ok(())
    }

    fn text_decode(&self, _tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let mut probe = *cursor;
        let position = probe.position();
        let datum = text::decode_string(&mut probe)?;
        if !matches!(datum, Value::String(_)) {
            return Err(text::malformed(position, "enum symbol ought to be UTF-8"));
        }
        self.index_of(&datum)?;
        *cursor = probe;
        Ok(datum)
    }

    fn text_encode(&self, _tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let index = self.index_of(datum)?;
        text::encode_string(out, &self.symbols[index]);
        Ok(())
    }
}
