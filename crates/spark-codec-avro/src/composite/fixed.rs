//! fixed：恰好 `size` 字节，没有长度前缀。

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::text;
use crate::sink::Sink;
use crate::tree::{CodecTree, Composite};
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct FixedCodec {
    type_name: String,
    size: usize,
}

impl FixedCodec {
    pub(crate) fn new(type_name: String, size: usize) -> Self {
        Self { type_name, size }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    fn check_size(&self, actual: usize) -> Result<()> {
        if actual == self.size {
            Ok(())
        } else {
            Err(AvroError::SizeMismatch {
                type_name: self.type_name.clone(),
                expected: self.size,
                actual,
            })
        }
    }

    fn payload<'v>(&self, datum: &'v Value) -> Result<&'v [u8]> {
        let raw = datum
            .as_raw_bytes()
            .ok_or_else(|| AvroError::mismatch("fixed", datum))?;
        self.check_size(raw.len())?;
        Ok(raw)
    }
}

impl Composite for FixedCodec {
    fn binary_decode(&self, _tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        Ok(Value::Bytes(cursor.take(self.size)?.to_vec()))
    }

    fn binary_encode(&self, _tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        out.extend_from_slice(self.payload(datum)?);
        Ok(())
    }

    fn text_decode(&self, _tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let mut probe = *cursor;
        let raw = text::decode_bytes(&mut probe)?;
        self.check_size(raw.len())?;
        *cursor = probe;
        Ok(Value::Bytes(raw))
    }

    fn text_encode(&self, _tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        text::encode_bytes(out, self.payload(datum)?);
        Ok(())
    }
}
