//! 八种标量类型的编解码。
//!
//! [`Primitive`] 把“哪一种标量”与四个编解码动作绑定在一起，复合类型只通过
//! [`crate::tree::CodecTree`] 间接调用这里，从不感知具体的字节布局。

pub(crate) mod binary;
pub(crate) mod text;
pub(crate) mod varint;

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::numeric;
use crate::value::Value;

/// 标量类型。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Primitive {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl Primitive {
    /// 符号表的种子顺序。
    pub(crate) const ALL: [Primitive; 8] = [
        Primitive::Null,
        Primitive::Boolean,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::Bytes,
        Primitive::String,
    ];

    pub(crate) fn type_name(self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Boolean => "boolean",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Bytes => "bytes",
            Primitive::String => "string",
        }
    }

    pub(crate) fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.type_name() == name)
    }

    pub(crate) fn binary_decode(self, cursor: &mut Cursor<'_>) -> Result<Value> {
        match self {
            Primitive::Null => Ok(Value::Null),
            Primitive::Boolean => binary::decode_boolean(cursor),
            Primitive::Int => varint::decode_int(cursor).map(Value::Int),
            Primitive::Long => varint::decode_long(cursor).map(Value::Long),
            Primitive::Float => binary::decode_float(cursor),
            Primitive::Double => binary::decode_double(cursor),
            Primitive::Bytes => binary::decode_bytes(cursor),
            Primitive::String => binary::decode_string(cursor),
        }
    }

    pub(crate) fn binary_encode(self, out: &mut Vec<u8>, datum: &Value) -> Result<()> {
        match self {
            Primitive::Null => binary::encode_null(out, datum),
            Primitive::Boolean => binary::encode_boolean(out, datum),
            Primitive::Int => binary::encode_int(out, datum),
            Primitive::Long => binary::encode_long(out, datum),
            Primitive::Float => binary::encode_float(out, datum),
            Primitive::Double => binary::encode_double(out, datum),
            Primitive::Bytes => binary::encode_bytes(out, datum, "bytes"),
            Primitive::String => binary::encode_bytes(out, datum, "string"),
        }
    }

    pub(crate) fn text_decode(self, cursor: &mut Cursor<'_>) -> Result<Value> {
        match self {
            Primitive::Null => text::decode_null(cursor).map(|_| Value::Null),
            Primitive::Boolean => text::decode_boolean(cursor).map(Value::Boolean),
            Primitive::Int => text::decode_int(cursor).map(Value::Int),
            Primitive::Long => text::decode_long(cursor).map(Value::Long),
            Primitive::Float => text::decode_float(cursor).map(Value::Float),
            Primitive::Double => text::decode_double(cursor).map(Value::Double),
            Primitive::Bytes => text::decode_bytes(cursor).map(Value::Bytes),
            Primitive::String => text::decode_string(cursor),
        }
    }

    pub(crate) fn text_encode(self, out: &mut Vec<u8>, datum: &Value) -> Result<()> {
        match self {
            Primitive::Null => match datum {
                Value::Null => {
                    out.extend_from_slice(b"null");
                    Ok(())
                }
                other => Err(AvroError::mismatch("null", other)),
            },
            Primitive::Boolean => match datum {
                Value::Boolean(flag) => {
                    text::encode_boolean(out, *flag);
                    Ok(())
                }
                other => Err(AvroError::mismatch("boolean", other)),
            },
            Primitive::Int => {
                text::encode_integer(out, i64::from(numeric::to_int(datum)?));
                Ok(())
            }
            Primitive::Long => {
                text::encode_integer(out, numeric::to_long(datum)?);
                Ok(())
            }
            Primitive::Float => {
                text::encode_float(out, numeric::to_float(datum)?);
                Ok(())
            }
            Primitive::Double => {
                text::encode_double(out, numeric::to_double(datum)?);
                Ok(())
            }
            Primitive::Bytes => {
                let raw = datum
                    .as_raw_bytes()
                    .ok_or_else(|| AvroError::mismatch("bytes", datum))?;
                text::encode_bytes(out, raw);
                Ok(())
            }
            Primitive::String => match datum {
                Value::String(content) => {
                    text::encode_string(out, content);
                    Ok(())
                }
                Value::Bytes(raw) => {
                    text::encode_raw_string(out, raw);
                    Ok(())
                }
                other => Err(AvroError::mismatch("string", other)),
            },
        }
    }
}
