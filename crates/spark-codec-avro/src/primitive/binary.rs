//! 标量类型的二进制编码。
//!
//! - boolean：单字节，写出时严格为 0/1，读入时任意非零视为 true；
//! - float/double：4/8 字节小端 IEEE-754，位模式原样保留（含 NaN 载荷与负零）；
//! - bytes/string：long 长度前缀 + 原始字节，string 不做 UTF-8 拒绝。

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::numeric;
use crate::primitive::varint;
use crate::value::Value;

pub(crate) fn encode_null(_out: &mut Vec<u8>, datum: &Value) -> Result<()> {
    match datum {
        Value::Null => Ok(()),
        other => Err(AvroError::mismatch("null", other)),
    }
}

pub(crate) fn encode_boolean(out: &mut Vec<u8>, datum: &Value) -> Result<()> {
    match datum {
        Value::Boolean(flag) => {
            out.push(u8::from(*flag));
            Ok(())
        }
        other => Err(AvroError::mismatch("boolean", other)),
    }
}

pub(crate) fn decode_boolean(cursor: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Boolean(cursor.next_byte()? != 0))
}

pub(crate) fn encode_int(out: &mut Vec<u8>, datum: &Value) -> Result<()> {
    varint::encode_int(out, numeric::to_int(datum)?);
    Ok(())
}

pub(crate) fn encode_long(out: &mut Vec<u8>, datum: &Value) -> Result<()> {
    varint::encode_long(out, numeric::to_long(datum)?);
    Ok(())
}

pub(crate) fn encode_float(out: &mut Vec<u8>, datum: &Value) -> Result<()> {
    out.extend_from_slice(&numeric::to_float(datum)?.to_le_bytes());
    Ok(())
}

pub(crate) fn decode_float(cursor: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Float(f32::from_le_bytes(cursor.take_array()?)))
}

pub(crate) fn encode_double(out: &mut Vec<u8>, datum: &Value) -> Result<()> {
    out.extend_from_slice(&numeric::to_double(datum)?.to_le_bytes());
    Ok(())
}

pub(crate) fn decode_double(cursor: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Double(f64::from_le_bytes(cursor.take_array()?)))
}

/// bytes 与 string 共用：接受 `Bytes` 或 `String`。
pub(crate) fn encode_bytes(out: &mut Vec<u8>, datum: &Value, expected: &'static str) -> Result<()> {
    let raw = datum
        .as_raw_bytes()
        .ok_or_else(|| AvroError::mismatch(expected, datum))?;
    encode_length_prefixed(out, raw);
    Ok(())
}

pub(crate) fn encode_length_prefixed(out: &mut Vec<u8>, raw: &[u8]) {
    // 切片长度不会超过 isize::MAX，转换为 i64 无损。
    varint::encode_long(out, raw.len() as i64);
    out.extend_from_slice(raw);
}

/// 读取长度前缀与载荷；失败时游标保持不动。
pub(crate) fn decode_length_prefixed<'a>(cursor: &mut Cursor<'a>) -> Result<&'a [u8]> {
    let mut probe = *cursor;
    let position = probe.position();
    let length = varint::decode_long(&mut probe)?;
    if length < 0 {
        return Err(AvroError::NegativeLength { position, length });
    }
    let length = usize::try_from(length).map_err(|_| probe.underflow(usize::MAX))?;
    let payload = probe.take(length)?;
    *cursor = probe;
    Ok(payload)
}

pub(crate) fn decode_bytes(cursor: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Bytes(decode_length_prefixed(cursor)?.to_vec()))
}

pub(crate) fn decode_string(cursor: &mut Cursor<'_>) -> Result<Value> {
    Ok(string_or_raw(decode_length_prefixed(cursor)?.to_vec()))
}

/// 合法 UTF-8 转为 `String`，否则原样保留为 `Bytes`。
pub(crate) fn string_or_raw(raw: Vec<u8>) -> Value {
    match String::from_utf8(raw) {
        Ok(text) => Value::String(text),
        Err(err) => Value::Bytes(err.into_bytes()),
    }
}
