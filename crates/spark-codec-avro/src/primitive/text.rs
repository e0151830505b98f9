//! JSON 文本形式的标量词法。
//!
//! ## 教案目的（Why）
//! - 文本编码是 JSON 兼容的：复合类型只负责结构符号，数字、字符串、字面量的读写都汇聚到这里；
//! - bytes 与 string 的转义规则不同，必须在同一处并排实现，才不会在两条路径上出现细微分歧。
//!
//! ## 契约说明（What）
//! - 八个标准转义（`"`、`\`、`/`、`\b`、`\f`、`\n`、`\r`、`\t`）总是转义；
//! - 可打印 ASCII（0x20..=0x7E）原样输出；
//! - bytes 的其余字节逐个写成 `\u00XX`，绝不合并成多字节码点；
//! - string 的其余码点写成 `\uXXXX`，BMP 之外写成 UTF-16 代理对；
//! - 数字：NaN 写作 `null`，±Infinity 写作 `1e999` / `-1e999`，负零写作 `0`；
//! - 解码会先跳过前导空白；输入在结构中途结束时返回 `BufferUnderflow`，语法错误返回 `MalformedText`。
//!
//! ## 风险提示（Trade-offs）
//! - 数字词法比 RFC 8259 宽松（例如接受 `.5`），但所有合法 JSON 数字都会被正确解析。

use core::fmt::Display;
use core::num::FpCategory;

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::binary::string_or_raw;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// 正无穷的文本哨兵。
pub const POSITIVE_INFINITY: &str = "1e999";
/// 负无穷的文本哨兵。
pub const NEGATIVE_INFINITY: &str = "-1e999";

fn skip_whitespace(cursor: &mut Cursor<'_>) {
    while matches!(cursor.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
        cursor.advance(1);
    }
}

pub(crate) fn malformed(position: usize, detail: impl Into<String>) -> AvroError {
    AvroError::MalformedText {
        position,
        detail: detail.into(),
    }
}

/// 跳过空白后消费一个结构符号。
pub(crate) fn expect_byte(cursor: &mut Cursor<'_>, expected: u8) -> Result<()> {
    skip_whitespace(cursor);
    match cursor.peek() {
        None => Err(cursor.underflow(1)),
        Some(found) if found == expected => {
            cursor.advance(1);
            Ok(())
        }
        Some(found) => Err(malformed(
            cursor.position(),
            format!(
                "expected: {:?}; received: {:?}",
                expected as char, found as char
            ),
        )),
    }
}

/// 跳过空白后查看下一个字节。
pub(crate) fn peek_significant(cursor: &mut Cursor<'_>) -> Result<u8> {
    skip_whitespace(cursor);
    cursor.peek().ok_or_else(|| cursor.underflow(1))
}

/// 消费一个关键字（`null`、`true`、`false`）。
pub(crate) fn expect_literal(cursor: &mut Cursor<'_>, literal: &'static str) -> Result<()> {
    skip_whitespace(cursor);
    let position = cursor.position();
    let rest = cursor.rest();
    let wanted = literal.as_bytes();
    if rest.len() < wanted.len() {
        if wanted.starts_with(rest) {
            return Err(cursor.underflow(wanted.len()));
        }
        return Err(malformed(position, format!("expected: {literal}")));
    }
    if &rest[..wanted.len()] != wanted {
        return Err(malformed(position, format!("expected: {literal}")));
    }
    cursor.advance(wanted.len());
    ensure_delimited(cursor)
}

/// 字面量与数字之后只允许出现空白或结构符号。
fn ensure_delimited(cursor: &Cursor<'_>) -> Result<()> {
    match cursor.peek() {
        None | Some(b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' | b'}' | b']') => Ok(()),
        Some(found) => Err(malformed(
            cursor.position(),
            format!("unexpected byte: {:?}", found as char),
        )),
    }
}

// ==== null / boolean ====

pub(crate) fn decode_null(cursor: &mut Cursor<'_>) -> Result<()> {
    expect_literal(cursor, "null")
}

pub(crate) fn encode_boolean(out: &mut Vec<u8>, flag: bool) {
    out.extend_from_slice(if flag { b"true" } else { b"false" });
}

pub(crate) fn decode_boolean(cursor: &mut Cursor<'_>) -> Result<bool> {
    match peek_significant(cursor)? {
        b't' => expect_literal(cursor, "true").map(|_| true),
        b'f' => expect_literal(cursor, "false").map(|_| false),
        found => Err(malformed(
            cursor.position(),
            format!("expected boolean; received: {:?}", found as char),
        )),
    }
}

// ==== numbers ====

/// 读取一个数字词元，返回其文本与起始偏移。
fn number_token<'a>(cursor: &mut Cursor<'a>) -> Result<(&'a str, usize)> {
    skip_whitespace(cursor);
    let position = cursor.position();
    let rest = cursor.rest();
    let len = rest
        .iter()
        .take_while(|b| matches!(b, b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9'))
        .count();
    if len == 0 {
        return match rest.first() {
            None => Err(cursor.underflow(1)),
            Some(found) => Err(malformed(
                position,
                format!("unexpected byte: {:?}", *found as char),
            )),
        };
    }
    let complete = rest[len - 1].is_ascii_digit();
    if !complete && len == rest.len() {
        return Err(cursor.underflow(len + 1));
    }
    let token = core::str::from_utf8(&rest[..len])
        .map_err(|_| malformed(position, "number ought to be ASCII"))?;
    let mut probe = *cursor;
    probe.advance(len);
    ensure_delimited(&probe)?;
    *cursor = probe;
    Ok((token, position))
}

pub(crate) fn encode_integer(out: &mut Vec<u8>, value: i64) {
    out.extend_from_slice(value.to_string().as_bytes());
}

pub(crate) fn decode_int(cursor: &mut Cursor<'_>) -> Result<i32> {
    let mut probe = *cursor;
    let (token, position) = number_token(&mut probe)?;
    let value = token
        .parse::<i32>()
        .map_err(|err| malformed(position, format!("cannot parse int {token:?}: {err}")))?;
    *cursor = probe;
    Ok(value)
}

pub(crate) fn decode_long(cursor: &mut Cursor<'_>) -> Result<i64> {
    let mut probe = *cursor;
    let (token, position) = number_token(&mut probe)?;
    let value = token
        .parse::<i64>()
        .map_err(|err| malformed(position, format!("cannot parse long {token:?}: {err}")))?;
    *cursor = probe;
    Ok(value)
}

/// 写出浮点数；有限非零值以该宽度下的最短十进制表示输出。
fn encode_floating(out: &mut Vec<u8>, category: FpCategory, negative: bool, value: impl Display) {
    match category {
        FpCategory::Nan => out.extend_from_slice(b"null"),
        FpCategory::Infinite if negative => out.extend_from_slice(NEGATIVE_INFINITY.as_bytes()),
        FpCategory::Infinite => out.extend_from_slice(POSITIVE_INFINITY.as_bytes()),
        FpCategory::Zero => out.push(b'0'),
        FpCategory::Normal | FpCategory::Subnormal => {
            out.extend_from_slice(value.to_string().as_bytes());
        }
    }
}

pub(crate) fn encode_float(out: &mut Vec<u8>, value: f32) {
    encode_floating(out, value.classify(), value.is_sign_negative(), value);
}

pub(crate) fn encode_double(out: &mut Vec<u8>, value: f64) {
    encode_floating(out, value.classify(), value.is_sign_negative(), value);
}

pub(crate) fn decode_float(cursor: &mut Cursor<'_>) -> Result<f32> {
    if peek_significant(cursor)? == b'n' {
        return decode_null(cursor).map(|_| f32::NAN);
    }
    let mut probe = *cursor;
    let (token, position) = number_token(&mut probe)?;
    let value = token
        .parse::<f32>()
        .map_err(|err| malformed(position, format!("cannot parse float {token:?}: {err}")))?;
    *cursor = probe;
    Ok(value)
}

pub(crate) fn decode_double(cursor: &mut Cursor<'_>) -> Result<f64> {
    if peek_significant(cursor)? == b'n' {
        return decode_null(cursor).map(|_| f64::NAN);
    }
    let mut probe = *cursor;
    let (token, position) = number_token(&mut probe)?;
    let value = token
        .parse::<f64>()
        .map_err(|err| malformed(position, format!("cannot parse double {token:?}: {err}")))?;
    *cursor = probe;
    Ok(value)
}

// ==== strings & bytes ====

fn escape_special(byte: u8) -> Option<&'static [u8]> {
    Some(match byte {
        b'"' => b"\\\"",
        b'\\' => b"\\\\",
        b'/' => b"\\/",
        0x08 => b"\\b",
        0x0c => b"\\f",
        b'\n' => b"\\n",
        b'\r' => b"\\r",
        b'\t' => b"\\t",
        _ => return None,
    })
}

fn unescape_special(byte: u8) -> Option<u8> {
    Some(match byte {
        b'"' | b'\\' | b'/' => byte,
        b'b' => 0x08,
        b'f' => 0x0c,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        _ => return None,
    })
}

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

fn push_unicode_hex(out: &mut Vec<u8>, unit: u16) {
    out.extend_from_slice(b"\\u");
    for shift in [12u16, 8, 4, 0] {
        out.push(HEX_DIGITS[usize::from((unit >> shift) & 0xf)]);
    }
}

/// 以 bytes 规则写出 JSON 字符串。
pub(crate) fn encode_bytes(out: &mut Vec<u8>, raw: &[u8]) {
    out.push(b'"');
    for &byte in raw {
        if let Some(escaped) = escape_special(byte) {
            out.extend_from_slice(escaped);
        } else if is_printable(byte) {
            out.push(byte);
        } else {
            push_unicode_hex(out, u16::from(byte));
        }
    }
    out.push(b'"');
}

/// 以 string 规则写出 JSON 字符串。
pub(crate) fn encode_string(out: &mut Vec<u8>, text: &str) {
    out.push(b'"');
    push_escaped(out, text);
    out.push(b'"');
}

/// 写出解码时保留为原始字节的 string：合法片段照常转义，非法字节原样写出，
/// 再次解码得到逐字节相同的内容。
pub(crate) fn encode_raw_string(out: &mut Vec<u8>, raw: &[u8]) {
    out.push(b'"');
    for chunk in raw.utf8_chunks() {
        push_escaped(out, chunk.valid());
        out.extend_from_slice(chunk.invalid());
    }
    out.push(b'"');
}

fn push_escaped(out: &mut Vec<u8>, text: &str) {
    let mut units = [0u16; 2];
    for ch in text.chars() {
        if ch.is_ascii() {
            let byte = ch as u8;
            if let Some(escaped) = escape_special(byte) {
                out.extend_from_slice(escaped);
                continue;
            }
            if is_printable(byte) {
                out.push(byte);
                continue;
            }
        }
        for unit in ch.encode_utf16(&mut units) {
            push_unicode_hex(out, *unit);
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Escapes {
    /// `\uXXXX` 表示完整码点，支持代理对。
    Unicode,
    /// `\u00XX` 表示单个字节。
    Bytes,
}

fn read_hex4(cursor: &mut Cursor<'_>) -> Result<u16> {
    let position = cursor.position();
    let digits = cursor.take(4)?;
    let mut unit = 0u16;
    for &digit in digits {
        let nibble = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            b'A'..=b'F' => digit - b'A' + 10,
            _ => {
                return Err(malformed(
                    position,
                    format!("invalid hexadecimal digit: {:?}", digit as char),
                ));
            }
        };
        unit = (unit << 4) | u16::from(nibble);
    }
    Ok(unit)
}

fn decode_quoted(cursor: &mut Cursor<'_>, escapes: Escapes) -> Result<Vec<u8>> {
    skip_whitespace(cursor);
    let mut probe = *cursor;
    let start = probe.position();
    if probe.remaining() < 2 {
        return Err(probe.underflow(2));
    }
    let opening = probe.next_byte()?;
    if opening != b'"' {
        return Err(malformed(
            start,
            format!("expected initial \"; found: {:?}", opening as char),
        ));
    }

    let mut out = Vec::new();
    loop {
        let Some(byte) = probe.peek() else {
            return Err(malformed(probe.position(), "expected final \""));
        };
        let escape_position = probe.position();
        probe.advance(1);
        match byte {
            b'"' => {
                *cursor = probe;
                return Ok(out);
            }
            b'\\' => {
                let code = probe.next_byte()?;
                if let Some(unescaped) = unescape_special(code) {
                    out.push(unescaped);
                    continue;
                }
                if code != b'u' {
                    return Err(malformed(
                        escape_position,
                        format!("invalid escape sequence: \\{}", code as char),
                    ));
                }
                let unit = read_hex4(&mut probe)?;
                match escapes {
                    Escapes::Bytes => {
                        let byte = u8::try_from(unit).map_err(|_| {
                            malformed(escape_position, "bytes escape ought to be \\u00XX")
                        })?;
                        out.push(byte);
                    }
                    Escapes::Unicode => {
                        let ch = decode_code_unit(&mut probe, unit, escape_position)?;
                        let mut utf8 = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                    }
                }
            }
            other => out.push(other),
        }
    }
}

/// 把 `\uXXXX` 还原为码点；高代理必须紧跟一个合法的低代理。
fn decode_code_unit(cursor: &mut Cursor<'_>, unit: u16, position: usize) -> Result<char> {
    let surrogate = |detail: &str| AvroError::InvalidSurrogate {
        position,
        detail: detail.to_owned(),
    };
    let code = match unit {
        0xd800..=0xdbff => {
            if cursor.peek() != Some(b'\\') || cursor.peek_at(1) != Some(b'u') {
                return Err(surrogate("missing second half of surrogate pair"));
            }
            cursor.advance(2);
            let low = read_hex4(cursor)?;
            if !(0xdc00..=0xdfff).contains(&low) {
                return Err(surrogate("second half of surrogate pair ought to be in DC00-DFFF"));
            }
            0x10000 + ((u32::from(unit) - 0xd800) << 10) + (u32::from(low) - 0xdc00)
        }
        0xdc00..=0xdfff => return Err(surrogate("unpaired low surrogate")),
        other => u32::from(other),
    };
    char::from_u32(code).ok_or_else(|| surrogate("code point out of range"))
}

/// 读取 bytes 规则的 JSON 字符串。
pub(crate) fn decode_bytes(cursor: &mut Cursor<'_>) -> Result<Vec<u8>> {
    decode_quoted(cursor, Escapes::Bytes)
}

/// 读取 string 规则的 JSON 字符串；非 UTF-8 内容以 `Bytes` 原样返回。
pub(crate) fn decode_string(cursor: &mut Cursor<'_>) -> Result<crate::value::Value> {
    decode_quoted(cursor, Escapes::Unicode).map(string_or_raw)
}

/// 读取对象键，键必须是合法 UTF-8。
pub(crate) fn decode_key(cursor: &mut Cursor<'_>) -> Result<String> {
    let position = cursor.position();
    let raw = decode_quoted(cursor, Escapes::Unicode)?;
    String::from_utf8(raw).map_err(|_| malformed(position, "object key ought to be UTF-8"))
}
