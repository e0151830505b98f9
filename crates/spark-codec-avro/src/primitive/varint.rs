//! zig-zag 变长整数。
//!
//! ## 编码规则（What）
//! - `zz = (v << 1) ^ (v >> (bits - 1))`，把有符号数映射为无符号数，小绝对值得到小编码；
//! - 每字节承载 7 位，低位在前，除最后一字节外都置续位 `0x80`；
//! - int 最多 5 字节、long 最多 10 字节，末字节多出的高位必须为 0，否则判定 `Overflow`。
//!
//! int、long、集合块计数、union 分支下标与 bytes/string 长度前缀都使用这一格式。

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};

const INT_MAX_BYTES: usize = 5;
const LONG_MAX_BYTES: usize = 10;

/// 追加 zig-zag 编码的 32 位整数。
pub(crate) fn encode_int(out: &mut Vec<u8>, value: i32) {
    let zz = ((value << 1) ^ (value >> 31)) as u32;
    push_groups(out, u64::from(zz));
}

/// 追加 zig-zag 编码的 64 位整数。
pub(crate) fn encode_long(out: &mut Vec<u8>, value: i64) {
    let zz = ((value << 1) ^ (value >> 63)) as u64;
    push_groups(out, zz);
}

fn push_groups(out: &mut Vec<u8>, mut zz: u64) {
    while zz >= 0x80 {
        out.push((zz as u8 & 0x7f) | 0x80);
        zz >>= 7;
    }
    out.push(zz as u8);
}

/// 读取 zig-zag 编码的 32 位整数。
pub(crate) fn decode_int(cursor: &mut Cursor<'_>) -> Result<i32> {
    let zz = read_groups(cursor, INT_MAX_BYTES, 32)? as u32;
    Ok(((zz >> 1) as i32) ^ -((zz & 1) as i32))
}

/// 读取 zig-zag 编码的 64 位整数。
pub(crate) fn decode_long(cursor: &mut Cursor<'_>) -> Result<i64> {
    let zz = read_groups(cursor, LONG_MAX_BYTES, 64)?;
    Ok(((zz >> 1) as i64) ^ -((zz & 1) as i64))
}

/// 累积 7 位分组直到遇到续位为 0 的字节；失败时游标保持不动。
fn read_groups(cursor: &mut Cursor<'_>, max_bytes: usize, bits: u32) -> Result<u64> {
    let start = cursor.position();
    let mut probe = *cursor;
    let mut acc = 0u64;
    let last_group_bits = bits - 7 * (max_bytes as u32 - 1);

    for group in 0..max_bytes {
        let byte = probe.next_byte()?;
        let payload = u64::from(byte & 0x7f);
        if group == max_bytes - 1 && payload >> last_group_bits != 0 {
            return Err(AvroError::Overflow {
                position: start,
                bits,
            });
        }
        acc |= payload << (7 * group);
        if byte & 0x80 == 0 {
            *cursor = probe;
            return Ok(acc);
        }
    }
    Err(AvroError::Overflow {
        position: start,
        bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_bytes(value: i64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_long(&mut out, value);
        out
    }

    fn int_bytes(value: i32) -> Vec<u8> {
        let mut out = Vec::new();
        encode_int(&mut out, value);
        out
    }

    #[test]
    fn small_values_zig_zag() {
        assert_eq!(long_bytes(0), [0x00]);
        assert_eq!(long_bytes(-1), [0x01]);
        assert_eq!(long_bytes(1), [0x02]);
        assert_eq!(long_bytes(3), [0x06]);
        assert_eq!(long_bytes(-64), [0x7f]);
        assert_eq!(long_bytes(64), [0x80, 0x01]);
        assert_eq!(int_bytes(-65), [0x81, 0x01]);
    }

    #[test]
    fn extremes_use_full_width() {
        assert_eq!(int_bytes(i32::MIN), [0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(long_bytes(i64::MIN).len(), 10);

        for value in [i64::MIN, i64::MAX, 0, -1, 1 << 40] {
            let encoded = long_bytes(value);
            let mut cursor = Cursor::new(&encoded);
            assert_eq!(decode_long(&mut cursor).expect("decode"), value);
            assert_eq!(cursor.remaining(), 0);
        }
        for value in [i32::MIN, i32::MAX] {
            let encoded = int_bytes(value);
            let mut cursor = Cursor::new(&encoded);
            assert_eq!(decode_int(&mut cursor).expect("decode"), value);
        }
    }

    #[test]
    fn unterminated_varint_underflows_without_consuming() {
        let mut cursor = Cursor::new(&[0x80, 0x80]);
        let err = decode_long(&mut cursor).expect_err("no terminating byte");
        assert!(matches!(err, AvroError::BufferUnderflow { .. }));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn too_many_groups_overflow() {
        let mut cursor = Cursor::new(&[0xff; 11]);
        assert_eq!(
            decode_long(&mut cursor),
            Err(AvroError::Overflow {
                position: 0,
                bits: 64
            })
        );

        let mut cursor = Cursor::new(&[0x80, 0x80, 0x80, 0x80, 0x10]);
        assert_eq!(
            decode_int(&mut cursor),
            Err(AvroError::Overflow {
                position: 0,
                bits: 32
            })
        );
    }
}
