//! array 与 map 共用的块式分帧。
//!
//! ## 编码格式（What）
//! - 一组 `(count, items...)` 块，以 `count == 0` 结束；
//! - `count < 0` 时取绝对值，其后紧跟一个 long 形式的块字节数，本解码器只前向读取，读出后丢弃；
//! - 块计数的绝对值超过上限立即拒绝，此时尚未读取块字节数，也不做任何预分配。
//!
//! ## 编码策略（How）
//! - 编码从不输出负计数形式，每块最多 `max_block_count` 个元素，并总以零计数块收尾。

use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::varint;
use crate::sink::Sink;

/// 读取下一个块头，返回元素个数；返回 0 表示集合结束。
pub(crate) fn read_block_count(cursor: &mut Cursor<'_>, max_block_count: u64) -> Result<usize> {
    let position = cursor.position();
    let count = varint::decode_long(cursor)?;
    let magnitude = count.unsigned_abs();
    if magnitude > max_block_count {
        return Err(AvroError::BlockCountTooLarge {
            position,
            count: magnitude,
            max: max_block_count,
        });
    }
    if count < 0 {
        // 块字节数只服务于跳读。
        varint::decode_long(cursor)?;
    }
    usize::try_from(magnitude).map_err(|_| AvroError::BlockCountTooLarge {
        position,
        count: magnitude,
        max: max_block_count,
    })
}

/// 预分配容量：计数来自不可信输入，按剩余字节数封顶。
pub(crate) fn capacity_hint(count: usize, cursor: &Cursor<'_>) -> usize {
    count.min(cursor.remaining())
}

/// 把 `items` 切块写出。
pub(crate) fn encode_blocks<I, F>(
    out: &mut Sink<'_>,
    items: I,
    max_block_count: u64,
    mut encode_item: F,
) -> Result<()>
where
    I: ExactSizeIterator,
    F: FnMut(&mut Sink<'_>, I::Item) -> Result<()>,
{
    let per_block = usize::try_from(max_block_count).unwrap_or(usize::MAX);
    let mut remaining = items.len();
    let mut items = items;
    while remaining > 0 {
        let count = remaining.min(per_block);
        // count 不超过已校验的 max_block_count（≤ i64::MAX），转换无损。
        varint::encode_long(out, count as i64);
        for item in items.by_ref().take(count) {
            encode_item(out, item)?;
        }
        remaining -= count;
    }
    varint::encode_long(out, 0);
    Ok(())
}
