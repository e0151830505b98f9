//! 只读游标：二进制与文本解码共享的读位置。
//!
//! 解码器只借用调用方的切片并推进游标，失败时调用方的切片保持原样；
//! `position` 是相对切片起点的绝对偏移，错误文案据此定位；
//! `depth` 记录当前嵌套层数，随游标一起复制与提交。

use crate::error::{AvroError, Result};

/// 解码游标。
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// 尚未消费的剩余切片。
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// 偏移 `ahead` 处的字节，不推进游标。
    pub(crate) fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.buf.get(self.pos + ahead).copied()
    }

    pub(crate) fn next_byte(&mut self) -> Result<u8> {
        let byte = self.peek().ok_or_else(|| self.underflow(1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// 取出 `len` 字节；不足时返回 `BufferUnderflow` 且不推进。
    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.underflow(len));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    pub(crate) fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn advance(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.buf.len());
    }

    /// 进入一层嵌套；超过 `limit` 时返回 `NestingTooDeep`。
    pub(crate) fn descend(&mut self, limit: usize) -> Result<()> {
        if self.depth >= limit {
            return Err(AvroError::NestingTooDeep {
                position: self.pos,
                limit,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn underflow(&self, needed: usize) -> AvroError {
        AvroError::BufferUnderflow {
            position: self.pos,
            needed: needed.saturating_sub(self.remaining()),
            remaining: self.remaining(),
        }
    }
}
