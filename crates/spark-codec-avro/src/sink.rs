//! 写出端：编码器共享的输出缓冲与嵌套深度。
//!
//! 与 [`crate::cursor::Cursor`] 成对出现：解码在游标上计层，编码在这里计层，
//! 两侧对同一个值经过的节点数相同，上限因而对编码与解码一致生效。
//! 字节写入直接落在借用的 `Vec<u8>` 上，标量编码器经由 `DerefMut` 拿到它。

use core::ops::{Deref, DerefMut};

use crate::error::{AvroError, Result};

/// 编码输出。
#[derive(Debug)]
pub(crate) struct Sink<'a> {
    buf: &'a mut Vec<u8>,
    depth: usize,
}

impl<'a> Sink<'a> {
    pub(crate) fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf, depth: 0 }
    }

    /// 进入一层嵌套；超过 `limit` 时返回 `NestingTooDeep`，`position` 为已写出的字节数。
    pub(crate) fn descend(&mut self, limit: usize) -> Result<()> {
        if self.depth >= limit {
            return Err(AvroError::NestingTooDeep {
                position: self.buf.len(),
                limit,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Deref for Sink<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        self.buf
    }
}

impl DerefMut for Sink<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        self.buf
    }
}
