//! array：块式分帧的同构序列。
//!
//! 元素不占字节时（如 `array<null>`），几个字节的块头就能声明任意多个元素；
//! 这类 array 在四个方向上都受 `max_zero_width_items` 约束。

use crate::composite::block;
use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::primitive::text;
use crate::sink::Sink;
use crate::tree::{CodecId, CodecTree, Composite};
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct ArrayCodec {
    items: CodecId,
    zero_width: bool,
}

impl ArrayCodec {
    pub(crate) fn new(items: CodecId) -> Self {
        Self {
            items,
            zero_width: false,
        }
    }

    pub(crate) fn items(&self) -> CodecId {
        self.items
    }

    pub(crate) fn mark_zero_width(&mut self) {
        self.zero_width = true;
    }

    fn check_total(&self, tree: &CodecTree, position: usize, count: usize) -> Result<()> {
        let max = tree.options().max_zero_width_items;
        if self.zero_width && count as u64 > max {
            return Err(AvroError::TooManyItems {
                position,
                count,
                max,
            });
        }
        Ok(())
    }
}

fn item_context(index: usize) -> String {
    format!("array item {index}")
}

impl Composite for ArrayCodec {
    fn binary_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        let max_block_count = tree.options().max_block_count;
        let mut items = Vec::new();
        loop {
            let position = cursor.position();
            let count = block::read_block_count(cursor, max_block_count)?;
            if count == 0 {
                return Ok(Value::Array(items));
            }
            self.check_total(tree, position, items.len().saturating_add(count))?;
            items.reserve(block::capacity_hint(count, cursor));
            for _ in 0..count {
                let item = tree
                    .binary_decode(self.items, cursor)
                    .map_err(|err| err.within(item_context(items.len())))?;
                items.push(item);
            }
        }
    }

    fn binary_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let Value::Array(items) = datum else {
            return Err(AvroError::mismatch("array", datum));
        };
        self.check_total(tree, out.len(), items.len())?;
        block::encode_blocks(
            out,
            items.iter().enumerate(),
            tree.options().max_block_count,
            |out, (index, item)| {
                tree.binary_encode(self.items, out, item)
                    .map_err(|err| err.within(item_context(index)))
            },
        )
    }

    fn text_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value> {
        text::expect_byte(cursor, b'[')?;
        let mut items = Vec::new();
        if text::peek_significant(cursor)? == b']' {
            cursor.advance(1);
            return Ok(Value::Array(items));
        }
        loop {
            self.check_total(tree, cursor.position(), items.len() + 1)?;
            let item = tree
                .text_decode(self.items, cursor)
                .map_err(|err| err.within(item_context(items.len())))?;
            items.push(item);
            match text::peek_significant(cursor)? {
                b',' => cursor.advance(1),
                b']' => {
                    cursor.advance(1);
                    return Ok(Value::Array(items));
                }
                found => {
                    return Err(text::malformed(
                        cursor.position(),
                        format!("expected: ',' or ']'; received: {:?}", found as char),
                    ));
                }
            }
        }
    }

    fn text_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()> {
        let Value::Array(items) = datum else {
            return Err(AvroError::mismatch("array", datum));
        };
        self.check_total(tree, out.len(), items.len())?;
        out.push(b'[');
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                out.push(b',');
            }
            tree.text_encode(self.items, out, item)
                .map_err(|err| err.within(item_context(index)))?;
        }
        out.push(b']');
        Ok(())
    }
}
