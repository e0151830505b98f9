//! 编解码器配置。
//!
//! ## 教案目的（Why）
//! - 集合类型的块计数来自不可信输入，必须有上限才能约束内存分配；上限以配置项暴露，
//!   调用方可以按部署环境在内存安全与吞吐之间取舍；
//! - 配置结构派生 `serde`，宿主可直接从 TOML/JSON 配置文件加载，无需手写转换。
//!
//! ## 契约说明（What）
//! - 默认上限为 [`MAX_BLOCK_COUNT`]（`i32::MAX`）；
//! - 默认嵌套层数上限为 [`MAX_NESTING_DEPTH`]，编码与解码按相同规则计层，编码接受的值必然可以解码；
//! - 元素不占字节的 array（如 `array<null>`）不受输入长度约束，所有块合计的元素数以
//!   [`MAX_ZERO_WIDTH_ITEMS`] 为默认上限；
//! - 任一上限为 0 时 [`CodecOptions::validate`] 返回 `InvalidConfiguration`；
//! - 同一棵编解码树内的所有 array/map 共享同一个上限：编码按其分块，解码超限即拒绝。

use serde::{Deserialize, Serialize};

use crate::error::{AvroError, Result};

/// 单个集合块允许的最大元素数。
pub const MAX_BLOCK_COUNT: u64 = i32::MAX as u64;

/// 元素不占字节的 array 合计允许的最大元素数。
pub const MAX_ZERO_WIDTH_ITEMS: u64 = 1 << 20;

/// 编解码时允许的最大嵌套层数，每进入一个节点（含标量）计一层。
pub const MAX_NESTING_DEPTH: usize = 512;

/// 编译 schema 时生效的选项。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// 单块元素数上限，解码超限返回 `BlockCountTooLarge`，编码按此值切块。
    pub max_block_count: u64,
    /// 嵌套层数上限，编码与解码均返回 `NestingTooDeep`；自引用 schema 配合恶意输入时用于约束递归深度。
    pub max_nesting_depth: usize,
    /// 元素不占字节的 array 所有块合计的元素数上限，四个方向均返回 `TooManyItems`。
    pub max_zero_width_items: u64,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_block_count: MAX_BLOCK_COUNT,
            max_nesting_depth: MAX_NESTING_DEPTH,
            max_zero_width_items: MAX_ZERO_WIDTH_ITEMS,
        }
    }
}

impl CodecOptions {
    /// 替换块计数上限。
    #[must_use]
    pub fn with_max_block_count(mut self, max_block_count: u64) -> Self {
        self.max_block_count = max_block_count;
        self
    }

    /// 替换嵌套层数上限。
    #[must_use]
    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    /// 替换零宽元素总数上限。
    #[must_use]
    pub fn with_max_zero_width_items(mut self, max_zero_width_items: u64) -> Self {
        self.max_zero_width_items = max_zero_width_items;
        self
    }

    /// 校验配置取值。
    pub fn validate(&self) -> Result<()> {
        if self.max_block_count == 0 {
            return Err(AvroError::InvalidConfiguration {
                detail: "max_block_count ought to be greater than zero".into(),
            });
        }
        if self.max_block_count > i64::MAX as u64 {
            return Err(AvroError::InvalidConfiguration {
                detail: format!(
                    "max_block_count ought to fit the long block count: {}",
                    self.max_block_count
                ),
            });
        }
        if self.max_nesting_depth == 0 {
            return Err(AvroError::InvalidConfiguration {
                detail: "max_nesting_depth ought to be greater than zero".into(),
            });
        }
        if self.max_zero_width_items == 0 {
            return Err(AvroError::InvalidConfiguration {
                detail: "max_zero_width_items ought to be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_int_ceiling() {
        let options = CodecOptions::default();
        assert_eq!(options.max_block_count, 2_147_483_647);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        let err = CodecOptions::default()
            .with_max_block_count(0)
            .validate()
            .expect_err("zero ceiling");
        assert!(matches!(err, AvroError::InvalidConfiguration { .. }));

        let err = CodecOptions::default()
            .with_max_nesting_depth(0)
            .validate()
            .expect_err("zero depth");
        assert!(err.to_string().contains("max_nesting_depth"));

        let err = CodecOptions::default()
            .with_max_zero_width_items(0)
            .validate()
            .expect_err("zero item cap");
        assert!(err.to_string().contains("max_zero_width_items"));
    }

    #[test]
    fn loads_from_toml_and_json() {
        let from_toml: CodecOptions = toml::from_str("max_block_count = 8").expect("toml");
        assert_eq!(from_toml.max_block_count, 8);
        assert_eq!(from_toml.max_nesting_depth, MAX_NESTING_DEPTH);
        assert_eq!(from_toml.max_zero_width_items, MAX_ZERO_WIDTH_ITEMS);

        let from_json: CodecOptions = serde_json::from_str("{}").expect("json");
        assert_eq!(from_json, CodecOptions::default());

        let unknown = serde_json::from_str::<CodecOptions>(r#"{"max_blocks": 1}"#);
        assert!(unknown.is_err());
    }
}
