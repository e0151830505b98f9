//! 复合类型：array、map、enum、fixed、record。
//!
//! 每个编解码器只持有子节点的 [`crate::tree::CodecId`]，行为通过
//! [`crate::tree::Composite`] 暴露；union 因涉及成员选择与数值转换，单独放在 [`crate::union`]。

pub(crate) mod array;
pub(crate) mod block;
pub(crate) mod enumeration;
pub(crate) mod fixed;
pub(crate) mod map;
pub(crate) mod record;
