//! 错误类型模块。
//!
//! ## 模块目的（Why）
//! - 将 schema 编译、二进制编解码与 JSON 文本编解码阶段的全部失败收敛到一个枚举 [`AvroError`]，
//!   调用方可以通过模式匹配区分“schema 写错了”“输入被截断了”“数据不符合 schema”等情形。
//! - 统一错误展示文案：所有变体都携带类型名、字段名、下标或字节偏移等上下文，无需调试器即可定位。
//!
//! ## 使用契约（What）
//! - `Codec::new` 系列只返回 [`AvroError::Schema`]，其 `source` 为具体失败原因；
//! - 编解码失败返回叶子变体，复合类型会在外层包裹 [`AvroError::Context`] 记录路径；
//! - [`AvroError::root_cause`] 剥离上述两类包装层，便于按分类断言。
//!
//! ## 风险提示（Trade-offs）
//! - 上下文使用 `String` 保存，错误路径上会产生少量分配；成功路径不受影响。

use thiserror::Error;

use crate::value::Value;

/// crate 内统一的返回类型别名。
pub type Result<T, E = AvroError> = core::result::Result<T, E>;

/// Avro 编解码器的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：对齐 schema 编译期与数据期两类失败，使上层容器格式或网络层可以直接 `?` 传播；
/// - **契约 (What)**：
///   - 所有变体均为 `Send + Sync + 'static`，可跨线程传递；
///   - `position` 字段一律是相对于调用方传入缓冲起点的绝对字节偏移；
///   - 解码失败时调用方的缓冲不会被消费，错误即全部结果，不存在“半个值”。
/// - **设计权衡 (Trade-offs)**：`Schema`/`Context` 两个包装变体让错误链更长，但换来了路径化的诊断文案。
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AvroError {
    /// schema 编译失败的外层包装，`path` 描述失败位置。
    #[error("invalid schema at {path}: {source}")]
    Schema {
        path: String,
        source: Box<AvroError>,
    },

    /// schema 结构不合法（缺少 `items`、`size` 非正数等）。
    #[error("{detail}")]
    InvalidDefinition { detail: String },

    /// 引用了未定义的类型名。
    #[error("unknown type name: {name:?}")]
    UnknownType { name: String },

    /// 名称或命名空间违反标识符规则。
    #[error("schema name {reason}")]
    InvalidName { reason: String },

    /// union 成员的全名重复。
    #[error("union item {index} ought to be unique type: {name:?}")]
    DuplicateUnionMember { index: usize, name: String },

    /// 同一个全名被注册了两次。
    #[error("named type {name:?} ought to be defined only once")]
    DuplicateType { name: String },

    /// 解码时输入耗尽。
    #[error(
        "buffer underflow at byte {position}: need {needed} more byte(s), {remaining} remaining"
    )]
    BufferUnderflow {
        position: usize,
        needed: usize,
        remaining: usize,
    },

    /// 变长整数超出目标位宽。
    #[error("variable-length integer at byte {position} overflows {bits}-bit range")]
    Overflow { position: usize, bits: u32 },

    /// 编解码嵌套层数超过上限；`position` 为解码的读位置或编码已写出的字节数。
    #[error("nesting at byte {position} exceeds depth limit {limit}")]
    NestingTooDeep { position: usize, limit: usize },

    /// 集合块计数超过安全上限。
    #[error("block count {count} at byte {position} exceeds MaxBlockCount {max}")]
    BlockCountTooLarge { position: usize, count: u64, max: u64 },

    /// 元素不占字节的 array 合计元素数超过上限。
    #[error("array of zero-width items at byte {position} holds {count} items, more than {max}")]
    TooManyItems {
        position: usize,
        count: usize,
        max: u64,
    },

    /// 枚举下标或 union 分支下标越界。
    #[error("cannot decode {type_name:?}: index {index} ought to be in [0, {len})")]
    IndexOutOfRange {
        type_name: String,
        index: i64,
        len: usize,
    },

    /// fixed 数据长度与声明不符。
    #[error("{type_name:?}: datum size ought to equal schema size: {actual} != {expected}")]
    SizeMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    /// 记录缺少字段且无法回退到默认值。
    #[error("record {record:?} field value for {field:?} was not specified")]
    MissingField { record: String, field: String },

    /// 文本解码时字段数量与声明不一致。
    #[error("cannot read record {record:?}: only found {found} of {expected} fields")]
    FieldCountMismatch {
        record: String,
        found: usize,
        expected: usize,
    },

    /// 文本解码遇到未声明的字段。
    #[error("cannot read record {record:?}: invalid record field name: {field:?}")]
    UnknownField { record: String, field: String },

    /// 枚举值不在符号表中。
    #[error("cannot encode enum {type_name:?}: value ought to be member of symbols: {symbol:?}")]
    UnknownSymbol { type_name: String, symbol: String },

    /// union 找不到与名称标签对应的成员。
    #[error("no member schema types support datum: allowed types: {allowed:?}; received: {received}")]
    NoMatchingMember {
        allowed: Vec<String>,
        received: String,
    },

    /// 数值转换无法精确表示。
    #[error("converting {value} to {target} would lose precision")]
    PrecisionLoss { target: &'static str, value: String },

    /// JSON 字符串中的 UTF-16 代理对不完整。
    #[error("invalid surrogate at byte {position}: {detail}")]
    InvalidSurrogate { position: usize, detail: String },

    /// JSON 文本语法错误。
    #[error("malformed text at byte {position}: {detail}")]
    MalformedText { position: usize, detail: String },

    /// 交给编码器的数据形态与 schema 不符。
    #[error("expected: {expected}; received: {received}")]
    TypeMismatch {
        expected: &'static str,
        received: &'static str,
    },

    /// bytes/string 的长度前缀为负数。
    #[error("negative length {length} at byte {position}")]
    NegativeLength { position: usize, length: i64 },

    /// 二进制 map 的键不是合法 UTF-8。
    #[error("map key at byte {position} is not valid UTF-8")]
    InvalidMapKey { position: usize },

    /// `CodecOptions` 取值非法。
    #[error("invalid codec options: {detail}")]
    InvalidConfiguration { detail: String },

    /// 复合类型附加的诊断路径。
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<AvroError>,
    },
}

impl AvroError {
    /// 构造 schema 结构错误。
    pub(crate) fn definition(detail: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            detail: detail.into(),
        }
    }

    /// 构造数据形态错误，`received` 取自数据本身的种类。
    pub(crate) fn mismatch(expected: &'static str, received: &Value) -> Self {
        Self::TypeMismatch {
            expected,
            received: received.kind_label(),
        }
    }

    /// 为错误附加一层诊断上下文。
    ///
    /// - **契约 (What)**：不改变 [`root_cause`](Self::root_cause) 的结果，只影响展示文案。
    #[must_use]
    pub fn within(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// 剥离 `Schema` 与 `Context` 包装层，返回最内层的分类错误。
    pub fn root_cause(&self) -> &AvroError {
        let mut current = self;
        loop {
            match current {
                Self::Schema { source, .. } | Self::Context { source, .. } => current = source,
                other => return other,
            }
        }
    }

    /// 判断是否为编译期错误。
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}
