//! 对外门面：[`Codec`]。
//!
//! ## 教案目的（Why）
//! - 调用方只需面对“构造一次、四个动作”的稳定契约，schema 编译、节点分派与错误包装全部隐藏在门面之后；
//! - 门面负责“失败不留痕”：解码失败时调用方的切片不会被消费，编码失败时输出缓冲回滚到调用前的长度。
//!
//! ## 契约说明（What）
//! - [`Codec::new`] 接受裸标量类型名（如 `long`）或 JSON 文档；
//! - 解码返回 `(值, 剩余切片)`，剩余切片借用自输入；
//! - 编码以追加方式写入调用方提供的 `Vec<u8>`；
//! - `Codec` 满足 `Clone + Send + Sync`，克隆只增加引用计数，可在线程间自由共享。

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value as Json;
use tracing::trace;

use crate::compiler;
use crate::cursor::Cursor;
use crate::error::{AvroError, Result};
use crate::name::Name;
use crate::options::CodecOptions;
use crate::primitive::Primitive;
use crate::sink::Sink;
use crate::tree::CodecTree;
use crate::value::Value;

/// 根类型的种类。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// `null`
    Null,
    /// `boolean`
    Boolean,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `array`
    Array,
    /// `map`
    Map,
    /// `enum`
    Enum,
    /// `fixed`
    Fixed,
    /// `record`
    Record,
    /// union
    Union,
}

/// 由 schema 编译得到的编解码器。
///
/// # 教案式说明
/// - **意图 (Why)**：把 schema 的解析成本一次性前置到构造阶段，热路径上只剩节点分派；
/// - **契约 (What)**：
///   - 构造失败只返回 [`AvroError::Schema`]（配置非法时返回 [`AvroError::InvalidConfiguration`]）；
///   - 四个编解码方法互不影响，可被多个线程同时调用；
/// - **风险 (Trade-offs)**：编译产物整体放在一个 `Arc` 中，内存随 schema 规模线性增长，
///   同一 schema 应复用同一个 `Codec` 而不是反复编译。
#[derive(Clone, Debug)]
pub struct Codec {
    tree: Arc<CodecTree>,
}

impl Codec {
    /// 以默认选项编译 schema 文本。
    pub fn new(schema: &str) -> Result<Self> {
        Self::with_options(schema, CodecOptions::default())
    }

    /// 以指定选项编译 schema 文本。
    ///
    /// 文本恰好是某个标量类型名时直接使用，否则必须是 JSON 文档。
    pub fn with_options(schema: &str, options: CodecOptions) -> Result<Self> {
        if Primitive::from_type_name(schema).is_some() {
            return Self::from_json_with_options(&Json::String(schema.to_owned()), options);
        }
        let parsed: Json = serde_json::from_str(schema).map_err(|err| AvroError::Schema {
            path: "<root>".to_owned(),
            source: Box::new(AvroError::definition(format!(
                "cannot unmarshal JSON: {err}"
            ))),
        })?;
        Self::from_json_with_options(&parsed, options)
    }

    /// 以默认选项编译已解析的 JSON schema。
    pub fn from_json(schema: &Json) -> Result<Self> {
        Self::from_json_with_options(schema, CodecOptions::default())
    }

    /// 以指定选项编译已解析的 JSON schema。
    pub fn from_json_with_options(schema: &Json, options: CodecOptions) -> Result<Self> {
        options.validate()?;
        let tree = compiler::compile(schema, options)?;
        Ok(Self {
            tree: Arc::new(tree),
        })
    }

    /// 根类型的名称；array / map / union 为同名的内置名称。
    pub fn type_name(&self) -> &Name {
        self.tree.name(self.tree.root())
    }

    /// 根类型的种类。
    pub fn schema_kind(&self) -> SchemaKind {
        self.tree.node(self.tree.root()).kind.schema_kind()
    }

    /// 编译时生效的选项。
    pub fn options(&self) -> CodecOptions {
        self.tree.options()
    }

    /// 从二进制切片解码一个值，返回值与剩余切片。
    pub fn binary_decode<'a>(&self, buf: &'a [u8]) -> Result<(Value, &'a [u8])> {
        let mut cursor = Cursor::new(buf);
        self.tree
            .binary_decode(self.tree.root(), &mut cursor)
            .map(|value| (value, cursor.rest()))
            .inspect_err(|err| trace!(operation = "binary_decode", error = %err, "decode failed"))
    }

    /// 把值的二进制编码追加到 `buf`；失败时 `buf` 保持调用前的内容。
    pub fn binary_encode(&self, buf: &mut Vec<u8>, datum: &Value) -> Result<()> {
        let start = buf.len();
        let encoded = self.tree.binary_encode(self.tree.root(), &mut Sink::new(buf), datum);
        encoded.inspect_err(|err| {
            buf.truncate(start);
            trace!(operation = "binary_encode", error = %err, "encode failed");
        })
    }

    /// 从 JSON 文本切片解码一个值，返回值与剩余切片。
    pub fn text_decode<'a>(&self, buf: &'a [u8]) -> Result<(Value, &'a [u8])> {
        let mut cursor = Cursor::new(buf);
        self.tree
            .text_decode(self.tree.root(), &mut cursor)
            .map(|value| (value, cursor.rest()))
            .inspect_err(|err| trace!(operation = "text_decode", error = %err, "decode failed"))
    }

    /// 把值的 JSON 文本编码追加到 `buf`；失败时 `buf` 保持调用前的内容。
    pub fn text_encode(&self, buf: &mut Vec<u8>, datum: &Value) -> Result<()> {
        let start = buf.len();
        let encoded = self.tree.text_encode(self.tree.root(), &mut Sink::new(buf), datum);
        encoded.inspect_err(|err| {
            buf.truncate(start);
            trace!(operation = "text_encode", error = %err, "encode failed");
        })
    }

    /// 二进制编码并冻结为只读的 [`Bytes`]，便于直接交给传输层。
    pub fn encode_to_bytes(&self, datum: &Value) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.binary_encode(&mut buf, datum)?;
        Ok(Bytes::from(buf))
    }
}
