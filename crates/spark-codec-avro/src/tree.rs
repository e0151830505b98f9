//! 编译产物：以下标寻址的编解码图。
//!
//! ## 教案目的（Why）
//! - schema 允许自引用（record 字段的类型就是 record 自身），若以 `Arc` 互相持有子编解码器，
//!   自引用会形成引用环并泄漏；改为把全部节点放入一个 `Vec`，子节点以 [`CodecId`] 下标引用，
//!   占位节点的“事后填充”对所有持有者天然可见；
//! - 类型集合是封闭的（8 种标量 + 6 种复合），用枚举 [`Kind`] 做分派，不需要开放的插件机制。
//!
//! ## 契约说明（What）
//! - 编译完成后整棵树只读，可被任意线程并发调用；
//! - [`CodecId`] 只由符号表分配，树内的下标永远有效；
//! - 复合类型实现 crate 内部 trait [`Composite`]，在调用子节点时把树本身传回，
//!   因而节点之间不需要任何共享可变状态；
//! - 四个分派入口每进入一个节点计一层，读端计在 [`Cursor`] 上，写端计在 [`Sink`] 上。

use crate::codec::SchemaKind;
use crate::composite::array::ArrayCodec;
use crate::composite::enumeration::EnumCodec;
use crate::composite::fixed::FixedCodec;
use crate::composite::map::MapCodec;
use crate::composite::record::RecordCodec;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::name::Name;
use crate::options::CodecOptions;
use crate::primitive::Primitive;
use crate::sink::Sink;
use crate::union::UnionCodec;
use crate::value::Value;

/// 编解码图中的节点下标。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CodecId(usize);

impl CodecId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// 一个已编译的类型：身份名称 + 行为。
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: Name,
    pub(crate) kind: Kind,
}

/// 节点行为的封闭集合。
#[derive(Debug)]
pub(crate) enum Kind {
    Primitive(Primitive),
    Array(ArrayCodec),
    Map(MapCodec),
    Enum(EnumCodec),
    Fixed(FixedCodec),
    Record(RecordCodec),
    Union(UnionCodec),
}

impl Kind {
    pub(crate) fn schema_kind(&self) -> SchemaKind {
        match self {
            Kind::Primitive(primitive) => match primitive {
                Primitive::Null => SchemaKind::Null,
                Primitive::Boolean => SchemaKind::Boolean,
                Primitive::Int => SchemaKind::Int,
                Primitive::Long => SchemaKind::Long,
                Primitive::Float => SchemaKind::Float,
                Primitive::Double => SchemaKind::Double,
                Primitive::Bytes => SchemaKind::Bytes,
                Primitive::String => SchemaKind::String,
            },
            Kind::Array(_) => SchemaKind::Array,
            Kind::Map(_) => SchemaKind::Map,
            Kind::Enum(_) => SchemaKind::Enum,
            Kind::Fixed(_) => SchemaKind::Fixed,
            Kind::Record(_) => SchemaKind::Record,
            Kind::Union(_) => SchemaKind::Union,
        }
    }

    fn behaviour(&self) -> Behaviour<'_> {
        match self {
            Kind::Primitive(primitive) => Behaviour::Scalar(*primitive),
            Kind::Array(codec) => Behaviour::Composite(codec),
            Kind::Map(codec) => Behaviour::Composite(codec),
            Kind::Enum(codec) => Behaviour::Composite(codec),
            Kind::Fixed(codec) => Behaviour::Composite(codec),
            Kind::Record(codec) => Behaviour::Composite(codec),
            Kind::Union(codec) => Behaviour::Composite(codec),
        }
    }
}

enum Behaviour<'a> {
    Scalar(Primitive),
    Composite(&'a dyn Composite),
}

/// 复合类型的四个编解码动作。
///
/// - **契约 (What)**：子节点一律经由 `tree` 调用；失败时不得吞掉子节点错误，
///   只允许以 [`crate::AvroError::within`] 追加上下文。
pub(crate) trait Composite {
    fn binary_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value>;
    fn binary_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()>;
    fn text_decode(&self, tree: &CodecTree, cursor: &mut Cursor<'_>) -> Result<Value>;
    fn text_encode(&self, tree: &CodecTree, out: &mut Sink<'_>, datum: &Value) -> Result<()>;
}

/// 编译完成、只读的编解码图。
#[derive(Debug)]
pub(crate) struct CodecTree {
    nodes: Vec<Node>,
    root: CodecId,
    options: CodecOptions,
}

impl CodecTree {
    pub(crate) fn new(nodes: Vec<Node>, root: CodecId, options: CodecOptions) -> Self {
        Self {
            nodes,
            root,
            options,
        }
    }

    pub(crate) fn root(&self) -> CodecId {
        self.root
    }

    pub(crate) fn options(&self) -> CodecOptions {
        self.options
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, id: CodecId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: CodecId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn name(&self, id: CodecId) -> &Name {
        &self.node(id).name
    }

    /// 该类型的任何值在二进制中都不占字节：`null`，或全部字段都如此的 record。
    pub(crate) fn is_zero_width(&self, id: CodecId) -> bool {
        let mut visiting = Vec::new();
        self.zero_width_within(id, &mut visiting)
    }

    // 正在展开的 record 按零宽处理：只经自身递归的字段不可能携带字节。
    fn zero_width_within(&self, id: CodecId, visiting: &mut Vec<CodecId>) -> bool {
        match &self.node(id).kind {
            Kind::Primitive(Primitive::Null) => true,
            Kind::Record(record) => {
                if visiting.contains(&id) {
                    return true;
                }
                visiting.push(id);
                let zero_width = record
                    .fields()
                    .iter()
                    .all(|field| self.zero_width_within(field.codec(), visiting));
                visiting.pop();
                zero_width
            }
            _ => false,
        }
    }

    pub(crate) fn binary_decode(&self, id: CodecId, cursor: &mut Cursor<'_>) -> Result<Value> {
        cursor.descend(self.options.max_nesting_depth)?;
        let decoded = match self.node(id).kind.behaviour() {
            Behaviour::Scalar(primitive) => primitive.binary_decode(cursor),
            Behaviour::Composite(composite) => composite.binary_decode(self, cursor),
        };
        cursor.ascend();
        decoded
    }

    pub(crate) fn binary_encode(
        &self,
        id: CodecId,
        out: &mut Sink<'_>,
        datum: &Value,
    ) -> Result<()> {
        out.descend(self.options.max_nesting_depth)?;
        let encoded = match self.node(id).kind.behaviour() {
            Behaviour::Scalar(primitive) => primitive.binary_encode(out, datum),
            Behaviour::Composite(composite) => composite.binary_encode(self, out, datum),
        };
        out.ascend();
        encoded
    }

    pub(crate) fn text_decode(&self, id: CodecId, cursor: &mut Cursor<'_>) -> Result<Value> {
        cursor.descend(self.options.max_nesting_depth)?;
        let decoded = match self.node(id).kind.behaviour() {
            Behaviour::Scalar(primitive) => primitive.text_decode(cursor),
            Behaviour::Composite(composite) => composite.text_decode(self, cursor),
        };
        cursor.ascend();
        decoded
    }

    pub(crate) fn text_encode(
        &self,
        id: CodecId,
        out: &mut Sink<'_>,
        datum: &Value,
    ) -> Result<()> {
        out.descend(self.options.max_nesting_depth)?;
        let encoded = match self.node(id).kind.behaviour() {
            Behaviour::Scalar(primitive) => primitive.text_encode(out, datum),
            Behaviour::Composite(composite) => composite.text_encode(self, out, datum),
        };
        out.ascend();
        encoded
    }
}
