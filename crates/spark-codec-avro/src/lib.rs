#![warn(missing_docs)]

//! # spark-codec-avro
//!
//! ## 教案目的（Why）
//! - **定位**：把 Avro 风格的 schema 编译为可复用的编解码器，在内存中的动态值与两种线上表示之间转换：
//!   紧凑的二进制编码，以及 JSON 兼容的文本编码；
//! - **架构角色**：只负责“单个值”的编解码。容器文件分帧、压缩与网络传输都由上层通过
//!   [`Codec`] 的四个方法组合完成，不在本 crate 内实现；
//! - **难点**：自引用类型图的构造、变长整数与 IEEE-754 布局、JSON 转义中的 UTF-16 代理对、
//!   面向恶意输入的块计数上限，以及 union 成员选择与数值无损转换。
//!
//! ## 交互契约（What）
//! - [`Codec::new`] 接受裸标量类型名或 JSON schema，失败时返回 [`AvroError::Schema`]，
//!   其文案带有出错节点的路径；
//! - 解码失败不消费输入，编码失败不改变输出缓冲，错误即全部结果；
//! - union 值以 [`Value::union`] 构造：null 成员为裸 [`Value::Null`]，其余为 `{全名: 值}`；
//! - [`CodecOptions`] 可从 TOML/JSON 加载，约束集合块计数与解码嵌套深度。
//!
//! ## 实现策略（How）
//! 1. `compiler` 遍历 JSON schema，命名类型先登记占位槽再编译子节点；
//! 2. 全部节点存放在以下标寻址的只读节点图中，复合类型以下标引用子节点；
//! 3. `primitive` 负责标量的字节布局与 JSON 词法，`composite` 与 `union` 只处理结构。
//!
//! ## 使用示例
//! ```
//! use spark_codec_avro::{Codec, Value};
//!
//! let codec = Codec::new(r#"["null", "int"]"#)?;
//! let mut buf = Vec::new();
//! codec.binary_encode(&mut buf, &Value::union("int", Value::Int(3)))?;
//! assert_eq!(buf, [0x02, 0x06]);
//!
//! let (decoded, rest) = codec.binary_decode(&buf)?;
//! assert_eq!(decoded, Value::union("int", Value::Int(3)));
//! assert!(rest.is_empty());
//! # Ok::<(), spark_codec_avro::AvroError>(())
//! ```
//!
//! ## 风险提示（Trade-offs）
//! - 不支持读写两端 schema 不同时的 schema 演进解析；
//! - 所有解码结果都是拥有所有权的 [`Value`]，不做零拷贝借用。

mod codec;
mod compiler;
mod composite;
mod cursor;
mod error;
mod name;
mod numeric;
mod options;
mod primitive;
mod sink;
mod symbol_table;
mod tree;
mod union;
mod value;

pub use crate::codec::{Codec, SchemaKind};
pub use crate::error::{AvroError, Result};
pub use crate::name::{NULL_NAMESPACE, Name};
pub use crate::options::{CodecOptions, MAX_BLOCK_COUNT, MAX_NESTING_DEPTH, MAX_ZERO_WIDTH_ITEMS};
pub use crate::primitive::text::{NEGATIVE_INFINITY, POSITIVE_INFINITY};
pub use crate::value::Value;
