//! schema 编译器：JSON 树 → [`CodecTree`]。
//!
//! ## 教案目的（Why）
//! - schema 只在构造时解析一次，之后的每次编解码都直接走编译好的节点图；
//! - 命名类型在编译子节点**之前**登记占位槽，record 字段因此可以引用 record 自身。
//!
//! ## 执行流程（How）
//! 1. 裸字符串：先按外层命名空间限定查找，再按原样查找，找不到即 `UnknownType`；
//! 2. JSON 数组：union；
//! 3. JSON 对象：按 `type` 分派到 array / map / enum / fixed / record，或引用已定义的类型名；
//!    `type` 本身是对象或数组时递归编译；
//! 4. 全部节点就绪后统一解析字段 `default`，此时自引用类型也已完整；
//! 5. 最后标记元素不占字节的 array，编解码时对其合计元素数设限。
//!
//! ## 诊断路径（What）
//! - 进入子节点前压入路径段，成功返回才弹出；失败时路径栈恰好停在出错位置，
//!   最终包装为 `AvroError::Schema { path, source }`。

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::composite::array::ArrayCodec;
use crate::composite::enumeration::EnumCodec;
use crate::composite::fixed::FixedCodec;
use crate::composite::map::MapCodec;
use crate::composite::record::{RecordCodec, RecordField};
use crate::error::{AvroError, Result};
use crate::name::{self, NULL_NAMESPACE, Name};
use crate::options::CodecOptions;
use crate::primitive::Primitive;
use crate::symbol_table::SymbolTable;
use crate::tree::{CodecId, CodecTree, Kind};
use crate::union::UnionCodec;
use crate::value::Value;

const ROOT_PATH: &str = "<root>";

/// 编译一棵 schema 树。失败时只返回 `AvroError::Schema`。
pub(crate) fn compile(schema: &Json, options: CodecOptions) -> Result<CodecTree> {
    let mut compiler = Compiler {
        table: SymbolTable::new(),
        path: Vec::new(),
        pending: Vec::new(),
    };
    match compiler.run(schema, options) {
        Ok(tree) => {
            debug!(
                root = %tree.name(tree.root()),
                nodes = tree.len(),
                "compiled schema"
            );
            Ok(tree)
        }
        Err(source) => {
            let path = compiler.path_label();
            debug!(path = %path, error = %source, "schema compilation failed");
            Err(AvroError::Schema {
                path,
                source: Box::new(source),
            })
        }
    }
}

/// 待解析的字段默认值。
struct PendingDefault {
    record: CodecId,
    field: usize,
    value: Json,
    path: Vec<String>,
}

struct Compiler {
    table: SymbolTable,
    path: Vec<String>,
    pending: Vec<PendingDefault>,
}

impl Compiler {
    fn run(&mut self, schema: &Json, options: CodecOptions) -> Result<CodecTree> {
        let root = self.compile_node(NULL_NAMESPACE, schema)?;
        let mut tree = self.table.finish(root, options)?;
        self.resolve_defaults(&mut tree)?;
        mark_zero_width_arrays(&mut tree);
        Ok(tree)
    }

    fn path_label(&self) -> String {
        if self.path.is_empty() {
            ROOT_PATH.to_owned()
        } else {
            self.path.join(" / ")
        }
    }

    /// 在路径段 `segment` 之下执行 `step`；失败时保留路径段。
    fn nested<T>(
        &mut self,
        segment: String,
        step: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.path.push(segment);
        let outcome = step(self);
        if outcome.is_ok() {
            self.path.pop();
        }
        outcome
    }

    fn compile_node(&mut self, namespace: &str, schema: &Json) -> Result<CodecId> {
        match schema {
            Json::String(type_name) => self.lookup(namespace, type_name),
            Json::Array(members) => self.compile_union(namespace, members),
            Json::Object(object) => self.compile_object(namespace, object),
            other => Err(AvroError::definition(format!(
                "unknown schema type: {}",
                json_kind(other)
            ))),
        }
    }

    fn lookup(&self, namespace: &str, type_name: &str) -> Result<CodecId> {
        let qualified = Primitive::from_type_name(type_name).is_none()
            && !namespace.is_empty()
            && !type_name.contains('.');
        if qualified {
            if let Some(id) = self.table.lookup(&format!("{namespace}.{type_name}")) {
                return Ok(id);
            }
        }
        self.table
            .lookup(type_name)
            .ok_or_else(|| AvroError::UnknownType {
                name: type_name.to_owned(),
            })
    }

    fn compile_object(&mut self, namespace: &str, object: &Map<String, Json>) -> Result<CodecId> {
        let Some(type_value) = object.get("type") else {
            return Err(AvroError::definition("schema ought to have type key"));
        };
        match type_value {
            Json::String(type_name) => match type_name.as_str() {
                "array" => self.compile_array(namespace, object),
                "map" => self.compile_map(namespace, object),
                "enum" => self.compile_enum(namespace, object),
                "fixed" => self.compile_fixed(namespace, object),
                "record" | "error" => self.compile_record(namespace, object),
                other => self.lookup(namespace, other),
            },
            Json::Object(_) | Json::Array(_) => {
                self.nested("type".to_owned(), |c| c.compile_node(namespace, type_value))
            }
            other => Err(AvroError::definition(format!(
                "type ought to be either string, object, or array; received: {}",
                json_kind(other)
            ))),
        }
    }

    fn compile_array(&mut self, namespace: &str, object: &Map<String, Json>) -> Result<CodecId> {
        let Some(items) = object.get("items") else {
            return Err(AvroError::definition("array ought to have items key"));
        };
        let items = self.nested("items".to_owned(), |c| c.compile_node(namespace, items))?;
        Ok(self
            .table
            .push(Name::builtin("array"), Kind::Array(ArrayCodec::new(items))))
    }

    fn compile_map(&mut self, namespace: &str, object: &Map<String, Json>) -> Result<CodecId> {
        let Some(values) = object.get("values") else {
            return Err(AvroError::definition("map ought to have values key"));
        };
        let values = self.nested("values".to_owned(), |c| c.compile_node(namespace, values))?;
        Ok(self
            .table
            .push(Name::builtin("map"), Kind::Map(MapCodec::new(values))))
    }

    fn compile_union(&mut self, namespace: &str, members: &[Json]) -> Result<CodecId> {
        if members.is_empty() {
            return Err(AvroError::definition("union ought to have one or more members"));
        }
        let mut ids = Vec::with_capacity(members.len());
        let mut names: Vec<String> = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            let id = self.nested(format!("union member {index}"), |c| {
                c.compile_node(namespace, member)
            })?;
            let member_name = self.table.name(id).full_name().to_owned();
            if names.contains(&member_name) {
                return Err(AvroError::DuplicateUnionMember {
                    index,
                    name: member_name,
                });
            }
            ids.push(id);
            names.push(member_name);
        }
        Ok(self
            .table
            .push(Name::builtin("union"), Kind::Union(UnionCodec::new(ids, names))))
    }

    fn compile_enum(&mut self, namespace: &str, object: &Map<String, Json>) -> Result<CodecId> {
        let name = name::resolve(namespace, object)?;
        let full_name = name.full_name().to_owned();
        let id = self.table.reserve(name)?;
        self.nested(format!("enum {full_name:?}"), |c| {
            let symbols = match object.get("symbols") {
                None => return Err(AvroError::definition("enum ought to have symbols key")),
                Some(Json::Array(symbols)) if !symbols.is_empty() => symbols,
                Some(_) => {
                    return Err(AvroError::definition(
                        "enum symbols ought to be non-empty array of strings",
                    ));
                }
            };
            let mut declared: Vec<String> = Vec::with_capacity(symbols.len());
            for (index, symbol) in symbols.iter().enumerate() {
                let Json::String(symbol) = symbol else {
                    return Err(AvroError::definition(format!(
                        "enum symbol {index} ought to be a string; received: {}",
                        json_kind(symbol)
                    )));
                };
                name::validate_identifier(symbol)?;
                if declared.contains(symbol) {
                    return Err(AvroError::definition(format!(
                        "enum symbols ought to be unique: {symbol:?}"
                    )));
                }
                declared.push(symbol.clone());
            }
            c.table
                .fill(id, Kind::Enum(EnumCodec::new(full_name.clone(), declared)));
            Ok(id)
        })
    }

    fn compile_fixed(&mut self, namespace: &str, object: &Map<String, Json>) -> Result<CodecId> {
        let name = name::resolve(namespace, object)?;
        let full_name = name.full_name().to_owned();
        let id = self.table.reserve(name)?;
        self.nested(format!("fixed {full_name:?}"), |c| {
            let Some(size) = object.get("size") else {
                return Err(AvroError::definition("fixed ought to have size key"));
            };
            let size = size
                .as_u64()
                .filter(|size| *size > 0)
                .and_then(|size| usize::try_from(size).ok())
                .ok_or_else(|| {
                    AvroError::definition(format!(
                        "fixed size ought to be a positive number: {size}"
                    ))
                })?;
            c.table
                .fill(id, Kind::Fixed(FixedCodec::new(full_name.clone(), size)));
            Ok(id)
        })
    }

    fn compile_record(&mut self, namespace: &str, object: &Map<String, Json>) -> Result<CodecId> {
        let name = name::resolve(namespace, object)?;
        let full_name = name.full_name().to_owned();
        let record_namespace = name.namespace().to_owned();
        let id = self.table.reserve(name)?;
        self.nested(format!("record {full_name:?}"), |c| {
            let fields = match object.get("fields") {
                None => return Err(AvroError::definition("record ought to have fields key")),
                Some(Json::Array(fields)) if !fields.is_empty() => fields,
                Some(_) => {
                    return Err(AvroError::definition(
                        "record fields ought to be non-empty array",
                    ));
                }
            };
            let mut compiled: Vec<RecordField> = Vec::with_capacity(fields.len());
            for (index, field) in fields.iter().enumerate() {
                let Json::Object(field) = field else {
                    return Err(AvroError::definition(format!(
                        "record field {index} ought to be an object; received: {}",
                        json_kind(field)
                    )));
                };
                let field_name = match field.get("name") {
                    Some(Json::String(field_name)) => field_name,
                    _ => {
                        return Err(AvroError::definition(format!(
                            "record field {index} ought to have valid name"
                        )));
                    }
                };
                name::validate_identifier(field_name)?;
                if compiled.iter().any(|existing| existing.name() == field_name) {
                    return Err(AvroError::definition(format!(
                        "record field {index} ought to have unique name: {field_name:?}"
                    )));
                }
                let Some(field_type) = field.get("type") else {
                    return Err(AvroError::definition(format!(
                        "record field {field_name:?} ought to have type key"
                    )));
                };
                let segment = format!("field {field_name:?}");
                let codec = c.nested(segment.clone(), |c| {
                    c.compile_node(&record_namespace, field_type)
                })?;
                if let Some(default) = field.get("default") {
                    let mut path = c.path.clone();
                    path.push(segment);
                    c.pending.push(PendingDefault {
                        record: id,
                        field: index,
                        value: default.clone(),
                        path,
                    });
                }
                compiled.push(RecordField::new(field_name.clone(), codec));
            }
            c.table
                .fill(id, Kind::Record(RecordCodec::new(full_name.clone(), compiled)));
            Ok(id)
        })
    }

    /// 按登记顺序解析默认值：内层 record 的默认值总是先于外层完成。
    fn resolve_defaults(&mut self, tree: &mut CodecTree) -> Result<()> {
        for pending in core::mem::take(&mut self.pending) {
            self.path = pending.path;
            self.path.push("default".to_owned());
            let Kind::Record(record) = &tree.node(pending.record).kind else {
                continue;
            };
            let Some(field) = record.fields().get(pending.field) else {
                continue;
            };
            let value = default_value(tree, field.codec(), &pending.value)?;
            if let Kind::Record(record) = &mut tree.node_mut(pending.record).kind {
                record.set_default(pending.field, value);
            }
        }
        self.path.clear();
        Ok(())
    }
}

fn mark_zero_width_arrays(tree: &mut CodecTree) {
    let marked: Vec<CodecId> = (0..tree.len())
        .map(CodecId::new)
        .filter(|id| match &tree.node(*id).kind {
            Kind::Array(array) => tree.is_zero_width(array.items()),
            _ => false,
        })
        .collect();
    for id in marked {
        if let Kind::Array(array) = &mut tree.node_mut(id).kind {
            array.mark_zero_width();
        }
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// 把 JSON 默认值转换为 `id` 所指类型的 [`Value`]。
///
/// - union 的默认值对应第一个成员；
/// - bytes / fixed 的默认值是码点不超过 U+00FF 的字符串，每个码点即一个字节。
fn default_value(tree: &CodecTree, id: CodecId, json: &Json) -> Result<Value> {
    let invalid = |expected: &str| {
        AvroError::definition(format!(
            "default value ought to be {expected}; received: {json}"
        ))
    };
    match &tree.node(id).kind {
        Kind::Primitive(primitive) => match (primitive, json) {
            (Primitive::Null, Json::Null) => Ok(Value::Null),
            (Primitive::Boolean, Json::Bool(flag)) => Ok(Value::Boolean(*flag)),
            (Primitive::Int, Json::Number(number)) => number
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::Int)
                .ok_or_else(|| invalid("an int")),
            (Primitive::Long, Json::Number(number)) => {
                number.as_i64().map(Value::Long).ok_or_else(|| invalid("a long"))
            }
            (Primitive::Float, Json::Number(number)) => number
                .as_f64()
                .map(|v| Value::Float(v as f32))
                .ok_or_else(|| invalid("a float")),
            (Primitive::Double, Json::Number(number)) => {
                number.as_f64().map(Value::Double).ok_or_else(|| invalid("a double"))
            }
            (Primitive::Bytes, Json::String(text)) => {
                latin1(text).map(Value::Bytes).ok_or_else(|| invalid("bytes"))
            }
            (Primitive::String, Json::String(text)) => Ok(Value::String(text.clone())),
            (primitive, _) => Err(invalid(primitive.type_name())),
        },
        Kind::Fixed(fixed) => match json {
            Json::String(text) => latin1(text)
                .filter(|raw| raw.len() == fixed.size())
                .map(Value::Bytes)
                .ok_or_else(|| invalid(&format!("{} bytes", fixed.size()))),
            _ => Err(invalid("a string")),
        },
        Kind::Enum(enumeration) => match json {
            Json::String(symbol) if enumeration.symbols().contains(symbol) => {
                Ok(Value::String(symbol.clone()))
            }
            _ => Err(invalid("a declared symbol")),
        },
        Kind::Array(array) => match json {
            Json::Array(items) => items
                .iter()
                .map(|item| default_value(tree, array.items(), item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => Err(invalid("an array")),
        },
        Kind::Map(map) => match json {
            Json::Object(entries) => entries
                .iter()
                .map(|(key, item)| -> Result<(String, Value)> {
                    Ok((key.clone(), default_value(tree, map.values(), item)?))
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Value::Map),
            _ => Err(invalid("an object")),
        },
        Kind::Record(record) => {
            let Json::Object(entries) = json else {
                return Err(invalid("an object"));
            };
            let mut values = BTreeMap::new();
            for field in record.fields() {
                let value = match (entries.get(field.name()), field.default()) {
                    (Some(item), _) => default_value(tree, field.codec(), item)?,
                    (None, Some(fallback)) => fallback.clone(),
                    (None, None) => {
                        return Err(invalid(&format!("an object with field {:?}", field.name())));
                    }
                };
                values.insert(field.name().to_owned(), value);
            }
            Ok(Value::Map(values))
        }
        Kind::Union(union) => {
            let Some(first) = union.members().first().copied() else {
                return Err(invalid("a union member"));
            };
            let value = default_value(tree, first, json)?;
            Ok(Value::union(tree.name(first).full_name(), value))
        }
    }
}

fn latin1(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|ch| u8::try_from(ch).ok()).collect()
}
