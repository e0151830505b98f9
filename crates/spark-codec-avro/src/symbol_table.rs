//! 编译期符号表：全名 → 节点下标，外加节点槽位本身。
//!
//! # 教案式说明
//! - **意图 (Why)**：命名类型必须在编译子节点之前登记，子节点才能引用尚未完成的父类型；
//! - **契约 (What)**：
//!   - 新表预置八种标量，下标固定为 `0..8`；
//!   - [`SymbolTable::reserve`] 为命名类型登记一个占位槽，全名重复返回 `DuplicateType`；
//!   - [`SymbolTable::fill`] 写入占位槽的行为，[`SymbolTable::finish`] 要求所有槽位都已填充；
//! - **执行 (How)**：槽位与名称索引分离存放，名称在登记时即可读出，union 因而能对占位成员做去重。

use std::collections::HashMap;

use tracing::debug;

use crate::error::{AvroError, Result};
use crate::name::Name;
use crate::options::CodecOptions;
use crate::primitive::Primitive;
use crate::tree::{CodecId, CodecTree, Kind, Node};

struct Slot {
    name: Name,
    kind: Option<Kind>,
}

/// 节点槽位与命名类型索引。
pub(crate) struct SymbolTable {
    slots: Vec<Slot>,
    by_name: HashMap<String, CodecId>,
}

impl SymbolTable {
    pub(crate) fn new() -> Self {
        let mut table = Self {
            slots: Vec::with_capacity(Primitive::ALL.len()),
            by_name: HashMap::new(),
        };
        for primitive in Primitive::ALL {
            let id = table.push(Name::builtin(primitive.type_name()), Kind::Primitive(primitive));
            table.by_name.insert(primitive.type_name().to_owned(), id);
        }
        table
    }

    pub(crate) fn lookup(&self, full_name: &str) -> Option<CodecId> {
        self.by_name.get(full_name).copied()
    }

    pub(crate) fn name(&self, id: CodecId) -> &Name {
        &self.slots[id.index()].name
    }

    /// 登记一个匿名节点（array / map / union）。
    pub(crate) fn push(&mut self, name: Name, kind: Kind) -> CodecId {
        let id = CodecId::new(self.slots.len());
        self.slots.push(Slot {
            name,
            kind: Some(kind),
        });
        id
    }

    /// 为命名类型登记占位槽。
    pub(crate) fn reserve(&mut self, name: Name) -> Result<CodecId> {
        if self.by_name.contains_key(name.full_name()) {
            return Err(AvroError::DuplicateType {
                name: name.full_name().to_owned(),
            });
        }
        let id = CodecId::new(self.slots.len());
        debug!(full_name = name.full_name(), "registered named type");
        self.by_name.insert(name.full_name().to_owned(), id);
        self.slots.push(Slot { name, kind: None });
        Ok(id)
    }

    pub(crate) fn fill(&mut self, id: CodecId, kind: Kind) {
        self.slots[id.index()].kind = Some(kind);
    }

    /// 冻结为只读的编解码图。
    pub(crate) fn finish(&mut self, root: CodecId, options: CodecOptions) -> Result<CodecTree> {
        self.by_name.clear();
        let nodes = core::mem::take(&mut self.slots)
            .into_iter()
            .map(|slot| match slot.kind {
                Some(kind) => Ok(Node {
                    name: slot.name,
                    kind,
                }),
                None => Err(AvroError::definition(format!(
                    "named type {:?} was never completed",
                    slot.name.full_name()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CodecTree::new(nodes, root, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_primitives() {
        let table = SymbolTable::new();
        for (index, primitive) in Primitive::ALL.into_iter().enumerate() {
            assert_eq!(table.lookup(primitive.type_name()), Some(CodecId::new(index)));
        }
        assert_eq!(table.lookup("record"), None);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut table = SymbolTable::new();
        let name = Name::new("r", "com.example").expect("valid name");
        let id = table.reserve(name.clone()).expect("first registration");
        assert_eq!(table.lookup("com.example.r"), Some(id));
        assert_eq!(
            table.reserve(name),
            Err(AvroError::DuplicateType {
                name: "com.example.r".into()
            })
        );
        assert!(matches!(
            table.reserve(Name::new("int", "").expect("valid name")),
            Err(AvroError::DuplicateType { .. })
        ));
    }

    #[test]
    fn unfilled_placeholder_cannot_be_frozen() {
        let mut table = SymbolTable::new();
        let id = table
            .reserve(Name::new("pending", "").expect("valid name"))
            .expect("reserve");
        assert!(table.finish(id, CodecOptions::default()).is_err());
    }
}
