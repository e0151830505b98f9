//! 类型名称解析。
//!
//! ## 模块目的（Why）
//! - record / enum / fixed 以“命名空间 + 短名”唯一标识，符号表与 union 标签都依赖全名；
//! - 标识符规则集中在此处校验，枚举符号与字段名也复用同一套规则。
//!
//! ## 实现策略（How）
//! - `name` 中含 `.` 时视为已限定的全名，其命名空间覆盖 `namespace` 键；
//! - 否则优先使用 `namespace` 键，缺省时继承外层命名空间。

use core::fmt;

use serde_json::{Map, Value as Json};

use crate::error::{AvroError, Result};

/// 空命名空间。
pub const NULL_NAMESPACE: &str = "";

/// 类型名称：短名、命名空间与预先拼好的全名。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
    short: String,
    namespace: String,
    full: String,
}

impl Name {
    /// 为内置类型（primitive / array / map / union）构造位于空命名空间的名称。
    pub(crate) fn builtin(short: &str) -> Self {
        Self {
            short: short.to_owned(),
            namespace: NULL_NAMESPACE.to_owned(),
            full: short.to_owned(),
        }
    }

    /// 以短名与命名空间构造名称，并校验二者的标识符规则。
    pub fn new(short: &str, namespace: &str) -> Result<Self> {
        validate_identifier(short)?;
        if !namespace.is_empty() {
            for component in namespace.split('.') {
                if component.is_empty() {
                    return Err(invalid(format!(
                        "namespace ought to have non-empty components: {namespace:?}"
                    )));
                }
                validate_identifier(component)?;
            }
        }
        let full = if namespace.is_empty() {
            short.to_owned()
        } else {
            format!("{namespace}.{short}")
        };
        Ok(Self {
            short: short.to_owned(),
            namespace: namespace.to_owned(),
            full,
        })
    }

    /// 短名。
    pub fn short(&self) -> &str {
        &self.short
    }

    /// 命名空间，空串表示空命名空间。
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 全名。
    pub fn full_name(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// 从 schema 对象的 `name` / `namespace` 键解析名称。
///
/// # 教案式说明
/// - **契约 (What)**：`name` 缺失、非字符串或为空时返回 `InvalidName`；
///   `namespace` 存在但不是字符串时同样返回 `InvalidName`；
/// - **执行 (How)**：`a.b.c` 形式的 `name` 以最后一个 `.` 切分，前半段即命名空间；
/// - **风险 (Trade-offs)**：显式写出 `"namespace": ""` 会切回空命名空间，而不是继承外层。
pub(crate) fn resolve(enclosing_namespace: &str, schema: &Map<String, Json>) -> Result<Name> {
    let raw = match schema.get("name") {
        None => return Err(invalid("ought to have name key")),
        Some(Json::String(raw)) if !raw.is_empty() => raw.as_str(),
        Some(_) => return Err(invalid("ought to be non-empty string")),
    };

    if let Some((namespace, short)) = raw.rsplit_once('.') {
        if namespace.is_empty() {
            return Err(invalid(format!(
                "namespace ought to have non-empty components: {raw:?}"
            )));
        }
        return Name::new(short, namespace);
    }

    let namespace = match schema.get("namespace") {
        None => enclosing_namespace,
        Some(Json::String(namespace)) => namespace.as_str(),
        Some(_) => return Err(invalid("namespace ought to be a string")),
    };
    Name::new(raw, namespace)
}

/// 校验 `[A-Za-z_][A-Za-z0-9_]*`。
pub(crate) fn validate_identifier(candidate: &str) -> Result<()> {
    let mut chars = candidate.chars();
    match chars.next() {
        None => return Err(invalid("ought to be non-empty string")),
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        Some(_) => {
            return Err(invalid(format!(
                "ought to start with [A-Za-z_]: {candidate:?}"
            )));
        }
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err(invalid(format!(
            "ought to have second and remaining characters contain only [A-Za-z0-9_]: {candidate:?}"
        )));
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> AvroError {
    AvroError::InvalidName {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn reason(err: AvroError) -> String {
        match err {
            AvroError::InvalidName { reason } => reason,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inherits_enclosing_namespace() {
        let name = resolve("com.example", &object(json!({"name": "r"}))).expect("valid name");
        assert_eq!(name.full_name(), "com.example.r");
        assert_eq!(name.namespace(), "com.example");
        assert_eq!(name.short(), "r");
    }

    #[test]
    fn explicit_namespace_wins_over_enclosing() {
        let name = resolve("outer", &object(json!({"name": "r", "namespace": "inner"})))
            .expect("valid name");
        assert_eq!(name.full_name(), "inner.r");
    }

    #[test]
    fn dotted_name_overrides_namespace_key() {
        let name = resolve(
            "outer",
            &object(json!({"name": "a.b.r", "namespace": "ignored"})),
        )
        .expect("valid name");
        assert_eq!(name.namespace(), "a.b");
        assert_eq!(name.short(), "r");
        assert_eq!(name.full_name(), "a.b.r");
    }

    #[test]
    fn empty_namespace_key_selects_null_namespace() {
        let name = resolve("outer", &object(json!({"name": "r", "namespace": ""})))
            .expect("valid name");
        assert_eq!(name.full_name(), "r");
    }

    #[test]
    fn rejects_missing_or_empty_name() {
        assert!(reason(resolve("", &object(json!({}))).unwrap_err()).contains("name key"));
        assert!(
            reason(resolve("", &object(json!({"name": 3}))).unwrap_err())
                .contains("non-empty string")
        );
        assert!(
            reason(resolve("", &object(json!({"name": ""}))).unwrap_err())
                .contains("non-empty string")
        );
    }

    #[test]
    fn rejects_bad_characters() {
        let err = resolve("", &object(json!({"name": "&foo"}))).unwrap_err();
        assert!(reason(err).contains("ought to start with"));
        let err = resolve("", &object(json!({"name": "foo&"}))).unwrap_err();
        assert!(reason(err).contains("ought to have second and remaining"));
        let err = resolve("", &object(json!({"name": "r", "namespace": "a.9b"}))).unwrap_err();
        assert!(reason(err).contains("ought to start with"));
        let err = resolve("", &object(json!({"name": "a..r"}))).unwrap_err();
        assert!(reason(err).contains("non-empty components"));
    }
}
