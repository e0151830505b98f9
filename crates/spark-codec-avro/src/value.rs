//! 编解码边界上的动态数据模型。
//!
//! ## 教案目的（Why）
//! - schema 在运行时才确定，解码结果的形状随 schema 变化，需要一个封闭的和类型承载所有可能的数据；
//! - 数值保留 `int/long/float/double` 四种精确类型，union 的数值转换规则才有据可依。
//!
//! ## 契约说明（What）
//! - `Map` 使用 `BTreeMap`，键有序，编码输出因此是确定性的；
//! - record 与 union 复用 `Map`：record 以字段名为键，union 以成员全名为唯一键；
//! - enum 以 `String` 表示符号，fixed 以 `Bytes` 表示定长数据。

use std::collections::BTreeMap;

/// 一个 Avro 数据值。
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// `null`，也是 union 选中 `null` 成员时的裸值。
    #[default]
    Null,
    /// `boolean`。
    Boolean(bool),
    /// `int`（32 位）。
    Int(i32),
    /// `long`（64 位）。
    Long(i64),
    /// `float`（IEEE-754 单精度）。
    Float(f32),
    /// `double`（IEEE-754 双精度）。
    Double(f64),
    /// `bytes` 或 `fixed`。
    Bytes(Vec<u8>),
    /// `string` 或 `enum` 符号。
    String(String),
    /// `array`。
    Array(Vec<Value>),
    /// `map`、`record` 或带标签的 union 值。
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// 构造带名称标签的 union 值。
    ///
    /// - `("null", Value::Null)` 返回裸 `Null`；
    /// - 其余情况返回仅含一个键值对的 `Map`，键为成员全名。
    pub fn union(name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        if name == "null" && value == Value::Null {
            return Value::Null;
        }
        let mut tagged = BTreeMap::new();
        tagged.insert(name, value);
        Value::Map(tagged)
    }

    /// 以字段列表构造 record / map 值。
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// 数据种类的短名称，用于错误文案。
    pub fn kind_label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// 若为 `Map` 则返回其引用。
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// 若为 `String` 则返回字符串切片。
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// `Bytes` 与 `String` 都可视作原始字节。
    pub(crate) fn as_raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(raw) => Some(raw),
            Value::String(text) => Some(text.as_bytes()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_null_is_bare() {
        assert_eq!(Value::union("null", Value::Null), Value::Null);
    }

    #[test]
    fn union_of_value_is_single_entry_map() {
        let tagged = Value::union("int", Value::Int(3));
        let map = tagged.as_map().expect("tagged union is a map");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("int"), Some(&Value::Int(3)));
    }

    #[test]
    fn record_helper_collects_fields() {
        let record = Value::record([("a", Value::Int(3)), ("b", Value::Int(4))]);
        assert_eq!(record.as_map().map(|m| m.len()), Some(2));
        assert_eq!(record.kind_label(), "map");
    }

    #[test]
    fn accessors_only_match_their_variant() {
        assert_eq!(Value::from("HEARTS").as_str(), Some("HEARTS"));
        assert_eq!(Value::Bytes(b"HEARTS".to_vec()).as_str(), None);
        assert_eq!(Value::Null.as_map(), None);
    }
}
