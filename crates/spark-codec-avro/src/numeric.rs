//! 数值转换表。
//!
//! # 教案式说明
//! - **意图 (Why)**：调用方手里的数值类型未必与 schema 声明一致（例如以 `Long(3)` 写入 `int` 字段，
//!   或以 `Double(3.5)` 选中 union 的 `float` 成员），需要一套显式、全定义的转换规则；
//! - **契约 (What)**：
//!   - int → long → float → double 方向在可精确表示时放行；
//!   - 反方向（收窄）同样只在数值可被目标类型**精确**表示时放行，否则返回 `PrecisionLoss`；
//!   - 非数值输入返回 `TypeMismatch`；
//!   - NaN 与 ±Infinity 可在 float/double 间互转，转向整数一律视为精度丢失；
//! - **执行 (How)**：先转换，再反向转换比较，二者相等才算无损。

use crate::error::{AvroError, Result};
use crate::value::Value;

/// 转为 `int`。
pub(crate) fn to_int(value: &Value) -> Result<i32> {
    match *value {
        Value::Int(v) => Ok(v),
        Value::Long(v) => i32::try_from(v).map_err(|_| loss("int", value)),
        Value::Float(v) => float_to_int(f64::from(v), value),
        Value::Double(v) => float_to_int(v, value),
        _ => Err(AvroError::mismatch("int", value)),
    }
}

/// 转为 `long`。
pub(crate) fn to_long(value: &Value) -> Result<i64> {
    match *value {
        Value::Int(v) => Ok(i64::from(v)),
        Value::Long(v) => Ok(v),
        Value::Float(v) => float_to_long(f64::from(v), value),
        Value::Double(v) => float_to_long(v, value),
        _ => Err(AvroError::mismatch("long", value)),
    }
}

/// 转为 `float`。
pub(crate) fn to_float(value: &Value) -> Result<f32> {
    match *value {
        Value::Int(v) => {
            let converted = v as f32;
            exact_integer(converted as f64, i128::from(v), "float", value).map(|_| converted)
        }
        Value::Long(v) => {
            let converted = v as f32;
            exact_integer(converted as f64, i128::from(v), "float", value).map(|_| converted)
        }
        Value::Float(v) => Ok(v),
        Value::Double(v) => {
            let converted = v as f32;
            if v.is_nan() || f64::from(converted) == v {
                Ok(converted)
            } else {
                Err(loss("float", value))
            }
        }
        _ => Err(AvroError::mismatch("float", value)),
    }
}

/// 转为 `double`。
pub(crate) fn to_double(value: &Value) -> Result<f64> {
    match *value {
        Value::Int(v) => Ok(f64::from(v)),
        Value::Long(v) => {
            let converted = v as f64;
            exact_integer(converted, i128::from(v), "double", value).map(|_| converted)
        }
        Value::Float(v) => Ok(f64::from(v)),
        Value::Double(v) => Ok(v),
        _ => Err(AvroError::mismatch("double", value)),
    }
}

// 2^63 恰好可被 f64 表示，是 i64 的开区间上界。
const LONG_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn float_to_int(v: f64, original: &Value) -> Result<i32> {
    if v.is_finite() && v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
        Ok(v as i32)
    } else {
        Err(loss("int", original))
    }
}

fn float_to_long(v: f64, original: &Value) -> Result<i64> {
    if v.is_finite() && v.fract() == 0.0 && v >= -LONG_UPPER && v < LONG_UPPER {
        Ok(v as i64)
    } else {
        Err(loss("long", original))
    }
}

fn exact_integer(
    converted: f64,
    expected: i128,
    target: &'static str,
    original: &Value,
) -> Result<()> {
    // `as i128` 对 2^63 这类越过 i64 的取整结果仍然精确。
    if converted as i128 == expected {
        Ok(())
    } else {
        Err(loss(target, original))
    }
}

fn loss(target: &'static str, original: &Value) -> AvroError {
    let value = match original {
        Value::Int(v) => format!("int {v}"),
        Value::Long(v) => format!("long {v}"),
        Value::Float(v) => format!("float {v}"),
        Value::Double(v) => format!("double {v}"),
        other => other.kind_label().to_owned(),
    };
    AvroError::PrecisionLoss { target, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_loss<T: core::fmt::Debug>(result: Result<T>) -> bool {
        matches!(result, Err(AvroError::PrecisionLoss { .. }))
    }

    #[test]
    fn widening_is_always_allowed_for_small_values() {
        assert_eq!(to_long(&Value::Int(3)), Ok(3));
        assert_eq!(to_float(&Value::Long(3)), Ok(3.0));
        assert_eq!(to_double(&Value::Float(3.5)), Ok(3.5));
        assert_eq!(to_double(&Value::Int(i32::MIN)), Ok(-2_147_483_648.0));
    }

    #[test]
    fn narrowing_requires_exact_representation() {
        assert_eq!(to_int(&Value::Long(3)), Ok(3));
        assert_eq!(to_float(&Value::Double(3.5)), Ok(3.5));
        assert_eq!(to_int(&Value::Double(-7.0)), Ok(-7));
        assert!(is_loss(to_int(&Value::Float(3.5))));
        assert!(is_loss(to_int(&Value::Long(i64::from(i32::MAX) + 1))));
        assert!(is_loss(to_float(&Value::Double(0.1))));
        assert!(is_loss(to_long(&Value::Double(f64::NAN))));
        assert!(is_loss(to_long(&Value::Double(LONG_UPPER))));
    }

    #[test]
    fn integers_beyond_mantissa_lose_precision() {
        assert!(is_loss(to_float(&Value::Int(i32::MAX))));
        assert_eq!(to_float(&Value::Int(1 << 24)), Ok(16_777_216.0));
        assert!(is_loss(to_float(&Value::Int((1 << 24) + 1))));
        assert!(is_loss(to_double(&Value::Long(i64::MAX))));
        assert_eq!(to_double(&Value::Long(i64::MIN)), Ok(-LONG_UPPER));
    }

    #[test]
    fn special_floats_cross_widths() {
        assert!(to_float(&Value::Double(f64::NAN)).expect("nan").is_nan());
        assert_eq!(to_float(&Value::Double(f64::INFINITY)), Ok(f32::INFINITY));
        assert_eq!(to_double(&Value::Float(f32::NEG_INFINITY)), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn non_numeric_input_is_a_type_mismatch() {
        assert!(matches!(
            to_long(&Value::String("3".into())),
            Err(AvroError::TypeMismatch {
                expected: "long",
                received: "string"
            })
        ));
    }
}
