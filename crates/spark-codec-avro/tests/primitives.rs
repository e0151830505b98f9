//! 标量类型的线上格式。
//!
//! - **核心目标 (Why)**：锁定 zig-zag 变长整数、IEEE-754 小端布局与长度前缀的字节级输出，
//!   任何实现改动导致互操作性回归都会在此暴露；
//! - **合同 (What)**：只通过公开门面 [`Codec`] 驱动，断言字节序列、剩余切片与错误分类。

use spark_codec_avro::{AvroError, Codec, Value};

fn encode(schema: &str, datum: &Value) -> Vec<u8> {
    let codec = Codec::new(schema).expect("schema compiles");
    let mut buf = Vec::new();
    codec.binary_encode(&mut buf, datum).expect("encode");
    buf
}

#[test]
fn long_three_is_single_byte() {
    assert_eq!(encode("long", &Value::Long(3)), [0x06]);

    let codec = Codec::new("long").expect("compile");
    let (value, rest) = codec.binary_decode(&[0x06]).expect("decode");
    assert_eq!(value, Value::Long(3));
    assert!(rest.is_empty());
}

#[test]
fn int_and_long_extremes() {
    assert_eq!(encode("int", &Value::Int(i32::MIN)), [0xff, 0xff, 0xff, 0xff, 0x0f]);
    assert_eq!(encode("int", &Value::Int(i32::MAX)), [0xfe, 0xff, 0xff, 0xff, 0x0f]);
    assert_eq!(encode("long", &Value::Long(-1)), [0x01]);
    assert_eq!(encode("long", &Value::Long(i64::MAX)).len(), 10);
}

#[test]
fn int_overflow_is_reported() {
    let codec = Codec::new("int").expect("compile");
    let err = codec
        .binary_decode(&[0xff, 0xff, 0xff, 0xff, 0x1f])
        .expect_err("more than 32 bits");
    assert!(matches!(err.root_cause(), AvroError::Overflow { bits: 32, .. }));
}

#[test]
fn boolean_encoding_is_strict_but_decoding_is_lenient() {
    assert_eq!(encode("boolean", &Value::Boolean(true)), [0x01]);
    assert_eq!(encode("boolean", &Value::Boolean(false)), [0x00]);
    let codec = Codec::new("boolean").expect("compile");
    assert_eq!(codec.binary_decode(&[0x02]).expect("decode").0, Value::Boolean(true));
}

#[test]
fn float_and_double_are_little_endian() {
    assert_eq!(encode("float", &Value::Float(3.5)), [0x00, 0x00, 0x60, 0x40]);
    assert_eq!(
        encode("double", &Value::Double(3.5)),
        [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x40]
    );
}

#[test]
fn numeric_values_are_converted_when_exact() {
    assert_eq!(encode("long", &Value::Int(3)), [0x06]);
    assert_eq!(encode("double", &Value::Int(3)), encode("double", &Value::Double(3.0)));

    let codec = Codec::new("int").expect("compile");
    let mut buf = Vec::new();
    let err = codec
        .binary_encode(&mut buf, &Value::Long(i64::from(i32::MAX) + 1))
        .expect_err("out of int range");
    assert!(matches!(err, AvroError::PrecisionLoss { target: "int", .. }));
    assert!(err.to_string().contains("lose precision"));
    assert!(buf.is_empty());
}

#[test]
fn bytes_and_string_are_length_prefixed() {
    assert_eq!(encode("bytes", &Value::Bytes(vec![0xde, 0xad])), [0x04, 0xde, 0xad]);
    assert_eq!(encode("string", &Value::from("hi")), [0x04, b'h', b'i']);
    assert_eq!(encode("string", &Value::String(String::new())), [0x00]);

    let codec = Codec::new("string").expect("compile");
    let (value, rest) = codec.binary_decode(&[0x02, b'a', 0x09]).expect("decode");
    assert_eq!(value, Value::from("a"));
    assert_eq!(rest, [0x09]);
}

#[test]
fn wrong_datum_shape_is_a_type_mismatch() {
    let codec = Codec::new("string").expect("compile");
    let err = codec
        .binary_encode(&mut Vec::new(), &Value::Int(1))
        .expect_err("int is not a string");
    assert_eq!(
        err,
        AvroError::TypeMismatch {
            expected: "string",
            received: "int"
        }
    );
    assert!(err.to_string().contains("received: int"));
}

#[test]
fn truncated_payload_underflows() {
    let codec = Codec::new("double").expect("compile");
    let err = codec.binary_decode(&[0x00; 7]).expect_err("seven bytes");
    assert_eq!(
        err,
        AvroError::BufferUnderflow {
            position: 0,
            needed: 1,
            remaining: 7
        }
    );

    let codec = Codec::new("null").expect("compile");
    let (value, rest) = codec.binary_decode(&[0x05]).expect("null consumes nothing");
    assert_eq!(value, Value::Null);
    assert_eq!(rest, [0x05]);
}
