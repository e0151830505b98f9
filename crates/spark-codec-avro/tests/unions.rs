//! union：名称标签选择、下标边界与数值转换。

use spark_codec_avro::{AvroError, Codec, SchemaKind, Value};

fn codec(schema: &str) -> Codec {
    Codec::new(schema).expect("schema compiles")
}

fn encode(codec: &Codec, datum: &Value) -> Result<Vec<u8>, AvroError> {
    let mut buf = Vec::new();
    codec.binary_encode(&mut buf, datum).map(|_| buf)
}

#[test]
fn null_and_int_members() {
    let codec = codec(r#"["null","int"]"#);
    assert_eq!(codec.schema_kind(), SchemaKind::Union);
    assert_eq!(encode(&codec, &Value::Null).expect("null"), [0x00]);
    assert_eq!(
        encode(&codec, &Value::union("int", Value::Int(3))).expect("int"),
        [0x02, 0x06]
    );
    assert_eq!(
        codec.binary_decode(&[0x02, 0x06]).expect("decode").0,
        Value::union("int", Value::Int(3))
    );
    assert_eq!(codec.binary_decode(&[0x00]).expect("decode").0, Value::Null);
}

#[test]
fn branch_index_bounds() {
    let codec = codec(r#"["null","int","string"]"#);
    assert!(codec.binary_decode(&[0x00]).is_ok());
    assert!(codec.binary_decode(&[0x04, 0x00]).is_ok());

    let err = codec.binary_decode(&[0x06]).expect_err("index 3");
    assert!(matches!(err, AvroError::IndexOutOfRange { index: 3, len: 3, .. }));
    let err = codec.binary_decode(&[0x01]).expect_err("index -1");
    assert!(matches!(err, AvroError::IndexOutOfRange { index: -1, .. }));
}

#[test]
fn null_without_null_member_has_no_match() {
    let codec = codec(r#"["int","string"]"#);
    let err = encode(&codec, &Value::Null).expect_err("no null member");
    assert_eq!(
        err,
        AvroError::NoMatchingMember {
            allowed: vec!["int".into(), "string".into()],
            received: "null".into()
        }
    );
}

#[test]
fn untagged_or_unknown_tags_have_no_match() {
    let codec = codec(r#"["null","int"]"#);
    let err = encode(&codec, &Value::Int(3)).expect_err("untagged int");
    assert!(matches!(err, AvroError::NoMatchingMember { .. }));
    let err = encode(&codec, &Value::union("long", Value::Long(3))).expect_err("wrong tag");
    assert!(err.to_string().contains("received: long"));
}

#[test]
fn tag_selects_member_and_value_is_converted() {
    let codec = codec(r#"["null","long","double"]"#);
    assert_eq!(
        encode(&codec, &Value::union("long", Value::Int(3))).expect("int into long"),
        [0x02, 0x06]
    );
    let widened = encode(&codec, &Value::union("double", Value::Float(3.5))).expect("widen");
    assert_eq!(widened[0], 0x04);
    assert_eq!(f64::from_le_bytes(widened[1..].try_into().expect("8 bytes")), 3.5);

    let err = encode(&codec, &Value::union("long", Value::Double(3.5))).expect_err("fraction");
    assert!(matches!(err.root_cause(), AvroError::PrecisionLoss { target: "long", .. }));
}

#[test]
fn map_and_record_members_are_told_apart_by_tag() {
    let codec = codec(
        r#"[
            {"type":"map","values":"int"},
            {"type":"record","name":"point","fields":[{"name":"x","type":"int"}]}
        ]"#,
    );
    let fields = Value::record([("x", Value::Int(1))]);
    assert_eq!(
        encode(&codec, &Value::union("map", fields.clone())).expect("map"),
        [0x00, 0x02, 0x02, b'x', 0x02, 0x00]
    );
    assert_eq!(
        encode(&codec, &Value::union("point", fields)).expect("record"),
        [0x02, 0x02]
    );
}

#[test]
fn named_members_use_full_names() {
    let codec = codec(
        r#"["null", {"type":"fixed","name":"hash","namespace":"com.example","size":2}]"#,
    );
    let datum = Value::union("com.example.hash", Value::Bytes(vec![7, 8]));
    let encoded = encode(&codec, &datum).expect("encode");
    assert_eq!(encoded, [0x02, 7, 8]);
    assert_eq!(codec.binary_decode(&encoded).expect("decode").0, datum);
    assert!(encode(&codec, &Value::union("hash", Value::Bytes(vec![7, 8]))).is_err());
}

#[test]
fn member_errors_carry_context() {
    let codec = codec(r#"["null","string"]"#);
    let err = codec.binary_decode(&[0x02, 0x04, b'a']).expect_err("short string");
    assert!(err.to_string().starts_with("union member \"string\": "));
    assert!(matches!(err.root_cause(), AvroError::BufferUnderflow { .. }));
}
