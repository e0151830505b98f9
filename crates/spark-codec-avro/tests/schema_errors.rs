//! schema 编译期错误：分类、文案与路径。

use spark_codec_avro::{AvroError, Codec, CodecOptions, Name, SchemaKind};

fn compile_error(schema: &str) -> AvroError {
    let err = Codec::new(schema).expect_err("schema ought to be rejected");
    assert!(err.is_schema_error(), "not wrapped: {err:?}");
    err
}

#[test]
fn unknown_type_name() {
    let err = compile_error(r#"{"type":"array","items":"widget"}"#);
    assert_eq!(
        err.root_cause(),
        &AvroError::UnknownType {
            name: "widget".into()
        }
    );
    assert!(err.to_string().starts_with("invalid schema at items: "));
}

#[test]
fn missing_structural_keys() {
    assert!(compile_error(r#"{"type":"array"}"#)
        .to_string()
        .contains("ought to have items key"));
    assert!(compile_error(r#"{"type":"map"}"#)
        .to_string()
        .contains("ought to have values key"));
    assert!(compile_error(r#"{"type":"fixed","name":"f"}"#)
        .to_string()
        .contains("ought to have size key"));
    assert!(compile_error(r#"{"items":"int"}"#)
        .to_string()
        .contains("ought to have type key"));
}

#[test]
fn invalid_names() {
    let err = compile_error(r#"{"type":"fixed","name":"9lives","size":1}"#);
    assert!(matches!(err.root_cause(), AvroError::InvalidName { .. }));
    assert!(err.to_string().contains("ought to start with"));

    let err = compile_error(r#"{"type":"fixed","name":"a-b","size":1}"#);
    assert!(err.to_string().contains("ought to have second and remaining characters"));

    let err = compile_error(r#"{"type":"fixed","size":1}"#);
    assert!(matches!(err.root_cause(), AvroError::InvalidName { .. }));

    let err = compile_error(r#"{"type":"fixed","name":"ok","namespace":"a..b","size":1}"#);
    assert!(matches!(err.root_cause(), AvroError::InvalidName { .. }));
}

#[test]
fn duplicate_named_types() {
    let err = compile_error(
        r#"{"type":"record","name":"r","fields":[
            {"name":"a","type":{"type":"fixed","name":"f","size":1}},
            {"name":"b","type":{"type":"fixed","name":"f","size":2}}
        ]}"#,
    );
    assert_eq!(err.root_cause(), &AvroError::DuplicateType { name: "f".into() });
}

#[test]
fn duplicate_union_members() {
    let err = compile_error(r#"["null","null"]"#);
    assert!(matches!(
        err.root_cause(),
        AvroError::DuplicateUnionMember { index: 1, .. }
    ));
    assert!(err.to_string().contains("ought to be unique type"));
}

#[test]
fn enum_and_record_validation() {
    assert!(compile_error(r#"{"type":"enum","name":"e","symbols":[]}"#)
        .to_string()
        .contains("non-empty"));
    assert!(compile_error(r#"{"type":"enum","name":"e","symbols":["A","A"]}"#)
        .to_string()
        .contains("unique"));
    assert!(compile_error(r#"{"type":"fixed","name":"f","size":0}"#)
        .to_string()
        .contains("positive"));

    let err = compile_error(
        r#"{"type":"record","name":"r","fields":[
            {"name":"a","type":"int"},
            {"name":"a","type":"long"}
        ]}"#,
    );
    assert!(err.to_string().contains("ought to have unique name"));
    assert!(err.to_string().contains(r#"invalid schema at record "r""#));
}

#[test]
fn malformed_json_document() {
    let err = compile_error(r#"{"type": "record", "#);
    assert!(err.to_string().contains("cannot unmarshal JSON"));
    assert!(matches!(err.root_cause(), AvroError::InvalidDefinition { .. }));
}

#[test]
fn invalid_options_are_rejected_before_compiling() {
    let options = CodecOptions::default().with_max_block_count(0);
    let err = Codec::with_options("int", options).expect_err("zero ceiling");
    assert!(matches!(err, AvroError::InvalidConfiguration { .. }));
}

#[test]
fn compiling_twice_gives_identical_behaviour() {
    let schema = r#"{"type":"record","name":"r","namespace":"n","fields":[
        {"name":"a","type":{"type":"enum","name":"e","symbols":["X","Y"]}},
        {"name":"b","type":"e"}
    ]}"#;
    let first = Codec::new(schema).expect("first");
    let second = Codec::new(schema).expect("second");
    assert_eq!(first.type_name(), second.type_name());
    assert_eq!(first.type_name(), &Name::new("r", "n").expect("name"));
    assert_eq!(first.schema_kind(), SchemaKind::Record);

    let buf = [0x02, 0x00];
    assert_eq!(
        first.binary_decode(&buf).expect("first decode"),
        second.binary_decode(&buf).expect("second decode")
    );
}
