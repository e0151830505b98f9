//! 编解码性质验证
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：用随机生成的数据覆盖手写用例难以枚举的组合，确认二进制与文本两条路径都满足
//!   “编码后再解码得到原值”，并且任何截断或垃圾输入都只会得到错误而不会 panic。
//! - **设计手法 (How)**：固定一份覆盖全部类型种类的 record schema，`event()` 生成与之匹配的 [`Value`]；
//!   截断性质对编码结果的每个严格前缀逐一解码。
//!
//! # 合同与边界 (What)
//!
//! - 浮点数限制在有限区间内，NaN 不满足 `PartialEq` 自反性，单独由文本用例覆盖；
//! - 二进制严格前缀的解码失败必须归因于 `BufferUnderflow`：同一条解码路径读到的字节相同，只会因输入耗尽而停下；
//! - 文本严格前缀只要求失败，缺失的 `}` 会以多种方式暴露。
//!
//! # 设计考量 (Trade-offs)
//!
//! - schema 末字段是 4 字节 fixed，保证任何严格前缀都缺少至少一个字节；零宽末字段会让部分前缀合法解码。

use std::thread;

use proptest::prelude::*;
use spark_codec_avro::{AvroError, Codec, CodecOptions, Value};

const EVENT: &str = r#"{
    "type": "record",
    "name": "event",
    "namespace": "demo",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "count", "type": "int"},
        {"name": "ratio", "type": "double"},
        {"name": "label", "type": "string"},
        {"name": "payload", "type": "bytes"},
        {"name": "tags", "type": {"type": "array", "items": "string"}},
        {"name": "scores", "type": {"type": "map", "values": "float"}},
        {"name": "level", "type": {"type": "enum", "name": "level", "symbols": ["LOW", "HIGH"]}},
        {"name": "parent", "type": ["null", "long"]},
        {"name": "digest", "type": {"type": "fixed", "name": "digest", "size": 4}}
    ]
}"#;

const LIST: &str = r#"{"type":"record","name":"list","fields":[
    {"name":"head","type":"int"},
    {"name":"tail","type":["null","list"]}
]}"#;

fn event_codec() -> Codec {
    Codec::new(EVENT).expect("event schema compiles")
}

fn event() -> impl Strategy<Value = Value> {
    (
        any::<i64>(),
        any::<i32>(),
        -1.0e12f64..1.0e12,
        any::<String>(),
        prop::collection::vec(any::<u8>(), 0..16),
        prop::collection::vec("[a-z]{0,6}", 0..4),
        prop::collection::btree_map("[a-z]{1,4}", -1.0e6f32..1.0e6, 0..4),
        any::<bool>(),
        prop::option::of(any::<i64>()),
        any::<[u8; 4]>(),
    )
        .prop_map(
            |(id, count, ratio, label, payload, tags, scores, high, parent, digest)| {
                Value::record([
                    ("id", Value::Long(id)),
                    ("count", Value::Int(count)),
                    ("ratio", Value::Double(ratio)),
                    ("label", Value::String(label)),
                    ("payload", Value::Bytes(payload)),
                    (
                        "tags",
                        Value::Array(tags.into_iter().map(Value::String).collect()),
                    ),
                    (
                        "scores",
                        Value::Map(
                            scores
                                .into_iter()
                                .map(|(key, score)| (key, Value::Float(score)))
                                .collect(),
                        ),
                    ),
                    ("level", Value::from(if high { "HIGH" } else { "LOW" })),
                    (
                        "parent",
                        parent.map_or(Value::Null, |id| Value::union("long", Value::Long(id))),
                    ),
                    ("digest", Value::Bytes(digest.to_vec())),
                ])
            },
        )
}

proptest! {
    #[test]
    fn prop_binary_round_trip(datum in event()) {
        let codec = event_codec();
        let mut buf = Vec::new();
        codec.binary_encode(&mut buf, &datum).expect("encode");
        let (decoded, rest) = codec.binary_decode(&buf).expect("decode");
        prop_assert_eq!(decoded, datum);
        prop_assert!(rest.is_empty());
    }

    #[test]
    fn prop_text_round_trip(datum in event()) {
        let codec = event_codec();
        let mut buf = Vec::new();
        codec.text_encode(&mut buf, &datum).expect("encode");
        prop_assert!(buf.is_ascii());
        let (decoded, rest) = codec.text_decode(&buf).expect("decode");
        prop_assert_eq!(decoded, datum);
        prop_assert!(rest.is_empty());
    }

    #[test]
    fn prop_binary_prefixes_underflow(datum in event()) {
        let codec = event_codec();
        let mut buf = Vec::new();
        codec.binary_encode(&mut buf, &datum).expect("encode");
        for cut in 0..buf.len() {
            let err = codec.binary_decode(&buf[..cut]).expect_err("strict prefix");
            let underflow = matches!(err.root_cause(), AvroError::BufferUnderflow { .. });
            prop_assert!(underflow, "prefix {} of {}: {}", cut, buf.len(), err);
        }
    }

    #[test]
    fn prop_text_prefixes_fail(datum in event()) {
        let codec = event_codec();
        let mut buf = Vec::new();
        codec.text_encode(&mut buf, &datum).expect("encode");
        for cut in 0..buf.len() {
            prop_assert!(codec.text_decode(&buf[..cut]).is_err());
        }
    }

    #[test]
    fn prop_garbage_never_panics(input in prop::collection::vec(any::<u8>(), 0..256)) {
        let event = event_codec();
        let list = Codec::new(LIST).expect("list schema compiles");
        let _ = event.binary_decode(&input);
        let _ = event.text_decode(&input);
        let _ = list.binary_decode(&input);
        let _ = list.text_decode(&input);
    }

    #[test]
    fn prop_long_is_single_zigzag_varint(value in any::<i64>()) {
        let codec = Codec::new("long").expect("compile");
        let mut buf = Vec::new();
        codec.binary_encode(&mut buf, &Value::Long(value)).expect("encode");
        prop_assert!(!buf.is_empty() && buf.len() <= 10);
        prop_assert_eq!(buf.last().map(|b| b & 0x80), Some(0));
        prop_assert_eq!(codec.binary_decode(&buf).expect("decode").0, Value::Long(value));
    }
}

#[test]
fn one_codec_serves_many_threads() {
    let codec = Codec::with_options(
        r#"{"type":"array","items":"long"}"#,
        CodecOptions::default().with_max_block_count(16),
    )
    .expect("compile");
    thread::scope(|scope| {
        for worker in 0..4i64 {
            let codec = codec.clone();
            scope.spawn(move || {
                for round in 0..64i64 {
                    let datum = Value::Array((0..round).map(|n| Value::Long(n * worker)).collect());
                    let bytes = codec.encode_to_bytes(&datum).expect("encode");
                    let (decoded, rest) = codec.binary_decode(&bytes).expect("decode");
                    assert_eq!(decoded, datum);
                    assert!(rest.is_empty());
                }
            });
        }
    });
}
