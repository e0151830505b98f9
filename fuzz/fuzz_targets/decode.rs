#![no_main]

use libfuzzer_sys::fuzz_target;
use spark_codec_avro::{Codec, CodecOptions};
use std::sync::OnceLock;

/// 覆盖全部类型种类的自引用 schema。
///
/// - **Why**：块计数、union 下标、长度前缀与嵌套深度都直接取自输入，是恶意数据最先触达的位置；
/// - **What**：任意字节只允许得到 `Ok` 或 `Err`，不允许 panic、越界或无界分配；
/// - **How**：集合元素均非零宽，块计数上限调低以缩短单次执行时间。
const SCHEMA: &str = r#"{
    "type": "record",
    "name": "tree",
    "namespace": "fuzz",
    "fields": [
        {"name": "label", "type": "string"},
        {"name": "weight", "type": ["null", "int", "double"]},
        {"name": "blob", "type": "bytes"},
        {"name": "digest", "type": {"type": "fixed", "name": "digest", "size": 3}},
        {"name": "kind", "type": {"type": "enum", "name": "kind", "symbols": ["LEAF", "NODE"]}},
        {"name": "attrs", "type": {"type": "map", "values": "long"}},
        {"name": "children", "type": {"type": "array", "items": "tree"}}
    ]
}"#;

fn codec() -> &'static Codec {
    static CODEC: OnceLock<Codec> = OnceLock::new();
    CODEC.get_or_init(|| {
        let options = CodecOptions::default()
            .with_max_block_count(4096)
            .with_max_nesting_depth(64);
        match Codec::with_options(SCHEMA, options) {
            Ok(codec) => codec,
            Err(err) => panic!("fuzz schema ought to compile: {err}"),
        }
    })
}

fuzz_target!(|data: &[u8]| {
    let codec = codec();
    if let Ok((value, rest)) = codec.binary_decode(data) {
        assert!(rest.len() <= data.len());
        let mut buf = Vec::new();
        codec
            .binary_encode(&mut buf, &value)
            .expect("decoded value re-encodes");
    }
    if let Ok((value, _)) = codec.text_decode(data) {
        let mut buf = Vec::new();
        codec
            .text_encode(&mut buf, &value)
            .expect("decoded value re-encodes as text");
    }
});
