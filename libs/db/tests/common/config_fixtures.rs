/// Shared configuration fixtures for options builder integration tests
///
/// Used by:
/// - test_options_builder.rs
/// - test_shared_cache_concurrent.rs
/// - test_open_with_options.rs
use lodestone_db::ConfigSource;
use serde_json::{json, Value};

/// The minimal document: default shared cache, one base option.
pub fn base_document() -> Value {
    json!({
        "global": {
            "object_count": 42,
            "statistics": true,
            "shared_cache": {}
        },
        "base": {
            "write_buffer_size": 1048576
        }
    })
}

/// `base_document` with extra top-level entries merged in.
pub fn document_with(extra: Value) -> Value {
    let mut doc = base_document();
    let root = doc.as_object_mut().expect("fixture root is an object");
    if let Value::Object(extra) = extra {
        for (key, value) in extra {
            root.insert(key, value);
        }
    }
    doc
}

/// A document exercising every standard option.
pub fn full_document() -> Value {
    json!({
        "global": {
            "object_count": 62000,
            "statistics": false,
            "shared_cache": { "capacity": 8388608, "num_shard_bits": 2 }
        },
        "base": {
            "allow_mmap_reads": false,
            "write_buffer_size": 2097152,
            "max_bytes_for_level_base": 10485760,
            "target_file_size_base": 2097152,
            "max_write_buffer_number": 4,
            "max_background_compactions": 2,
            "max_background_flushes": 1,
            "min_write_buffer_number_to_merge": 1,
            "increase_parallelism": true,
            "block_based_table_options": {
                "block_size": 8192,
                "bloom_filter_policy": { "bits_per_key": 10, "use_block_based_builder": false }
            }
        },
        "accounts": {
            "write_buffer_size": 4194304,
            "block_based_table_options": { "block_size": 16384 }
        }
    })
}

pub fn source(doc: Value) -> ConfigSource {
    ConfigSource::from(doc)
}
