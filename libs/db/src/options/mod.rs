//! Option dispatch and the per-index options builder.

mod builder;
mod dispatch;

pub use builder::{gather_statistics, object_count, OptionsBuilder, OBJECT_COUNT, STATISTICS};
pub use dispatch::{
    ApplyContext, OptionApplier, OptionTable, StandardOption, ALLOW_MMAP_READS, BITS_PER_KEY,
    BLOCK_BASED_TABLE_OPTIONS, BLOCK_SIZE, BLOOM_FILTER_POLICY, INCREASE_PARALLELISM,
    MAX_BACKGROUND_COMPACTIONS, MAX_BACKGROUND_FLUSHES, MAX_BYTES_FOR_LEVEL_BASE,
    MAX_WRITE_BUFFER_NUMBER, MIN_WRITE_BUFFER_NUMBER_TO_MERGE, OPTIMIZE_LEVEL_STYLE_COMPACTION,
    TARGET_FILE_SIZE_BASE, USE_BLOCK_BASED_BUILDER, WRITE_BUFFER_SIZE,
};
