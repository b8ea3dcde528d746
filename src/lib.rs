// zlits: Zstandard frame walking, literals inspection and literals recompression

pub mod config;
pub mod error;
pub mod frame;
pub mod huf;
pub mod literals;
pub mod probe;
pub mod bench;
pub mod util;
pub mod xxhash;
pub mod cli;

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use error::{Result, ZlitsError};
pub use frame::{walk_blocks, BlockType, IterationCommand};
pub use literals::{
    decode_literals_header, for_each_literals_block, LiteralsBlockType, LiteralsCompressor,
};
pub use probe::{
    has_fast_bit_ops, sizeof_compression_table, sizeof_decompression_table,
    sizeof_table_build_workspace,
};
