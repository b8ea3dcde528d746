//! Literals sections of Compressed blocks.
//!
//! Covers:
//! - header-only classification (`header`)
//! - full decoding with a carried Huffman table (`decode`)
//! - frame-wide iteration with a size cross-check (`iter`)
//! - recompression with repeat-mode table reuse (`compress`)

pub mod compress;
pub mod decode;
pub mod header;
pub mod iter;
pub mod types;

pub use compress::{compress_literals, HufEntropy, LiteralsCompressor};
pub use decode::{LiteralsDecode, LiteralsDecoder};
pub use header::decode_literals_header;
pub use iter::{decode_all_literals, for_each_literals_block, for_each_literals_block_with};
pub use types::LiteralsBlockType;
