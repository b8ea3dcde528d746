//! Huffman coding for literals (RFC 8878 §4.2).
//!
//! Covers:
//! - table construction with a maximum code length (`compress`)
//! - table descriptions, direct or FSE-compressed weights (`compress`,
//!   `decompress`, `fse`)
//! - 1-stream and 4-stream payloads, decoded one or two symbols per lookup
//! - repeat-aware compression used by the literals recompressor

pub mod bitstream;
pub mod compress;
pub mod decompress;
pub mod fse;
pub mod types;

pub use compress::{compress_repeat, histogram, HufCElt, HufCTable, Histogram, RepeatOptions};
pub use decompress::{read_stats, HufDTable, HufStats};
pub use types::{HufDecompressMode, HufRepeat, HufStreams, HUF_4X_JUMP_TABLE_SIZE};
