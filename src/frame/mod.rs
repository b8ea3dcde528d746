//! Zstandard frame format: header parsing and block traversal.
//!
//! Nothing in this module decodes block payloads; it only locates them.

pub mod header;
pub mod types;
pub mod walk;

pub use header::{
    frame_header_size, is_skippable_frame, parse_block_header, parse_frame_header,
    skippable_frame_size,
};
pub use types::{BlockHeader, BlockType, FrameHeader, IterationCommand};
pub use walk::{find_frame_compressed_size, split_frames, walk_blocks};
