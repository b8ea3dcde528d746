//! Block-level traversal of a single Zstandard frame.
//!
//! [`walk_blocks`] hands each block (header included) to a visitor without
//! decoding any payload. [`find_frame_compressed_size`] uses the same walk to
//! measure where a frame ends, so concatenated frames can be split.

use crate::error::{Result, ZlitsError};
use crate::frame::header::{
    frame_header_size, is_skippable_frame, parse_block_header, parse_frame_header,
    skippable_frame_size,
};
use crate::frame::types::{BlockType, IterationCommand, ZSTD_CHECKSUM_SIZE};

/// Visit every block of the frame at the start of `frame`.
///
/// The visitor receives the block bytes (3-byte header plus payload) and the
/// block type. Returning [`IterationCommand::Break`] ends the walk early; the
/// block that requested the break is not counted. The walk also ends after
/// the block carrying the last-block flag.
///
/// Returns the number of blocks visited.
///
/// # Errors
/// - `CorruptInput` / `SizeMismatch` from the frame header
/// - `SizeMismatch` when a block header or its declared payload runs past
///   the end of `frame`; the visitor is not called for that block
/// - `UnsupportedState` on the reserved block type
/// - any error returned by the visitor
pub fn walk_blocks<F>(frame: &[u8], mut visitor: F) -> Result<usize>
where
    F: FnMut(&[u8], BlockType) -> Result<IterationCommand>,
{
    let mut pos = frame_header_size(frame)?;
    if pos > frame.len() {
        return Err(ZlitsError::SizeMismatch);
    }

    let mut blocks = 0usize;
    loop {
        let remaining = &frame[pos..];
        let bh = parse_block_header(remaining)?;
        let block_size = bh.block_size();
        if block_size > remaining.len() {
            return Err(ZlitsError::SizeMismatch);
        }

        if visitor(&remaining[..block_size], bh.block_type)? == IterationCommand::Break {
            break;
        }

        pos += block_size;
        blocks += 1;

        if bh.last {
            break;
        }
    }
    Ok(blocks)
}

/// Total size of the frame at the start of `src`: header, every block and
/// the optional content checksum.
pub fn find_frame_compressed_size(src: &[u8]) -> Result<usize> {
    let fh = parse_frame_header(src)?;
    let mut size = fh.header_size;
    walk_blocks(src, |block, _| {
        size += block.len();
        Ok(IterationCommand::Continue)
    })?;
    if fh.checksum_flag {
        size += ZSTD_CHECKSUM_SIZE;
        if size > src.len() {
            return Err(ZlitsError::SizeMismatch);
        }
    }
    Ok(size)
}

/// Split a buffer of concatenated frames into the standard frames it holds.
/// Skippable frames are stepped over.
pub fn split_frames(src: &[u8]) -> Result<Vec<&[u8]>> {
    let mut frames = Vec::new();
    let mut pos = 0usize;
    while pos < src.len() {
        let rest = &src[pos..];
        if is_skippable_frame(rest) {
            pos += skippable_frame_size(rest)?;
            continue;
        }
        let size = find_frame_compressed_size(rest)?;
        frames.push(&rest[..size]);
        pos += size;
    }
    Ok(frames)
}
