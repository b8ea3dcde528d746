//! Header-only literals classification.
//!
//! [`decode_literals_header`] sizes the literals section of a Compressed
//! block from its header bytes alone, without touching the Huffman payload.

use crate::error::{Result, ZlitsError};
use crate::frame::header::parse_block_header;
use crate::frame::types::{BlockType, ZSTD_BLOCKHEADERSIZE};
use crate::literals::types::{literals_header_layout, literals_header_word, LiteralsBlockType};

/// Smallest payload that can hold any literals header plus its content.
pub const LITERALS_SECTION_MIN: usize = 3;

/// Smallest payload holding a Huffman-coded literals header.
pub const LITERALS_SECTION_MIN_HUF: usize = 5;

/// Locate and classify the literals section of `block` (header included).
///
/// Returns the literals section bytes (literals header plus payload, still
/// compressed) and their encoding type.
///
/// # Errors
/// - block header errors from [`parse_block_header`]
/// - `CorruptInput` when the block is not Compressed, its payload is too
///   small for a literals header, or the section overruns the payload
/// - `SizeMismatch` when the declared payload runs past the end of `block`
pub fn decode_literals_header(block: &[u8]) -> Result<(&[u8], LiteralsBlockType)> {
    let bh = parse_block_header(block)?;
    if bh.block_type != BlockType::Compressed {
        return Err(ZlitsError::CorruptInput);
    }
    let csize = bh.payload_size;
    if csize + ZSTD_BLOCKHEADERSIZE > block.len() {
        return Err(ZlitsError::SizeMismatch);
    }
    if csize < LITERALS_SECTION_MIN {
        return Err(ZlitsError::CorruptInput);
    }
    let payload = &block[ZSTD_BLOCKHEADERSIZE..ZSTD_BLOCKHEADERSIZE + csize];

    let (ty, layout) = literals_header_layout(payload[0]);
    if ty.is_entropy_coded() && csize < LITERALS_SECTION_MIN_HUF {
        return Err(ZlitsError::CorruptInput);
    }
    let word = literals_header_word(payload, layout.header_len);
    let section = layout.header_len + layout.payload_size(ty, word);
    if section > csize {
        return Err(ZlitsError::CorruptInput);
    }
    Ok((&payload[..section], ty))
}
