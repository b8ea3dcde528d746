//! Byte-order helpers and frame/block header parsing.
//!
//! Covers:
//! - LE read helpers (`read_le16`, `read_le24`, `read_le32`, `read_le64`)
//! - `frame_header_size`: header length from the first five bytes
//! - `parse_frame_header`: full decode of the frame header fields
//! - `parse_block_header`: decode of a 3-byte block header
//! - Skippable frame detection and sizing

use crate::error::{Result, ZlitsError};
use crate::frame::types::{
    BlockHeader, BlockType, FrameHeader, DID_FIELD_SIZE, FCS_FIELD_SIZE, FHD_RESERVED_BIT,
    ZSTD_BLOCKHEADERSIZE, ZSTD_FRAMEHEADERSIZE_PREFIX, ZSTD_MAGICNUMBER,
    ZSTD_MAGIC_SKIPPABLE_MASK, ZSTD_MAGIC_SKIPPABLE_START, ZSTD_SKIPPABLEHEADERSIZE,
    ZSTD_WINDOWLOG_ABSOLUTEMIN, ZSTD_WINDOWLOG_MAX,
};

// ─────────────────────────────────────────────────────────────────────────────
// Byte-order helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read a little-endian `u16` from `src` at byte `offset`.
#[inline]
pub fn read_le16(src: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([src[offset], src[offset + 1]])
}

/// Read a little-endian 24-bit value from `src` at byte `offset`.
#[inline]
pub fn read_le24(src: &[u8], offset: usize) -> u32 {
    u32::from(src[offset]) | u32::from(src[offset + 1]) << 8 | u32::from(src[offset + 2]) << 16
}

/// Read a little-endian `u32` from `src` at byte `offset`.
#[inline]
pub fn read_le32(src: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        src[offset],
        src[offset + 1],
        src[offset + 2],
        src[offset + 3],
    ])
}

/// Read a little-endian `u64` from `src` at byte `offset`.
#[inline]
pub fn read_le64(src: &[u8], offset: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&src[offset..offset + 8]);
    u64::from_le_bytes(b)
}

/// Write a little-endian `u16` into `dst` at byte `offset`.
#[inline]
pub fn write_le16(dst: &mut [u8], offset: usize, value: u16) {
    dst[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Write the low 24 bits of `value` into `dst` at byte `offset`.
#[inline]
pub fn write_le24(dst: &mut [u8], offset: usize, value: u32) {
    dst[offset..offset + 3].copy_from_slice(&value.to_le_bytes()[..3]);
}

/// Write a little-endian `u32` into `dst` at byte `offset`.
#[inline]
pub fn write_le32(dst: &mut [u8], offset: usize, value: u32) {
    dst[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame header
// ─────────────────────────────────────────────────────────────────────────────

/// Length of the frame header starting at `src[0]`, magic included.
///
/// Needs only the magic and the frame header descriptor. Returns
/// `SizeMismatch` when fewer than 5 bytes are available and `CorruptInput`
/// when the magic is wrong or the descriptor's reserved bit is set.
pub fn frame_header_size(src: &[u8]) -> Result<usize> {
    if src.len() < ZSTD_FRAMEHEADERSIZE_PREFIX {
        return Err(ZlitsError::SizeMismatch);
    }
    if read_le32(src, 0) != ZSTD_MAGICNUMBER {
        return Err(ZlitsError::CorruptInput);
    }
    let fhd = src[4];
    if fhd & FHD_RESERVED_BIT != 0 {
        return Err(ZlitsError::CorruptInput);
    }
    let dict_id_flag = (fhd & 3) as usize;
    let single_segment = (fhd >> 5) & 1 == 1;
    let fcs_id = (fhd >> 6) as usize;
    Ok(ZSTD_FRAMEHEADERSIZE_PREFIX
        + usize::from(!single_segment)
        + DID_FIELD_SIZE[dict_id_flag]
        + FCS_FIELD_SIZE[fcs_id]
        + usize::from(single_segment && fcs_id == 0))
}

/// Decode every field of the frame header starting at `src[0]`.
pub fn parse_frame_header(src: &[u8]) -> Result<FrameHeader> {
    let header_size = frame_header_size(src)?;
    if src.len() < header_size {
        return Err(ZlitsError::SizeMismatch);
    }

    let fhd = src[4];
    let dict_id_flag = (fhd & 3) as usize;
    let checksum_flag = (fhd >> 2) & 1 == 1;
    let single_segment = (fhd >> 5) & 1 == 1;
    let fcs_id = (fhd >> 6) as usize;
    let mut pos = ZSTD_FRAMEHEADERSIZE_PREFIX;

    let mut window_size = 0u64;
    if !single_segment {
        let wl_byte = src[pos];
        pos += 1;
        let window_log = u32::from(wl_byte >> 3) + ZSTD_WINDOWLOG_ABSOLUTEMIN;
        if window_log > ZSTD_WINDOWLOG_MAX {
            return Err(ZlitsError::CorruptInput);
        }
        let base = 1u64 << window_log;
        window_size = base + (base >> 3) * u64::from(wl_byte & 7);
    }

    let dict_id = match DID_FIELD_SIZE[dict_id_flag] {
        1 => u32::from(src[pos]),
        2 => u32::from(read_le16(src, pos)),
        4 => read_le32(src, pos),
        _ => 0,
    };
    pos += DID_FIELD_SIZE[dict_id_flag];

    let content_size = match fcs_id {
        0 if single_segment => Some(u64::from(src[pos])),
        0 => None,
        1 => Some(u64::from(read_le16(src, pos)) + 256),
        2 => Some(u64::from(read_le32(src, pos))),
        _ => Some(read_le64(src, pos)),
    };

    if single_segment {
        // Single-segment frames size the window to the whole content.
        window_size = content_size.unwrap_or(0);
    }

    Ok(FrameHeader {
        header_size,
        content_size,
        window_size,
        dict_id,
        checksum_flag,
        single_segment,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Block header
// ─────────────────────────────────────────────────────────────────────────────

/// Decode the 3-byte block header at `src[0]`.
///
/// `SizeMismatch` when fewer than 3 bytes remain; `UnsupportedState` for the
/// reserved block type. The payload itself is not bounds-checked here.
pub fn parse_block_header(src: &[u8]) -> Result<BlockHeader> {
    if src.len() < ZSTD_BLOCKHEADERSIZE {
        return Err(ZlitsError::SizeMismatch);
    }
    let raw = read_le24(src, 0);
    let last = raw & 1 == 1;
    let content_size = raw >> 3;
    let (block_type, payload_size) = match (raw >> 1) & 3 {
        0 => (BlockType::Raw, content_size as usize),
        1 => (BlockType::Rle, 1),
        2 => (BlockType::Compressed, content_size as usize),
        _ => return Err(ZlitsError::UnsupportedState),
    };
    Ok(BlockHeader {
        last,
        block_type,
        content_size,
        payload_size,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Skippable frames
// ─────────────────────────────────────────────────────────────────────────────

/// `true` when `src` starts with a skippable-frame magic number.
pub fn is_skippable_frame(src: &[u8]) -> bool {
    src.len() >= 4 && read_le32(src, 0) & ZSTD_MAGIC_SKIPPABLE_MASK == ZSTD_MAGIC_SKIPPABLE_START
}

/// Total size of the skippable frame at `src[0]`, header included.
pub fn skippable_frame_size(src: &[u8]) -> Result<usize> {
    if src.len() < ZSTD_SKIPPABLEHEADERSIZE {
        return Err(ZlitsError::SizeMismatch);
    }
    if !is_skippable_frame(src) {
        return Err(ZlitsError::CorruptInput);
    }
    let user_size = read_le32(src, 4) as usize;
    let total = ZSTD_SKIPPABLEHEADERSIZE
        .checked_add(user_size)
        .ok_or(ZlitsError::SizeMismatch)?;
    if total > src.len() {
        return Err(ZlitsError::SizeMismatch);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_prefix(fhd: u8) -> Vec<u8> {
        let mut v = ZSTD_MAGICNUMBER.to_le_bytes().to_vec();
        v.push(fhd);
        v
    }

    #[test]
    fn header_size_table() {
        // single segment, fcs flag 0 → 1-byte FCS, no window descriptor
        assert_eq!(frame_header_size(&frame_prefix(0x20)).unwrap(), 6);
        // window descriptor only
        assert_eq!(frame_header_size(&frame_prefix(0x00)).unwrap(), 6);
        // window + 4-byte dict id + 8-byte FCS
        assert_eq!(frame_header_size(&frame_prefix(0xC3)).unwrap(), 18);
        // single segment + 2-byte FCS
        assert_eq!(frame_header_size(&frame_prefix(0x60)).unwrap(), 7);
    }

    #[test]
    fn header_size_rejects_bad_prefix() {
        assert_eq!(frame_header_size(&[0x28, 0xB5]), Err(ZlitsError::SizeMismatch));
        let mut bad = frame_prefix(0x20);
        bad[0] = 0;
        assert_eq!(frame_header_size(&bad), Err(ZlitsError::CorruptInput));
        assert_eq!(frame_header_size(&frame_prefix(0x28)), Err(ZlitsError::CorruptInput));
    }

    #[test]
    fn parse_window_descriptor() {
        // exponent 1 (→ log 11), mantissa 2: 2048 + 256 * 2
        let mut src = frame_prefix(0x00);
        src.push((1 << 3) | 2);
        let fh = parse_frame_header(&src).unwrap();
        assert_eq!(fh.window_size, 2048 + 512);
        assert_eq!(fh.content_size, None);
        assert!(!fh.single_segment);
    }

    #[test]
    fn parse_single_segment_fcs_plus_256() {
        let mut src = frame_prefix(0x60 | 0x04);
        src.extend_from_slice(&[0x10, 0x00]);
        let fh = parse_frame_header(&src).unwrap();
        assert_eq!(fh.content_size, Some(0x10 + 256));
        assert_eq!(fh.window_size, 0x110);
        assert!(fh.checksum_flag);
    }

    #[test]
    fn parse_dict_id_two_bytes() {
        let mut src = frame_prefix(0x22);
        src.extend_from_slice(&[0x34, 0x12, 0x05]);
        let fh = parse_frame_header(&src).unwrap();
        assert_eq!(fh.dict_id, 0x1234);
        assert_eq!(fh.content_size, Some(5));
    }

    #[test]
    fn parse_truncated_header_is_size_mismatch() {
        let src = frame_prefix(0xC0);
        assert_eq!(parse_frame_header(&src), Err(ZlitsError::SizeMismatch));
    }

    #[test]
    fn block_header_fields() {
        // last=1, type=Compressed(2), size=100
        let raw: u32 = 1 | (2 << 1) | (100 << 3);
        let bh = parse_block_header(&raw.to_le_bytes()[..3]).unwrap();
        assert!(bh.last);
        assert_eq!(bh.block_type, BlockType::Compressed);
        assert_eq!(bh.payload_size, 100);
        assert_eq!(bh.block_size(), 103);
    }

    #[test]
    fn rle_block_payload_is_one_byte() {
        let raw: u32 = (1 << 1) | (5000 << 3);
        let bh = parse_block_header(&raw.to_le_bytes()[..3]).unwrap();
        assert_eq!(bh.block_type, BlockType::Rle);
        assert_eq!(bh.content_size, 5000);
        assert_eq!(bh.payload_size, 1);
    }

    #[test]
    fn reserved_block_type_is_unsupported_state() {
        assert_eq!(parse_block_header(&[0x06, 0, 0]), Err(ZlitsError::UnsupportedState));
    }

    #[test]
    fn skippable_frame_sizing() {
        let mut src = 0x184D_2A5Au32.to_le_bytes().to_vec();
        src.extend_from_slice(&3u32.to_le_bytes());
        src.extend_from_slice(&[1, 2, 3, 0xFF]);
        assert!(is_skippable_frame(&src));
        assert_eq!(skippable_frame_size(&src).unwrap(), 11);
        assert_eq!(skippable_frame_size(&src[..9]), Err(ZlitsError::SizeMismatch));
    }

    #[test]
    fn le_helpers_roundtrip_layout() {
        let mut buf = [0u8; 4];
        write_le24(&mut buf, 0, 0x00AB_CDEF);
        assert_eq!(&buf[..3], &[0xEF, 0xCD, 0xAB]);
        assert_eq!(read_le24(&buf, 0), 0x00AB_CDEF);
        write_le16(&mut buf, 1, 0x1234);
        assert_eq!(read_le16(&buf, 1), 0x1234);
    }
}
