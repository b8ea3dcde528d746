//! Literals compression with cross-call table reuse.
//!
//! Covers:
//! - `HufEntropy`, the Huffman state carried from one block to the next
//! - `compress_literals`, a pure transition `(previous state, literals) →
//!   (section bytes, next state)`
//! - `LiteralsCompressor`, a reusable context owning the output buffer and
//!   the carried state
//!
//! The section produced is a complete literals section: header followed by
//! Raw bytes, the RLE byte, or a Huffman payload (with or without a table
//! description, depending on repeat mode).

use crate::config::{
    BLOCKSIZE_MAX, HUF_SYMBOLVALUE_MAX, HUF_TABLELOG_DEFAULT, MIN_LITERALS_TO_COMPRESS,
    MIN_LITERALS_TO_COMPRESS_REPEAT, PREFER_REPEAT_MAX_SIZE, RECOMPRESS_CAPACITY,
};
use crate::displaylevel;
use crate::error::{Result, ZlitsError};
use crate::frame::header::{write_le16, write_le24, write_le32};
use crate::huf::{compress_repeat, HufCTable, HufRepeat, HufStreams, RepeatOptions};
use crate::literals::types::LiteralsBlockType;
use crate::probe::has_fast_bit_ops;

/// Huffman state carried between consecutive literals sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HufEntropy {
    /// Last table written to the output, if any.
    pub table: Option<HufCTable>,
    /// Whether `table` may be reused as-is.
    pub repeat: HufRepeat,
}

impl HufEntropy {
    /// No table available.
    pub fn none() -> Self {
        HufEntropy::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw and RLE sections
// ─────────────────────────────────────────────────────────────────────────────

/// Header length for a Raw or RLE section regenerating `size` bytes.
#[inline]
fn raw_header_len(size: usize) -> usize {
    1 + usize::from(size > 31) + usize::from(size > 4095)
}

fn write_raw_header(dst: &mut [u8], ty: LiteralsBlockType, size: usize) -> usize {
    let fl = raw_header_len(size);
    let ty = ty as u32;
    let size = size as u32;
    match fl {
        1 => dst[0] = (ty + (size << 3)) as u8,
        2 => write_le16(dst, 0, (ty + (1 << 2) + (size << 4)) as u16),
        _ => write_le24(dst, 0, ty + (3 << 2) + (size << 4)),
    }
    fl
}

/// Store `src` verbatim.
pub fn store_raw_literals(dst: &mut [u8], src: &[u8]) -> Result<usize> {
    let fl = raw_header_len(src.len());
    if fl + src.len() > dst.len() {
        return Err(ZlitsError::DstTooSmall);
    }
    write_raw_header(dst, LiteralsBlockType::Raw, src.len());
    dst[fl..fl + src.len()].copy_from_slice(src);
    Ok(fl + src.len())
}

/// Store `src`, a run of one byte value, as RLE.
pub fn store_rle_literals(dst: &mut [u8], src: &[u8]) -> Result<usize> {
    let first = *src.first().ok_or(ZlitsError::ParameterInvalid)?;
    let fl = raw_header_len(src.len());
    if fl + 1 > dst.len() {
        return Err(ZlitsError::DstTooSmall);
    }
    write_raw_header(dst, LiteralsBlockType::Rle, src.len());
    dst[fl] = first;
    Ok(fl + 1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Huffman sections
// ─────────────────────────────────────────────────────────────────────────────

fn write_huf_header(
    dst: &mut [u8],
    ty: LiteralsBlockType,
    lh_size: usize,
    single_stream: bool,
    src_size: usize,
    c_size: usize,
) {
    let ty = ty as u32;
    let src_size = src_size as u32;
    let c_size = c_size as u32;
    match lh_size {
        3 => {
            let lhc = ty + (u32::from(!single_stream) << 2) + (src_size << 4) + (c_size << 14);
            write_le24(dst, 0, lhc);
        }
        4 => {
            let lhc = ty + (2 << 2) + (src_size << 4) + (c_size << 18);
            write_le32(dst, 0, lhc);
        }
        _ => {
            let lhc = ty + (3 << 2) + (src_size << 4) + (c_size << 22);
            write_le32(dst, 0, lhc);
            dst[4] = (c_size >> 10) as u8;
        }
    }
}

/// Bytes a Huffman section must save over Raw to be worth emitting.
#[inline]
fn min_gain(src_size: usize) -> usize {
    (src_size >> 6) + 2
}

/// Compress one literals section.
///
/// `prev` is left untouched; the state to carry into the next call is
/// returned next to the section size. Huffman coding is attempted only when
/// it can pay off; otherwise, or when it fails to gain enough, the literals
/// are stored Raw (or RLE for a single repeated byte) and `prev` carries
/// over unchanged.
///
/// `suspect_uncompressible` lets large inputs be rejected from a sample.
/// It can change the encoding chosen, never its validity.
pub fn compress_literals(
    prev: &HufEntropy,
    dst: &mut [u8],
    src: &[u8],
    suspect_uncompressible: bool,
) -> Result<(usize, HufEntropy)> {
    let src_size = src.len();
    if src_size > BLOCKSIZE_MAX {
        return Err(ZlitsError::SizeMismatch);
    }
    let lh_size = 3 + usize::from(src_size >= 1024) + usize::from(src_size >= 16 * 1024);
    let mut single_stream = src_size < 256;

    let min_lit_size = if prev.repeat == HufRepeat::Valid {
        MIN_LITERALS_TO_COMPRESS_REPEAT
    } else {
        MIN_LITERALS_TO_COMPRESS
    };
    if src_size < min_lit_size {
        return Ok((store_raw_literals(dst, src)?, prev.clone()));
    }
    if dst.len() < lh_size + 1 {
        return Err(ZlitsError::DstTooSmall);
    }

    let mut next = prev.clone();
    let mut repeat = prev.repeat;
    if repeat == HufRepeat::Valid && lh_size == 3 {
        single_stream = true;
    }
    let opts = RepeatOptions {
        max_symbol: HUF_SYMBOLVALUE_MAX,
        huff_log: HUF_TABLELOG_DEFAULT,
        streams: if single_stream {
            HufStreams::Single
        } else {
            HufStreams::Four
        },
        prefer_repeat: src_size <= PREFER_REPEAT_MAX_SIZE,
        suspect_uncompressible,
    };
    let c_lit = compress_repeat(&mut dst[lh_size..], src, opts, &mut next.table, &mut repeat);
    let h_type = if repeat != HufRepeat::None {
        LiteralsBlockType::Repeat
    } else {
        LiteralsBlockType::Compressed
    };

    let c_lit = match c_lit {
        Ok(0) | Err(_) => None,
        Ok(n) if n >= src_size - min_gain(src_size) => None,
        Ok(n) => Some(n),
    };
    let Some(c_lit) = c_lit else {
        return Ok((store_raw_literals(dst, src)?, prev.clone()));
    };
    if c_lit == 1 {
        return Ok((store_rle_literals(dst, src)?, prev.clone()));
    }

    if h_type == LiteralsBlockType::Compressed {
        next.repeat = HufRepeat::Check;
    }
    displaylevel!(
        4,
        "literals: {} -> {} bytes, {} (repeat {} -> {})\n",
        src_size,
        lh_size + c_lit,
        h_type.name(),
        prev.repeat.name(),
        next.repeat.name()
    );
    write_huf_header(dst, h_type, lh_size, single_stream, src_size, c_lit);
    Ok((lh_size + c_lit, next))
}

// ─────────────────────────────────────────────────────────────────────────────
// Recompression context
// ─────────────────────────────────────────────────────────────────────────────

/// Reusable literals compressor.
///
/// Each [`recompress`](Self::recompress) call compresses one literals
/// stream into the context's output buffer and carries the resulting
/// Huffman state into the next call, so consecutive streams with similar
/// statistics can share a table. A context is not meant to be shared
/// between threads; create one per worker.
#[derive(Debug)]
pub struct LiteralsCompressor {
    entropy: HufEntropy,
    dst: Vec<u8>,
    len: usize,
    fast_bit_ops: bool,
}

impl LiteralsCompressor {
    /// Allocate a context with no table to repeat.
    pub fn new() -> Result<Self> {
        let mut dst = Vec::new();
        dst.try_reserve_exact(RECOMPRESS_CAPACITY)
            .map_err(|_| ZlitsError::OutOfMemory)?;
        dst.resize(RECOMPRESS_CAPACITY, 0);
        Ok(LiteralsCompressor {
            entropy: HufEntropy::none(),
            dst,
            len: 0,
            fast_bit_ops: has_fast_bit_ops(),
        })
    }

    /// Compress `src` into the output buffer and return the section size.
    ///
    /// `SizeMismatch` when `src` exceeds the maximum block size. On error
    /// the carried state is unchanged.
    pub fn recompress(&mut self, src: &[u8], suspect_uncompressible: bool) -> Result<usize> {
        if src.len() > BLOCKSIZE_MAX {
            return Err(ZlitsError::SizeMismatch);
        }
        let (size, next) = compress_literals(&self.entropy, &mut self.dst, src, suspect_uncompressible)?;
        self.entropy = next;
        self.len = size;
        Ok(size)
    }

    /// Section written by the last successful [`recompress`](Self::recompress).
    pub fn output(&self) -> &[u8] {
        &self.dst[..self.len]
    }

    /// Huffman state that the next call will start from.
    pub fn tables(&self) -> &HufEntropy {
        &self.entropy
    }

    /// Drop the carried table so the next call starts from scratch.
    pub fn reset_tables(&mut self) {
        self.entropy = HufEntropy::none();
    }

    /// CPU capability probed when the context was created.
    pub fn has_fast_bit_ops(&self) -> bool {
        self.fast_bit_ops
    }

    /// Output buffer size.
    pub fn capacity(&self) -> usize {
        self.dst.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(n: usize) -> Vec<u8> {
        b"literals are the bytes that matches could not cover; "
            .iter()
            .copied()
            .cycle()
            .take(n)
            .collect()
    }

    #[test]
    fn raw_headers_by_size() {
        let mut dst = [0u8; 8];
        assert_eq!(write_raw_header(&mut dst, LiteralsBlockType::Raw, 31), 1);
        assert_eq!(dst[0], 31 << 3);
        assert_eq!(write_raw_header(&mut dst, LiteralsBlockType::Rle, 32), 2);
        assert_eq!(u16::from_le_bytes([dst[0], dst[1]]), 1 | (1 << 2) | (32 << 4));
        assert_eq!(write_raw_header(&mut dst, LiteralsBlockType::Raw, 4096), 3);
    }

    #[test]
    fn short_input_is_stored_raw() {
        let mut dst = vec![0u8; 128];
        let (n, next) = compress_literals(&HufEntropy::none(), &mut dst, b"tiny", false).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&dst[1..5], b"tiny");
        assert_eq!(next, HufEntropy::none());
    }

    #[test]
    fn run_is_stored_rle() {
        let mut dst = vec![0u8; 256];
        let (n, next) = compress_literals(&HufEntropy::none(), &mut dst, &[b'k'; 100], false).unwrap();
        assert_eq!(n, 3);
        assert_eq!(dst[0] & 3, LiteralsBlockType::Rle as u8);
        assert_eq!(dst[2], b'k');
        assert_eq!(next.repeat, HufRepeat::None);
    }

    #[test]
    fn text_is_huffman_coded_and_table_kept() {
        let src = text(2000);
        let mut dst = vec![0u8; 4096];
        let (n, next) = compress_literals(&HufEntropy::none(), &mut dst, &src, false).unwrap();
        assert!(n < src.len());
        assert_eq!(dst[0] & 3, LiteralsBlockType::Compressed as u8);
        assert_eq!(next.repeat, HufRepeat::Check);
        assert!(next.table.is_some());
    }

    #[test]
    fn small_similar_input_repeats_table() {
        let mut ctx = LiteralsCompressor::new().unwrap();
        ctx.recompress(&text(2000), false).unwrap();
        let first = ctx.tables().clone();
        ctx.recompress(&text(500), false).unwrap();
        assert_eq!(ctx.output()[0] & 3, LiteralsBlockType::Repeat as u8);
        assert_eq!(ctx.tables(), &first);
    }

    #[test]
    fn failed_call_keeps_state() {
        let mut ctx = LiteralsCompressor::new().unwrap();
        ctx.recompress(&text(2000), false).unwrap();
        let before = ctx.tables().clone();
        let big = vec![0u8; BLOCKSIZE_MAX + 1];
        assert_eq!(ctx.recompress(&big, false), Err(ZlitsError::SizeMismatch));
        assert_eq!(ctx.tables(), &before);
        ctx.reset_tables();
        assert_eq!(ctx.tables(), &HufEntropy::none());
    }
}
