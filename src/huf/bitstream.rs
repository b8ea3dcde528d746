//! Bit-level I/O for the Huffman and FSE coders.
//!
//! - [`BitWriter`] appends values LSB-first. Entropy streams are closed
//!   with a single `1` marker bit so the reader can find where they end.
//! - [`BackwardBitReader`] consumes a closed stream from its last byte
//!   towards its first, returning the most recently written bits first.
//! - [`ForwardBitReader`] reads LSB-first from the start (FSE table headers).

use crate::error::{Result, ZlitsError};

/// Index of the highest set bit of `v`. `v` must be non-zero.
#[inline]
pub fn highbit32(v: u32) -> u32 {
    debug_assert!(v != 0);
    31 - v.leading_zeros()
}

#[inline]
fn mask(nb_bits: u32) -> u64 {
    if nb_bits >= 64 {
        u64::MAX
    } else {
        (1u64 << nb_bits) - 1
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Writer
// ─────────────────────────────────────────────────────────────────────────────

/// LSB-first bit accumulator backed by a growable byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    acc: u64,
    nb: u32,
}

impl BitWriter {
    pub fn with_capacity(bytes: usize) -> Self {
        BitWriter {
            out: Vec::with_capacity(bytes),
            acc: 0,
            nb: 0,
        }
    }

    /// Append the low `nb_bits` bits of `value`; `nb_bits` ≤ 32.
    #[inline]
    pub fn add_bits(&mut self, value: u64, nb_bits: u32) {
        debug_assert!(nb_bits <= 32);
        self.acc |= (value & mask(nb_bits)) << self.nb;
        self.nb += nb_bits;
        while self.nb >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.nb -= 8;
        }
    }

    /// Bytes the stream would occupy if finished now.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.out.len() + usize::from(self.nb > 0)
    }

    /// Flush the partial byte, zero-padded, without an end marker.
    pub fn finish(mut self) -> Vec<u8> {
        if self.nb > 0 {
            self.out.push(self.acc as u8);
        }
        self.out
    }

    /// Append the end marker and flush.
    pub fn close(mut self) -> Vec<u8> {
        self.add_bits(1, 1);
        self.finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backward reader
// ─────────────────────────────────────────────────────────────────────────────

/// Reads a closed bitstream from its end.
///
/// Bits below the start of the buffer read as zero. Consuming them is
/// allowed and shows up as [`overflowed`](Self::overflowed); FSE decoding
/// uses that to detect the end of its stream.
#[derive(Debug, Clone)]
pub struct BackwardBitReader<'a> {
    src: &'a [u8],
    /// Unread bits below the current position; negative once overrun.
    remaining: i64,
}

impl<'a> BackwardBitReader<'a> {
    /// Position the reader just below the end marker of `src`.
    ///
    /// `CorruptInput` when `src` is empty or its last byte is zero.
    pub fn new(src: &'a [u8]) -> Result<Self> {
        let last = *src.last().ok_or(ZlitsError::CorruptInput)?;
        if last == 0 {
            return Err(ZlitsError::CorruptInput);
        }
        let marker = highbit32(u32::from(last)) as i64;
        Ok(BackwardBitReader {
            src,
            remaining: (src.len() as i64 - 1) * 8 + marker,
        })
    }

    /// Look at the next `nb_bits` bits (≤ 32) without consuming them.
    #[inline]
    pub fn peek(&self, nb_bits: u32) -> u64 {
        if nb_bits == 0 || self.remaining <= 0 {
            return 0;
        }
        let hi = self.remaining;
        let lo = hi - i64::from(nb_bits);
        let start = lo.max(0) as usize;
        let width = (hi as usize - start) as u32;
        let first = start / 8;
        let shift = (start % 8) as u32;

        let mut word = 0u64;
        for (i, &b) in self.src[first..].iter().take(8).enumerate() {
            word |= u64::from(b) << (8 * i);
        }
        let value = (word >> shift) & mask(width);
        // Zero-fill the bits that would lie before the buffer start.
        value << (start as i64 - lo)
    }

    #[inline]
    pub fn skip(&mut self, nb_bits: u32) {
        self.remaining -= i64::from(nb_bits);
    }

    #[inline]
    pub fn read(&mut self, nb_bits: u32) -> u64 {
        let v = self.peek(nb_bits);
        self.skip(nb_bits);
        v
    }

    /// Every bit has been consumed, and no more.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// More bits were consumed than the stream holds.
    #[inline]
    pub fn overflowed(&self) -> bool {
        self.remaining < 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Forward reader
// ─────────────────────────────────────────────────────────────────────────────

/// LSB-first reader. Bits past the end read as zero; callers compare
/// [`consumed_bytes`](Self::consumed_bytes) with the input length.
#[derive(Debug, Clone)]
pub struct ForwardBitReader<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> ForwardBitReader<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        ForwardBitReader { src, pos: 0 }
    }

    /// Look at the next `nb_bits` bits (≤ 32).
    #[inline]
    pub fn peek(&self, nb_bits: u32) -> u32 {
        let first = self.pos / 8;
        let shift = (self.pos % 8) as u32;
        let mut word = 0u64;
        for (i, &b) in self.src.iter().skip(first).take(5).enumerate() {
            word |= u64::from(b) << (8 * i);
        }
        ((word >> shift) & mask(nb_bits)) as u32
    }

    #[inline]
    pub fn skip(&mut self, nb_bits: u32) {
        self.pos += nb_bits as usize;
    }

    #[inline]
    pub fn read(&mut self, nb_bits: u32) -> u32 {
        let v = self.peek(nb_bits);
        self.skip(nb_bits);
        v
    }

    /// Bytes touched so far, rounding a partial byte up.
    #[inline]
    pub fn consumed_bytes(&self) -> usize {
        (self.pos + 7) / 8
    }
}
