//! Literals section vocabulary (RFC 8878 §3.1.1.3.1).
//!
//! Covers:
//! - `LiteralsBlockType`, the 2-bit encoding type of a literals section
//! - `LiteralsHeaderLayout` and `literals_header_layout`, the decode table
//!   mapping (encoding type, size class) to header length and size fields

use crate::config::BLOCKSIZE_MAX;
use crate::frame::header::{read_le24, read_le32};

/// Encoding type of a literals section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LiteralsBlockType {
    /// Literals stored verbatim.
    Raw = 0,
    /// A single byte repeated `regenerated_size` times.
    Rle = 1,
    /// Huffman-coded, table description included.
    Compressed = 2,
    /// Huffman-coded with the table of a previous block.
    Repeat = 3,
}

impl LiteralsBlockType {
    /// Decode the low two bits of the first header byte.
    #[inline]
    pub fn from_bits(b: u8) -> Self {
        match b & 3 {
            0 => LiteralsBlockType::Raw,
            1 => LiteralsBlockType::Rle,
            2 => LiteralsBlockType::Compressed,
            _ => LiteralsBlockType::Repeat,
        }
    }

    /// Huffman-coded (Compressed or Repeat).
    #[inline]
    pub fn is_entropy_coded(self) -> bool {
        matches!(self, LiteralsBlockType::Compressed | LiteralsBlockType::Repeat)
    }

    pub fn name(self) -> &'static str {
        match self {
            LiteralsBlockType::Raw => "raw",
            LiteralsBlockType::Rle => "rle",
            LiteralsBlockType::Compressed => "compressed",
            LiteralsBlockType::Repeat => "repeat",
        }
    }
}

/// A size field embedded in a literals header: `width` bits starting at bit
/// `offset` of the little-endian header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeField {
    pub offset: u32,
    pub width: u32,
}

impl SizeField {
    #[inline]
    pub fn extract(self, word: u64) -> usize {
        ((word >> self.offset) & ((1u64 << self.width) - 1)) as usize
    }
}

/// Layout of a literals section header for one (type, size class) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralsHeaderLayout {
    /// Header bytes, 1 to 5.
    pub header_len: usize,
    /// Regenerated (decoded) size.
    pub regenerated: SizeField,
    /// Compressed payload size; Huffman-coded sections only.
    pub compressed: Option<SizeField>,
    /// Number of Huffman streams; Huffman-coded sections only.
    pub streams: usize,
}

impl LiteralsHeaderLayout {
    /// Size of the literal payload that follows the header, read from
    /// `word`: the compressed size for Huffman sections, the regenerated
    /// size for Raw, and always 1 for RLE.
    #[inline]
    pub fn payload_size(&self, ty: LiteralsBlockType, word: u64) -> usize {
        match (ty, self.compressed) {
            (LiteralsBlockType::Rle, _) => 1,
            (_, Some(field)) => field.extract(word),
            (_, None) => self.regenerated.extract(word),
        }
    }
}

const fn field(offset: u32, width: u32) -> SizeField {
    SizeField { offset, width }
}

const fn raw_layout(header_len: usize, offset: u32, width: u32) -> LiteralsHeaderLayout {
    LiteralsHeaderLayout {
        header_len,
        regenerated: field(offset, width),
        compressed: None,
        streams: 0,
    }
}

const fn huf_layout(header_len: usize, width: u32, streams: usize) -> LiteralsHeaderLayout {
    LiteralsHeaderLayout {
        header_len,
        regenerated: field(4, width),
        compressed: Some(field(4 + width, width)),
        streams,
    }
}

/// Raw/RLE layouts indexed by size class. Classes 0 and 2 share the 1-byte
/// form: bit 3 belongs to the size field.
const RAW_LAYOUTS: [LiteralsHeaderLayout; 4] = [
    raw_layout(1, 3, 5),
    raw_layout(2, 4, 12),
    raw_layout(1, 3, 5),
    raw_layout(3, 4, 20),
];

/// Compressed/Repeat layouts indexed by size class. Class 0 is the only
/// single-stream form.
const HUF_LAYOUTS: [LiteralsHeaderLayout; 4] = [
    huf_layout(3, 10, 1),
    huf_layout(3, 10, 4),
    huf_layout(4, 14, 4),
    huf_layout(5, 18, 4),
];

/// Header layout selected by the first byte of a literals section.
#[inline]
pub fn literals_header_layout(first_byte: u8) -> (LiteralsBlockType, &'static LiteralsHeaderLayout) {
    let ty = LiteralsBlockType::from_bits(first_byte);
    let size_class = usize::from((first_byte >> 2) & 3);
    let layout = if ty.is_entropy_coded() {
        &HUF_LAYOUTS[size_class]
    } else {
        &RAW_LAYOUTS[size_class]
    };
    (ty, layout)
}

/// Little-endian header word covering `header_len` bytes of `src`.
/// Bytes past `header_len` are masked off; `src` must hold them all.
#[inline]
pub fn literals_header_word(src: &[u8], header_len: usize) -> u64 {
    match header_len {
        1 => u64::from(src[0]),
        2 => u64::from(src[0]) | (u64::from(src[1]) << 8),
        3 => u64::from(read_le24(src, 0)),
        4 => u64::from(read_le32(src, 0)),
        _ => u64::from(read_le32(src, 0)) | (u64::from(src[4]) << 32),
    }
}

/// Largest regenerated literals size a block may carry.
pub const LITERALS_REGENERATED_MAX: usize = BLOCKSIZE_MAX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_first_byte_selects_a_layout() {
        for b in 0..=255u8 {
            let (ty, layout) = literals_header_layout(b);
            assert_eq!(ty as u8, b & 3);
            assert!((1..=5).contains(&layout.header_len));
            if ty.is_entropy_coded() {
                let c = layout.compressed.unwrap();
                // size fields fill the header exactly
                assert_eq!(c.offset + c.width, layout.header_len as u32 * 8);
            } else {
                let r = layout.regenerated;
                assert_eq!(r.offset + r.width, layout.header_len as u32 * 8);
            }
        }
    }

    #[test]
    fn raw_size_classes() {
        // 1-byte form: size in bits 3..8
        let (_, l) = literals_header_layout(0b1111_1000);
        assert_eq!(l.header_len, 1);
        assert_eq!(l.regenerated.extract(0xF8), 31);

        // 2-byte form: 12-bit size
        let hdr = [0x04 | (0x5 << 4), 0xAB];
        let (_, l) = literals_header_layout(hdr[0]);
        assert_eq!(l.header_len, 2);
        assert_eq!(l.regenerated.extract(literals_header_word(&hdr, 2)), 0xAB5);

        // 3-byte form: 20-bit size
        let hdr = [0x0C | (0x1 << 4), 0x00, 0x02];
        let (_, l) = literals_header_layout(hdr[0]);
        assert_eq!(l.header_len, 3);
        assert_eq!(l.regenerated.extract(literals_header_word(&hdr, 3)), 0x2001);
    }

    #[test]
    fn compressed_size_classes() {
        // class 3: 18-bit sizes, the compressed one spanning into byte 5
        let regen = 0x2_0000u64;
        let comp = 0x1_2345u64;
        let word = 2 | (3 << 2) | (regen << 4) | (comp << 22);
        let bytes = word.to_le_bytes();
        let (ty, l) = literals_header_layout(bytes[0]);
        assert_eq!(ty, LiteralsBlockType::Compressed);
        assert_eq!(l.header_len, 5);
        assert_eq!(l.streams, 4);
        let w = literals_header_word(&bytes, 5);
        assert_eq!(l.regenerated.extract(w), regen as usize);
        assert_eq!(l.payload_size(ty, w), comp as usize);
    }

    #[test]
    fn rle_payload_is_one_byte() {
        let (ty, l) = literals_header_layout(0x01 | (20 << 3));
        assert_eq!(ty, LiteralsBlockType::Rle);
        assert_eq!(l.payload_size(ty, u64::from(0x01u8 | (20 << 3))), 1);
        assert_eq!(l.regenerated.extract(u64::from(0x01u8 | (20 << 3))), 20);
    }
}
