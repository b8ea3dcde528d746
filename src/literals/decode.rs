//! Full literals decoding (RFC 8878 §3.1.1.3.1).
//!
//! [`LiteralsDecoder`] regenerates the literals of one Compressed block at a
//! time. It keeps the last Huffman table it read so that a later section of
//! type Repeat can reuse it, the same way a block decoder would across the
//! blocks of one frame.

use crate::config::HUF_TABLELOG_MAX;
use crate::error::{Result, ZlitsError};
use crate::huf::{HufDTable, HufDecompressMode};
use crate::literals::types::{
    literals_header_layout, literals_header_word, LiteralsBlockType, LITERALS_REGENERATED_MAX,
};

/// Fewest literals a 4-stream section may regenerate.
pub const HUF_4X_MIN_LITERALS: usize = 6;

/// Decoding seam used by the literals iterator.
pub trait LiteralsDecode {
    /// Decode the literals section at the start of `src`, a Compressed
    /// block's payload. Returns the number of bytes the section occupies.
    fn decode_literals(&mut self, src: &[u8]) -> Result<usize>;

    /// Literals regenerated by the last successful call.
    fn literals(&self) -> &[u8];
}

/// Decoding context for the literals sections of one frame.
#[derive(Debug)]
pub struct LiteralsDecoder {
    huf: HufDTable,
    buf: Vec<u8>,
}

impl LiteralsDecoder {
    /// Allocate a decoder with room for a full block of literals.
    pub fn new() -> Result<Self> {
        Self::with_mode(HufDecompressMode::SingleSymbol)
    }

    /// Like [`new`](Self::new), decoding Huffman sections with `mode` tables.
    pub fn with_mode(mode: HufDecompressMode) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(LITERALS_REGENERATED_MAX)
            .map_err(|_| ZlitsError::OutOfMemory)?;
        Ok(LiteralsDecoder {
            huf: HufDTable::with_mode(HUF_TABLELOG_MAX, mode)?,
            buf,
        })
    }

    pub fn mode(&self) -> HufDecompressMode {
        self.huf.mode()
    }

    /// Forget the carried Huffman table, as at the start of a new frame.
    pub fn reset(&mut self) -> Result<()> {
        self.huf = HufDTable::with_mode(HUF_TABLELOG_MAX, self.huf.mode())?;
        self.buf.clear();
        Ok(())
    }

    /// A Huffman table is available for Repeat sections.
    pub fn has_table(&self) -> bool {
        self.huf.is_loaded()
    }

    fn decode_huffman(&mut self, src: &[u8], ty: LiteralsBlockType) -> Result<usize> {
        let (_, layout) = literals_header_layout(src[0]);
        if ty == LiteralsBlockType::Repeat && !self.huf.is_loaded() {
            return Err(ZlitsError::CorruptInput);
        }
        if src.len() < 5 {
            return Err(ZlitsError::CorruptInput);
        }
        let hl = layout.header_len;
        let word = literals_header_word(src, hl);
        let lit_size = layout.regenerated.extract(word);
        let lit_csize = layout.payload_size(ty, word);
        if lit_size > LITERALS_REGENERATED_MAX {
            return Err(ZlitsError::CorruptInput);
        }
        if layout.streams == 4 && lit_size < HUF_4X_MIN_LITERALS {
            return Err(ZlitsError::CorruptInput);
        }
        if hl + lit_csize > src.len() {
            return Err(ZlitsError::CorruptInput);
        }

        let mut payload = &src[hl..hl + lit_csize];
        if ty == LiteralsBlockType::Compressed {
            let table_size = self.huf.read(payload)?;
            payload = &payload[table_size..];
        }
        self.buf.clear();
        self.buf.resize(lit_size, 0);
        if layout.streams == 1 {
            self.huf.decompress_1x(&mut self.buf, payload)?;
        } else {
            self.huf.decompress_4x(&mut self.buf, payload)?;
        }
        Ok(hl + lit_csize)
    }
}

impl LiteralsDecode for LiteralsDecoder {
    fn decode_literals(&mut self, src: &[u8]) -> Result<usize> {
        if src.len() < 2 {
            return Err(ZlitsError::CorruptInput);
        }
        let (ty, layout) = literals_header_layout(src[0]);
        if ty.is_entropy_coded() {
            return self.decode_huffman(src, ty);
        }

        let hl = layout.header_len;
        let needed = hl + usize::from(ty == LiteralsBlockType::Rle);
        if src.len() < needed {
            return Err(ZlitsError::CorruptInput);
        }
        let lit_size = layout.regenerated.extract(literals_header_word(src, hl));
        if lit_size > LITERALS_REGENERATED_MAX {
            return Err(ZlitsError::CorruptInput);
        }

        self.buf.clear();
        if ty == LiteralsBlockType::Rle {
            self.buf.resize(lit_size, src[hl]);
            return Ok(hl + 1);
        }
        if hl + lit_size > src.len() {
            return Err(ZlitsError::CorruptInput);
        }
        self.buf.extend_from_slice(&src[hl..hl + lit_size]);
        Ok(hl + lit_size)
    }

    fn literals(&self) -> &[u8] {
        &self.buf
    }
}
