//! Huffman decompression: table description parsing and decoding of
//! 1-stream and 4-stream payloads, one or two symbols per table lookup.

use crate::config::HUF_TABLELOG_MAX;
use crate::error::{Result, ZlitsError};
use crate::frame::header::read_le16;
use crate::huf::bitstream::{highbit32, BackwardBitReader};
use crate::huf::fse::decompress_weights;
use crate::huf::types::{HufDecompressMode, HUF_4X_JUMP_TABLE_SIZE};

/// Symbol weights recovered from a table description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HufStats {
    /// One weight per symbol, the implied last weight included.
    pub weights: Vec<u8>,
    /// Number of symbols per weight.
    pub rank_stats: [u32; HUF_TABLELOG_MAX as usize + 1],
    pub table_log: u32,
    /// Bytes of the description, header byte included.
    pub header_size: usize,
}

/// Parse a Huffman table description (RFC 8878 §4.2.1.1 - §4.2.1.3).
pub fn read_stats(src: &[u8]) -> Result<HufStats> {
    let hb = usize::from(*src.first().ok_or(ZlitsError::CorruptInput)?);
    let (mut weights, header_size) = if hb >= 128 {
        let n = hb - 127;
        let bytes = (n + 1) / 2;
        if 1 + bytes > src.len() {
            return Err(ZlitsError::SizeMismatch);
        }
        let weights = (0..n)
            .map(|i| {
                let b = src[1 + i / 2];
                if i % 2 == 0 {
                    b >> 4
                } else {
                    b & 0x0F
                }
            })
            .collect();
        (weights, 1 + bytes)
    } else {
        if 1 + hb > src.len() {
            return Err(ZlitsError::SizeMismatch);
        }
        (decompress_weights(&src[1..1 + hb], 255)?, 1 + hb)
    };

    let mut rank_stats = [0u32; HUF_TABLELOG_MAX as usize + 1];
    let mut weight_total = 0u32;
    for &w in &weights {
        if u32::from(w) > HUF_TABLELOG_MAX {
            return Err(ZlitsError::CorruptInput);
        }
        rank_stats[w as usize] += 1;
        weight_total += (1u32 << w) >> 1;
    }
    if weight_total == 0 {
        return Err(ZlitsError::CorruptInput);
    }

    let table_log = highbit32(weight_total) + 1;
    if table_log > HUF_TABLELOG_MAX {
        return Err(ZlitsError::CorruptInput);
    }
    // The remainder to the next power of two must itself be a power of two.
    let rest = (1u32 << table_log) - weight_total;
    let last_weight = highbit32(rest) + 1;
    if 1u32 << highbit32(rest) != rest {
        return Err(ZlitsError::CorruptInput);
    }
    weights.push(last_weight as u8);
    rank_stats[last_weight as usize] += 1;

    if rank_stats[1] < 2 || rank_stats[1] & 1 != 0 {
        return Err(ZlitsError::CorruptInput);
    }

    Ok(HufStats {
        weights,
        rank_stats,
        table_log,
        header_size,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HufDElt {
    symbol: u8,
    nb_bits: u8,
}

/// Double-symbol cell: `length` symbols resolved by `nb_bits` bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HufDEltX2 {
    symbols: [u8; 2],
    nb_bits: u8,
    length: u8,
}

/// Huffman decoding table.
///
/// The single-symbol cells are always built. In
/// [`DoubleSymbol`](HufDecompressMode::DoubleSymbol) mode a second table
/// pairs each cell with the symbol that follows it, when that symbol's
/// code fits in the bits left over by the first.
#[derive(Debug, Clone)]
pub struct HufDTable {
    max_table_log: u32,
    table_log: u32,
    mode: HufDecompressMode,
    entries: Vec<HufDElt>,
    pairs: Vec<HufDEltX2>,
}

impl HufDTable {
    /// An empty single-symbol table accepting descriptions up to
    /// `max_table_log`.
    pub fn new(max_table_log: u32) -> Result<Self> {
        Self::with_mode(max_table_log, HufDecompressMode::SingleSymbol)
    }

    pub fn with_mode(max_table_log: u32, mode: HufDecompressMode) -> Result<Self> {
        if max_table_log > HUF_TABLELOG_MAX {
            return Err(ZlitsError::TableLogTooLarge);
        }
        Ok(HufDTable {
            max_table_log,
            table_log: 0,
            mode,
            entries: Vec::with_capacity(1 << max_table_log),
            pairs: Vec::new(),
        })
    }

    pub fn max_table_log(&self) -> u32 {
        self.max_table_log
    }

    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    pub fn mode(&self) -> HufDecompressMode {
        self.mode
    }

    /// A description has been loaded.
    pub fn is_loaded(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Load a table description from the start of `src`.
    ///
    /// Returns the number of bytes consumed. On error the previous table is
    /// left untouched.
    pub fn read(&mut self, src: &[u8]) -> Result<usize> {
        let stats = read_stats(src)?;
        if stats.table_log > self.max_table_log {
            return Err(ZlitsError::TableLogTooLarge);
        }

        let mut rank_start = [0usize; HUF_TABLELOG_MAX as usize + 1];
        let mut next = 0usize;
        for w in 1..=stats.table_log as usize {
            rank_start[w] = next;
            next += (stats.rank_stats[w] as usize) << (w - 1);
        }

        let mut entries = vec![HufDElt::default(); 1 << stats.table_log];
        for (symbol, &w) in stats.weights.iter().enumerate() {
            if w == 0 {
                continue;
            }
            let len = 1usize << (w - 1);
            let start = rank_start[w as usize];
            let elt = HufDElt {
                symbol: symbol as u8,
                nb_bits: (stats.table_log + 1 - u32::from(w)) as u8,
            };
            entries[start..start + len].fill(elt);
            rank_start[w as usize] += len;
        }

        self.pairs = match self.mode {
            HufDecompressMode::SingleSymbol => Vec::new(),
            HufDecompressMode::DoubleSymbol => build_pairs(&entries, stats.table_log),
        };
        self.entries = entries;
        self.table_log = stats.table_log;
        Ok(stats.header_size)
    }

    /// Decode one bitstream, filling all of `dst`.
    ///
    /// The stream must be consumed exactly.
    pub fn decompress_1x(&self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        if !self.is_loaded() {
            return Err(ZlitsError::CorruptInput);
        }
        let mut br = BackwardBitReader::new(src)?;
        let mut pos = 0;
        if !self.pairs.is_empty() {
            while pos + 1 < dst.len() {
                let e = self.pairs[br.peek(self.table_log) as usize];
                dst[pos..pos + 2].copy_from_slice(&e.symbols);
                br.skip(u32::from(e.nb_bits));
                pos += usize::from(e.length);
            }
        }
        for d in dst[pos..].iter_mut() {
            let e = self.entries[br.peek(self.table_log) as usize];
            *d = e.symbol;
            br.skip(u32::from(e.nb_bits));
        }
        if !br.is_exhausted() {
            return Err(ZlitsError::CorruptInput);
        }
        Ok(())
    }

    /// Decode a 4-stream payload into `dst`.
    pub fn decompress_4x(&self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        if src.len() < HUF_4X_JUMP_TABLE_SIZE + 4 || dst.len() < 6 {
            return Err(ZlitsError::CorruptInput);
        }
        let l1 = usize::from(read_le16(src, 0));
        let l2 = usize::from(read_le16(src, 2));
        let l3 = usize::from(read_le16(src, 4));
        let l4 = (src.len() - HUF_4X_JUMP_TABLE_SIZE)
            .checked_sub(l1 + l2 + l3)
            .ok_or(ZlitsError::CorruptInput)?;

        let segment = (dst.len() + 3) / 4;
        let (d1, rest) = dst.split_at_mut(segment);
        let (d2, rest) = rest.split_at_mut(segment);
        let (d3, d4) = rest.split_at_mut(segment);

        let mut ip = HUF_4X_JUMP_TABLE_SIZE;
        for (d, len) in [(d1, l1), (d2, l2), (d3, l3), (d4, l4)] {
            self.decompress_1x(d, &src[ip..ip + len])?;
            ip += len;
        }
        Ok(())
    }
}

/// Pair every single-symbol cell with the symbol decoded from the bits it
/// leaves unused. Cells index the next `table_log` bits MSB-first, so after
/// the first code of `n1` bits the following code starts at `idx << n1`.
fn build_pairs(entries: &[HufDElt], table_log: u32) -> Vec<HufDEltX2> {
    let mask = (1usize << table_log) - 1;
    entries
        .iter()
        .enumerate()
        .map(|(idx, first)| {
            let second = entries[(idx << first.nb_bits) & mask];
            if u32::from(first.nb_bits) + u32::from(second.nb_bits) <= table_log {
                HufDEltX2 {
                    symbols: [first.symbol, second.symbol],
                    nb_bits: first.nb_bits + second.nb_bits,
                    length: 2,
                }
            } else {
                HufDEltX2 {
                    symbols: [first.symbol, 0],
                    nb_bits: first.nb_bits,
                    length: 1,
                }
            }
        })
        .collect()
}
