//! Huffman compression: table construction, table serialization and the
//! 1-stream / 4-stream encoders.
//!
//! [`compress_repeat`] is the entry point used for literals. It decides
//! between an existing table (repeat mode), a freshly built one, or giving
//! up so the caller can store the bytes raw.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::config::{
    BLOCKSIZE_MAX, HUF_SYMBOLVALUE_MAX, HUF_TABLELOG_DEFAULT, HUF_TABLELOG_MAX,
    SUSPECT_UNCOMPRESSIBLE_SAMPLE_RATIO, SUSPECT_UNCOMPRESSIBLE_SAMPLE_SIZE,
};
use crate::error::{Result, ZlitsError};
use crate::frame::header::write_le16;
use crate::huf::bitstream::BitWriter;
use crate::huf::fse::{compress_weights, optimal_table_log};
use crate::huf::types::{HufRepeat, HufStreams, HUF_4X_JUMP_TABLE_SIZE};

// ─────────────────────────────────────────────────────────────────────────────
// Histogram
// ─────────────────────────────────────────────────────────────────────────────

/// Byte frequencies of a buffer.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub counts: [u32; 256],
    /// Largest byte value present (0 for empty input).
    pub max_symbol: u32,
    /// Highest single count.
    pub largest: u32,
}

pub fn histogram(src: &[u8]) -> Histogram {
    let mut counts = [0u32; 256];
    for &b in src {
        counts[b as usize] += 1;
    }
    let max_symbol = counts.iter().rposition(|&c| c > 0).unwrap_or(0) as u32;
    let largest = counts.iter().copied().max().unwrap_or(0);
    Histogram {
        counts,
        max_symbol,
        largest,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compression table
// ─────────────────────────────────────────────────────────────────────────────

/// Code of one symbol: `nb_bits == 0` means the symbol cannot be encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HufCElt {
    pub nb_bits: u8,
    pub value: u16,
}

/// Canonical Huffman code for byte symbols, limited to a maximum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HufCTable {
    codes: Vec<HufCElt>,
    max_symbol: u32,
    table_log: u32,
}

impl HufCTable {
    /// Build a length-limited code for the symbols of `counts[..=max_symbol]`.
    ///
    /// The resulting table describes symbols up to the largest one actually
    /// present. At least two distinct symbols are required.
    pub fn build(counts: &[u32], max_symbol: u32, max_nb_bits: u32) -> Result<Self> {
        if max_symbol > HUF_SYMBOLVALUE_MAX {
            return Err(ZlitsError::MaxSymbolTooLarge);
        }
        if max_nb_bits == 0 || max_nb_bits > HUF_TABLELOG_MAX {
            return Err(ZlitsError::TableLogTooLarge);
        }
        if counts.len() <= max_symbol as usize {
            return Err(ZlitsError::ParameterInvalid);
        }

        let mut leaves: Vec<(u32, u32)> = (0..=max_symbol)
            .filter(|&s| counts[s as usize] > 0)
            .map(|s| (counts[s as usize], s))
            .collect();
        if leaves.len() < 2 {
            return Err(ZlitsError::ParameterInvalid);
        }
        if leaves.len() > 1usize << max_nb_bits {
            return Err(ZlitsError::TableLogTooLarge);
        }
        leaves.sort_unstable();

        let num_codes = limited_length_histogram(&leaves, max_nb_bits);

        // Most frequent symbols take the shortest codes.
        let mut by_freq = leaves.clone();
        by_freq.sort_unstable_by_key(|&(c, s)| (Reverse(c), s));
        let mut codes = vec![HufCElt::default(); HUF_SYMBOLVALUE_MAX as usize + 1];
        let mut it = by_freq.iter();
        for (len, &n) in num_codes.iter().enumerate().skip(1) {
            for _ in 0..n {
                if let Some(&(_, s)) = it.next() {
                    codes[s as usize].nb_bits = len as u8;
                }
            }
        }
        let table_log = num_codes.iter().rposition(|&n| n > 0).unwrap_or(0) as u32;

        assign_canonical_values(&mut codes, table_log);
        let effective_max = leaves.iter().map(|&(_, s)| s).max().unwrap_or(0);
        Ok(HufCTable {
            codes,
            max_symbol: effective_max,
            table_log,
        })
    }

    /// Longest code length in the table.
    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    /// Largest symbol with a code.
    pub fn max_symbol(&self) -> u32 {
        self.max_symbol
    }

    /// Code length of `symbol`; 0 when it has no code.
    pub fn nb_bits(&self, symbol: u8) -> u32 {
        u32::from(self.codes[symbol as usize].nb_bits)
    }

    pub fn code(&self, symbol: u8) -> HufCElt {
        self.codes[symbol as usize]
    }

    /// `true` when every symbol counted in `counts[..=max_symbol]` has a code.
    pub fn is_valid_for(&self, counts: &[u32], max_symbol: u32) -> bool {
        if self.max_symbol < max_symbol {
            return false;
        }
        counts
            .iter()
            .take(max_symbol as usize + 1)
            .zip(&self.codes)
            .all(|(&c, e)| c == 0 || e.nb_bits != 0)
    }

    /// Payload bytes this table would need for the given counts.
    pub fn estimate_compressed_size(&self, counts: &[u32], max_symbol: u32) -> usize {
        let bits: usize = counts
            .iter()
            .take(max_symbol as usize + 1)
            .zip(&self.codes)
            .map(|(&c, e)| c as usize * e.nb_bits as usize)
            .sum();
        bits >> 3
    }

    /// Serialize the table description (RFC 8878 §4.2.1).
    ///
    /// Weights are FSE-compressed when that is small enough, otherwise
    /// stored as 4-bit nibbles. Nibbles can describe at most 128 weights, so
    /// a table whose weights do not compress and whose largest symbol
    /// exceeds 128 cannot be written.
    pub fn write(&self) -> Result<Vec<u8>> {
        let max_symbol = self.max_symbol as usize;
        let weights: Vec<u8> = self.codes[..max_symbol]
            .iter()
            .map(|e| match e.nb_bits {
                0 => 0,
                nb => (self.table_log + 1 - u32::from(nb)) as u8,
            })
            .collect();

        if let Some(packed) = compress_weights(&weights)? {
            if packed.len() > 1 && packed.len() < max_symbol / 2 {
                let mut out = Vec::with_capacity(packed.len() + 1);
                out.push(packed.len() as u8);
                out.extend_from_slice(&packed);
                return Ok(out);
            }
        }

        if max_symbol > 128 {
            return Err(ZlitsError::MaxSymbolTooLarge);
        }
        let mut out = Vec::with_capacity((max_symbol + 1) / 2 + 1);
        out.push((128 + (max_symbol - 1)) as u8);
        for pair in weights.chunks(2) {
            let hi = pair[0];
            let lo = pair.get(1).copied().unwrap_or(0);
            out.push((hi << 4) | lo);
        }
        Ok(out)
    }

    /// Encode `src` as one bitstream into `dst`.
    ///
    /// Returns 0 when `dst` cannot hold the result.
    pub fn compress_1x(&self, dst: &mut [u8], src: &[u8]) -> Result<usize> {
        if dst.len() < 8 {
            return Ok(0);
        }
        let mut w = BitWriter::with_capacity(src.len() + 8);
        for &b in src.iter().rev() {
            let e = self.codes[b as usize];
            if e.nb_bits == 0 {
                return Err(ZlitsError::MaxSymbolTooLarge);
            }
            w.add_bits(u64::from(e.value), u32::from(e.nb_bits));
            if w.len_bytes() > dst.len() {
                return Ok(0);
            }
        }
        let out = w.close();
        if out.len() > dst.len() {
            return Ok(0);
        }
        dst[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }

    /// Encode `src` as four bitstreams behind a 6-byte jump table.
    ///
    /// Returns 0 for inputs under 12 bytes, when `dst` is too small, or when
    /// one of the first three streams exceeds 64 KiB.
    pub fn compress_4x(&self, dst: &mut [u8], src: &[u8]) -> Result<usize> {
        if src.len() < 12 || dst.len() < HUF_4X_JUMP_TABLE_SIZE + 1 + 1 + 1 + 8 {
            return Ok(0);
        }
        let segment = (src.len() + 3) / 4;
        let mut op = HUF_4X_JUMP_TABLE_SIZE;
        for k in 0..3 {
            let chunk = &src[k * segment..(k + 1) * segment];
            let c = self.compress_1x(&mut dst[op..], chunk)?;
            if c == 0 || c > usize::from(u16::MAX) {
                return Ok(0);
            }
            write_le16(dst, 2 * k, c as u16);
            op += c;
        }
        let c = self.compress_1x(&mut dst[op..], &src[3 * segment..])?;
        if c == 0 {
            return Ok(0);
        }
        Ok(op + c)
    }

    /// Encode with the requested stream layout.
    pub fn compress(&self, dst: &mut [u8], src: &[u8], streams: HufStreams) -> Result<usize> {
        match streams {
            HufStreams::Single => self.compress_1x(dst, src),
            HufStreams::Four => self.compress_4x(dst, src),
        }
    }
}

/// Huffman code lengths, limited to `max_nb_bits`, as a count of codes per
/// length. `leaves` holds `(count, symbol)` sorted ascending.
fn limited_length_histogram(leaves: &[(u32, u32)], max_nb_bits: u32) -> Vec<u32> {
    let n = leaves.len();
    let mut parent = vec![0usize; 2 * n - 1];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = leaves
        .iter()
        .enumerate()
        .map(|(i, &(c, _))| Reverse((u64::from(c), i)))
        .collect();
    let mut next = n;
    while heap.len() > 1 {
        let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((wa + wb, next)));
        next += 1;
    }

    let root = next - 1;
    let mut depth = vec![0u32; 2 * n - 1];
    for id in (0..root).rev() {
        depth[id] = depth[parent[id]] + 1;
    }

    let max = max_nb_bits as usize;
    let mut num_codes = vec![0u32; max + 1];
    for &d in &depth[..n] {
        num_codes[(d as usize).min(max)] += 1;
    }

    // Clamping made the code over-subscribed; push codes down until the
    // Kraft sum is exactly one again.
    let full = 1u64 << max;
    let mut total: u64 = (1..=max).map(|i| u64::from(num_codes[i]) << (max - i)).sum();
    while total > full {
        num_codes[max] -= 1;
        for i in (1..max).rev() {
            if num_codes[i] != 0 {
                num_codes[i] -= 1;
                num_codes[i + 1] += 2;
                break;
            }
        }
        total -= 1;
    }
    num_codes
}

/// Assign code values so that, within each length, values increase with the
/// symbol index and longer codes sort before shorter ones.
fn assign_canonical_values(codes: &mut [HufCElt], table_log: u32) {
    let mut nb_per_rank = [0u16; HUF_TABLELOG_MAX as usize + 1];
    for e in codes.iter() {
        nb_per_rank[e.nb_bits as usize] += 1;
    }
    let mut val_per_rank = [0u16; HUF_TABLELOG_MAX as usize + 1];
    let mut min = 0u16;
    for n in (1..=table_log as usize).rev() {
        val_per_rank[n] = min;
        min += nb_per_rank[n];
        min >>= 1;
    }
    for e in codes.iter_mut().filter(|e| e.nb_bits > 0) {
        e.value = val_per_rank[e.nb_bits as usize];
        val_per_rank[e.nb_bits as usize] += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repeat-aware compression
// ─────────────────────────────────────────────────────────────────────────────

/// Options for [`compress_repeat`].
#[derive(Debug, Clone, Copy)]
pub struct RepeatOptions {
    pub max_symbol: u32,
    pub huff_log: u32,
    pub streams: HufStreams,
    /// Reuse an acceptable previous table without trying a new one.
    pub prefer_repeat: bool,
    /// Sample both ends of large inputs before counting everything.
    pub suspect_uncompressible: bool,
}

impl Default for RepeatOptions {
    fn default() -> Self {
        RepeatOptions {
            max_symbol: HUF_SYMBOLVALUE_MAX,
            huff_log: HUF_TABLELOG_DEFAULT,
            streams: HufStreams::Four,
            prefer_repeat: false,
            suspect_uncompressible: false,
        }
    }
}

fn compress_with_table(
    table: &HufCTable,
    dst: &mut [u8],
    header_len: usize,
    src: &[u8],
    streams: HufStreams,
) -> Result<usize> {
    let c = table.compress(&mut dst[header_len..], src, streams)?;
    if c == 0 {
        return Ok(0);
    }
    let total = header_len + c;
    if total >= src.len().saturating_sub(1) {
        return Ok(0);
    }
    Ok(total)
}

/// Huffman-compress `src` into `dst`, possibly reusing `old_table`.
///
/// Return values:
/// - `0`: not worth compressing; store raw
/// - `1`: every byte is `src[0]` (written to `dst[0]`); store as RLE
/// - otherwise the bytes written to `dst`
///
/// On return `repeat` tells which table was used. It stays `Check`/`Valid`
/// when `old_table` was reused and becomes `None` when a new table was
/// written. A new table replaces `old_table` when it is adopted.
pub fn compress_repeat(
    dst: &mut [u8],
    src: &[u8],
    opts: RepeatOptions,
    old_table: &mut Option<HufCTable>,
    repeat: &mut HufRepeat,
) -> Result<usize> {
    if src.is_empty() || dst.is_empty() {
        return Ok(0);
    }
    if src.len() > BLOCKSIZE_MAX {
        return Err(ZlitsError::SizeMismatch);
    }
    if opts.huff_log > HUF_TABLELOG_MAX {
        return Err(ZlitsError::TableLogTooLarge);
    }
    if opts.max_symbol > HUF_SYMBOLVALUE_MAX {
        return Err(ZlitsError::MaxSymbolTooLarge);
    }
    let max_symbol = if opts.max_symbol == 0 {
        HUF_SYMBOLVALUE_MAX
    } else {
        opts.max_symbol
    };
    let huff_log = if opts.huff_log == 0 {
        HUF_TABLELOG_DEFAULT
    } else {
        opts.huff_log
    };

    if opts.prefer_repeat && *repeat == HufRepeat::Valid {
        if let Some(old) = old_table.as_ref() {
            return compress_with_table(old, dst, 0, src, opts.streams);
        }
    }

    let sample = SUSPECT_UNCOMPRESSIBLE_SAMPLE_SIZE;
    if opts.suspect_uncompressible && src.len() >= sample * SUSPECT_UNCOMPRESSIBLE_SAMPLE_RATIO {
        let begin = histogram(&src[..sample]).largest as usize;
        let end = histogram(&src[src.len() - sample..]).largest as usize;
        if begin + end <= ((2 * sample) >> 7) + 4 {
            return Ok(0);
        }
    }

    let hist = histogram(src);
    if hist.max_symbol > max_symbol {
        return Err(ZlitsError::MaxSymbolTooLarge);
    }
    if hist.largest as usize == src.len() {
        dst[0] = src[0];
        return Ok(1);
    }
    if hist.largest as usize <= (src.len() >> 7) + 4 {
        return Ok(0);
    }

    if *repeat == HufRepeat::Check
        && !old_table
            .as_ref()
            .is_some_and(|t| t.is_valid_for(&hist.counts, hist.max_symbol))
    {
        *repeat = HufRepeat::None;
    }
    if opts.prefer_repeat && *repeat != HufRepeat::None {
        if let Some(old) = old_table.as_ref() {
            return compress_with_table(old, dst, 0, src, opts.streams);
        }
    }

    let huff_log = optimal_table_log(huff_log, src.len(), hist.max_symbol, 1);
    let table = HufCTable::build(&hist.counts, hist.max_symbol, huff_log)?;
    let header = table.write()?;

    if *repeat != HufRepeat::None {
        if let Some(old) = old_table.as_ref() {
            let old_size = old.estimate_compressed_size(&hist.counts, hist.max_symbol);
            let new_size = table.estimate_compressed_size(&hist.counts, hist.max_symbol);
            if old_size <= header.len() + new_size || header.len() + 12 >= src.len() {
                return compress_with_table(old, dst, 0, src, opts.streams);
            }
        }
    }

    if header.len() + 12 >= src.len() {
        return Ok(0);
    }
    if header.len() > dst.len() {
        return Err(ZlitsError::DstTooSmall);
    }
    dst[..header.len()].copy_from_slice(&header);
    *repeat = HufRepeat::None;
    let size = compress_with_table(&table, dst, header.len(), src, opts.streams)?;
    *old_table = Some(table);
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed(n: usize) -> Vec<u8> {
        (0..n)
            .map(|i| match i % 16 {
                0..=7 => b'e',
                8..=11 => b't',
                12 | 13 => b'a',
                14 => b'o',
                _ => b'z',
            })
            .collect()
    }

    #[test]
    fn code_is_complete_and_prefix_free() {
        let h = histogram(&skewed(1600));
        let t = HufCTable::build(&h.counts, h.max_symbol, 11).unwrap();
        let kraft: f64 = (0..=255u8)
            .filter(|&s| t.nb_bits(s) > 0)
            .map(|s| 2f64.powi(-(t.nb_bits(s) as i32)))
            .sum();
        assert!((kraft - 1.0).abs() < 1e-12);
        assert!(t.nb_bits(b'e') <= t.nb_bits(b'z'));
        assert_eq!(t.max_symbol(), u32::from(b'z'));
    }

    #[test]
    fn length_limit_is_enforced() {
        // Fibonacci-like counts force a deep tree.
        let mut counts = [0u32; 256];
        let mut a = 1u32;
        let mut b = 1u32;
        for c in counts.iter_mut().take(20) {
            *c = a;
            let next = a + b;
            a = b;
            b = next;
        }
        let t = HufCTable::build(&counts, 19, 8).unwrap();
        assert_eq!(t.table_log(), 8);
        let kraft: u32 = (0..20u8).map(|s| 1u32 << (8 - t.nb_bits(s))).sum();
        assert_eq!(kraft, 256);
    }

    #[test]
    fn single_symbol_cannot_build() {
        let mut counts = [0u32; 256];
        counts[7] = 10;
        assert_eq!(HufCTable::build(&counts, 255, 11), Err(ZlitsError::ParameterInvalid));
    }

    #[test]
    fn direct_weights_header_layout() {
        let mut counts = [0u32; 256];
        counts[0] = 2;
        counts[1] = 1;
        counts[2] = 1;
        let t = HufCTable::build(&counts, 2, 11).unwrap();
        // lengths 1, 2, 2 → table log 2 → weights 2, 1 (last implied)
        assert_eq!(t.table_log(), 2);
        assert_eq!(t.write().unwrap(), vec![128 + 1, (2 << 4) | 1]);
    }

    #[test]
    fn validity_tracks_missing_symbols() {
        let h = histogram(b"aaaabbbcc");
        let t = HufCTable::build(&h.counts, h.max_symbol, 11).unwrap();
        assert!(t.is_valid_for(&h.counts, h.max_symbol));
        let other = histogram(b"aaaabbbccd");
        assert!(!t.is_valid_for(&other.counts, other.max_symbol));
    }

    #[test]
    fn four_streams_need_twelve_bytes() {
        let h = histogram(b"abcabcabcab");
        let t = HufCTable::build(&h.counts, h.max_symbol, 11).unwrap();
        let mut dst = [0u8; 64];
        assert_eq!(t.compress_4x(&mut dst, b"abcabcabcab").unwrap(), 0);
        assert!(t.compress_4x(&mut dst, b"abcabcabcabc").unwrap() > 6);
    }

    #[test]
    fn repeat_none_builds_and_saves_table() {
        let src = skewed(4000);
        let mut dst = vec![0u8; 8192];
        let mut old = None;
        let mut repeat = HufRepeat::None;
        let n = compress_repeat(&mut dst, &src, RepeatOptions::default(), &mut old, &mut repeat).unwrap();
        assert!(n > 1 && n < src.len());
        assert_eq!(repeat, HufRepeat::None);
        assert!(old.is_some());
    }

    #[test]
    fn repeat_check_reuses_matching_table() {
        let src = skewed(4000);
        let mut dst = vec![0u8; 8192];
        let mut old = None;
        let mut repeat = HufRepeat::None;
        compress_repeat(&mut dst, &src, RepeatOptions::default(), &mut old, &mut repeat).unwrap();
        let saved = old.clone();

        let mut repeat = HufRepeat::Check;
        let n = compress_repeat(&mut dst, &src, RepeatOptions::default(), &mut old, &mut repeat).unwrap();
        assert!(n > 0);
        // Same statistics: the old table costs nothing extra, so it is kept.
        assert_eq!(repeat, HufRepeat::Check);
        assert_eq!(old, saved);
    }

    #[test]
    fn repeat_check_drops_table_missing_symbols() {
        let mut dst = vec![0u8; 8192];
        let mut old = None;
        let mut repeat = HufRepeat::None;
        compress_repeat(&mut dst, &skewed(4000), RepeatOptions::default(), &mut old, &mut repeat).unwrap();

        let mut other = skewed(4000);
        other[17] = b'#';
        let mut repeat = HufRepeat::Check;
        compress_repeat(&mut dst, &other, RepeatOptions::default(), &mut old, &mut repeat).unwrap();
        assert_eq!(repeat, HufRepeat::None);
        assert!(old.as_ref().unwrap().nb_bits(b'#') > 0);
    }

    #[test]
    fn rle_and_flat_inputs() {
        let mut dst = vec![0u8; 1024];
        let mut old = None;
        let mut repeat = HufRepeat::None;
        let n = compress_repeat(&mut dst, &[9u8; 300], RepeatOptions::default(), &mut old, &mut repeat).unwrap();
        assert_eq!((n, dst[0]), (1, 9));

        let flat: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        let n = compress_repeat(&mut dst, &flat, RepeatOptions::default(), &mut old, &mut repeat).unwrap();
        assert_eq!(n, 0);
        assert!(old.is_none());
    }
}
