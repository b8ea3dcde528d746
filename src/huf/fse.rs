//! Finite State Entropy coding of Huffman weight tables.
//!
//! A Huffman table description lists one weight per symbol. When that list
//! compresses well it is stored as an FSE stream: a normalized-count header
//! followed by a bitstream driven by two interleaved states. Only the pieces
//! needed for weight tables are implemented here; table logs stay within
//! [`FSE_MIN_TABLELOG`]..=[`FSE_MAX_TABLELOG`].

use crate::config::HUF_WEIGHTS_TABLELOG_MAX;
use crate::error::{Result, ZlitsError};
use crate::huf::bitstream::{highbit32, BackwardBitReader, BitWriter, ForwardBitReader};

pub const FSE_MIN_TABLELOG: u32 = 5;
pub const FSE_MAX_TABLELOG: u32 = 12;
pub const FSE_TABLELOG_ABSOLUTE_MAX: u32 = 15;

/// Largest symbol a weight stream may carry (weights are 0..=12).
pub const WEIGHT_SYMBOL_MAX: u32 = 12;

// ─────────────────────────────────────────────────────────────────────────────
// Table sizing
// ─────────────────────────────────────────────────────────────────────────────

fn min_table_log(src_size: usize, max_symbol: u32) -> u32 {
    let src_bits = highbit32(src_size.max(1) as u32) + 1;
    let symbol_bits = highbit32(max_symbol.max(1)) + 2;
    src_bits.min(symbol_bits)
}

/// Table log for `src_size` symbols drawn from `0..=max_symbol`, capped at
/// `max_table_log`. `minus` trades precision for speed on small inputs.
pub fn optimal_table_log(max_table_log: u32, src_size: usize, max_symbol: u32, minus: u32) -> u32 {
    let max_bits_src = highbit32(src_size.saturating_sub(1).max(1) as u32) as i32 - minus as i32;
    let min_bits = min_table_log(src_size, max_symbol) as i32;
    let mut table_log = max_table_log as i32;
    if max_bits_src < table_log {
        table_log = max_bits_src;
    }
    if min_bits > table_log {
        table_log = min_bits;
    }
    table_log.clamp(FSE_MIN_TABLELOG as i32, FSE_MAX_TABLELOG as i32) as u32
}

/// Scale `counts` (summing to `total`) so they sum to `1 << table_log`.
/// Every present symbol keeps a probability of at least one slot.
pub fn normalize_count(counts: &[u32], total: usize, table_log: u32) -> Result<Vec<i16>> {
    if total == 0 || counts.is_empty() {
        return Err(ZlitsError::ParameterInvalid);
    }
    let table_size = 1u64 << table_log;
    let present = counts.iter().filter(|&&c| c > 0).count() as u64;
    if present > table_size {
        return Err(ZlitsError::TableLogTooLarge);
    }

    let mut norm = vec![0i16; counts.len()];
    let mut sum = 0i64;
    for (n, &c) in norm.iter_mut().zip(counts) {
        if c == 0 {
            continue;
        }
        let scaled = (u64::from(c) * table_size + total as u64 / 2) / total as u64;
        *n = scaled.max(1) as i16;
        sum += i64::from(*n);
    }

    let mut diff = table_size as i64 - sum;
    if diff > 0 {
        let largest = largest_index(&norm);
        norm[largest] += diff as i16;
    }
    while diff < 0 {
        let largest = largest_index(&norm);
        if norm[largest] <= 1 {
            return Err(ZlitsError::ParameterInvalid);
        }
        norm[largest] -= 1;
        diff += 1;
    }
    Ok(norm)
}

fn largest_index(norm: &[i16]) -> usize {
    let mut best = 0;
    for (i, &n) in norm.iter().enumerate() {
        if n > norm[best] {
            best = i;
        }
    }
    best
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalized count header
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize a normalized distribution (RFC 8878 §4.1.1).
pub fn write_ncount(norm: &[i16], max_symbol: u32, table_log: u32) -> Result<Vec<u8>> {
    if !(FSE_MIN_TABLELOG..=FSE_MAX_TABLELOG).contains(&table_log) {
        return Err(ZlitsError::TableLogTooLarge);
    }
    if max_symbol as usize >= norm.len() {
        return Err(ZlitsError::MaxSymbolTooLarge);
    }

    let table_size = 1i32 << table_log;
    let mut w = BitWriter::with_capacity(((max_symbol as usize + 1) * table_log as usize) / 8 + 4);
    w.add_bits(u64::from(table_log - FSE_MIN_TABLELOG), 4);

    let mut remaining = table_size + 1;
    let mut threshold = table_size;
    let mut nb_bits = table_log + 1;
    let mut symbol = 0usize;
    let mut previous_is0 = false;

    while symbol <= max_symbol as usize && remaining > 1 {
        if previous_is0 {
            let mut start = symbol;
            while symbol <= max_symbol as usize && norm[symbol] == 0 {
                symbol += 1;
            }
            if symbol == max_symbol as usize + 1 {
                return Err(ZlitsError::ParameterInvalid);
            }
            while symbol >= start + 24 {
                start += 24;
                w.add_bits(0xFFFF, 16);
            }
            while symbol >= start + 3 {
                start += 3;
                w.add_bits(3, 2);
            }
            w.add_bits((symbol - start) as u64, 2);
        }

        let mut count = i32::from(norm[symbol]);
        symbol += 1;
        let max = 2 * threshold - 1 - remaining;
        remaining -= count.abs();
        count += 1;
        if count >= threshold {
            count += max;
        }
        if count < max {
            w.add_bits(count as u64, nb_bits - 1);
        } else {
            w.add_bits(count as u64, nb_bits);
        }
        previous_is0 = count == 1;
        if remaining < 1 {
            return Err(ZlitsError::ParameterInvalid);
        }
        if remaining < threshold {
            nb_bits = highbit32(remaining as u32) + 1;
            threshold = 1 << (nb_bits - 1);
        }
    }
    if remaining != 1 {
        return Err(ZlitsError::ParameterInvalid);
    }
    Ok(w.finish())
}

/// Normalized distribution decoded by [`read_ncount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NCount {
    pub norm: Vec<i16>,
    pub max_symbol: u32,
    pub table_log: u32,
    /// Header bytes consumed.
    pub header_size: usize,
}

/// Parse a normalized-count header, accepting symbols up to `max_symbol`
/// and table logs up to `max_table_log`.
pub fn read_ncount(src: &[u8], max_symbol: u32, max_table_log: u32) -> Result<NCount> {
    if src.is_empty() {
        return Err(ZlitsError::CorruptInput);
    }
    let mut br = ForwardBitReader::new(src);
    let table_log = br.read(4) + FSE_MIN_TABLELOG;
    if table_log > FSE_TABLELOG_ABSOLUTE_MAX || table_log > max_table_log {
        return Err(ZlitsError::TableLogTooLarge);
    }

    let mut remaining = (1i32 << table_log) + 1;
    let mut threshold = 1i32 << table_log;
    let mut nb_bits = table_log + 1;
    let mut norm: Vec<i16> = Vec::with_capacity(max_symbol as usize + 1);
    let mut previous0 = false;

    while remaining > 1 && norm.len() <= max_symbol as usize {
        if previous0 {
            let mut n0 = norm.len();
            while br.peek(16) == 0xFFFF {
                n0 += 24;
                br.skip(16);
                if br.consumed_bytes() > src.len() {
                    return Err(ZlitsError::CorruptInput);
                }
            }
            while br.peek(2) == 3 {
                n0 += 3;
                br.skip(2);
            }
            n0 += br.read(2) as usize;
            if n0 > max_symbol as usize {
                return Err(ZlitsError::MaxSymbolTooLarge);
            }
            norm.resize(n0, 0);
        }

        let max = 2 * threshold - 1 - remaining;
        let low = br.peek(nb_bits - 1) as i32;
        let mut count = if low < max {
            br.skip(nb_bits - 1);
            low
        } else {
            let mut c = br.peek(nb_bits) as i32;
            if c >= threshold {
                c -= max;
            }
            br.skip(nb_bits);
            c
        };
        count -= 1;
        remaining -= count.abs();
        norm.push(count as i16);
        previous0 = count == 0;
        if remaining < threshold {
            if remaining <= 1 {
                break;
            }
            nb_bits = highbit32(remaining as u32) + 1;
            threshold = 1 << (nb_bits - 1);
        }
    }
    if remaining != 1 {
        return Err(ZlitsError::CorruptInput);
    }
    let header_size = br.consumed_bytes();
    if header_size > src.len() {
        return Err(ZlitsError::CorruptInput);
    }
    Ok(NCount {
        max_symbol: norm.len() as u32 - 1,
        norm,
        table_log,
        header_size,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding table
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FseDEntry {
    pub symbol: u8,
    pub nb_bits: u8,
    pub new_state: u16,
}

/// FSE decoding table. The encoder below walks the same table in reverse.
#[derive(Debug, Clone)]
pub struct FseDTable {
    table_log: u32,
    entries: Vec<FseDEntry>,
}

impl FseDTable {
    /// Spread symbols over `1 << table_log` states according to `norm`.
    /// Low-probability symbols (`-1`) occupy the highest states.
    pub fn build(norm: &[i16], table_log: u32) -> Result<Self> {
        if table_log > FSE_MAX_TABLELOG {
            return Err(ZlitsError::TableLogTooLarge);
        }
        if norm.len() > 256 {
            return Err(ZlitsError::MaxSymbolTooLarge);
        }
        let table_size = 1usize << table_log;
        let mut entries = vec![FseDEntry::default(); table_size];
        let mut symbol_next = vec![0u32; norm.len()];
        let mut high_threshold = table_size as isize - 1;

        for (s, &n) in norm.iter().enumerate() {
            if n == -1 {
                if high_threshold < 0 {
                    return Err(ZlitsError::CorruptInput);
                }
                entries[high_threshold as usize].symbol = s as u8;
                high_threshold -= 1;
                symbol_next[s] = 1;
            } else {
                symbol_next[s] = n.max(0) as u32;
            }
        }

        let step = (table_size >> 1) + (table_size >> 3) + 3;
        let table_mask = table_size - 1;
        let mut position = 0usize;
        for (s, &n) in norm.iter().enumerate() {
            for _ in 0..n.max(0) {
                entries[position].symbol = s as u8;
                position = (position + step) & table_mask;
                while position as isize > high_threshold {
                    position = (position + step) & table_mask;
                }
            }
        }
        if position != 0 {
            return Err(ZlitsError::CorruptInput);
        }

        for e in entries.iter_mut() {
            let next = &mut symbol_next[e.symbol as usize];
            let next_state = *next;
            *next += 1;
            if next_state == 0 {
                return Err(ZlitsError::CorruptInput);
            }
            let nb = table_log - highbit32(next_state);
            e.nb_bits = nb as u8;
            e.new_state = ((next_state << nb) as usize - table_size) as u16;
        }
        Ok(FseDTable { table_log, entries })
    }

    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    #[inline]
    fn decode(&self, state: &mut usize, br: &mut BackwardBitReader<'_>) -> u8 {
        let e = self.entries[*state];
        *state = e.new_state as usize + br.read(u32::from(e.nb_bits)) as usize;
        e.symbol
    }

    /// Decode a two-state stream into at most `max_out` symbols.
    pub fn decompress(&self, src: &[u8], max_out: usize) -> Result<Vec<u8>> {
        let mut br = BackwardBitReader::new(src)?;
        let mut s1 = br.read(self.table_log) as usize;
        let mut s2 = br.read(self.table_log) as usize;
        let mut out = Vec::with_capacity(max_out);
        loop {
            if out.len() + 2 > max_out {
                return Err(ZlitsError::CorruptInput);
            }
            out.push(self.decode(&mut s1, &mut br));
            if br.overflowed() {
                out.push(self.entries[s2].symbol);
                break;
            }

            if out.len() + 2 > max_out {
                return Err(ZlitsError::CorruptInput);
            }
            out.push(self.decode(&mut s2, &mut br));
            if br.overflowed() {
                out.push(self.entries[s1].symbol);
                break;
            }
        }
        Ok(out)
    }

    /// Encode `src` (at least two symbols) so that [`decompress`](Self::decompress)
    /// reproduces it. Even positions ride the first state, odd the second.
    pub fn compress(&self, src: &[u8]) -> Result<Vec<u8>> {
        let n = src.len();
        if n < 2 {
            return Err(ZlitsError::ParameterInvalid);
        }
        let mut states_of: Vec<Vec<u16>> = vec![Vec::new(); 256];
        for (u, e) in self.entries.iter().enumerate() {
            states_of[e.symbol as usize].push(u as u16);
        }
        let first_state = |sym: u8| -> Result<u32> {
            states_of[sym as usize]
                .first()
                .map(|&u| u32::from(u))
                .ok_or(ZlitsError::MaxSymbolTooLarge)
        };

        // The last symbol of each chain starts from its lowest state. That
        // state always carries at least one bit, which is what makes the
        // decoder overrun right after the final pair.
        let mut state = [0u32; 2];
        state[(n - 1) & 1] = first_state(src[n - 1])?;
        state[(n - 2) & 1] = first_state(src[n - 2])?;

        let mut w = BitWriter::with_capacity(n + 4);
        for i in (0..n - 2).rev() {
            let chain = i & 1;
            let x = state[chain];
            let mut found = None;
            for &u in &states_of[src[i] as usize] {
                let e = self.entries[u as usize];
                let lo = u32::from(e.new_state);
                if x >= lo && x < lo + (1u32 << e.nb_bits) {
                    found = Some((u, e, x - lo));
                    break;
                }
            }
            let (u, e, bits) = found.ok_or(ZlitsError::MaxSymbolTooLarge)?;
            w.add_bits(u64::from(bits), u32::from(e.nb_bits));
            state[chain] = u32::from(u);
        }
        w.add_bits(u64::from(state[1]), self.table_log);
        w.add_bits(u64::from(state[0]), self.table_log);
        Ok(w.close())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Weight tables
// ─────────────────────────────────────────────────────────────────────────────

/// FSE-compress a Huffman weight list.
///
/// `None` when FSE does not apply: fewer than two weights, a single
/// repeated weight, or no weight occurring twice.
pub fn compress_weights(weights: &[u8]) -> Result<Option<Vec<u8>>> {
    if weights.len() <= 1 {
        return Ok(None);
    }
    let mut count = [0u32; WEIGHT_SYMBOL_MAX as usize + 1];
    for &w in weights {
        if u32::from(w) > WEIGHT_SYMBOL_MAX {
            return Err(ZlitsError::MaxSymbolTooLarge);
        }
        count[w as usize] += 1;
    }
    let max_symbol = count.iter().rposition(|&c| c > 0).unwrap_or(0) as u32;
    let max_count = count.iter().copied().max().unwrap_or(0) as usize;
    if max_count == weights.len() || max_count == 1 {
        return Ok(None);
    }

    let table_log = optimal_table_log(HUF_WEIGHTS_TABLELOG_MAX, weights.len(), max_symbol, 2);
    let counts = &count[..=max_symbol as usize];
    let norm = normalize_count(counts, weights.len(), table_log)?;
    let mut out = write_ncount(&norm, max_symbol, table_log)?;
    let table = FseDTable::build(&norm, table_log)?;
    out.extend_from_slice(&table.compress(weights)?);
    Ok(Some(out))
}

/// Decode an FSE-compressed weight list of `src.len()` bytes.
pub fn decompress_weights(src: &[u8], max_out: usize) -> Result<Vec<u8>> {
    let ncount = read_ncount(src, u32::from(u8::MAX), HUF_WEIGHTS_TABLELOG_MAX)?;
    let table = FseDTable::build(&ncount.norm, ncount.table_log)?;
    table.decompress(&src[ncount.header_size..], max_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimal_log_clamps_to_weight_limit() {
        // Plenty of weights: the cap of 6 wins.
        assert_eq!(optimal_table_log(6, 2000, 12, 2), 6);
        // 255 weights: limited by the source size.
        assert_eq!(optimal_table_log(6, 255, 12, 2), 5);
        // Tiny inputs never go below the FSE floor.
        assert_eq!(optimal_table_log(6, 3, 2, 2), FSE_MIN_TABLELOG);
        // Literals: 100 bytes drawn from 4 symbols.
        assert_eq!(optimal_table_log(11, 100, 3, 1), 5);
        assert_eq!(optimal_table_log(11, 100_000, 255, 1), 11);
    }

    #[test]
    fn normalized_counts_sum_to_table_size() {
        let counts = [100u32, 1, 1, 0, 37, 5];
        let norm = normalize_count(&counts, 144, 6).unwrap();
        assert_eq!(norm.iter().map(|&n| i32::from(n)).sum::<i32>(), 64);
        for (c, n) in counts.iter().zip(&norm) {
            assert_eq!(*c == 0, *n == 0);
        }
    }

    #[test]
    fn ncount_header_is_read_back() {
        let norm = [20i16, 0, 0, 0, 0, 7, 1, 0, 4];
        let hdr = write_ncount(&norm, 8, 5).unwrap();
        let back = read_ncount(&hdr, 255, 6).unwrap();
        assert_eq!(back.norm, norm);
        assert_eq!(back.table_log, 5);
        assert_eq!(back.max_symbol, 8);
        assert_eq!(back.header_size, hdr.len());
    }

    #[test]
    fn ncount_rejects_excessive_log() {
        // low nibble 2 → table log 7, above the weight ceiling of 6
        assert_eq!(read_ncount(&[0x02, 0, 0], 255, 6), Err(ZlitsError::TableLogTooLarge));
    }

    #[test]
    fn dtable_spreads_every_slot() {
        let norm = [10i16, 11, 6, -1, 4];
        let t = FseDTable::build(&norm, 5).unwrap();
        assert_eq!(t.entries.len(), 32);
        assert_eq!(t.entries[31].symbol, 3);
        assert_eq!(t.entries[31].nb_bits, 5);
        let mut hist = [0i16; 5];
        for e in &t.entries {
            hist[e.symbol as usize] += 1;
        }
        assert_eq!(hist, [10, 11, 6, 1, 4]);
    }

    #[test]
    fn weights_survive_fse_coding() {
        let weights: Vec<u8> = (0..120u32).map(|i| [1u8, 1, 2, 3, 1, 0, 2, 4][(i % 8) as usize]).collect();
        let packed = compress_weights(&weights).unwrap().expect("compressible");
        assert!(packed.len() < weights.len() / 2);
        assert_eq!(decompress_weights(&packed, 255).unwrap(), weights);
    }

    #[test]
    fn odd_and_even_lengths_decode_exactly() {
        for len in [2usize, 3, 7, 64, 65] {
            let weights: Vec<u8> = (0..len).map(|i| (i % 3) as u8 + 1 + u8::from(i % 5 == 4)).collect();
            let mut count = [0u32; 13];
            for &w in &weights {
                count[w as usize] += 1;
            }
            let max_symbol = count.iter().rposition(|&c| c > 0).unwrap() as u32;
            let norm = normalize_count(&count[..=max_symbol as usize], len, 5).unwrap();
            let table = FseDTable::build(&norm, 5).unwrap();
            let stream = table.compress(&weights).unwrap();
            assert_eq!(table.decompress(&stream, 255).unwrap(), weights, "len {len}");
        }
    }

    #[test]
    fn uniform_or_unique_weights_are_not_compressed() {
        assert_eq!(compress_weights(&[3; 40]).unwrap(), None);
        assert_eq!(compress_weights(&[0, 1, 2, 3]).unwrap(), None);
        assert_eq!(compress_weights(&[5]).unwrap(), None);
    }
}
