//! Sizing and capability probes.
//!
//! Stateless helpers for callers that size their own buffers to match the
//! Huffman coder. Sizes are expressed in the word units used by the zstd
//! C library, so buffers sized either way are interchangeable.

use std::sync::OnceLock;

use crate::config::HUF_WORKSPACE_SIZE;

/// 64-bit words needed for a compression table covering symbols
/// `0..=max_symbol` (one 32-bit slot per symbol plus a header word).
pub fn sizeof_compression_table(max_symbol: usize) -> usize {
    max_symbol / 2 + (max_symbol & 1) + 1
}

/// 32-bit words needed for a decompression table of `max_table_log`
/// (one 16-bit cell per state, a header cell, then one word of slack).
/// Saturates at `usize::MAX` for logs too large to address.
pub fn sizeof_decompression_table(max_table_log: u32) -> usize {
    1usize
        .checked_shl(max_table_log)
        .map_or(usize::MAX, |cells| cells.saturating_add(2))
}

/// 32-bit words of scratch needed to build a Huffman table.
pub fn sizeof_table_build_workspace() -> usize {
    HUF_WORKSPACE_SIZE / 4
}

/// Whether the CPU offers BMI2 bit-field instructions. Probed once.
pub fn has_fast_bit_ops() -> bool {
    static FAST_BIT_OPS: OnceLock<bool> = OnceLock::new();
    *FAST_BIT_OPS.get_or_init(detect_fast_bit_ops)
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn detect_fast_bit_ops() -> bool {
    std::is_x86_feature_detected!("bmi2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn detect_fast_bit_ops() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sizes_for_literals() {
        assert_eq!(sizeof_compression_table(255), 129);
        assert_eq!(sizeof_compression_table(0), 1);
        assert_eq!(sizeof_decompression_table(12), 4098);
        assert_eq!(sizeof_decompression_table(0), 3);
        assert_eq!(sizeof_table_build_workspace(), 2176);
    }

    #[test]
    fn extreme_arguments_do_not_overflow() {
        assert_eq!(sizeof_compression_table(usize::MAX), usize::MAX / 2 + 2);
        assert_eq!(sizeof_compression_table(usize::MAX - 1), usize::MAX / 2 + 1);
        assert_eq!(sizeof_decompression_table(usize::BITS), usize::MAX);
        assert_eq!(sizeof_decompression_table(u32::MAX), usize::MAX);
        assert_eq!(
            sizeof_decompression_table(usize::BITS - 1),
            (1usize << (usize::BITS - 1)) + 2
        );
    }

    #[test]
    fn capability_probe_is_stable() {
        assert_eq!(has_fast_bit_ops(), has_fast_bit_ops());
    }
}
