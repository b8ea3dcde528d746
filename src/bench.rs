//! Timing loop behind `zlits bench`.
//!
//! Literal streams are extracted once up front. Each pass then times a full
//! decode of every frame's literals and a recompression of every extracted
//! stream through one context. The fastest pass of each kind is kept.

use std::time::Instant;

use crate::cli::constants::MB;
use crate::error::Result;
use crate::frame::IterationCommand;
use crate::literals::{decode_all_literals, for_each_literals_block, LiteralsCompressor};

/// Best-of-N timings for one data set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BenchResult {
    pub frames: usize,
    /// Literals sections found across all frames.
    pub sections: usize,
    /// Regenerated literal bytes per pass.
    pub literals_bytes: u64,
    /// Section bytes as stored in the input.
    pub stored_bytes: u64,
    /// Section bytes after recompression.
    pub recompressed_bytes: u64,
    pub decode_ns: u64,
    pub recompress_ns: u64,
}

fn mb_per_s(bytes: u64, ns: u64) -> f64 {
    bytes as f64 * 1e9 / ns.max(1) as f64 / MB as f64
}

impl BenchResult {
    pub fn decode_mb_s(&self) -> f64 {
        mb_per_s(self.literals_bytes, self.decode_ns)
    }

    pub fn recompress_mb_s(&self) -> f64 {
        mb_per_s(self.literals_bytes, self.recompress_ns)
    }

    /// Recompressed over stored section bytes; 0 when nothing was stored.
    pub fn ratio(&self) -> f64 {
        if self.stored_bytes == 0 {
            return 0.0;
        }
        self.recompressed_bytes as f64 / self.stored_bytes as f64
    }
}

/// Run `iters` passes (at least one) over `frames`.
pub fn bench_literals(frames: &[&[u8]], iters: u32) -> Result<BenchResult> {
    let mut result = BenchResult {
        frames: frames.len(),
        ..BenchResult::default()
    };

    let mut streams: Vec<Vec<u8>> = Vec::new();
    for frame in frames {
        for_each_literals_block(frame, |section, literals, _| {
            result.stored_bytes += section.len() as u64;
            streams.push(literals.to_vec());
            Ok(IterationCommand::Continue)
        })?;
    }
    result.sections = streams.len();
    result.literals_bytes = streams.iter().map(|s| s.len() as u64).sum();

    let mut ctx = LiteralsCompressor::new()?;
    let mut best_decode = u64::MAX;
    let mut best_recompress = u64::MAX;
    for _ in 0..iters.max(1) {
        let start = Instant::now();
        for frame in frames {
            decode_all_literals(frame)?;
        }
        best_decode = best_decode.min(start.elapsed().as_nanos() as u64);

        ctx.reset_tables();
        let mut recompressed = 0u64;
        let start = Instant::now();
        for stream in &streams {
            recompressed += ctx.recompress(stream, false)? as u64;
        }
        best_recompress = best_recompress.min(start.elapsed().as_nanos() as u64);
        result.recompressed_bytes = recompressed;
    }
    result.decode_ns = best_decode;
    result.recompress_ns = best_recompress;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_set() {
        let r = bench_literals(&[], 2).unwrap();
        assert_eq!(r.frames, 0);
        assert_eq!(r.sections, 0);
        assert_eq!(r.ratio(), 0.0);
        assert!(r.decode_mb_s() >= 0.0);
    }

    #[test]
    fn throughput_uses_regenerated_bytes() {
        let r = BenchResult {
            literals_bytes: 1 << 20,
            decode_ns: 500_000_000,
            recompress_ns: 1_000_000_000,
            stored_bytes: 100,
            recompressed_bytes: 50,
            ..BenchResult::default()
        };
        assert!((r.decode_mb_s() - 2.0).abs() < 1e-9);
        assert!((r.recompress_mb_s() - 1.0).abs() < 1e-9);
        assert!((r.ratio() - 0.5).abs() < 1e-9);
    }
}
