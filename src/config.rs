// config.rs: Compile-time configuration constants.
//
// Sizes below are fixed by the Zstandard format (RFC 8878) or by the
// Huffman coder's table limits. Worker-count and verbosity defaults can be
// overridden at runtime through environment variables (see `cli::op_mode`)
// or command-line flags.

// Maximum regenerated size of one block, and therefore of one literals
// section. Literal streams larger than this are rejected by the
// recompression context.
pub const BLOCKSIZE_MAX: usize = 128 * 1024;

// Largest literals section header (Compressed/Repeat, size class 3).
pub const LITERALS_HEADER_MAX: usize = 5;

// Capacity of the recompression context's output buffer.
// Sized so that a full BLOCKSIZE_MAX stream can always be stored raw.
pub const RECOMPRESS_CAPACITY: usize = BLOCKSIZE_MAX + LITERALS_HEADER_MAX;

// Literals shorter than this are stored raw without attempting Huffman
// coding. The second threshold applies when a verified table is already
// available.
pub const MIN_LITERALS_TO_COMPRESS: usize = 64;
pub const MIN_LITERALS_TO_COMPRESS_REPEAT: usize = 7;

// Inputs at or below this size prefer an already-checked table over
// building a fresh one.
pub const PREFER_REPEAT_MAX_SIZE: usize = 1024;

// Maximum Huffman table log accepted by the decoder and the table builder.
pub const HUF_TABLELOG_MAX: u32 = 12;

// Default Huffman table log used for literals.
pub const HUF_TABLELOG_DEFAULT: u32 = 11;

// Largest symbol value a literals table can describe.
pub const HUF_SYMBOLVALUE_MAX: u32 = 255;

// Scratch bytes required to build a Huffman table.
pub const HUF_WORKSPACE_SIZE: usize = (8 << 10) + 512;

// Table log ceiling for the FSE stream describing Huffman weights.
pub const HUF_WEIGHTS_TABLELOG_MAX: u32 = 6;

// When the caller hints that data is incompressible, this many bytes are
// sampled at each end of the input before committing to a full histogram.
// Sampling only kicks in for inputs of at least SAMPLE_SIZE * SAMPLE_RATIO.
pub const SUSPECT_UNCOMPRESSIBLE_SAMPLE_SIZE: usize = 4096;
pub const SUSPECT_UNCOMPRESSIBLE_SAMPLE_RATIO: usize = 10;

// Default number of worker threads for file processing.
// 0 = auto-detect with `num_cpus`. Overridden by ZLITS_NBWORKERS or -T#.
pub const NB_WORKERS_DEFAULT: usize = 0;

// Maximum number of worker threads selectable at runtime.
pub const NB_WORKERS_MAX: usize = 200;

// Default display level: 2 = normal output, downgradable with -q.
// Overridden by ZLITS_DISPLAY_LEVEL or -v / -q.
pub const DISPLAY_LEVEL_DEFAULT: u32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recompress_capacity_holds_full_raw_block() {
        assert_eq!(RECOMPRESS_CAPACITY, 131_077);
        // Largest raw literals header is 3 bytes, smaller than the reserve.
        assert!(BLOCKSIZE_MAX + 3 <= RECOMPRESS_CAPACITY);
    }

    #[test]
    fn huf_limits_are_ordered() {
        assert!(HUF_TABLELOG_DEFAULT <= HUF_TABLELOG_MAX);
        assert!(HUF_WEIGHTS_TABLELOG_MAX < HUF_TABLELOG_MAX);
        assert_eq!(HUF_WORKSPACE_SIZE / 4, 2176);
    }
}
