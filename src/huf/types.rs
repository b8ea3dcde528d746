//! Shared Huffman vocabulary.

/// Bytes of the jump table in front of a 4-stream payload: three LE16
/// stream sizes, the fourth implied.
pub const HUF_4X_JUMP_TABLE_SIZE: usize = 6;

/// Whether a previously built Huffman table may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HufRepeat {
    /// No usable table.
    #[default]
    None,
    /// A table exists but must be checked against the new symbols first.
    Check,
    /// The table covers every symbol and can be reused as-is.
    Valid,
}

impl HufRepeat {
    pub fn name(self) -> &'static str {
        match self {
            HufRepeat::None => "none",
            HufRepeat::Check => "check",
            HufRepeat::Valid => "valid",
        }
    }
}

/// Number of Huffman bitstreams in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HufStreams {
    Single,
    Four,
}

impl HufStreams {
    pub fn count(self) -> usize {
        match self {
            HufStreams::Single => 1,
            HufStreams::Four => 4,
        }
    }
}

/// Decoding table layout.
///
/// `SingleSymbol` resolves one symbol per table lookup. `DoubleSymbol`
/// resolves two whenever both codes fit in one lookup, at the cost of a
/// slower table build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HufDecompressMode {
    #[default]
    SingleSymbol,
    DoubleSymbol,
}

impl HufDecompressMode {
    pub fn name(self) -> &'static str {
        match self {
            HufDecompressMode::SingleSymbol => "single-symbol",
            HufDecompressMode::DoubleSymbol => "double-symbol",
        }
    }
}
