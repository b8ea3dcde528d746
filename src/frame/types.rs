//! Zstandard frame format types and constants (RFC 8878 §3.1).
//!
//! Covers:
//! - Magic numbers for standard and skippable frames
//! - Frame header field sizes (`DID_FIELD_SIZE`, `FCS_FIELD_SIZE`)
//! - `BlockType`, `BlockHeader`, `FrameHeader`
//! - `IterationCommand`, the visitor return value shared by every walker

// ─────────────────────────────────────────────────────────────────────────────
// Frame format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Magic number opening every standard Zstandard frame (bytes `28 B5 2F FD`).
pub const ZSTD_MAGICNUMBER: u32 = 0xFD2F_B528;

/// Skippable frames use magics `0x184D2A50..=0x184D2A5F`.
pub const ZSTD_MAGIC_SKIPPABLE_START: u32 = 0x184D_2A50;
pub const ZSTD_MAGIC_SKIPPABLE_MASK: u32 = 0xFFFF_FFF0;

/// Skippable frame header: 4-byte magic + 4-byte user data size.
pub const ZSTD_SKIPPABLEHEADERSIZE: usize = 8;

/// Bytes needed to compute the frame header size: magic + frame header descriptor.
pub const ZSTD_FRAMEHEADERSIZE_PREFIX: usize = 5;

/// Smallest possible frame header.
pub const ZSTD_FRAMEHEADERSIZE_MIN: usize = 6;

/// Largest possible frame header.
pub const ZSTD_FRAMEHEADERSIZE_MAX: usize = 18;

/// Every block starts with a 3-byte little-endian header.
pub const ZSTD_BLOCKHEADERSIZE: usize = 3;

/// Optional content checksum trailing the last block (low 32 bits of XXH64).
pub const ZSTD_CHECKSUM_SIZE: usize = 4;

/// Largest window log accepted by a 64-bit decoder.
pub const ZSTD_WINDOWLOG_MAX: u32 = 31;

/// Window log base: the window descriptor's exponent is relative to this.
pub const ZSTD_WINDOWLOG_ABSOLUTEMIN: u32 = 10;

/// Size of the Dictionary_ID field, indexed by the descriptor's 2-bit flag.
pub const DID_FIELD_SIZE: [usize; 4] = [0, 1, 2, 4];

/// Size of the Frame_Content_Size field, indexed by the descriptor's 2-bit flag.
/// Flag 0 means 1 byte when the single-segment flag is set.
pub const FCS_FIELD_SIZE: [usize; 4] = [0, 2, 4, 8];

/// Reserved bit of the frame header descriptor; must be zero.
pub const FHD_RESERVED_BIT: u8 = 0x08;

// ─────────────────────────────────────────────────────────────────────────────
// Block types
// ─────────────────────────────────────────────────────────────────────────────

/// Type of a block, taken from bits 1–2 of its header.
///
/// The fourth encoding (3, "Reserved") is not a variant: parsing it yields
/// [`ZlitsError::UnsupportedState`](crate::ZlitsError::UnsupportedState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// Payload is stored verbatim.
    Raw = 0,
    /// Payload is a single byte repeated `content_size` times.
    Rle = 1,
    /// Payload is a literals section followed by a sequences section.
    Compressed = 2,
}

impl BlockType {
    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            BlockType::Raw => "raw",
            BlockType::Rle => "rle",
            BlockType::Compressed => "compressed",
        }
    }
}

/// Decoded 3-byte block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Set on the final block of the frame.
    pub last: bool,
    pub block_type: BlockType,
    /// The 21-bit size field: payload bytes for Raw/Compressed, regenerated
    /// bytes for RLE.
    pub content_size: u32,
    /// Payload bytes following the header (1 for RLE).
    pub payload_size: usize,
}

impl BlockHeader {
    /// Header plus payload.
    #[inline]
    pub fn block_size(&self) -> usize {
        ZSTD_BLOCKHEADERSIZE + self.payload_size
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame header
// ─────────────────────────────────────────────────────────────────────────────

/// Decoded Zstandard frame header (RFC 8878 §3.1.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    /// Total header length, magic included.
    pub header_size: usize,
    /// Decoded Frame_Content_Size, when present.
    pub content_size: Option<u64>,
    /// Window size required to decode the frame.
    pub window_size: u64,
    /// Dictionary ID; 0 = none.
    pub dict_id: u32,
    /// Whether a 4-byte content checksum follows the last block.
    pub checksum_flag: bool,
    /// Single-segment frames carry no window descriptor.
    pub single_segment: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Visitor control
// ─────────────────────────────────────────────────────────────────────────────

/// Returned by visitors to continue or stop a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationCommand {
    Continue,
    Break,
}
