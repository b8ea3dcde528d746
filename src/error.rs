//! Error type shared by the frame walker, the literals codecs and the
//! Huffman coder.
//!
//! Every fallible operation in the crate returns [`Result`]. Input problems
//! (`CorruptInput`, `SizeMismatch`) and resource problems (`OutOfMemory`,
//! `DstTooSmall`) are ordinary recoverable errors. `UnsupportedState` marks
//! a defect: either a reserved block type reached a code path that cannot
//! represent it, or two independent computations of the same size
//! disagreed. Callers decide whether a defect aborts; use
//! [`ZlitsError::is_defect`] to tell it apart.

use core::fmt;

/// Errors reported by `zlits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZlitsError {
    /// A frame, block, literals header, Huffman table or bitstream field is malformed.
    CorruptInput,
    /// A declared size exceeds the bytes remaining, or the input exceeds a fixed capacity.
    SizeMismatch,
    /// A context buffer could not be allocated.
    OutOfMemory,
    /// Internal inconsistency (reserved block type, header/decode size disagreement).
    UnsupportedState,
    /// Caller-provided destination buffer is too small.
    DstTooSmall,
    /// Requested or declared table log exceeds the supported maximum.
    TableLogTooLarge,
    /// A table cannot encode a symbol present in the input, or the symbol range is too wide.
    MaxSymbolTooLarge,
    /// An argument is outside the range the operation accepts.
    ParameterInvalid,
}

impl ZlitsError {
    /// Stable, machine-friendly name of the error.
    pub fn error_name(&self) -> &'static str {
        match self {
            ZlitsError::CorruptInput => "ERROR_corruption_detected",
            ZlitsError::SizeMismatch => "ERROR_srcSize_wrong",
            ZlitsError::OutOfMemory => "ERROR_memory_allocation",
            ZlitsError::UnsupportedState => "ERROR_unsupported_state",
            ZlitsError::DstTooSmall => "ERROR_dstSize_tooSmall",
            ZlitsError::TableLogTooLarge => "ERROR_tableLog_tooLarge",
            ZlitsError::MaxSymbolTooLarge => "ERROR_maxSymbolValue_tooLarge",
            ZlitsError::ParameterInvalid => "ERROR_parameter_invalid",
        }
    }

    /// `true` for internal-consistency failures that indicate a bug rather
    /// than bad input.
    #[inline]
    pub fn is_defect(&self) -> bool {
        matches!(self, ZlitsError::UnsupportedState)
    }
}

impl fmt::Display for ZlitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for ZlitsError {}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, ZlitsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unsupported_state_is_a_defect() {
        let all = [
            ZlitsError::CorruptInput,
            ZlitsError::SizeMismatch,
            ZlitsError::OutOfMemory,
            ZlitsError::UnsupportedState,
            ZlitsError::DstTooSmall,
            ZlitsError::TableLogTooLarge,
            ZlitsError::MaxSymbolTooLarge,
            ZlitsError::ParameterInvalid,
        ];
        let defects: Vec<_> = all.iter().filter(|e| e.is_defect()).collect();
        assert_eq!(defects, vec![&ZlitsError::UnsupportedState]);
    }

    #[test]
    fn display_matches_error_name() {
        let e = ZlitsError::SizeMismatch;
        assert_eq!(e.to_string(), e.error_name());
        assert_eq!(ZlitsError::CorruptInput.to_string(), "ERROR_corruption_detected");
    }

    #[test]
    fn usable_as_boxed_std_error() {
        let boxed: Box<dyn std::error::Error> = Box::new(ZlitsError::OutOfMemory);
        assert_eq!(boxed.to_string(), "ERROR_memory_allocation");
    }
}
