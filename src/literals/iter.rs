//! Literals iteration over a frame.
//!
//! [`for_each_literals_block`] walks a frame and, for every Compressed
//! block, decodes its literals fully and cross-checks the section size
//! against [`decode_literals_header`]. The two computations are independent;
//! disagreement is reported as `UnsupportedState`, never as bad input.

use crate::debugoutput;
use crate::error::{Result, ZlitsError};
use crate::frame::types::{BlockType, IterationCommand, ZSTD_BLOCKHEADERSIZE};
use crate::frame::walk::walk_blocks;
use crate::literals::decode::{LiteralsDecode, LiteralsDecoder};
use crate::literals::header::decode_literals_header;
use crate::literals::types::LiteralsBlockType;

/// Visit the literals of every Compressed block of `frame`.
///
/// The visitor receives the literals section as stored (header included),
/// the regenerated literals, and the encoding type. Raw and RLE blocks carry
/// no literals section and are skipped; they still count towards the
/// returned total, which is the number of blocks walked.
pub fn for_each_literals_block<F>(frame: &[u8], visitor: F) -> Result<usize>
where
    F: FnMut(&[u8], &[u8], LiteralsBlockType) -> Result<IterationCommand>,
{
    let mut decoder = LiteralsDecoder::new()?;
    for_each_literals_block_with(&mut decoder, frame, visitor)
}

/// [`for_each_literals_block`] with a caller-supplied decoder.
pub fn for_each_literals_block_with<D, F>(decoder: &mut D, frame: &[u8], mut visitor: F) -> Result<usize>
where
    D: LiteralsDecode,
    F: FnMut(&[u8], &[u8], LiteralsBlockType) -> Result<IterationCommand>,
{
    walk_blocks(frame, |block, block_type| {
        if block_type != BlockType::Compressed {
            return Ok(IterationCommand::Continue);
        }
        let decoded_size = decoder.decode_literals(&block[ZSTD_BLOCKHEADERSIZE..])?;
        let (section, ty) = decode_literals_header(block)?;
        if section.len() != decoded_size {
            debugoutput!(
                "literals size disagreement: header {} vs decode {}\n",
                section.len(),
                decoded_size
            );
            return Err(ZlitsError::UnsupportedState);
        }
        visitor(section, decoder.literals(), ty)
    })
}

/// Decode the literals of every Compressed block of `frame` and return the
/// total number of regenerated literal bytes.
pub fn decode_all_literals(frame: &[u8]) -> Result<usize> {
    let mut total = 0usize;
    for_each_literals_block(frame, |_, literals, _| {
        total += literals.len();
        Ok(IterationCommand::Continue)
    })?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::types::ZSTD_MAGICNUMBER;

    fn frame(blocks: &[(u32, &[u8])]) -> Vec<u8> {
        let mut v = ZSTD_MAGICNUMBER.to_le_bytes().to_vec();
        // single segment, 1-byte content size (unchecked here)
        v.extend_from_slice(&[0x20, 0]);
        for (i, (ty, payload)) in blocks.iter().enumerate() {
            let last = u32::from(i + 1 == blocks.len());
            let size = if *ty == 1 { 4 } else { payload.len() as u32 };
            let raw = last | (ty << 1) | (size << 3);
            v.extend_from_slice(&raw.to_le_bytes()[..3]);
            v.extend_from_slice(payload);
        }
        v
    }

    #[test]
    fn skips_raw_and_rle_blocks() {
        let f = frame(&[
            (0, &b"plain"[..]),
            (1, &b"r"[..]),
            (2, &[3 << 3, b'a', b'b', b'c', 0][..]),
        ]);
        let mut seen = Vec::new();
        let n = for_each_literals_block(&f, |section, lits, ty| {
            seen.push((section.to_vec(), lits.to_vec(), ty));
            Ok(IterationCommand::Continue)
        })
        .unwrap();
        assert_eq!(n, 3);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, b"abc");
        assert_eq!(seen[0].2, LiteralsBlockType::Raw);
        assert_eq!(seen[0].0.len(), 4);
    }

    #[test]
    fn decode_error_is_propagated() {
        let f = frame(&[(2, &[3, 0, 0, 0, 0, 0][..])]);
        let r = for_each_literals_block(&f, |_, _, _| Ok(IterationCommand::Continue));
        assert_eq!(r, Err(ZlitsError::CorruptInput));
    }

    struct OffByOne(LiteralsDecoder);

    impl LiteralsDecode for OffByOne {
        fn decode_literals(&mut self, src: &[u8]) -> Result<usize> {
            self.0.decode_literals(src).map(|n| n + 1)
        }
        fn literals(&self) -> &[u8] {
            self.0.literals()
        }
    }

    #[test]
    fn size_disagreement_is_a_defect() {
        let f = frame(&[(2, &[2 << 3, b'a', b'b', 0][..])]);
        let mut d = OffByOne(LiteralsDecoder::new().unwrap());
        let r = for_each_literals_block_with(&mut d, &f, |_, _, _| Ok(IterationCommand::Continue));
        assert_eq!(r, Err(ZlitsError::UnsupportedState));
        assert!(r.unwrap_err().is_defect());
    }

    #[test]
    fn total_regenerated_bytes() {
        let f = frame(&[
            (2, &[3 << 3, b'a', b'b', b'c', 0][..]),
            (2, &[1 | (9 << 3), b'z', 0][..]),
        ]);
        assert_eq!(decode_all_literals(&f).unwrap(), 12);
    }
}
