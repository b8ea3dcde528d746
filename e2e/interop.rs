//! Interoperability tests against frames produced by the `zstd` crate
//! (libzstd). They check that the walker, the literals iterator and the
//! recompressor agree with a real encoder's output, across compression
//! levels and multi-block frames.

use std::io::Write;

use zlits::frame::{find_frame_compressed_size, parse_frame_header, split_frames};
use zlits::literals::{decode_all_literals, LiteralsDecode, LiteralsDecoder};
use zlits::{for_each_literals_block, walk_blocks, IterationCommand, LiteralsCompressor};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Word salad with a skewed byte distribution, long enough to span blocks.
fn corpus(size: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "frame", "block", "literal", "huffman", "weight", "stream", "the", "of", "and",
        "sequence", "offset", "match", "window", "checksum", "zstd", "entropy", "repeat",
        "table", "symbol", "42", "1999", "\n",
    ];
    let mut s = 0x9E37_79B9u32;
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        out.extend_from_slice(WORDS[s as usize % WORDS.len()].as_bytes());
        out.push(if s & 0x30 == 0 { b',' } else { b' ' });
    }
    out.truncate(size);
    out
}

fn compress(data: &[u8], level: i32) -> Vec<u8> {
    zstd::bulk::compress(data, level).unwrap()
}

fn compress_with_checksum(data: &[u8], level: i32) -> Vec<u8> {
    let mut enc = zstd::stream::Encoder::new(Vec::new(), level).unwrap();
    enc.include_checksum(true).unwrap();
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// A frame of literals-only Compressed blocks, one per section, each
/// followed by a zero sequence count. Huffman tables carry across blocks
/// the way they do in any frame, so Repeat sections decode too.
fn literals_only_frame(sections: &[Vec<u8>], content_size: usize) -> Vec<u8> {
    let mut frame = vec![0x28, 0xB5, 0x2F, 0xFD];
    // 8-byte content size, 128 KiB window.
    frame.push(0xC0);
    frame.push(7 << 3);
    frame.extend_from_slice(&(content_size as u64).to_le_bytes());
    for (i, section) in sections.iter().enumerate() {
        let last = u32::from(i + 1 == sections.len());
        let size = (section.len() + 1) as u32;
        let bh = last | (2 << 1) | (size << 3);
        frame.extend_from_slice(&bh.to_le_bytes()[..3]);
        frame.extend_from_slice(section);
        frame.push(0);
    }
    frame
}

/// `needle` appears in `haystack` in order, not necessarily contiguously.
fn is_subsequence(needle: &[u8], haystack: &[u8]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|b| rest.any(|h| h == b))
}

fn literal_streams(frame: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    for_each_literals_block(frame, |_, lits, _| {
        out.push(lits.to_vec());
        Ok(IterationCommand::Continue)
    })
    .unwrap();
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn block_sizes_cover_the_whole_frame() {
    let data = corpus(600_000);
    for level in [1, 3, 9, 19] {
        let frame = compress(&data, level);
        let mut total = parse_frame_header(&frame).unwrap().header_size;
        let mut last_flags = 0;
        let mut blocks = 0;
        let n = walk_blocks(&frame, |block, _| {
            total += block.len();
            blocks += 1;
            last_flags += usize::from(block[0] & 1);
            Ok(IterationCommand::Continue)
        })
        .unwrap();
        assert_eq!(n, blocks);
        assert!(blocks >= 5, "level {level}: {blocks} blocks");
        assert_eq!(last_flags, 1);
        assert_eq!(total, frame.len(), "level {level}");
    }
}

#[test]
fn frame_extent_includes_checksum() {
    let data = corpus(50_000);
    let frame = compress_with_checksum(&data, 3);
    let fh = parse_frame_header(&frame).unwrap();
    assert!(fh.checksum_flag);
    assert_eq!(find_frame_compressed_size(&frame).unwrap(), frame.len());
}

#[test]
fn literals_of_every_level_decode() {
    let data = corpus(400_000);
    let mut alphabet = [false; 256];
    for &b in &data {
        alphabet[usize::from(b)] = true;
    }
    for level in [1, 3, 12, 19] {
        let frame = compress(&data, level);
        let total = decode_all_literals(&frame).unwrap();
        assert!(total > 0, "level {level}");
        assert!(total < data.len(), "level {level}");
        for stream in literal_streams(&frame) {
            assert!(stream.iter().all(|&b| alphabet[usize::from(b)]));
        }
    }
}

#[test]
fn literals_are_a_subsequence_of_the_source() {
    let data = corpus(300_000);
    for level in [-5, 1, 3, 12, 19] {
        let frame = compress(&data, level);
        let literals = literal_streams(&frame).concat();
        assert!(!literals.is_empty(), "level {level}");
        assert!(is_subsequence(&literals, &data), "level {level}");
    }
}

#[test]
fn incompressible_input_uses_raw_blocks() {
    let mut s = 1u64;
    let data: Vec<u8> = (0..300_000)
        .map(|_| {
            s = s.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (s >> 56) as u8
        })
        .collect();
    let frame = compress(&data, 3);
    let mut raw = 0usize;
    walk_blocks(&frame, |block, ty| {
        if ty == zlits::BlockType::Raw {
            raw += block.len() - 3;
        }
        Ok(IterationCommand::Continue)
    })
    .unwrap();
    assert_eq!(raw, data.len());
    assert_eq!(decode_all_literals(&frame).unwrap(), 0);
}

#[test]
fn recompressed_literals_decode_to_the_originals() {
    let data = corpus(500_000);
    let frame = compress(&data, 6);
    let streams = literal_streams(&frame);
    assert!(!streams.is_empty());

    let mut ctx = LiteralsCompressor::new().unwrap();
    let mut dec = LiteralsDecoder::new().unwrap();
    for stream in &streams {
        let n = ctx.recompress(stream, false).unwrap();
        assert_eq!(dec.decode_literals(ctx.output()).unwrap(), n);
        assert_eq!(dec.literals(), &stream[..]);
    }
}

#[test]
fn libzstd_decodes_recompressed_sections() {
    let data = corpus(500_000);
    for (level, suspect) in [(3, false), (19, false), (1, true)] {
        let streams = literal_streams(&compress(&data, level));
        let mut ctx = LiteralsCompressor::new().unwrap();
        let sections: Vec<Vec<u8>> = streams
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| {
                ctx.recompress(s, suspect).unwrap();
                ctx.output().to_vec()
            })
            .collect();
        let expected: Vec<u8> = streams.concat();
        assert!(!sections.is_empty());

        let frame = literals_only_frame(&sections, expected.len());
        let decoded = zstd::stream::decode_all(&frame[..]).unwrap();
        assert_eq!(decoded, expected, "level {level}");
    }
}

#[test]
fn concatenated_and_skippable_frames() {
    let a = compress(&corpus(10_000), 3);
    let b = compress(b"", 3);
    let c = compress_with_checksum(&corpus(200_000), 1);

    let mut data = a.clone();
    data.extend_from_slice(&0x184D_2A5Eu32.to_le_bytes());
    data.extend_from_slice(&3u32.to_le_bytes());
    data.extend_from_slice(b"abc");
    data.extend_from_slice(&b);
    data.extend_from_slice(&c);

    let frames = split_frames(&data).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], &a[..]);
    assert_eq!(frames[1], &b[..]);
    assert_eq!(frames[2], &c[..]);

    let decoded = zstd::stream::decode_all(&data[..]).unwrap();
    let literal_total: usize = frames.iter().map(|f| decode_all_literals(f).unwrap()).sum();
    assert!(literal_total <= decoded.len());
}
