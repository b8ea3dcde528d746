// Integration tests for the Huffman collaborator: table build, table
// description, and 1-stream / 4-stream payloads.

use zlits::config::{HUF_TABLELOG_DEFAULT, HUF_TABLELOG_MAX};
use zlits::huf::{
    compress_repeat, histogram, read_stats, HufCTable, HufDTable, HufDecompressMode, HufRepeat,
    HufStreams, RepeatOptions,
};
use zlits::ZlitsError;

fn sample(n: usize) -> Vec<u8> {
    let alphabet = b"eeeeeeeetttttaaaaooiinnsshrdlcumwfgypbvkjxqz0123456789";
    let mut s = 12_345u32;
    (0..n)
        .map(|_| {
            s = s.wrapping_mul(22_695_477).wrapping_add(1);
            alphabet[(s >> 16) as usize % alphabet.len()]
        })
        .collect()
}

fn table_for(src: &[u8], max_bits: u32) -> HufCTable {
    let h = histogram(src);
    HufCTable::build(&h.counts, h.max_symbol, max_bits).unwrap()
}

fn loaded_dtable(ct: &HufCTable) -> HufDTable {
    let desc = ct.write().unwrap();
    let mut dt = HufDTable::new(HUF_TABLELOG_MAX).unwrap();
    assert_eq!(dt.read(&desc).unwrap(), desc.len());
    assert_eq!(dt.table_log(), ct.table_log());
    dt
}

#[test]
fn single_stream_round_trip() {
    let src = sample(1_000);
    let ct = table_for(&src, HUF_TABLELOG_DEFAULT);
    let dt = loaded_dtable(&ct);

    let mut c = vec![0u8; 2_000];
    let n = ct.compress_1x(&mut c, &src).unwrap();
    assert!(n > 0 && n < src.len());
    let mut out = vec![0u8; src.len()];
    dt.decompress_1x(&mut out, &c[..n]).unwrap();
    assert_eq!(out, src);
}

#[test]
fn four_stream_round_trip() {
    let src = sample(10_001);
    let ct = table_for(&src, HUF_TABLELOG_DEFAULT);
    let dt = loaded_dtable(&ct);

    let mut c = vec![0u8; 12_000];
    let n = ct.compress(&mut c, &src, HufStreams::Four).unwrap();
    assert!(n > 6);
    let mut out = vec![0u8; src.len()];
    dt.decompress_4x(&mut out, &c[..n]).unwrap();
    assert_eq!(out, src);
}

#[test]
fn double_symbol_table_round_trip() {
    let src = sample(20_000);
    for max_bits in [8, HUF_TABLELOG_DEFAULT, HUF_TABLELOG_MAX] {
        let ct = table_for(&src, max_bits);
        let desc = ct.write().unwrap();
        let mut dt = HufDTable::with_mode(HUF_TABLELOG_MAX, HufDecompressMode::DoubleSymbol).unwrap();
        assert_eq!(dt.read(&desc).unwrap(), desc.len());
        assert_eq!(dt.mode(), HufDecompressMode::DoubleSymbol);

        let mut c = vec![0u8; src.len()];
        let n = ct.compress_4x(&mut c, &src).unwrap();
        assert!(n > 0);
        let mut out = vec![0u8; src.len()];
        dt.decompress_4x(&mut out, &c[..n]).unwrap();
        assert_eq!(out, src, "max bits {max_bits}");

        let n = ct.compress_1x(&mut c, &src[..999]).unwrap();
        let mut out = vec![0u8; 999];
        dt.decompress_1x(&mut out, &c[..n]).unwrap();
        assert_eq!(out, &src[..999]);
    }
}

#[test]
fn code_lengths_respect_the_limit() {
    // Fibonacci-like counts force long codes without a limit.
    let mut counts = [0u32; 256];
    let (mut a, mut b) = (1u32, 1u32);
    for c in counts.iter_mut().take(24) {
        *c = a;
        let next = a + b;
        a = b;
        b = next;
    }
    let ct = HufCTable::build(&counts, 23, 8).unwrap();
    assert!(ct.table_log() <= 8);
    for s in 0..24u8 {
        let bits = ct.nb_bits(s);
        assert!((1..=8).contains(&bits), "symbol {s} has {bits} bits");
    }
}

#[test]
fn description_is_read_back_as_weights() {
    let src = sample(4_000);
    let ct = table_for(&src, 11);
    let desc = ct.write().unwrap();
    let stats = read_stats(&desc).unwrap();
    assert_eq!(stats.header_size, desc.len());
    assert_eq!(stats.table_log, ct.table_log());
    for (sym, &w) in stats.weights.iter().enumerate() {
        let bits = ct.nb_bits(sym as u8);
        let expected = if bits == 0 { 0 } else { ct.table_log() + 1 - bits };
        assert_eq!(u32::from(w), expected, "symbol {sym}");
    }
}

#[test]
fn build_argument_errors() {
    let mut counts = [0u32; 256];
    counts[b'a' as usize] = 10;
    assert_eq!(
        HufCTable::build(&counts, 255, 11),
        Err(ZlitsError::ParameterInvalid)
    );
    counts[b'b' as usize] = 3;
    assert_eq!(
        HufCTable::build(&counts, 255, HUF_TABLELOG_MAX + 1),
        Err(ZlitsError::TableLogTooLarge)
    );
    assert!(HufCTable::build(&counts, 255, 11).is_ok());
}

#[test]
fn decode_table_log_limit() {
    assert_eq!(HufDTable::new(HUF_TABLELOG_MAX + 1).err(), Some(ZlitsError::TableLogTooLarge));
    let dt = HufDTable::new(HUF_TABLELOG_MAX).unwrap();
    assert!(!dt.is_loaded());
    assert_eq!(dt.max_table_log(), HUF_TABLELOG_MAX);
}

#[test]
fn empty_table_cannot_decode() {
    let dt = HufDTable::new(11).unwrap();
    let mut out = [0u8; 4];
    assert_eq!(dt.decompress_1x(&mut out, &[0x80]), Err(ZlitsError::CorruptInput));
}

#[test]
fn truncated_description_is_rejected() {
    let ct = table_for(&sample(4_000), 11);
    let desc = ct.write().unwrap();
    let mut dt = HufDTable::new(HUF_TABLELOG_MAX).unwrap();
    assert!(dt.read(&desc[..desc.len() - 1]).is_err());
    assert!(!dt.is_loaded());
}

#[test]
fn repeat_compression_saves_and_reuses_tables() {
    let src = sample(900);
    let opts = RepeatOptions {
        prefer_repeat: true,
        streams: HufStreams::Four,
        ..RepeatOptions::default()
    };
    let mut table = None;
    let mut repeat = HufRepeat::None;
    let mut dst = vec![0u8; 2_000];

    let fresh = compress_repeat(&mut dst, &src, opts, &mut table, &mut repeat).unwrap();
    assert!(fresh > 1);
    assert_eq!(repeat, HufRepeat::None);
    assert!(table.is_some());

    repeat = HufRepeat::Check;
    let reused = compress_repeat(&mut dst, &src, opts, &mut table, &mut repeat).unwrap();
    assert_eq!(repeat, HufRepeat::Check);
    assert!(reused < fresh, "reuse should drop the table description");
}
