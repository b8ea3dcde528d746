// Integration tests for the sizing and capability probes.

use zlits::config::{HUF_TABLELOG_MAX, HUF_WORKSPACE_SIZE};
use zlits::huf::HufDTable;
use zlits::{
    has_fast_bit_ops, sizeof_compression_table, sizeof_decompression_table,
    sizeof_table_build_workspace, LiteralsCompressor,
};

#[test]
fn compression_table_covers_every_symbol() {
    assert_eq!(sizeof_compression_table(0), 1);
    assert_eq!(sizeof_compression_table(1), 2);
    assert_eq!(sizeof_compression_table(255), 129);
    for m in 1..256usize {
        assert!(sizeof_compression_table(m) >= sizeof_compression_table(m - 1));
    }
}

#[test]
fn decompression_table_grows_with_log() {
    assert_eq!(sizeof_decompression_table(11), 2050);
    assert_eq!(sizeof_decompression_table(HUF_TABLELOG_MAX), 4098);
    for log in 1..HUF_TABLELOG_MAX {
        assert!(sizeof_decompression_table(log) < sizeof_decompression_table(log + 1));
    }
    // Every accepted log fits the advertised size.
    for log in 1..=HUF_TABLELOG_MAX {
        assert!(HufDTable::new(log).is_ok());
        assert!(sizeof_decompression_table(log) > 1 << log);
    }
}

#[test]
fn workspace_matches_configured_bytes() {
    assert_eq!(sizeof_table_build_workspace() * 4, HUF_WORKSPACE_SIZE);
}

#[test]
fn capability_is_stable_and_shared_with_contexts() {
    let first = has_fast_bit_ops();
    assert_eq!(has_fast_bit_ops(), first);
    let ctx = LiteralsCompressor::new().unwrap();
    assert_eq!(ctx.has_fast_bit_ops(), first);

    let seen: Vec<bool> = std::thread::scope(|s| {
        let hs: Vec<_> = (0..4).map(|_| s.spawn(has_fast_bit_ops)).collect();
        hs.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(seen.iter().all(|&b| b == first));
}
