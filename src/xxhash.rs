//! Thin wrapper around the `xxhash-rust` crate.
//!
//! XXH64 fingerprints regenerated literals in CLI reports, so two runs (or
//! two tools) can be compared without dumping the bytes. It is the same hash
//! Zstandard uses for its content checksum.

pub use xxhash_rust::xxh64::Xxh64 as Xxh64State;

/// One-shot XXH64 with seed 0.
#[inline]
pub fn literals_digest(data: &[u8]) -> u64 {
    xxhash_rust::xxh64::xxh64(data, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_vector() {
        assert_eq!(literals_digest(b""), 0xEF46_DB37_51D8_E999);
    }

    #[test]
    fn streaming_matches_oneshot() {
        let data = b"literals literals literals";
        let mut st = Xxh64State::new(0);
        st.update(&data[..7]);
        st.update(&data[7..]);
        assert_eq!(st.digest(), literals_digest(data));
    }
}
