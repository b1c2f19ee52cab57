use cid::Cid;
use multihash::{Code, MultihashDigest};

/// Multicodec tag for raw binary blocks.
const RAW_CODEC: u64 = 0x55;

/// Content id of a byte buffer: CIDv1, raw codec, sha2-256.
///
/// Computed over the compressed blob on save, recomputed over the fetched
/// bytes on load; the whole load path trusts nothing else.
pub fn compute_cid(bytes: &[u8]) -> Cid {
    Cid::new_v1(RAW_CODEC, Code::Sha2_256.digest(bytes))
}

/// Defensive parse of an externally supplied CID string.
pub fn parse_cid(text: &str) -> Option<Cid> {
    Cid::try_from(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_over_identical_bytes() {
        let bytes = b"#EXTM3U\n";

        assert_eq!(compute_cid(bytes), compute_cid(bytes));
    }

    #[test]
    fn distinct_for_single_byte_difference() {
        assert_ne!(
            compute_cid(b"#EXTM3U\n").to_string(),
            compute_cid(b"#EXTM3U ").to_string()
        );
    }

    #[test]
    fn uses_v1_raw_sha256() {
        let cid = compute_cid(b"anything");

        assert_eq!(cid.version(), cid::Version::V1);
        assert_eq!(cid.codec(), RAW_CODEC);
        assert_eq!(cid.hash().code(), 0x12);
    }

    #[test]
    fn parse_round_trips_own_output() {
        let cid = compute_cid(b"payload");

        assert_eq!(parse_cid(&cid.to_string()), Some(cid));
    }

    #[test]
    fn parse_rejects_garbage_without_panicking() {
        assert_eq!(parse_cid(""), None);
        assert_eq!(parse_cid("not-a-cid"), None);
        assert_eq!(parse_cid("bafybogus!!"), None);
    }
}
