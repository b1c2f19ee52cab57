//! On-chain pointer records.
//!
//! A pointer record is one delimited ASCII line embedded in a chain remark,
//! associating an owner address and playlist name with a content id:
//!
//! ```text
//! IPTVCID:<ss58-address>:<percent-encoded-name>:<cid>
//! ```

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

/// Fixed record tag.
pub const POINTER_TAG: &str = "IPTVCID";

const DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerRecord {
    pub name: String,
    pub cid: String,
}

/// Encode a pointer record line.
///
/// The name is percent-encoded; it is the only field that can contain the
/// delimiter, and an unescaped delimiter corrupts parsing.
pub fn encode(owner: &str, name: &str, cid: &str) -> String {
    let name = utf8_percent_encode(name, NON_ALPHANUMERIC);

    format!("{POINTER_TAG}{DELIMITER}{owner}{DELIMITER}{name}{DELIMITER}{cid}")
}

/// Find and decode a pointer record for `owner` inside arbitrary text.
///
/// The record body runs to the first non-printable byte, since remarks sit
/// inside raw extrinsic bytes. The body is split on the last delimiter (a
/// CID never contains one) and trailing non-alphanumeric noise is stripped
/// from the CID half. Returns `None` on any structural mismatch; absence is
/// the common case during scanning.
pub fn decode(text: &str, owner: &str) -> Option<PointerRecord> {
    let prefix = format!("{POINTER_TAG}{DELIMITER}{owner}{DELIMITER}");
    let start = text.find(&prefix)?;
    let rest = &text[start + prefix.len()..];

    let end = rest
        .find(|c: char| !c.is_ascii_graphic())
        .unwrap_or(rest.len());
    let body = &rest[..end];

    let (name, cid) = body.rsplit_once(DELIMITER)?;

    let name = percent_decode_str(name).decode_utf8().ok()?.into_owned();
    let cid = cid.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());

    if cid.is_empty() {
        return None;
    }

    Some(PointerRecord {
        name,
        cid: cid.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const CID: &str = "bafkreigh2akiscaildcqabsyg3dfr6chu3fgpregiymsck7e7aqa4s52zy";

    #[test]
    fn round_trip_plain_name() {
        let line = encode(OWNER, "Weekend Mix", CID);
        let record = decode(&line, OWNER).unwrap();

        assert_eq!(record.name, "Weekend Mix");
        assert_eq!(record.cid, CID);
    }

    #[test]
    fn round_trip_name_containing_delimiter() {
        let line = encode(OWNER, "My:Playlist:v2", CID);
        let record = decode(&line, OWNER).unwrap();

        assert_eq!(record.name, "My:Playlist:v2");
        assert_eq!(record.cid, CID);
    }

    #[test]
    fn decode_inside_surrounding_bytes() {
        let line = encode(OWNER, "Buried", CID);
        let haystack = format!("\u{1}\u{2}garbage{line}\u{0}more");

        let record = decode(&haystack, OWNER).unwrap();

        assert_eq!(record.name, "Buried");
        assert_eq!(record.cid, CID);
    }

    #[test]
    fn decode_strips_trailing_noise_from_cid() {
        let haystack = format!("{POINTER_TAG}:{OWNER}:Name:{CID}),;");

        assert_eq!(decode(&haystack, OWNER).unwrap().cid, CID);
    }

    #[test]
    fn decode_rejects_other_owner() {
        let line = encode(OWNER, "Mine", CID);

        assert_eq!(
            decode(&line, "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty"),
            None
        );
    }

    #[test]
    fn decode_rejects_structural_garbage() {
        assert_eq!(decode("no record here", OWNER), None);
        assert_eq!(decode(&format!("{POINTER_TAG}:{OWNER}:"), OWNER), None);
        assert_eq!(decode(&format!("{POINTER_TAG}:{OWNER}:nameonly"), OWNER), None);
    }
}
