use crate::errors::Error;

/// SS58 text length for 32-byte public keys on this chain family.
const ADDRESS_LEN: std::ops::RangeInclusive<usize> = 47..=48;

/// Cheap fail-fast check run before any network I/O.
pub fn validate_address(address: &str) -> Result<(), Error> {
    let len_ok = ADDRESS_LEN.contains(&address.len());
    let charset_ok = address.bytes().all(|b| b.is_ascii_alphanumeric());

    if len_ok && charset_ok {
        Ok(())
    } else {
        Err(Error::Address)
    }
}

/// Decode a hex string, with or without `0x` prefix.
pub(crate) fn decode_hex(text: &str) -> Option<Vec<u8>> {
    hex::decode(text.strip_prefix("0x").unwrap_or(text)).ok()
}
