use serde::Deserialize;

use crate::errors::Error;

/// Subset of a `chain_getHeader` response.
#[derive(Deserialize, Debug, Clone)]
pub struct Header {
    /// Hex-encoded block number.
    pub number: String,
}

impl Header {
    pub fn number(&self) -> Result<u64, Error> {
        let digits = self.number.trim_start_matches("0x");

        u64::from_str_radix(digits, 16)
            .map_err(|_| Error::BadResponse(format!("block number {}", self.number)))
    }
}

/// Subset of a `chain_getBlock` response.
#[derive(Deserialize, Debug, Clone)]
pub struct SignedBlock {
    pub block: Block,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Block {
    pub header: Header,

    /// Hex-encoded extrinsics, as submitted.
    #[serde(default)]
    pub extrinsics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_number_parses_hex() {
        let header: Header = serde_json::from_str(r#"{"number":"0x12d687"}"#).unwrap();

        assert_eq!(header.number().unwrap(), 1234567);
    }

    #[test]
    fn header_number_rejects_garbage() {
        let header = Header {
            number: "0xnope".to_owned(),
        };

        assert!(header.number().is_err());
    }

    #[test]
    fn block_without_extrinsics_defaults_empty() {
        let block: SignedBlock =
            serde_json::from_str(r#"{"block":{"header":{"number":"0x1"}}}"#).unwrap();

        assert!(block.block.extrinsics.is_empty());
    }
}
