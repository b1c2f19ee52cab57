//! Development-only signing with a well-known key.
//!
//! Behind the `dev-signer` cargo feature: release builds without it do not
//! contain this key or its derivation path at all.

use async_trait::async_trait;
use k256::ecdsa::{signature::Signer as _, Signature, SigningKey};

use super::Signer;
use crate::errors::Error;

/// Fixed key every development setup shares. Worthless by definition.
const WELL_KNOWN_KEY: [u8; 32] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e,
    0x1f, 0x20,
];

pub struct DevelopmentSigner {
    key: SigningKey,
}

impl DevelopmentSigner {
    pub fn well_known() -> Self {
        let key = SigningKey::from_bytes(&WELL_KNOWN_KEY).expect("well-known key is a valid scalar");

        Self { key }
    }
}

#[async_trait]
impl Signer for DevelopmentSigner {
    async fn sign(&self, signing_input: &[u8]) -> Result<Vec<u8>, Error> {
        let signature: Signature = self.key.sign(signing_input);

        Ok(signature.as_ref().to_vec())
    }
}
