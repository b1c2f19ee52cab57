#[cfg(feature = "dev-signer")]
pub mod development;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{config::Config, errors::Error};

/// A capability producing signatures over arbitrary payloads.
///
/// Key material is owned by the wallet collaborator; this crate only ever
/// selects which signer to use, it never generates or stores keys.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, signing_input: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Wallet/auth collaborator surface.
pub trait WalletBridge: Send + Sync {
    /// True when the hosting environment can delegate signing.
    fn delegated_signing_available(&self) -> bool;

    fn delegated_signer(&self, public_key: &[u8]) -> Arc<dyn Signer>;
}

/// Which signing capability a submission will use.
pub enum ResolvedSigner {
    /// Caller-supplied override.
    Explicit(Arc<dyn Signer>),

    /// Host-delegated signing, backed by the host public key.
    Delegated { public_key: Vec<u8> },

    /// Well-known development key; only exists with the `dev-signer` feature.
    #[cfg(feature = "dev-signer")]
    Development,
}

impl ResolvedSigner {
    pub fn is_development(&self) -> bool {
        #[cfg(feature = "dev-signer")]
        {
            matches!(self, Self::Development)
        }

        #[cfg(not(feature = "dev-signer"))]
        {
            false
        }
    }

    /// Materialize the concrete signer through the wallet collaborator.
    pub fn into_signer(self, wallet: &dyn WalletBridge) -> Arc<dyn Signer> {
        match self {
            Self::Explicit(signer) => signer,
            Self::Delegated { public_key } => wallet.delegated_signer(&public_key),
            #[cfg(feature = "dev-signer")]
            Self::Development => Arc::new(development::DevelopmentSigner::well_known()),
        }
    }
}

/// Choose exactly one signing capability, in priority order: explicit
/// override, host delegation, development key.
///
/// Failing to resolve is a hard error; there is no insecure fallback. The
/// development arm requires both the `dev-signer` feature at compile time
/// and the runtime flag.
pub fn resolve(
    explicit: Option<Arc<dyn Signer>>,
    hosted: bool,
    host_public_key: Option<Vec<u8>>,
    config: &Config,
) -> Result<ResolvedSigner, Error> {
    if let Some(signer) = explicit {
        return Ok(ResolvedSigner::Explicit(signer));
    }

    if hosted {
        if let Some(public_key) = host_public_key {
            return Ok(ResolvedSigner::Delegated { public_key });
        }
    }

    #[cfg(feature = "dev-signer")]
    if config.dev_signer_enabled {
        return Ok(ResolvedSigner::Development);
    }

    #[cfg(not(feature = "dev-signer"))]
    let _ = config;

    Err(Error::NoSigner)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSigner;

    #[async_trait]
    impl Signer for NullSigner {
        async fn sign(&self, _signing_input: &[u8]) -> Result<Vec<u8>, Error> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn explicit_signer_wins() {
        let resolved = resolve(
            Some(Arc::new(NullSigner)),
            true,
            Some(vec![1; 32]),
            &Config::default(),
        )
        .unwrap();

        assert!(matches!(resolved, ResolvedSigner::Explicit(_)));
    }

    #[test]
    fn hosted_key_resolves_delegated() {
        let resolved = resolve(None, true, Some(vec![1; 32]), &Config::default()).unwrap();

        assert!(matches!(
            resolved,
            ResolvedSigner::Delegated { ref public_key } if public_key == &vec![1; 32]
        ));
    }

    #[test]
    fn hosted_without_key_does_not_resolve() {
        assert!(matches!(
            resolve(None, true, None, &Config::default()),
            Err(Error::NoSigner)
        ));
    }

    #[test]
    fn host_key_alone_is_not_enough() {
        // A host key without a hosted environment must not delegate.
        assert!(matches!(
            resolve(None, false, Some(vec![1; 32]), &Config::default()),
            Err(Error::NoSigner)
        ));
    }

    #[test]
    fn nothing_resolvable_is_a_hard_error() {
        assert!(matches!(
            resolve(None, false, None, &Config::default()),
            Err(Error::NoSigner)
        ));
    }

    #[cfg(feature = "dev-signer")]
    #[test]
    fn dev_signer_requires_runtime_flag() {
        let mut config = Config::default();

        assert!(matches!(
            resolve(None, false, None, &config),
            Err(Error::NoSigner)
        ));

        config.dev_signer_enabled = true;

        assert!(matches!(
            resolve(None, false, None, &config),
            Ok(ResolvedSigner::Development)
        ));
    }
}
