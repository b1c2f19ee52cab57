use std::time::Duration;

/// Blocks scanned backward from the chain head for a pointer record.
pub const SCAN_LIMIT: u64 = 500;

/// Blocks fetched concurrently per scan batch.
pub const SCAN_BATCH: u64 = 10;

/// Deadline for a submitted transaction to finalize.
pub const FINALITY_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline for one gateway fetch.
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_CHAIN_WS_URL: &str = "wss://paseo.rpc.amforc.com";

/// Must end with a slash; the CID is appended as a path segment.
pub const DEFAULT_GATEWAY_URL: &str = "https://ipfs.io/ipfs/";

#[derive(Debug, Clone)]
pub struct Config {
    pub chain_ws_url: String,
    pub gateway_base_url: String,
    pub scan_limit: u64,
    pub finality_timeout: Duration,
    pub gateway_timeout: Duration,
    /// Runtime half of the development signer gate; the other half is the
    /// `dev-signer` cargo feature.
    pub dev_signer_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_ws_url: DEFAULT_CHAIN_WS_URL.to_owned(),
            gateway_base_url: DEFAULT_GATEWAY_URL.to_owned(),
            scan_limit: SCAN_LIMIT,
            finality_timeout: FINALITY_TIMEOUT,
            gateway_timeout: GATEWAY_TIMEOUT,
            dev_signer_enabled: false,
        }
    }
}

impl Config {
    /// Build a [`Config`] from environment variables, falling back to defaults.
    ///
    /// | Variable                | Default                        |
    /// |-------------------------|--------------------------------|
    /// | `CHAIN_WS_URL`          | `wss://paseo.rpc.amforc.com`   |
    /// | `GATEWAY_URL`           | `https://ipfs.io/ipfs/`        |
    /// | `SCAN_LIMIT`            | `500`                          |
    /// | `FINALITY_TIMEOUT_SECS` | `60`                           |
    /// | `GATEWAY_TIMEOUT_SECS`  | `15`                           |
    /// | `DEV_SIGNER_ENABLED`    | `false`                        |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let chain_ws_url =
            std::env::var("CHAIN_WS_URL").unwrap_or(defaults.chain_ws_url);

        let gateway_base_url =
            std::env::var("GATEWAY_URL").unwrap_or(defaults.gateway_base_url);

        let scan_limit = std::env::var("SCAN_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(SCAN_LIMIT);

        let finality_timeout = std::env::var("FINALITY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(FINALITY_TIMEOUT);

        let gateway_timeout = std::env::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(GATEWAY_TIMEOUT);

        let dev_signer_enabled = std::env::var("DEV_SIGNER_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            chain_ws_url,
            gateway_base_url,
            scan_limit,
            finality_timeout,
            gateway_timeout,
            dev_signer_enabled,
        }
    }
}
