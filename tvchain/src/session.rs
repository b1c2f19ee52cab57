//! One chain session bundles the RPC and gateway clients behind a single
//! handle so callers never touch shared global state.

use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

use crate::{
    config::Config,
    errors::Error,
    gateway::GatewayClient,
    retrieve::{self, Retrieved},
};

pub struct ChainSession {
    config: Config,
    rpc: chain_rpc::RpcClient,
    gateway: GatewayClient,
}

impl ChainSession {
    /// Build a session from `config`. No connection is opened yet; the RPC
    /// socket dials lazily on first use.
    pub fn new(config: Config) -> Result<Self, Error> {
        let ws_url = Url::parse(&config.chain_ws_url)?;
        let gateway_url = Url::parse(&config.gateway_base_url)?;

        let rpc = chain_rpc::RpcClient::new(ws_url);
        let gateway = GatewayClient::new(gateway_url, config.gateway_timeout);

        Ok(Self {
            config,
            rpc,
            gateway,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the newest playlist published by `owner`, if any.
    pub async fn retrieve(
        &self,
        owner: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Retrieved>, Error> {
        retrieve::retrieve(&self.rpc, &self.gateway, &self.config, owner, cancel).await
    }

    /// Tear down the RPC socket. Idempotent.
    pub async fn close(&self) {
        self.rpc.close().await;
    }
}

/// Convenience entry point: open a session, retrieve, and close it.
///
/// A dead or flaky socket gets one fresh-session retry; every other error
/// is returned as-is.
pub async fn retrieve_playlist(
    config: &Config,
    owner: &str,
    cancel: &CancellationToken,
) -> Result<Option<Retrieved>, Error> {
    let session = ChainSession::new(config.clone())?;
    let outcome = session.retrieve(owner, cancel).await;
    session.close().await;

    match outcome {
        Err(Error::Rpc(e)) if e.is_connection() => {
            warn!("chain connection failed, retrying once: {e}");

            let session = ChainSession::new(config.clone())?;
            let outcome = session.retrieve(owner, cancel).await;
            session.close().await;

            outcome
        }
        other => other,
    }
}
