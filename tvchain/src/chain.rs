//! Chain submission collaborator surface.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::{errors::Error, signers::Signer};

/// Lifecycle events reported while watching a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Accepted into the node's pool.
    Ready,

    /// Gossiped to peers.
    Broadcast,

    /// Included in a block, not yet irreversible.
    InBlock { tx_hash: String },

    /// Irreversible; `ok` is the dispatch outcome.
    Finalized { ok: bool, tx_hash: String },

    /// Evicted before inclusion.
    Dropped,
}

/// A transaction built by the chain collaborator, ready to sign and watch.
#[async_trait]
pub trait Transaction: Send {
    /// Sign, submit, and stream status events. The returned stream is the
    /// watch subscription; dropping it releases the subscription.
    async fn sign_submit_watch(
        self: Box<Self>,
        signer: Arc<dyn Signer>,
    ) -> Result<BoxStream<'static, TxStatus>, Error>;
}

/// Signed-transaction submission service, the chain-side black box.
pub trait ChainClient: Send + Sync {
    /// Transaction storing a blob on-chain.
    fn store_blob_tx(&self, bytes: Vec<u8>) -> Box<dyn Transaction>;

    /// Transaction embedding a freeform annotation (remark).
    fn annotation_tx(&self, bytes: Vec<u8>) -> Box<dyn Transaction>;

    /// Privileged-execution wrapper, used only on the development path.
    fn wrap_privileged(&self, tx: Box<dyn Transaction>) -> Box<dyn Transaction>;
}
