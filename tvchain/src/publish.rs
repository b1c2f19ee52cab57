//! Save path: serialize, compress, store the blob on-chain, then publish a
//! pointer record for discovery.

use std::sync::Arc;

use cid::Cid;
use futures_util::StreamExt;
use tracing::{debug, info};

use playlist_data::{channel::Channel, m3u, pointer};

use crate::{
    chain::{ChainClient, Transaction, TxStatus},
    config::Config,
    content, envelope,
    errors::Error,
    signers::{self, Signer, WalletBridge},
    utils,
};

/// Caller bookkeeping for a completed save.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    /// Hash of the pointer record transaction.
    pub tx_hash: String,
    pub cid: Cid,
}

/// Persist a playlist on-chain under `owner`'s address.
///
/// The blob and the pointer record are two independent finalized
/// transactions. A blob whose pointer submission fails is orphaned but
/// harmless; retrying the whole save is safe because CIDs are
/// content-derived.
pub async fn publish(
    client: &dyn ChainClient,
    wallet: &dyn WalletBridge,
    config: &Config,
    owner: &str,
    playlist_name: &str,
    channels: &[Channel],
    host_public_key: Option<Vec<u8>>,
    explicit_signer: Option<Arc<dyn Signer>>,
) -> Result<PublishReceipt, Error> {
    utils::validate_address(owner)?;

    let resolved = signers::resolve(
        explicit_signer,
        wallet.delegated_signing_available(),
        host_public_key,
        config,
    )?;
    let development = resolved.is_development();
    let signer = resolved.into_signer(wallet);

    let text = m3u::serialize(channels);
    let compressed = envelope::compress(text.as_bytes())?;
    debug!(
        channels = channels.len(),
        compressed_len = compressed.len(),
        "storing playlist blob"
    );

    let mut blob_tx = client.store_blob_tx(compressed.clone());
    if development {
        blob_tx = client.wrap_privileged(blob_tx);
    }

    let (ok, _) = wait_finalized(blob_tx, signer.clone(), config).await?;
    if !ok {
        return Err(Error::BlobStore);
    }

    let cid = content::compute_cid(&compressed);

    let record = pointer::encode(owner, playlist_name, &cid.to_string());
    let pointer_tx = client.annotation_tx(record.into_bytes());

    let (ok, tx_hash) = wait_finalized(pointer_tx, signer, config).await?;
    if !ok {
        return Err(Error::PointerRecord);
    }

    info!(%cid, %tx_hash, "playlist published");

    Ok(PublishReceipt { tx_hash, cid })
}

/// Drive one transaction to finalization within the configured deadline.
///
/// The watch stream is dropped on every exit path, releasing its
/// subscription.
async fn wait_finalized(
    tx: Box<dyn Transaction>,
    signer: Arc<dyn Signer>,
    config: &Config,
) -> Result<(bool, String), Error> {
    let mut events = tx.sign_submit_watch(signer).await?;

    let wait = async {
        while let Some(event) = events.next().await {
            match event {
                TxStatus::Finalized { ok, tx_hash } => return Ok((ok, tx_hash)),
                TxStatus::Dropped => return Err(Error::WatchEnded),
                TxStatus::Ready | TxStatus::Broadcast | TxStatus::InBlock { .. } => continue,
            }
        }

        Err(Error::WatchEnded)
    };

    match tokio::time::timeout(config.finality_timeout, wait).await {
        Ok(outcome) => outcome,
        Err(_) => Err(Error::FinalityTimeout),
    }
}
