//! Load path: scan recent blocks for the newest pointer record, fetch the
//! blob it names, verify integrity, and decode.
//!
//! Almost every failure collapses into "not found": a user can do nothing
//! about a bad CID, an oversize blob, or a lying gateway, so none of them
//! deserve a distinct user-facing error.

use async_trait::async_trait;
use cid::Cid;
use futures_util::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use playlist_data::{
    channel::{expand_records, Channel, CompactPlaylist, Playlist},
    m3u,
    pointer::{self, PointerRecord},
};

use crate::{
    config::{Config, SCAN_BATCH},
    content, envelope,
    errors::Error,
    gateway::GatewayClient,
    utils,
};

/// Read access to chain blocks, implemented over raw RPC.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn head_number(&self) -> Result<u64, Error>;

    async fn block_hash(&self, number: u64) -> Result<Option<String>, Error>;

    async fn block_extrinsics(&self, hash: &str) -> Result<Vec<String>, Error>;
}

#[async_trait]
impl BlockSource for chain_rpc::RpcClient {
    async fn head_number(&self) -> Result<u64, Error> {
        Ok(chain_rpc::RpcClient::head_number(self).await?)
    }

    async fn block_hash(&self, number: u64) -> Result<Option<String>, Error> {
        Ok(chain_rpc::RpcClient::block_hash(self, number).await?)
    }

    async fn block_extrinsics(&self, hash: &str) -> Result<Vec<String>, Error> {
        Ok(chain_rpc::RpcClient::block_extrinsics(self, hash).await?)
    }
}

/// Content-addressed blob fetch.
#[async_trait]
pub trait BlobGateway: Send + Sync {
    async fn fetch(&self, cid: &Cid, cancel: &CancellationToken) -> Result<Vec<u8>, Error>;
}

#[async_trait]
impl BlobGateway for GatewayClient {
    async fn fetch(&self, cid: &Cid, cancel: &CancellationToken) -> Result<Vec<u8>, Error> {
        GatewayClient::fetch(self, cid, cancel).await
    }
}

/// A successfully loaded on-chain playlist.
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub playlist: Playlist,
    /// Block carrying the pointer record.
    pub block_number: u64,
    pub cid: Cid,
}

/// Load the newest playlist published by `owner`, if any.
pub async fn retrieve(
    source: &dyn BlockSource,
    gateway: &dyn BlobGateway,
    config: &Config,
    owner: &str,
    cancel: &CancellationToken,
) -> Result<Option<Retrieved>, Error> {
    utils::validate_address(owner)?;

    let Some((block_number, record)) = scan_for_pointer(source, config, owner, cancel).await?
    else {
        return Ok(None);
    };

    // A malformed CID in a pointer is the same as no pointer at all.
    let Some(cid) = content::parse_cid(&record.cid) else {
        debug!(cid = %record.cid, "pointer carries a malformed cid");
        return Ok(None);
    };

    let bytes = match gateway.fetch(&cid, cancel).await {
        Ok(bytes) => bytes,
        Err(Error::Cancelled) => return Err(Error::Cancelled),
        Err(e) => {
            warn!(%cid, "gateway fetch failed: {e}");
            return Ok(None);
        }
    };

    // The integrity gate: recompute over what was actually received.
    if content::compute_cid(&bytes) != cid {
        warn!(%cid, "gateway returned bytes with a different content hash");
        return Ok(None);
    }

    let raw = match envelope::decompress(&bytes, envelope::MAX_DECOMPRESSED_LEN) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(%cid, "blob failed to decompress: {e}");
            return Ok(None);
        }
    };

    let Ok(text) = String::from_utf8(raw) else {
        debug!(%cid, "blob is not valid UTF-8");
        return Ok(None);
    };

    let channels = decode_channels(&text);
    if channels.is_empty() {
        // Garbage that decodes to nothing must not look like a successful
        // empty playlist.
        debug!(%cid, "blob decoded to an empty channel list");
        return Ok(None);
    }

    let playlist = Playlist {
        name: record.name,
        channels,
        source: "chain".to_owned(),
        last_checked: None,
    };

    Ok(Some(Retrieved {
        playlist,
        block_number,
        cid,
    }))
}

/// Walk backward from the chain head in fixed-size batches and return the
/// most recent pointer record for `owner`.
///
/// Hashes and bodies are fetched concurrently within a batch; the match
/// scan itself runs sequentially, most recent block first, so the first hit
/// is the newest record. Cancellation is honored at batch boundaries.
async fn scan_for_pointer(
    source: &dyn BlockSource,
    config: &Config,
    owner: &str,
    cancel: &CancellationToken,
) -> Result<Option<(u64, PointerRecord)>, Error> {
    let head = source.head_number().await?;
    let floor = head.saturating_sub(config.scan_limit);
    debug!(head, floor, "scanning for pointer records");

    let mut next = head;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let low = std::cmp::max(floor, next.saturating_sub(SCAN_BATCH - 1));
        let numbers: Vec<u64> = (low..=next).rev().collect();

        let hashes = try_join_all(numbers.iter().map(|&number| source.block_hash(number))).await?;

        let bodies = try_join_all(hashes.iter().map(|hash| async move {
            match hash {
                Some(hash) => source.block_extrinsics(hash).await.map(Some),
                None => Ok(None),
            }
        }))
        .await?;

        for (&number, extrinsics) in numbers.iter().zip(&bodies) {
            let Some(extrinsics) = extrinsics else { continue };

            for extrinsic in extrinsics {
                let Some(raw) = utils::decode_hex(extrinsic) else {
                    continue;
                };

                let text = String::from_utf8_lossy(&raw);
                if let Some(record) = pointer::decode(&text, owner) {
                    debug!(number, "pointer record found");
                    return Ok(Some((number, record)));
                }
            }
        }

        if low <= floor || low == 0 {
            return Ok(None);
        }

        next = low - 1;
    }
}

/// Decode blob text into channels.
///
/// Current blobs carry the M3U text form; blobs written by earlier releases
/// carry the compact JSON payload instead, so that shape is still accepted.
fn decode_channels(text: &str) -> Vec<Channel> {
    if text.trim_start().starts_with("#EXTM3U") {
        return m3u::parse(text);
    }

    match serde_json::from_str::<CompactPlaylist>(text) {
        Ok(compact) => expand_records(compact.channels),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_m3u_text() {
        let text = "#EXTM3U\n#EXTINF:-1,One\nhttps://stream.example/one.m3u8\n";

        assert_eq!(decode_channels(text).len(), 1);
    }

    #[test]
    fn decode_accepts_legacy_compact_json() {
        let text = r#"{"v":1,"n":"Old","c":[{"n":"One","s":"https://stream.example/one.m3u8"}]}"#;

        let channels = decode_channels(text);

        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].stream_url, "https://stream.example/one.m3u8");
    }

    #[test]
    fn decode_garbage_is_empty() {
        assert!(decode_channels("hello world").is_empty());
        assert!(decode_channels("").is_empty());
    }
}
