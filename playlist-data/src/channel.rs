use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::sanitize::{sanitize_stream_url, sanitize_url};

/// One IPTV channel entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Short content hash of the stream URL.
    pub id: String,
    pub name: String,
    /// Category, may be empty.
    pub group: String,
    pub logo_url: Option<String>,
    pub stream_url: String,
    /// Probed by liveness collaborators, never persisted.
    pub is_live: bool,
    /// EPG identifier matching XMLTV programme data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvg_id: Option<String>,
}

impl Channel {
    /// Build a channel from untrusted fields.
    ///
    /// The stream URL is sanitized or the whole channel is dropped; the logo
    /// is sanitized independently and may be cleared while the channel is
    /// kept. The id is always recomputed from the stream URL.
    pub fn from_untrusted(
        name: String,
        group: String,
        logo_url: Option<String>,
        stream_url: &str,
        tvg_id: Option<String>,
    ) -> Option<Self> {
        let stream_url = sanitize_stream_url(Some(stream_url))?;
        let logo_url = sanitize_url(logo_url.as_deref());
        let id = short_channel_id(&stream_url);

        Some(Self {
            id,
            name,
            group,
            logo_url,
            stream_url,
            is_live: false,
            tvg_id,
        })
    }

    pub fn to_compact(&self) -> CompactChannel {
        CompactChannel {
            name: self.name.clone(),
            group: self.group.clone(),
            logo: self.logo_url.clone(),
            stream: self.stream_url.clone(),
        }
    }
}

/// A named ordered channel list with a provenance tag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub channels: Vec<Channel>,
    /// Provenance, e.g. "chain".
    pub source: String,
    /// Owned by the liveness checker, unused here.
    pub last_checked: Option<DateTime<Utc>>,
}

/// Truncated SHA-256 of a stream URL; the channel identity.
pub fn short_channel_id(stream_url: &str) -> String {
    let digest = Sha256::digest(stream_url.as_bytes());

    hex::encode(&digest[..8])
}

/// Minimal-key tuple used only inside the compressed on-chain blob.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompactChannel {
    #[serde(rename = "n")]
    pub name: String,

    #[serde(rename = "g", default, skip_serializing_if = "String::is_empty")]
    pub group: String,

    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(rename = "s")]
    pub stream: String,
}

impl CompactChannel {
    /// Inverse of [`Channel::to_compact`] with the same sanitize-or-drop
    /// policy as text parsing. Ids are recomputed, liveness resets.
    pub fn into_channel(self) -> Option<Channel> {
        Channel::from_untrusted(self.name, self.group, self.logo, &self.stream, None)
    }
}

/// Compact blob envelope, version + name + channel records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompactPlaylist {
    #[serde(rename = "v")]
    pub version: u32,

    #[serde(rename = "n")]
    pub name: String,

    #[serde(rename = "c")]
    pub channels: Vec<CompactChannel>,
}

pub fn compact_records(channels: &[Channel]) -> Vec<CompactChannel> {
    channels.iter().map(Channel::to_compact).collect()
}

pub fn expand_records(records: Vec<CompactChannel>) -> Vec<Channel> {
    records
        .into_iter()
        .filter_map(CompactChannel::into_channel)
        .collect()
}
