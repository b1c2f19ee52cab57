//! Content-addressed blob fetch over plain HTTP.

use std::{sync::Arc, time::Duration};

use cid::Cid;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{envelope::MAX_COMPRESSED_LEN, errors::Error};

pub struct GatewayClient {
    client: Client,
    base_url: Arc<Url>,
    timeout: Duration,
}

impl GatewayClient {
    /// `base_url` must end with a slash; the CID is appended to it.
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: Arc::from(base_url),
            timeout,
        }
    }

    /// Fetch the blob behind `cid`, bounded in time and size.
    ///
    /// The internal timeout is composed with the caller's cancellation
    /// token; whichever fires first aborts the fetch. The Content-Length
    /// hint is checked before the body is read and the received byte count
    /// is checked again while streaming, since the hint is untrustworthy.
    pub async fn fetch(&self, cid: &Cid, cancel: &CancellationToken) -> Result<Vec<u8>, Error> {
        let url = self.base_url.join(&cid.to_string())?;

        let request = self.client.get(url).timeout(self.timeout).send();
        let mut response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = request => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(Error::GatewayStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_COMPRESSED_LEN {
                return Err(Error::CompressedTooLarge(MAX_COMPRESSED_LEN));
            }
        }

        let mut bytes = Vec::new();
        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                chunk = response.chunk() => chunk?,
            };

            let Some(chunk) = chunk else { break };

            if bytes.len() + chunk.len() > MAX_COMPRESSED_LEN {
                return Err(Error::CompressedTooLarge(MAX_COMPRESSED_LEN));
            }

            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }
}
