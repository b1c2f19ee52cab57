use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Rpc: no response to {method} within the call deadline")]
    Timeout { method: String },

    #[error("Rpc: connection closed")]
    Closed,

    #[error("Rpc: node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("Rpc: malformed response: {0}")]
    BadResponse(String),

    #[error("Serde: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("WebSocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl Error {
    /// True when the failure is the connection itself rather than one call.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Closed | Error::WebSocket(_))
    }
}
