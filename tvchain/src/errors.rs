use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Validation, checked before any I/O.
    #[error("Address: not a valid SS58 address")]
    Address,

    #[error("Cid: {0}")]
    Cid(#[from] cid::Error),

    // Configuration.
    #[error("Signer: no signing capability available")]
    NoSigner,

    #[error("Signer: {0}")]
    Signing(String),

    #[error("Parse: {0}")]
    Url(#[from] url::ParseError),

    // Integrity; retrieval collapses these into "not found".
    #[error("Envelope: compressed payload larger than {0} bytes")]
    CompressedTooLarge(usize),

    #[error("Envelope: decompressed payload larger than {0} bytes")]
    DecompressedTooLarge(usize),

    #[error("Integrity: content hash does not match its pointer")]
    CidMismatch,

    // Transport.
    #[error("Rpc: {0}")]
    Rpc(#[from] chain_rpc::errors::Error),

    #[error("Gateway: {0}")]
    Gateway(#[from] reqwest::Error),

    #[error("Gateway: HTTP status {0}")]
    GatewayStatus(u16),

    #[error("IO: {0}")]
    IO(#[from] std::io::Error),

    #[error("Cancelled")]
    Cancelled,

    // Chain execution, distinct per submission step.
    #[error("Chain: blob storage transaction failed on-chain")]
    BlobStore,

    #[error("Chain: pointer record transaction failed on-chain")]
    PointerRecord,

    #[error("Chain: transaction watch ended before finalization")]
    WatchEnded,

    #[error("Chain: no finalization within the deadline")]
    FinalityTimeout,
}
