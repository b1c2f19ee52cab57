pub mod chain;
pub mod config;
pub mod content;
pub mod envelope;
pub mod errors;
pub mod gateway;
pub mod publish;
pub mod retrieve;
pub mod session;
pub mod signers;
pub mod utils;

pub use chain::{ChainClient, Transaction, TxStatus};
pub use config::Config;
pub use errors::Error;
pub use publish::{publish, PublishReceipt};
pub use retrieve::{retrieve, BlobGateway, BlockSource, Retrieved};
pub use session::{retrieve_playlist, ChainSession};
pub use signers::{ResolvedSigner, Signer, WalletBridge};
