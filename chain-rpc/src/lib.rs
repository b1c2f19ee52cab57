pub mod errors;
pub mod responses;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex as StdMutex, PoisonError,
    },
    time::Duration,
};

use futures_util::{stream::SplitStream, SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot, Mutex},
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

use errors::Error;
use responses::{Header, SignedBlock};

pub const DEFAULT_URI: &str = "ws://127.0.0.1:9944";

/// Per-call response deadline. No per-call retry; a timed out call fails.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(10);

type Result<T> = std::result::Result<T, Error>;

type PendingMap = Arc<StdMutex<HashMap<u64, oneshot::Sender<Result<Value>>>>>;

type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

/// Request/response multiplexer over one persistent WebSocket.
///
/// The connection opens lazily on the first call and is reused while open.
/// Concurrent first callers share a single in-flight connect. Every call
/// carries a fresh monotonically increasing id and is matched to the
/// response bearing the same id.
pub struct RpcClient {
    url: Url,
    call_timeout: Duration,
    next_id: AtomicU64,
    conn: Mutex<Option<Connection>>,
}

impl RpcClient {
    pub fn new(url: Url) -> Self {
        Self::with_call_timeout(url, CALL_TIMEOUT)
    }

    /// Override the per-call deadline, for tests mostly.
    pub fn with_call_timeout(url: Url, call_timeout: Duration) -> Self {
        Self {
            url,
            call_timeout,
            next_id: AtomicU64::new(1),
            conn: Mutex::new(None),
        }
    }

    /// Send one JSON-RPC request and await the matching response.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let (id, rx, pending) = {
            let mut guard = self.conn.lock().await;

            if let Some(conn) = guard.as_ref() {
                if conn.reader.is_finished() {
                    guard.take();
                    return Err(Error::Closed);
                }
            }

            if guard.is_none() {
                *guard = Some(Connection::open(&self.url).await?);
            }

            let conn = match guard.as_ref() {
                Some(conn) => conn,
                None => return Err(Error::Closed),
            };

            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = oneshot::channel();
            lock_pending(&conn.pending).insert(id, tx);

            let envelope = RequestEnvelope {
                jsonrpc: "2.0",
                id,
                method,
                params: &params,
            };
            let text = serde_json::to_string(&envelope)?;

            if conn.writer.send(Message::Text(text.into())).is_err() {
                lock_pending(&conn.pending).remove(&id);
                return Err(Error::Closed);
            }

            (id, rx, conn.pending.clone())
        };

        match timeout(self.call_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            // The resolver was dropped: the connection was torn down.
            Ok(Err(_)) => Err(Error::Closed),
            Err(_) => {
                lock_pending(&pending).remove(&id);
                Err(Error::Timeout {
                    method: method.to_owned(),
                })
            }
        }
    }

    /// Tear down the socket and reject everything pending. Idempotent.
    pub async fn close(&self) {
        if let Some(conn) = self.conn.lock().await.take() {
            conn.shutdown();
        }
    }

    /// Number of calls awaiting a response. Diagnostic only.
    pub async fn pending_calls(&self) -> usize {
        match self.conn.lock().await.as_ref() {
            Some(conn) => lock_pending(&conn.pending).len(),
            None => 0,
        }
    }

    /// Current chain head block number.
    pub async fn head_number(&self) -> Result<u64> {
        let value = self.call("chain_getHeader", Value::Array(Vec::new())).await?;
        let header: Header = serde_json::from_value(value)?;

        header.number()
    }

    /// Hash of the block at `number`, if the node has it.
    pub async fn block_hash(&self, number: u64) -> Result<Option<String>> {
        let value = self
            .call("chain_getBlockHash", serde_json::json!([number]))
            .await?;

        Ok(value.as_str().map(str::to_owned))
    }

    /// Hex-encoded extrinsics of the block with `hash`.
    pub async fn block_extrinsics(&self, hash: &str) -> Result<Vec<String>> {
        let value = self.call("chain_getBlock", serde_json::json!([hash])).await?;
        let signed: SignedBlock = serde_json::from_value(value)?;

        Ok(signed.block.extrinsics)
    }
}

struct Connection {
    writer: mpsc::UnboundedSender<Message>,
    pending: PendingMap,
    reader: JoinHandle<()>,
}

impl Connection {
    async fn open(url: &Url) -> Result<Self> {
        let (socket, _) = connect_async(url.as_str()).await?;
        let (mut sink, stream) = socket.split();

        let (writer, mut outbox) = mpsc::unbounded_channel::<Message>();
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));

        // Writer half lives until the send handle drops or the sink dies.
        tokio::spawn(async move {
            while let Some(message) = outbox.recv().await {
                if sink.send(message).await.is_err() {
                    break;
                }
            }

            let _ = sink.close().await;
        });

        let reader = tokio::spawn(Self::read_loop(stream, pending.clone()));

        Ok(Self {
            writer,
            pending,
            reader,
        })
    }

    async fn read_loop(mut stream: WsReader, pending: PendingMap) {
        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!("socket error: {e}");
                    break;
                }
            };

            // Frames that are not JSON or lack a numeric id are discarded;
            // a hostile node must not be able to crash the transport.
            let value: Value = match serde_json::from_str(text.as_str()) {
                Ok(value) => value,
                Err(_) => {
                    debug!("discarding malformed frame");
                    continue;
                }
            };

            let id = match value.get("id").and_then(Value::as_u64) {
                Some(id) => id,
                None => {
                    debug!("discarding frame without numeric id");
                    continue;
                }
            };

            let sender = match lock_pending(&pending).remove(&id) {
                Some(sender) => sender,
                None => continue,
            };

            let outcome = match value.get("error") {
                Some(error) => Err(Error::Node {
                    code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned(),
                }),
                None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
            };

            let _ = sender.send(outcome);
        }

        // Reject every call still in flight.
        for (_, sender) in lock_pending(&pending).drain() {
            let _ = sender.send(Err(Error::Closed));
        }
    }

    fn shutdown(self) {
        // Dropping the send handle ends the writer task and closes the sink.
        drop(self.writer);
        self.reader.abort();

        for (_, sender) in lock_pending(&self.pending).drain() {
            let _ = sender.send(Err(Error::Closed));
        }
    }
}

fn lock_pending(
    pending: &PendingMap,
) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<Result<Value>>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
