use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use url::Url;

use chain_rpc::{errors::Error, RpcClient};

/// One-connection stub node; `reply` maps each request to response frames.
async fn spawn_node<F>(reply: F) -> Url
where
    F: Fn(Value) -> Vec<String> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(tcp).await.unwrap();

        while let Some(Ok(Message::Text(text))) = socket.next().await {
            let request: Value = serde_json::from_str(text.as_str()).unwrap();
            for frame in reply(request) {
                socket.send(Message::Text(frame.into())).await.unwrap();
            }
        }
    });

    Url::parse(&format!("ws://{addr}")).unwrap()
}

fn echo_result(request: Value, result: Value) -> Vec<String> {
    vec![json!({"jsonrpc": "2.0", "id": request["id"], "result": result}).to_string()]
}

#[tokio::test]
async fn call_resolves_matching_response() {
    let url = spawn_node(|request| echo_result(request, json!("0xabc"))).await;
    let client = RpcClient::new(url);

    let value = client.call("chain_getBlockHash", json!([7])).await.unwrap();

    assert_eq!(value, json!("0xabc"));
    assert_eq!(client.pending_calls().await, 0);
    client.close().await;
}

#[tokio::test]
async fn timeout_rejects_and_clears_pending() {
    // Reads requests, never answers.
    let url = spawn_node(|_| Vec::new()).await;
    let client = RpcClient::with_call_timeout(url, Duration::from_millis(200));

    let outcome = client.call("chain_getHeader", json!([])).await;

    assert!(matches!(outcome, Err(Error::Timeout { method }) if method == "chain_getHeader"));
    assert_eq!(client.pending_calls().await, 0);
    client.close().await;
}

#[tokio::test]
async fn malformed_frames_are_discarded() {
    let url = spawn_node(|request| {
        vec![
            "not json at all".to_owned(),
            json!({"no": "id"}).to_string(),
            json!({"id": "string-id", "result": 1}).to_string(),
            json!({"jsonrpc": "2.0", "id": request["id"], "result": 42}).to_string(),
        ]
    })
    .await;
    let client = RpcClient::new(url);

    let value = client.call("chain_getHeader", json!([])).await.unwrap();

    assert_eq!(value, json!(42));
    client.close().await;
}

#[tokio::test]
async fn node_error_is_surfaced() {
    let url = spawn_node(|request| {
        vec![json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"code": -32601, "message": "Method not found"}
        })
        .to_string()]
    })
    .await;
    let client = RpcClient::new(url);

    let outcome = client.call("bogus_method", json!([])).await;

    assert!(
        matches!(outcome, Err(Error::Node { code, ref message }) if code == -32601 && message == "Method not found")
    );
    client.close().await;
}

#[tokio::test]
async fn remote_close_rejects_all_pending() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(tcp).await.unwrap();

        // Read one request, then drop the connection on the floor.
        let _ = socket.next().await;
    });

    let url = Url::parse(&format!("ws://{addr}")).unwrap();
    let client = RpcClient::new(url);

    let outcome = client.call("chain_getHeader", json!([])).await;

    assert!(matches!(outcome, Err(Error::Closed)));
    client.close().await;
}

#[tokio::test]
async fn local_close_rejects_pending_and_is_idempotent() {
    let url = spawn_node(|_| Vec::new()).await;
    let client = Arc::new(RpcClient::new(url));

    let caller = {
        let client = client.clone();
        tokio::spawn(async move { client.call("chain_getHeader", json!([])).await })
    };

    // Let the call register before tearing down.
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.close().await;
    client.close().await;

    let outcome = caller.await.unwrap();

    assert!(matches!(outcome, Err(Error::Closed)));
    assert_eq!(client.pending_calls().await, 0);
}

#[tokio::test]
async fn typed_helpers_decode_responses() {
    let url = spawn_node(|request| {
        let method = request["method"].as_str().unwrap_or_default();
        match method {
            "chain_getHeader" => echo_result(request, json!({"number": "0x2a"})),
            "chain_getBlockHash" => echo_result(request, json!("0xblockhash")),
            "chain_getBlock" => echo_result(
                request,
                json!({"block": {"header": {"number": "0x2a"}, "extrinsics": ["0xdead", "0xbeef"]}}),
            ),
            _ => Vec::new(),
        }
    })
    .await;
    let client = RpcClient::new(url);

    assert_eq!(client.head_number().await.unwrap(), 42);
    assert_eq!(
        client.block_hash(42).await.unwrap().as_deref(),
        Some("0xblockhash")
    );
    assert_eq!(
        client.block_extrinsics("0xblockhash").await.unwrap(),
        vec!["0xdead".to_owned(), "0xbeef".to_owned()]
    );

    client.close().await;
}

#[tokio::test]
async fn missing_block_hash_is_none() {
    let url = spawn_node(|request| echo_result(request, Value::Null)).await;
    let client = RpcClient::new(url);

    assert_eq!(client.block_hash(999).await.unwrap(), None);
    client.close().await;
}
