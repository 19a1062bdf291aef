//! End-to-end tests for `HttpTransport` against a local mock node.

use std::time::Duration;

use chain_eth::Address;
use eth_rpc::methods::{self, ETH_GET_BALANCE};
use eth_rpc::{
    BlockTag, CallRequest, HttpTransport, LogFilter, Transport, TransportConfig, TransportError,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn wallet() -> Address {
    Address::parse("0x7DBB4bdCfE614398D1a68ecc219F15280d0959E0").unwrap()
}

#[tokio::test]
async fn posts_json_rpc_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "eth_getBalance",
            "params": ["0x7dbb4bdcfe614398d1a68ecc219f15280d0959e0", "latest"],
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xde0b6b3a7640000"}"#)
        .expect(1)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    let balance = methods::get_balance(&transport, &wallet(), BlockTag::Latest)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(balance, "0xde0b6b3a7640000");
}

#[tokio::test]
async fn request_ids_increase() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"id": 1})))
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"id": 2})))
        .with_body(r#"{"jsonrpc":"2.0","id":2,"result":"0x2"}"#)
        .expect(1)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    assert_eq!(methods::block_number(&transport).await.unwrap(), "0x1");
    assert_eq!(methods::block_number(&transport).await.unwrap(), "0x2");

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn http_500_is_a_status_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(1)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    let err = transport.send(ETH_GET_BALANCE, vec![]).await.unwrap_err();

    // One attempt only, no retry.
    mock.assert_async().await;
    match err {
        TransportError::Status {
            method,
            status,
            body,
        } => {
            assert_eq!(method, "eth_getBalance");
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rpc_error_object_is_surfaced() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32005,"message":"query returned more than 10000 results"}}"#)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    let filter = LogFilter::new(wallet());
    let err = methods::get_logs(&transport, &filter).await.unwrap_err();

    assert!(matches!(
        err,
        TransportError::Rpc { code: -32005, ref method, .. } if method == "eth_getLogs"
    ));
}

#[tokio::test]
async fn malformed_body_is_invalid_json() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body("not json")
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    let err = methods::block_number(&transport).await.unwrap_err();
    assert!(matches!(err, TransportError::InvalidJson { .. }));
}

#[tokio::test]
async fn wrong_result_shape_is_unexpected() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"balance":"0x0"}}"#)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    let err = methods::get_balance(&transport, &wallet(), BlockTag::Latest)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::UnexpectedResult { .. }));
}

#[tokio::test]
async fn null_logs_are_empty() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    let logs = methods::get_logs(&transport, &LogFilter::new(wallet()))
        .await
        .unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn eth_call_sends_call_object_and_tag() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "eth_call",
            "params": [
                {"to": "0x7dbb4bdcfe614398d1a68ecc219f15280d0959e0", "data": "0x313ce567"},
                "latest"
            ],
        })))
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x0000000000000000000000000000000000000000000000000000000000000006"}"#)
        .expect(1)
        .create_async()
        .await;

    let transport = HttpTransport::new(&server.url()).unwrap();
    let request = CallRequest::new(wallet(), &[0x31, 0x3c, 0xe5, 0x67]);
    let data = methods::call(&transport, &request, BlockTag::Latest)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(data.ends_with("06"));
}

#[tokio::test]
async fn silent_node_times_out() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = TransportConfig::new(format!("http://{addr}")).timeout(Duration::from_millis(200));
    let transport = HttpTransport::with_config(&config).unwrap();

    let err = methods::block_number(&transport).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert_eq!(err.method(), Some("eth_blockNumber"));
}
