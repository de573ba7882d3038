use crate::*;

/// Bytes that are not JSON get no answer.
#[tokio::test]
async fn test_garbage_closes_without_reply() -> Result<()> {
    let server = TestServer::start().await?;

    let reply = server.send_bytes(b"this is not json").await?;
    assert!(reply.is_none(), "unexpected reply {reply:?}");

    server.stop().await
}

#[tokio::test]
async fn test_unknown_operation_closes_without_reply() -> Result<()> {
    let server = TestServer::start().await?;

    let reply = server.send(request("join_cluster", json!({}))).await?;
    assert!(reply.is_none(), "unexpected reply {reply:?}");

    server.stop().await
}

/// A body missing a required field is rejected and nothing is registered.
#[tokio::test]
async fn test_missing_field_closes_without_reply() -> Result<()> {
    let server = TestServer::start().await?;

    let reply = server
        .send(request("add_node", json!({ "id": "a", "ip": "10.0.0.1" })))
        .await?;
    assert!(reply.is_none(), "unexpected reply {reply:?}");

    // A valid request afterwards is the only thing that lands.
    server.add_node("b", "10.0.0.2", 4002, None).await?;
    let snapshot = server.wait_for("b registered", |s| s.get("b").is_some()).await?;
    assert_eq!(snapshot.nodes.len(), 1);

    server.stop().await
}

#[tokio::test]
async fn test_oversized_request_closes_without_reply() -> Result<()> {
    let server = TestServer::start().await?;

    let padding = "x".repeat(8192);
    let reply = server
        .send(json!({ "header": { "type": "poll", "pad": padding } }))
        .await?;
    assert!(reply.is_none(), "unexpected reply {reply:?}");

    server.stop().await
}

/// Extra header fields are ignored and `node_id` names the id.
#[tokio::test]
async fn test_lenient_envelope_fields() -> Result<()> {
    let server = TestServer::start().await?;

    let raw = server
        .send(json!({
            "header": { "type": "add_node", "version": 3 },
            "body": { "node_id": "a", "ip": "10.0.0.1", "port": 4001 }
        }))
        .await?
        .expect("add_node should be answered");
    assert_eq!(raw["header"]["status"], 200);

    server.wait_for("a registered", |s| s.get("a").is_some()).await?;
    server.stop().await
}

/// The server answers one request per connection, then closes.
#[tokio::test]
async fn test_one_request_per_connection() -> Result<()> {
    let server = TestServer::start().await?;

    let mut stream = TcpStream::connect(server.addr).await?;
    let poll = serde_json::to_vec(&request("poll", json!({})))?;
    stream.write_all(&poll).await?;

    let reply: Response = wire::read_message(&mut stream, 4096).await?;
    assert_eq!(reply.status(), seed_core::Status::Ok);

    let mut rest = Vec::new();
    tokio::time::timeout(WAIT, stream.read_to_end(&mut rest)).await??;
    assert!(rest.is_empty(), "nothing may follow the reply");

    server.stop().await
}
