use crate::*;
use seed_core::Status;

/// Nearest registered node wins when the caller sends coordinates.
#[tokio::test]
async fn test_get_seed_returns_nearest() -> Result<()> {
    let server = TestServer::start().await?;

    server.add_node("a", "10.0.0.1", 4001, Some((0.0, 0.0))).await?;
    server.add_node("b", "10.0.0.2", 4002, Some((0.0, 90.0))).await?;
    server.add_node("c", "10.0.0.3", 4003, Some((0.0, -90.0))).await?;
    server.wait_for("three nodes", |s| s.nodes.len() == 3).await?;

    let raw = server
        .send(request("get_seed", node_body("d", "10.0.0.9", 4009, Some((0.0, 1.0)))))
        .await?
        .expect("get_seed should be answered");
    assert_eq!(raw["header"]["status"], 200);
    assert_eq!(raw["header"]["type"], "seed_node");
    assert_eq!(raw["body"]["id"], "a");
    assert_eq!(raw["body"]["ip"], "10.0.0.1");
    assert_eq!(raw["body"]["port"], 4001);

    server.stop().await
}

/// A registered caller is never handed itself, and a lone node has no seed.
#[tokio::test]
async fn test_sole_node_gets_not_found_others_get_it() -> Result<()> {
    let server = TestServer::start().await?;

    server.add_node("x", "10.0.0.1", 4001, None).await?;
    server.wait_for("x registered", |s| s.get("x").is_some()).await?;

    let resp = server.get_seed("x", "10.0.0.1", 4001, None).await?;
    assert_eq!(resp.status(), Status::NotFound);
    assert_eq!(resp.header.kind.as_deref(), Some("seed_node"));

    let resp = server.get_seed("y", "10.0.0.2", 4002, None).await?;
    assert_eq!(resp.status(), Status::Ok);
    assert_eq!(resp.seed_body()?.expect("a seed").id, "x");

    server.stop().await
}

/// An id registered under another address is refused with 409.
#[tokio::test]
async fn test_get_seed_conflict() -> Result<()> {
    let server = TestServer::start().await?;

    server.add_node("x", "h1", 1, None).await?;
    server.add_node("y", "h3", 3, None).await?;
    server.wait_for("two nodes", |s| s.nodes.len() == 2).await?;
    let before = server.snapshot();

    let raw = server
        .send(request("get_seed", node_body("x", "h2", 2, Some((1.0, 1.0)))))
        .await?
        .expect("conflict should be answered");
    assert_eq!(raw["header"]["status"], 409);
    assert!(raw["header"].get("type").is_none(), "409 carries no type");

    assert_eq!(server.snapshot(), before, "conflict must not change the registry");
    server.stop().await
}

#[tokio::test]
async fn test_get_seed_on_empty_registry() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server.get_seed("d", "10.0.0.9", 4009, Some((0.0, 1.0))).await?;
    assert_eq!(resp.status(), Status::NotFound);
    assert!(server.snapshot().nodes.is_empty(), "get_seed must not register the caller");

    server.stop().await
}

/// add_node answers at once with an empty body.
#[tokio::test]
async fn test_add_node_reply_shape() -> Result<()> {
    let server = TestServer::start().await?;

    let raw = server
        .send(request("add_node", node_body("a", "10.0.0.1", 4001, None)))
        .await?
        .expect("add_node should be answered");
    assert_eq!(raw["header"]["status"], 200);
    assert!(raw["header"].get("type").is_none());
    assert_eq!(raw["body"], json!({}));

    server.stop().await
}

/// Repeated adds and removals converge to the same registry.
#[tokio::test]
async fn test_membership_is_idempotent() -> Result<()> {
    let server = TestServer::start().await?;

    server.add_node("a", "10.0.0.1", 4001, None).await?;
    server.add_node("a", "10.0.0.1", 4001, None).await?;
    // Same id under a new address is ignored, not a replacement.
    server.add_node("a", "10.0.0.7", 4007, None).await?;
    server.add_node("b", "10.0.0.2", 4002, None).await?;

    let snapshot = server.wait_for("a and b", |s| s.get("b").is_some()).await?;
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.get("a").map(|n| n.address.port), Some(4001));

    server.dead_node("a", "10.0.0.1", 4001).await?;
    server.dead_node("a", "10.0.0.1", 4001).await?;
    server.dead_node("ghost", "10.0.0.8", 4008).await?;

    let snapshot = server.wait_for("a removed", |s| s.get("a").is_none()).await?;
    assert_eq!(snapshot.nodes.len(), 1);
    assert_eq!(snapshot.nodes[0].id, "b");

    server.stop().await
}

/// Registration order is kept, removals close the gap.
#[tokio::test]
async fn test_registration_order_preserved() -> Result<()> {
    let server = TestServer::start().await?;

    for (i, id) in ["n0", "n1", "n2", "n3"].iter().enumerate() {
        server.add_node(id, "10.0.0.1", 5000 + i as u16, None).await?;
    }
    server.wait_for("four nodes", |s| s.nodes.len() == 4).await?;

    server.dead_node("n1", "10.0.0.1", 5001).await?;
    let snapshot = server.wait_for("n1 removed", |s| s.get("n1").is_none()).await?;

    let ids: Vec<String> = snapshot.nodes.iter().map(|n| n.id.to_string()).collect();
    assert_eq!(ids, ["n0", "n2", "n3"]);

    server.stop().await
}

/// Peers that identify themselves with a JSON number are served too, and
/// get their id back as a number.
#[tokio::test]
async fn test_numeric_ids_register_and_seed() -> Result<()> {
    let server = TestServer::start().await?;

    let raw = server
        .send(request(
            "add_node",
            json!({ "node_id": 1234567, "ip": "10.0.0.1", "port": 4000, "lat": 0.0, "long": 0.0 }),
        ))
        .await?
        .expect("numeric add_node should be answered");
    assert_eq!(raw["header"]["status"], 200);
    server.wait_for("numeric node", |s| !s.nodes.is_empty()).await?;

    let raw = server
        .send(request("get_seed", json!({ "id": 42, "ip": "10.0.0.2", "port": 4001, "lat": 1.0, "long": 1.0 })))
        .await?
        .expect("numeric get_seed should be answered");
    assert_eq!(raw["header"]["status"], 200);
    assert_eq!(raw["body"]["id"], json!(1234567));

    // The same id under another address conflicts; its text form does not.
    let raw = server
        .send(request("get_seed", json!({ "id": 1234567, "ip": "10.0.0.9", "port": 4009 })))
        .await?
        .expect("conflict should be answered");
    assert_eq!(raw["header"]["status"], 409);

    let resp = server.get_seed("1234567", "10.0.0.9", 4009, None).await?;
    assert_eq!(resp.status(), Status::Ok);

    let raw = server
        .send(request("dead_node", json!({ "id": 1234567, "ip": "10.0.0.1", "port": 4000 })))
        .await?
        .expect("numeric dead_node should be answered");
    assert_eq!(raw["header"]["status"], 200);
    server.wait_for("numeric node removed", |s| s.nodes.is_empty()).await?;

    server.stop().await
}
