//! register, deregister, seed, and poll commands.

use anyhow::{Context, Result};

use seed_core::wire::NodeBody;
use seed_core::{Location, NodeAddress, Request, Status};

use super::rpc::exchange;

/// `<id> <ip> <port> [<lat> <long>]` as typed on the command line.
pub fn parse_node(args: &[&str]) -> Result<NodeBody> {
    let (id, ip, port, coords) = match args {
        [id, ip, port] => (id, ip, port, None),
        [id, ip, port, lat, long] => (id, ip, port, Some((lat, long))),
        _ => anyhow::bail!("expected <id> <ip> <port> [<lat> <long>]"),
    };

    let port: u16 = port.parse().context("port must be a number")?;
    let location = match coords {
        Some((lat, long)) => Some(Location::new(
            lat.parse().context("lat must be a number")?,
            long.parse().context("long must be a number")?,
        )),
        None => None,
    };

    Ok(NodeBody::new(*id, NodeAddress::new(*ip, port), location))
}

pub async fn cmd_register(server: &str, node: NodeBody) -> Result<()> {
    let id = node.id.clone();
    let resp = exchange(server, Request::AddNode(node)).await?;
    match resp.status() {
        Status::Ok => println!("Registration of {} sent.", id),
        other => println!("Unexpected status {} for {}.", other.code(), id),
    }
    Ok(())
}

pub async fn cmd_deregister(server: &str, node: NodeBody) -> Result<()> {
    let id = node.id.clone();
    let resp = exchange(server, Request::DeadNode(node)).await?;
    match resp.status() {
        Status::Ok => println!("Deregistration of {} sent.", id),
        other => println!("Unexpected status {} for {}.", other.code(), id),
    }
    Ok(())
}

pub async fn cmd_seed(server: &str, node: NodeBody) -> Result<()> {
    let resp = exchange(server, Request::GetSeed(node)).await?;
    match resp.status() {
        Status::Ok => {
            let seed = resp
                .seed_body()?
                .context("server answered OK without a seed")?;
            println!("═══════════════════════════════════════");
            println!("  Seed");
            println!("═══════════════════════════════════════");
            println!("  Id      : {}", seed.id);
            println!("  Address : {}", NodeAddress::new(seed.ip, seed.port));
        }
        Status::NotFound => println!("No seed available."),
        Status::Conflict => println!("Conflict: this id is registered under a different address."),
    }
    Ok(())
}

pub async fn cmd_poll(server: &str) -> Result<()> {
    let resp = exchange(server, Request::Poll).await?;
    println!("{} answered poll with {}.", server, resp.status().code());
    Ok(())
}
