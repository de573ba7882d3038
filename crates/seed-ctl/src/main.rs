//! seed-ctl — command-line interface for the seed server.

mod cmd;

use anyhow::{Context, Result};

use cmd::membership::{cmd_deregister, cmd_poll, cmd_register, cmd_seed, parse_node};
use cmd::status::{cmd_nodes, cmd_status};

const DEFAULT_SERVER: &str = "127.0.0.1:5000";
const DEFAULT_API_PORT: u16 = 9101;

fn print_usage() {
    println!("Usage: seed-ctl [--server <host:port>] [--api-port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status                                   Show server status");
    println!("  nodes                                    List registered nodes");
    println!("  register <id> <ip> <port> [lat long]     Register a node (add_node)");
    println!("  deregister <id> <ip> <port>              Deregister a node (dead_node)");
    println!("  seed <id> <ip> <port> [lat long]         Ask for a seed (get_seed)");
    println!("  poll                                     Check the server answers");
    println!();
    println!("Options:");
    println!("  --server <host:port>  Seed server RPC address (default: {})", DEFAULT_SERVER);
    println!("  --api-port <port>     Status API port (default: {})", DEFAULT_API_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut server = DEFAULT_SERVER.to_string();
    let mut api_port = DEFAULT_API_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--server" => {
                i += 1;
                server = args.get(i).context("--server requires a value")?.clone();
            }
            "--api-port" => {
                i += 1;
                api_port = args
                    .get(i)
                    .context("--api-port requires a value")?
                    .parse()
                    .context("--api-port must be a number")?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                 => cmd_status(api_port).await,
        ["nodes"]                       => cmd_nodes(api_port).await,
        ["register", rest @ ..]         => cmd_register(&server, parse_node(rest)?).await,
        ["deregister", rest @ ..]       => cmd_deregister(&server, parse_node(rest)?).await,
        ["seed", rest @ ..]             => cmd_seed(&server, parse_node(rest)?).await,
        ["poll"]                        => cmd_poll(&server).await,
        ["help"] | ["--help"] | ["-h"]  => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
