//! CLI command modules.

pub mod http;
pub mod membership;
pub mod rpc;
pub mod status;
