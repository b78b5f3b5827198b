//! Client side of the gateway's HTTP surface.
//!
//! Two calls, both synchronous request/response with short budgets and no
//! retry: the health probe (`GET /health`, 5s) and the provenance report
//! tool (`POST /mcp` JSON-RPC `tools/call`, 10s).

pub mod client;
pub mod jsonrpc;

pub use client::{GatewayClient, GatewayConfig};
