//! RLM gateway trust enforcement core.
//!
//! This library provides the pieces that keep resource access honest when an
//! agent is supposed to reach everything through the RLM gateway:
//!
//! - **auth** — dual-mode bearer-token validation for inbound gateway
//!   requests: static API key or OAuth 2.0 token introspection with a
//!   per-token result cache.
//! - **detect** — pluggable heuristic scanners that flag canary-token
//!   leakage and direct file-access code patterns in arbitrary text.
//! - **monitor** — the bypass monitor: shared alert log, gateway health
//!   polling, sentinel-file tamper polling, and report generation.
//! - **gateway** — HTTP client for the gateway's health endpoint and its
//!   JSON-RPC provenance report tool.
//! - **provenance** — the CI-time gate that cross-checks a change list
//!   against recorded provenance spans.
//!
//! The CLI surfaces live in the `rlmgate` binary crate.

pub mod auth;
pub mod detect;
pub mod error;
pub mod gateway;
pub mod monitor;
pub mod provenance;
