// ============================================
// File: crates/bless-node/src/lib.rs
// ============================================
//! # Bless Node Client Library
//!
//! ## Creation Reason
//! Keeps every node of every configured account online on the Bless
//! network: discovers the public address, registers the node, opens a
//! session, then sends signed heartbeats and polls earnings.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`config`]: TOML configuration
//! - [`accounts`]: Account file loading
//! - [`proxy`]: Proxy list loading and per-node assignment
//! - [`services`]: Per-node lifecycle and periodic loops
//! - [`scheduler`]: Fan-out and supervision of all lifecycles
//! - [`reporter`]: Node events and their sinks
//! - [`logging`]: Subscriber setup with a reloadable level
//! - [`error`]: Client error types
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       AccountScheduler                          │
//! │   accounts.json ──► one NodeLifecycle per (account, node)       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  NodeLifecycle                                                  │
//! │  ┌───────────┐   ┌──────────┐   ┌──────────────┐   ┌────────┐  │
//! │  │DiscoverIp │──►│ Register │──►│ StartSession │──►│ Active │  │
//! │  └───────────┘   └──────────┘   └──────────────┘   └───┬────┘  │
//! │        ▲  failure    │ ▲  failure     │                │       │
//! │        └─────────────┘ └──────────────┘     heartbeat 10m      │
//! │                                             earnings  15m      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  GatewayClient (retry 5 × 5s) ── ProxySource ── EventSink       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Configuration changes require restart, account changes do not
//! - Cancellation is cooperative through `CancellationToken`
//! - Secrets never reach the logs unmasked
//!
//! ## Last Modified
//! v0.1.0 - Initial client library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accounts;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod reporter;
pub mod scheduler;
pub mod services;

#[cfg(test)]
mod testing;

// Re-export primary types
pub use accounts::{AccountStore, JsonAccountStore};
pub use config::{NodeConfig, ProxyMode};
pub use error::{NodeError, Result};
pub use reporter::{EventSink, NodeEvent, TracingSink};
pub use scheduler::{run_accounts, AccountScheduler, SchedulerSettings};
pub use services::{LifecycleTimings, NodeLifecycle};
