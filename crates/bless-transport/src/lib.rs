// ============================================
// File: crates/bless-transport/src/lib.rs
// ============================================
//! # Bless Transport - Gateway I/O Layer
//!
//! ## Creation Reason
//! Provides the network side of the Bless node client: the gateway call
//! interface, its HTTP implementation, the per-call retry policy and the
//! client that combines them with heartbeat signing.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`traits`]: `Gateway` trait and `Operation` names
//! - [`http`]: `reqwest` implementation
//! - [`retry`]: fixed-delay bounded `RetryPolicy`
//! - [`client`]: `GatewayClient`, the retrying and signing front end
//! - [`error`]: Transport-specific error types
//! - `mock`: in-memory gateway (tests and the `mock` feature)
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 bless-node                          │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │    bless-core  ◄──────  bless-transport            │
//! │                         You are here ◄──           │
//! │         │                     │                    │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │              bless-common                          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │   NodeLifecycle / HeartbeatLoop / EarningsPollLoop       │
//! │                       │                                  │
//! │            ┌──────────┴──────────┐                      │
//! │            │   GatewayClient     │                      │
//! │            │ (retry + signing)   │                      │
//! │            └──────────┬──────────┘                      │
//! │                       │                                  │
//! │            ┌──────────┴──────────┐                      │
//! │            │    dyn Gateway      │                      │
//! │            │ (HttpGateway/Mock)  │                      │
//! │            └──────────┬──────────┘                      │
//! │                       │  optional proxy                  │
//! │                       ▼                                  │
//! │          ip-check service / node gateway                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Always program against `Gateway` for testability
//! - Mock implementation available with `mock` feature
//!
//! ## Last Modified
//! v0.1.0 - Initial transport layer implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod http;
pub mod retry;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export primary types
pub use client::GatewayClient;
pub use error::{Result, TransportError};
pub use http::{GatewaySettings, HttpGateway};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use traits::{Gateway, Operation};
