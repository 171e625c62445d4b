// ============================================
// File: crates/bless-node/src/services/mod.rs
// ============================================
//! # Node Services
//!
//! ## Creation Reason
//! Provides the per-node logic of the client, separated from transport,
//! configuration and scheduling concerns.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`runtime`]: per-node handle to the shared collaborators
//! - [`lifecycle`]: DiscoverIp → Register → StartSession → Active
//! - [`heartbeat`]: signed ping every 10 minutes
//! - [`earnings`]: reward poll every 15 minutes
//!
//! ## Service Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    NodeLifecycle                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  DiscoverIp ──► Register ──► StartSession ──► Active        │
//! │      ▲  │          │  ▲          │                │         │
//! │      └──┘          │  └──────────┘                │         │
//! │   rotate+5s        │   on failure          ┌──────┴──────┐  │
//! │      ▲             │                       ▼             ▼  │
//! │      └─────────────┘                 HeartbeatLoop EarningsPollLoop
//! │    on failure: re-discover, rotate       (10 min)    (15 min) │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Stages inside one node are strictly sequential
//! - Nodes share nothing but the `GatewayClient`, `ProxySource` and sink
//! - Periodic-loop failures never send a node back to an earlier stage
//!
//! ## Last Modified
//! v0.1.0 - Initial services structure

pub mod earnings;
pub mod heartbeat;
pub mod lifecycle;
pub mod runtime;

// Re-export primary types
pub use earnings::EarningsPollLoop;
pub use heartbeat::HeartbeatLoop;
pub use lifecycle::{LifecycleTimings, NodeLifecycle};
pub use runtime::{LifecycleDeps, NodeRuntime};
