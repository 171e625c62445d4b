// ============================================
// File: crates/bless-core/src/protocol/mod.rs
// ============================================
//! # Protocol Module
//!
//! ## Creation Reason
//! Defines the JSON-over-HTTPS protocol spoken with the Bless gateway.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`messages`]: Request and reply structures
//! - [`codec`]: Canonical JSON encoding and reply decoding
//! - [`version`]: Extension versions, header values and endpoint paths
//!
//! ## Protocol Overview
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  GET  ip-check.bless.network/            → { "ip": ... }     │
//! │  POST /api/v1/nodes/{pubKey}             register            │
//! │  POST /api/v1/nodes/{pubKey}/start-session                   │
//! │  POST /api/v1/nodes/{pubKey}/ping        signed heartbeat    │
//! │  GET  /api/v1/nodes/{pubKey}             rewards / status    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Field names are camelCase on the wire; keep the serde renames
//! - The heartbeat body must be produced by [`codec::to_canonical_vec`]
//!
//! ## Last Modified
//! v0.1.0 - Initial protocol definitions

pub mod codec;
pub mod messages;
pub mod version;

// Re-export primary types
pub use codec::{decode_reply, to_canonical_string, to_canonical_vec};
pub use messages::{
    GatewayReply, HardwareInfo, HeartbeatPayload, IpEcho, NodeStatus, RegisterNodeRequest,
    StartSessionRequest, REWARD_UNAVAILABLE,
};
pub use version::{
    NodeRoute, EXTENSION_ORIGIN, EXTENSION_USER_AGENT, EXTENSION_VERSION, GATEWAY_BASE_URL,
    IP_CHECK_URL, PING_EXTENSION_VERSION,
};
