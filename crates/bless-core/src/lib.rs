// ============================================
// File: crates/bless-core/src/lib.rs
// ============================================
//! # Bless Core - Gateway Protocol & Heartbeat Signing
//!
//! ## Creation Reason
//! Provides the wire protocol spoken with the Bless gateway and the
//! HMAC-SHA512 signing that authenticates heartbeats.
//!
//! ## Main Functionality
//!
//! ### Protocol Module ([`protocol`])
//! - Request/response models (`RegisterNodeRequest`, `HeartbeatPayload`, `NodeStatus`)
//! - Canonical JSON codec (the exact bytes that are signed and sent)
//! - Extension version constants and endpoint paths
//!
//! ### Crypto Module ([`crypto`])
//! - `Signer`: HMAC-SHA512 over canonical JSON, lowercase hex output
//! - `SignedPayload`: body bytes plus their signature
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 bless-node                          │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │    bless-core  ◄──────  bless-transport            │
//! │   You are here                │                    │
//! │         │                     │                    │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │              bless-common                          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The gateway verifies the signature over the raw body bytes; the
//!   canonical codec output must not change
//! - Use RustCrypto `hmac`/`sha2`, never a hand-written MAC
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crypto;
pub mod error;
pub mod protocol;

// Re-export commonly used items
pub use crypto::{SignedPayload, Signer};
pub use error::{CoreError, Result};
pub use protocol::{
    GatewayReply, HardwareInfo, HeartbeatPayload, IpEcho, NodeStatus, RegisterNodeRequest,
    StartSessionRequest, EXTENSION_VERSION, PING_EXTENSION_VERSION,
};
