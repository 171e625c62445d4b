// ============================================
// File: crates/bless-core/src/crypto/mod.rs
// ============================================
//! # Cryptography Module
//!
//! ## Creation Reason
//! Heartbeats are authenticated with an HMAC-SHA512 tag keyed by the
//! account secret. This module owns that computation.
//!
//! ## Signing Flow
//! ```text
//!  HeartbeatPayload ──► canonical JSON bytes ──┬──► request body
//!                                              │
//!  SecretKey ──► HMAC-SHA512 ◄─────────────────┘
//!                    │
//!                    ▼
//!            lowercase hex ──► X-Extension-Signature
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - RustCrypto `hmac` + `sha2` only
//! - The signed bytes and the sent bytes must be the same buffer
//!
//! ## Last Modified
//! v0.1.0 - Initial crypto implementation

pub mod signer;

pub use signer::{SignedPayload, Signer};

/// Length of an HMAC-SHA512 tag in bytes.
pub const SIGNATURE_SIZE: usize = 64;
