// ============================================
// File: crates/bless-common/src/lib.rs
// ============================================
//! # Bless Common - Shared Types Library
//!
//! ## Creation Reason
//! Provides the account, node and proxy types shared by every crate of
//! the Bless node client, so credentials are represented (and redacted)
//! the same way everywhere.
//!
//! ## Main Functionality
//! - [`types`]: `Account`, `Node`, `NodeKey`, `SecretKey`, `Proxy`, masking
//! - [`error`]: Common error types and result aliases
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 bless-node                          │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │    bless-core  ◄──────  bless-transport            │
//! │         │                     │                    │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │              bless-common  ◄── You are here       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Secrets and bearer tokens must never reach a log line unmasked
//! - `SecretKey` zeroizes on drop; do not add `Copy` or a plain `Debug`
//! - Keep dependencies minimal
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CommonError, Result};
pub use types::{mask, Account, Node, NodeKey, Proxy, SecretKey};
