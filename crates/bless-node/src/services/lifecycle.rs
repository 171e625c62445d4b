// ============================================
// File: crates/bless-node/src/services/lifecycle.rs
// ============================================
//! # Node Lifecycle
//!
//! ## Creation Reason
//! Drives one node from nothing to an active session and keeps it there.
//!
//! ## Stage Progression
//! ```text
//! ┌────────────┐ ok  ┌──────────┐ ok  ┌──────────────┐ ok  ┌────────┐
//! │ DiscoverIp │────►│ Register │────►│ StartSession │────►│ Active │
//! └─────┬──────┘     └────┬─────┘     └──────┬───────┘     └────────┘
//!       │ err             │ err              │ err
//!       ▼                 ▼                  ▼
//!  rotate, 5s,      re-discover IP,     re-register (which
//!  retry            rotate, 5s, retry   re-discovers), 5s, retry
//! ```
//!
//! ## Main Functionality
//! - `NodeLifecycle::run`: the whole progression, until cancelled
//! - Cascading fallback: a failed stage re-runs the stage before it
//! - Active: `HeartbeatLoop` and `EarningsPollLoop` side by side
//!
//! ## ⚠️ Important Note for Next Developer
//! - Each stage failure means the `GatewayClient` retry budget was spent
//! - Every stage takes the node's current proxy when it starts; proxies
//!   only rotate on IP-lookup or registration failure
//! - Stages retry forever; only cancellation stops a node
//!
//! ## Last Modified
//! v0.1.0 - Initial lifecycle implementation

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::reporter::NodeEvent;

use super::earnings::EarningsPollLoop;
use super::heartbeat::HeartbeatLoop;
use super::runtime::NodeRuntime;

// ============================================
// LifecycleTimings
// ============================================

/// Pauses used by a node lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimings {
    /// Pause after a failed stage.
    pub stage_retry: Duration,
    /// Pause between heartbeats.
    pub heartbeat_interval: Duration,
    /// Pause between reward polls.
    pub earnings_interval: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            stage_retry: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(10 * 60),
            earnings_interval: Duration::from_secs(15 * 60),
        }
    }
}

// ============================================
// NodeLifecycle
// ============================================

/// Lifecycle of one node.
#[derive(Debug, Clone)]
pub struct NodeLifecycle {
    runtime: NodeRuntime,
    timings: LifecycleTimings,
}

impl NodeLifecycle {
    /// Creates the lifecycle.
    #[must_use]
    pub const fn new(runtime: NodeRuntime, timings: LifecycleTimings) -> Self {
        Self { runtime, timings }
    }

    /// Node handle.
    #[must_use]
    pub const fn runtime(&self) -> &NodeRuntime {
        &self.runtime
    }

    /// Runs the node until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        debug!(node = %self.runtime.pub_key().masked(), "Node lifecycle started");
        tokio::select! {
            () = cancel.cancelled() => {}
            () = self.drive(&cancel) => {}
        }
        debug!(node = %self.runtime.pub_key().masked(), "Node lifecycle stopped");
    }

    async fn drive(&self, cancel: &CancellationToken) {
        self.start_session().await;
        self.active(cancel).await;
    }

    /// Looks up the public address until it succeeds.
    async fn discover_ip(&self) -> String {
        let runtime = &self.runtime;
        let mut proxy = runtime.current_proxy();
        loop {
            match runtime.client().lookup_ip_address(proxy.as_ref()).await {
                Ok(ip) => {
                    runtime.report(proxy.as_ref(), NodeEvent::IpDiscovered { ip: ip.clone() });
                    return ip;
                }
                Err(e) => {
                    runtime.report(
                        proxy.as_ref(),
                        NodeEvent::IpLookupFailed {
                            error: e.to_string(),
                        },
                    );
                    proxy = runtime.rotate_proxy();
                    tokio::time::sleep(self.timings.stage_retry).await;
                }
            }
        }
    }

    /// Registers the node, re-discovering the address after each failure.
    async fn register(&self) {
        let runtime = &self.runtime;
        let mut ip = self.discover_ip().await;
        let mut proxy = runtime.current_proxy();
        loop {
            let result = runtime
                .client()
                .register_node(&runtime.account().token, runtime.node(), &ip, proxy.as_ref())
                .await;
            match result {
                Ok(_) => {
                    runtime.report(proxy.as_ref(), NodeEvent::Registered);
                    return;
                }
                Err(e) => {
                    runtime.report(
                        proxy.as_ref(),
                        NodeEvent::RegisterFailed {
                            error: e.to_string(),
                        },
                    );
                    ip = self.discover_ip().await;
                    proxy = runtime.rotate_proxy();
                    tokio::time::sleep(self.timings.stage_retry).await;
                }
            }
        }
    }

    /// Starts the session, re-registering after each failure.
    async fn start_session(&self) {
        let runtime = &self.runtime;
        self.register().await;
        let mut proxy = runtime.current_proxy();
        loop {
            let result = runtime
                .client()
                .start_session(&runtime.account().token, runtime.pub_key(), proxy.as_ref())
                .await;
            match result {
                Ok(_) => {
                    runtime.report(proxy.as_ref(), NodeEvent::SessionStarted);
                    return;
                }
                Err(e) => {
                    runtime.report(
                        proxy.as_ref(),
                        NodeEvent::SessionFailed {
                            error: e.to_string(),
                        },
                    );
                    self.register().await;
                    proxy = runtime.current_proxy();
                    tokio::time::sleep(self.timings.stage_retry).await;
                }
            }
        }
    }

    /// Heartbeat and earnings loops side by side, until cancelled.
    async fn active(&self, cancel: &CancellationToken) {
        let heartbeat = HeartbeatLoop::new(self.runtime.clone(), self.timings.heartbeat_interval);
        let earnings = EarningsPollLoop::new(self.runtime.clone(), self.timings.earnings_interval);
        tokio::join!(heartbeat.run(cancel.clone()), earnings.run(cancel.clone()));
    }
}

// ============================================
// Tests
// ============================================
