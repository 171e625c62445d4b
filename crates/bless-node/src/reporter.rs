// ============================================
// File: crates/bless-node/src/reporter.rs
// ============================================
//! # Event Reporting
//!
//! Node tasks never print. Every observable step is a [`NodeEvent`] handed
//! to an [`EventSink`] together with the node's [`NodeContext`] and the
//! proxy in use.
//!
//! Main Components:
//!   - NodeContext: masked account and node identity
//!   - NodeEvent: what happened
//!   - TracingSink: production sink, one structured `tracing` record per event
//!   - MemorySink: records events for assertions
//!
//! ⚠️ Important Note for Next Developer:
//!   - Sinks are called from every node task; keep `report` cheap and
//!     non-blocking
//!   - Only masked values may reach a log line
//!
//! Last Modified: v0.1.0 - Initial event reporting
// ============================================

use std::fmt;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use bless_common::{Account, NodeKey, Proxy};

// ============================================
// NodeContext
// ============================================

/// Identity attached to every event of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContext {
    /// Masked account token.
    pub account: String,
    /// Node public key.
    pub pub_key: NodeKey,
}

impl NodeContext {
    /// Creates the context of `pub_key` under `account`.
    #[must_use]
    pub fn new(account: &Account, pub_key: &NodeKey) -> Self {
        Self {
            account: account.masked_token(),
            pub_key: pub_key.clone(),
        }
    }
}

// ============================================
// NodeEvent
// ============================================

/// Observable steps of a node lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// Public address discovered.
    IpDiscovered {
        /// Address reported by the IP-check service
        ip: String,
    },
    /// IP lookup failed after all retries.
    IpLookupFailed {
        /// Last error
        error: String,
    },
    /// Node registered.
    Registered,
    /// Registration failed after all retries.
    RegisterFailed {
        /// Last error
        error: String,
    },
    /// Session started, periodic loops begin.
    SessionStarted,
    /// Session start failed after all retries.
    SessionFailed {
        /// Last error
        error: String,
    },
    /// Heartbeat accepted.
    HeartbeatSent,
    /// Heartbeat failed after all retries.
    HeartbeatFailed {
        /// Last error
        error: String,
    },
    /// Reward figures, `"N/A"` when unavailable.
    Earnings {
        /// Reward accrued today
        today: String,
        /// Reward accrued in total
        total: String,
    },
    /// The node task ended without being cancelled.
    LifecycleExited {
        /// Why it ended
        reason: String,
    },
}

impl NodeEvent {
    /// Returns `true` for failure events.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::IpLookupFailed { .. }
                | Self::RegisterFailed { .. }
                | Self::SessionFailed { .. }
                | Self::HeartbeatFailed { .. }
                | Self::LifecycleExited { .. }
        )
    }
}

impl fmt::Display for NodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IpDiscovered { ip } => write!(f, "IP address: {ip}"),
            Self::IpLookupFailed { error } => write!(f, "IP lookup failed: {error}"),
            Self::Registered => f.write_str("Node registered"),
            Self::RegisterFailed { error } => write!(f, "Registration failed: {error}"),
            Self::SessionStarted => f.write_str("Session started"),
            Self::SessionFailed { error } => write!(f, "Session start failed: {error}"),
            Self::HeartbeatSent => f.write_str("Ping sent"),
            Self::HeartbeatFailed { error } => write!(f, "Ping failed: {error}"),
            Self::Earnings { today, total } => {
                write!(f, "Earning today: {today} minutes, total: {total} minutes")
            }
            Self::LifecycleExited { reason } => write!(f, "Node task exited: {reason}"),
        }
    }
}

// ============================================
// EventSink Trait
// ============================================

/// Receiver of node events.
pub trait EventSink: Send + Sync {
    /// Reports `event` for the node in `ctx`, sent through `proxy`.
    fn report(&self, ctx: &NodeContext, proxy: Option<&Proxy>, event: NodeEvent);
}

// ============================================
// TracingSink
// ============================================

/// Sink emitting one `tracing` record per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn report(&self, ctx: &NodeContext, proxy: Option<&Proxy>, event: NodeEvent) {
        let node = ctx.pub_key.masked();
        let proxy = proxy.map_or_else(|| "direct".to_string(), Proxy::redacted);
        match &event {
            NodeEvent::LifecycleExited { .. } => {
                error!(account = %ctx.account, node = %node, proxy = %proxy, "{event}");
            }
            e if e.is_failure() => {
                warn!(account = %ctx.account, node = %node, proxy = %proxy, "{event}");
            }
            _ => info!(account = %ctx.account, node = %node, proxy = %proxy, "{event}"),
        }
    }
}

// ============================================
// MemorySink
// ============================================

/// One event captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Node the event belongs to.
    pub pub_key: NodeKey,
    /// Proxy in use.
    pub proxy: Option<Proxy>,
    /// The event.
    pub event: NodeEvent,
}

/// Sink keeping every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every event so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Returns the events of one node.
    #[must_use]
    pub fn events_for(&self, pub_key: &NodeKey) -> Vec<NodeEvent> {
        self.events
            .lock()
            .iter()
            .filter(|r| &r.pub_key == pub_key)
            .map(|r| r.event.clone())
            .collect()
    }

    /// Counts events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&NodeEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|r| predicate(&r.event)).count()
    }
}

impl EventSink for MemorySink {
    fn report(&self, ctx: &NodeContext, proxy: Option<&Proxy>, event: NodeEvent) {
        self.events.lock().push(RecordedEvent {
            pub_key: ctx.pub_key.clone(),
            proxy: proxy.cloned(),
            event,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bless_common::Node;

    fn ctx() -> NodeContext {
        let account = Account::new("token-abcdefgh", "secret", vec![Node::new("pk", "hw")]);
        NodeContext::new(&account, &NodeKey::new("node-key-123456"))
    }

    #[test]
    fn test_context_masks_token() {
        let ctx = ctx();
        assert!(!ctx.account.contains("abcdefgh"));
        assert!(ctx.account.contains("***"));
    }

    #[test]
    fn test_event_display() {
        let event = NodeEvent::Earnings {
            today: "N/A".into(),
            total: "340".into(),
        };
        assert_eq!(event.to_string(), "Earning today: N/A minutes, total: 340 minutes");
        assert!(!event.is_failure());
        assert!(NodeEvent::HeartbeatFailed { error: "x".into() }.is_failure());
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        let ctx = ctx();
        sink.report(&ctx, None, NodeEvent::Registered);
        sink.report(&ctx, None, NodeEvent::SessionStarted);
        sink.report(&ctx, None, NodeEvent::HeartbeatSent);

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.count(|e| matches!(e, NodeEvent::HeartbeatSent)), 1);
        assert_eq!(
            sink.events_for(&ctx.pub_key)[..2],
            [NodeEvent::Registered, NodeEvent::SessionStarted]
        );
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let proxy: Proxy = "user:pass@10.0.0.1:80".parse().unwrap();
        TracingSink.report(&ctx(), Some(&proxy), NodeEvent::HeartbeatSent);
        TracingSink.report(&ctx(), None, NodeEvent::LifecycleExited { reason: "panic".into() });
    }
}
