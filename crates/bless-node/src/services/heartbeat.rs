// ============================================
// File: crates/bless-node/src/services/heartbeat.rs
// ============================================
//! # Heartbeat Loop
//!
//! Sends the signed ping of one node forever, pausing between pings.
//!
//! ⚠️ Important Note for Next Developer:
//!   - The pause starts when the attempt ends, so the period drifts by the
//!     request duration
//!   - A failed ping is reported and the loop carries on; it never sends
//!     the node back to registration
//!
//! Last Modified: v0.1.0 - Initial heartbeat loop
// ============================================

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::reporter::NodeEvent;

use super::runtime::NodeRuntime;

/// Periodic signed ping of one node.
#[derive(Debug, Clone)]
pub struct HeartbeatLoop {
    runtime: NodeRuntime,
    interval: Duration,
}

impl HeartbeatLoop {
    /// Creates the loop.
    #[must_use]
    pub const fn new(runtime: NodeRuntime, interval: Duration) -> Self {
        Self { runtime, interval }
    }

    /// Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = self.beat() => {}
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        debug!(node = %self.runtime.pub_key().masked(), "Heartbeat loop stopped");
    }

    /// One ping through the node's current proxy.
    async fn beat(&self) {
        let runtime = &self.runtime;
        let proxy = runtime.current_proxy();
        let account = runtime.account();
        let result = runtime
            .client()
            .send_heartbeat(&account.token, &account.secret_key, runtime.pub_key(), proxy.as_ref())
            .await;
        let event = match result {
            Ok(_) => NodeEvent::HeartbeatSent,
            Err(e) => NodeEvent::HeartbeatFailed {
                error: e.to_string(),
            },
        };
        runtime.report(proxy.as_ref(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{account, Harness};
    use bless_transport::mock::MockOutcome;
    use bless_transport::{Operation, RetryPolicy};

    #[tokio::test(start_paused = true)]
    async fn test_period_and_failure_tolerance() {
        let harness = Harness::new(RetryPolicy::single(), 0);
        harness
            .gateway
            .script(Operation::Heartbeat, [MockOutcome::fail("reset")]);
        let account = account("token-a", "abc", &["pk-a"]);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(
            HeartbeatLoop::new(harness.runtime(&account, 0), Duration::from_secs(600))
                .run(cancel.clone()),
        );
        tokio::time::sleep(Duration::from_secs(25 * 60)).await;
        cancel.cancel();
        task.await.unwrap();

        // t = 0, 10, 20 minutes; the first one failed
        let pings = harness.gateway.heartbeats();
        assert_eq!(pings.len(), 3);
        assert!(pings.iter().all(|p| p.body == br#"{"isB7SConnected": true}"#));

        let events = harness.sink.events_for(&account.nodes[0].pub_key);
        assert!(matches!(events[0], NodeEvent::HeartbeatFailed { .. }));
        assert_eq!(events[1..], [NodeEvent::HeartbeatSent, NodeEvent::HeartbeatSent]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep() {
        let harness = Harness::new(RetryPolicy::single(), 0);
        let account = account("token-a", "abc", &["pk-a"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        HeartbeatLoop::new(harness.runtime(&account, 0), Duration::from_secs(600))
            .run(cancel)
            .await;

        assert!(harness.gateway.heartbeats().len() <= 1);
    }
}
