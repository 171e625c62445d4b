// ============================================
// File: crates/bless-node/src/proxy/mod.rs
// ============================================
//! # Proxy Sources
//!
//! ## Creation Reason
//! Each node is pinned to one proxy until a stage fails, then moved to
//! another. The `ProxySource` capability owns that assignment so no global
//! state is needed.
//!
//! ## Assignment Model
//! ```text
//!  pool:   [p0, p1, p2]        cursor ──► next unassigned slot
//!
//!  next("A")   → p0  (first use, takes cursor)
//!  next("B")   → p1
//!  next("A")   → p0  (pinned)
//!  rotate("A") → p2  (takes cursor, never the current one)
//! ```
//!
//! ## Main Functionality
//! - `ProxySource`: `next` / `rotate` keyed by node public key
//! - `DirectProxy`: no proxy at all
//! - `ProxyPool`: round-robin pool with per-node pinning
//! - [`loader`]: proxy list parsing, file and download sources
//!
//! ## ⚠️ Important Note for Next Developer
//! - Called concurrently from every node task
//! - Never log `Proxy::url()`, it may carry credentials
//!
//! ## Last Modified
//! v0.1.0 - Initial proxy sources

pub mod loader;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use bless_common::{NodeKey, Proxy};

use crate::config::{ProxyConfig, ProxyMode};
use crate::error::Result;

pub use loader::{download_proxy_list, load_proxy_file, parse_proxy_list};

// ============================================
// ProxySource Trait
// ============================================

/// Supplies and rotates the proxy of each node.
pub trait ProxySource: Send + Sync {
    /// Returns the proxy currently assigned to `pub_key`, assigning one on
    /// first use. `None` means a direct connection.
    fn next(&self, pub_key: &NodeKey) -> Option<Proxy>;

    /// Moves `pub_key` to another proxy and returns it.
    fn rotate(&self, pub_key: &NodeKey) -> Option<Proxy>;
}

// ============================================
// DirectProxy
// ============================================

/// Source for direct connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectProxy;

impl ProxySource for DirectProxy {
    fn next(&self, _pub_key: &NodeKey) -> Option<Proxy> {
        None
    }

    fn rotate(&self, _pub_key: &NodeKey) -> Option<Proxy> {
        None
    }
}

// ============================================
// ProxyPool
// ============================================

/// Round-robin proxy pool with per-node pinning.
#[derive(Debug, Default)]
pub struct ProxyPool {
    proxies: Vec<Proxy>,
    cursor: AtomicUsize,
    assigned: DashMap<NodeKey, usize>,
}

impl ProxyPool {
    /// Creates a pool over `proxies`.
    #[must_use]
    pub fn new(proxies: Vec<Proxy>) -> Self {
        Self {
            proxies,
            cursor: AtomicUsize::new(0),
            assigned: DashMap::new(),
        }
    }

    /// Number of proxies in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Returns `true` if the pool holds no proxy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    fn take_slot(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % self.proxies.len()
    }
}

impl ProxySource for ProxyPool {
    fn next(&self, pub_key: &NodeKey) -> Option<Proxy> {
        if self.proxies.is_empty() {
            return None;
        }
        let slot = *self
            .assigned
            .entry(pub_key.clone())
            .or_insert_with(|| self.take_slot());
        self.proxies.get(slot).cloned()
    }

    fn rotate(&self, pub_key: &NodeKey) -> Option<Proxy> {
        if self.proxies.is_empty() {
            return None;
        }
        let mut entry = self
            .assigned
            .entry(pub_key.clone())
            .or_insert(usize::MAX);
        let mut slot = self.take_slot();
        if slot == *entry && self.proxies.len() > 1 {
            slot = self.take_slot();
        }
        *entry = slot;
        self.proxies.get(slot).cloned()
    }
}

// ============================================
// Construction
// ============================================

/// Builds the proxy source for `mode`.
///
/// # Errors
/// Returns `ProxyLoad` or `NoProxies` if the list cannot be obtained or is
/// empty.
pub async fn build_proxy_source(
    config: &ProxyConfig,
    mode: ProxyMode,
) -> Result<Arc<dyn ProxySource>> {
    let proxies = match mode {
        ProxyMode::None => return Ok(Arc::new(DirectProxy)),
        ProxyMode::Private => load_proxy_file(&config.file).await?,
        ProxyMode::Public => download_proxy_list(&config.public_list_url).await?,
    };
    tracing::info!(mode = ?mode, count = proxies.len(), "Proxies loaded");
    Ok(Arc::new(ProxyPool::new(proxies)))
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> ProxyPool {
        ProxyPool::new(
            (0..n)
                .map(|i| format!("10.0.0.{i}:8080").parse().unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_direct_proxy() {
        let key = NodeKey::new("a");
        assert!(DirectProxy.next(&key).is_none());
        assert!(DirectProxy.rotate(&key).is_none());
    }

    #[test]
    fn test_pinned_round_robin() {
        let pool = pool(3);
        let a = NodeKey::new("a");
        let b = NodeKey::new("b");

        let first = pool.next(&a).unwrap();
        assert_eq!(first.url(), "http://10.0.0.0:8080");
        assert_eq!(pool.next(&b).unwrap().url(), "http://10.0.0.1:8080");
        assert_eq!(pool.next(&a).unwrap(), first);
    }

    #[test]
    fn test_rotate_moves_node() {
        let pool = pool(2);
        let a = NodeKey::new("a");

        let before = pool.next(&a).unwrap();
        let rotated = pool.rotate(&a).unwrap();
        assert_ne!(before, rotated);
        assert_eq!(pool.next(&a).unwrap(), rotated);

        let again = pool.rotate(&a).unwrap();
        assert_eq!(again, before);
    }

    #[test]
    fn test_rotate_single_proxy() {
        let pool = pool(1);
        let a = NodeKey::new("a");
        assert_eq!(pool.rotate(&a), pool.next(&a));
    }

    #[test]
    fn test_empty_pool() {
        let pool = ProxyPool::new(vec![]);
        assert!(pool.is_empty());
        assert!(pool.next(&NodeKey::new("a")).is_none());
        assert!(pool.rotate(&NodeKey::new("a")).is_none());
    }

    #[tokio::test]
    async fn test_build_direct() {
        let source = build_proxy_source(&ProxyConfig::default(), ProxyMode::None)
            .await
            .unwrap();
        assert!(source.next(&NodeKey::new("a")).is_none());
    }
}
