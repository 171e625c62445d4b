// ============================================
// File: crates/bless-node/src/proxy/loader.rs
// ============================================
//! Proxy list loading.
//!
//! One entry per line. Blank lines and `#` comments are ignored; entries
//! without a scheme are treated as `http://`; unparsable entries are
//! skipped with a warning.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use bless_common::Proxy;

use crate::error::{NodeError, Result};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Parses a proxy list, keeping file order.
#[must_use]
pub fn parse_proxy_list(content: &str) -> Vec<Proxy> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            match line.parse::<Proxy>() {
                Ok(proxy) => Some(proxy),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping proxy entry");
                    None
                }
            }
        })
        .collect()
}

fn non_empty(source_name: &str, proxies: Vec<Proxy>) -> Result<Vec<Proxy>> {
    if proxies.is_empty() {
        return Err(NodeError::NoProxies {
            source_name: source_name.to_string(),
        });
    }
    Ok(proxies)
}

/// Reads a proxy list from a local file.
///
/// # Errors
/// `ProxyLoad` if the file cannot be read, `NoProxies` if it holds no
/// usable entry.
pub async fn load_proxy_file(path: &Path) -> Result<Vec<Proxy>> {
    let name = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NodeError::proxy_load(&name, e.to_string()))?;
    non_empty(&name, parse_proxy_list(&content))
}

/// Downloads a proxy list.
///
/// # Errors
/// `ProxyLoad` on request failure or non-2xx status, `NoProxies` if the
/// list holds no usable entry.
pub async fn download_proxy_list(url: &str) -> Result<Vec<Proxy>> {
    info!(url, "Downloading proxy list");
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| NodeError::proxy_load(url, e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| NodeError::proxy_load(url, e.to_string()))?;
    let content = response
        .text()
        .await
        .map_err(|e| NodeError::proxy_load(url, e.to_string()))?;
    non_empty(url, parse_proxy_list(&content))
}
