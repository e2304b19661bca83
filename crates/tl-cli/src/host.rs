//! Host identity.
//!
//! Entry ids start with a host identifier so entries appended on different
//! machines stay distinguishable after their logs are merged.

use anyhow::{Context, Result};
use tl_core::HostId;

use crate::Config;

/// Resolves this machine's host id: configured value first, then hostname.
pub fn resolve_host_id(config: &Config) -> Result<HostId> {
    let raw = config.host_id.clone().unwrap_or_else(|| {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    HostId::new(sanitize(&raw)).context("host id cannot be empty")
}

/// Keeps host ids usable in both file names and property values.
fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
