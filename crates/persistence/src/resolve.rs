//! Host resolution.
//!
//! Some driver and platform combinations fail with "address family not
//! supported" when handed a dual-stack host name. Resolving the host up front
//! and connecting to a literal IPv4 address avoids that; [`resolve_ipv4`]
//! does the resolution against any [`HostResolver`].

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ResolutionError;

/// Resolves a symbolic host to its addresses.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Returns every address `host` resolves to, in resolver order.
    async fn lookup(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, ResolutionError>;
}

/// The operating system's resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, ResolutionError> {
        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| ResolutionError::Lookup {
                host: host.to_string(),
                source,
            })?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// A fixed host table.
///
/// Hosts missing from the table fail like an unknown name would.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `host` with the given addresses.
    pub fn with_host(mut self, host: impl Into<String>, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        self.hosts.insert(host.into(), addrs.into_iter().collect());
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, host: &str, _port: u16) -> Result<Vec<IpAddr>, ResolutionError> {
        self.hosts
            .get(host)
            .cloned()
            .ok_or_else(|| ResolutionError::Lookup {
                host: host.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "unknown host"),
            })
    }
}

/// Resolves `host` and returns its first IPv4 address.
///
/// # Errors
///
/// * [`ResolutionError::Lookup`] - If the resolver fails
/// * [`ResolutionError::NoIpv4Address`] - If the host only has IPv6
///   addresses (or none)
pub async fn resolve_ipv4(
    resolver: &dyn HostResolver,
    host: &str,
    port: u16,
) -> Result<Ipv4Addr, ResolutionError> {
    let addrs = resolver.lookup(host, port).await?;
    debug!(host = %host, addresses = ?addrs, "Resolved host");

    addrs
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| {
            warn!(host = %host, "Host has no IPv4 address");
            ResolutionError::NoIpv4Address {
                host: host.to_string(),
            }
        })
}
