//! System DNS resolution.
//!
//! Uses the operating system's native resolver via `getaddrinfo`,
//! executed in a thread pool so it never blocks the async runtime or
//! stalls unrelated sessions.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use crate::base::neterror::NetError;

/// Resolve `host:port` to socket addresses.
///
/// A literal IP address bypasses resolution entirely.
pub async fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, NetError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let domain = host.to_string();
    let lookup = domain.clone();
    let result = tokio::task::spawn_blocking(move || {
        tracing::debug!(host = %lookup, "resolving via getaddrinfo");
        (lookup.as_str(), port)
            .to_socket_addrs()
            .map(|iter| iter.collect::<Vec<_>>())
    })
    .await;

    let addrs = result
        .map_err(|e| {
            tracing::error!(error = %e, "DNS resolution task failed");
            NetError::DnsFailure(domain.clone())
        })?
        .map_err(|e| {
            tracing::debug!(domain = %domain, error = %e, "DNS resolution failed");
            NetError::DnsFailure(domain.clone())
        })?;

    if addrs.is_empty() {
        return Err(NetError::DnsFailure(domain));
    }

    tracing::debug!(domain = %domain, count = addrs.len(), "DNS resolution complete");
    Ok(addrs)
}
