use anyhow::{bail, Context, Result};
use std::net::IpAddr;
use tokio::net::lookup_host;
use tracing::debug;

/// Resolve a scan host to the address every probe will dial.
///
/// Literal IPv4/IPv6 addresses are returned as-is without touching DNS.
/// Otherwise the first address from the system resolver is used.
pub async fn resolve_host(host: &str) -> Result<IpAddr> {
    let host = host.trim();
    if host.is_empty() {
        bail!("empty host");
    }
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let ip = lookup_host((host, 0))
        .await
        .with_context(|| format!("invalid IP address or hostname: {host}"))?
        .map(|sock| sock.ip())
        .next()
        .with_context(|| format!("hostname resolved to no addresses: {host}"))?;
    debug!(%host, %ip, "resolved host");
    Ok(ip)
}
