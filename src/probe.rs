use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::services::ServiceDirectory;
use crate::types::{ScanOutcome, ScanTarget, Service};

/// Connect to the target, giving up after `timeout`.
///
/// A timeout surfaces as `io::ErrorKind::TimedOut`.
pub async fn dial(target: &ScanTarget, timeout: Duration) -> io::Result<TcpStream> {
    match time::timeout(timeout, TcpStream::connect(target.socket_addr())).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timeout")),
    }
}

/// Classify one port: a single timed dial decides open or closed, then open
/// ports go through service identification.
///
/// Never fails. Every error is folded into the outcome.
pub async fn probe_port(
    target: &ScanTarget,
    directory: &ServiceDirectory,
    config: &ScanConfig,
) -> ScanOutcome {
    match dial(target, config.connect_timeout).await {
        // The probe connection is dropped straight away; identification reconnects.
        Ok(stream) => drop(stream),
        Err(e) => {
            debug!(addr = %target, error = %e, "closed");
            return ScanOutcome::closed(target.port);
        }
    }
    debug!(addr = %target, "open");

    let service = identify_service(target, directory, config).await;
    ScanOutcome::open(target.port, service)
}

/// Resolve a display name for an open port.
///
/// Directory hits return immediately without any network I/O. Otherwise a
/// fresh connection is opened and one banner line is read under
/// `config.read_timeout`. `None` means open but unidentified.
pub async fn identify_service(
    target: &ScanTarget,
    directory: &ServiceDirectory,
    config: &ScanConfig,
) -> Option<Service> {
    if let Some(name) = directory.lookup(target.port) {
        debug!(addr = %target, service = name, "identified from directory");
        return Some(Service::Directory(name.to_owned()));
    }

    let stream = match dial(target, config.connect_timeout).await {
        Ok(s) => s,
        Err(e) => {
            debug!(addr = %target, error = %e, "banner reconnect failed");
            return None;
        }
    };

    let banner = read_banner(stream, config.read_timeout, config.banner_line_limit).await;
    if let Some(line) = &banner {
        debug!(addr = %target, banner = %line, "identified from banner");
    }
    banner.map(Service::Banner)
}

/// Read one banner line within `deadline` and return it trimmed.
///
/// Reading stops at the first `\n`, after `max_len` bytes, at EOF, or when the
/// deadline fires. Whatever was buffered by then is decoded lossily, so
/// greetings without a newline and non-UTF-8 banners are kept. Only a
/// banner that is empty after trimming yields `None`.
pub async fn read_banner<R>(reader: R, deadline: Duration, max_len: usize) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader.take(max_len as u64));
    let mut buf = Vec::with_capacity(max_len.min(256));

    // read_until leaves already-read bytes in `buf` when the timeout drops it.
    let res = time::timeout(deadline, reader.read_until(b'\n', &mut buf)).await;
    match res {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => trace!(error = %e, buffered = buf.len(), "banner read failed"),
        Err(_) => trace!(buffered = buf.len(), "banner read timed out"),
    }

    let text = String::from_utf8_lossy(&buf);
    trace!(raw = %text, "banner bytes");
    let line = text.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_owned())
    }
}
