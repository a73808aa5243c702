use ::time::{format_description::well_known, OffsetDateTime};
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::ScanConfig;
use crate::ports::PortRange;
use crate::probe::probe_port;
use crate::report::collect_sorted;
use crate::services::ServiceDirectory;
use crate::types::{ScanOutcome, ScanReport, ScanTarget};

/// Scan every port in `range` on `ip` and return the sorted report.
///
/// Waits for all ports to finish. `host` is the name the caller asked for and
/// is only used for display; every probe dials `ip`.
pub async fn scan_range(
    host: &str,
    ip: IpAddr,
    range: PortRange,
    directory: Arc<ServiceDirectory>,
    config: ScanConfig,
) -> ScanReport {
    scan_range_at(host, ip, range, directory, config, now_rfc3339()).await
}

/// Like [`scan_range`], recording `started_at` in the report as given.
pub async fn scan_range_at(
    host: &str,
    ip: IpAddr,
    range: PortRange,
    directory: Arc<ServiceDirectory>,
    config: ScanConfig,
    started_at: String,
) -> ScanReport {
    let start = Instant::now();
    info!(
        %host,
        %ip,
        %range,
        concurrency = ?config.concurrency,
        "scan started"
    );

    let rx = spawn_scan(host, ip, range, directory, Arc::new(config));
    let entries = collect_sorted(rx).await;
    let open_count = entries.iter().filter(|e| e.is_open()).count() as u64;

    info!(
        scanned = entries.len(),
        open = open_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scan finished"
    );

    ScanReport {
        host: host.to_string(),
        ip: ip.to_string(),
        started_at,
        scanned_total: range.len() as u64,
        open_count,
        entries,
    }
}

/// Start the scan in the background and hand back the completion channel.
///
/// One task per port is spawned (gated by a semaphore when
/// `config.concurrency` is set), each sending exactly one [`ScanOutcome`].
/// The channel is sized to the range so producers never wait on the
/// consumer. A supervisor task joins every probe and only then drops the
/// last sender, so `recv()` returns `None` exactly when all ports are done.
pub fn spawn_scan(
    host: &str,
    ip: IpAddr,
    range: PortRange,
    directory: Arc<ServiceDirectory>,
    config: Arc<ScanConfig>,
) -> mpsc::Receiver<ScanOutcome> {
    let (tx, rx) = mpsc::channel(range.len());
    let probe_config = config.clone();
    let probe = move |target: ScanTarget| {
        let directory = directory.clone();
        let config = probe_config.clone();
        async move { probe_port(&target, &directory, &config).await }
    };
    tokio::spawn(supervise(host.to_string(), ip, range, config, tx, probe));
    rx
}

/// Spawn `probe` once per port, join every task, then drop `tx`.
async fn supervise<F, Fut>(
    host: String,
    ip: IpAddr,
    range: PortRange,
    config: Arc<ScanConfig>,
    tx: mpsc::Sender<ScanOutcome>,
    probe: F,
) where
    F: Fn(ScanTarget) -> Fut + Send + 'static,
    Fut: Future<Output = ScanOutcome> + Send + 'static,
{
    let sem = config.concurrency.map(|n| Arc::new(Semaphore::new(n)));
    let mut handles: Vec<(u16, JoinHandle<()>)> = Vec::with_capacity(range.len());

    for port in range {
        // The semaphore is never closed, so acquire only fails if that changes.
        let permit = match &sem {
            Some(sem) => sem.clone().acquire_owned().await.ok(),
            None => None,
        };
        let work = probe(ScanTarget::new(host.clone(), ip, port));
        let tx = tx.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit;
            let outcome = work.await;
            let _ = tx.send(outcome).await;
        });
        handles.push((port, handle));
    }

    for (port, handle) in handles {
        if let Err(e) = handle.await {
            // A task that died never sent its outcome; account for the port here.
            warn!(port, error = %e, "probe task failed");
            let _ = tx.send(ScanOutcome::closed(port)).await;
        }
    }
}

/// Current UTC time as RFC 3339.
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
