use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::types::{PortState, ScanOutcome, ScanReport};

/// Drain the completion channel until it closes, then sort by port.
///
/// Completion order is arbitrary; the stable sort is the only ordering
/// guarantee callers get.
pub async fn collect_sorted(mut rx: mpsc::Receiver<ScanOutcome>) -> Vec<ScanOutcome> {
    let mut out = Vec::new();
    while let Some(outcome) = rx.recv().await {
        out.push(outcome);
    }
    out.sort_by_key(|o| o.port);
    out
}

/// One display line: bright green for open ports, bright red for closed.
pub fn render_line(outcome: &ScanOutcome) -> String {
    let text = outcome.to_string();
    match outcome.state {
        PortState::Open => text.bright_green().to_string(),
        PortState::Closed => text.bright_red().to_string(),
    }
}

pub fn header(host: &str, ip: &str, started_at: &str) -> String {
    if host == ip {
        format!("Starting port scan on host {host} at {started_at}...")
    } else {
        format!("Starting port scan on host {host} ({ip}) at {started_at}...")
    }
}

/// Write one line per entry, in report order.
pub fn write_lines<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    for entry in &report.entries {
        writeln!(out, "{}", render_line(entry))?;
    }
    out.flush()
}

pub fn write_json<W: Write>(out: &mut W, report: &ScanReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
