use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use port_scan_rs::config::ScanConfig;
use port_scan_rs::ports::PortRange;
use port_scan_rs::services::ServiceDirectory;
use port_scan_rs::{report, resolve, scanner};

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// port-scan-rs — Concurrent TCP connect port scanner with service identification.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-scan-rs",
    version,
    about = "Concurrent TCP connect port scanner with service identification.",
    long_about = None
)]
struct Cli {
    /// Target IP address or hostname.
    host: String,

    /// First port of the inclusive range (1-65535).
    start_port: String,

    /// Last port of the inclusive range (1-65535).
    end_port: String,

    /// JSON file mapping port numbers to service names.
    #[arg(long, default_value = "services.json")]
    services: PathBuf,

    /// Socket connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 2000)]
    timeout_ms: u64,

    /// Banner read deadline in milliseconds.
    #[arg(long = "read-timeout-ms", default_value_t = 2000)]
    read_timeout_ms: u64,

    /// Max concurrent probes. Unlimited (one task per port) when omitted.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print results as pretty JSON instead of colored lines.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Disable ANSI colors.
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,

    /// Increase log verbosity (-v, -vv, -vvv). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout with 0; every usage error exits 1.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let directory = ServiceDirectory::load_from_path(&cli.services)?;
    info!(
        path = %cli.services.display(),
        entries = directory.len(),
        "loaded service directory"
    );

    let range = PortRange::parse(&cli.start_port, &cli.end_port)?;
    let ip = resolve::resolve_host(&cli.host).await?;

    let mut config = ScanConfig::default().with_timeouts(
        Duration::from_millis(cli.timeout_ms),
        Duration::from_millis(cli.read_timeout_ms),
    );
    if let Some(n) = cli.concurrency {
        config = config.with_concurrency(n);
    }

    let started_at = scanner::now_rfc3339();
    if !cli.json {
        println!("{}", report::header(&cli.host, &ip.to_string(), &started_at));
    }

    let results =
        scanner::scan_range_at(&cli.host, ip, range, Arc::new(directory), config, started_at)
            .await;

    let mut stdout = io::stdout().lock();
    if cli.json {
        report::write_json(&mut stdout, &results)?;
    } else {
        report::write_lines(&mut stdout, &results)?;
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}
