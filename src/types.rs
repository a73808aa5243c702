use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// A single host:port probe target. Built once per task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub host: String,
    pub ip: IpAddr,
    pub port: u16,
}

impl ScanTarget {
    pub fn new(host: impl Into<String>, ip: IpAddr, port: u16) -> Self {
        Self {
            host: host.into(),
            ip,
            port,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Open,
    Closed,
}

/// Where an open port's service name came from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "source", content = "name", rename_all = "snake_case")]
pub enum Service {
    /// Static lookup in the service directory.
    Directory(String),
    /// First line the service sent after connect, trimmed.
    Banner(String),
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Directory(name) => f.write_str(name),
            Service::Banner(line) => write!(f, "Custom: {line}"),
        }
    }
}

/// Terminal classification of one port.
///
/// `service` is always `None` for closed ports; an open port with `None`
/// is open but unidentified.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub port: u16,
    pub state: PortState,
    pub service: Option<Service>,
}

impl ScanOutcome {
    pub fn closed(port: u16) -> Self {
        Self {
            port,
            state: PortState::Closed,
            service: None,
        }
    }

    pub fn open(port: u16, service: Option<Service>) -> Self {
        Self {
            port,
            state: PortState::Open,
            service,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.state, &self.service) {
            (PortState::Closed, _) => write!(f, "[CLOSED] Port {} is closed", self.port),
            (PortState::Open, Some(service)) => {
                write!(f, "[OPEN] Port {} is open - Service: {}", self.port, service)
            }
            (PortState::Open, None) => {
                write!(f, "[OPEN] Port {} is open - Service: Unknown", self.port)
            }
        }
    }
}

/// Aggregate of a finished scan, entries sorted by port.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanReport {
    pub host: String,
    pub ip: String,
    pub started_at: String,
    pub scanned_total: u64,
    pub open_count: u64,
    pub entries: Vec<ScanOutcome>,
}
