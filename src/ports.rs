use anyhow::{bail, Context, Result};
use std::fmt;
use std::ops::RangeInclusive;

/// Inclusive TCP port range `start..=end` with `1 <= start <= end <= 65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    /// Build a range, rejecting port 0 and reversed bounds.
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 || end == 0 {
            bail!("port out of range: 0");
        }
        if start > end {
            bail!("invalid range {start}-{end} (start > end)");
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from their textual form, e.g. CLI arguments.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let s = parse_port_str(start.trim())
            .with_context(|| format!("invalid start port: {start}"))?;
        let e = parse_port_str(end.trim()).with_context(|| format!("invalid end port: {end}"))?;
        Self::new(s, e)
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports in the range. Never zero.
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl IntoIterator for PortRange {
    type Item = u16;
    type IntoIter = RangeInclusive<u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Parse a single TCP port (1..=65535).
pub fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s
        .parse::<u32>()
        .with_context(|| format!("not a port number: {s:?}"))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
