use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::ports::parse_port_str;

/// Read-only table from well-known port number to service name.
///
/// Built once at startup and shared by reference (`Arc`) with every probe task.
/// There is no way to mutate it after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDirectory {
    entries: HashMap<u16, String>,
}

impl ServiceDirectory {
    /// Parse a JSON object mapping string port numbers to service names:
    ///
    /// ```json
    /// { "22": "SSH", "80": "HTTP" }
    /// ```
    ///
    /// Keys must be valid ports (1..=65535). Anything else is a malformed directory.
    pub fn parse_json_str(s: &str) -> Result<Self> {
        let raw: HashMap<String, String> =
            serde_json::from_str(s).context("service directory is not a JSON object of strings")?;
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, name) in raw {
            let port = parse_port_str(key.trim())
                .with_context(|| format!("invalid port key in service directory: {key:?}"))?;
            entries.insert(port, name);
        }
        Ok(Self { entries })
    }

    /// Load the directory from a JSON file. Missing or malformed files are errors.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read service directory: {}", path.display()))?;
        Self::parse_json_str(&content)
            .with_context(|| format!("failed to parse service directory: {}", path.display()))
    }

    /// Exact port-number match.
    pub fn lookup(&self, port: u16) -> Option<&str> {
        self.entries.get(&port).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u16, String)> for ServiceDirectory {
    fn from_iter<I: IntoIterator<Item = (u16, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
