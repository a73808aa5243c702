use std::time::Duration;

/// Dial timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// Banner read deadline used when none is configured.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);
/// Longest banner line accepted, in bytes, excluding the delimiter.
pub const DEFAULT_BANNER_LINE_LIMIT: usize = 1024;

/// Tunables for a scan. Shared read-only by every probe task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound on a single TCP connect.
    pub connect_timeout: Duration,
    /// Deadline for reading the banner line, independent of the dial timeout.
    pub read_timeout: Duration,
    pub banner_line_limit: usize,
    /// Max probe tasks in flight. `None` spawns one task per port with no ceiling.
    pub concurrency: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            banner_line_limit: DEFAULT_BANNER_LINE_LIMIT,
            concurrency: None,
        }
    }
}

impl ScanConfig {
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Gate dispatch behind a semaphore of `limit` permits. Clamped to at least 1.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit.max(1));
        self
    }
}
