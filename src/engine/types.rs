//! Engine types
//!
//! Phases, run configuration, statistics and the final report.

use crate::extract::ExtractPolicy;
use crate::http::RetryPolicy;
use serde::Serialize;
use std::fmt;

/// Where the pagination state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Loading the stored cursor
    Start,
    /// Sending a page request, retrying transient failures
    Fetching,
    /// Extracting records and handing them to the sink
    Extracting,
    /// Reading `pageInfo` and committing the cursor
    Advancing,
    /// Finished successfully
    Done,
    /// Finished with an unrecoverable error
    Failed,
}

impl SyncPhase {
    /// Check if the phase is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Advancing => "advancing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Configuration for sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Stop after this many pages (`None` = until exhausted)
    pub max_pages: Option<usize>,
    /// Handling of elements without a usable id
    pub policy: ExtractPolicy,
    /// Retry policy for transport failures
    pub retry: RetryPolicy,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of pages
    #[must_use]
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    /// Set the extraction policy
    #[must_use]
    pub fn with_policy(mut self, policy: ExtractPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Pages fetched successfully
    pub pages_fetched: usize,
    /// Records handed to the sink
    pub records_emitted: usize,
    /// HTTP attempts, retries included
    pub request_attempts: usize,
    /// Attempts that were retried
    pub retries: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_emitted += count;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// How a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Pagination exhausted, or the page cap reached
    Completed,
    /// Stopped by the cancellation token
    Cancelled,
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// How the run ended
    pub status: SyncStatus,
    /// Last committed cursor
    pub last_cursor: Option<String>,
    /// Run statistics
    pub stats: SyncStats,
}

impl SyncReport {
    /// Check if the run completed
    pub fn is_completed(&self) -> bool {
        self.status == SyncStatus::Completed
    }
}
