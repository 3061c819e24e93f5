//! Execution engine module
//!
//! Drives one sync: fetch a page, extract its records, hand them to the sink,
//! commit the cursor, repeat until pagination is exhausted.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - the pagination state machine
//! - `SyncConfig` - page cap, extraction policy and retry policy
//! - `RecordSink` - where each page's records go
//! - `SyncReport` - outcome and statistics of a run
//!
//! Pages are strictly sequential. The cursor is committed to the
//! [`StateStore`] only after the sink accepted the page, so a run that fails
//! or is cancelled resumes from the last fully delivered page.

mod sink;
mod types;

pub use sink::{JsonLinesSink, RecordSink, VecSink};
pub use types::{SyncConfig, SyncPhase, SyncReport, SyncStats, SyncStatus};

use crate::config::ConfigModel;
use crate::error::{Error, Result};
use crate::extract::{PageExtraction, RecordExtractor};
use crate::http::{check_graphql_errors, data_root, Transport};
use crate::pagination::{paginator_for, PaginationState, Paginator};
use crate::request;
use crate::state::StateStore;
use crate::types::JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Sync engine for one configured connector instance
pub struct SyncEngine {
    config: ConfigModel,
    transport: Arc<dyn Transport>,
    store: Arc<dyn StateStore>,
    paginator: Box<dyn Paginator>,
    extractor: RecordExtractor,
    sync_config: SyncConfig,
    cancel: CancellationToken,
    phase: SyncPhase,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        config: ConfigModel,
        transport: Arc<dyn Transport>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let paginator = paginator_for(&config.pagination);
        let extractor = RecordExtractor::new(config.object_id_map.clone());
        Self {
            config,
            transport,
            store,
            paginator,
            extractor,
            sync_config: SyncConfig::default(),
            cancel: CancellationToken::new(),
            phase: SyncPhase::Start,
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, sync_config: SyncConfig) -> Self {
        self.extractor = self.extractor.with_policy(sync_config.policy);
        self.sync_config = sync_config;
        self
    }

    /// Use an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this engine's runs
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current phase
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// The validated configuration
    pub fn config(&self) -> &ConfigModel {
        &self.config
    }

    /// Run a sync from the stored cursor until pagination is exhausted, the
    /// page cap is reached or the run is cancelled.
    ///
    /// Fatal errors are returned as [`Error::SyncAborted`] carrying the last
    /// committed cursor.
    pub async fn run(&mut self, sink: &mut dyn RecordSink) -> Result<SyncReport> {
        let started = Instant::now();
        let mut stats = SyncStats::new();

        self.phase = SyncPhase::Start;
        let stored = match self.store.load().await {
            Ok(stored) => stored.and_then(|s| s.last_cursor),
            Err(e) => return Err(self.fail(e, None)),
        };
        let mut state = PaginationState::starting_at(stored);
        info!(
            endpoint = %self.config.endpoint,
            pagination = %self.paginator.model(),
            cursor = ?state.cursor,
            "Starting sync"
        );

        let status = loop {
            if self.cancel.is_cancelled() {
                break SyncStatus::Cancelled;
            }
            if let Some(max) = self.sync_config.max_pages {
                if stats.pages_fetched >= max {
                    info!(max_pages = max, "Page cap reached");
                    break SyncStatus::Completed;
                }
            }

            match self.step(&mut state, &mut stats, sink).await {
                Ok(Some(())) => {}
                Ok(None) => break SyncStatus::Cancelled,
                Err(e) => return Err(self.fail(e, state.cursor.clone())),
            }

            if !state.has_more {
                break SyncStatus::Completed;
            }
        };

        stats.set_duration(started.elapsed().as_millis() as u64);
        self.phase = SyncPhase::Done;

        info!(
            status = ?status,
            pages = stats.pages_fetched,
            records = stats.records_emitted,
            cursor = ?state.cursor,
            "Sync finished"
        );

        Ok(SyncReport {
            status,
            last_cursor: state.cursor,
            stats,
        })
    }

    /// One page: fetch, extract, deliver, advance. `Ok(None)` means the run
    /// was cancelled while waiting. `state` only changes once the new cursor
    /// is committed.
    async fn step(
        &mut self,
        state: &mut PaginationState,
        stats: &mut SyncStats,
        sink: &mut dyn RecordSink,
    ) -> Result<Option<()>> {
        self.phase = SyncPhase::Fetching;
        let Some(body) = self.fetch(state, stats).await? else {
            return Ok(None);
        };
        stats.add_page();

        self.phase = SyncPhase::Extracting;
        check_graphql_errors(&body)?;
        let data = data_root(&body);
        let PageExtraction { records, failures } = self.extractor.extract(data);
        let count = records.len();
        debug!(
            page = stats.pages_fetched,
            records = count,
            failed_paths = failures.len(),
            "Extracted page"
        );

        // Paths are independent: deliver what extracted cleanly, then fail the
        // page without committing its cursor.
        sink.accept(records).await?;
        stats.add_records(count);
        if let Some(failure) = failures.into_iter().next() {
            return Err(failure);
        }

        self.phase = SyncPhase::Advancing;
        let mut next = state.clone();
        self.paginator.process_response(data, &mut next)?;
        self.store.save(next.cursor.clone()).await?;
        *state = next;

        Ok(Some(()))
    }

    /// Send the request for the current cursor, retrying transient failures.
    /// Returns `None` when cancelled.
    async fn fetch(
        &self,
        state: &PaginationState,
        stats: &mut SyncStats,
    ) -> Result<Option<JsonValue>> {
        let variables = request::initial_variables(&self.config, self.paginator.request_cursor(state));
        let req = request::build(&self.config, &variables)?;
        let policy = &self.sync_config.retry;

        let mut attempt = 0;
        loop {
            attempt += 1;
            stats.request_attempts += 1;
            debug!(attempt, cursor = ?state.cursor, "Fetching page");

            let outcome = tokio::select! {
                () = self.cancel.cancelled() => return Ok(None),
                outcome = self.transport.send(&req, self.config.connection_timeout) => outcome,
            };

            match outcome {
                Ok(body) => return Ok(Some(body)),
                Err(e) if policy.should_retry(&e, attempt) => {
                    let delay = policy.delay_for(&e, attempt);
                    warn!(
                        error = %e,
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    stats.retries += 1;
                    tokio::select! {
                        () = self.cancel.cancelled() => return Ok(None),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send the first page request and check the response shape without
    /// touching the state store or emitting records.
    pub async fn check(&self) -> Result<()> {
        let mut stats = SyncStats::new();
        let state = PaginationState::default();
        let Some(body) = self.fetch(&state, &mut stats).await? else {
            return Err(Error::Other("check cancelled".to_string()));
        };

        check_graphql_errors(&body)?;
        let data = data_root(&body);
        let mut scratch = state.clone();
        self.paginator.process_response(data, &mut scratch)?;
        let records = self.extractor.extract(data).into_result()?;
        info!(records = records.len(), has_more = scratch.has_more, "Connection check passed");
        Ok(())
    }

    fn fail(&mut self, error: Error, last_cursor: Option<String>) -> Error {
        error!(phase = %self.phase, error = %error, cursor = ?last_cursor, "Sync failed");
        self.phase = SyncPhase::Failed;
        Error::aborted(error, last_cursor)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("endpoint", &self.config.endpoint.as_str())
            .field("pagination", &self.paginator.model())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
