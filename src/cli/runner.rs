//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, StateAction};
use crate::config::{default_configuration, ConfigModel, RawConfiguration};
use crate::engine::{JsonLinesSink, SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::extract::ExtractPolicy;
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::state::{FileStateStore, MemoryStateStore, StateStore};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Validate => self.validate(),
            Commands::Check => self.check().await,
            Commands::Read {
                max_pages,
                skip_malformed,
                rate_limit,
            } => self.read(*max_pages, *skip_malformed, *rate_limit).await,
            Commands::State { action } => self.state(*action).await,
        }
    }

    /// Load and validate the configuration file
    pub(crate) fn load_config(&self) -> Result<ConfigModel> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Configuration file not specified (use -C flag)"))?;
        let raw = RawConfiguration::from_file(path)?;
        ConfigModel::validate(&raw)
    }

    /// File store when `--state` is given, otherwise a store that lives for
    /// this process only
    pub(crate) fn state_store(&self) -> Arc<dyn StateStore> {
        match &self.cli.state {
            Some(path) => Arc::new(FileStateStore::new(path)),
            None => Arc::new(MemoryStateStore::new()),
        }
    }

    fn build_engine(&self, config: ConfigModel, rate_limit: Option<u32>) -> Result<SyncEngine> {
        let mut http_config = HttpClientConfig::default();
        if let Some(rps) = rate_limit {
            http_config = http_config.rate_limit(RateLimiterConfig::per_second(rps));
        }
        let client = HttpClient::with_config(http_config)?;
        Ok(SyncEngine::new(config, Arc::new(client), self.state_store()))
    }

    /// Print the default field table
    fn spec(&self) -> Result<()> {
        output_json(&default_configuration())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;

        output_json(&json!({
            "status": "valid",
            "endpoint": config.endpoint.as_str(),
            "http_method": config.http_method.as_str(),
            "authentication_method": config.auth.method().as_str(),
            "pagination_model": config.pagination_model().as_str(),
            "paths": config
                .object_id_map
                .iter()
                .map(|(path, _)| path.to_string())
                .collect::<Vec<_>>(),
        }))
    }

    /// Fetch the first page and report the outcome
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        info!(endpoint = %config.endpoint, "Checking connection");
        let engine = self.build_engine(config, None)?;

        match engine.check().await {
            Ok(()) => output_json(&json!({
                "status": "succeeded",
                "message": "Connection successful",
            })),
            Err(e) => {
                output_json(&json!({
                    "status": "failed",
                    "message": e.to_string(),
                }))?;
                Err(e)
            }
        }
    }

    /// Run a sync, records to stdout and the report to stderr
    async fn read(
        &self,
        max_pages: Option<usize>,
        skip_malformed: bool,
        rate_limit: Option<u32>,
    ) -> Result<()> {
        let config = self.load_config()?;

        let mut sync_config = SyncConfig::new();
        if let Some(max) = max_pages {
            sync_config = sync_config.with_max_pages(max);
        }
        if skip_malformed {
            sync_config = sync_config.with_policy(ExtractPolicy::SkipMalformed);
        }

        let mut engine = self
            .build_engine(config, rate_limit)?
            .with_config(sync_config);

        let token = engine.cancellation_token();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping at the next page boundary");
                token.cancel();
            }
        });

        let mut sink = JsonLinesSink::new(tokio::io::stdout());
        let result = engine.run(&mut sink).await;
        interrupt.abort();

        let report = result?;
        info!(
            status = ?report.status,
            pages = report.stats.pages_fetched,
            records = report.stats.records_emitted,
            "Sync finished"
        );
        eprintln!("{}", serde_json::to_string(&report)?);
        Ok(())
    }

    /// Show or clear the stored state
    async fn state(&self, action: StateAction) -> Result<()> {
        let path = self
            .cli
            .state
            .as_ref()
            .ok_or_else(|| Error::config("State file not specified (use -s flag)"))?;
        let store = FileStateStore::new(path);

        match action {
            StateAction::Show => match store.load().await? {
                Some(state) => output_json(&state),
                None => output_json(&json!({ "last_cursor": null })),
            },
            StateAction::Reset => {
                store.reset().await?;
                info!(path = %path.display(), "State reset");
                output_json(&json!({ "status": "reset" }))
            }
        }
    }
}

fn output_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
