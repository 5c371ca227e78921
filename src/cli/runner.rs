//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs, OutputFormat};
use crate::config::{load_config, ClientConfig};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpTransport, Transport};
use crate::parser::{Parser, Resource, TypeRegistry};
use crate::request::{RequestTemplate, SortField};
use crate::service::PaginatedService;
use crate::store::{CacheSweeper, Database};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

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
            Commands::Fetch(args) => {
                let records = self.fetch(args).await?;
                for record in &records {
                    self.output(record);
                }
                Ok(())
            }
            Commands::Sweep { ttl_secs } => self.sweep(*ttl_secs).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load the client configuration from `--config`, or build one from
    /// `--base-url`
    pub(crate) fn load_config(&self) -> Result<ClientConfig> {
        let config = match (&self.cli.config, &self.cli.base_url) {
            (Some(path), base_url) => {
                let mut config = load_config(path)?;
                if let Some(base_url) = base_url {
                    config.base_url.clone_from(base_url);
                }
                config
            }
            (None, Some(base_url)) => ClientConfig::new(base_url.as_str()),
            (None, None) => {
                return Err(Error::config(
                    "No configuration given (use --config or --base-url)",
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Open the record store snapshot, or an in-memory store
    async fn open_store(&self, config: Option<&ClientConfig>) -> Result<Database<Resource>> {
        let database = match &self.cli.store {
            Some(path) => Database::load_from_file(path)
                .await
                .with_context(|| format!("Failed to open store '{}'", path.display()))?,
            None => Database::new(),
        };
        if let Some(config) = config {
            for kind in &config.cache.cacheable {
                database.register_cacheable(kind)?;
            }
        }
        Ok(database)
    }

    async fn save_store(&self, database: &Database<Resource>) -> Result<()> {
        if let Some(path) = &self.cli.store {
            database
                .save_to_file(path)
                .await
                .with_context(|| format!("Failed to save store '{}'", path.display()))?;
        }
        Ok(())
    }

    /// Fetch up to `args.pages` pages and return their primary records
    pub async fn fetch(&self, args: &FetchArgs) -> Result<Vec<Resource>> {
        let config = self.load_config()?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.build_client()?));
        let database = self.open_store(Some(&config)).await?;
        let parser = Parser::new(TypeRegistry::passthrough(args.kinds.clone()), database.clone());
        let template = build_template(args, config.pagination.default_limit);
        let _sweeper = config
            .sweep_interval()
            .map(|interval| CacheSweeper::spawn(database.clone(), config.cache_ttl(), interval));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = PaginatedService::new(template, transport, parser, move |result, _| {
            let _ = tx.send(result);
        });

        let mut records = Vec::new();
        let mut fetched = 0;
        service.start();
        while let Some(result) = rx.recv().await {
            match result {
                Ok(page) => {
                    fetched += 1;
                    info!(
                        "Page {}: {} record(s), {} dropped",
                        fetched,
                        page.primary().len(),
                        page.dropped
                    );
                    records.extend_from_slice(page.primary());
                    if fetched >= args.pages || page.links.next.is_none() {
                        break;
                    }
                    service.next();
                }
                Err(e) if e.is_pagination() => break,
                Err(e) => return Err(e),
            }
        }

        self.save_store(&database).await?;
        Ok(records)
    }

    /// Sweep the store snapshot
    async fn sweep(&self, ttl_secs: Option<u64>) -> Result<()> {
        if self.cli.store.is_none() {
            return Err(Error::config("sweep requires --store"));
        }
        let config = match (&self.cli.config, &self.cli.base_url) {
            (None, None) => None,
            _ => Some(self.load_config()?),
        };
        let ttl = match (ttl_secs, &config) {
            (Some(secs), _) => Duration::from_secs(secs),
            (None, Some(config)) => config.cache_ttl(),
            (None, None) => return Err(Error::config("sweep requires --ttl-secs or --config")),
        };

        let database = self.open_store(config.as_ref()).await?;
        let report = database.sweep(ttl)?;
        self.save_store(&database).await?;

        self.output(&report);
        Ok(())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        info!("Configuration for {} is valid", config.base_url);
        self.output(&json!({
            "valid": true,
            "base_url": config.base_url,
            "auth": !config.auth.is_none(),
            "cacheable": config.cache.cacheable,
        }));
        Ok(())
    }

    /// Output one value
    fn output<T: Serialize>(&self, value: &T) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

/// Build the request template for `fetch`
pub fn build_template(args: &FetchArgs, default_limit: u32) -> RequestTemplate {
    let mut builder = RequestTemplate::builder(&args.path)
        .includes(&args.include)
        .page(args.offset, args.limit.unwrap_or(default_limit))
        .needs_auth(args.auth);

    for (key, value) in &args.filter {
        builder = builder.filter(key, value);
    }
    for field in &args.sort {
        builder = builder.sort(SortField::parse(field));
    }

    builder.build()
}
