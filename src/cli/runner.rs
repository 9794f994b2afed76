//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::MagentoClient;
use crate::pagination::ListOptions;
use crate::query::{Filter, SearchQuery, SortOrder};
use crate::types::{JsonValue, Query};
use futures::TryStreamExt;
use std::io::Write;
use std::time::Instant;
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

    /// Run the CLI command, writing documents to stdout
    pub async fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out).await
    }

    /// Run the CLI command, writing documents to `out`
    pub async fn run_with_output<W: Write>(&self, out: &mut W) -> Result<()> {
        let client = MagentoClient::new(self.client_config()?)?;

        match &self.cli.command {
            Commands::Get { path, params } => {
                let query = (!params.is_empty()).then(|| params.iter().cloned().collect::<Query>());
                let document: JsonValue = client.get_json(path, query).await?;
                self.output(out, &document)
            }
            Commands::List {
                path,
                filters,
                sort_orders,
                limit,
                retry,
            } => {
                self.list(&client, out, path, filters, sort_orders, *limit, *retry)
                    .await
            }
            Commands::Product { sku } => {
                let product = client
                    .get_product(sku)
                    .await?
                    .ok_or_else(|| Error::Other(format!("Product '{sku}' not found")))?;
                self.output(out, &product)
            }
            Commands::Order { increment_id } => {
                let order = client
                    .get_order_by_increment_id(increment_id)
                    .await?
                    .ok_or_else(|| Error::Other(format!("Order '{increment_id}' not found")))?;
                self.output(out, &order)
            }
            Commands::BulkStatus { bulk_uuid } => {
                let status = client.get_bulk_status(bulk_uuid).await?;
                self.output(out, &status)
            }
        }
    }

    /// Resolve the client configuration.
    ///
    /// The config file is read first; flags and `MAGENTO_*` variables
    /// override its values.
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::load_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(token) = &self.cli.token {
            config.token.clone_from(token);
        }
        if let Some(scope) = &self.cli.scope {
            config.scope.clone_from(scope);
        }
        if let Some(page_size) = self.cli.page_size {
            config.page_size = page_size;
        }
        if self.cli.read_only {
            config.read_only = true;
        }

        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::too_many_arguments)]
    async fn list<W: Write>(
        &self,
        client: &MagentoClient,
        out: &mut W,
        path: &str,
        filters: &[Filter],
        sort_orders: &[SortOrder],
        limit: Option<usize>,
        retry: u32,
    ) -> Result<()> {
        let mut search = SearchQuery::new();
        for filter in filters {
            search = search.filter(filter.clone());
        }
        for order in sort_orders {
            search = search.sort_order(order.clone());
        }

        let options = ListOptions {
            query: Some(search.build()),
            limit,
            retry,
        };

        let start = Instant::now();
        let mut count = 0usize;
        let mut stream = client.paginate(path, options);
        while let Some(entity) = stream.try_next().await? {
            self.output(out, &entity)?;
            count += 1;
        }

        info!(
            path,
            items = count,
            "Listed in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Write one document
    fn output<W: Write>(&self, out: &mut W, document: &JsonValue) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(document)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(document)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}
