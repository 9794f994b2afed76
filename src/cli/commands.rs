//! CLI commands and argument parsing

use crate::query::{Filter, SortDirection, SortOrder};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Condition types accepted by Magento search criteria
const CONDITION_TYPES: &[&str] = &[
    "eq", "finset", "from", "gt", "gteq", "in", "like", "lt", "lteq", "moreq", "neq", "nfinset",
    "nin", "notnull", "null", "to",
];

/// Magento REST API client
#[derive(Parser, Debug)]
#[command(name = "magento")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the Magento instance
    #[arg(long, global = true, env = "MAGENTO_BASE_URL")]
    pub base_url: Option<String>,

    /// Integration access token
    #[arg(long, global = true, env = "MAGENTO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Store scope (`all`, a store view code, ...)
    #[arg(long, global = true, env = "MAGENTO_SCOPE")]
    pub scope: Option<String>,

    /// Items per page for listings
    #[arg(long, global = true, env = "MAGENTO_PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Refuse to send write requests
    #[arg(long, global = true)]
    pub read_only: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET an API path (e.g. /V1/store/storeConfigs)
    Get {
        /// API path, starting with /V1/
        path: String,

        /// Query parameter (key=value), repeatable
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// List a paginated search endpoint (e.g. /V1/orders)
    List {
        /// API path, starting with /V1/
        path: String,

        /// Filter (field=value or field=value:condition), repeatable; filters are AND-ed
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<Filter>,

        /// Sort order (field or field:asc|desc), repeatable
        #[arg(long = "sort", value_parser = parse_sort_order)]
        sort_orders: Vec<SortOrder>,

        /// Maximum number of items
        #[arg(long)]
        limit: Option<usize>,

        /// Retries per page request
        #[arg(long, default_value = "0")]
        retry: u32,
    },

    /// Show a product by SKU
    Product {
        sku: String,
    },

    /// Show an order by increment id
    Order {
        increment_id: String,
    },

    /// Show the status of an async bulk operation
    BulkStatus {
        bulk_uuid: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}

/// Parse `key=value`
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{arg}'")),
    }
}

/// Parse `field=value` or `field=value:condition`.
///
/// The suffix is only taken as a condition when it is a known condition
/// type, so values may contain colons.
pub fn parse_filter(arg: &str) -> Result<Filter, String> {
    let (field, value) = parse_key_value(arg)?;
    match value.rsplit_once(':') {
        Some((value, condition)) if CONDITION_TYPES.contains(&condition) => {
            Ok(Filter::new(field, value).condition(condition))
        }
        _ => Ok(Filter::new(field, value)),
    }
}

/// Parse `field` or `field:asc|desc`
pub fn parse_sort_order(arg: &str) -> Result<SortOrder, String> {
    let (field, direction) = match arg.split_once(':') {
        Some((field, direction)) => {
            let direction = match direction.to_ascii_lowercase().as_str() {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                other => return Err(format!("unknown sort direction '{other}'")),
            };
            (field, direction)
        }
        None => (arg, SortDirection::Asc),
    };
    if field.is_empty() {
        return Err(format!("missing sort field in '{arg}'"));
    }
    Ok(SortOrder::new(field, direction.as_str()))
}
