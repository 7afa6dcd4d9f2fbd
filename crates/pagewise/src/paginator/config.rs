//! Serializable paginator configuration.
//!
//! [`PaginatorConfig`] holds the plain-data part of [`PaginatorOptions`] so
//! it can be loaded from files, environment variables or command-line
//! arguments. Hooks and cancellation are attached afterwards on the builder.

#[cfg(feature = "config")]
use clap::Args;
use pagewise_core::Filters;
use serde::{Deserialize, Serialize};

use super::options::{DEFAULT_PAGE_SIZE, DEFAULT_TOKEN_HISTORY};
use super::{PaginatorOptions, PaginatorOptionsBuilder};
use crate::{PageError, PageResult, TRACING_TARGET_PAGINATOR};

/// Paginator settings that can be deserialized or parsed from the CLI.
///
/// ## Example
///
/// ```rust
/// use pagewise::PaginatorConfig;
///
/// let config: PaginatorConfig = serde_json::from_str(r#"{"page_size": 20}"#)?;
/// let options = config.into_options()?;
/// assert_eq!(options.page_size, 20);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "configurations must be turned into paginator options"]
pub struct PaginatorConfig {
    /// Rows per page (0 selects the default of 100)
    #[cfg_attr(
        feature = "config",
        arg(long = "page-size", env = "PAGEWISE_PAGE_SIZE", default_value = "100")
    )]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Comma-separated columns replacing the `*` projection
    #[cfg_attr(
        feature = "config",
        arg(long = "columns", env = "PAGEWISE_COLUMNS", value_delimiter = ',')
    )]
    #[serde(default)]
    pub columns: Vec<String>,

    /// Number of issued tokens kept for history-based navigation
    #[cfg_attr(
        feature = "config",
        arg(
            long = "history-capacity",
            env = "PAGEWISE_HISTORY_CAPACITY",
            default_value = "10"
        )
    )]
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Filters appended to the query
    #[cfg_attr(feature = "config", arg(skip))]
    #[serde(default, skip_serializing_if = "Filters::is_empty")]
    pub filters: Filters,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_history_capacity() -> usize {
    DEFAULT_TOKEN_HISTORY
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            columns: Vec::new(),
            history_capacity: DEFAULT_TOKEN_HISTORY,
            filters: Filters::default(),
        }
    }
}

impl PaginatorConfig {
    /// Sets the filters.
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Checks the configuration for values the paginator cannot use.
    pub fn validate(&self) -> PageResult<()> {
        if self.history_capacity == 0 {
            return Err(PageError::Config(
                "history capacity must be greater than 0".to_string(),
            ));
        }

        if self.columns.iter().any(|column| column.trim().is_empty()) {
            return Err(PageError::Config(
                "column names cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns an options builder preloaded with this configuration.
    ///
    /// Hooks and cancellation can be added before building.
    pub fn into_builder(self) -> PaginatorOptionsBuilder {
        let columns = self
            .columns
            .into_iter()
            .map(|column| column.trim().to_string())
            .collect::<Vec<_>>();

        PaginatorOptions::builder()
            .with_page_size(self.page_size)
            .with_columns(columns)
            .with_history_capacity(self.history_capacity)
            .with_filters(self.filters)
    }

    /// Validates the configuration and builds paginator options.
    pub fn into_options(self) -> PageResult<PaginatorOptions> {
        self.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            page_size = self.page_size,
            columns = self.columns.len(),
            filters = self.filters.len(),
            history_capacity = self.history_capacity,
            "Loaded paginator configuration"
        );

        self.into_builder().build()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: PaginatorConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, PaginatorConfig::default());
    }

    #[test]
    fn filters_deserialize_into_descriptors() {
        let config: PaginatorConfig = serde_json::from_value(json!({
            "columns": ["user_id", "name"],
            "filters": {"age >": 25, "region IN": ["us", "eu"]},
        }))
        .unwrap();

        assert_eq!(config.filters.len(), 2);
        let options = config.into_options().unwrap();
        assert_eq!(options.columns, vec!["user_id", "name"]);
        assert_eq!(options.effective_page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn zero_history_is_rejected() {
        let config = PaginatorConfig {
            history_capacity: 0,
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(PageError::Config(_))));
        assert!(config.into_options().is_err());
    }

    #[test]
    fn empty_filters_are_not_serialized() {
        let value = serde_json::to_value(PaginatorConfig::default()).unwrap();
        assert_eq!(
            value,
            json!({"page_size": 100, "columns": [], "history_capacity": 10})
        );
    }
}
