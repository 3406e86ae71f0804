//! Configuration management for sort and pagination operations

use crate::error::{SortError, SortResult};
use crate::page::PageRequest;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// Default dataset size at which the parallel preset switches to a parallel sort
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Sort order enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Map an `ascending` flag to an order
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortOrder::Ascending
    }

    /// Apply this order to the result of an ascending comparison
    #[inline]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(SortError::invalid_sort_directive(&format!(
                "unknown sort direction: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };
        write!(f, "{name}")
    }
}

/// How a text column is turned into a sort key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyMode {
    /// Byte-wise string comparison
    #[default]
    Lexicographic,
    /// Case-folded string comparison
    IgnoreCase,
    /// General numeric comparison (floats, scientific notation, inf)
    Numeric,
}

impl FromStr for KeyMode {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicographic" | "text" | "default" => Ok(KeyMode::Lexicographic),
            "ignore-case" | "f" => Ok(KeyMode::IgnoreCase),
            "numeric" | "n" | "g" => Ok(KeyMode::Numeric),
            _ => Err(SortError::parse_error(&format!("unknown key mode: {s}"))),
        }
    }
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyMode::Lexicographic => "lexicographic",
            KeyMode::IgnoreCase => "ignore-case",
            KeyMode::Numeric => "numeric",
        };
        write!(f, "{name}")
    }
}

/// Tuning for the sort-and-page stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginateConfig {
    /// Datasets at least this large are sorted in parallel; `None` keeps sorting sequential
    pub parallel_threshold: Option<usize>,
    /// Upper bound applied to every page limit
    pub max_page_size: Option<usize>,
    /// Number of worker threads for the parallel sort
    pub parallel_threads: Option<usize>,
}

impl PaginateConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parallel sort threshold
    pub fn with_parallel_threshold(mut self, threshold: Option<usize>) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Set the maximum page size
    pub fn with_max_page_size(mut self, max_page_size: Option<usize>) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Set parallel threads
    pub fn with_parallel_threads(mut self, threads: Option<usize>) -> Self {
        self.parallel_threads = threads;
        self
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> SortResult<()> {
        if self.parallel_threshold == Some(0) {
            return Err(SortError::conflicting_options(
                "parallel threshold must be positive",
            ));
        }

        if self.max_page_size == Some(0) {
            return Err(SortError::invalid_page_request(
                "maximum page size must be positive",
            ));
        }

        if let Some(threads) = self.parallel_threads {
            if threads == 0 {
                return Err(SortError::thread_pool_error(
                    "thread count must be positive",
                ));
            }
            if threads > 1024 {
                return Err(SortError::thread_pool_error(
                    "too many threads (maximum 1024)",
                ));
            }
        }

        Ok(())
    }

    /// Whether a dataset of `len` elements is sorted in parallel
    pub fn sorts_in_parallel(&self, len: usize) -> bool {
        matches!(self.parallel_threshold, Some(threshold) if len >= threshold)
    }

    /// Clamp a page request to the configured maximum page size
    pub fn effective_page(&self, page: PageRequest) -> PageRequest {
        match self.max_page_size {
            Some(max) => page.clamp_limit(max),
            None => page,
        }
    }

    /// Get effective thread count
    pub fn effective_thread_count(&self) -> usize {
        self.parallel_threads.unwrap_or_else(num_cpus::get)
    }
}

/// Builder pattern for creating configurations
pub struct PaginateConfigBuilder {
    config: PaginateConfig,
}

impl PaginateConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self {
            config: PaginateConfig::default(),
        }
    }

    /// Sort in parallel once the dataset reaches `threshold` elements
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = Some(threshold);
        self
    }

    /// Cap every page at `size` elements
    pub fn max_page_size(mut self, size: usize) -> Self {
        self.config.max_page_size = Some(size);
        self
    }

    /// Set parallel threads
    pub fn parallel_threads(mut self, threads: usize) -> Self {
        self.config.parallel_threads = Some(threads);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SortResult<PaginateConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for PaginateConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// How a delimited text table is split and keyed
#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    /// Field separator; `None` splits on runs of whitespace
    pub field_separator: Option<char>,
    /// Key mode for columns without an explicit override
    pub default_mode: KeyMode,
    /// Per-column key mode overrides
    pub column_modes: HashMap<String, KeyMode>,
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set field separator
    pub fn with_field_separator(mut self, separator: Option<char>) -> Self {
        self.field_separator = separator;
        self
    }

    /// Set the default key mode
    pub fn with_default_mode(mut self, mode: KeyMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Override the key mode of one column
    pub fn with_column_mode(mut self, column: impl Into<String>, mode: KeyMode) -> Self {
        self.column_modes.insert(column.into(), mode);
        self
    }

    /// Key mode for the named column
    pub fn mode_for(&self, column: &str) -> KeyMode {
        self.column_modes
            .get(column)
            .copied()
            .unwrap_or(self.default_mode)
    }

    pub fn validate(&self) -> SortResult<()> {
        if let Some(sep) = self.field_separator {
            if sep == '\n' || sep == '\r' {
                return Err(SortError::invalid_field_separator(
                    "line terminators cannot separate fields",
                ));
            }
        }
        Ok(())
    }
}

/// Preset configurations for common use cases
pub mod presets {
    use super::*;

    /// Always sort on the calling thread
    pub fn sequential() -> PaginateConfig {
        PaginateConfig::new()
    }

    /// Sort large datasets on the rayon pool
    pub fn parallel() -> PaginateConfig {
        PaginateConfig::new().with_parallel_threshold(Some(DEFAULT_PARALLEL_THRESHOLD))
    }

    /// Cap pages at `max_page_size` elements
    pub fn bounded(max_page_size: usize) -> PaginateConfig {
        PaginateConfig::new().with_max_page_size(Some(max_page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaginateConfig::default();
        assert_eq!(config.parallel_threshold, None);
        assert_eq!(config.max_page_size, None);
        assert!(!config.sorts_in_parallel(usize::MAX));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PaginateConfigBuilder::new()
            .parallel_threshold(100)
            .max_page_size(50)
            .parallel_threads(4)
            .build()
            .expect("Failed to build test config");

        assert!(config.sorts_in_parallel(100));
        assert!(!config.sorts_in_parallel(99));
        assert_eq!(config.effective_thread_count(), 4);
        assert_eq!(config.max_page_size, Some(50));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(PaginateConfigBuilder::new().parallel_threads(0).build().is_err());
        assert!(PaginateConfigBuilder::new().parallel_threads(2048).build().is_err());
        assert!(PaginateConfigBuilder::new().max_page_size(0).build().is_err());
        assert!(PaginateConfigBuilder::new().parallel_threshold(0).build().is_err());
    }

    #[test]
    fn test_effective_page_clamps_limit() {
        let config = presets::bounded(10);
        let page = config.effective_page(PageRequest::new(30, 500));
        assert_eq!(page.offset(), 30);
        assert_eq!(page.limit(), 10);

        let unbounded = presets::sequential().effective_page(PageRequest::new(30, 500));
        assert_eq!(unbounded.limit(), 500);
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!(
            "ASC".parse::<SortOrder>().expect("Failed to parse asc"),
            SortOrder::Ascending
        );
        assert_eq!(
            "descending"
                .parse::<SortOrder>()
                .expect("Failed to parse descending"),
            SortOrder::Descending
        );
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Descending.to_string(), "desc");
    }

    #[test]
    fn test_sort_order_apply() {
        assert_eq!(SortOrder::Ascending.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortOrder::Descending.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(SortOrder::from_ascending(false), SortOrder::Descending);
    }

    #[test]
    fn test_key_mode_from_str() {
        assert_eq!(
            "numeric".parse::<KeyMode>().expect("Failed to parse numeric"),
            KeyMode::Numeric
        );
        assert_eq!(
            "f".parse::<KeyMode>().expect("Failed to parse f"),
            KeyMode::IgnoreCase
        );
        assert!("random".parse::<KeyMode>().is_err());
    }

    #[test]
    fn test_table_config_modes() {
        let config = TableConfig::new()
            .with_default_mode(KeyMode::IgnoreCase)
            .with_column_mode("age", KeyMode::Numeric);
        assert_eq!(config.mode_for("age"), KeyMode::Numeric);
        assert_eq!(config.mode_for("name"), KeyMode::IgnoreCase);

        let bad = TableConfig::new().with_field_separator(Some('\n'));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_presets() {
        assert!(presets::parallel().sorts_in_parallel(DEFAULT_PARALLEL_THRESHOLD));
        assert!(!presets::sequential().sorts_in_parallel(DEFAULT_PARALLEL_THRESHOLD));
        assert_eq!(presets::bounded(25).max_page_size, Some(25));
    }
}
