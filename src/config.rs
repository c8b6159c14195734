//! Page-size bounds and reserved request keys.
//!
//! Both structs deserialize with per-field defaults so an application can embed
//! them in its own configuration file and only override what it needs:
//!
//! ```rust
//! use datatable::DataTableConfig;
//!
//! let config: DataTableConfig = serde_json::from_str(r#"{"max_per_page": 50}"#).unwrap();
//! assert_eq!(config.default_per_page, 10);
//! assert_eq!(config.max_per_page, 50);
//! assert_eq!(config.params.search, "search");
//! ```

use serde::Deserialize;

/// Page size used when the request does not ask for one.
pub const DEFAULT_PER_PAGE: u64 = 10;
/// Upper bound applied to any requested page size.
pub const MAX_PER_PAGE: u64 = 100;

/// Adapter-wide settings that are usually shared by every list endpoint of an app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataTableConfig {
    pub default_per_page: u64,
    pub max_per_page: u64,
    pub params: ParamNames,
}

impl Default for DataTableConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            params: ParamNames::default(),
        }
    }
}

/// Names of the request keys that drive search, paging and sorting.
///
/// Every other request key is treated as a filter candidate. When several
/// names are listed for one role the first one present in the request wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParamNames {
    /// Free-text search term.
    pub search: String,
    /// 1-based page number. Also the only key dropped from pagination links.
    pub page: String,
    /// Requested page size.
    pub limit: Vec<String>,
    /// Column to sort by.
    pub sort_column: Vec<String>,
    /// `asc` or `desc`.
    pub sort_direction: String,
}

impl Default for ParamNames {
    fn default() -> Self {
        Self {
            search: "search".to_string(),
            page: "page".to_string(),
            limit: vec!["limit".to_string(), "per_page".to_string()],
            sort_column: vec!["col".to_string(), "sort_by".to_string()],
            sort_direction: "order".to_string(),
        }
    }
}

impl ParamNames {
    /// Whether `key` is one of the reserved keys and therefore never a filter.
    #[must_use]
    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.search
            || key == self.page
            || key == self.sort_direction
            || self.limit.iter().any(|name| name == key)
            || self.sort_column.iter().any(|name| name == key)
    }
}
