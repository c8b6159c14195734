use axum::{
    extract::{FromRequestParts, OriginalUri, Query},
    http::{Uri, request::Parts},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::config::ParamNames;
use crate::errors::ApiError;

/// The request descriptor consumed by [`DataTable::get`](crate::DataTable::get).
///
/// Holds the request path (used as the base of pagination links) and the
/// decoded query pairs in the order they arrived. When a key appears more than
/// once, the last value wins.
///
/// In an Axum handler it can be taken directly as an extractor:
///
/// ```rust,ignore
/// async fn list_users(
///     State(db): State<DatabaseConnection>,
///     request: DataTableRequest,
/// ) -> Result<Json<DataTableResponse>, ApiError> {
///     let response = DataTable::make(user::Entity::find())
///         .searchable(["name", "email"])
///         .sortable(["name", "created_at"])
///         .get_response(&db, &request)
///         .await?;
///     Ok(Json(response))
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTableRequest {
    path: String,
    params: Vec<(String, String)>,
}

impl DataTableRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn from_pairs<K, V>(path: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: path.into(),
            params: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Decode the path and query string of a request URI.
    pub fn from_uri(uri: &Uri) -> Result<Self, ApiError> {
        let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map_err(|err| ApiError::bad_request(format!("Invalid query string: {err}")))?;
        Ok(Self {
            path: uri.path().to_string(),
            params,
        })
    }

    /// Append a query pair.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Replace the link base, e.g. with an absolute URL.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value of `key`; the last occurrence wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `key` if it is present and not empty.
    #[must_use]
    pub fn filled(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// First non-empty value among `keys`, in the order given.
    #[must_use]
    pub fn first_filled<'a>(&'a self, keys: &[String]) -> Option<&'a str> {
        keys.iter().find_map(|key| self.filled(key))
    }

    /// Every pair except the ones named in `exclude`, one entry per key.
    ///
    /// Keys keep their first-seen position and carry their last value.
    pub fn except<'a>(&'a self, exclude: impl Fn(&str) -> bool) -> Vec<(&'a str, &'a str)> {
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        for (key, value) in &self.params {
            if exclude(key) {
                continue;
            }
            match pairs.iter_mut().find(|(seen, _)| *seen == key.as_str()) {
                Some(existing) => existing.1 = value.as_str(),
                None => pairs.push((key.as_str(), value.as_str())),
            }
        }
        pairs
    }

    /// Pairs that are candidates for declarative filtering.
    #[must_use]
    pub fn filter_candidates(&self, names: &ParamNames) -> Vec<(&str, &str)> {
        self.except(|key| names.is_reserved(key))
    }

    /// Pairs carried over into pagination links (everything but the page).
    #[must_use]
    pub fn preserved_query(&self, names: &ParamNames) -> Vec<(String, String)> {
        self.except(|key| key == names.page)
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}

impl<S> FromRequestParts<S> for DataTableRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `parts.uri`; links need the full path.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        Self::from_uri(uri)
    }
}

/// Reserved query parameters understood by a data table endpoint.
///
/// This struct only documents the parameters for OpenAPI; handlers read them
/// through [`DataTableRequest`]. Any other query key is matched against the
/// endpoint's filterable columns, e.g. `?is_active=1&created_at=2024-01-01,2024-01-31`.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct DataTableParams {
    /// Free-text search across the endpoint's searchable columns.
    #[param(example = "alice")]
    pub search: Option<String>,
    /// 1-based page number.
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page, clamped to the endpoint's maximum.
    #[param(example = 10)]
    pub limit: Option<u64>,
    /// Alias of `limit`.
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// Column to sort by; must be sortable.
    #[param(example = "name")]
    pub col: Option<String>,
    /// Alias of `col`.
    #[param(example = "name")]
    pub sort_by: Option<String>,
    /// Sort direction, `asc` (default) or `desc`.
    #[param(example = "desc")]
    pub order: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_value_wins() {
        let request = DataTableRequest::new("/users")
            .with_param("role", "admin")
            .with_param("role", "editor");
        assert_eq!(request.get("role"), Some("editor"));
        assert_eq!(request.filter_candidates(&ParamNames::default()), vec![("role", "editor")]);
    }

    #[test]
    fn test_filled_ignores_empty_values() {
        let request = DataTableRequest::new("/users").with_param("search", "");
        assert_eq!(request.get("search"), Some(""));
        assert_eq!(request.filled("search"), None);
    }

    #[test]
    fn test_first_filled_respects_key_order() {
        let request = DataTableRequest::new("/users")
            .with_param("per_page", "25")
            .with_param("limit", "5");
        let keys = vec!["limit".to_string(), "per_page".to_string()];
        assert_eq!(request.first_filled(&keys), Some("5"));
    }

    #[test]
    fn test_filter_candidates_skip_reserved_keys() {
        let request = DataTableRequest::from_pairs(
            "/users",
            [
                ("search", "al"),
                ("page", "2"),
                ("limit", "5"),
                ("col", "name"),
                ("order", "desc"),
                ("is_active", "1"),
                ("posts.title", "hello"),
            ],
        );
        assert_eq!(
            request.filter_candidates(&ParamNames::default()),
            vec![("is_active", "1"), ("posts.title", "hello")]
        );
    }

    #[test]
    fn test_preserved_query_drops_only_page() {
        let request = DataTableRequest::from_pairs(
            "/users",
            [("search", "al"), ("page", "3"), ("limit", "5")],
        );
        assert_eq!(
            request.preserved_query(&ParamNames::default()),
            vec![
                ("search".to_string(), "al".to_string()),
                ("limit".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn test_from_uri_decodes_query() {
        let uri: Uri = "/admin/users?search=al%20b&created_at=2024-01-01%2C2024-01-31&page=2"
            .parse()
            .unwrap();
        let request = DataTableRequest::from_uri(&uri).unwrap();
        assert_eq!(request.path(), "/admin/users");
        assert_eq!(request.get("search"), Some("al b"));
        assert_eq!(request.get("created_at"), Some("2024-01-01,2024-01-31"));
        assert_eq!(request.get("page"), Some("2"));
    }

    #[test]
    fn test_from_uri_without_query() {
        let uri: Uri = "/admin/users".parse().unwrap();
        let request = DataTableRequest::from_uri(&uri).unwrap();
        assert!(request.params().is_empty());
    }

    #[test]
    fn test_openapi_params_cover_reserved_keys() {
        let names: Vec<String> = DataTableParams::into_params(|| None)
            .into_iter()
            .map(|param| param.name)
            .collect();
        assert_eq!(
            names,
            vec!["search", "page", "limit", "per_page", "col", "sort_by", "order"]
        );
    }
}
