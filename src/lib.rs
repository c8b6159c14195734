//! # datatable
//!
//! Request-driven list endpoints for Sea-ORM and Axum. A [`DataTable`] wraps a
//! base `Select<E>` and applies, from the request's query parameters:
//!
//! - **Search**: `?search=alice` matches any searchable column, case-insensitively.
//! - **Filters**: declared per column with a [`FilterKind`] (`exact`, `like`,
//!   `date`, `date_range`, `in`, `boolean`, `relationship`).
//! - **Sorting**: `?col=name&order=desc`, restricted to sortable columns.
//! - **Pagination**: `?page=2&limit=25`, clamped to the endpoint's maximum.
//!
//! The page is returned as [`Paginated`] or, ready to serialize, as a
//! [`DataTableResponse`] with `items` and `meta` (totals, page URLs, links).
//!
//! ```rust,ignore
//! use axum::{Json, extract::State};
//! use datatable::{ApiError, DataTable, DataTableRequest, DataTableResponse};
//!
//! async fn list_users(
//!     State(db): State<DatabaseConnection>,
//!     request: DataTableRequest,
//! ) -> Result<Json<DataTableResponse>, ApiError> {
//!     let response = DataTable::make(user::Entity::find())
//!         .relation("company", user::Relation::Company)
//!         .searchable(["name", "email", "company.name"])
//!         .sortable(["name", "created_at", "company.name"])
//!         .filterable([
//!             ("is_active", "boolean"),
//!             ("role", "in"),
//!             ("created_at", "date_range"),
//!         ])
//!         .with(["company"])
//!         .get_response(&db, &request)
//!         .await?;
//!     Ok(Json(response))
//! }
//! ```
//!
//! Unknown keys, non-whitelisted sort columns and malformed filter values are
//! ignored rather than rejected; only storage failures surface as errors.

pub mod config;
pub mod datatable;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod pagination;

pub use config::{DataTableConfig, ParamNames};
pub use datatable::{DataTable, FilterCallback};
pub use errors::ApiError;
pub use filtering::{
    CaseInsensitiveMatch, FilterKind, FilterPredicate, LowerLike, NativeIlike, NativeLike,
    RelationMeta,
};
pub use models::{DataTableParams, DataTableRequest};
pub use pagination::{DataTableResponse, PageLink, Paginated, PaginationMeta, to_array};
