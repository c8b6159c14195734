//! # Search, Filtering & Sorting
//!
//! Translates the query parameters of a list request into Sea-ORM conditions
//! and orderings. Every entry point only *adds* to a query; nothing here
//! performs I/O except [`relations::eager_load`].
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Free-text search over every searchable column, OR'd together
//! GET /users?search=alice
//!
//! // Declarative filters, AND'd together
//! GET /users?is_active=yes&role=admin,editor
//! GET /users?created_at=2024-01-01,2024-01-31
//!
//! // Filter or search through a registered relation
//! GET /users?posts.title=Hello
//!
//! // Whitelisted sorting, optionally by a related column
//! GET /users?col=company.name&order=desc
//! ```
//!
//! ## Filter Kinds
//!
//! | Kind | Request value | Predicate |
//! |---|---|---|
//! | `exact` | `admin` | `role = 'admin'` |
//! | `like` | `ali` | case-insensitive `%ali%` |
//! | `date` | `2024-01-20` | `DATE(created_at) = '2024-01-20'` |
//! | `date_range` | `2024-01-01,2024-01-31` | `created_at BETWEEN ... AND ...` |
//! | `in` | `admin, editor` | `role IN ('admin', 'editor')` |
//! | `boolean` | `1`, `true`, `yes`, `on` | `is_active = TRUE`, anything else `FALSE` |
//! | `relationship` | key `posts.title` | `EXISTS (SELECT 1 FROM posts ... AND title = ...)` |
//! | anything else | `x` | `column = 'x'` |
//!
//! Input that cannot be applied (an unknown relation, a range without exactly
//! one comma, an empty value) is skipped and logged at `debug` level.

pub mod conditions;
pub mod kinds;
pub mod matching;
pub mod relations;
pub mod search;
pub mod sort;

pub use conditions::{FilterContext, build_condition, coerce, column_type};
pub use kinds::{FilterKind, FilterPredicate, parse_bool};
pub use matching::{CaseInsensitiveMatch, LowerLike, NativeIlike, NativeLike, for_backend};
pub use relations::{RelationMeta, RelationRegistry, eager_load};
pub use search::build_search_condition;
pub use sort::{SortDirective, apply_sort, parse_order, parse_sort};
