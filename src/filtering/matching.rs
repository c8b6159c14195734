//! Case-insensitive partial matching, one strategy per storage engine.
//!
//! | Backend | Strategy | SQL |
//! |---|---|---|
//! | `PostgreSQL` | [`NativeIlike`] | `col ILIKE '%term%'` |
//! | `SQLite` | [`NativeLike`] | `col LIKE '%term%'` (ASCII case-insensitive) |
//! | `MySQL` and others | [`LowerLike`] | `LOWER(col) LIKE '%term%'` |
//!
//! The term's `%`, `_` and `\` are escaped so user input only ever matches literally.

use std::sync::Arc;

use sea_orm::{
    DatabaseBackend,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr, extension::postgres::PgExpr},
};

const ESCAPE_CHAR: char = '\\';

/// Builds `column contains term` ignoring case.
pub trait CaseInsensitiveMatch: Send + Sync {
    fn contains(&self, column: SimpleExpr, term: &str) -> SimpleExpr;
}

/// `ILIKE`, for engines that have it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeIlike;

/// Plain `LIKE`, for engines whose `LIKE` already ignores case.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLike;

/// `LOWER(column) LIKE lower(term)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerLike;

impl CaseInsensitiveMatch for NativeIlike {
    fn contains(&self, column: SimpleExpr, term: &str) -> SimpleExpr {
        Expr::expr(column).ilike(contains_pattern(term))
    }
}

impl CaseInsensitiveMatch for NativeLike {
    fn contains(&self, column: SimpleExpr, term: &str) -> SimpleExpr {
        Expr::expr(column).like(contains_pattern(term))
    }
}

impl CaseInsensitiveMatch for LowerLike {
    fn contains(&self, column: SimpleExpr, term: &str) -> SimpleExpr {
        Expr::expr(Func::lower(column)).like(contains_pattern(&term.to_lowercase()))
    }
}

/// The strategy used when none is injected.
#[must_use]
pub fn for_backend(backend: DatabaseBackend) -> Arc<dyn CaseInsensitiveMatch> {
    match backend {
        DatabaseBackend::Postgres => Arc::new(NativeIlike),
        DatabaseBackend::Sqlite => Arc::new(NativeLike),
        _ => Arc::new(LowerLike),
    }
}

fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_wildcards(term))).escape(ESCAPE_CHAR)
}

/// Escape LIKE wildcards so `%` and `_` in user input match themselves.
pub(crate) fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
