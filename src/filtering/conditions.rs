use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::{
    ColumnTrait, ColumnType, EntityTrait, Value,
    sea_query::{Alias, DynIden, Expr, Func, SimpleExpr},
};
use uuid::Uuid;

use super::kinds::{FilterPredicate, parse_bool};
use super::matching::CaseInsensitiveMatch;
use super::relations::RelationRegistry;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Everything a predicate needs besides its own data.
pub struct FilterContext<'a> {
    /// Base table, used to qualify column references.
    pub base: &'a DynIden,
    pub relations: &'a RelationRegistry,
    pub matcher: &'a dyn CaseInsensitiveMatch,
}

impl FilterContext<'_> {
    /// `"base"."column"`
    #[must_use]
    pub fn column(&self, name: &str) -> Expr {
        Expr::col((self.base.clone(), Alias::new(name)))
    }
}

/// SQL type of `name` on entity `E`, if it is one of its columns.
#[must_use]
pub fn column_type<E: EntityTrait>(name: &str) -> Option<ColumnType> {
    E::Column::from_str(name)
        .ok()
        .map(|column| column.def().get_column_type().clone())
}

/// Translate one parsed filter on `key` into a predicate.
///
/// `column_type` drives coercion of the request strings; pass `None` for
/// columns the entity does not describe. Returns `None` when the filter names
/// an unregistered relation.
#[must_use]
pub fn build_condition(
    key: &str,
    predicate: &FilterPredicate,
    column_type: Option<&ColumnType>,
    ctx: &FilterContext<'_>,
) -> Option<SimpleExpr> {
    let expr = match predicate {
        FilterPredicate::Exact { value } | FilterPredicate::Fallback { value } => {
            ctx.column(key).eq(coerce(column_type, value))
        }
        FilterPredicate::Like { term } => ctx.matcher.contains(ctx.column(key).into(), term),
        FilterPredicate::Date { date } => {
            let day = parse_date(date.trim()).map_or_else(|| Value::from(date.clone()), Value::from);
            Expr::expr(Func::cust(Alias::new("DATE")).arg(ctx.column(key))).eq(day)
        }
        FilterPredicate::DateRange { start, end } => ctx
            .column(key)
            .between(coerce(column_type, start), coerce(column_type, end)),
        FilterPredicate::InList { values } => ctx.column(key).is_in(
            values
                .iter()
                .map(|value| coerce(column_type, value))
                .collect::<Vec<_>>(),
        ),
        FilterPredicate::Boolean { value } => ctx.column(key).eq(*value),
        FilterPredicate::Relationship {
            relation,
            column,
            value,
        } => {
            let scope = ctx.relations.scope(relation, ctx.base)?;
            scope.exists(Expr::expr(scope.column(column)).eq(value.clone()))
        }
    };
    Some(expr)
}

/// Convert a request string into a value of the column's SQL type.
///
/// Input that does not parse is passed through as text, so a mismatch is
/// reported by the database rather than silently dropped.
#[must_use]
pub fn coerce(column_type: Option<&ColumnType>, raw: &str) -> Value {
    let text = || Value::from(raw.to_string());
    let Some(column_type) = column_type else {
        return text();
    };
    let trimmed = raw.trim();
    let coerced = match column_type {
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned
        | ColumnType::BigUnsigned => trimmed.parse::<i64>().ok().map(Value::from),
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) => {
            trimmed.parse::<f64>().ok().map(Value::from)
        }
        ColumnType::Boolean => Some(Value::from(parse_bool(trimmed))),
        ColumnType::Uuid => Uuid::parse_str(trimmed).ok().map(Value::from),
        ColumnType::Date => parse_date(trimmed).map(Value::from),
        ColumnType::DateTime | ColumnType::Timestamp => parse_datetime(trimmed).map(Value::from),
        ColumnType::TimestampWithTimeZone => parse_datetime_utc(trimmed).map(Value::from),
        _ => None,
    };
    coerced.unwrap_or_else(text)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Full timestamps, or a bare date meaning midnight.
fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
        .or_else(|| parse_date(raw).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

fn parse_datetime_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| parse_datetime(raw).map(|naive| naive.and_utc()))
}
