//! Filter kinds and the predicates they produce from a request value.

use std::fmt;

/// How a request value becomes a predicate for one filterable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// `column = value`
    Exact,
    /// Case-insensitive partial match.
    Like,
    /// The column's date component equals the value.
    Date,
    /// `start,end` inclusive range.
    DateRange,
    /// Comma-separated set membership.
    In,
    /// Permissive boolean equality, see [`parse_bool`].
    Boolean,
    /// `relation.column` equality on related records.
    Relationship,
    /// Any tag this crate does not know; filtered by plain equality.
    Other(String),
}

impl FilterKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact => "exact",
            Self::Like => "like",
            Self::Date => "date",
            Self::DateRange => "date_range",
            Self::In => "in",
            Self::Boolean => "boolean",
            Self::Relationship => "relationship",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for FilterKind {
    fn from(tag: &str) -> Self {
        match tag {
            "exact" => Self::Exact,
            "like" => Self::Like,
            "date" => Self::Date,
            "date_range" => Self::DateRange,
            "in" => Self::In,
            "boolean" => Self::Boolean,
            "relationship" => Self::Relationship,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for FilterKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed filter, carrying only what its kind needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPredicate {
    Exact { value: String },
    Like { term: String },
    Date { date: String },
    DateRange { start: String, end: String },
    InList { values: Vec<String> },
    Boolean { value: bool },
    Relationship {
        relation: String,
        column: String,
        value: String,
    },
    /// Unrecognized kind: equality, same as [`FilterPredicate::Exact`].
    Fallback { value: String },
}

impl FilterPredicate {
    /// Parse `value` for the filter registered under `key`.
    ///
    /// Returns `None` when the input should be ignored: an empty value, a
    /// range without exactly one comma, or a relationship key without a dot.
    #[must_use]
    pub fn parse(kind: &FilterKind, key: &str, value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        let predicate = match kind {
            FilterKind::Exact => Self::Exact {
                value: value.to_string(),
            },
            FilterKind::Like => Self::Like {
                term: value.to_string(),
            },
            FilterKind::Date => Self::Date {
                date: value.to_string(),
            },
            FilterKind::DateRange => {
                let (start, end) = value.split_once(',')?;
                if end.contains(',') {
                    return None;
                }
                Self::DateRange {
                    start: start.trim().to_string(),
                    end: end.trim().to_string(),
                }
            }
            FilterKind::In => Self::InList {
                values: value.split(',').map(|item| item.trim().to_string()).collect(),
            },
            FilterKind::Boolean => Self::Boolean {
                value: parse_bool(value),
            },
            FilterKind::Relationship => {
                let (relation, column) = key.split_once('.')?;
                Self::Relationship {
                    relation: relation.to_string(),
                    column: column.to_string(),
                    value: value.to_string(),
                }
            }
            FilterKind::Other(_) => Self::Fallback {
                value: value.to_string(),
            },
        };
        Some(predicate)
    }
}

/// `"1"`, `"true"`, `"yes"` and `"on"` (any case, surrounding whitespace
/// ignored) are true; everything else is false.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
