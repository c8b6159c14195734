//! Relation metadata and the queries that reach across a relation.
//!
//! A relation is registered under a name (`"posts"`, `"company"`) from a
//! Sea-ORM [`RelationDef`]. Dotted column paths such as `posts.title` then
//! resolve through it for:
//!
//! - search and relationship filters: `EXISTS (SELECT 1 FROM posts AS "posts" WHERE "posts"."user_id" = "users"."id" AND ...)`
//! - sorting: `ORDER BY (SELECT "company"."name" FROM companies AS "company" WHERE "company"."id" = "users"."company_id" LIMIT 1)`
//! - eager loading: one `IN` query per relation for the rows of the current page.
//!
//! Both `has_many`/`has_one` and `belongs_to` definitions correlate the same
//! way: `related.to_col = base.from_col`.

use std::collections::HashMap;
use std::fmt;

use sea_orm::{
    ColumnType, ConnectionTrait, DbErr, FromQueryResult, Identity, RelationDef, RelationType, Value,
    sea_query::{
        Alias, Asterisk, DynIden, Expr, Iden, IntoIden, Query,
        SelectStatement, SimpleExpr, SubQueryStatement, TableRef,
    },
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// What the adapter needs to know about one relation of the base entity.
#[derive(Clone)]
pub struct RelationMeta {
    table: TableRef,
    /// Key columns on the base entity.
    from_cols: Vec<DynIden>,
    /// Matching columns on the related table.
    to_cols: Vec<DynIden>,
    many: bool,
}

impl RelationMeta {
    #[must_use]
    pub fn from_def(def: RelationDef) -> Self {
        let from_cols = identity_columns(def.from_col);
        let to_cols = identity_columns(def.to_col);
        if from_cols.is_empty() || from_cols.len() != to_cols.len() {
            tracing::warn!(
                from = from_cols.len(),
                to = to_cols.len(),
                "Relation key columns do not line up; related lookups will match nothing"
            );
        }
        Self {
            table: def.to_tbl,
            from_cols,
            to_cols,
            many: matches!(def.rel_type, RelationType::HasMany),
        }
    }

    /// Whether eager loading yields a list rather than a single record.
    #[must_use]
    pub fn is_many(&self) -> bool {
        self.many
    }

    /// Name of the base entity's key column, for single-column relations.
    #[must_use]
    pub fn key_column(&self) -> Option<String> {
        match (self.from_cols.as_slice(), self.to_cols.as_slice()) {
            ([from_col], [_]) => Some(Iden::to_string(&**from_col)),
            _ => None,
        }
    }
}

impl fmt::Debug for RelationMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |cols: &[DynIden]| -> Vec<String> {
            cols.iter().map(|col| Iden::to_string(&**col)).collect()
        };
        f.debug_struct("RelationMeta")
            .field("table", &self.table)
            .field("from_cols", &names(&self.from_cols))
            .field("to_cols", &names(&self.to_cols))
            .field("many", &self.many)
            .finish()
    }
}

fn identity_columns(identity: Identity) -> Vec<DynIden> {
    match identity {
        Identity::Unary(a) => vec![a],
        Identity::Binary(a, b) => vec![a, b],
        Identity::Ternary(a, b, c) => vec![a, b, c],
        #[allow(unreachable_patterns)]
        _ => Vec::new(),
    }
}

/// Named relations of one base entity.
#[derive(Debug, Clone, Default)]
pub struct RelationRegistry {
    relations: HashMap<String, RelationMeta>,
}

impl RelationRegistry {
    pub fn insert(&mut self, name: impl Into<String>, meta: RelationMeta) {
        self.relations.insert(name.into(), meta);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RelationMeta> {
        self.relations.get(name)
    }

    /// Resolve `name` for queries correlated with the `base` table.
    #[must_use]
    pub fn scope(&self, name: &str, base: &DynIden) -> Option<RelatedScope<'_>> {
        let Some(meta) = self.relations.get(name) else {
            tracing::debug!(relation = name, "Unknown relation, skipping");
            return None;
        };
        Some(RelatedScope {
            meta,
            alias: Alias::new(name).into_iden(),
            base: base.clone(),
        })
    }
}

/// A relation seen from inside a correlated subquery.
pub struct RelatedScope<'a> {
    meta: &'a RelationMeta,
    alias: DynIden,
    base: DynIden,
}

impl RelatedScope<'_> {
    /// A column of the related table, qualified with the subquery alias.
    #[must_use]
    pub fn column(&self, name: &str) -> SimpleExpr {
        Expr::col((self.alias.clone(), Alias::new(name))).into()
    }

    /// `EXISTS` related rows satisfying `predicate`.
    #[must_use]
    pub fn exists(&self, predicate: SimpleExpr) -> SimpleExpr {
        let mut sub = self.correlated(Expr::val(1).into());
        sub.and_where(predicate);
        Expr::exists(sub)
    }

    /// Scalar subquery yielding `column` of the related row, for ordering.
    #[must_use]
    pub fn projected(&self, column: &str) -> SimpleExpr {
        let mut sub = self.correlated(self.column(column));
        sub.limit(1);
        SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(sub)))
    }

    fn correlated(&self, selection: SimpleExpr) -> SelectStatement {
        let mut sub = Query::select();
        sub.expr(selection)
            .from_as(self.meta.table.clone(), self.alias.clone());
        for (from, to) in self.meta.from_cols.iter().zip(&self.meta.to_cols) {
            sub.and_where(
                Expr::col((self.alias.clone(), to.clone()))
                    .equals((self.base.clone(), from.clone())),
            );
        }
        sub
    }
}

/// Attach the related records of `relation` to every item of a page.
///
/// Items are JSON objects keyed by column name. `HasMany` relations become an
/// array, the others a single object or `null`. Only single-column keys are
/// supported; composite keys leave the items untouched.
///
/// `key_type` is the declared type of the base key column. String keys are
/// bound as UUIDs only when it is [`ColumnType::Uuid`], otherwise as text.
pub async fn eager_load<C>(
    db: &C,
    items: &mut [JsonValue],
    name: &str,
    meta: &RelationMeta,
    key_type: Option<&ColumnType>,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let ([from_col], [to_col]) = (meta.from_cols.as_slice(), meta.to_cols.as_slice()) else {
        tracing::debug!(relation = name, "Composite relation keys are not eager loaded");
        return Ok(());
    };
    let from_key = Iden::to_string(&**from_col);
    let to_key = Iden::to_string(&**to_col);

    let mut keys: Vec<&JsonValue> = Vec::new();
    for item in items.iter() {
        if let Some(key) = item.get(&from_key)
            && !key.is_null()
            && !keys.contains(&key)
        {
            keys.push(key);
        }
    }

    let related = if keys.is_empty() {
        Vec::new()
    } else {
        let values: Vec<Value> = keys
            .iter()
            .filter_map(|key| json_to_value(key, key_type))
            .collect();
        let stmt = Query::select()
            .column(Asterisk)
            .from(meta.table.clone())
            .and_where(Expr::col(to_col.clone()).is_in(values))
            .to_owned();
        JsonValue::find_by_statement(db.get_database_backend().build(&stmt))
            .all(db)
            .await?
    };

    for item in items.iter_mut() {
        let key = item.get(&from_key).filter(|key| !key.is_null()).cloned();
        let mut matches = related
            .iter()
            .filter(|row| key.is_some() && row.get(&to_key) == key.as_ref());
        let value = if meta.many {
            JsonValue::Array(matches.cloned().collect())
        } else {
            matches.next().cloned().unwrap_or(JsonValue::Null)
        };
        if let Some(object) = item.as_object_mut() {
            object.insert(name.to_string(), value);
        }
    }
    Ok(())
}

fn json_to_value(value: &JsonValue, key_type: Option<&ColumnType>) -> Option<Value> {
    match value {
        JsonValue::Number(number) => number
            .as_i64()
            .map(Value::from)
            .or_else(|| number.as_f64().map(Value::from)),
        JsonValue::String(text) => match key_type {
            Some(ColumnType::Uuid) => Uuid::parse_str(text).ok().map(Value::from),
            _ => Some(Value::from(text.clone())),
        },
        JsonValue::Bool(flag) => Some(Value::from(*flag)),
        _ => None,
    }
}
