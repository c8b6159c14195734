use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter, RelationDef,
    RelationTrait, Select,
    sea_query::{DynIden, IntoIden},
};

use crate::config::{DataTableConfig, DEFAULT_PER_PAGE, MAX_PER_PAGE, ParamNames};
use crate::filtering::{
    CaseInsensitiveMatch, FilterContext, FilterKind, FilterPredicate, RelationMeta,
    RelationRegistry, apply_sort, build_condition, build_search_condition, column_type,
    eager_load, for_backend, parse_sort,
};
use crate::models::DataTableRequest;
use crate::pagination::{DataTableResponse, Paginated, clamp_per_page, parse_page};

/// Imperative filter registered with [`DataTable::filter`].
///
/// Receives the query, the non-empty request value of its key and the whole request.
pub type FilterCallback<E> =
    Box<dyn Fn(Select<E>, &str, &DataTableRequest) -> Select<E> + Send + Sync>;

/// Turns a list request into a searched, filtered, sorted and paginated query.
///
/// Built fluently per endpoint around a base query, then consumed by
/// [`get`](Self::get) or [`get_response`](Self::get_response):
///
/// ```rust,ignore
/// let response = DataTable::make(user::Entity::find())
///     .relation("posts", user::Relation::Posts)
///     .searchable(["name", "email", "posts.title"])
///     .sortable(["name", "created_at"])
///     .filterable([("is_active", "boolean"), ("created_at", "date_range")])
///     .with(["posts"])
///     .get_response(&db, &request)
///     .await?;
/// ```
///
/// Request keys that are not searchable, sortable or filterable are ignored,
/// so only what the endpoint declares can reach the query.
pub struct DataTable<E: EntityTrait> {
    query: Select<E>,
    searchable: Vec<String>,
    sortable: Vec<String>,
    filterable: HashMap<String, FilterKind>,
    with: Vec<String>,
    relations: RelationRegistry,
    default_per_page: u64,
    max_per_page: u64,
    callbacks: Vec<(String, FilterCallback<E>)>,
    matcher: Option<Arc<dyn CaseInsensitiveMatch>>,
    params: ParamNames,
}

impl<E: EntityTrait> DataTable<E> {
    pub fn make(query: Select<E>) -> Self {
        Self {
            query,
            searchable: Vec::new(),
            sortable: Vec::new(),
            filterable: HashMap::new(),
            with: Vec::new(),
            relations: RelationRegistry::default(),
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            callbacks: Vec::new(),
            matcher: None,
            params: ParamNames::default(),
        }
    }

    /// Columns matched by the `search` term; `relation.column` searches related rows.
    #[must_use]
    pub fn searchable<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable = columns.into_iter().map(Into::into).collect();
        self
    }

    /// The only columns a request may sort by.
    #[must_use]
    pub fn sortable<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Filterable columns and their kind, e.g. `("created_at", "date_range")`.
    #[must_use]
    pub fn filterable<I, S, K>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, K)>,
        S: Into<String>,
        K: Into<FilterKind>,
    {
        self.filterable = columns
            .into_iter()
            .map(|(column, kind)| (column.into(), kind.into()))
            .collect();
        self
    }

    /// Relations attached to every returned item.
    #[must_use]
    pub fn with<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with = relations.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn default_per_page(mut self, per_page: u64) -> Self {
        self.default_per_page = at_least_one("default_per_page", per_page);
        self
    }

    #[must_use]
    pub fn max_per_page(mut self, per_page: u64) -> Self {
        self.max_per_page = at_least_one("max_per_page", per_page);
        self
    }

    /// Run `callback` when the request carries a non-empty `key`.
    ///
    /// Callbacks run after the declarative filters, in registration order.
    #[must_use]
    pub fn filter<F>(mut self, key: impl Into<String>, callback: F) -> Self
    where
        F: Fn(Select<E>, &str, &DataTableRequest) -> Select<E> + Send + Sync + 'static,
    {
        self.callbacks.push((key.into(), Box::new(callback)));
        self
    }

    /// Register a relation of `E` under `name` for dotted columns and eager loading.
    #[must_use]
    pub fn relation<R: RelationTrait>(self, name: impl Into<String>, relation: R) -> Self {
        self.relation_def(name, relation.def())
    }

    #[must_use]
    pub fn relation_def(mut self, name: impl Into<String>, def: RelationDef) -> Self {
        self.relations.insert(name, RelationMeta::from_def(def));
        self
    }

    /// Replace the case-insensitive match strategy picked from the connection.
    #[must_use]
    pub fn matcher(mut self, matcher: impl CaseInsensitiveMatch + 'static) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Apply shared settings: page-size bounds and reserved key names.
    #[must_use]
    pub fn configure(self, config: DataTableConfig) -> Self {
        self.default_per_page(config.default_per_page)
            .max_per_page(config.max_per_page)
            .params(config.params)
    }

    #[must_use]
    pub fn params(mut self, params: ParamNames) -> Self {
        self.params = params;
        self
    }

    /// The base query, before any request is applied.
    pub fn query(&self) -> &Select<E> {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Select<E> {
        &mut self.query
    }

    #[must_use]
    pub fn map_query(mut self, f: impl FnOnce(Select<E>) -> Select<E>) -> Self {
        self.query = f(self.query);
        self
    }

    /// The base query with the request's search, filters and sort applied.
    ///
    /// Pure: the adapter is left untouched, and nothing is sent to the database.
    pub fn to_select(&self, request: &DataTableRequest, backend: DatabaseBackend) -> Select<E> {
        let base: DynIden = E::default().into_iden();
        let matcher = self.matcher.clone().unwrap_or_else(|| for_backend(backend));
        let ctx = FilterContext {
            base: &base,
            relations: &self.relations,
            matcher: matcher.as_ref(),
        };

        let mut select = self.query.clone();

        if let Some(term) = request.filled(&self.params.search)
            && let Some(condition) = build_search_condition(term, &self.searchable, &ctx)
        {
            select = select.filter(condition);
        }

        for (key, value) in request.filter_candidates(&self.params) {
            let Some(kind) = self.filterable.get(key) else {
                continue;
            };
            let Some(predicate) = FilterPredicate::parse(kind, key, value) else {
                tracing::debug!(key, kind = %kind, "Unusable filter value, skipping");
                continue;
            };
            let column_type = column_type::<E>(key);
            if let Some(condition) = build_condition(key, &predicate, column_type.as_ref(), &ctx) {
                select = select.filter(condition);
            }
        }

        for (key, callback) in &self.callbacks {
            if let Some(value) = request.filled(key) {
                select = callback(select, value, request);
            }
        }

        if let Some(directive) = parse_sort(request, &self.params, &self.sortable) {
            select = apply_sort(select, &directive, &ctx);
        }

        select
    }

    /// Run the request against `db` and return one page.
    ///
    /// # Errors
    ///
    /// Returns the storage layer's [`DbErr`] when counting, fetching or eager
    /// loading fails. Unusable request input never errors; it is skipped.
    pub async fn get<C>(self, db: &C, request: &DataTableRequest) -> Result<Paginated, DbErr>
    where
        C: ConnectionTrait,
    {
        let select = self.to_select(request, db.get_database_backend());
        let per_page = clamp_per_page(
            request.first_filled(&self.params.limit),
            self.default_per_page,
            self.max_per_page,
        );
        let page = parse_page(request.get(&self.params.page));

        let paginator = select.into_json().paginate(db, per_page);
        let total = paginator.num_items().await?;
        // Offsets of in-range pages are below `total`, so only those are fetched.
        let mut items = if page > total.div_ceil(per_page).max(1) {
            Vec::new()
        } else {
            paginator.fetch_page(page - 1).await?
        };

        for name in &self.with {
            match self.relations.get(name) {
                Some(meta) => {
                    let key_type = meta.key_column().and_then(|key| column_type::<E>(&key));
                    eager_load(db, &mut items, name, meta, key_type.as_ref()).await?;
                }
                None => tracing::debug!(relation = %name, "Relation is not registered, not loading"),
            }
        }

        Ok(Paginated::new(items, total, per_page, page)
            .with_page_name(self.params.page.clone())
            .with_path(request.path())
            .with_query(request.preserved_query(&self.params)))
    }

    /// [`get`](Self::get) projected into the `{items, meta}` response body.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn get_response<C>(
        self,
        db: &C,
        request: &DataTableRequest,
    ) -> Result<DataTableResponse, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(self.get(db, request).await?.to_array())
    }
}

fn at_least_one(setting: &str, value: u64) -> u64 {
    if value == 0 {
        tracing::warn!(setting, "Page size must be at least 1, using 1");
        1
    } else {
        value
    }
}
