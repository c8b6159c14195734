//! Page-size clamping, the paginated result and its front-end projection.
//!
//! [`Paginated`] is what [`DataTable::get`](crate::DataTable::get) returns: one
//! page of items plus the totals needed to describe the rest. [`to_array`]
//! projects it into the `{items, meta}` body that data-table front ends expect,
//! including first/last/prev/next URLs and a windowed list of page links.

use serde::Serialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Pages shown on each side of the current page in a long link list.
const ON_EACH_SIDE: u64 = 3;

const PREVIOUS_LABEL: &str = "&laquo; Previous";
const NEXT_LABEL: &str = "Next &raquo;";
const GAP_LABEL: &str = "...";

/// Resolve the page size for a request.
///
/// Any run of digits clamps into `[1, max]`, including numbers too large for
/// an integer type. Negative numbers become 1. A missing or non-numeric value
/// uses `default` rather than collapsing to a single row.
#[must_use]
pub fn clamp_per_page(requested: Option<&str>, default: u64, max: u64) -> u64 {
    let max = max.max(1);
    let Some(raw) = requested.map(str::trim) else {
        return default.clamp(1, max);
    };
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        tracing::debug!(requested = raw, "Non-numeric page size, using the default");
        return default.clamp(1, max);
    }
    if raw.starts_with('-') {
        return 1;
    }
    digits.parse::<u64>().map_or(max, |count| count.clamp(1, max))
}

/// Resolve the 1-based page number; anything unusable means the first page.
#[must_use]
pub fn parse_page(requested: Option<&str>) -> u64 {
    requested
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(1)
        .max(1)
}

/// One page of results and the totals describing the full result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated {
    pub items: Vec<JsonValue>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    /// Base of every generated page URL.
    pub path: String,
    /// Query pairs carried into every generated page URL.
    pub query: Vec<(String, String)>,
    /// Query key holding the page number in generated URLs.
    pub page_name: String,
}

impl Paginated {
    #[must_use]
    pub fn new(items: Vec<JsonValue>, total: u64, per_page: u64, current_page: u64) -> Self {
        Self {
            items,
            total,
            per_page: per_page.max(1),
            current_page: current_page.max(1),
            path: String::new(),
            query: Vec::new(),
            page_name: "page".to_string(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Carry `query` into the generated URLs. A pair named like the page key is dropped.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self.query.retain(|(key, _)| *key != self.page_name);
        self
    }

    #[must_use]
    pub fn with_page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = page_name.into();
        self.query.retain(|(key, _)| *key != self.page_name);
        self
    }

    /// Never less than 1, even for an empty result.
    #[must_use]
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// 1-based position of the first item on this page.
    #[must_use]
    pub fn from(&self) -> Option<u64> {
        (!self.items.is_empty()).then(|| (self.current_page - 1) * self.per_page + 1)
    }

    /// 1-based position of the last item on this page.
    #[must_use]
    pub fn to(&self) -> Option<u64> {
        self.from().map(|from| from + self.items.len() as u64 - 1)
    }

    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page()
    }

    /// URL of `page` (values below 1 mean the first page).
    #[must_use]
    pub fn url(&self, page: u64) -> String {
        let separator = if self.path.contains('?') { '&' } else { '?' };
        let mut url = format!("{}{separator}", self.path);
        for (key, value) in &self.query {
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            url.push('&');
        }
        url.push_str(&urlencoding::encode(&self.page_name));
        url.push('=');
        url.push_str(&page.max(1).to_string());
        url
    }

    #[must_use]
    pub fn next_page_url(&self) -> Option<String> {
        self.has_more_pages()
            .then(|| self.url(self.current_page + 1))
    }

    #[must_use]
    pub fn previous_page_url(&self) -> Option<String> {
        (self.current_page > 1).then(|| self.url(self.current_page - 1))
    }

    /// Previous link, the page window, then the next link.
    ///
    /// With fewer than 14 pages every page is listed. Otherwise the list keeps
    /// the first and last pages and the neighbourhood of the current page,
    /// replacing what is left out with `...`.
    #[must_use]
    pub fn links(&self) -> Vec<PageLink> {
        let mut links = vec![PageLink {
            url: self.previous_page_url(),
            label: PREVIOUS_LABEL.to_string(),
            active: false,
        }];

        for element in self.window() {
            match element {
                WindowElement::Pages(first, last) => {
                    links.extend((first..=last).map(|page| PageLink {
                        url: Some(self.url(page)),
                        label: page.to_string(),
                        active: page == self.current_page,
                    }));
                }
                WindowElement::Gap => links.push(PageLink {
                    url: None,
                    label: GAP_LABEL.to_string(),
                    active: false,
                }),
            }
        }

        links.push(PageLink {
            url: self.next_page_url(),
            label: NEXT_LABEL.to_string(),
            active: false,
        });
        links
    }

    fn window(&self) -> Vec<WindowElement> {
        let last = self.last_page();
        let current = self.current_page;
        if last < ON_EACH_SIDE * 2 + 8 {
            return vec![WindowElement::Pages(1, last)];
        }

        let window = ON_EACH_SIDE + 4;
        let start = WindowElement::Pages(1, 2);
        let finish = WindowElement::Pages(last - 1, last);
        if current <= window {
            vec![
                WindowElement::Pages(1, window + ON_EACH_SIDE),
                WindowElement::Gap,
                finish,
            ]
        } else if current > last - window {
            vec![
                start,
                WindowElement::Gap,
                WindowElement::Pages(last - (window + ON_EACH_SIDE - 1), last),
            ]
        } else {
            vec![
                start,
                WindowElement::Gap,
                WindowElement::Pages(current - ON_EACH_SIDE, current + ON_EACH_SIDE),
                WindowElement::Gap,
                finish,
            ]
        }
    }

    #[must_use]
    pub fn meta(&self) -> PaginationMeta {
        let last_page = self.last_page();
        PaginationMeta {
            current_page: self.current_page,
            first_page_url: self.url(1),
            from: self.from(),
            last_page,
            last_page_url: self.url(last_page),
            links: self.links(),
            next_page_url: self.next_page_url(),
            path: self.path.clone(),
            per_page: self.per_page,
            prev_page_url: self.previous_page_url(),
            to: self.to(),
            total: self.total,
        }
    }

    /// Project into the `{items, meta}` response body.
    #[must_use]
    pub fn to_array(&self) -> DataTableResponse {
        DataTableResponse {
            items: self.items.clone(),
            meta: self.meta(),
        }
    }
}

enum WindowElement {
    Pages(u64, u64),
    Gap,
}

/// Project a page into the `{items, meta}` response body. Never re-queries.
#[must_use]
pub fn to_array(paginated: &Paginated) -> DataTableResponse {
    paginated.to_array()
}

/// One entry of [`PaginationMeta::links`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageLink {
    /// `null` for a disabled previous/next link or a `...` gap.
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Pagination metadata for a data table front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub current_page: u64,
    pub first_page_url: String,
    /// `null` when the page is empty.
    pub from: Option<u64>,
    pub last_page: u64,
    pub last_page_url: String,
    pub links: Vec<PageLink>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u64,
    pub prev_page_url: Option<String>,
    /// `null` when the page is empty.
    pub to: Option<u64>,
    pub total: u64,
}

/// Response body of a data table endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DataTableResponse {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<JsonValue>,
    pub meta: PaginationMeta,
}
