//! Post listing predicates and pagination.
//!
//! `build_post_filter` turns optional listing parameters into a `PostFilter`,
//! a conjunction of clauses. The same structure is evaluated in memory by
//! `PostFilter::matches` and rendered to SQL by the Postgres repository.

use std::collections::BTreeSet;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Post, PostStatus},
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

// --- Raw Query Strings (HTTP Boundary) ---

/// ListPostsQuery
///
/// Query parameters accepted by `GET /posts`. Everything arrives as a string so
/// that malformed paging values can fall back to defaults instead of failing
/// the whole request.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// Case-insensitive match on title or content, or exact tag match.
    pub search: Option<String>,
    /// Comma-separated tags; a post must carry all of them.
    pub tags: Option<String>,
    /// `true` or `false`; any other value is ignored.
    pub is_featured: Option<String>,
    /// DRAFT, PUBLISHED or ARCHIVED.
    pub status: Option<String>,
    pub author_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    /// createdAt, updatedAt, title or views.
    pub sort_by: Option<String>,
    /// asc or desc.
    pub sort_order: Option<String>,
}

impl ListPostsQuery {
    pub fn paging(&self) -> PagingQuery {
        PagingQuery {
            page: self.page.clone(),
            limit: self.limit.clone(),
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// --- Filter Parameters ---

/// PostFilterParams
///
/// Typed, independently optional filter inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilterParams {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub is_featured: Option<bool>,
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
}

impl PostFilterParams {
    /// Parses the raw query strings. Unknown `status` values and malformed
    /// `authorId`s are validation errors; `isFeatured` is tri-state and
    /// treats anything but `true`/`false` as unset.
    pub fn from_query(query: &ListPostsQuery) -> AppResult<Self> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let tags = query
            .tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let is_featured = match query.is_featured.as_deref().map(str::trim) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                PostStatus::parse(raw)
                    .ok_or_else(|| AppError::Validation(format!("unknown post status '{raw}'")))?,
            ),
        };

        let author_id = match query.author_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::Validation(format!("invalid authorId '{raw}'")))?,
            ),
        };

        Ok(Self {
            search,
            tags,
            is_featured,
            status,
            author_id,
        })
    }
}

// --- Normalized Predicate ---

#[derive(Debug, Clone, PartialEq)]
pub enum PostClause {
    /// title ILIKE %s% OR content ILIKE %s% OR s is one of the tags.
    Search(String),
    /// The post's tag set is a superset of these.
    HasAllTags(BTreeSet<String>),
    Featured(bool),
    Status(PostStatus),
    Author(Uuid),
}

impl PostClause {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostClause::Search(term) => {
                let needle = term.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
                    || post.tags.iter().any(|t| t.to_lowercase() == needle)
            }
            PostClause::HasAllTags(wanted) => wanted.iter().all(|w| post.tags.contains(w)),
            PostClause::Featured(flag) => post.is_featured == *flag,
            PostClause::Status(status) => post.status == *status,
            PostClause::Author(id) => post.author_id == *id,
        }
    }
}

/// PostFilter
///
/// AND of its clauses. No clauses means every post matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub clauses: Vec<PostClause>,
}

impl PostFilter {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.clauses.iter().all(|c| c.matches(post))
    }
}

/// build_post_filter
///
/// Adds one clause per present parameter. An empty tag list and an unset
/// featured flag contribute nothing.
pub fn build_post_filter(params: &PostFilterParams) -> PostFilter {
    let mut clauses = Vec::new();

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        clauses.push(PostClause::Search(search.to_string()));
    }

    let tags: BTreeSet<String> = params
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if !tags.is_empty() {
        clauses.push(PostClause::HasAllTags(tags));
    }

    if let Some(flag) = params.is_featured {
        clauses.push(PostClause::Featured(flag));
    }
    if let Some(status) = params.status {
        clauses.push(PostClause::Status(status));
    }
    if let Some(author_id) = params.author_id {
        clauses.push(PostClause::Author(author_id));
    }

    PostFilter { clauses }
}

// --- Pagination & Sorting ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Views,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            "views" => Some(Self::Views),
            _ => None,
        }
    }

    /// Column name; only these literals ever reach the SQL text.
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::Views => "views",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Paging
///
/// Resolved pagination window. `skip` is always `(page - 1) * limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            skip: 0,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// resolve_paging
///
/// Missing, unparseable or non-positive values fall back to the defaults;
/// `limit` is capped at `MAX_LIMIT`.
pub fn resolve_paging(query: &PagingQuery) -> Paging {
    let positive = |raw: &Option<String>| {
        raw.as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v >= 1)
    };

    let page = positive(&query.page).unwrap_or(DEFAULT_PAGE);
    let limit = positive(&query.limit).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let sort_by = query
        .sort_by
        .as_deref()
        .and_then(SortField::parse)
        .unwrap_or_default();
    let sort_order = query
        .sort_order
        .as_deref()
        .and_then(SortOrder::parse)
        .unwrap_or_default();

    Paging {
        page,
        limit,
        skip: (page - 1).saturating_mul(limit),
        sort_by,
        sort_order,
    }
}

/// Escapes `%`, `_` and `\` so a search term is matched literally by ILIKE.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
