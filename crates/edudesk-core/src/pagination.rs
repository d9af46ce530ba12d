//! Pagination and search utilities for list endpoints.
//!
//! Every collection endpoint accepts the same query parameters:
//!
//! - `limit`: Maximum number of items to return (1-100, default: 10)
//! - `page`: Page number (1-indexed); takes precedence over `offset`
//! - `offset`: Number of items to skip (used when `page` is absent)
//! - `search`: Case-insensitive substring filter applied by the endpoint
//!
//! Empty query values (`?search=&page=`) are treated as absent.
//!
//! # Example
//!
//! ```ignore
//! async fn list_subjects(
//!     Query(params): Query<ListParams>,
//! ) -> Result<Json<PaginatedSubjectsResponse>, AppError> {
//!     let limit = params.pagination.limit();
//!     let offset = params.pagination.offset();
//!
//!     let subjects = fetch_subjects(params.search_pattern(), limit, offset).await?;
//!     let total = count_subjects(params.search_pattern()).await?;
//!
//!     Ok(Json(PaginatedSubjectsResponse {
//!         data: subjects,
//!         meta: PaginationMeta::for_params(&params.pagination, total),
//!     }))
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::{deserialize_optional_i64, deserialize_optional_trimmed};

/// Metadata about a paginated response.
///
/// ```json
/// {
///   "data": [...],
///   "meta": { "total": 100, "limit": 10, "offset": 20, "page": 3, "has_more": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Maximum items per page (the limit that was applied)
    pub limit: i64,
    /// Number of items skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Current page number (only present if page-based pagination was used)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    /// Builds the metadata for a page fetched with `params` out of `total` rows.
    #[must_use]
    pub fn for_params(params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        let offset = params.offset();

        Self {
            total,
            limit,
            offset: Some(offset),
            page: params.page(),
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

/// Query parameters for pagination.
///
/// - `limit` is clamped to the range [1, 100]
/// - `offset` is clamped to a minimum of 0
/// - `page` is clamped to a minimum of 1
#[derive(Debug, Clone, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0, ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(10),
            offset: Some(0),
            page: Some(1),
        }
    }
}

impl PaginationParams {
    /// Returns the effective limit, clamped to [1, 100]. Defaults to 10.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Returns the effective offset.
    ///
    /// If `page` is set, the offset is derived from it; otherwise the
    /// explicit offset (or 0) is used.
    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.page {
            let page = page.max(1);
            (page - 1).saturating_mul(self.limit())
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }

    /// Returns the page number if provided, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}

/// Pagination plus a free-text `search` term.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive substring to filter by
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl ListParams {
    /// Returns the search term as an `ILIKE` pattern, with `%`, `_` and `\` escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }
}

/// Wraps `term` in `%` for a substring `ILIKE` match, escaping LIKE metacharacters.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), Some(1));
    }

    #[test]
    fn test_pagination_params_limit_boundary_cases() {
        let test_cases = vec![
            (Some(1), 1),
            (Some(50), 50),
            (Some(100), 100),
            (Some(101), 100),
            (Some(0), 1),
            (Some(-1), 1),
            (None, 10),
        ];

        for (input, expected) in test_cases {
            let params = PaginationParams {
                limit: input,
                offset: Some(0),
                page: None,
            };
            assert_eq!(params.limit(), expected);
        }
    }

    #[test]
    fn test_pagination_params_offset_boundary_cases() {
        let test_cases = vec![
            (Some(0), 0),
            (Some(10), 10),
            (Some(-1), 0),
            (Some(i64::MAX), i64::MAX),
            (None, 0),
        ];

        for (input, expected) in test_cases {
            let params = PaginationParams {
                limit: Some(10),
                offset: input,
                page: None,
            };
            assert_eq!(params.offset(), expected);
        }
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let params = PaginationParams {
            limit: Some(20),
            offset: Some(5),
            page: Some(3),
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.page(), Some(3));
    }

    #[test]
    fn test_page_below_one_is_first_page() {
        let params = PaginationParams {
            limit: Some(10),
            offset: None,
            page: Some(-4),
        };
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), Some(1));
    }

    #[test]
    fn test_meta_for_params() {
        let params = PaginationParams {
            limit: Some(10),
            offset: None,
            page: Some(2),
        };
        let meta = PaginationMeta::for_params(&params, 25);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.offset, Some(10));
        assert_eq!(meta.page, Some(2));
        assert!(meta.has_more);

        let last = PaginationParams {
            limit: Some(10),
            offset: None,
            page: Some(3),
        };
        assert!(!PaginationMeta::for_params(&last, 25).has_more);
    }

    #[test]
    fn test_meta_for_extreme_page_and_offset() {
        let huge_page = PaginationParams {
            limit: Some(100),
            offset: None,
            page: Some(i64::MAX),
        };
        assert_eq!(huge_page.offset(), i64::MAX);
        let meta = PaginationMeta::for_params(&huge_page, 25);
        assert_eq!(meta.offset, Some(i64::MAX));
        assert!(!meta.has_more);

        let huge_offset = PaginationParams {
            limit: Some(10),
            offset: Some(i64::MAX),
            page: None,
        };
        assert!(!PaginationMeta::for_params(&huge_offset, i64::MAX).has_more);
    }

    #[test]
    fn test_meta_serialize_skips_missing_page() {
        let meta = PaginationMeta {
            total: 3,
            limit: 10,
            offset: Some(0),
            page: None,
            has_more: false,
        };
        let serialized = serde_json::to_string(&meta).unwrap();
        assert!(serialized.contains(r#""total":3"#));
        assert!(!serialized.contains("page"));
    }

    #[test]
    fn test_pagination_params_deserialize_empty_strings() {
        let json = r#"{"limit":"","offset":"","page":""}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), None);
    }

    #[test]
    fn test_list_params_deserialize() {
        let json = r#"{"search":"  math ","limit":"5","page":"2"}"#;
        let params: ListParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.search.as_deref(), Some("math"));
        assert_eq!(params.pagination.limit(), 5);
        assert_eq!(params.pagination.offset(), 5);
    }

    #[test]
    fn test_list_params_blank_search_is_none() {
        let json = r#"{"search":"   "}"#;
        let params: ListParams = serde_json::from_str(json).unwrap();
        assert!(params.search.is_none());
        assert!(params.search_pattern().is_none());
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
