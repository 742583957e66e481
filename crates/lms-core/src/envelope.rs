//! Response envelope and pagination.
//!
//! Every response, whether it comes from the HTTP gateway or from the
//! in-process dispatcher, is wrapped in the same envelope:
//!
//! ```text
//! { "success": true,  "data": ..., "pagination": { "page", "limit", "total", "pages" } }
//! { "success": true,  "message": "Course deleted successfully" }
//! { "success": false, "error": "Course is full", "code": "COURSE_FULL" }
//! ```

use serde::{Deserialize, Serialize};

/// Default page size used when a request does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound applied to requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Successful response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Always `true` for this shape.
    pub success: bool,

    /// Response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Pagination block for list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    /// Human-readable message, used by deletes and password changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Wrap a payload.
    #[must_use]
    pub const fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            message: None,
        }
    }

    /// Wrap one page of a list together with its pagination block.
    #[must_use]
    pub const fn page(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: Some(pagination),
            message: None,
        }
    }

    /// A payload-less success carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            pagination: None,
            message: Some(message.into()),
        }
    }

    /// Transform the payload, keeping pagination and message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            pagination: self.pagination,
            message: self.message,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false` for this shape.
    pub success: bool,

    /// Human-readable error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Alternative message field used by some servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Machine-readable error kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Build a failure body with a message and kind.
    #[must_use]
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            message: None,
            code: Some(code.into()),
        }
    }

    /// The best available message: `error`, then `message`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-indexed page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Number of pages, `ceil(total / limit)`.
    pub pages: u64,
}

/// Requested page, as parsed from `?page=&limit=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-indexed page. Missing or zero means the first page.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size. Missing or zero means [`DEFAULT_PAGE_SIZE`].
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageRequest {
    /// Create a page request.
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Effective page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    /// Effective page size.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }
}

/// Slice `items` according to `request`.
///
/// Pages past the end yield an empty slice with accurate totals.
#[must_use]
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> (Vec<T>, Pagination) {
    let page = request.page();
    let limit = request.limit();
    let total = items.len() as u64;
    let pages = total.div_ceil(u64::from(limit));

    let skip = usize::try_from(u64::from(page - 1) * u64::from(limit)).unwrap_or(usize::MAX);
    let slice = items.into_iter().skip(skip).take(limit as usize).collect();

    (
        slice,
        Pagination {
            page,
            limit,
            total,
            pages,
        },
    )
}
