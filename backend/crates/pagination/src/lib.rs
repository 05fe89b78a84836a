//! Page-request and page-envelope primitives shared by backend list queries.
//!
//! Listing endpoints accept a [`PageRequest`] (1-based page number plus page
//! size) and return a [`Page`] envelope carrying the items for that page and
//! the total row count. Validation lives here so every listing query applies
//! the same bounds.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size applied when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Page numbers are 1-based; zero is not addressable.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// A zero-sized page can never make progress.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// The requested page size exceeds [`MAX_PAGE_SIZE`].
    #[error("page size must be at most {max}")]
    PageSizeTooLarge {
        /// The enforced upper bound.
        max: u32,
    },
}

/// Validated request for one page of an ordered listing.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 25)?;
/// assert_eq!(request.offset(), 25);
/// assert_eq!(request.limit(), 25);
/// # Ok::<(), pagination::PageRequestError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when the page number is zero or the page
    /// size is zero or above [`MAX_PAGE_SIZE`].
    pub const fn new(page: u32, page_size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(PageRequestError::PageSizeTooLarge { max: MAX_PAGE_SIZE });
        }
        Ok(Self { page, page_size })
    }

    /// First page with [`DEFAULT_PAGE_SIZE`] items.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip for this page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// Maximum number of rows to return for this page.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of results plus the envelope metadata callers need for paging UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    /// Items on this page, in the listing's order.
    pub items: Vec<T>,
    /// 1-based page number this envelope answers.
    pub page: u32,
    /// Page size the envelope was computed with.
    pub page_size: u32,
    /// Total matching rows across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Build an envelope for the given request.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total,
        }
    }

    /// Total number of pages implied by `total` and the page size.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages()
    }

    /// Map the item type while keeping the envelope metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}
