//! Row windows and paged results.
//!
//! - [`Paginator`]: page-based or offset/limit windowing state of a query
//! - [`RowWindow`]: the resolved offset/limit pair handed to the executor
//! - [`Page`]: a result slice bundled with its total-count metadata

use crate::error::{QueryError, QueryResult};
use serde::Serialize;

/// An offset + limit pair restricting which rows of a result set are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowWindow {
    pub offset: u64,
    pub limit: u64,
}

impl RowWindow {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Apply the window to an in-memory iterator.
    pub fn apply<I: IntoIterator>(self, rows: I) -> impl Iterator<Item = I::Item> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        rows.into_iter().skip(offset).take(limit)
    }
}

/// Windowing state of a query.
///
/// `page()` and `limit()` overwrite each other; the last call wins. Only
/// `page()` marks the query as paged, which is what
/// [`get_paged_result`](crate::QueryBuilder::get_paged_result) requires.
///
/// # Example
/// ```ignore
/// let mut p = Paginator::new();
/// p.page(3, 25)?;
/// assert_eq!(p.window(), Some(RowWindow::new(50, 25)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    window: Option<RowWindow>,
    page: Option<u64>,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window by page number (1-based) and page size.
    ///
    /// If either argument is absent the call is a no-op. A page number or
    /// size of 0 is rejected.
    pub fn page(
        &mut self,
        page: impl Into<Option<u64>>,
        size: impl Into<Option<u64>>,
    ) -> QueryResult<()> {
        let (Some(page), Some(size)) = (page.into(), size.into()) else {
            return Ok(());
        };
        if page < 1 {
            return Err(QueryError::illegal_state(format!(
                "page must be >= 1, got {page}"
            )));
        }
        if size < 1 {
            return Err(QueryError::illegal_state(format!(
                "page size must be >= 1, got {size}"
            )));
        }
        let offset = (page - 1)
            .checked_mul(size)
            .ok_or_else(|| QueryError::illegal_state("page window overflows"))?;
        self.window = Some(RowWindow::new(offset, size));
        self.page = Some(page);
        Ok(())
    }

    /// Window by row offset and row count, clearing the paged flag.
    ///
    /// If either argument is absent the call is a no-op.
    pub fn limit(&mut self, offset: impl Into<Option<u64>>, count: impl Into<Option<u64>>) {
        if let (Some(offset), Some(count)) = (offset.into(), count.into()) {
            self.window = Some(RowWindow::new(offset, count));
            self.page = None;
        }
    }

    pub fn window(&self) -> Option<RowWindow> {
        self.window
    }

    pub fn is_paged(&self) -> bool {
        self.page.is_some()
    }

    /// Current page number, when paged.
    pub fn page_number(&self) -> Option<u64> {
        self.page
    }

    /// Current page size, when paged.
    pub fn page_size(&self) -> Option<u64> {
        self.page.and(self.window.map(|w| w.limit))
    }
}

/// One page of results plus the counts needed to render a pager.
///
/// `total_pages` is computed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// 1-based page number
    pub page: u64,
    /// Page size
    pub max: u64,
    /// Number of matching rows across all pages
    pub total: u64,
    pub total_pages: u64,
    /// Number of rows on this page
    pub data_size: usize,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(page: u64, max: u64, total: u64, data: Vec<T>) -> Self {
        let total_pages = if max == 0 { 0 } else { total.div_ceil(max) };
        Self {
            page,
            max,
            total,
            total_pages,
            data_size: data.len(),
            data,
        }
    }

    /// Transform the items, keeping the counts.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            max: self.max,
            total: self.total,
            total_pages: self.total_pages,
            data_size: self.data_size,
            data: self.data.into_iter().map(f).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
