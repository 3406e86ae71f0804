//! Page requests and the pages returned for them

use serde::{Deserialize, Serialize};

/// Page size used when a request does not name one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Contiguous slice of a sorted dataset, located by offset and limit.
///
/// A limit of zero is valid and always yields an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    offset: usize,
    limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Zero-based page `page_number` of `page_size` elements
    pub fn of(page_number: usize, page_size: usize) -> Self {
        Self::new(page_number.saturating_mul(page_size), page_size)
    }

    /// First page of `page_size` elements
    pub fn of_size(page_size: usize) -> Self {
        Self::of(0, page_size)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Zero-based page index this request falls in
    pub fn page_number(&self) -> usize {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit
        }
    }

    /// Same page size, moved to `page_number`
    pub fn with_page(self, page_number: usize) -> Self {
        Self::of(page_number, self.limit)
    }

    pub fn next(self) -> Self {
        Self::new(self.offset.saturating_add(self.limit), self.limit)
    }

    pub fn previous_or_first(self) -> Self {
        Self::new(self.offset.saturating_sub(self.limit), self.limit)
    }

    pub fn first(self) -> Self {
        Self::new(0, self.limit)
    }

    /// Cap the limit at `max`, keeping the offset
    pub fn clamp_limit(self, max: usize) -> Self {
        Self::new(self.offset, self.limit.min(max))
    }

    /// Index range this request covers in a dataset of `len` elements
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        let end = self.offset.saturating_add(self.limit).min(len);
        start..end
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of_size(DEFAULT_PAGE_SIZE)
    }
}

/// One page of sorted results plus the size of the whole dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    content: Vec<T>,
    total_elements: usize,
    page: PageRequest,
}

impl<T> PageResult<T> {
    pub fn new(content: Vec<T>, page: PageRequest, total_elements: usize) -> Self {
        Self {
            content,
            total_elements,
            page,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Size of the unsliced dataset
    pub fn total_elements(&self) -> usize {
        self.total_elements
    }

    pub fn page_request(&self) -> PageRequest {
        self.page
    }

    /// Number of elements on this page
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn page_number(&self) -> usize {
        self.page.page_number()
    }

    /// Pages needed to cover the dataset at this page size
    pub fn total_pages(&self) -> usize {
        match self.page.limit() {
            0 => 1,
            limit => self.total_elements.div_ceil(limit),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number() < self.total_pages().saturating_sub(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page_number() > 0
    }

    pub fn is_first(&self) -> bool {
        !self.has_previous()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Transform the content, keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page: self.page,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }
}

impl<T> IntoIterator for PageResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PageResult<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}
