//! Sorting a dataset under a resolved plan and slicing out one page
//!
//! The dataset is never reordered in place: a vector of references is
//! sorted instead and only the elements of the requested page are cloned.
//! Sorting is always stable, so records that tie on every step keep their
//! original relative order, and an empty plan returns the input order.

use crate::column::ColumnMap;
use crate::config::PaginateConfig;
use crate::error::SortResult;
use crate::page::{PageRequest, PageResult};
use crate::plan::SortPlan;
use crate::request::SortRequest;
use rayon::prelude::*;
use std::borrow::Borrow;

/// Sort-and-page executor
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginateConfig,
}

impl Paginator {
    pub fn new(config: PaginateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginateConfig {
        &self.config
    }

    /// Resolve `request` against `columns`, then sort and page `data`
    pub fn paginate<T>(
        &self,
        data: &[T],
        request: &SortRequest,
        columns: &ColumnMap<'_, T>,
        page: PageRequest,
    ) -> SortResult<PageResult<T>>
    where
        T: Clone + Sync,
    {
        let plan = SortPlan::resolve(request, columns)?;
        Ok(self.sort_and_page(data, &plan, page))
    }

    /// Return the requested page of `data` ordered by `plan`
    pub fn sort_and_page<T>(
        &self,
        data: &[T],
        plan: &SortPlan<'_, T>,
        page: PageRequest,
    ) -> PageResult<T>
    where
        T: Clone + Sync,
    {
        let page = self.config.effective_page(page);
        let range = page.range(data.len());

        if range.is_empty() {
            tracing::trace!(
                total = data.len(),
                offset = page.offset(),
                limit = page.limit(),
                "page lies outside the dataset, skipping sort"
            );
            return PageResult::new(Vec::new(), page, data.len());
        }

        let mut view: Vec<&T> = data.iter().collect();
        self.sort_view(&mut view, plan);

        let content = view[range].iter().copied().cloned().collect();
        PageResult::new(content, page, data.len())
    }

    /// Owned variant of [`Paginator::sort_and_page`]; sorts `data` itself and
    /// moves the page out without cloning
    pub fn into_page<T>(
        &self,
        mut data: Vec<T>,
        plan: &SortPlan<'_, T>,
        page: PageRequest,
    ) -> PageResult<T>
    where
        T: Send,
    {
        let page = self.config.effective_page(page);
        let total = data.len();
        let range = page.range(total);

        if range.is_empty() {
            return PageResult::new(Vec::new(), page, total);
        }

        self.sort_view(&mut data, plan);
        data.truncate(range.end);
        let content = data.split_off(range.start);
        PageResult::new(content, page, total)
    }

    fn sort_view<E, T>(&self, items: &mut [E], plan: &SortPlan<'_, T>)
    where
        E: Borrow<T> + Send,
    {
        if plan.is_empty() {
            return;
        }

        if self.config.sorts_in_parallel(items.len()) {
            tracing::debug!(len = items.len(), steps = plan.len(), "parallel stable sort");
            items.par_sort_by(|a, b| plan.compare(a.borrow(), b.borrow()));
        } else {
            tracing::debug!(len = items.len(), steps = plan.len(), "stable sort");
            items.sort_by(|a, b| plan.compare(a.borrow(), b.borrow()));
        }
    }
}

/// Sort and page with the default configuration
pub fn sort_and_page<T>(data: &[T], plan: &SortPlan<'_, T>, page: PageRequest) -> PageResult<T>
where
    T: Clone + Sync,
{
    Paginator::default().sort_and_page(data, plan, page)
}
