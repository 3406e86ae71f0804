//! Resolution of a sort request into an ordered list of comparators

use crate::column::{ColumnMap, KeyCompare};
use crate::config::SortOrder;
use crate::error::{SortError, SortResult};
use crate::request::SortRequest;
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

/// One level of a multi-column ordering
pub struct SortStep<'m, T> {
    field: &'m str,
    compare: &'m KeyCompare<'m, T>,
    order: SortOrder,
}

impl<'m, T> SortStep<'m, T> {
    pub fn new(field: &'m str, compare: &'m KeyCompare<'m, T>, order: SortOrder) -> Self {
        Self {
            field,
            compare,
            order,
        }
    }

    pub fn field(&self) -> &'m str {
        self.field
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Compare two records on this step's column, honoring its direction
    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.order.apply((self.compare)(a, b))
    }
}

impl<T> Clone for SortStep<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SortStep<'_, T> {}

impl<T> fmt::Debug for SortStep<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortStep")
            .field("field", &self.field)
            .field("order", &self.order)
            .finish()
    }
}

/// Resolved sort steps, borrowed from a [`ColumnMap`] for the duration of one call
pub struct SortPlan<'m, T> {
    steps: Vec<SortStep<'m, T>>,
}

impl<'m, T> SortPlan<'m, T> {
    /// Look up every requested column. Fails on the first unknown name and
    /// never returns a partial plan.
    pub fn resolve<'a>(
        request: &SortRequest,
        columns: &'m ColumnMap<'a, T>,
    ) -> SortResult<Self> {
        let steps = request
            .iter()
            .map(|param| {
                columns
                    .get_entry(&param.field)
                    .map(|(field, compare)| SortStep::new(field, compare, param.order()))
                    .ok_or_else(|| SortError::unknown_sort_column(&param.field, columns.names()))
            })
            .collect::<SortResult<Vec<_>>>()?;

        tracing::debug!(
            steps = %steps.iter().map(|s| format!("{},{}", s.field, s.order)).join(";"),
            "resolved sort plan"
        );

        Ok(Self { steps })
    }

    /// A plan with no steps; every pair of records compares equal
    pub fn unsorted() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn from_steps(steps: Vec<SortStep<'m, T>>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[SortStep<'m, T>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Composite comparison: the first step that does not tie decides
    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.steps
            .iter()
            .fold(Ordering::Equal, |ordering, step| {
                ordering.then_with(|| step.compare(a, b))
            })
    }

    /// Whether `data` is already ordered under this plan
    pub fn is_sorted(&self, data: &[T]) -> bool {
        data.iter()
            .tuple_windows()
            .all(|(a, b)| self.compare(a, b) != Ordering::Greater)
    }

    /// Index of the first element that is out of order, if any
    pub fn first_unsorted(&self, data: &[T]) -> Option<usize> {
        data.iter()
            .tuple_windows()
            .position(|(a, b)| self.compare(a, b) == Ordering::Greater)
            .map(|i| i + 1)
    }
}

impl<T> fmt::Debug for SortPlan<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.steps).finish()
    }
}
