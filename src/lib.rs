//! Multi-column sorting and pagination of in-memory collections
//!
//! Callers describe the sortable columns of a record type once, as a
//! [`ColumnMap`] from column name to key function. A paging request then
//! names columns dynamically; the request is resolved against the map into
//! a [`SortPlan`], the dataset is stably sorted by that plan and a single
//! page is returned together with the total element count.
//!
//! The core ([`request`], [`column`], [`plan`], [`paginate`], [`page`])
//! performs no I/O and keeps no state between calls. [`table`] and [`args`]
//! exist for the `sort-page` binary: they load delimited text from files or
//! stdin and adapt it to the core, and sit outside the sort-and-page pipeline.
//!
//! ```
//! use sort_paginate::{paginate, ColumnMap, PageRequest, SortRequest};
//!
//! #[derive(Clone)]
//! struct City {
//!     name: &'static str,
//!     population: u32,
//! }
//!
//! let cities = vec![
//!     City { name: "Lyon", population: 522_000 },
//!     City { name: "Paris", population: 2_102_000 },
//!     City { name: "Nice", population: 342_000 },
//! ];
//!
//! let columns = ColumnMap::<City>::new()
//!     .column("name", |c| c.name)
//!     .column("population", |c| c.population);
//!
//! let request = SortRequest::from_directives([("population", false)]);
//! let page = paginate(&cities, &request, &columns, PageRequest::of_size(2)).unwrap();
//!
//! let names: Vec<&str> = page.iter().map(|c| c.name).collect();
//! assert_eq!(names, ["Paris", "Lyon"]);
//! assert_eq!(page.total_elements(), 3);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod error;
pub mod config;

pub mod request;
pub mod column;
pub mod plan;
pub mod page;
pub mod paginate;
pub mod table;
pub mod args;

// Re-export commonly used types
pub use column::ColumnMap;
pub use config::{KeyMode, PaginateConfig, SortOrder, TableConfig};
pub use error::{SortError, SortResult};
pub use page::{PageRequest, PageResult};
pub use paginate::{sort_and_page, Paginator};
pub use plan::{SortPlan, SortStep};
pub use request::{SortDirective, SortParam, SortRequest};

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const SORT_FAILURE: i32 = 2;

/// Resolve, sort and page in one call with the default configuration
pub fn paginate<T>(
    data: &[T],
    request: &SortRequest,
    columns: &ColumnMap<'_, T>,
    page: PageRequest,
) -> SortResult<PageResult<T>>
where
    T: Clone + Sync,
{
    Paginator::default().paginate(data, request, columns, page)
}
