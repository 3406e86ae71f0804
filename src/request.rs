//! Sort directives as they arrive from a paging request

use crate::config::SortOrder;
use crate::error::{SortError, SortResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One requested sort column and its direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortParam {
    pub field: String,
    pub ascending: bool,
}

impl SortParam {
    pub fn new(field: impl Into<String>, ascending: bool) -> Self {
        Self {
            field: field.into(),
            ascending,
        }
    }

    /// Ascending sort on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, true)
    }

    /// Descending sort on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, false)
    }

    pub fn order(&self) -> SortOrder {
        SortOrder::from_ascending(self.ascending)
    }
}

/// Parses the query-string form `field[,asc|desc]`. The direction is
/// case-insensitive and defaults to ascending.
impl FromStr for SortParam {
    type Err = SortError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (field, order) = match spec.rsplit_once(',') {
            Some((field, direction)) => {
                let order = direction
                    .parse::<SortOrder>()
                    .map_err(|_| SortError::invalid_sort_directive(spec))?;
                (field, order)
            }
            None => (spec, SortOrder::Ascending),
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(SortError::invalid_sort_directive(spec));
        }

        Ok(Self::new(field, order.is_ascending()))
    }
}

impl std::fmt::Display for SortParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.field, self.order())
    }
}

/// Anything that names a sort field and a direction
pub trait SortDirective {
    fn field(&self) -> &str;
    fn is_ascending(&self) -> bool;
}

impl SortDirective for SortParam {
    fn field(&self) -> &str {
        &self.field
    }

    fn is_ascending(&self) -> bool {
        self.ascending
    }
}

impl<D: SortDirective + ?Sized> SortDirective for &D {
    fn field(&self) -> &str {
        (**self).field()
    }

    fn is_ascending(&self) -> bool {
        (**self).is_ascending()
    }
}

impl<S: AsRef<str>> SortDirective for (S, bool) {
    fn field(&self) -> &str {
        self.0.as_ref()
    }

    fn is_ascending(&self) -> bool {
        self.1
    }
}

impl<S: AsRef<str>> SortDirective for (S, SortOrder) {
    fn field(&self) -> &str {
        self.0.as_ref()
    }

    fn is_ascending(&self) -> bool {
        self.1.is_ascending()
    }
}

/// Ordered list of sort directives. Earlier entries take precedence; later
/// entries only break ties. Duplicate fields are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortRequest {
    params: Vec<SortParam>,
}

impl SortRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request with no sort columns; the dataset keeps its original order
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Normalize externally supplied directives, preserving their order
    pub fn from_directives<I>(directives: I) -> Self
    where
        I: IntoIterator,
        I::Item: SortDirective,
    {
        directives
            .into_iter()
            .map(|directive| SortParam::new(directive.field(), directive.is_ascending()))
            .collect()
    }

    /// Parse a list of `field[,asc|desc]` specs
    pub fn from_specs<I, S>(specs: I) -> SortResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        specs
            .into_iter()
            .map(|spec| spec.as_ref().parse::<SortParam>())
            .collect()
    }

    /// Append a tie-breaking column
    pub fn then(mut self, param: SortParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(&self) -> &[SortParam] {
        &self.params
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SortParam> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FromIterator<SortParam> for SortRequest {
    fn from_iter<I: IntoIterator<Item = SortParam>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SortRequest {
    type Item = &'a SortParam;
    type IntoIter = std::slice::Iter<'a, SortParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl IntoIterator for SortRequest {
    type Item = SortParam;
    type IntoIter = std::vec::IntoIter<SortParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}
