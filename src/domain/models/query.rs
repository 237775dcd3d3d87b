//! Backend-agnostic selection descriptor: pagination, ordering and grouping.
//!
//! A [`Query`] carries no knowledge of the store it will run against. Each
//! adapter contributes its own translation as an inherent method on `Query`
//! (see `adapters::sqlite::query` and `adapters::document::query`).

use std::fmt;

/// A page of results, addressed by a 1-based index and a page length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Page {
    /// Page number, starting at 1.
    pub index: i64,
    /// Number of items per page.
    pub size: i64,
}

impl Page {
    /// Create a page from a 1-based index and a page length.
    pub const fn new(index: i64, size: i64) -> Self {
        Self { index, size }
    }

    /// Convert the page length into a store limit. Never less than 1.
    pub const fn limit(&self) -> i64 {
        if self.size < 1 {
            1
        } else {
            self.size
        }
    }

    /// Convert the page number into a store offset.
    ///
    /// Pages before the first one start at offset 0. A negative size counts
    /// as 0, so the offset is never negative.
    pub fn offset(&self) -> i64 {
        if self.index < 1 {
            return 0;
        }
        (self.index - 1).saturating_mul(self.size.max(0))
    }
}

/// Sort results by a column, ascending unless `desc` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OrderBy {
    /// Column used as the sort reference. Empty means "unordered".
    pub column: String,
    /// Sort in descending order.
    pub desc: bool,
}

impl OrderBy {
    /// Sort by `column`, descending when `desc` is set.
    pub fn new(column: impl Into<String>, desc: bool) -> Self {
        Self {
            column: column.into(),
            desc,
        }
    }

    /// Ascending sort by `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, false)
    }

    /// Descending sort by `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, true)
    }

    /// Whether a sort column was given at all.
    pub fn is_set(&self) -> bool {
        !self.column.is_empty()
    }

    /// `"asc"` or `"desc"`.
    pub const fn direction(&self) -> &'static str {
        if self.desc {
            "desc"
        } else {
            "asc"
        }
    }

    /// SQL rendering, e.g. `"name asc"`.
    pub fn sql(&self) -> String {
        format!("{} {}", self.column, self.direction())
    }

    /// Document-store rendering: the column and `1` (ascending) or `-1`.
    pub fn document_sort(&self) -> (&str, i32) {
        (self.column.as_str(), if self.desc { -1 } else { 1 })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction())
    }
}

/// Selection over a single entity collection.
///
/// Two queries are equal iff page, ordering and group column are all equal,
/// which makes `Query` usable as an exact-match cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Query {
    page: Page,
    order_by: OrderBy,
    group_column: Option<String>,
}

impl Query {
    /// An unpaginated, unordered, ungrouped query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the page.
    #[must_use]
    pub const fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Replace the ordering.
    #[must_use]
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    /// Group results by `column`. An empty column clears the grouping.
    #[must_use]
    pub fn with_group_by(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.group_column = (!column.is_empty()).then_some(column);
        self
    }

    /// The requested page.
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// The requested ordering; unset when its column is empty.
    pub const fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    /// The group column, if any.
    pub fn group_column(&self) -> Option<&str> {
        self.group_column.as_deref()
    }

    /// Whether a limit should be applied (`size > 0`).
    pub const fn is_limited(&self) -> bool {
        self.page.size > 0
    }

    /// Whether an offset should be applied (`index >= 0`).
    pub const fn is_offset(&self) -> bool {
        self.page.index >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_page_limit_clamps_to_one() {
        assert_eq!(Page::new(1, 0).limit(), 1);
        assert_eq!(Page::new(1, -7).limit(), 1);
        assert_eq!(Page::new(1, 25).limit(), 25);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(0, 10).offset(), 0);
        assert_eq!(Page::new(-3, 10).offset(), 0);
        assert_eq!(Page::new(1, 10).offset(), 0);
        assert_eq!(Page::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_offset_negative_size() {
        assert_eq!(Page::new(4, -5).offset(), 0);
    }

    #[test]
    fn test_page_offset_saturates() {
        assert_eq!(Page::new(i64::MAX, i64::MAX).offset(), i64::MAX);
    }

    #[test]
    fn test_order_by_sql() {
        assert_eq!(OrderBy::new("name", false).sql(), "name asc");
        assert_eq!(OrderBy::new("name", true).sql(), "name desc");
        assert_eq!(OrderBy::desc("created_at").to_string(), "created_at desc");
    }

    #[test]
    fn test_order_by_document_sort() {
        assert_eq!(OrderBy::asc("name").document_sort(), ("name", 1));
        assert_eq!(OrderBy::desc("name").document_sort(), ("name", -1));
    }

    #[test]
    fn test_query_defaults() {
        let query = Query::new();
        assert!(!query.is_limited());
        assert!(query.is_offset());
        assert!(!query.order_by().is_set());
        assert_eq!(query.group_column(), None);
    }

    #[test]
    fn test_empty_group_column_is_none() {
        let query = Query::new().with_group_by("last_name").with_group_by("");
        assert_eq!(query.group_column(), None);
    }

    #[test]
    fn test_query_equality_is_structural() {
        let a = Query::new()
            .with_page(Page::new(2, 10))
            .with_order_by(OrderBy::asc("name"))
            .with_group_by("team");
        let b = Query::new()
            .with_group_by("team")
            .with_order_by(OrderBy::asc("name"))
            .with_page(Page::new(2, 10));
        let c = b.clone().with_order_by(OrderBy::desc("name"));

        assert_eq!(a, b);
        assert_ne!(a, c);

        let keys: HashSet<Query> = [a, b, c].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }
}
