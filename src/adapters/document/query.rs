//! Document-store translation of [`Query`].

use bson::Document;
use mongodb::options::FindOptions;

use crate::domain::models::Query;

impl Query {
    /// Build the MongoDB find options this query asks for.
    ///
    /// The limit applies when the page size is positive, the skip when the
    /// page index is not negative, and the sort when an order column is set.
    /// Document stores have no grouping here; a group column is ignored.
    pub fn find_options(&self) -> FindOptions {
        let mut options = FindOptions::default();
        if self.is_limited() {
            options.limit = Some(self.page().limit());
        }
        if self.is_offset() {
            options.skip = Some(u64::try_from(self.page().offset()).unwrap_or_default());
        }
        let order_by = self.order_by();
        if order_by.is_set() {
            let (column, direction) = order_by.document_sort();
            let mut sort = Document::new();
            sort.insert(column, direction);
            options.sort = Some(sort);
        }
        if let Some(column) = self.group_column() {
            tracing::debug!(group_column = column, "grouping is not applied on document stores");
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{OrderBy, Page};
    use bson::doc;

    #[test]
    fn test_default_query() {
        let options = Query::new().find_options();
        assert_eq!(options.limit, None);
        assert_eq!(options.skip, Some(0));
        assert_eq!(options.sort, None);
    }

    #[test]
    fn test_paged_sorted_query() {
        let query = Query::new()
            .with_page(Page::new(3, 20))
            .with_order_by(OrderBy::desc("created_at"));
        let options = query.find_options();
        assert_eq!(options.limit, Some(20));
        assert_eq!(options.skip, Some(40));
        assert_eq!(options.sort, Some(doc! { "created_at": -1 }));
    }

    #[test]
    fn test_negative_index_skips_nothing() {
        let options = Query::new().with_page(Page::new(-2, 5)).find_options();
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.skip, None);
    }

    #[test]
    fn test_group_column_is_ignored() {
        let grouped = Query::new()
            .with_order_by(OrderBy::asc("name"))
            .with_group_by("team")
            .find_options();
        let plain = Query::new().with_order_by(OrderBy::asc("name")).find_options();
        assert_eq!(grouped.sort, plain.sort);
        assert_eq!(grouped.limit, plain.limit);
        assert_eq!(grouped.skip, plain.skip);
    }
}
