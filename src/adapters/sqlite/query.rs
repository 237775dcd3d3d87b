//! Relational translation of [`Query`].

use sqlx::{QueryBuilder, Sqlite};

use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::models::Query;

/// Quote an SQL identifier with grave accents, doubling any embedded one.
///
/// SQLite reads a double-quoted name that matches no column as a string
/// literal; a grave-quoted name is always an identifier, so unknown columns
/// fail instead of sorting or grouping by a constant.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Whether `name` is a plain column name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_ident(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn checked_ident(name: &str) -> RepositoryResult<String> {
    if is_valid_ident(name) {
        Ok(quote_ident(name))
    } else {
        Err(RepositoryError::Unsupported {
            backend: "sqlite",
            operation: "find",
            reason: format!("invalid column name {name:?}"),
        })
    }
}

impl Query {
    /// Append the `GROUP BY`, `ORDER BY`, `LIMIT` and `OFFSET` clauses this
    /// query asks for.
    ///
    /// Each clause is attached only when its field is set: grouping when a
    /// group column is present, ordering when the order column is non-empty,
    /// the limit when the page size is positive, and the offset when the page
    /// index is not negative.
    ///
    /// # Errors
    /// Returns [`RepositoryError::Unsupported`] when the group or order column
    /// is not a plain column name. Nothing is appended in that case.
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> RepositoryResult<()> {
        let group_column = self.group_column().map(checked_ident).transpose()?;
        let order_by = self.order_by();
        let order_column = if order_by.is_set() {
            Some(checked_ident(&order_by.column)?)
        } else {
            None
        };

        if let Some(column) = group_column {
            builder.push(" GROUP BY ").push(column);
        }
        if let Some(column) = order_column {
            builder
                .push(" ORDER BY ")
                .push(column)
                .push(" ")
                .push(order_by.direction());
        }
        if self.is_limited() {
            builder.push(" LIMIT ").push_bind(self.page().limit());
        }
        if self.is_offset() {
            // SQLite only accepts OFFSET after a LIMIT clause
            if !self.is_limited() {
                builder.push(" LIMIT -1");
            }
            builder.push(" OFFSET ").push_bind(self.page().offset());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{OrderBy, Page};

    fn render(query: &Query) -> RepositoryResult<String> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM `people`");
        query.push_sql(&mut builder)?;
        Ok(builder.sql().to_string())
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("name"), "`name`");
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_is_valid_ident() {
        assert!(is_valid_ident("first_name"));
        assert!(is_valid_ident("_rowid2"));
        assert!(!is_valid_ident(""));
        assert!(!is_valid_ident("2fast"));
        assert!(!is_valid_ident("name desc"));
        assert!(!is_valid_ident("name; DROP TABLE people"));
        assert!(!is_valid_ident("we\"ird"));
    }

    #[test]
    fn test_default_query_only_offsets() {
        assert_eq!(
            render(&Query::new()).unwrap(),
            "SELECT * FROM `people` LIMIT -1 OFFSET ?"
        );
    }

    #[test]
    fn test_negative_index_skips_offset() {
        let query = Query::new().with_page(Page::new(-1, 0));
        assert_eq!(render(&query).unwrap(), "SELECT * FROM `people`");
    }

    #[test]
    fn test_full_query() {
        let query = Query::new()
            .with_page(Page::new(2, 10))
            .with_order_by(OrderBy::desc("first_name"))
            .with_group_by("last_name");
        assert_eq!(
            render(&query).unwrap(),
            "SELECT * FROM `people` GROUP BY `last_name` ORDER BY `first_name` desc LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn test_order_without_page() {
        let query = Query::new()
            .with_page(Page::new(-1, 0))
            .with_order_by(OrderBy::asc("first_name"));
        assert_eq!(
            render(&query).unwrap(),
            "SELECT * FROM `people` ORDER BY `first_name` asc"
        );
    }

    #[test]
    fn test_malformed_columns_are_rejected() {
        let order = Query::new().with_order_by(OrderBy::asc("first_name; --"));
        let err = render(&order).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Unsupported { backend: "sqlite", operation: "find", .. }
        ));

        let group = Query::new().with_group_by("last name");
        assert!(render(&group).unwrap_err().is_unsupported());
    }
}
