//! Mapping between entity structs and SQLite rows.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};

/// An entity stored as one row of a SQLite table.
///
/// Reading goes through `sqlx::FromRow`; writing goes through [`columns`],
/// which lists every column the entity knows about. A column whose value is
/// [`Value::Null`] is treated as "not set": it is left out of inserts so that
/// defaults (and `INTEGER PRIMARY KEY` assignment) apply, and it is never
/// written by updates.
///
/// [`columns`]: SqlEntity::columns
pub trait SqlEntity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    /// Table holding the entity.
    const TABLE: &'static str;

    /// Primary key column.
    const KEY_COLUMN: &'static str = "id";

    /// Column name and value pairs, key column included.
    fn columns(&self) -> Vec<(&'static str, Value)>;

    /// The set (non-null) columns, key column included.
    fn set_columns(&self) -> Vec<(&'static str, Value)> {
        self.columns()
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect()
    }

    /// The set columns an update may write: key column excluded.
    fn changes(&self) -> Vec<(&'static str, Value)> {
        self.set_columns()
            .into_iter()
            .filter(|(column, _)| *column != Self::KEY_COLUMN)
            .collect()
    }
}

/// A SQLite storage value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`; the column is not set.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Whether the value means "not set".
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Append this value to `builder` as a bound parameter.
    pub(crate) fn push_bind(self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Self::Null => builder.push_bind(None::<i64>),
            Self::Integer(v) => builder.push_bind(v),
            Self::Real(v) => builder.push_bind(v),
            Self::Text(v) => builder.push_bind(v),
            Self::Blob(v) => builder.push_bind(v),
        };
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(sqlx::FromRow)]
    struct Widget {
        id: Option<i64>,
        label: Option<String>,
        weight: Option<f64>,
    }

    impl SqlEntity for Widget {
        const TABLE: &'static str = "widgets";

        fn columns(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", self.id.into()),
                ("label", self.label.clone().into()),
                ("weight", self.weight.into()),
            ]
        }
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".to_string()));
        assert_eq!(Value::from(true), Value::Integer(1));
    }

    #[test]
    fn test_set_columns_skip_nulls() {
        let widget = Widget {
            id: None,
            label: Some("bolt".to_string()),
            weight: None,
        };
        let names: Vec<_> = widget.set_columns().into_iter().map(|(c, _)| c).collect();
        assert_eq!(names, vec!["label"]);
    }

    #[test]
    fn test_changes_exclude_key() {
        let widget = Widget {
            id: Some(3),
            label: Some("nut".to_string()),
            weight: Some(0.5),
        };
        let names: Vec<_> = widget.changes().into_iter().map(|(c, _)| c).collect();
        assert_eq!(names, vec!["label", "weight"]);
    }
}
