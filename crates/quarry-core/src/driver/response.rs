use crate::stmt::Row;

/// Result of executing one statement.
#[derive(Debug)]
pub struct Response {
    pub rows: Rows,

    /// Key assigned by the database for an inserted row, when the driver
    /// reports one.
    pub last_insert_id: Option<u64>,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows affected by the operation
    Count(u64),

    /// Operation result, as materialized rows
    Values(Vec<Row>),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
            last_insert_id: None,
        }
    }

    pub fn values(rows: Vec<Row>) -> Self {
        Self {
            rows: Rows::Values(rows),
            last_insert_id: None,
        }
    }

    pub fn with_last_insert_id(mut self, id: Option<u64>) -> Self {
        self.last_insert_id = id;
        self
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    /// Returns the affected-row count.
    ///
    /// Panics when the response holds rows; callers only reach this after
    /// executing a statement that cannot return rows.
    #[track_caller]
    pub fn into_count(self) -> u64 {
        match self {
            Rows::Count(count) => count,
            _ => panic!("expected a row count response; rows={self:#?}"),
        }
    }

    /// Returns the materialized rows.
    ///
    /// Panics when the response holds a count; callers only reach this after
    /// executing a statement that returns rows.
    #[track_caller]
    pub fn into_values(self) -> Vec<Row> {
        match self {
            Self::Values(rows) => rows,
            _ => panic!("expected a row-set response; rows={self:#?}"),
        }
    }
}
