use indexmap::IndexMap;
use quarry_core::stmt::Value;

/// A single- or multi-row INSERT statement.
#[derive(Debug, Clone)]
pub struct Insert {
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
    pub(crate) ignore: bool,
    pub(crate) on_duplicate: IndexMap<String, OnDuplicate>,
}

/// Right-hand side of one `ON DUPLICATE KEY UPDATE` assignment.
#[derive(Debug, Clone)]
pub enum OnDuplicate {
    /// `col = VALUES(col)`: keep the incoming row's value.
    Values,

    /// `col = ?`: a bound constant.
    Value(Value),

    /// `col = <expr>`: raw expression, may combine with the stored value,
    /// as in `qty + VALUES(qty)`.
    Expr(String),
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Insert {
        Insert {
            table: super::table_name(table),
            columns: vec![],
            rows: vec![],
            ignore: false,
            on_duplicate: IndexMap::new(),
        }
    }

    /// Sets the column list. Every row must match its arity.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns
            .into_iter()
            .map(|column| super::column_name(column))
            .collect();
        assert!(!self.columns.is_empty(), "insert requires columns");
        self
    }

    /// Appends one row of values, positionally matching the column list.
    pub fn row(mut self, values: Vec<Value>) -> Self {
        assert_eq!(
            values.len(),
            self.columns.len(),
            "row arity does not match column list"
        );
        self.rows.push(values);
        self
    }

    /// Renders as `INSERT IGNORE`.
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Adds an `ON DUPLICATE KEY UPDATE` assignment. Repeated calls for the
    /// same column replace the expression, keeping the column's position.
    pub fn on_duplicate(mut self, column: impl Into<String>, update: OnDuplicate) -> Self {
        self.on_duplicate.insert(super::column_name(column), update);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
