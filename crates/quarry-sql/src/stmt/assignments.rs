use quarry_core::stmt::Value;

/// The SET list of an UPDATE statement.
///
/// Preserves insertion order. A column assigns either a bound value or a raw
/// right-hand expression (e.g. `version + 1`).
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    pub(crate) items: Vec<Assign>,
}

#[derive(Debug, Clone)]
pub(crate) enum Assign {
    Value { column: String, value: Value },
    Expr { column: String, expr: String },
}

impl Assignments {
    pub fn new() -> Assignments {
        Assignments::default()
    }

    /// Assigns a bound value: `column = ?`.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.items.push(Assign::Value {
            column: super::column_name(column),
            value: value.into(),
        });
    }

    /// Assigns a raw right-hand expression: `column = <expr>`.
    ///
    /// The expression is spliced as written and may reference the stored
    /// value, as in `set_expr("version", "version + 1")`.
    pub fn set_expr(&mut self, column: impl Into<String>, expr: impl Into<String>) {
        self.items.push(Assign::Expr {
            column: super::column_name(column),
            expr: expr.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
