use super::{Operator, Query};

use quarry_core::stmt::Value;

/// How a predicate chains onto the one before it.
///
/// The connector on the first predicate of a chain is never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// One node of a predicate tree.
#[derive(Debug, Clone)]
pub enum Cond {
    /// `column <op> ?`
    Basic {
        column: String,
        op: Operator,
        value: Value,
    },

    /// `left <op> right`, no binding
    Column {
        left: String,
        op: Operator,
        right: String,
    },

    /// `column [NOT] IN (?, ...)`
    ///
    /// An empty list collapses to a constant predicate at render time.
    In {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// `column [NOT] IN (SELECT ...)`
    InQuery {
        column: String,
        query: Box<Query>,
        negated: bool,
    },

    /// `column IS [NOT] NULL`
    Null { column: String, negated: bool },

    /// `column [NOT] BETWEEN ? AND ?`
    Between {
        column: String,
        low: Value,
        high: Value,
        negated: bool,
    },

    /// `[NOT] EXISTS (SELECT ...)`
    Exists { query: Box<Query>, negated: bool },

    /// A parenthesized sub-chain built by a grouping closure.
    Nested { query: Box<Query> },

    /// Verbatim SQL fragment with its bindings.
    ///
    /// The fragment's `?` placeholders must match the binding count; the
    /// fragment is spliced as written.
    Raw { sql: String, bindings: Vec<Value> },
}
