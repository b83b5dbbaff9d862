use super::{Connector, Operator};

use quarry_core::stmt::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// A join against one table with its ON conditions.
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) table: String,
    pub(crate) kind: JoinKind,
    pub(crate) on: OnClause,
}

impl Join {
    pub(crate) fn new(table: impl Into<String>, kind: JoinKind, on: OnClause) -> Join {
        let join = Join {
            table: super::table_name(table),
            kind,
            on,
        };
        assert!(
            !join.on.conds.is_empty(),
            "join on {:?} has no ON condition",
            join.table
        );
        join
    }
}

/// One condition inside an ON clause.
#[derive(Debug, Clone)]
pub(crate) enum JoinCond {
    /// `left <op> right`, both columns
    On {
        left: String,
        op: Operator,
        right: String,
    },

    /// `column <op> ?`
    Where {
        column: String,
        op: Operator,
        value: Value,
    },

    /// `column IS [NOT] NULL`
    WhereNull { column: String, negated: bool },
}

/// Builds the ON conditions of a join.
///
/// Passed to the closure of `Query::join_with`; conditions chain with the
/// same connector rules as the WHERE chain.
#[derive(Debug, Clone, Default)]
pub struct OnClause {
    pub(crate) conds: Vec<(Connector, JoinCond)>,
}

impl OnClause {
    pub(crate) fn new() -> OnClause {
        OnClause::default()
    }

    fn push(mut self, connector: Connector, cond: JoinCond) -> Self {
        self.conds.push((connector, cond));
        self
    }

    /// `left <op> right` column comparison, chained with AND.
    pub fn on(
        self,
        left: impl Into<String>,
        op: impl AsRef<str>,
        right: impl Into<String>,
    ) -> Self {
        let cond = JoinCond::On {
            left: super::column_name(left),
            op: Operator::parse(op),
            right: super::column_name(right),
        };
        self.push(Connector::And, cond)
    }

    /// `left = right` column comparison, chained with AND.
    pub fn on_eq(self, left: impl Into<String>, right: impl Into<String>) -> Self {
        let cond = JoinCond::On {
            left: super::column_name(left),
            op: Operator::Eq,
            right: super::column_name(right),
        };
        self.push(Connector::And, cond)
    }

    /// `left <op> right` column comparison, chained with OR.
    pub fn or_on(
        self,
        left: impl Into<String>,
        op: impl AsRef<str>,
        right: impl Into<String>,
    ) -> Self {
        let cond = JoinCond::On {
            left: super::column_name(left),
            op: Operator::parse(op),
            right: super::column_name(right),
        };
        self.push(Connector::Or, cond)
    }

    /// `column = ?` against a bound value, chained with AND.
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let cond = JoinCond::Where {
            column: super::column_name(column),
            op: Operator::Eq,
            value: value.into(),
        };
        self.push(Connector::And, cond)
    }

    /// `column = ?` against a bound value, chained with OR.
    pub fn or_where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let cond = JoinCond::Where {
            column: super::column_name(column),
            op: Operator::Eq,
            value: value.into(),
        };
        self.push(Connector::Or, cond)
    }

    /// `column IS NULL`, chained with AND.
    pub fn where_null(self, column: impl Into<String>) -> Self {
        let cond = JoinCond::WhereNull {
            column: super::column_name(column),
            negated: false,
        };
        self.push(Connector::And, cond)
    }

    /// `column IS NOT NULL`, chained with AND.
    pub fn where_not_null(self, column: impl Into<String>) -> Self {
        let cond = JoinCond::WhereNull {
            column: super::column_name(column),
            negated: true,
        };
        self.push(Connector::And, cond)
    }
}
