use super::{Cond, Connector, Join, JoinKind, OnClause, Operator};

use quarry_core::stmt::Value;

/// A composable SELECT description.
///
/// Every method takes `self` and returns the updated builder; nothing here
/// touches a database. Compilation to `(sql, bindings)` happens in
/// [`to_sql`](Query::to_sql) and its derived forms.
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) wheres: Vec<(Connector, Cond)>,
    pub(crate) groups: Vec<String>,
    pub(crate) orders: Vec<(String, Direction)>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) unions: Vec<(bool, Query)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Query {
    /// Starts a query against one table.
    pub fn table(name: impl Into<String>) -> Query {
        Query {
            table: super::table_name(name),
            columns: vec![],
            joins: vec![],
            wheres: vec![],
            groups: vec![],
            orders: vec![],
            limit: None,
            offset: None,
            unions: vec![],
        }
    }

    /// Replaces the projection. An empty builder selects `*`.
    pub fn select(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns
            .into_iter()
            .map(|column| super::column_name(column))
            .collect();
        self
    }

    fn push_where(mut self, connector: Connector, cond: Cond) -> Self {
        self.wheres.push((connector, cond));
        self
    }

    /// `column = ?`, chained with AND.
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_op(Connector::And, column, Operator::Eq, value)
    }

    /// `column = ?`, chained with OR.
    pub fn or_where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_op(Connector::Or, column, Operator::Eq, value)
    }

    /// `column <op> ?`, chained with AND. The operator string is parsed
    /// case-insensitively; an unknown operator panics.
    pub fn where_op(
        self,
        column: impl Into<String>,
        op: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> Self {
        self.push_op(Connector::And, column, Operator::parse(op), value)
    }

    /// `column <op> ?`, chained with OR.
    pub fn or_where_op(
        self,
        column: impl Into<String>,
        op: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> Self {
        self.push_op(Connector::Or, column, Operator::parse(op), value)
    }

    fn push_op(
        self,
        connector: Connector,
        column: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Self {
        let cond = Cond::Basic {
            column: super::column_name(column),
            op,
            value: value.into(),
        };
        self.push_where(connector, cond)
    }

    /// `left <op> right` comparing two columns, no binding.
    pub fn where_column(
        self,
        left: impl Into<String>,
        op: impl AsRef<str>,
        right: impl Into<String>,
    ) -> Self {
        let cond = Cond::Column {
            left: super::column_name(left),
            op: Operator::parse(op),
            right: super::column_name(right),
        };
        self.push_where(Connector::And, cond)
    }

    /// `left = right` comparing two columns.
    pub fn where_column_eq(self, left: impl Into<String>, right: impl Into<String>) -> Self {
        let cond = Cond::Column {
            left: super::column_name(left),
            op: Operator::Eq,
            right: super::column_name(right),
        };
        self.push_where(Connector::And, cond)
    }

    /// `column IN (?, ...)`, chained with AND.
    ///
    /// An empty list compiles to a constant-false predicate.
    pub fn where_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push_in(Connector::And, column, values, false)
    }

    /// `column NOT IN (?, ...)`, chained with AND.
    ///
    /// An empty list compiles to a constant-true predicate.
    pub fn where_not_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push_in(Connector::And, column, values, true)
    }

    /// `column IN (?, ...)`, chained with OR.
    pub fn or_where_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push_in(Connector::Or, column, values, false)
    }

    /// `column NOT IN (?, ...)`, chained with OR.
    pub fn or_where_not_in(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push_in(Connector::Or, column, values, true)
    }

    fn push_in(
        self,
        connector: Connector,
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
        negated: bool,
    ) -> Self {
        let cond = Cond::In {
            column: super::column_name(column),
            values: values.into_iter().map(Into::into).collect(),
            negated,
        };
        self.push_where(connector, cond)
    }

    /// `column IN (SELECT ...)` with a built subquery.
    pub fn where_in_query(self, column: impl Into<String>, query: Query) -> Self {
        let cond = Cond::InQuery {
            column: super::column_name(column),
            query: Box::new(query),
            negated: false,
        };
        self.push_where(Connector::And, cond)
    }

    /// `column NOT IN (SELECT ...)` with a built subquery.
    pub fn where_not_in_query(self, column: impl Into<String>, query: Query) -> Self {
        let cond = Cond::InQuery {
            column: super::column_name(column),
            query: Box::new(query),
            negated: true,
        };
        self.push_where(Connector::And, cond)
    }

    /// `column IS NULL`, chained with AND.
    pub fn where_null(self, column: impl Into<String>) -> Self {
        self.push_null(Connector::And, column, false)
    }

    /// `column IS NOT NULL`, chained with AND.
    pub fn where_not_null(self, column: impl Into<String>) -> Self {
        self.push_null(Connector::And, column, true)
    }

    /// `column IS NULL`, chained with OR.
    pub fn or_where_null(self, column: impl Into<String>) -> Self {
        self.push_null(Connector::Or, column, false)
    }

    /// `column IS NOT NULL`, chained with OR.
    pub fn or_where_not_null(self, column: impl Into<String>) -> Self {
        self.push_null(Connector::Or, column, true)
    }

    fn push_null(self, connector: Connector, column: impl Into<String>, negated: bool) -> Self {
        let cond = Cond::Null {
            column: super::column_name(column),
            negated,
        };
        self.push_where(connector, cond)
    }

    /// `column BETWEEN ? AND ?`, chained with AND.
    pub fn where_between(
        self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.push_between(Connector::And, column, low, high, false)
    }

    /// `column NOT BETWEEN ? AND ?`, chained with AND.
    pub fn where_not_between(
        self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.push_between(Connector::And, column, low, high, true)
    }

    /// `column BETWEEN ? AND ?`, chained with OR.
    pub fn or_where_between(
        self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.push_between(Connector::Or, column, low, high, false)
    }

    /// `column NOT BETWEEN ? AND ?`, chained with OR.
    pub fn or_where_not_between(
        self,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.push_between(Connector::Or, column, low, high, true)
    }

    fn push_between(
        self,
        connector: Connector,
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
        negated: bool,
    ) -> Self {
        let cond = Cond::Between {
            column: super::column_name(column),
            low: low.into(),
            high: high.into(),
            negated,
        };
        self.push_where(connector, cond)
    }

    /// `EXISTS (SELECT ...)` with a built subquery, chained with AND.
    pub fn where_exists(self, query: Query) -> Self {
        let cond = Cond::Exists {
            query: Box::new(query),
            negated: false,
        };
        self.push_where(Connector::And, cond)
    }

    /// `NOT EXISTS (SELECT ...)` with a built subquery, chained with AND.
    pub fn where_not_exists(self, query: Query) -> Self {
        let cond = Cond::Exists {
            query: Box::new(query),
            negated: true,
        };
        self.push_where(Connector::And, cond)
    }

    /// Parenthesized group, chained with AND.
    ///
    /// The closure receives a fresh builder for the same table; its WHERE
    /// chain becomes the group. A group that adds no predicates is skipped
    /// entirely.
    pub fn where_group(self, f: impl FnOnce(Query) -> Query) -> Self {
        self.push_group(Connector::And, f)
    }

    /// Parenthesized group, chained with OR.
    pub fn or_where_group(self, f: impl FnOnce(Query) -> Query) -> Self {
        self.push_group(Connector::Or, f)
    }

    fn push_group(self, connector: Connector, f: impl FnOnce(Query) -> Query) -> Self {
        let group = f(Query::table(self.table.clone()));
        if group.wheres.is_empty() {
            return self;
        }
        self.push_where(
            connector,
            Cond::Nested {
                query: Box::new(group),
            },
        )
    }

    /// Splices a verbatim SQL fragment with its bindings, chained with AND.
    pub fn where_raw(
        self,
        sql: impl Into<String>,
        bindings: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push_raw(Connector::And, sql, bindings)
    }

    /// Splices a verbatim SQL fragment with its bindings, chained with OR.
    pub fn or_where_raw(
        self,
        sql: impl Into<String>,
        bindings: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.push_raw(Connector::Or, sql, bindings)
    }

    fn push_raw(
        self,
        connector: Connector,
        sql: impl Into<String>,
        bindings: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        let cond = Cond::Raw {
            sql: sql.into(),
            bindings: bindings.into_iter().map(Into::into).collect(),
        };
        self.push_where(connector, cond)
    }

    /// Applies `f` only when `condition` holds.
    pub fn when(self, condition: bool, f: impl FnOnce(Query) -> Query) -> Self {
        if condition {
            f(self)
        } else {
            self
        }
    }

    /// Applies `then` when `condition` holds, `otherwise` when it does not.
    pub fn when_else(
        self,
        condition: bool,
        then: impl FnOnce(Query) -> Query,
        otherwise: impl FnOnce(Query) -> Query,
    ) -> Self {
        if condition {
            then(self)
        } else {
            otherwise(self)
        }
    }

    /// `INNER JOIN table ON left = right`.
    pub fn join(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(table, JoinKind::Inner, OnClause::new().on_eq(left, right))
    }

    /// `INNER JOIN table ON left <op> right`.
    pub fn join_op(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl AsRef<str>,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(table, JoinKind::Inner, OnClause::new().on(left, op, right))
    }

    /// `LEFT JOIN table ON left = right`.
    pub fn left_join(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(table, JoinKind::Left, OnClause::new().on_eq(left, right))
    }

    /// `LEFT JOIN table ON left <op> right`.
    pub fn left_join_op(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl AsRef<str>,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(table, JoinKind::Left, OnClause::new().on(left, op, right))
    }

    /// `RIGHT JOIN table ON left = right`.
    pub fn right_join(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(table, JoinKind::Right, OnClause::new().on_eq(left, right))
    }

    /// `RIGHT JOIN table ON left <op> right`.
    pub fn right_join_op(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl AsRef<str>,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(table, JoinKind::Right, OnClause::new().on(left, op, right))
    }

    /// Joins with a compound ON clause built by the closure.
    pub fn join_with(
        self,
        table: impl Into<String>,
        kind: JoinKind,
        f: impl FnOnce(OnClause) -> OnClause,
    ) -> Self {
        self.push_join(table, kind, f(OnClause::new()))
    }

    fn push_join(mut self, table: impl Into<String>, kind: JoinKind, on: OnClause) -> Self {
        self.joins.push(Join::new(table, kind, on));
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.groups.push(super::column_name(column));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.orders
            .push((super::column_name(column), Direction::Asc));
        self
    }

    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.orders
            .push((super::column_name(column), Direction::Desc));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Appends `UNION <query>`.
    pub fn union(mut self, query: Query) -> Self {
        self.unions.push((false, query));
        self
    }

    /// Appends `UNION ALL <query>`.
    pub fn union_all(mut self, query: Query) -> Self {
        self.unions.push((true, query));
        self
    }
}
