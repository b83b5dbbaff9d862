use super::cond::WhereChain;
use super::{Comma, Formatter, Ident, Params, ToSql};

use crate::stmt::{Assign, Assignments, Direction, Insert, OnDuplicate, Query};

use std::fmt::Write;

impl ToSql for &Query {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        if self.unions.is_empty() {
            fmt!(f, SimpleSelect(self));
            return;
        }

        // MySQL rejects an unparenthesized SELECT carrying its own ORDER BY
        // or LIMIT next to UNION, so every member gets wrapped.
        fmt!(f, "(" SimpleSelect(self) ")");
        for (all, union) in &self.unions {
            let kw = if *all { " UNION ALL (" } else { " UNION (" };
            fmt!(f, kw union ")");
        }
    }
}

/// One SELECT, without any union members.
struct SimpleSelect<'a>(&'a Query);

impl ToSql for SimpleSelect<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let query = self.0;

        fmt!(f, "SELECT " Projection(&query.columns) " FROM " Ident(&query.table));

        for join in &query.joins {
            fmt!(f, join);
        }

        if !query.wheres.is_empty() {
            fmt!(f, " WHERE " WhereChain(&query.wheres));
        }

        if !query.groups.is_empty() {
            let groups = Comma(query.groups.iter().map(|column| Ident(column)));
            fmt!(f, " GROUP BY " groups);
        }

        if !query.orders.is_empty() {
            let orders = Comma(query.orders.iter().map(|(column, direction)| OrderTerm {
                column,
                direction: *direction,
            }));
            fmt!(f, " ORDER BY " orders);
        }

        LimitOffset {
            limit: query.limit,
            offset: query.offset,
        }
        .to_sql(f);
    }
}

/// The column list of a SELECT; empty selects `*`.
struct Projection<'a>(&'a [String]);

impl ToSql for Projection<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        if self.0.is_empty() {
            f.dst.push('*');
        } else {
            fmt!(f, Comma(self.0.iter().map(|column| Ident(column))));
        }
    }
}

struct OrderTerm<'a> {
    column: &'a str,
    direction: Direction,
}

impl ToSql for OrderTerm<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let direction = match self.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        };
        fmt!(f, Ident(self.column) direction);
    }
}

struct LimitOffset {
    limit: Option<u64>,
    offset: Option<u64>,
}

impl ToSql for LimitOffset {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                write!(f.dst, " LIMIT {limit} OFFSET {offset}").unwrap();
            }
            (Some(limit), None) => {
                write!(f.dst, " LIMIT {limit}").unwrap();
            }
            // MySQL has no bare OFFSET; the documented all-rows LIMIT
            // stands in.
            (None, Some(offset)) => {
                write!(f.dst, " LIMIT 18446744073709551615 OFFSET {offset}").unwrap();
            }
            (None, None) => {}
        }
    }
}

/// `SELECT COUNT(*)` over the query's FROM, JOIN and WHERE clauses.
pub(super) struct CountQuery<'a>(pub(super) &'a Query);

impl ToSql for CountQuery<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let query = self.0;

        fmt!(f, "SELECT COUNT(*) AS aggregate FROM " Ident(&query.table));

        for join in &query.joins {
            fmt!(f, join);
        }

        if !query.wheres.is_empty() {
            fmt!(f, " WHERE " WhereChain(&query.wheres));
        }

        if !query.groups.is_empty() {
            let groups = Comma(query.groups.iter().map(|column| Ident(column)));
            fmt!(f, " GROUP BY " groups);
        }
    }
}

/// `SELECT EXISTS(...)` probing the query for any row.
pub(super) struct ExistsQuery<'a>(pub(super) &'a Query);

impl ToSql for ExistsQuery<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let query = self.0;
        fmt!(f, "SELECT EXISTS(" query ") AS does_exist");
    }
}

/// UPDATE over the query's table and WHERE chain.
pub(super) struct UpdateStmt<'a> {
    pub(super) query: &'a Query,
    pub(super) assignments: &'a Assignments,
}

impl ToSql for UpdateStmt<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let assignments = Comma(self.assignments.items.iter());

        fmt!(f, "UPDATE " Ident(&self.query.table) " SET " assignments);

        if !self.query.wheres.is_empty() {
            fmt!(f, " WHERE " WhereChain(&self.query.wheres));
        }
    }
}

impl ToSql for &Assign {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match self {
            Assign::Value { column, value } => {
                fmt!(f, Ident(column) " = " value);
            }
            Assign::Expr { column, expr } => {
                fmt!(f, Ident(column) " = " expr.as_str());
            }
        }
    }
}

/// DELETE over the query's table and WHERE chain.
pub(super) struct DeleteStmt<'a>(pub(super) &'a Query);

impl ToSql for DeleteStmt<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let query = self.0;

        fmt!(f, "DELETE FROM " Ident(&query.table));

        if !query.wheres.is_empty() {
            fmt!(f, " WHERE " WhereChain(&query.wheres));
        }
    }
}

impl ToSql for &Insert {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        assert!(!self.columns.is_empty(), "insert requires columns");
        assert!(!self.rows.is_empty(), "insert requires at least one row");
        assert!(
            !self.ignore || self.on_duplicate.is_empty(),
            "IGNORE and ON DUPLICATE KEY UPDATE are mutually exclusive"
        );

        let verb = if self.ignore {
            "INSERT IGNORE INTO "
        } else {
            "INSERT INTO "
        };
        let columns = Comma(self.columns.iter().map(|column| Ident(column)));

        fmt!(f, verb Ident(&self.table) " (" columns ") VALUES ");

        let mut s = "";
        for row in &self.rows {
            fmt!(f, s "(" Comma(row.iter()) ")");
            s = ", ";
        }

        if !self.on_duplicate.is_empty() {
            fmt!(f, " ON DUPLICATE KEY UPDATE ");

            let mut s = "";
            for (column, update) in &self.on_duplicate {
                fmt!(f, s);
                match update {
                    OnDuplicate::Values => {
                        fmt!(f, Ident(column) " = VALUES(" Ident(column) ")");
                    }
                    OnDuplicate::Value(value) => {
                        fmt!(f, Ident(column) " = " value);
                    }
                    OnDuplicate::Expr(expr) => {
                        fmt!(f, Ident(column) " = " expr.as_str());
                    }
                }
                s = ", ";
            }
        }
    }
}
