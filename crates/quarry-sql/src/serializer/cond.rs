use super::{Comma, Formatter, Ident, Params, ToSql};

use crate::stmt::{Cond, Connector, Join, JoinCond, OnClause};

/// A predicate chain: connectors + nodes, left to right.
///
/// The connector of the first node is never rendered.
pub(super) struct WhereChain<'a>(pub(super) &'a [(Connector, Cond)]);

impl ToSql for WhereChain<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        for (i, (connector, cond)) in self.0.iter().enumerate() {
            if i > 0 {
                fmt!(f, connector);
            }
            fmt!(f, cond);
        }
    }
}

impl ToSql for &Connector {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push_str(match self {
            Connector::And => " AND ",
            Connector::Or => " OR ",
        });
    }
}

impl ToSql for &Cond {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match self {
            Cond::Basic { column, op, value } => {
                fmt!(f, Ident(column) " " op.as_sql() " " value);
            }
            Cond::Column { left, op, right } => {
                fmt!(f, Ident(left) " " op.as_sql() " " Ident(right));
            }
            Cond::In {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    // An empty IN list can match nothing; an empty NOT IN
                    // excludes nothing. Both collapse to a constant.
                    f.dst.push_str(if *negated { "1 = 1" } else { "0 = 1" });
                    return;
                }
                let kw = if *negated { " NOT IN (" } else { " IN (" };
                fmt!(f, Ident(column) kw Comma(values.iter()) ")");
            }
            Cond::InQuery {
                column,
                query,
                negated,
            } => {
                let kw = if *negated { " NOT IN (" } else { " IN (" };
                let query = &**query;
                fmt!(f, Ident(column) kw query ")");
            }
            Cond::Null { column, negated } => {
                let kw = if *negated { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, Ident(column) kw);
            }
            Cond::Between {
                column,
                low,
                high,
                negated,
            } => {
                let kw = if *negated { " NOT BETWEEN " } else { " BETWEEN " };
                fmt!(f, Ident(column) kw low " AND " high);
            }
            Cond::Exists { query, negated } => {
                let kw = if *negated { "NOT EXISTS (" } else { "EXISTS (" };
                let query = &**query;
                fmt!(f, kw query ")");
            }
            Cond::Nested { query } => {
                fmt!(f, "(" WhereChain(&query.wheres) ")");
            }
            Cond::Raw { sql, bindings } => {
                // The fragment carries its own placeholders; its bindings
                // are appended here so overall order still matches.
                for value in bindings {
                    f.params.push(value);
                }
                f.dst.push_str(sql);
            }
        }
    }
}

impl ToSql for &Join {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let on = &self.on;
        fmt!(f, " " self.kind.as_sql() " " Ident(&self.table) " ON " on);
    }
}

impl ToSql for &OnClause {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        for (i, (connector, cond)) in self.conds.iter().enumerate() {
            if i > 0 {
                fmt!(f, connector);
            }
            fmt!(f, cond);
        }
    }
}

impl ToSql for &JoinCond {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match self {
            JoinCond::On { left, op, right } => {
                fmt!(f, Ident(left) " " op.as_sql() " " Ident(right));
            }
            JoinCond::Where { column, op, value } => {
                fmt!(f, Ident(column) " " op.as_sql() " " value);
            }
            JoinCond::WhereNull { column, negated } => {
                let kw = if *negated { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, Ident(column) kw);
            }
        }
    }
}
