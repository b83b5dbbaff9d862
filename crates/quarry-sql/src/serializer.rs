#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::Comma;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod cond;
mod query;

use crate::stmt::{Assignments, Insert, Query};

use quarry_core::stmt::Value;

/// Destination of an in-progress serialization.
struct Formatter<'a, T> {
    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

fn render(node: impl ToSql) -> (String, Vec<Value>) {
    let mut dst = String::new();
    let mut params = Vec::new();
    let mut f = Formatter {
        dst: &mut dst,
        params: &mut params,
    };
    node.to_sql(&mut f);
    (dst, params)
}

impl Query {
    /// Compiles this builder to `(sql, bindings)`.
    ///
    /// Pure: the builder is untouched and repeated calls return identical
    /// output. Bindings come out in the exact order of the `?` placeholders
    /// in the text, subqueries included.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        render(self)
    }

    /// Compiles `SELECT COUNT(*)` over the same FROM, JOIN and WHERE
    /// clauses. Ordering, limit and offset do not change a count and are
    /// dropped.
    pub fn to_count_sql(&self) -> (String, Vec<Value>) {
        render(query::CountQuery(self))
    }

    /// Compiles `SELECT EXISTS(...)` probing this query for any row.
    pub fn to_exists_sql(&self) -> (String, Vec<Value>) {
        render(query::ExistsQuery(self))
    }

    /// Compiles an UPDATE against this query's table and WHERE chain.
    ///
    /// SET bindings precede WHERE bindings, matching placeholder order.
    pub fn to_update_sql(&self, assignments: &Assignments) -> (String, Vec<Value>) {
        assert!(
            !assignments.is_empty(),
            "update requires at least one assignment"
        );
        render(query::UpdateStmt {
            query: self,
            assignments,
        })
    }

    /// Compiles a DELETE against this query's table and WHERE chain.
    pub fn to_delete_sql(&self) -> (String, Vec<Value>) {
        render(query::DeleteStmt(self))
    }
}

impl Insert {
    /// Compiles this insert to `(sql, bindings)`.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        render(self)
    }
}
