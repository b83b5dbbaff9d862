mod assignments;
pub use assignments::Assignments;
pub(crate) use assignments::Assign;

mod cond;
pub use cond::{Cond, Connector};

mod insert;
pub use insert::{Insert, OnDuplicate};

mod join;
pub use join::{Join, JoinKind, OnClause};
pub(crate) use join::JoinCond;

mod operator;
pub use operator::Operator;

mod query;
pub use query::{Direction, Query};

fn name(kind: &str, name: impl Into<String>) -> String {
    let name = name.into();
    assert!(!name.is_empty(), "{kind} name must not be empty");
    name
}

pub(crate) fn table_name(name: impl Into<String>) -> String {
    self::name("table", name)
}

pub(crate) fn column_name(name: impl Into<String>) -> String {
    self::name("column", name)
}
