pub mod serializer;
pub use serializer::Params;

pub mod stmt;
pub use stmt::{Assignments, Insert, JoinKind, OnClause, OnDuplicate, Operator, Query};
