mod batch;
pub use batch::BatchWriter;

pub mod cache;
pub use cache::{CacheKey, IdentityCache, MemoryCache};

pub mod db;
pub use db::{Builder, Db, RetryPolicy};

mod entity;
pub use entity::{Entity, Record};

pub mod schema;
pub use schema::{Descriptor, FieldDef, FieldType, Timestamps};

pub use quarry_core::stmt;
pub use quarry_core::{Connection, Error, QueryLog, Response, Result, Rows};

pub use quarry_sql::{Assignments, Insert, JoinKind, OnClause, OnDuplicate, Operator, Query};

#[cfg(feature = "mysql")]
pub use quarry_driver_mysql as mysql;
