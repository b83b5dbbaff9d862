//! Support code shared by the integration tests.

pub mod entities;
pub use entities::{article_row, user_row, Article, User};

pub use mock::{MockConnection, Script, Statement, StatementLog};

use quarry::Db;

/// Builds an engine over a scripted connection, with no identity cache,
/// returning the statement log alongside.
pub fn mock_db(conn: MockConnection) -> (Db, StatementLog) {
    let log = conn.log();
    (Db::new(conn), log)
}
