mod response;
pub use response::{Response, Rows};

use crate::{async_trait, stmt::Value, Result};

/// Handle to a database connection.
///
/// The engine is written against this trait only. Pooling, reconnection, and
/// replica routing are concerns of implementations, not of the engine.
///
/// `&mut self` on every method encodes the resource model: one in-flight
/// statement per handle.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Executes a single parameterized statement.
    ///
    /// `bindings` correspond positionally to `?` placeholders in `sql`.
    async fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<Response>;

    /// Opens a transaction on this connection.
    async fn begin(&mut self) -> Result<()>;

    /// Commits the current transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Rolls back the current transaction.
    async fn rollback(&mut self) -> Result<()>;
}
