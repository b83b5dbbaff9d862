use super::{Db, RetryPolicy};
use crate::cache::IdentityCache;

use quarry_core::driver::Connection;
use quarry_core::log::QueryLog;

use std::sync::Arc;

/// Configures and assembles a [`Db`].
#[derive(Default)]
pub struct Builder {
    cache: Option<Box<dyn IdentityCache>>,
    log: Option<Arc<dyn QueryLog>>,
    retry: Option<RetryPolicy>,
}

impl Builder {
    /// Enables an identity cache, consulted before primary key lookups hit
    /// storage.
    pub fn identity_cache(mut self, cache: impl IdentityCache) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    /// Records every executed statement with its bindings and timing.
    pub fn query_log(mut self, log: impl QueryLog) -> Self {
        self.log = Some(Arc::new(log));
        self
    }

    /// Overrides the deadlock retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Assembles a [`Db`] over an established driver connection.
    pub fn build(self, conn: impl Connection) -> Db {
        Db {
            conn: Box::new(conn),
            cache: self.cache,
            log: self.log,
            retry: self.retry.unwrap_or_default(),
        }
    }

    /// Connects to a MySQL server and assembles a [`Db`].
    #[cfg(feature = "mysql")]
    pub async fn connect(self, url: &str) -> quarry_core::Result<Db> {
        let driver = quarry_driver_mysql::MySQL::new(url)?;
        let conn = driver.connection().await?;
        Ok(self.build(conn))
    }
}
