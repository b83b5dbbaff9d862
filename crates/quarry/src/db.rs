use crate::batch::BatchWriter;
use crate::cache::{CacheKey, IdentityCache};
use crate::entity::{Entity, Record};
use crate::schema::Descriptor;

use quarry_core::driver::{Connection, Response};
use quarry_core::log::QueryLog;
use quarry_core::stmt::{Row, Value};
use quarry_core::{err, Error, Result};
use quarry_sql::stmt::{Assignments, Insert, Query};

use std::sync::Arc;
use std::time::Instant;

mod builder;
pub use builder::Builder;

mod retry;
pub use retry::RetryPolicy;

/// Entry point for every storage interaction.
///
/// Owns one driver connection. Statement execution takes `&mut self`, so a
/// `Db` has at most one statement in flight at a time and `begin` / `commit`
/// frame a transaction on that same connection.
pub struct Db {
    conn: Box<dyn Connection>,
    cache: Option<Box<dyn IdentityCache>>,
    log: Option<Arc<dyn QueryLog>>,
    retry: RetryPolicy,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Wraps an established driver connection with default options.
    pub fn new(conn: impl Connection) -> Db {
        Db::builder().build(conn)
    }

    /// Looks an entity up by primary key.
    ///
    /// Consults the identity cache first; on a miss the fetched row is
    /// cached for the next lookup.
    pub async fn find<E: Entity>(&mut self, id: impl Into<Value>) -> Result<Option<Record<E>>> {
        let descriptor = E::descriptor();
        let id = descriptor.key_field().ty.encode(id.into())?;

        if let Some(raw) = self.cached(descriptor, &id) {
            return Ok(Some(Record::hydrate(&raw)?));
        }

        let query = Query::table(descriptor.table())
            .where_eq(descriptor.key(), id.clone())
            .limit(1);
        let rows = self.rows(&query).await?;
        let Some(raw) = rows.into_iter().next() else {
            return Ok(None);
        };

        let record = Record::hydrate(&raw)?;
        self.cache_row(descriptor, &id, raw);
        Ok(Some(record))
    }

    /// Like [`find`](Db::find), but a missing row is an error.
    pub async fn find_or_fail<E: Entity>(&mut self, id: impl Into<Value>) -> Result<Record<E>> {
        let id = id.into();
        match self.find(id.clone()).await? {
            Some(record) => Ok(record),
            None => Err(Error::not_found(
                E::descriptor().table(),
                format!("{id}"),
            )),
        }
    }

    /// Looks up many entities by primary key in a single fetch.
    ///
    /// Results come back in the caller's id order. Missing ids are silently
    /// skipped, and a repeated id yields its record once.
    pub async fn find_many<E: Entity>(
        &mut self,
        ids: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Result<Vec<Record<E>>> {
        let descriptor = E::descriptor();
        let key_field = descriptor.key_field();

        let mut ordered = vec![];
        for id in ids {
            ordered.push(key_field.ty.encode(id.into())?);
        }

        // Cache hits are served locally; everything else goes into one IN
        // fetch.
        let mut pool: Vec<(Value, Row)> = vec![];
        let mut missing: Vec<Value> = vec![];
        for id in &ordered {
            if pool.iter().any(|(key, _)| key == id) || missing.contains(id) {
                continue;
            }
            match self.cached(descriptor, id) {
                Some(raw) => pool.push((id.clone(), raw)),
                None => missing.push(id.clone()),
            }
        }

        if !missing.is_empty() {
            let query = Query::table(descriptor.table()).where_in(descriptor.key(), missing);
            for raw in self.rows(&query).await? {
                let id = raw.value(descriptor.key());
                self.cache_row(descriptor, &id, raw.clone());
                pool.push((id, raw));
            }
        }

        let mut records = vec![];
        for id in &ordered {
            let Some(pos) = pool.iter().position(|(key, _)| key == id) else {
                continue;
            };
            let (_, raw) = pool.remove(pos);
            records.push(Record::hydrate(&raw)?);
        }
        Ok(records)
    }

    /// Persists `record`, inserting or updating depending on its state.
    ///
    /// Capability columns are stamped first: `created_at` / `updated_at`,
    /// the external id on first save, and the version counter. The statement
    /// runs inside the deadlock retry loop. A versioned update that matches
    /// no row fails with the lock conflict class.
    pub async fn save<E: Entity>(&mut self, record: &mut Record<E>) -> Result<()> {
        let descriptor = E::descriptor();

        if record.is_persisted() {
            // A clean record stays untouched, before any stamping.
            let mut dirty = record.dirty_columns()?;
            dirty.remove(descriptor.key());
            if let Some(version) = descriptor.version() {
                dirty.remove(version);
            }
            if dirty.is_empty() {
                return Ok(());
            }

            stamp(record)?;
            self.update_record(record).await
        } else {
            stamp(record)?;
            self.insert_record(record).await
        }
    }

    /// Deletes `record`'s row and invalidates its cache entry.
    pub async fn delete<E: Entity>(&mut self, record: &mut Record<E>) -> Result<()> {
        let descriptor = E::descriptor();
        if !record.is_persisted() {
            return Err(Error::not_persisted(descriptor.table()));
        }

        let key = record.key()?;
        let query = Query::table(descriptor.table()).where_eq(descriptor.key(), key.clone());
        let (sql, bindings) = query.to_delete_sql();
        self.exec(&sql, &bindings).await?;

        if let (Some(cache), Some(cache_key)) = (self.cache.as_ref(), CacheKey::from_value(&key))
        {
            cache.remove(descriptor.table(), &cache_key);
        }
        record.set_persisted(false);
        Ok(())
    }

    /// Runs a query, hydrating every row.
    pub async fn all<E: Entity>(&mut self, query: &Query) -> Result<Vec<Record<E>>> {
        self.rows(query).await?.iter().map(Record::hydrate).collect()
    }

    /// Runs a query limited to one row.
    pub async fn first<E: Entity>(&mut self, query: &Query) -> Result<Option<Record<E>>> {
        let limited = query.clone().limit(1);
        let rows = self.rows(&limited).await?;
        match rows.first() {
            Some(raw) => Ok(Some(Record::hydrate(raw)?)),
            None => Ok(None),
        }
    }

    /// Runs a query, returning raw storage rows.
    pub async fn rows(&mut self, query: &Query) -> Result<Vec<Row>> {
        let (sql, bindings) = query.to_sql();
        Ok(self.exec(&sql, &bindings).await?.rows.into_values())
    }

    /// Runs the query's COUNT form.
    pub async fn count(&mut self, query: &Query) -> Result<u64> {
        let (sql, bindings) = query.to_count_sql();
        let rows = self.exec(&sql, &bindings).await?.rows.into_values();
        let Some(row) = rows.into_iter().next() else {
            return Err(err!("count query returned no rows"));
        };
        match row.value("aggregate") {
            Value::I64(v) if v >= 0 => Ok(v as u64),
            Value::U64(v) => Ok(v),
            other => Err(err!("count query returned {other:?}")),
        }
    }

    /// Runs the query's EXISTS form.
    pub async fn exists(&mut self, query: &Query) -> Result<bool> {
        let (sql, bindings) = query.to_exists_sql();
        let rows = self.exec(&sql, &bindings).await?.rows.into_values();
        let Some(row) = rows.into_iter().next() else {
            return Err(err!("exists query returned no rows"));
        };
        match row.value("does_exist") {
            Value::I64(v) => Ok(v != 0),
            Value::U64(v) => Ok(v != 0),
            Value::Bool(v) => Ok(v),
            other => Err(err!("exists query returned {other:?}")),
        }
    }

    /// Updates every row the query matches, returning the affected count.
    pub async fn update_where(
        &mut self,
        query: &Query,
        assignments: &Assignments,
    ) -> Result<u64> {
        let (sql, bindings) = query.to_update_sql(assignments);
        Ok(self.exec(&sql, &bindings).await?.rows.into_count())
    }

    /// Deletes every row the query matches, returning the affected count.
    pub async fn delete_where(&mut self, query: &Query) -> Result<u64> {
        let (sql, bindings) = query.to_delete_sql();
        Ok(self.exec(&sql, &bindings).await?.rows.into_count())
    }

    /// Executes a prepared INSERT, returning the affected count.
    pub async fn insert(&mut self, insert: &Insert) -> Result<u64> {
        let (sql, bindings) = insert.to_sql();
        Ok(self.exec(&sql, &bindings).await?.rows.into_count())
    }

    /// Starts a batch writer that accumulates rows for `table`.
    pub fn batch(&mut self, table: impl Into<String>) -> BatchWriter<'_> {
        BatchWriter::new(self, table.into())
    }

    /// Opens a transaction on the underlying connection.
    pub async fn begin(&mut self) -> Result<()> {
        self.conn.begin().await
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.conn.commit().await
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.conn.rollback().await
    }

    /// Drops identity cache entries for `table`, or all of them.
    pub fn clear_cache(&self, table: Option<&str>) {
        if let Some(cache) = &self.cache {
            cache.clear(table);
        }
    }

    async fn insert_record<E: Entity>(&mut self, record: &mut Record<E>) -> Result<()> {
        let descriptor = E::descriptor();
        let mut row = descriptor.encode_row(&record.extract())?;

        // A null key means storage assigns it.
        let storage_assigns_key = row.value(descriptor.key()).is_null();
        if storage_assigns_key {
            row.remove(descriptor.key());
        }

        let columns: Vec<String> = row.columns().map(str::to_string).collect();
        let values: Vec<Value> = row.into_iter().map(|(_, value)| value).collect();
        let insert = Insert::new(descriptor.table()).columns(columns).row(values);
        let (sql, bindings) = insert.to_sql();

        let response = self.exec_retry(&sql, &bindings).await?;

        if storage_assigns_key {
            if let Some(id) = response.last_insert_id {
                let key_field = descriptor.key_field();
                let mut patch = Row::new();
                patch.insert(key_field.property.clone(), key_field.ty.decode(Value::U64(id))?);
                record.apply(&patch)?;
            }
        }

        record.set_persisted(true);
        record.mark_clean()?;
        self.cache_record(record)?;
        Ok(())
    }

    async fn update_record<E: Entity>(&mut self, record: &mut Record<E>) -> Result<()> {
        let descriptor = E::descriptor();

        let mut dirty = record.dirty_columns()?;
        // The key is never rewritten, and the version counter is owned by
        // the engine.
        dirty.remove(descriptor.key());
        if let Some(version) = descriptor.version() {
            dirty.remove(version);
        }
        if dirty.is_empty() {
            return Ok(());
        }

        let key = record.key()?;
        let mut assignments = Assignments::new();
        for (column, value) in dirty {
            assignments.set(column, value);
        }

        let mut query = Query::table(descriptor.table()).where_eq(descriptor.key(), key.clone());

        let mut known_version = None;
        if let Some(version_col) = descriptor.version() {
            let version = record.snapshot().value(version_col).to_i64()?;
            assignments.set_expr(version_col, format!("`{version_col}` + 1"));
            query = query.where_eq(version_col, version);
            known_version = Some((version_col, version));
        }

        let (sql, bindings) = query.to_update_sql(&assignments);
        let response = self.exec_retry(&sql, &bindings).await?;
        let affected = response.rows.into_count();

        if let Some((version_col, expected)) = known_version {
            // The connection reports found rows, so zero can only mean the
            // version clause matched nothing.
            if affected == 0 {
                return Err(Error::lock_conflict(
                    descriptor.table(),
                    format!("{key}"),
                    expected,
                ));
            }

            let field = descriptor
                .field_by_column(version_col)
                .expect("versioned descriptors declare the version field");
            let mut patch = Row::new();
            patch.insert(field.property.clone(), expected + 1);
            record.apply(&patch)?;
        }

        record.mark_clean()?;
        self.cache_record(record)?;
        Ok(())
    }

    /// Runs one statement through the timing / logging funnel.
    async fn exec(&mut self, sql: &str, bindings: &[Value]) -> Result<Response> {
        let start = Instant::now();
        let result = self.conn.execute(sql, bindings).await;
        let elapsed = start.elapsed();

        if let Some(log) = &self.log {
            log.record(sql, bindings, elapsed);
        }
        match &result {
            Ok(_) => {
                tracing::debug!(sql, elapsed_us = elapsed.as_micros() as u64, "statement executed")
            }
            Err(err) => tracing::debug!(sql, %err, "statement failed"),
        }
        result
    }

    /// Like [`exec`](Db::exec), re-running the statement when it fails with
    /// the deadlock class.
    async fn exec_retry(&mut self, sql: &str, bindings: &[Value]) -> Result<Response> {
        let mut attempt = 1;
        loop {
            match self.exec(sql, bindings).await {
                Err(err) if err.is_deadlock() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(
                        sql,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "deadlock, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn cached(&self, descriptor: &Descriptor, id: &Value) -> Option<Row> {
        let cache = self.cache.as_ref()?;
        let key = CacheKey::from_value(id)?;
        let row = cache.get(descriptor.table(), &key)?;
        tracing::trace!(table = descriptor.table(), "identity cache hit");
        Some(row)
    }

    fn cache_row(&self, descriptor: &Descriptor, id: &Value, raw: Row) {
        if let (Some(cache), Some(key)) = (self.cache.as_ref(), CacheKey::from_value(id)) {
            cache.set(descriptor.table(), key, raw);
        }
    }

    fn cache_record<E: Entity>(&self, record: &Record<E>) -> Result<()> {
        let descriptor = E::descriptor();
        let row = descriptor.encode_row(&record.extract())?;
        let key = row.value(descriptor.key());
        self.cache_row(descriptor, &key, row);
        Ok(())
    }
}

/// Stamps capability columns ahead of a write.
///
/// `created_at` and the external id are only assigned when unset, so callers
/// may pre-populate them. `updated_at` always moves. The version counter
/// starts at 1 on first save.
fn stamp<E: Entity>(record: &mut Record<E>) -> Result<()> {
    let descriptor = E::descriptor();
    let current = record.extract();
    let mut patch = Row::new();

    if let Some(timestamps) = descriptor.timestamps() {
        let now = Value::from(chrono::Utc::now());
        if !record.is_persisted() && current.value(&timestamps.created_at).is_null() {
            patch.insert(timestamps.created_at.clone(), now.clone());
        }
        patch.insert(timestamps.updated_at.clone(), now);
    }

    if let Some(column) = descriptor.external_id() {
        if current.value(column).is_null() {
            patch.insert(column, uuid::Uuid::new_v4().to_string());
        }
    }

    if let Some(column) = descriptor.version() {
        if !record.is_persisted() && current.value(column).is_null() {
            patch.insert(column, 1i64);
        }
    }

    if patch.is_empty() {
        Ok(())
    } else {
        record.apply(&patch)
    }
}
