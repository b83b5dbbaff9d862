use crate::db::Db;
use crate::entity::{Entity, Record};

use quarry_core::stmt::{Row, Value};
use quarry_core::Result;
use quarry_sql::stmt::{Insert, OnDuplicate};

use indexmap::IndexMap;

/// Number of pending rows that triggers an automatic flush.
const DEFAULT_THRESHOLD: usize = 500;

/// Accumulates rows for one table and writes them in multi-row INSERTs.
///
/// The first added row fixes the column list. Later rows contribute the
/// columns they share with that list and bind `Null` for the rest. Call
/// [`flush`](BatchWriter::flush) or [`finish`](BatchWriter::finish) to write
/// what is pending; dropping a writer with pending rows only logs a warning,
/// it never writes.
pub struct BatchWriter<'a> {
    db: &'a mut Db,
    table: String,
    threshold: usize,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    total_affected: u64,
    ignore: bool,
    on_duplicate: IndexMap<String, OnDuplicate>,
}

impl<'a> BatchWriter<'a> {
    pub(crate) fn new(db: &'a mut Db, table: String) -> BatchWriter<'a> {
        BatchWriter {
            db,
            table,
            threshold: DEFAULT_THRESHOLD,
            columns: vec![],
            rows: vec![],
            total_affected: 0,
            ignore: false,
            on_duplicate: IndexMap::new(),
        }
    }

    /// Overrides the automatic flush threshold.
    pub fn threshold(mut self, threshold: usize) -> Self {
        assert!(threshold > 0, "threshold must be positive");
        self.threshold = threshold;
        self
    }

    /// Renders every flush as `INSERT IGNORE`.
    pub fn ignore_duplicates(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Adds an `ON DUPLICATE KEY UPDATE` assignment to every flush.
    pub fn on_duplicate(mut self, column: impl Into<String>, update: OnDuplicate) -> Self {
        self.on_duplicate.insert(column.into(), update);
        self
    }

    /// Number of rows waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.rows.len()
    }

    /// Rows affected across every flush so far.
    pub fn total_affected(&self) -> u64 {
        self.total_affected
    }

    /// Queues one row, flushing automatically once the threshold is reached.
    pub async fn add(&mut self, row: Row) -> Result<()> {
        if self.columns.is_empty() {
            assert!(!row.is_empty(), "batch row has no columns");
            self.columns = row.columns().map(str::to_string).collect();
        }

        // Positional tuple in the fixed column order. Absent columns bind
        // Null, columns outside the list are dropped.
        let tuple: Vec<Value> = self.columns.iter().map(|column| row.value(column)).collect();
        self.rows.push(tuple);

        if self.rows.len() >= self.threshold {
            self.flush().await?;
        }
        Ok(())
    }

    /// Queues a record's encoded state.
    pub async fn add_record<E: Entity>(&mut self, record: &Record<E>) -> Result<()> {
        let row = E::descriptor().encode_row(&record.extract())?;
        self.add(row).await
    }

    /// Writes pending rows in one INSERT, returning the affected count.
    ///
    /// Flushing with nothing pending returns 0 without touching storage. On
    /// failure the rows stay pending, so the flush can be retried.
    pub async fn flush(&mut self) -> Result<u64> {
        if self.rows.is_empty() {
            return Ok(0);
        }

        let mut insert = Insert::new(&self.table).columns(self.columns.iter().cloned());
        for row in &self.rows {
            insert = insert.row(row.clone());
        }
        if self.ignore {
            insert = insert.ignore();
        }
        for (column, update) in &self.on_duplicate {
            insert = insert.on_duplicate(column.clone(), update.clone());
        }

        let affected = self.db.insert(&insert).await?;
        self.rows.clear();
        self.total_affected += affected;
        tracing::debug!(table = %self.table, affected, "batch flushed");
        Ok(affected)
    }

    /// Flushes what is pending and returns the total affected count.
    pub async fn finish(mut self) -> Result<u64> {
        self.flush().await?;
        Ok(self.total_affected)
    }
}

impl Drop for BatchWriter<'_> {
    fn drop(&mut self) {
        if !self.rows.is_empty() {
            tracing::warn!(
                table = %self.table,
                pending = self.rows.len(),
                "batch writer dropped with pending rows; call flush() or finish()"
            );
        }
    }
}
