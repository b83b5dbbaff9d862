use quarry_core::stmt::{Row, Value};

use std::collections::HashMap;
use std::sync::Mutex;

/// Key under which a row is cached.
///
/// Restricted to the scalar shapes that hash cleanly. Entities keyed by
/// anything else simply bypass the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Int(i64),
    Uint(u64),
    Text(String),
    Bytes(Vec<u8>),
}

impl CacheKey {
    /// Derives a cache key from an encoded key value, when the shape allows.
    pub fn from_value(value: &Value) -> Option<CacheKey> {
        match value {
            Value::I64(v) => Some(CacheKey::Int(*v)),
            Value::U64(v) => Some(CacheKey::Uint(*v)),
            Value::String(v) => Some(CacheKey::Text(v.clone())),
            Value::Bytes(v) => Some(CacheKey::Bytes(v.clone())),
            _ => None,
        }
    }
}

/// Identity map consulted before primary key lookups hit storage.
///
/// Stores encoded, column-keyed rows exactly as storage returned them. The
/// engine populates it on `find` misses and saves, and invalidates on delete.
pub trait IdentityCache: Send + Sync + 'static {
    fn get(&self, table: &str, key: &CacheKey) -> Option<Row>;

    fn set(&self, table: &str, key: CacheKey, row: Row);

    fn remove(&self, table: &str, key: &CacheKey);

    /// Drops every entry for `table`, or everything when `table` is `None`.
    fn clear(&self, table: Option<&str>);
}

/// In-process [`IdentityCache`] over a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    tables: Mutex<HashMap<String, HashMap<CacheKey, Row>>>,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache::default()
    }

    /// Number of cached rows across all tables.
    pub fn len(&self) -> usize {
        self.tables.lock().unwrap().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityCache for MemoryCache {
    fn get(&self, table: &str, key: &CacheKey) -> Option<Row> {
        self.tables.lock().unwrap().get(table)?.get(key).cloned()
    }

    fn set(&self, table: &str, key: CacheKey, row: Row) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .insert(key, row);
    }

    fn remove(&self, table: &str, key: &CacheKey) {
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.remove(key);
        }
    }

    fn clear(&self, table: Option<&str>) {
        let mut tables = self.tables.lock().unwrap();
        match table {
            Some(table) => {
                tables.remove(table);
            }
            None => tables.clear(),
        }
    }
}
