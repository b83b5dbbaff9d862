use crate::schema::Descriptor;

use quarry_core::stmt::{Row, Value};
use quarry_core::Result;

use std::ops::{Deref, DerefMut};

/// A type that can be persisted through [`Db`](crate::Db).
///
/// Implementations speak semantic, property-keyed rows: [`Entity::load`]
/// receives a row already decoded per the descriptor, and [`Entity::extract`]
/// returns semantic values for every declared property. Encoding to storage
/// shape happens in the engine, not here.
pub trait Entity: Sized {
    /// The static mapping for this type, built once.
    ///
    /// Implementations cache the descriptor behind a `OnceLock`.
    fn descriptor() -> &'static Descriptor;

    /// Constructs an instance from a full semantic row.
    fn load(row: &Row) -> Result<Self>;

    /// Updates matching properties from a partial semantic row.
    ///
    /// Properties absent from `row` are left untouched.
    fn fill(&mut self, row: &Row) -> Result<()>;

    /// Returns every declared property as a semantic row.
    fn extract(&self) -> Row;
}

/// An entity paired with its persistence state.
///
/// A record knows whether its entity exists in storage and keeps an encoded
/// snapshot of the last loaded or saved state. Dirty detection compares the
/// entity's current encoded form against that snapshot, so only columns that
/// actually changed reach an `UPDATE`.
#[derive(Debug)]
pub struct Record<E: Entity> {
    entity: E,
    persisted: bool,
    /// Encoded, column-keyed state as of the last hydrate or save.
    snapshot: Row,
}

impl<E: Entity> Record<E> {
    /// Wraps a fresh, not-yet-persisted entity.
    pub fn new(entity: E) -> Record<E> {
        Record {
            entity,
            persisted: false,
            snapshot: Row::new(),
        }
    }

    /// Builds a persisted record from a storage row.
    ///
    /// The row is decoded per the descriptor, loaded into the entity, and the
    /// snapshot reset so the record starts clean.
    pub fn hydrate(raw: &Row) -> Result<Record<E>> {
        let descriptor = E::descriptor();
        let semantic = descriptor.decode_row(raw)?;
        let entity = E::load(&semantic)?;
        let snapshot = descriptor.encode_row(&entity.extract())?;

        Ok(Record {
            entity,
            persisted: true,
            snapshot,
        })
    }

    /// Whether the entity exists in storage.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Whether any column differs from the snapshot.
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(!self.dirty_columns()?.is_empty())
    }

    /// Encoded values of every column that differs from the snapshot.
    pub fn dirty_columns(&self) -> Result<Row> {
        let current = E::descriptor().encode_row(&self.entity.extract())?;

        let mut dirty = Row::new();
        for (column, value) in current {
            if self.snapshot.get(&column) != Some(&value) {
                dirty.insert(column, value);
            }
        }
        Ok(dirty)
    }

    /// Applies a partial semantic row to the entity.
    pub fn apply(&mut self, row: &Row) -> Result<()> {
        self.entity.fill(row)
    }

    /// The encoded primary key value.
    pub fn key(&self) -> Result<Value> {
        let field = E::descriptor().key_field();
        field.ty.encode(self.entity.extract().value(&field.property))
    }

    /// Resets the snapshot to the entity's current state.
    pub fn mark_clean(&mut self) -> Result<()> {
        self.snapshot = E::descriptor().encode_row(&self.entity.extract())?;
        Ok(())
    }

    pub(crate) fn set_persisted(&mut self, persisted: bool) {
        self.persisted = persisted;
    }

    pub(crate) fn snapshot(&self) -> &Row {
        &self.snapshot
    }

    /// Unwraps the entity, discarding persistence state.
    pub fn into_inner(self) -> E {
        self.entity
    }
}

impl<E: Entity> Deref for Record<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E: Entity> DerefMut for Record<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.entity
    }
}

impl<E: Entity> From<E> for Record<E> {
    fn from(entity: E) -> Record<E> {
        Record::new(entity)
    }
}
