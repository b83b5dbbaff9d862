//! Static descriptions of how entities map onto tables.

use quarry_core::stmt::{Row, Value};
use quarry_core::{bail, Result};

use chrono::NaiveDateTime;

/// Format used for date-time values stored as text.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage type of a single entity field.
///
/// The variants name the semantic type on the entity side. [`FieldType::encode`]
/// maps a semantic value to its storage shape and [`FieldType::decode`] maps a
/// storage value back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    Uint,
    /// 64-bit float.
    Float,
    /// Boolean, stored as `0` / `1`.
    Bool,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Bytes,
    /// JSON document, stored as serialized text.
    Json,
    /// Date-time, stored as `YYYY-MM-DD HH:MM:SS` text.
    DateTime,
}

impl FieldType {
    /// Converts a storage value into its semantic form.
    ///
    /// `Null` passes through for every field type. Anything that does not fit
    /// the declared type is an error rather than a silent coercion.
    pub fn decode(self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match self {
            FieldType::Int => match value {
                Value::I64(_) => Ok(value),
                Value::U64(v) if v <= i64::MAX as u64 => Ok(Value::I64(v as i64)),
                _ => bail!("cannot decode value as int; value={value:?}"),
            },
            FieldType::Uint => match value {
                Value::U64(_) => Ok(value),
                Value::I64(v) if v >= 0 => Ok(Value::U64(v as u64)),
                _ => bail!("cannot decode value as uint; value={value:?}"),
            },
            FieldType::Float => match value {
                Value::F64(_) => Ok(value),
                Value::I64(v) => Ok(Value::F64(v as f64)),
                Value::U64(v) => Ok(Value::F64(v as f64)),
                _ => bail!("cannot decode value as float; value={value:?}"),
            },
            FieldType::Bool => match value {
                Value::Bool(_) => Ok(value),
                Value::I64(0) | Value::U64(0) => Ok(Value::Bool(false)),
                Value::I64(1) | Value::U64(1) => Ok(Value::Bool(true)),
                _ => bail!("cannot decode value as bool; value={value:?}"),
            },
            FieldType::Text => match value {
                Value::String(_) => Ok(value),
                Value::Bytes(v) => match String::from_utf8(v) {
                    Ok(s) => Ok(Value::String(s)),
                    Err(_) => bail!("cannot decode value as text; bytes are not utf-8"),
                },
                _ => bail!("cannot decode value as text; value={value:?}"),
            },
            FieldType::Bytes => match value {
                Value::Bytes(_) => Ok(value),
                Value::String(v) => Ok(Value::Bytes(v.into_bytes())),
                _ => bail!("cannot decode value as bytes; value={value:?}"),
            },
            FieldType::Json => match value {
                Value::Json(_) => Ok(value),
                Value::String(v) => match serde_json::from_str(&v) {
                    Ok(json) => Ok(Value::Json(json)),
                    Err(err) => bail!("cannot decode value as json; {err}"),
                },
                Value::Bytes(v) => match serde_json::from_slice(&v) {
                    Ok(json) => Ok(Value::Json(json)),
                    Err(err) => bail!("cannot decode value as json; {err}"),
                },
                _ => bail!("cannot decode value as json; value={value:?}"),
            },
            FieldType::DateTime => match value {
                Value::Timestamp(_) => Ok(value),
                Value::String(v) => {
                    // The fractional part is optional in what the server hands back.
                    match NaiveDateTime::parse_from_str(&v, "%Y-%m-%d %H:%M:%S%.f") {
                        Ok(ts) => Ok(Value::Timestamp(ts)),
                        Err(_) => bail!("cannot decode value as date-time; value={v:?}"),
                    }
                }
                _ => bail!("cannot decode value as date-time; value={value:?}"),
            },
        }
    }

    /// Converts a semantic value into its storage form.
    pub fn encode(self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match self {
            FieldType::Int => match value {
                Value::I64(_) => Ok(value),
                Value::U64(v) if v <= i64::MAX as u64 => Ok(Value::I64(v as i64)),
                _ => bail!("cannot encode value as int; value={value:?}"),
            },
            FieldType::Uint => match value {
                Value::U64(_) => Ok(value),
                Value::I64(v) if v >= 0 => Ok(Value::U64(v as u64)),
                _ => bail!("cannot encode value as uint; value={value:?}"),
            },
            FieldType::Float => match value {
                Value::F64(_) => Ok(value),
                Value::I64(v) => Ok(Value::F64(v as f64)),
                Value::U64(v) => Ok(Value::F64(v as f64)),
                _ => bail!("cannot encode value as float; value={value:?}"),
            },
            FieldType::Bool => match value {
                Value::Bool(v) => Ok(Value::I64(v as i64)),
                Value::I64(0 | 1) => Ok(value),
                _ => bail!("cannot encode value as bool; value={value:?}"),
            },
            FieldType::Text => match value {
                Value::String(_) => Ok(value),
                _ => bail!("cannot encode value as text; value={value:?}"),
            },
            FieldType::Bytes => match value {
                Value::Bytes(_) => Ok(value),
                _ => bail!("cannot encode value as bytes; value={value:?}"),
            },
            FieldType::Json => match value {
                // `serde_json::Value` keeps object keys sorted, so the encoded
                // text is stable and safe to compare for dirty detection.
                Value::Json(v) => Ok(Value::String(v.to_string())),
                Value::String(_) => Ok(value),
                _ => bail!("cannot encode value as json; value={value:?}"),
            },
            FieldType::DateTime => match value {
                Value::Timestamp(ts) => {
                    Ok(Value::String(ts.format(DATE_TIME_FORMAT).to_string()))
                }
                Value::String(_) => Ok(value),
                _ => bail!("cannot encode value as date-time; value={value:?}"),
            },
        }
    }
}

/// Maps one entity property onto a storage column.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Name of the property on the entity side.
    pub property: String,
    /// Name of the column on the storage side.
    pub column: String,
    /// Storage type of the field.
    pub ty: FieldType,
}

/// Column names used for create / update stamping.
#[derive(Debug, Clone)]
pub struct Timestamps {
    pub created_at: String,
    pub updated_at: String,
}

/// Static description of an entity: its table, key, field mapping, and
/// capability columns.
///
/// Entities hold one `Descriptor` per type, built once and cached behind a
/// `OnceLock` in their [`Entity::descriptor`](crate::Entity::descriptor) impl.
#[derive(Debug, Clone)]
pub struct Descriptor {
    table: String,
    key: String,
    fields: Vec<FieldDef>,
    timestamps: Option<Timestamps>,
    external_id: Option<String>,
    version: Option<String>,
}

impl Descriptor {
    /// Starts building a descriptor for `table`.
    ///
    /// The key column defaults to `{table}_id` and must be declared as a
    /// field like every other column.
    pub fn builder(table: impl Into<String>) -> DescriptorBuilder {
        let table = table.into();
        assert!(!table.is_empty(), "table name is empty");

        DescriptorBuilder {
            key: format!("{table}_id"),
            table,
            fields: vec![],
            timestamps: None,
            external_id: None,
            version: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Name of the primary key column.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field by its entity-side property name.
    pub fn field(&self, property: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.property == property)
    }

    /// Looks up a field by its storage-side column name.
    pub fn field_by_column(&self, column: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.column == column)
    }

    /// The field backing the primary key column.
    pub fn key_field(&self) -> &FieldDef {
        self.field_by_column(&self.key)
            .expect("descriptor key column is always declared as a field")
    }

    pub fn timestamps(&self) -> Option<&Timestamps> {
        self.timestamps.as_ref()
    }

    /// Column holding the externally visible identifier, when enabled.
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Column holding the optimistic lock counter, when enabled.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Converts a storage row (column-keyed) into a semantic row
    /// (property-keyed), decoding each declared field.
    ///
    /// Columns the descriptor does not declare are dropped.
    pub fn decode_row(&self, raw: &Row) -> Result<Row> {
        let mut semantic = Row::new();
        for field in &self.fields {
            if let Some(value) = raw.get(&field.column) {
                let decoded = field.ty.decode(value.clone())?;
                semantic.insert(field.property.clone(), decoded);
            }
        }
        Ok(semantic)
    }

    /// Converts a semantic row (property-keyed) into a storage row
    /// (column-keyed), encoding each declared field.
    ///
    /// Properties absent from `semantic` are skipped, so a partial row stays
    /// partial.
    pub fn encode_row(&self, semantic: &Row) -> Result<Row> {
        let mut raw = Row::new();
        for field in &self.fields {
            if let Some(value) = semantic.get(&field.property) {
                let encoded = field.ty.encode(value.clone())?;
                raw.insert(field.column.clone(), encoded);
            }
        }
        Ok(raw)
    }
}

/// Builds a [`Descriptor`].
#[derive(Debug)]
pub struct DescriptorBuilder {
    table: String,
    key: String,
    fields: Vec<FieldDef>,
    timestamps: Option<Timestamps>,
    external_id: Option<String>,
    version: Option<String>,
}

impl DescriptorBuilder {
    /// Overrides the primary key column.
    pub fn key(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        assert!(!column.is_empty(), "key column name is empty");
        self.key = column;
        self
    }

    /// Declares a field whose property and column share a name.
    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        self.field_as(name.clone(), name, ty)
    }

    /// Declares a field whose property and column names differ.
    pub fn field_as(
        mut self,
        property: impl Into<String>,
        column: impl Into<String>,
        ty: FieldType,
    ) -> Self {
        let property = property.into();
        let column = column.into();
        assert!(!property.is_empty(), "field property name is empty");
        assert!(!column.is_empty(), "field column name is empty");
        assert!(
            self.fields.iter().all(|field| field.property != property),
            "duplicate field property: {property:?}"
        );
        assert!(
            self.fields.iter().all(|field| field.column != column),
            "duplicate field column: {column:?}"
        );

        self.fields.push(FieldDef {
            property,
            column,
            ty,
        });
        self
    }

    /// Enables create / update stamping on the conventional
    /// `created_at` / `updated_at` columns.
    pub fn timestamped(mut self) -> Self {
        assert!(self.timestamps.is_none(), "timestamps already enabled");
        self.timestamps = Some(Timestamps {
            created_at: "created_at".to_string(),
            updated_at: "updated_at".to_string(),
        });
        self.field("created_at", FieldType::DateTime)
            .field("updated_at", FieldType::DateTime)
    }

    /// Enables an externally visible identifier on the conventional
    /// `external_id` column, assigned on first save.
    pub fn identified(mut self) -> Self {
        assert!(self.external_id.is_none(), "external id already enabled");
        self.external_id = Some("external_id".to_string());
        self.field("external_id", FieldType::Text)
    }

    /// Enables optimistic locking on the conventional `version` column.
    pub fn versioned(mut self) -> Self {
        assert!(self.version.is_none(), "versioning already enabled");
        self.version = Some("version".to_string());
        self.field("version", FieldType::Int)
    }

    /// Finishes the descriptor.
    ///
    /// # Panics
    ///
    /// Panics when the key column was never declared as a field.
    pub fn build(self) -> Descriptor {
        assert!(
            self.fields.iter().any(|field| field.column == self.key),
            "key column {:?} is not declared as a field",
            self.key
        );

        Descriptor {
            table: self.table,
            key: self.key,
            fields: self.fields,
            timestamps: self.timestamps,
            external_id: self.external_id,
            version: self.version,
        }
    }
}
