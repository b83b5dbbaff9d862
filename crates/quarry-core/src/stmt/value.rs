use crate::Result;

use chrono::{DateTime, NaiveDateTime, Utc};

/// A scalar carried in statement bindings and result rows.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Raw byte string
    Bytes(Vec<u8>),

    /// 64-bit float
    F64(f64),

    /// Signed 64-bit integer
    I64(i64),

    /// Structured document, stored encoded as text
    Json(serde_json::Value),

    /// Null value
    #[default]
    Null,

    /// String value
    String(String),

    /// Date and time, without timezone
    Timestamp(NaiveDateTime),

    /// Unsigned 64-bit integer
    U64(u64),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn to_bool(self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(v),
            _ => crate::bail!("cannot convert value to bool; value={self:?}"),
        }
    }

    pub fn to_i64(self) -> Result<i64> {
        match self {
            Self::I64(v) => Ok(v),
            _ => crate::bail!("cannot convert value to i64; value={self:?}"),
        }
    }

    pub fn to_option_i64(self) -> Result<Option<i64>> {
        match self {
            Self::Null => Ok(None),
            Self::I64(v) => Ok(Some(v)),
            _ => crate::bail!("cannot convert value to i64; value={self:?}"),
        }
    }

    pub fn to_u64(self) -> Result<u64> {
        match self {
            Self::U64(v) => Ok(v),
            _ => crate::bail!("cannot convert value to u64; value={self:?}"),
        }
    }

    pub fn to_f64(self) -> Result<f64> {
        match self {
            Self::F64(v) => Ok(v),
            _ => crate::bail!("cannot convert value to f64; value={self:?}"),
        }
    }

    pub fn to_string(self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v),
            _ => crate::bail!("cannot convert value to String; value={self:?}"),
        }
    }

    pub fn to_option_string(self) -> Result<Option<String>> {
        match self {
            Self::Null => Ok(None),
            Self::String(v) => Ok(Some(v)),
            _ => crate::bail!("cannot convert value to String; value={self:?}"),
        }
    }

    pub fn to_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(v) => Ok(v),
            _ => crate::bail!("cannot convert value to bytes; value={self:?}"),
        }
    }

    pub fn to_json(self) -> Result<serde_json::Value> {
        match self {
            Self::Json(v) => Ok(v),
            _ => crate::bail!("cannot convert value to json; value={self:?}"),
        }
    }

    pub fn to_timestamp(self) -> Result<NaiveDateTime> {
        match self {
            Self::Timestamp(v) => Ok(v),
            _ => crate::bail!("cannot convert value to timestamp; value={self:?}"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(&**v),
            _ => None,
        }
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl AsRef<Self> for Value {
    fn as_ref(&self) -> &Self {
        self
    }
}

// Rendering used for key strings in errors and binding summaries in logs;
// not SQL-escaped.
impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Self::F64(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::Json(v) => write!(f, "{}", v),
            Self::Null => f.write_str("NULL"),
            Self::String(v) => f.write_str(v),
            Self::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            Self::U64(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident: $( $src:ty ),*) => {
        $(
            impl From<$src> for Value {
                fn from(src: $src) -> Self {
                    Self::$variant(src.into())
                }
            }
        )*
    };
}

impl_from_int!(I64: i8, i16, i32, i64);
impl_from_int!(U64: u8, u16, u32, u64);
impl_from_int!(F64: f32, f64);

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Self {
        Self::Bytes(src)
    }
}

impl From<&[u8]> for Value {
    fn from(src: &[u8]) -> Self {
        Self::Bytes(src.to_vec())
    }
}

impl From<serde_json::Value> for Value {
    fn from(src: serde_json::Value) -> Self {
        Self::Json(src)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(src: NaiveDateTime) -> Self {
        Self::Timestamp(src)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(src: DateTime<Utc>) -> Self {
        Self::Timestamp(src.naive_utc())
    }
}

impl<T> From<Option<T>> for Value
where
    Self: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::from(value),
            None => Self::Null,
        }
    }
}
