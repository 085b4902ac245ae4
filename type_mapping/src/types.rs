//! Bind values
//!
//! Every value that ends up as a statement parameter is carried as a
//! `PostgresValue`. Each variant keeps its SQL type even when the value is
//! NULL, so a NULL bound into an INTEGER column is sent as a typed INT4 NULL.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum PostgresValue {
    Text(Option<String>),
    SmallInt(Option<i16>),
    Integer(Option<i32>),
    BigInt(Option<i64>),
    Double(Option<f64>),
    Boolean(Option<bool>),
    Uuid(Option<Uuid>),
    Timestamp(Option<DateTime<Utc>>),
}

impl PostgresValue {
    /// True when the value is a (typed) NULL
    pub fn is_null(&self) -> bool {
        match self {
            PostgresValue::Text(v) => v.is_none(),
            PostgresValue::SmallInt(v) => v.is_none(),
            PostgresValue::Integer(v) => v.is_none(),
            PostgresValue::BigInt(v) => v.is_none(),
            PostgresValue::Double(v) => v.is_none(),
            PostgresValue::Boolean(v) => v.is_none(),
            PostgresValue::Uuid(v) => v.is_none(),
            PostgresValue::Timestamp(v) => v.is_none(),
        }
    }

    /// PostgreSQL type name of the value, used in log output
    pub fn pg_type(&self) -> &'static str {
        match self {
            PostgresValue::Text(_) => "VARCHAR",
            PostgresValue::SmallInt(_) => "SMALLINT",
            PostgresValue::Integer(_) => "INTEGER",
            PostgresValue::BigInt(_) => "BIGINT",
            PostgresValue::Double(_) => "DOUBLE PRECISION",
            PostgresValue::Boolean(_) => "BOOLEAN",
            PostgresValue::Uuid(_) => "UUID",
            PostgresValue::Timestamp(_) => "TIMESTAMP WITH TIME ZONE",
        }
    }
}

macro_rules! impl_from_value {
    ($($rust_type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$rust_type> for PostgresValue {
                fn from(val: $rust_type) -> Self {
                    PostgresValue::$variant(Some(val))
                }
            }

            impl From<Option<$rust_type>> for PostgresValue {
                fn from(val: Option<$rust_type>) -> Self {
                    PostgresValue::$variant(val)
                }
            }
        )*
    };
}

impl_from_value! {
    String => Text,
    i16 => SmallInt,
    i32 => Integer,
    i64 => BigInt,
    f64 => Double,
    bool => Boolean,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
}

impl From<&str> for PostgresValue {
    fn from(val: &str) -> Self {
        PostgresValue::Text(Some(val.to_string()))
    }
}

impl From<&String> for PostgresValue {
    fn from(val: &String) -> Self {
        PostgresValue::Text(Some(val.clone()))
    }
}

impl From<&Uuid> for PostgresValue {
    fn from(val: &Uuid) -> Self {
        PostgresValue::Uuid(Some(*val))
    }
}
