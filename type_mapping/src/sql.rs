//! SQL type conversion utilities
//!
//! This module handles conversion between Rust type names, as they appear in
//! model structs, and the PostgreSQL column types used for DDL generation.

/// Map Rust type names to PostgreSQL types for DDL generation
pub fn rust_type_to_pg_type(rust_type: &str) -> &'static str {
    // Normalize type string by removing all whitespace for consistent matching
    let normalized = rust_type.replace(' ', "");
    let inner = strip_option(&normalized);
    match inner {
        "Uuid" | "uuid::Uuid" => "UUID",
        "String" => "VARCHAR",
        "i8" | "i16" => "SMALLINT",
        "i32" | "u16" => "INTEGER",
        "i64" | "u32" => "BIGINT",
        "u64" => "NUMERIC(20,0)", // PostgreSQL doesn't have native u64
        "f32" => "REAL",
        "f64" => "DOUBLE PRECISION",
        "bool" => "BOOLEAN",
        "DateTime<Utc>"
        | "chrono::DateTime<chrono::Utc>"
        | "chrono::NaiveDateTime"
        | "NaiveDateTime" => "TIMESTAMP WITH TIME ZONE",
        "chrono::NaiveDate" | "NaiveDate" => "DATE",
        "serde_json::Value" => "JSONB",
        "Vec<String>" => "TEXT[]",
        _ => "VARCHAR", // default fallback
    }
}

/// Check if a Rust type is Optional (nullable in SQL)
pub fn is_optional_type(rust_type: &str) -> bool {
    let normalized = rust_type.replace(' ', "");
    normalized.starts_with("Option<") || normalized.starts_with("std::option::Option<")
}

fn strip_option(normalized: &str) -> &str {
    normalized
        .strip_prefix("std::option::Option<")
        .or_else(|| normalized.strip_prefix("Option<"))
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(normalized)
}
