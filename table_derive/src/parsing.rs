//! Parsing utilities for table and field attributes
//!
//! This module handles the parsing of `#[table]` and `#[field]` attributes
//! and validation of table and field names.

use quote::quote;
use std::collections::HashSet;
use syn::{
    parse::Parse, parse::ParseStream, Attribute, Data, Error, Fields, Ident, Meta, Result, Token,
    Type,
};

/// Validate table name and return syn::Error for better proc macro error handling
pub fn validate_table_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid table name '{}': {}", name, e)))
}

/// Validate field name and return syn::Error for better proc macro error handling
pub fn validate_field_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    // System columns use reserved names on purpose
    if is_system_field(name) {
        return Ok(());
    }

    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid field name '{}': {}", name, e)))
}

/// Timestamp columns every table carries
pub fn is_system_field(name: &str) -> bool {
    matches!(name, "__created_at__" | "__updated_at__")
}

fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    // Check if empty
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    // Check length (PostgreSQL limit)
    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    // Check first character (must be letter or underscore)
    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    // Check all characters (alphanumeric or underscore only)
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    if is_reserved_keyword(name) {
        return Err(format!("Name '{}' is a reserved SQL keyword", name));
    }

    Ok(())
}

/// Check if a name is a reserved SQL keyword
fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        // SQL Standard keywords
        "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "JOIN", "INNER", "LEFT",
        "RIGHT", "FULL", "OUTER", "ON", "AS", "AND", "OR", "NOT", "NULL", "TRUE", "FALSE",
        "CASE", "WHEN", "THEN", "ELSE", "END", "IF", "EXISTS", "IN", "LIKE", "BETWEEN",
        "ORDER", "BY", "GROUP", "HAVING", "LIMIT", "OFFSET", "UNION", "ALL", "DISTINCT",
        "CREATE", "DROP", "ALTER", "TABLE", "INDEX", "VIEW", "DATABASE", "SCHEMA", "PRIMARY",
        "KEY", "FOREIGN", "REFERENCES", "UNIQUE", "CHECK", "DEFAULT", "CONSTRAINT", "COLUMN",
        "ADD", "MODIFY", "RENAME", "TO",
        // PostgreSQL specific keywords
        "SERIAL", "BIGSERIAL", "SMALLSERIAL", "TEXT", "VARCHAR", "CHAR", "INTEGER", "BIGINT",
        "SMALLINT", "DECIMAL", "NUMERIC", "REAL", "DOUBLE", "PRECISION", "BOOLEAN", "DATE",
        "TIME", "TIMESTAMP", "TIMESTAMPTZ", "INTERVAL", "UUID", "JSON", "JSONB", "ARRAY",
        "RETURNING", "CONFLICT", "NOTHING", "EXCLUDED", "GENERATED", "ALWAYS", "STORED",
        "IDENTITY", "SEQUENCE", "TRIGGER", "FUNCTION", "PROCEDURE", "LANGUAGE", "PLPGSQL",
        "DECLARE", "BEGIN", "EXCEPTION",
        // System columns, only valid under their exact lowercase names
        "__CREATED_AT__", "__UPDATED_AT__",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

/// `snake_case` / `__system__` field name to a PascalCase enum variant
pub fn column_variant_name(field_name: &str) -> String {
    field_name
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[derive(Debug)]
struct FieldOperations {
    operations: Vec<Ident>,
}

impl Parse for FieldOperations {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut operations = Vec::new();

        while !input.is_empty() {
            let op: Ident = input.parse()?;
            operations.push(op);

            if input.peek(Token![,]) {
                let _: Token![,] = input.parse()?;
            }
        }

        Ok(FieldOperations { operations })
    }
}

#[derive(Debug)]
pub struct TableInfo {
    pub name: String,
    pub has_auto_increment: bool,
    pub is_reference: bool,
}

/// One struct field and the column it maps to
#[derive(Debug)]
pub struct ColumnInfo {
    pub ident: Ident,
    pub name: String,
    pub variant: Ident,
    pub ty: Type,
    /// Rust type with whitespace removed
    pub rust_type: String,
    pub create: bool,
    pub update: bool,
    pub indexed: bool,
    pub unique: bool,
}

#[derive(Debug)]
pub struct FieldInfo {
    /// Every field in declaration order
    pub columns: Vec<ColumnInfo>,
    pub primary_key: usize,
    pub aggregate: Option<usize>,
}

impl FieldInfo {
    pub fn primary_key(&self) -> &ColumnInfo {
        &self.columns[self.primary_key]
    }

    pub fn aggregate(&self) -> Option<&ColumnInfo> {
        self.aggregate.map(|i| &self.columns[i])
    }

    pub fn create_fields(&self) -> Vec<&ColumnInfo> {
        self.columns.iter().filter(|c| c.create).collect()
    }

    pub fn update_fields(&self) -> Vec<&ColumnInfo> {
        self.columns.iter().filter(|c| c.update).collect()
    }
}

pub fn parse_table_attributes(attrs: &[Attribute]) -> Result<TableInfo> {
    let mut table_name = None;
    let mut has_auto_increment = false;
    let mut is_reference = false;

    for attr in attrs {
        if attr.path().is_ident("table") {
            if let Meta::List(meta_list) = &attr.meta {
                // Parse nested tokens manually: `name = "..."` pairs and bare flags
                let mut tokens = meta_list.tokens.clone().into_iter().peekable();

                while let Some(token) = tokens.next() {
                    if let proc_macro2::TokenTree::Ident(key) = token {
                        let key_str = key.to_string();

                        // Expect '=' after key
                        if let Some(proc_macro2::TokenTree::Punct(punct)) = tokens.peek() {
                            if punct.as_char() == '=' {
                                tokens.next(); // consume '='

                                if let Some(proc_macro2::TokenTree::Literal(lit)) = tokens.next() {
                                    let value = lit.to_string().trim_matches('"').to_string();
                                    if key_str == "name" {
                                        table_name = Some((value, lit.span()));
                                    }
                                }
                            }
                        }

                        // Skip comma if present
                        if let Some(proc_macro2::TokenTree::Punct(punct)) = tokens.peek() {
                            if punct.as_char() == ',' {
                                tokens.next();
                            }
                        }

                        match key_str.as_str() {
                            "auto_increment" => has_auto_increment = true,
                            "reference" => is_reference = true,
                            "name" => {}
                            other => {
                                return Err(Error::new(
                                    key.span(),
                                    format!("unknown table option '{}'", other),
                                ))
                            }
                        }
                    }
                }
            }
        }
    }

    let (table_name, span) = table_name.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "table attribute is required: add #[table(name = \"table_name\")] to your struct",
        )
    })?;

    // Validate table name at compile time with proper error handling
    validate_table_name_syn(&table_name, span)?;

    Ok(TableInfo {
        name: table_name,
        has_auto_increment,
        is_reference,
    })
}

pub fn parse_field_attributes(data: &Data, table_info: &TableInfo) -> Result<FieldInfo> {
    let fields_named = match data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => fields_named,
            _ => {
                return Err(Error::new(
                    proc_macro2::Span::call_site(),
                    "TableMetadata can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                proc_macro2::Span::call_site(),
                "TableMetadata can only be derived for structs with named fields",
            ))
        }
    };

    let mut columns: Vec<ColumnInfo> = Vec::new();
    let mut primary_key = None;
    let mut aggregate = None;
    let mut variants = HashSet::new();

    for field in &fields_named.named {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;
        let field_name_str = field_name.to_string();

        // Validate field name at compile time with proper error handling
        validate_field_name_syn(&field_name_str, field_name.span())?;

        let ty = &field.ty;
        // Normalize type string by removing all whitespace for consistent matching
        let rust_type = quote!(#ty).to_string().replace(' ', "");

        let variant_name = column_variant_name(&field_name_str);
        if !variants.insert(variant_name.clone()) {
            return Err(Error::new(
                field_name.span(),
                format!("field '{}' maps to a duplicate column variant '{}'", field_name_str, variant_name),
            ));
        }

        let is_primary_key = has_attribute(&field.attrs, "primary_key");
        let is_readonly = is_readonly_field(&field.attrs) || is_system_field(&field_name_str);
        let operations = parse_field_operations(&field.attrs).unwrap_or_default();
        let create = !is_readonly && operations.iter().any(|op| op == "create");
        let update = !is_readonly && operations.iter().any(|op| op == "update");

        if is_primary_key {
            if primary_key.is_some() {
                return Err(Error::new(field_name.span(), "only one #[primary_key] field is allowed"));
            }
            if update {
                return Err(Error::new(field_name.span(), "the primary key cannot be updatable"));
            }
            if table_info.has_auto_increment && create {
                return Err(Error::new(
                    field_name.span(),
                    "an auto_increment primary key is generated by the database; remove `create`",
                ));
            }
            if !table_info.has_auto_increment && !create {
                return Err(Error::new(
                    field_name.span(),
                    "the primary key must be #[field(create)] unless the table is auto_increment",
                ));
            }
            primary_key = Some(columns.len());
        }

        if has_attribute(&field.attrs, "aggregate_id") {
            if aggregate.is_some() {
                return Err(Error::new(field_name.span(), "only one #[aggregate_id] field is allowed"));
            }
            aggregate = Some(columns.len());
        }

        columns.push(ColumnInfo {
            ident: field_name.clone(),
            name: field_name_str,
            variant: Ident::new(&variant_name, field_name.span()),
            ty: ty.clone(),
            rust_type,
            create,
            update,
            indexed: has_attribute(&field.attrs, "index"),
            unique: has_attribute(&field.attrs, "unique"),
        });
    }

    let primary_key = primary_key.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "a #[primary_key] field is required",
        )
    })?;

    Ok(FieldInfo {
        columns,
        primary_key,
        aggregate,
    })
}

pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

fn is_readonly_field(attrs: &[Attribute]) -> bool {
    has_attribute(attrs, "readonly")
        || parse_field_operations(attrs)
            .map(|ops| ops.iter().any(|op| op == "readonly"))
            .unwrap_or(false)
}

pub fn parse_field_operations(attrs: &[Attribute]) -> Option<Vec<String>> {
    for attr in attrs {
        if attr.path().is_ident("field") {
            return match &attr.meta {
                Meta::List(meta_list) => {
                    let mut operations = Vec::new();

                    if let Ok(field_ops) = meta_list.parse_args::<FieldOperations>() {
                        for ident in field_ops.operations {
                            match ident.to_string().as_str() {
                                "create" => operations.push("create".to_string()),
                                "update" => operations.push("update".to_string()),
                                "readonly" => operations.push("readonly".to_string()),
                                _ => {} // Ignore unknown operations
                            }
                        }
                    }

                    Some(operations)
                }
                // #[field] without arguments - default behavior
                Meta::Path(_) => Some(vec!["create".to_string(), "update".to_string()]),
                // #[field = "value"] - not supported
                Meta::NameValue(_) => None,
            };
        }
    }

    None
}
