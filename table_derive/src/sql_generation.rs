//! SQL code generation for database operations
//!
//! All statements are rendered while the macro expands, so the generated
//! trait methods hand out `&'static str` constants.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;
use type_mapping::{is_optional_type, rust_type_to_pg_type};

use crate::parsing::{ColumnInfo, FieldInfo, TableInfo};

/// Quote an identifier that already passed parse-time validation
fn quoted(name: &str) -> String {
    format!("\"{}\"", name)
}

pub fn insert_sql(table_info: &TableInfo, field_info: &FieldInfo) -> String {
    let create_fields = field_info.create_fields();
    let pk = quoted(&field_info.primary_key().name);

    if create_fields.is_empty() {
        return format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quoted(&table_info.name),
            pk
        );
    }

    let names: Vec<_> = create_fields.iter().map(|c| quoted(&c.name)).collect();
    let placeholders: Vec<_> = (1..=create_fields.len())
        .map(|i| format!("${}", i))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(&table_info.name),
        names.join(", "),
        placeholders.join(", "),
        pk
    )
}

fn column_definition(column: &ColumnInfo, is_primary_key: bool, auto_increment: bool) -> String {
    if is_primary_key {
        let pg_type = if auto_increment {
            match column.rust_type.as_str() {
                "i16" => "SMALLSERIAL",
                "i32" => "SERIAL",
                _ => "BIGSERIAL",
            }
        } else {
            rust_type_to_pg_type(&column.rust_type)
        };
        return format!("{} {} PRIMARY KEY", quoted(&column.name), pg_type);
    }

    let mut definition = format!(
        "{} {}",
        quoted(&column.name),
        rust_type_to_pg_type(&column.rust_type)
    );
    if !is_optional_type(&column.rust_type) {
        definition.push_str(" NOT NULL");
    }
    if column.unique {
        definition.push_str(" UNIQUE");
    }
    definition
}

pub fn create_table_sql(table_info: &TableInfo, field_info: &FieldInfo) -> String {
    let mut definitions: Vec<String> = field_info
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !crate::parsing::is_system_field(&c.name))
        .map(|(i, c)| column_definition(c, i == field_info.primary_key, table_info.has_auto_increment))
        .collect();

    definitions.push("\"__created_at__\" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()".to_string());
    definitions.push("\"__updated_at__\" TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()".to_string());

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(&table_info.name),
        definitions.join(", ")
    )
}

/// Plain indexes for `#[index]` and `#[aggregate_id]` columns; UNIQUE columns
/// are indexed by their constraint
pub fn create_indexes_sql(table_info: &TableInfo, field_info: &FieldInfo) -> Vec<String> {
    field_info
        .columns
        .iter()
        .enumerate()
        .filter(|(i, c)| (c.indexed || field_info.aggregate == Some(*i)) && !c.unique)
        .map(|(_, c)| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quoted(&format!("idx_{}_{}", table_info.name, c.name)),
                quoted(&table_info.name),
                quoted(&c.name)
            )
        })
        .collect()
}

pub fn column_enum_ident(name: &Ident) -> Ident {
    format_ident!("{}Column", name)
}

/// `<Model>Column` enumeration with its `ColumnName` impl
pub fn generate_column_enum(name: &Ident, field_info: &FieldInfo) -> TokenStream {
    let enum_ident = column_enum_ident(name);
    let variants: Vec<_> = field_info.columns.iter().map(|c| &c.variant).collect();
    let column_names: Vec<_> = field_info.columns.iter().map(|c| c.name.as_str()).collect();
    let doc = format!("Columns of the `{}` table", name);

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #enum_ident {
            #(#variants),*
        }

        impl #enum_ident {
            /// Every column in declaration order
            pub const ALL: &'static [#enum_ident] = &[#(#enum_ident::#variants),*];
        }

        impl ::store_object::ColumnName for #enum_ident {
            fn as_str(&self) -> &'static str {
                match self {
                    #(#enum_ident::#variants => #column_names),*
                }
            }
        }
    }
}

pub fn generate_table_metadata_impl(
    name: &Ident,
    table_info: &TableInfo,
    field_info: &FieldInfo,
) -> TokenStream {
    let table_name = &table_info.name;
    let table = quoted(table_name);
    let enum_ident = column_enum_ident(name);

    let pk = field_info.primary_key();
    let pk_ident = &pk.ident;
    let pk_type = &pk.ty;
    let pk_name = &pk.name;
    let pk_variant = &pk.variant;
    let pk_quoted = quoted(pk_name);

    let create_fields: Vec<_> = field_info.create_fields().iter().map(|c| c.name.clone()).collect();
    let update_fields: Vec<_> = field_info.update_fields().iter().map(|c| c.name.clone()).collect();

    let insert_sql = insert_sql(table_info, field_info);
    let select_base_sql = format!("SELECT * FROM {}", table);
    let count_base_sql = format!("SELECT COUNT(*) FROM {}", table);
    let get_by_id_sql = format!("SELECT * FROM {} WHERE {} = $1", table, pk_quoted);
    let lock_by_id_sql = format!("{} FOR UPDATE", get_by_id_sql);
    let delete_by_id_sql = format!("DELETE FROM {} WHERE {} = $1", table, pk_quoted);
    let create_table_sql = create_table_sql(table_info, field_info);
    let indexes_sql = create_indexes_sql(table_info, field_info);

    quote! {
        impl ::store_object::TableMetadata for #name {
            type Id = #pk_type;
            type Column = #enum_ident;

            fn table_name() -> &'static str {
                #table_name
            }

            fn primary_key_field() -> &'static str {
                #pk_name
            }

            fn primary_key_column() -> Self::Column {
                #enum_ident::#pk_variant
            }

            fn create_fields() -> &'static [&'static str] {
                &[#(#create_fields),*]
            }

            fn update_fields() -> &'static [&'static str] {
                &[#(#update_fields),*]
            }

            fn insert_sql() -> &'static str {
                #insert_sql
            }

            fn select_base_sql() -> &'static str {
                #select_base_sql
            }

            fn count_base_sql() -> &'static str {
                #count_base_sql
            }

            fn get_by_id_sql() -> &'static str {
                #get_by_id_sql
            }

            fn lock_by_id_sql() -> &'static str {
                #lock_by_id_sql
            }

            fn delete_by_id_sql() -> &'static str {
                #delete_by_id_sql
            }

            fn extract_id(&self) -> Self::Id {
                ::core::clone::Clone::clone(&self.#pk_ident)
            }

            fn create_table_sql() -> String {
                #create_table_sql.to_string()
            }

            fn create_indexes_sql() -> Vec<String> {
                vec![#(#indexes_sql.to_string()),*]
            }
        }
    }
}

/// Generate DatabaseExecutor trait implementation with typed binds
pub fn generate_database_executor_impl(
    name: &Ident,
    table_info: &TableInfo,
    field_info: &FieldInfo,
) -> TokenStream {
    let table_name = &table_info.name;
    let pk_type = &field_info.primary_key().ty;

    // Binding expressions for create fields, in placeholder order
    let create_bind_calls: Vec<_> = field_info
        .create_fields()
        .iter()
        .map(|c| {
            let field_ident = &c.ident;
            quote! { .bind(::core::clone::Clone::clone(&self.#field_ident)) }
        })
        .collect();

    quote! {
        #[::async_trait::async_trait]
        impl ::store_object::DatabaseExecutor for #name {
            async fn execute_insert(
                &self,
                conn: &mut ::sqlx::PgConnection,
            ) -> ::core::result::Result<::core::option::Option<#pk_type>, ::store_object::StoreError> {
                ::sqlx::query_scalar::<_, #pk_type>(
                    <Self as ::store_object::TableMetadata>::insert_sql(),
                )
                #(#create_bind_calls)*
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| ::store_object::StoreError::database(#table_name, "insert", e))
            }
        }
    }
}

/// `AggregateOwned` for a model with an `#[aggregate_id]` field
pub fn generate_aggregate_impl(name: &Ident, field_info: &FieldInfo) -> TokenStream {
    let Some(column) = field_info.aggregate() else {
        return TokenStream::new();
    };
    let enum_ident = column_enum_ident(name);
    let field_ident = &column.ident;
    let field_type = &column.ty;
    let variant = &column.variant;

    quote! {
        impl ::store_object::AggregateOwned for #name {
            type AggregateId = #field_type;

            fn aggregate_column() -> Self::Column {
                #enum_ident::#variant
            }

            fn aggregate_id(&self) -> Self::AggregateId {
                ::core::clone::Clone::clone(&self.#field_ident)
            }

            fn set_aggregate_id(&mut self, id: Self::AggregateId) {
                self.#field_ident = id;
            }
        }
    }
}

pub fn generate_reference_impl(name: &Ident, table_info: &TableInfo) -> TokenStream {
    if !table_info.is_reference {
        return TokenStream::new();
    }
    quote! {
        impl ::store_object::ReferenceData for #name {}
    }
}
