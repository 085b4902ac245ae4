//! Procedural macros for generating database table metadata and operations
//!
//! This crate provides the `#[model]` macro and `TableMetadata` derive for automatic
//! generation of database operations and metadata for struct types.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod model_macro;
mod parsing;
mod sql_generation;

use model_macro::model_attribute;
use parsing::{parse_field_attributes, parse_table_attributes};
use sql_generation::{
    generate_aggregate_impl, generate_column_enum, generate_database_executor_impl,
    generate_reference_impl, generate_table_metadata_impl,
};

/// Derive macro for TableMetadata trait
///
/// Note: It's recommended to use the `#[model]` attribute macro instead,
/// which automatically includes this derive along with other necessary derives.
///
/// Besides `TableMetadata` the derive emits a `<Model>Column` enumeration,
/// a `DatabaseExecutor` impl, `AggregateOwned` when a field carries
/// `#[aggregate_id]` and `ReferenceData` for `#[table(reference)]`.
///
/// ```ignore
/// #[model]
/// #[table(name = "character_wallets", auto_increment)]
/// pub struct CharacterWallet {
///     #[primary_key]
///     pub id: i64,
///
///     #[aggregate_id]
///     #[unique]
///     #[field(create, update)]
///     pub character_id: Uuid,
///
///     #[field(create, update)]
///     pub gold: i64,
///
///     #[field(readonly)]
///     pub __updated_at__: DateTime<Utc>,
/// }
/// ```
#[proc_macro_derive(
    TableMetadata,
    attributes(table, primary_key, field, readonly, aggregate_id, index, unique)
)]
pub fn derive_table_metadata(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    // Parse table attributes - handle errors properly
    let table_info = match parse_table_attributes(&input.attrs) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };

    // Parse field attributes - handle errors properly
    let field_info = match parse_field_attributes(&input.data, &table_info) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let column_enum = generate_column_enum(name, &field_info);
    let table_metadata_impl = generate_table_metadata_impl(name, &table_info, &field_info);
    let database_executor_impl = generate_database_executor_impl(name, &table_info, &field_info);
    let aggregate_impl = generate_aggregate_impl(name, &field_info);
    let reference_impl = generate_reference_impl(name, &table_info);

    let expanded = quote::quote! {
        #column_enum
        #table_metadata_impl
        #database_executor_impl
        #aggregate_impl
        #reference_impl
    };

    TokenStream::from(expanded)
}

/// Convenience attribute macro that adds all necessary derives for a database model
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
