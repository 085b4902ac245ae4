use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error};

/// Convenience attribute macro that adds all necessary derives for a database model
///
/// Usage:
/// ```ignore
/// use realmstore::prelude::*;
///
/// #[model]
/// #[table(name = "realms", reference)]
/// pub struct Realm {
///     #[primary_key]
///     #[field(create)]
///     pub level: i32,
///     #[field(create, update)]
///     pub name: String,
/// }
/// ```
pub fn model_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let attrs = &input.attrs;
    let vis = &input.vis;
    let generics = &input.generics;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Error::new_spanned(name, "#[model] can only be used on structs")
                .to_compile_error()
                .into()
        }
    };

    let expanded = quote! {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::sqlx::FromRow,
            ::table_derive::TableMetadata
        )]
        #(#attrs)*
        #vis struct #name #generics #fields
    };

    TokenStream::from(expanded)
}
