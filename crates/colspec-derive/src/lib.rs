//! Derive macro producing table snapshots.
//!
//! This crate provides `#[derive(Describe)]`, which implements
//! `colspec_migrate::snapshot::Describe` for a struct so that its current
//! snapshot can be diffed against a stored baseline.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta};

/// Derives `Describe` for a struct with named fields.
///
/// Each field becomes one snapshot entry keyed by the Rust field name, so
/// renaming the column through `#[column(name = "...")]` is detected as a
/// rename rather than a drop and an add.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(spec = "field:<type> [clauses]")]` - Constraint spec. Fields
///   without one are virtual and never become columns.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Describe)]
/// #[table(name = "users")]
/// struct User {
///     #[column(spec = "field:bigserial not null primary key")]
///     id: i64,
///     #[column(name = "email_address", spec = "field:text not null unique")]
///     email: String,
///     session: Option<String>,
/// }
/// ```
#[proc_macro_derive(Describe, attributes(table, column))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_describe_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_describe_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Describe derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Describe derive only supports structs",
            ));
        }
    };

    let mut entries: Vec<TokenStream2> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let id = ident.unraw().to_string();
        let attrs = parse_column_attrs(&field.attrs)?;
        let name = attrs.name.unwrap_or_else(|| id.clone());
        let spec = attrs.spec.unwrap_or_default();

        entries.push(quote! {
            .with_field(
                #id,
                ::colspec_migrate::snapshot::FieldDescriptor::new(#name, #spec),
            )
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::colspec_migrate::snapshot::Describe
            for #struct_name #ty_generics #where_clause
        {
            const TABLE_NAME: &'static str = #table_name;

            fn describe() -> ::colspec_migrate::snapshot::Snapshot {
                ::colspec_migrate::snapshot::Snapshot::new()
                    #(#entries)*
            }
        }
    })
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    spec: Option<String>,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("table") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    table_name = parse_str_value(&meta)?;
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute, expected `name`"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    result.name = parse_str_value(&meta)?;
                } else if meta.path.is_ident("spec") {
                    result.spec = parse_str_value(&meta)?;
                } else {
                    return Err(meta.error("unsupported column attribute, expected `name` or `spec`"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn parse_str_value(meta: &ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = lit.lit {
            return Ok(Some(s.value()));
        }
    }
    Err(meta.error("expected a string literal"))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
