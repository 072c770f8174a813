//! Derive macro describing Rust structs as table schemas.
//!
//! This crate provides `#[derive(Schema)]`, which implements
//! `oxide_schema_core::model::Schema` so a struct can be mapped to a
//! `Table` by `TableMapper`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitInt, LitStr, Meta, Type, parse_macro_input};

/// Derives `Schema` for a struct with named fields.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to the table name mapper applied to the struct name)
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
/// - `#[column(sql_type = "DECIMAL(10,2)")]` - Overrides the mapped type
/// - `#[column(length = 64, length2 = 2)]` - Overrides length and scale
/// - `#[column(primary_key)]`, `#[column(autoincrement)]`
/// - `#[column(nullable)]` / `#[column(not_null)]` - Overrides the
///   nullability implied by `Option`
/// - `#[column(default = "expr")]` - Sets a raw SQL default expression
/// - `#[column(created)]`, `#[column(updated)]`, `#[column(version)]`,
///   `#[column(cascade)]`
/// - `#[column(index)]` / `#[column(index = "name")]` - Adds the column to
///   a non-unique index; fields sharing a name form a composite index
/// - `#[column(unique)]` / `#[column(unique = "name")]` - Same, unique
/// - `#[column(comment = "text")]`
/// - `#[column(ignore)]` - The field has no column
/// - `#[column(extends)]` - The field's type derives `Schema` too and its
///   columns are inlined
#[proc_macro_derive(Schema, attributes(table, column))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_schema_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_schema_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();
    let table_name = opt_str(get_table_name(&input.attrs)?.as_deref());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Schema derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Schema derive only supports structs",
            ));
        }
    };

    let mut field_defs: Vec<TokenStream2> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        field_defs.push(field_def(&ident.to_string(), &field.ty, &attrs));
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::oxide_schema_core::model::Schema for #struct_name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
            const TABLE_NAME: ::core::option::Option<&'static str> = #table_name;

            fn fields() -> ::std::vec::Vec<::oxide_schema_core::model::FieldDef> {
                ::std::vec![#(#field_defs),*]
            }
        }
    })
}

fn field_def(field_name: &str, ty: &Type, attrs: &ColumnAttrs) -> TokenStream2 {
    let field_attrs = attrs.to_tokens();

    if attrs.extends {
        return quote! {
            ::oxide_schema_core::model::FieldDef::extends(
                #field_name,
                ::oxide_schema_core::host::HostType::Struct(
                    <#ty as ::oxide_schema_core::model::Schema>::TYPE_NAME
                ),
                #field_attrs,
                <#ty as ::oxide_schema_core::model::Schema>::fields,
            )
        };
    }

    // Ignored fields need not be mappable.
    let host_type = if attrs.ignore {
        let type_str = quote!(#ty).to_string().replace(' ', "");
        quote! { ::oxide_schema_core::host::HostType::Struct(#type_str) }
    } else {
        quote! { <#ty as ::oxide_schema_core::host::SqlMapped>::host_type() }
    };

    quote! {
        ::oxide_schema_core::model::FieldDef::new(#field_name, #host_type, #field_attrs)
    }
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    sql_type: Option<String>,
    length: Option<u32>,
    length2: Option<u32>,
    primary_key: bool,
    autoincrement: bool,
    nullable: Option<bool>,
    default_expr: Option<String>,
    created: bool,
    updated: bool,
    version: bool,
    cascade: bool,
    index: Vec<String>,
    unique: Vec<String>,
    comment: Option<String>,
    ignore: bool,
    extends: bool,
}

impl ColumnAttrs {
    fn to_tokens(&self) -> TokenStream2 {
        let name = opt_str(self.name.as_deref());
        let sql_type = opt_str(self.sql_type.as_deref());
        let length = opt_u32(self.length);
        let length2 = opt_u32(self.length2);
        let nullable = match self.nullable {
            Some(v) => quote! { ::core::option::Option::Some(#v) },
            None => quote! { ::core::option::Option::None },
        };
        let default = opt_str(self.default_expr.as_deref());
        let comment = opt_str(self.comment.as_deref());
        let index = &self.index;
        let unique = &self.unique;
        let Self {
            primary_key,
            autoincrement,
            created,
            updated,
            version,
            cascade,
            ignore,
            ..
        } = self;

        quote! {
            ::oxide_schema_core::model::FieldAttrs {
                name: #name,
                sql_type: #sql_type,
                length: #length,
                length2: #length2,
                primary_key: #primary_key,
                autoincr: #autoincrement,
                nullable: #nullable,
                default: #default,
                created: #created,
                updated: #updated,
                version: #version,
                cascade: #cascade,
                index: &[#(#index),*],
                unique: &[#(#unique),*],
                comment: #comment,
                ignore: #ignore,
            }
        }
    }
}

fn opt_str(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(s) => quote! { ::core::option::Option::Some(#s) },
        None => quote! { ::core::option::Option::None },
    }
}

fn opt_u32(value: Option<u32>) -> TokenStream2 {
    match value {
        Some(v) => quote! { ::core::option::Option::Some(#v) },
        None => quote! { ::core::option::Option::None },
    }
}

fn get_table_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut table_name = None;
    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    table_name = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute"))
                }
            })?;
        }
    }
    Ok(table_name)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        // Handle empty attribute like #[column]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;
            if path.is_ident("primary_key") {
                result.primary_key = true;
            } else if path.is_ident("autoincrement") {
                result.autoincrement = true;
            } else if path.is_ident("nullable") {
                result.nullable = Some(true);
            } else if path.is_ident("not_null") {
                result.nullable = Some(false);
            } else if path.is_ident("created") {
                result.created = true;
            } else if path.is_ident("updated") {
                result.updated = true;
            } else if path.is_ident("version") {
                result.version = true;
            } else if path.is_ident("cascade") {
                result.cascade = true;
            } else if path.is_ident("ignore") {
                result.ignore = true;
            } else if path.is_ident("extends") {
                result.extends = true;
            } else if path.is_ident("index") || path.is_ident("unique") {
                let name = if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<LitStr>()?.value()
                } else {
                    String::new()
                };
                if path.is_ident("index") {
                    result.index.push(name);
                } else {
                    result.unique.push(name);
                }
            } else if path.is_ident("name") {
                result.name = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if path.is_ident("sql_type") {
                result.sql_type = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if path.is_ident("default") {
                result.default_expr = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if path.is_ident("comment") {
                result.comment = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if path.is_ident("length") {
                result.length = Some(meta.value()?.parse::<LitInt>()?.base10_parse()?);
            } else if path.is_ident("length2") {
                result.length2 = Some(meta.value()?.parse::<LitInt>()?.base10_parse()?);
            } else {
                return Err(meta.error("unsupported column attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}
