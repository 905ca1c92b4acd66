//! Derive macro for oxide-ora records.
//!
//! `#[derive(Record)]` builds the table [`Schema`] of a struct once and
//! generates ordinal-based field access, so generated keys and output
//! values can be written back into records without reflection.
//!
//! [`Schema`]: https://docs.rs/oxide-ora-core/latest/oxide_ora_core/schema/struct.Schema.html

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, Lit, Meta, PathArguments,
    Type, parse_macro_input,
};

/// Derives `oxide_ora_core::Record` for a struct with named fields.
///
/// # Attributes
///
/// - `#[record(table = "table_name")]` - SQL table name (optional, defaults
///   to the snake_case struct name)
///
/// # Field Attributes
///
/// - `#[field(column = "name")]` - column name (defaults to the field name)
/// - `#[field(primary_key)]`, `#[field(not_null)]`, `#[field(unique)]`
/// - `#[field(sequence = "seq_name")]` - value generated by a sequence
/// - `#[field(auto_increment)]`, `#[field(increment = 10)]`
/// - `#[field(size = 100)]`, `#[field(precision = 10, scale = 2)]`
/// - `#[field(default = "SYSDATE")]` - column default expression
/// - `#[field(comment = "...")]`
/// - `#[field(sql_type = "NUMBER(19)")]` - verbatim column type
///
/// The column type is inferred from the Rust type (`Option<T>` unwrapped)
/// unless `sql_type` is given.
///
/// # Generated Items
///
/// - `impl Record` with a schema built once per type
/// - `RecordSlice` impls for `[T]`, `Vec<T>`, `[Option<T>]` and
///   `Vec<Option<T>>`
#[proc_macro_derive(Record, attributes(record, field))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record derive does not support generic structs",
        ));
    }
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut field_infos = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;
        let inferred = match &attrs.sql_type {
            Some(sql_type) => Inferred {
                data_type: quote! {
                    ::oxide_ora_core::schema::DataType::Custom(::std::string::String::from(#sql_type))
                },
                size: None,
            },
            None => infer_data_type(&field.ty).ok_or_else(|| {
                syn::Error::new_spanned(
                    &field.ty,
                    "cannot infer the column type; add #[field(sql_type = \"...\")]",
                )
            })?,
        };
        field_infos.push(FieldInfo {
            column_name: attrs.column.clone().unwrap_or_else(|| field_name.to_string()),
            field_name,
            inferred,
            attrs,
        });
    }

    let schema_fields: Vec<TokenStream2> = field_infos.iter().map(field_expr).collect();

    let ordinals: Vec<usize> = (0..field_infos.len()).collect();
    let idents: Vec<&Ident> = field_infos.iter().map(|f| &f.field_name).collect();

    let expanded = quote! {
        impl ::oxide_ora_core::record::Record for #struct_name {
            fn schema() -> &'static ::oxide_ora_core::schema::Schema {
                static SCHEMA: ::std::sync::LazyLock<::oxide_ora_core::schema::Schema> =
                    ::std::sync::LazyLock::new(|| {
                        ::oxide_ora_core::schema::Schema::new(
                            #table_name,
                            ::std::vec![#(#schema_fields),*],
                        )
                    });
                &SCHEMA
            }

            fn value_of(&self, ordinal: usize) -> ::oxide_ora_core::value::SqlValue {
                match ordinal {
                    #(
                        #ordinals => ::oxide_ora_core::value::ToSqlValue::to_sql_value(
                            ::std::clone::Clone::clone(&self.#idents),
                        ),
                    )*
                    _ => ::oxide_ora_core::value::SqlValue::Null,
                }
            }

            fn set_value(
                &mut self,
                ordinal: usize,
                value: ::oxide_ora_core::value::SqlValue,
            ) -> ::oxide_ora_core::Result<()> {
                match ordinal {
                    #(
                        #ordinals => {
                            self.#idents =
                                ::oxide_ora_core::value::FromSqlValue::from_sql_value(value)?;
                        }
                    )*
                    _ => return ::std::result::Result::Err(
                        ::oxide_ora_core::Error::UnknownOrdinal { ordinal },
                    ),
                }
                ::std::result::Result::Ok(())
            }
        }
    };

    Ok(expanded)
}

struct Inferred {
    data_type: TokenStream2,
    size: Option<u32>,
}

struct FieldInfo {
    field_name: Ident,
    column_name: String,
    inferred: Inferred,
    attrs: FieldAttrs,
}

#[derive(Default)]
struct FieldAttrs {
    column: Option<String>,
    primary_key: bool,
    sequence: Option<String>,
    auto_increment: bool,
    increment: Option<i64>,
    size: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
    not_null: bool,
    unique: bool,
    default_value: Option<String>,
    comment: Option<String>,
    sql_type: Option<String>,
}

/// Builds the `Field::new(..)` chain of one field.
fn field_expr(info: &FieldInfo) -> TokenStream2 {
    let column = &info.column_name;
    let rust_name = info.field_name.to_string();
    let data_type = &info.inferred.data_type;
    let attrs = &info.attrs;

    let mut chain = vec![quote! { .rust_name(#rust_name) }];
    if let Some(size) = attrs.size.or(info.inferred.size) {
        chain.push(quote! { .size(#size) });
    }
    if attrs.precision.is_some() || attrs.scale.is_some() {
        let precision = attrs.precision.unwrap_or(0);
        let scale = attrs.scale.unwrap_or(0);
        chain.push(quote! { .precision(#precision, #scale) });
    }
    if attrs.primary_key {
        chain.push(quote! { .primary_key() });
    }
    if attrs.auto_increment {
        chain.push(quote! { .auto_increment() });
    }
    if let Some(step) = attrs.increment {
        chain.push(quote! { .increment(#step) });
    }
    if let Some(sequence) = &attrs.sequence {
        chain.push(quote! { .sequence(#sequence) });
    }
    if attrs.not_null {
        chain.push(quote! { .not_null() });
    }
    if attrs.unique {
        chain.push(quote! { .unique() });
    }
    if let Some(default) = &attrs.default_value {
        chain.push(quote! { .default_value(#default) });
    }
    if let Some(comment) = &attrs.comment {
        chain.push(quote! { .comment(#comment) });
    }

    quote! {
        ::oxide_ora_core::schema::Field::new(#column, #data_type) #(#chain)*
    }
}

/// Returns the last path segment of `ty`, with `Option<T>` unwrapped.
fn type_segment(ty: &Type) -> Option<&syn::PathSegment> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident == "Option" {
        if let PathArguments::AngleBracketed(args) = &segment.arguments {
            if let Some(GenericArgument::Type(inner)) = args.args.first() {
                return type_segment(inner);
            }
        }
    }
    Some(segment)
}

fn is_byte_vec(segment: &syn::PathSegment) -> bool {
    if segment.ident != "Vec" {
        return false;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(GenericArgument::Type(Type::Path(inner))) if inner.path.is_ident("u8")
    )
}

fn infer_data_type(ty: &Type) -> Option<Inferred> {
    let segment = type_segment(ty)?;
    let kind = |variant: &str, size: Option<u32>| {
        let variant = Ident::new(variant, proc_macro2::Span::call_site());
        Some(Inferred {
            data_type: quote! { ::oxide_ora_core::schema::DataType::#variant },
            size,
        })
    };

    if is_byte_vec(segment) {
        return kind("Bytes", None);
    }
    match segment.ident.to_string().as_str() {
        "bool" => kind("Bool", None),
        "i8" => kind("Int", Some(8)),
        "i16" => kind("Int", Some(16)),
        "i32" => kind("Int", Some(32)),
        "i64" => kind("Int", Some(64)),
        "u8" => kind("Uint", Some(8)),
        "u16" => kind("Uint", Some(16)),
        "u32" => kind("Uint", Some(32)),
        "u64" => kind("Uint", Some(64)),
        "f32" => kind("Float", Some(32)),
        "f64" => kind("Float", Some(64)),
        "String" => kind("String", None),
        "NaiveDateTime" => kind("Time", None),
        _ => None,
    }
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    table_name = Some(parse_str(&meta)?);
                }
                Ok(())
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_str(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn parse_int<N>(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<N>
where
    N: std::str::FromStr,
    N::Err: std::fmt::Display,
{
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Int(n), ..
        }) => n.base10_parse(),
        other => Err(syn::Error::new_spanned(other, "expected an integer literal")),
    }
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("field") || matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                result.primary_key = true;
            } else if meta.path.is_ident("auto_increment") {
                result.auto_increment = true;
            } else if meta.path.is_ident("not_null") {
                result.not_null = true;
            } else if meta.path.is_ident("unique") {
                result.unique = true;
            } else if meta.path.is_ident("column") {
                result.column = Some(parse_str(&meta)?);
            } else if meta.path.is_ident("sequence") {
                result.sequence = Some(parse_str(&meta)?);
            } else if meta.path.is_ident("default") {
                result.default_value = Some(parse_str(&meta)?);
            } else if meta.path.is_ident("comment") {
                result.comment = Some(parse_str(&meta)?);
            } else if meta.path.is_ident("sql_type") {
                result.sql_type = Some(parse_str(&meta)?);
            } else if meta.path.is_ident("increment") {
                result.increment = Some(parse_int(&meta)?);
            } else if meta.path.is_ident("size") {
                result.size = Some(parse_int(&meta)?);
            } else if meta.path.is_ident("precision") {
                result.precision = Some(parse_int(&meta)?);
            } else if meta.path.is_ident("scale") {
                result.scale = Some(parse_int(&meta)?);
            } else {
                return Err(meta.error("unknown field attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
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
