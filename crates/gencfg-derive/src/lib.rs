//! `#[derive(Sanitize)]` for gencfg records.
//!
//! The derive emits a `SanitizeRecord` impl holding a constant table with
//! the name and tag list of every visited field, plus a `Sanitize` impl so
//! the record can be nested in other records and containers.
//!
//! Field attributes:
//!
//! - `#[gencfg("path_clean,path_abs")]`: operations for the field
//! - `#[gencfg(skip)]`: never visit the field
//!
//! Only `pub` fields are visited. Fieldless enums derive a leaf impl that
//! rejects string operations, as numbers do.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::ParseStream;
use syn::{
    Data, DeriveInput, Fields, Ident, Index, LitStr, Member, Token, Visibility, parse_macro_input,
    parse_quote,
};

#[proc_macro_derive(Sanitize, attributes(gencfg))]
pub fn derive_sanitize(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// A field that takes part in sanitizing.
struct VisitedField {
    member: Member,
    name: String,
    tags: String,
}

/// What the `#[gencfg(...)]` attributes on one field say.
#[derive(Debug, Default, PartialEq)]
struct FieldOptions {
    tags: Vec<String>,
    skip: bool,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) if data.variants.iter().all(|v| matches!(v.fields, Fields::Unit)) => {
            return Ok(expand_leaf(&input));
        }
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Sanitize can only be derived for structs and fieldless enums",
            ));
        }
    };

    let visited = visited_fields(fields)?;

    let ident = &input.ident;
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(::gencfg::sanitize::Sanitize));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let table = visited.iter().map(|field| {
        let name = &field.name;
        let tags = &field.tags;
        quote! { ::gencfg::sanitize::Field::new(#name, #tags) }
    });

    let visits = visited.iter().enumerate().map(|(position, field)| {
        let member = &field.member;
        let position = Index::from(position);
        quote! {
            ::gencfg::sanitize::Sanitize::sanitize(
                &mut self.#member,
                &<Self as ::gencfg::sanitize::SanitizeRecord>::FIELDS[#position],
                sanitizer,
            )?;
        }
    });

    Ok(quote! {
        impl #impl_generics ::gencfg::sanitize::SanitizeRecord for #ident #ty_generics #where_clause {
            const FIELDS: &'static [::gencfg::sanitize::Field<'static>] = &[
                #(#table),*
            ];

            #[allow(unused_variables)]
            fn sanitize_fields(
                &mut self,
                sanitizer: &::gencfg::sanitize::Sanitizer,
            ) -> ::core::result::Result<(), ::gencfg::SanitizeError> {
                #(#visits)*
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics ::gencfg::sanitize::Sanitize for #ident #ty_generics #where_clause {
            // tags on the field holding a record are not inherited
            fn sanitize(
                &mut self,
                _field: &::gencfg::sanitize::Field<'_>,
                sanitizer: &::gencfg::sanitize::Sanitizer,
            ) -> ::core::result::Result<(), ::gencfg::SanitizeError> {
                <Self as ::gencfg::sanitize::SanitizeRecord>::sanitize_fields(self, sanitizer)
            }
        }
    })
}

/// Fieldless enums are leaves: like numbers, they reject string operations.
fn expand_leaf(input: &DeriveInput) -> TokenStream2 {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    quote! {
        impl #impl_generics ::gencfg::sanitize::Sanitize for #ident #ty_generics #where_clause {
            fn sanitize(
                &mut self,
                field: &::gencfg::sanitize::Field<'_>,
                sanitizer: &::gencfg::sanitize::Sanitizer,
            ) -> ::core::result::Result<(), ::gencfg::SanitizeError> {
                sanitizer.apply_other(field)
            }
        }
    }
}

fn visited_fields(fields: &Fields) -> syn::Result<Vec<VisitedField>> {
    let mut visited = Vec::new();
    for (position, field) in fields.iter().enumerate() {
        let options = field_options(&field.attrs)?;
        if options.skip || !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        let (member, name) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), field_name(ident)),
            None => (Member::Unnamed(Index::from(position)), position.to_string()),
        };
        visited.push(VisitedField {
            member,
            name,
            tags: options.tags.join(","),
        });
    }
    Ok(visited)
}

fn field_name(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(raw) => raw.to_string(),
        None => name,
    }
}

fn field_options(attrs: &[syn::Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("gencfg")) {
        attr.parse_args_with(|input: ParseStream| {
            if input.peek(LitStr) {
                let tags: LitStr = input.parse()?;
                options.tags.push(tags.value());
            } else {
                let word: Ident = input.parse()?;
                if word != "skip" {
                    return Err(syn::Error::new_spanned(
                        word,
                        "expected a tag list string or `skip`",
                    ));
                }
                options.skip = true;
            }
            // allow a trailing comma
            let _: Option<Token![,]> = input.parse()?;
            Ok(())
        })?;
    }
    Ok(options)
}
