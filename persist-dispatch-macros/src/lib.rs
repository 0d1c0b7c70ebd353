//! Procedural macros for persist-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Prefix for every action name, joined with a dot
    #[darling(default)]
    namespace: Option<String>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit name override
    #[darling(default)]
    rename: Option<String>,
}

/// Build the logged name of a variant
fn action_name(namespace: Option<&str>, variant: &str, rename: Option<&str>) -> String {
    let base = rename.unwrap_or(variant);
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}.{}", ns, base),
        _ => base.to_string(),
    }
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method that returns the variant name as a static string.
///
/// - `#[action(namespace = "favorites")]` on the enum prefixes every name
///   (`"favorites.Add"`), which keeps logs readable when several stores
///   dispatch at once.
/// - `#[action(rename = "...")]` on a variant replaces its name.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(namespace = "favorites")]
/// enum FavoritesAction {
///     Add(String),
///     #[action(rename = "Drop")]
///     Remove(String),
///     Clear,
/// }
///
/// assert_eq!(FavoritesAction::Add("oslo".into()).name(), "favorites.Add");
/// assert_eq!(FavoritesAction::Remove("oslo".into()).name(), "favorites.Drop");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if variants.is_empty() {
        return syn::Error::new_spanned(&input, "Action cannot be derived for an empty enum")
            .to_compile_error()
            .into();
    }

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let action_str = action_name(
            opts.namespace.as_deref(),
            &variant_name.to_string(),
            v.rename.as_deref(),
        );

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #action_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #action_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #action_str
            },
        }
    });

    let expanded = quote! {
        impl #impl_generics persist_dispatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    expanded.into()
}
