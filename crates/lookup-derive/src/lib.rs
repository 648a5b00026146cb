use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, punctuated::Punctuated, token::Comma, DeriveInput, Meta};

/// Derive `EntryMarker`, placing the type in the entry hierarchy.
/// Adds an `EntryRequirements` bound to all generic parameters.
///
/// The parent is named with `#[parent(Type)]` and must implement `From<Self>`.
/// Without it the parent is `Object`, which wraps the value as is.
#[proc_macro_derive(EntryMarker, attributes(parent))]
pub fn entry_marker_derive(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    for param in &mut input.generics.params {
        if let syn::GenericParam::Type(type_param) = param {
            type_param
                .bounds
                .push(syn::parse_quote!(::lookup_core::EntryRequirements));
        }
    }

    let mut parents = input
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("parent"))
        .map(|attr| attr.parse_args::<syn::Type>());
    let parent = match (parents.next(), parents.next()) {
        (None, _) => None,
        (Some(Ok(parent)), None) => Some(parent),
        (Some(Err(err)), _) => return err.to_compile_error().into(),
        (Some(_), Some(_)) => {
            return syn::Error::new_spanned(&input.ident, "only one `#[parent(..)]` is allowed")
                .to_compile_error()
                .into()
        }
    };
    derive_entry_marker(&input, parent).into()
}

/// Generate the implementation of EntryMarker
fn derive_entry_marker(input: &DeriveInput, parent: Option<syn::Type>) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let (impl_generics, type_generics, where_clause) = &input.generics.split_for_impl();
    let (parent, into_parent) = match parent {
        Some(parent) => (
            quote!(#parent),
            quote!(<#parent as ::core::convert::From<Self>>::from(self)),
        ),
        None => (
            quote!(::lookup_core::Object),
            quote!(::lookup_core::Object::new(self)),
        ),
    };
    quote! {impl #impl_generics ::lookup_core::EntryMarker for #name #type_generics #where_clause {
        fn _parent() -> ::core::option::Option<::lookup_core::TypeKey> {
            ::core::option::Option::Some(::lookup_core::TypeKey::of::<#parent>())
        }
        fn _into_parent(self) -> ::core::option::Option<::lookup_core::ErasedEntry> {
            ::core::option::Option::Some(::lookup_core::ErasedEntry::new(#into_parent))
        }
    }}
}

/// Attribute macro to mark a type as a registry entry, automatically implementing `EntryMarker` and required traits.
/// `#[entry(parent = Type)]` declares the supertype, which must implement `From<Self>`.
///
/// Will cause conflicting implementations if placed after any `#derive(...)]` attributes that implement any super traits of `EntryRequirements`.
#[proc_macro_attribute]
pub fn entry(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut item = parse_macro_input!(item as DeriveInput);

    let mut parent: Option<syn::Type> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("parent") {
            parent = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported entry property, expected `parent = Type`"))
        }
    });
    parse_macro_input!(attr with parser);

    let mut required_traits: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(Eq),
        syn::parse_quote!(Hash),
        syn::parse_quote!(Debug),
        syn::parse_quote!(::lookup_core::EntryMarker),
    ];

    // find any existing #[derive(...)] attributes and remove any duplicates from required_traits
    item.attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Meta, Comma>::parse_terminated)
                .ok()
        })
        .flatten()
        .for_each(|meta| {
            if let Meta::Path(path) = meta {
                if let Some(pos) = required_traits.iter().position(|t| same_trait(t, &path)) {
                    required_traits.remove(pos);
                }
            }
        });

    // Add all the missing required traits as a second #[derive(...)] attribute
    if !required_traits.is_empty() {
        item.attrs
            .push(syn::parse_quote!(#[derive(#(#required_traits),*)]));
    }

    if let Some(parent) = parent {
        item.attrs.push(syn::parse_quote!(#[parent(#parent)]));
    }

    quote! {
        #item
    }
    .into()
}

/// Compare derive paths by their last segment so `lookup_core::EntryMarker` matches `EntryMarker`
fn same_trait(required: &syn::Path, existing: &syn::Path) -> bool {
    match (required.segments.last(), existing.segments.last()) {
        (Some(a), Some(b)) => a.ident == b.ident,
        _ => false,
    }
}
