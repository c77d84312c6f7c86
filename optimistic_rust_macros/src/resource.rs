use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

pub fn derive_resource(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let collection = collection_name(&input);

    let id_field = match extract_id_field(&input) {
        Ok(field) => field,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        impl optimistic_rust::Resource for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> String {
                self.#id_field.to_string()
            }
        }
    };

    TokenStream::from(expanded)
}

fn collection_name(input: &DeriveInput) -> String {
    for attr in &input.attrs {
        if !attr.path().is_ident("resource") {
            continue;
        }

        let mut collection = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
            }
            Ok(())
        });

        if let Some(c) = collection {
            return c;
        }
    }

    let mut plural = to_snake_case(&input.ident.to_string());
    plural.push('s');
    plural
}

fn extract_id_field(input: &DeriveInput) -> syn::Result<syn::Ident> {
    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Resource derive: only structs with named fields are supported",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Resource derive: only structs with named fields are supported",
        ));
    };

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("resource") {
                continue;
            }
            let mut is_id = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    is_id = true;
                }
                Ok(())
            });
            if is_id {
                if let Some(ident) = &field.ident {
                    return Ok(ident.clone());
                }
            }
        }
    }

    fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .find(|ident| *ident == "id")
        .cloned()
        .ok_or_else(|| {
            syn::Error::new(
                Span::call_site(),
                "Resource derive: no field marked with #[resource(id)] and no field named `id`",
            )
        })
}

fn to_snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() && !snake.is_empty() {
            snake.push('_');
        }
        snake.extend(ch.to_lowercase());
    }
    snake
}
