use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields, LitStr, Path, Type, parse_macro_input};

/// Key selected through `#[event(...)]`.
enum Key {
    Name(LitStr),
    /// Any `i64` expression, so `index = -1` and named constants work.
    Index(Expr),
    Symbol,
}

/// Parsed `#[event(...)]` attribute.
struct Attributes {
    schema: Option<Path>,
    args: Option<Type>,
    key: Key,
}

impl Attributes {
    fn parse(ast: &DeriveInput) -> syn::Result<Self> {
        let mut attributes = Attributes {
            schema: None,
            args: None,
            key: Key::Symbol,
        };

        for attr in ast.attrs.iter().filter(|attr| attr.path().is_ident("event")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("schema") {
                    attributes.schema = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("args") {
                    attributes.args = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("name") {
                    attributes.set_key(&meta, Key::Name(meta.value()?.parse()?))?;
                } else if meta.path.is_ident("index") {
                    attributes.set_key(&meta, Key::Index(meta.value()?.parse::<Expr>()?))?;
                } else {
                    return Err(meta.error("expected `schema`, `args`, `name` or `index`"));
                }
                Ok(())
            })?;
        }

        Ok(attributes)
    }

    fn set_key(&mut self, meta: &syn::meta::ParseNestedMeta<'_>, key: Key) -> syn::Result<()> {
        if !matches!(self.key, Key::Symbol) {
            return Err(meta.error("an event has a single key: use either `name` or `index`"));
        }
        self.key = key;
        Ok(())
    }
}

pub fn derive_event(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let is_unit = matches!(&ast.data, Data::Struct(data) if matches!(data.fields, Fields::Unit));
    if !is_unit {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "#[derive(Event)] needs a unit struct; \
             implement `Event` by hand for events with a runtime key",
        ));
    }

    let attributes = Attributes::parse(ast)?;
    let schema = attributes.schema.ok_or_else(|| {
        syn::Error::new(
            Span::call_site(),
            "missing `#[event(schema = ...)]` on #[derive(Event)]",
        )
    })?;
    let args = attributes
        .args
        .map(|args| quote!(#args))
        .unwrap_or_else(|| quote!(()));
    let key = match attributes.key {
        Key::Name(name) => quote! {
            ::typed_hub::EventKey::Name(::std::borrow::Cow::Borrowed(#name))
        },
        Key::Index(index) => quote! {
            ::typed_hub::EventKey::Index(#index)
        },
        Key::Symbol => quote! {
            ::typed_hub::EventKey::Symbol(::typed_hub::Symbol::of::<Self>())
        },
    };

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::typed_hub::Event for #name #ty_generics #where_clause {
            type Schema = #schema;
            type Args = #args;

            fn key(&self) -> ::typed_hub::EventKey {
                #key
            }
        }
    })
}
