use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_schema(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    // `::typed_hub` resolves inside the crate through `extern crate self as typed_hub;`
    TokenStream::from(quote! {
        impl #impl_generics ::typed_hub::Schema for #name #ty_generics #where_clause {}
    })
}
