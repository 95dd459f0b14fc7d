use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse::Parser, DeriveInput, ItemImpl};

use codegen::Codegen;

mod codegen;
mod preprocessor;
mod types;

/// Expands `#[service]`: the impl block is kept and `SoapClass` plus `WrappedHandler`
/// implementations are emitted next to it.
pub fn service(args: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let args = preprocessor::ServiceArgs::parse_terminated.parse2(args)?;
    let item = syn::parse2::<ItemImpl>(item)?;
    let generated = preprocessor::service(&args, &item)?.codegen();

    Ok(quote! {
        #item
        #generated
    })
}

/// Expands `#[derive(SoapType)]`.
pub fn soap_type(input: TokenStream) -> syn::Result<TokenStream> {
    let input = syn::parse2::<DeriveInput>(input)?;
    Ok(preprocessor::class(&input)?.codegen())
}
