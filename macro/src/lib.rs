extern crate proc_macro;

use lather_codegen as codegen;
use proc_macro::TokenStream;

#[proc_macro_attribute]
pub fn service(args: TokenStream, item: TokenStream) -> TokenStream {
    codegen::service(args.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(SoapType, attributes(soap))]
pub fn soap_type(input: TokenStream) -> TokenStream {
    codegen::soap_type(input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
