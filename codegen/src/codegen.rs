use super::types::{self, Output, Visibility};
use proc_macro2::TokenStream;
use quote::quote;

pub trait Codegen {
    fn codegen(&self) -> TokenStream;
}

fn codegen_all(all: &[impl Codegen]) -> Vec<TokenStream> {
    all.iter().map(Codegen::codegen).collect()
}

fn codegen_doc(doc: &Option<String>) -> TokenStream {
    match doc {
        Some(doc) => quote! { .doc(#doc) },
        None => quote! {},
    }
}

/// Full dotted name: the explicit one, or the module path followed by the type name.
fn codegen_name(name: &Option<String>, ident: &proc_macro2::Ident) -> TokenStream {
    match name {
        Some(name) => quote! { #name },
        None => {
            let ident = ident.to_string();
            quote! { format!("{}.{}", module_path!().replace("::", "."), #ident) }
        }
    }
}

impl Codegen for types::Service {
    fn codegen(&self) -> TokenStream {
        let self_ty = &self.self_ty;
        let name = codegen_name(&self.name, &self.ident);
        let doc = codegen_doc(&self.doc);
        let methods = codegen_all(&self.methods);

        let dispatched = self
            .methods
            .iter()
            .filter(|method| method.is_dispatched())
            .map(codegen_dispatch)
            .collect::<Vec<_>>();

        quote! {
            impl ::lather::wsdl::reflect::SoapClass for #self_ty {
                fn service_class() -> ::lather::wsdl::reflect::ServiceClass {
                    ::lather::wsdl::reflect::ServiceClass::new(#name)
                        #doc
                        #(.method(#methods))*
                }
            }

            impl ::lather::util::WrappedHandler for #self_ty {
                fn call(
                    &self,
                    method: &str,
                    arguments: ::std::vec::Vec<::lather::util::Value>,
                ) -> ::std::result::Result<
                    ::std::option::Option<::lather::util::Value>,
                    ::lather::util::HandlerError,
                > {
                    match method {
                        #(#dispatched)*
                        _ => ::std::result::Result::Err(::std::boxed::Box::new(
                            ::lather::util::UnknownMethod(method.to_owned()),
                        )),
                    }
                }
            }
        }
    }
}

impl Codegen for types::Method {
    fn codegen(&self) -> TokenStream {
        let name = self.ident.to_string();
        let doc = codegen_doc(&self.doc);

        let visibility = match self.visibility {
            Visibility::Public => quote! { Public },
            Visibility::Protected => quote! { Protected },
            Visibility::Private => quote! { Private },
        };

        let kind = if self.is_constructor() {
            quote! { Constructor }
        } else {
            quote! { Regular }
        };

        let is_static = self.receiver == types::Receiver::None;

        quote! {
            ::lather::wsdl::reflect::MethodInfo::new(#name)
                #doc
                .visibility(::lather::wsdl::reflect::Visibility::#visibility)
                .kind(::lather::wsdl::reflect::MethodKind::#kind)
                .with_static(#is_static)
        }
    }
}

fn codegen_dispatch(method: &types::Method) -> TokenStream {
    let ident = &method.ident;
    let name = ident.to_string();
    let expected = method.arguments.len();

    let arguments = method
        .arguments
        .iter()
        .map(|argument| {
            let ident = &argument.ident;
            let ty = &argument.ty;

            quote! {
                let #ident = <#ty as ::lather::util::FromValue>::from_value(
                    arguments.next().unwrap_or(::lather::util::Value::Null),
                )?;
            }
        })
        .collect::<Vec<_>>();

    let idents = method.arguments.iter().map(|argument| &argument.ident);
    let invoke = quote! { self.#ident(#(#idents),*) };

    let result = match &method.output {
        Output::Unit => quote! {
            #invoke;
            ::std::result::Result::Ok(::std::option::Option::None)
        },

        Output::Value(_) => quote! {
            ::std::result::Result::Ok(::std::option::Option::Some(
                ::lather::util::IntoValue::into_value(#invoke),
            ))
        },

        Output::Result(None) => quote! {
            #invoke.map_err(::std::convert::Into::<::lather::util::HandlerError>::into)?;
            ::std::result::Result::Ok(::std::option::Option::None)
        },

        Output::Result(Some(_)) => quote! {
            let value = #invoke.map_err(::std::convert::Into::<::lather::util::HandlerError>::into)?;
            ::std::result::Result::Ok(::std::option::Option::Some(
                ::lather::util::IntoValue::into_value(value),
            ))
        },
    };

    quote! {
        #name => {
            if arguments.len() > #expected {
                return ::std::result::Result::Err(::std::boxed::Box::new(
                    ::lather::util::error::ValueError::ArgumentCount {
                        expected: #expected,
                        found: arguments.len(),
                    },
                ));
            }

            #[allow(unused_mut, unused_variables)]
            let mut arguments = arguments.into_iter();
            #(#arguments)*
            #result
        }
    }
}

impl Codegen for types::Property {
    fn codegen(&self) -> TokenStream {
        let name = self.ident.to_string();
        let doc = codegen_doc(&self.doc);

        quote! {
            ::lather::wsdl::reflect::PropertyInfo::new(#name) #doc
        }
    }
}

impl Codegen for types::Class {
    fn codegen(&self) -> TokenStream {
        let ident = &self.ident;
        let name = codegen_name(&self.name, &self.ident);
        let doc = codegen_doc(&self.doc);
        let properties = codegen_all(&self.properties);

        let idents = self
            .properties
            .iter()
            .map(|property| &property.ident)
            .collect::<Vec<_>>();
        let names = idents
            .iter()
            .map(|ident| ident.to_string())
            .collect::<Vec<_>>();

        quote! {
            impl ::lather::wsdl::reflect::SoapType for #ident {
                fn class_info() -> ::lather::wsdl::reflect::ClassInfo {
                    ::lather::wsdl::reflect::ClassInfo::new(#name)
                        #doc
                        #(.property(#properties))*
                }
            }

            impl ::lather::util::IntoValue for #ident {
                fn into_value(self) -> ::lather::util::Value {
                    let mut value = ::lather::util::Struct::named(#name);
                    #(value.insert(#names, self.#idents);)*
                    ::lather::util::Value::Struct(value)
                }
            }

            impl ::lather::util::FromValue for #ident {
                fn from_value(
                    value: ::lather::util::Value,
                ) -> ::std::result::Result<Self, ::lather::util::error::ValueError> {
                    #[allow(unused_mut)]
                    let mut value = value.into_struct()?;

                    ::std::result::Result::Ok(Self {
                        #(#idents: value.take_as(#names)?,)*
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor;
    use syn::parse_quote;

    #[test]
    fn dispatches_only_public_methods() {
        let item: syn::ItemImpl = parse_quote! {
            impl Calculator {
                pub fn add(&self, a: f64, b: f64) -> f64 { a + b }
                fn helper(&self) {}
            }
        };

        let service = preprocessor::service(&Default::default(), &item).unwrap();
        let tokens = service.codegen().to_string();

        assert!(tokens.contains("\"add\" =>"));
        assert!(!tokens.contains("\"helper\" =>"));
        assert!(tokens.contains("MethodInfo :: new (\"helper\")"));
    }

    #[test]
    fn explicit_names_are_literal() {
        let input: syn::DeriveInput = parse_quote! {
            #[soap(name = "app.types.Company")]
            struct Company { name: String }
        };

        let tokens = preprocessor::class(&input).unwrap().codegen().to_string();
        assert!(tokens.contains("ClassInfo :: new (\"app.types.Company\")"));
        assert!(!tokens.contains("module_path"));
    }
}
