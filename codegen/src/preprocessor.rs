use super::types::{self, Argument, Output, Receiver, Visibility};
use syn::{
    punctuated::Punctuated, spanned::Spanned, Attribute, Data, DeriveInput, Error, Fields,
    FnArg, GenericArgument, ImplItem, ItemImpl, Lit, Meta, MetaNameValue, NestedMeta, Pat,
    PathArguments, ReturnType, Token, Type,
};

pub type ServiceArgs = Punctuated<MetaNameValue, Token![,]>;

/// Joins `#[doc]` attributes into one block, one line per attribute.
pub fn doc(attrs: &[Attribute]) -> Option<String> {
    let lines = attrs
        .iter()
        .filter(|attr| attr.path.is_ident("doc"))
        .filter_map(|attr| match attr.parse_meta() {
            Ok(Meta::NameValue(MetaNameValue {
                lit: Lit::Str(text),
                ..
            })) => Some(text.value()),
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').map(str::to_owned).unwrap_or(line))
        .collect::<Vec<_>>();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn name_value(meta: &MetaNameValue, key: &str) -> Result<Option<String>, Error> {
    if !meta.path.is_ident(key) {
        return Err(Error::new(
            meta.path.span(),
            format!("expected `{} = \"...\"`", key),
        ));
    }

    match &meta.lit {
        Lit::Str(text) => Ok(Some(text.value())),
        other => Err(Error::new(other.span(), "expected a string literal")),
    }
}

fn type_name_attr(attrs: &[Attribute]) -> Result<Option<String>, Error> {
    let mut name = None;

    for attr in attrs.iter().filter(|attr| attr.path.is_ident("soap")) {
        match attr.parse_meta()? {
            Meta::List(list) => {
                for nested in &list.nested {
                    match nested {
                        NestedMeta::Meta(Meta::NameValue(meta)) => name = name_value(meta, "name")?,
                        other => return Err(Error::new(other.span(), "expected `name = \"...\"`")),
                    }
                }
            }
            other => return Err(Error::new(other.span(), "expected `#[soap(name = \"...\")]`")),
        }
    }

    Ok(name)
}

fn visibility(vis: &syn::Visibility) -> Visibility {
    match vis {
        syn::Visibility::Public(_) => Visibility::Public,
        syn::Visibility::Inherited => Visibility::Private,
        _ => Visibility::Protected,
    }
}

fn single_generic(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(arguments) => {
            arguments.args.iter().find_map(|argument| match argument {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
        }
        _ => None,
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

fn output(ret: &ReturnType) -> Output {
    let ty = match ret {
        ReturnType::Default => return Output::Unit,
        ReturnType::Type(_, ty) => ty.as_ref(),
    };

    if is_unit(ty) {
        return Output::Unit;
    }

    if let Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "Result" {
                if let Some(ok) = single_generic(&segment.arguments) {
                    return Output::Result(Some(ok.clone()).filter(|ok| !is_unit(ok)));
                }
            }
        }
    }

    Output::Value(ty.clone())
}

fn method(method: &syn::ImplItemMethod) -> Result<types::Method, Error> {
    let mut receiver = Receiver::None;
    let mut arguments = Vec::new();

    for input in &method.sig.inputs {
        match input {
            FnArg::Receiver(recv) => {
                receiver = match (&recv.reference, &recv.mutability) {
                    (Some(_), None) => Receiver::Shared,
                    (Some(_), Some(_)) => Receiver::Exclusive,
                    (None, _) => Receiver::Owned,
                }
            }

            FnArg::Typed(typed) => {
                let ident = match typed.pat.as_ref() {
                    Pat::Ident(pat) => pat.ident.clone(),
                    other => {
                        return Err(Error::new(
                            other.span(),
                            "service method arguments must be plain identifiers",
                        ))
                    }
                };

                arguments.push(Argument {
                    ident,
                    ty: typed.ty.as_ref().clone(),
                });
            }
        }
    }

    let method = types::Method {
        ident: method.sig.ident.clone(),
        doc: doc(&method.attrs),
        visibility: visibility(&method.vis),
        receiver,
        arguments,
        output: output(&method.sig.output),
    };

    if method.is_dispatched() && method.receiver != Receiver::Shared {
        return Err(Error::new(
            method.ident.span(),
            "public service methods must take `&self`",
        ));
    }

    Ok(method)
}

pub fn service(args: &ServiceArgs, item: &ItemImpl) -> Result<types::Service, Error> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(Error::new(
            path.span(),
            "#[service] applies to inherent impl blocks",
        ));
    }

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "#[service] does not support generic impl blocks",
        ));
    }

    let ident = match item.self_ty.as_ref() {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.clone()),
        _ => None,
    }
    .ok_or_else(|| Error::new(item.self_ty.span(), "expected a named type"))?;

    let mut name = None;
    for arg in args {
        name = name_value(arg, "name")?;
    }

    let methods = item
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Method(item) => Some(method(item)),
            _ => None,
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(types::Service {
        self_ty: item.self_ty.as_ref().clone(),
        ident,
        name,
        doc: doc(&item.attrs),
        methods,
    })
}

/// Schema name for a field type, used when the field documentation has no `@var`.
pub fn schema_type(ty: &Type) -> String {
    match ty {
        Type::Reference(reference) => schema_type(&reference.elem),
        Type::Paren(paren) => schema_type(&paren.elem),

        Type::Path(path) => {
            let segment = match path.path.segments.last() {
                Some(segment) => segment,
                None => return "any".into(),
            };

            let inner = single_generic(&segment.arguments);

            match (segment.ident.to_string().as_str(), inner) {
                ("Vec", Some(inner)) => format!("{}[]", schema_type(inner)),
                ("Option" | "Box", Some(inner)) => schema_type(inner),
                ("f32" | "f64", _) => "float".into(),
                ("i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "usize", _) => "int".into(),
                ("String" | "str", _) => "string".into(),
                ("bool", _) => "boolean".into(),
                ("Value", _) => "mixed".into(),
                (ident, _) => ident.to_owned(),
            }
        }

        _ => "any".into(),
    }
}

pub fn class(input: &DeriveInput) -> Result<types::Class, Error> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "SoapType cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new(
                    input.ident.span(),
                    "SoapType requires named fields",
                ))
            }
        },
        _ => return Err(Error::new(input.ident.span(), "SoapType requires a struct")),
    };

    let properties = fields
        .iter()
        .filter_map(|field| field.ident.as_ref().map(|ident| (ident, field)))
        .map(|(ident, field)| {
            let doc = match doc(&field.attrs) {
                Some(doc) if doc.contains("@var") => doc,
                Some(doc) => format!("{}\n@var {}", doc, schema_type(&field.ty)),
                None => format!("@var {}", schema_type(&field.ty)),
            };

            types::Property {
                ident: ident.clone(),
                doc: Some(doc),
            }
        })
        .collect();

    Ok(types::Class {
        ident: input.ident.clone(),
        name: type_name_attr(&input.attrs)?,
        doc: doc(&input.attrs),
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn collects_doc_lines() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[doc = " Add two numbers."]),
            parse_quote!(#[doc = " @param float $a"]),
            parse_quote!(#[inline]),
        ];

        assert_eq!(doc(&attrs).as_deref(), Some("Add two numbers.\n@param float $a"));
        assert_eq!(doc(&[]), None);
    }

    #[test]
    fn infers_field_types() {
        assert_eq!(schema_type(&parse_quote!(f64)), "float");
        assert_eq!(schema_type(&parse_quote!(Vec<String>)), "string[]");
        assert_eq!(schema_type(&parse_quote!(Option<Box<Employee>>)), "Employee");
        assert_eq!(schema_type(&parse_quote!(&str)), "string");
        assert_eq!(schema_type(&parse_quote!((u8, u8))), "any");
    }

    #[test]
    fn classifies_methods() {
        let item: ItemImpl = parse_quote! {
            impl Calculator {
                pub fn new() -> Self { Calculator }

                /// @return float
                pub fn add(&self, a: f64, b: f64) -> f64 { a + b }

                pub fn divide(&self, a: f64, b: f64) -> Result<f64, String> { Ok(a / b) }

                pub fn reset(&self) -> Result<(), String> { Ok(()) }

                fn helper(&self) {}
            }
        };

        let service = service(&ServiceArgs::new(), &item).unwrap();
        assert_eq!(service.ident, "Calculator");

        let dispatched: Vec<_> = service
            .methods
            .iter()
            .filter(|method| method.is_dispatched())
            .map(|method| method.ident.to_string())
            .collect();
        assert_eq!(dispatched, ["add", "divide", "reset"]);

        assert!(matches!(service.methods[1].output, Output::Value(_)));
        assert!(matches!(service.methods[2].output, Output::Result(Some(_))));
        assert!(matches!(service.methods[3].output, Output::Result(None)));
        assert_eq!(service.methods[4].visibility, Visibility::Private);
        assert!(format!("{:?}", service.methods[1].output).starts_with("Value("));
    }

    #[test]
    fn rejects_mutable_receivers() {
        let item: ItemImpl = parse_quote! {
            impl Counter {
                pub fn bump(&mut self) {}
            }
        };

        assert!(service(&ServiceArgs::new(), &item).is_err());
    }

    #[test]
    fn reads_type_name() {
        let input: DeriveInput = parse_quote! {
            /// A person.
            #[soap(name = "app.types.Employee")]
            struct Employee {
                /// @var string
                name: String,
                manager: Option<Box<Employee>>,
            }
        };

        let class = class(&input).unwrap();
        assert_eq!(class.name.as_deref(), Some("app.types.Employee"));
        assert_eq!(class.doc.as_deref(), Some("A person."));
        assert_eq!(class.properties[0].doc.as_deref(), Some("@var string"));
        assert_eq!(class.properties[1].doc.as_deref(), Some("@var Employee"));
    }
}
