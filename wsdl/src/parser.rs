use quick_xml::{
    events::{attributes::Attributes, BytesStart, BytesText, Event},
    Reader,
};
use std::{
    collections::HashMap,
    io::{BufRead, BufReader},
};
use tracing::{debug, trace, warn};
use url::Url;

use super::{
    error::Error,
    types::{
        Binding, BindingOperation, Definition, Field, FieldKind, Message, NamespacedName,
        Namespaces, Occurs, Operation, Port, PortType, Service, Type, TypeKind,
    },
};

fn get_attributes<B: BufRead, const N: usize>(
    reader: &Reader<B>,
    attributes: Attributes<'_>,
    names: [&'static str; N],
) -> Result<[Option<String>; N], Error> {
    const INIT: Option<String> = None;
    let mut result = [INIT; N];

    for attribute in attributes {
        let attribute = attribute?;
        let key = reader.decode(attribute.key)?;

        for (index, name) in names.iter().enumerate() {
            if key == *name {
                result[index] = Some(attribute.unescape_and_decode_value(reader)?);
                break;
            }
        }
    }

    Ok(result)
}

fn split_namespaced_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, prefixed_name),
    }
}

fn required(value: Option<String>, element: &str, attribute: &str) -> Result<String, Error> {
    value.ok_or_else(|| {
        Error::MalformedDocument(format!("<{}> without a {} attribute", element, attribute))
    })
}

fn misplaced(element: &str) -> Error {
    Error::MalformedDocument(format!("unexpected end of <{}>", element))
}

#[derive(Clone, Default)]
struct CurrentNamespaces {
    target: Vec<String>,
    namespaces: HashMap<Option<String>, String>,
}

struct Parser {
    root: Option<Url>,

    definition: Definition,
    namespaces: Namespaces,
    current_namespaces: CurrentNamespaces,
}

#[derive(Debug)]
enum ParseState {
    Definitions,
    Documentation(String),
    Import,

    Types,
    Schema,
    Element {
        name: String,
        kind: Option<TypeKind>,
    },
    ComplexType {
        name: Option<String>,
        kind: Option<TypeKind>,
    },
    Group(Vec<Field>),
    GroupElement {
        name: String,
        ty: Option<NamespacedName>,
        inner: Option<TypeKind>,
        max_occurs: Occurs,
    },
    SimpleType {
        name: String,
        ty: Option<NamespacedName>,
    },
    Restriction {
        ty: NamespacedName,
    },

    Message {
        name: String,
        parts: Vec<Field>,
    },
    Part {
        name: String,
        element: NamespacedName,
    },

    PortType {
        name: String,
        operations: Vec<Operation>,
    },
    Operation {
        name: String,
        documentation: Option<String>,
        input: Option<NamespacedName>,
        output: Option<NamespacedName>,
    },
    Input {
        message: NamespacedName,
    },
    Output {
        message: NamespacedName,
    },

    Binding {
        name: String,
        ty: NamespacedName,
        style: Option<String>,
        transport: Option<String>,
        operations: Vec<BindingOperation>,
    },
    Transport {
        style: Option<String>,
        transport: String,
    },
    BindingOperation {
        name: String,
        input: Option<String>,
        output: Option<String>,
    },
    BindingInput {
        body: Option<String>,
    },
    BindingOutput {
        body: Option<String>,
    },
    BindingBody {
        body: String,
    },

    Service {
        name: String,
        ports: Vec<Port>,
    },
    Port {
        name: String,
        binding: NamespacedName,
        address: Option<String>,
    },
    Address {
        location: String,
    },

    Other(String),
}

impl CurrentNamespaces {
    fn push_target_namespace(&mut self, namespace: String) {
        self.target.push(namespace);
    }

    fn pop_target_namespace(&mut self) {
        self.target.pop();
    }

    fn add_namespace_prefix(&mut self, prefix: Option<String>, namespace: &str) {
        self.namespaces.insert(prefix, namespace.to_owned());
    }

    fn target_namespaced(
        &self,
        namespaces: &mut Namespaces,
        name: String,
    ) -> Result<NamespacedName, Error> {
        match self.target.last() {
            Some(target) => Ok(NamespacedName::new(namespaces, target, name)),
            None => Err(Error::MalformedDocument(format!(
                "{} declared outside of a target namespace",
                name
            ))),
        }
    }

    fn resolved_prefix(
        &self,
        namespaces: &mut Namespaces,
        prefix: Option<String>,
        name: String,
    ) -> Result<NamespacedName, Error> {
        match self.namespaces.get(&prefix) {
            Some(value) => Ok(NamespacedName::new(namespaces, value, name)),
            None => Err(Error::MalformedDocument(format!(
                "undeclared namespace prefix {}",
                prefix.as_deref().unwrap_or("(default)")
            ))),
        }
    }
}

impl Parser {
    fn new(root: Option<Url>) -> Self {
        Self {
            root,

            definition: Default::default(),
            namespaces: Default::default(),
            current_namespaces: Default::default(),
        }
    }

    fn push_target_namespace(&mut self, namespace: String) {
        if self.definition.target_namespace.is_none() {
            self.definition.target_namespace = Some(namespace.clone());
        }

        self.current_namespaces.push_target_namespace(namespace);
    }

    fn pop_target_namespace(&mut self) {
        self.current_namespaces.pop_target_namespace();
    }

    fn target_namespaced(&mut self, name: String) -> Result<NamespacedName, Error> {
        self.current_namespaces
            .target_namespaced(&mut self.namespaces, name)
    }

    fn resolve_namespace(&mut self, prefixed_name: &str) -> Result<NamespacedName, Error> {
        let (prefix, local_name) = split_namespaced_name(prefixed_name);

        match prefix {
            Some("tns") => self.target_namespaced(local_name.to_owned()),

            _ => self.current_namespaces.resolved_prefix(
                &mut self.namespaces,
                prefix.map(ToOwned::to_owned),
                local_name.to_owned(),
            ),
        }
    }

    fn import(&mut self, location: &str) -> Result<(), Error> {
        let url = match &self.root {
            Some(root) => root.join(location)?,
            None => Url::parse(location)?,
        };

        self.parse_url(url)
    }

    fn parse(mut self) -> Result<(Definition, Namespaces), Error> {
        if let Some(root) = self.root.clone() {
            self.parse_url(root)?;
        }

        Ok((self.definition, self.namespaces))
    }

    fn parse_url(&mut self, url: Url) -> Result<(), Error> {
        debug!(%url, "parsing WSDL document");

        let result = match url.scheme() {
            "file" => self.parse_xml(
                Reader::from_file(url.to_file_path().map_err(|()| Error::PathConversionError(None))?)
                    .map_err(Error::FileOpenError)?,
            ),

            "http" | "https" => self.parse_xml(Reader::from_reader(BufReader::new(
                reqwest::blocking::get(url.clone())?.error_for_status()?,
            ))),

            other => Err(Error::UnsupportedScheme(other.into())),
        };

        debug!(%url, ok = result.is_ok(), "finished WSDL document");
        result
    }

    fn parse_xml<B: BufRead>(&mut self, mut reader: Reader<B>) -> Result<(), Error> {
        let mut stack = Vec::new();
        let mut buffer = Vec::new();

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Start(start) => self.handle_start(&mut stack, &reader, start)?,
                Event::End(..) => self.handle_end(&mut stack)?,

                Event::Empty(start) => {
                    self.handle_start(&mut stack, &reader, start)?;
                    self.handle_end(&mut stack)?;
                }

                Event::Text(text) => self.handle_text(&mut stack, &reader, text)?,

                Event::Eof => break,

                _ => (),
            }

            buffer.clear();
        }

        Ok(())
    }

    fn handle_start<B: BufRead>(
        &mut self,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
        start: BytesStart<'_>,
    ) -> Result<(), Error> {
        let (_, local_name) = split_namespaced_name(reader.decode(start.name())?);

        let state = stack.pop();
        let mut new_state = ParseState::Other(local_name.to_owned());

        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = reader.decode(attribute.key)?;
            let value = attribute.unescape_and_decode_value(reader)?;

            match split_namespaced_name(key) {
                (Some("xmlns"), prefix) => self
                    .current_namespaces
                    .add_namespace_prefix(Some(prefix.to_owned()), &value),

                (None, "xmlns") => self.current_namespaces.add_namespace_prefix(None, &value),

                _ => (),
            }
        }

        match state {
            None => match local_name {
                "definitions" => {
                    let [namespace] =
                        get_attributes(reader, start.attributes(), ["targetNamespace"])?;

                    self.push_target_namespace(required(namespace, local_name, "targetNamespace")?);
                    new_state = ParseState::Definitions;
                }

                "schema" => {
                    let [namespace] =
                        get_attributes(reader, start.attributes(), ["targetNamespace"])?;

                    self.push_target_namespace(required(namespace, local_name, "targetNamespace")?);
                    new_state = ParseState::Schema;
                }

                _ => trace!(element = local_name, "skipping root element"),
            },

            Some(ParseState::Definitions) => match local_name {
                "documentation" => new_state = ParseState::Documentation(String::new()),

                "import" => {
                    let [location] = get_attributes(reader, start.attributes(), ["location"])?;

                    self.import(&required(location, local_name, "location")?)?;
                    new_state = ParseState::Import;
                }

                "types" => new_state = ParseState::Types,

                "message" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = ParseState::Message {
                        name: required(name, local_name, "name")?,
                        parts: Vec::new(),
                    };
                }

                "portType" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = ParseState::PortType {
                        name: required(name, local_name, "name")?,
                        operations: Vec::new(),
                    };
                }

                "binding" => {
                    let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;

                    new_state = ParseState::Binding {
                        name: required(name, local_name, "name")?,
                        ty: self.resolve_namespace(&required(ty, local_name, "type")?)?,
                        style: None,
                        transport: None,
                        operations: Vec::new(),
                    };
                }

                "service" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = ParseState::Service {
                        name: required(name, local_name, "name")?,
                        ports: Vec::new(),
                    };
                }

                _ => trace!(element = local_name, "skipping element inside definitions"),
            },

            Some(ParseState::Types) => match local_name {
                "schema" => {
                    let [namespace] =
                        get_attributes(reader, start.attributes(), ["targetNamespace"])?;

                    self.push_target_namespace(required(namespace, local_name, "targetNamespace")?);
                    new_state = ParseState::Schema;
                }

                _ => trace!(element = local_name, "skipping element inside types"),
            },

            Some(ParseState::Schema) => match local_name {
                "element" => {
                    let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;

                    let kind = match ty {
                        Some(ty) => Some(TypeKind::Alias(self.resolve_namespace(&ty)?)),
                        None => None,
                    };

                    new_state = ParseState::Element {
                        name: required(name, local_name, "name")?,
                        kind,
                    };
                }

                "complexType" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = ParseState::ComplexType {
                        name: Some(required(name, local_name, "name")?),
                        kind: None,
                    };
                }

                "simpleType" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = ParseState::SimpleType {
                        name: required(name, local_name, "name")?,
                        ty: None,
                    };
                }

                "include" | "import" => {
                    let [location] =
                        get_attributes(reader, start.attributes(), ["schemaLocation"])?;

                    if let Some(location) = location {
                        self.import(&location)?;
                    }

                    new_state = ParseState::Import;
                }

                _ => trace!(element = local_name, "skipping element inside schema"),
            },

            Some(ParseState::Element { .. } | ParseState::GroupElement { .. }) => match local_name {
                "complexType" => new_state = ParseState::ComplexType {
                    name: None,
                    kind: None,
                },

                _ => trace!(element = local_name, "skipping element inside element"),
            },

            Some(ParseState::ComplexType { .. }) => match local_name {
                "sequence" | "all" | "choice" => new_state = ParseState::Group(Vec::new()),

                _ => trace!(element = local_name, "skipping element inside complex type"),
            },

            Some(ParseState::Group(_)) => match local_name {
                "element" => {
                    let [name, ty, max_occurs] = get_attributes(
                        reader,
                        start.attributes(),
                        ["name", "type", "maxOccurs"],
                    )?;

                    let ty = match ty {
                        Some(ty) => Some(self.resolve_namespace(&ty)?),
                        None => None,
                    };

                    let max_occurs = match max_occurs {
                        Some(value) => Occurs::parse(&value).ok_or_else(|| {
                            Error::MalformedDocument(format!("invalid maxOccurs {}", value))
                        })?,
                        None => Occurs::default(),
                    };

                    new_state = ParseState::GroupElement {
                        name: required(name, local_name, "name")?,
                        ty,
                        inner: None,
                        max_occurs,
                    };
                }

                _ => trace!(element = local_name, "skipping element inside group"),
            },

            Some(ParseState::SimpleType { .. }) => match local_name {
                "restriction" => {
                    let [base] = get_attributes(reader, start.attributes(), ["base"])?;

                    new_state = ParseState::Restriction {
                        ty: self.resolve_namespace(&required(base, local_name, "base")?)?,
                    };
                }

                _ => trace!(element = local_name, "skipping element inside simple type"),
            },

            Some(ParseState::Message { .. }) => match local_name {
                "part" => {
                    let [name, element, ty] =
                        get_attributes(reader, start.attributes(), ["name", "element", "type"])?;

                    let element = required(element.or(ty), local_name, "element")?;

                    new_state = ParseState::Part {
                        name: required(name, local_name, "name")?,
                        element: self.resolve_namespace(&element)?,
                    };
                }

                _ => trace!(element = local_name, "skipping element inside message"),
            },

            Some(ParseState::PortType { .. }) => match local_name {
                "operation" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = ParseState::Operation {
                        name: required(name, local_name, "name")?,
                        documentation: None,
                        input: None,
                        output: None,
                    };
                }

                _ => trace!(element = local_name, "skipping element inside port type"),
            },

            Some(ParseState::Operation { .. }) => match local_name {
                "documentation" => new_state = ParseState::Documentation(String::new()),

                "input" | "output" => {
                    let [message] = get_attributes(reader, start.attributes(), ["message"])?;
                    let message = self.resolve_namespace(&required(message, local_name, "message")?)?;

                    new_state = if local_name == "input" {
                        ParseState::Input { message }
                    } else {
                        ParseState::Output { message }
                    };
                }

                _ => trace!(element = local_name, "skipping element inside operation"),
            },

            Some(ParseState::Binding { .. }) => match local_name {
                "binding" => {
                    let [style, transport] =
                        get_attributes(reader, start.attributes(), ["style", "transport"])?;

                    new_state = ParseState::Transport {
                        style,
                        transport: required(transport, local_name, "transport")?,
                    };
                }

                "operation" => {
                    let [name] = get_attributes(reader, start.attributes(), ["name"])?;

                    new_state = ParseState::BindingOperation {
                        name: required(name, local_name, "name")?,
                        input: None,
                        output: None,
                    };
                }

                _ => trace!(element = local_name, "skipping element inside binding"),
            },

            Some(ParseState::BindingOperation { .. }) => match local_name {
                "input" => new_state = ParseState::BindingInput { body: None },
                "output" => new_state = ParseState::BindingOutput { body: None },

                _ => trace!(element = local_name, "skipping element inside binding operation"),
            },

            Some(ParseState::BindingInput { .. } | ParseState::BindingOutput { .. }) => {
                match local_name {
                    "body" => {
                        let [body] = get_attributes(reader, start.attributes(), ["use"])?;

                        new_state = ParseState::BindingBody {
                            body: body.unwrap_or_else(|| "literal".to_owned()),
                        };
                    }

                    _ => trace!(element = local_name, "skipping element inside binding message"),
                }
            }

            Some(ParseState::Service { .. }) => match local_name {
                "port" => {
                    let [name, binding] =
                        get_attributes(reader, start.attributes(), ["name", "binding"])?;

                    new_state = ParseState::Port {
                        name: required(name, local_name, "name")?,
                        binding: self.resolve_namespace(&required(binding, local_name, "binding")?)?,
                        address: None,
                    };
                }

                _ => trace!(element = local_name, "skipping element inside service"),
            },

            Some(ParseState::Port { .. }) => match local_name {
                "address" => {
                    let [location] = get_attributes(reader, start.attributes(), ["location"])?;

                    new_state = ParseState::Address {
                        location: required(location, local_name, "location")?,
                    };
                }

                _ => trace!(element = local_name, "skipping element inside port"),
            },

            Some(ref other) => {
                trace!(element = local_name, parent = ?other, "skipping element");
            }
        }

        stack.extend(state);
        stack.push(new_state);

        Ok(())
    }

    fn handle_end(&mut self, stack: &mut Vec<ParseState>) -> Result<(), Error> {
        let finished_state = stack.pop();
        let mut next_state = stack.pop();

        match finished_state {
            Some(ParseState::Definitions | ParseState::Schema) => self.pop_target_namespace(),

            Some(ParseState::Documentation(text)) => match next_state {
                Some(ParseState::Definitions) => self.definition.documentation = Some(text),

                Some(ParseState::Operation {
                    ref mut documentation,
                    ..
                }) => *documentation = Some(text),

                _ => (),
            },

            Some(ParseState::Element { name, kind }) => match kind {
                Some(kind) => {
                    let name = self.target_namespaced(name)?;
                    self.definition.elements.push(Type { name, kind })
                }

                None => warn!(element = %name, "skipping untyped schema element"),
            },

            Some(ParseState::ComplexType { kind, name }) => {
                let kind = kind.unwrap_or_else(|| TypeKind::Struct(Vec::new()));

                match next_state {
                    Some(ParseState::GroupElement { ref mut inner, .. }) => *inner = Some(kind),

                    Some(ParseState::Element {
                        kind: ref mut element_kind,
                        ..
                    }) => *element_kind = Some(kind),

                    _ => {
                        let name = self.target_namespaced(required(name, "complexType", "name")?)?;
                        self.definition.types.push(Type { name, kind })
                    }
                }
            }

            Some(ParseState::Group(fields)) => match next_state {
                Some(ParseState::ComplexType { ref mut kind, .. }) if kind.is_none() => {
                    *kind = Some(TypeKind::Struct(fields))
                }

                _ => return Err(misplaced("sequence")),
            },

            Some(ParseState::GroupElement {
                name,
                ty,
                inner,
                max_occurs,
            }) => match next_state {
                Some(ParseState::Group(ref mut fields)) => {
                    let ty = match (inner, ty) {
                        (Some(kind), _) => FieldKind::Inner(kind),
                        (None, Some(ty)) => FieldKind::Type(ty),
                        (None, None) => {
                            return Err(Error::MalformedDocument(format!(
                                "element {} has no type",
                                name
                            )))
                        }
                    };

                    fields.push(Field {
                        name: self.target_namespaced(name)?,
                        ty,
                        max_occurs,
                    })
                }

                _ => return Err(misplaced("element")),
            },

            Some(ParseState::SimpleType { name, ty }) => {
                let ty = ty.ok_or_else(|| {
                    Error::MalformedDocument(format!("simple type {} has no restriction", name))
                })?;

                let name = self.target_namespaced(name)?;
                self.definition.types.push(Type {
                    name,
                    kind: TypeKind::Simple(ty),
                })
            }

            Some(ParseState::Restriction { ty: base }) => match next_state {
                Some(ParseState::SimpleType { ref mut ty, .. }) => *ty = Some(base),
                _ => return Err(misplaced("restriction")),
            },

            Some(ParseState::Message { name, parts }) => {
                let name = self.target_namespaced(name)?;
                self.definition.messages.push(Message { name, parts })
            }

            Some(ParseState::Part { name, element }) => match next_state {
                Some(ParseState::Message { ref mut parts, .. }) => parts.push(Field {
                    name: self.target_namespaced(name)?,
                    ty: FieldKind::Type(element),
                    max_occurs: Occurs::default(),
                }),
                _ => return Err(misplaced("part")),
            },

            Some(ParseState::PortType { name, operations }) => {
                let name = self.target_namespaced(name)?;
                self.definition
                    .port_types
                    .push(PortType { name, operations })
            }

            Some(ParseState::Operation {
                name,
                input,
                output,
                documentation,
            }) => match next_state {
                Some(ParseState::PortType {
                    ref mut operations, ..
                }) => operations.push(Operation {
                    name: self.target_namespaced(name)?,
                    input,
                    output,
                    documentation,
                }),
                _ => return Err(misplaced("operation")),
            },

            Some(ParseState::Input { message }) => match next_state {
                Some(ParseState::Operation { ref mut input, .. }) if input.is_none() => {
                    *input = Some(message)
                }
                _ => return Err(misplaced("input")),
            },

            Some(ParseState::Output { message }) => match next_state {
                Some(ParseState::Operation { ref mut output, .. }) if output.is_none() => {
                    *output = Some(message)
                }
                _ => return Err(misplaced("output")),
            },

            Some(ParseState::Transport {
                style: binding_style,
                transport: kind,
            }) => match next_state {
                Some(ParseState::Binding {
                    ref mut transport,
                    ref mut style,
                    ..
                }) if transport.is_none() => {
                    *transport = Some(kind);
                    *style = binding_style;
                }
                _ => return Err(misplaced("binding")),
            },

            Some(ParseState::Binding {
                name,
                ty,
                style,
                transport,
                operations,
            }) => {
                let name = self.target_namespaced(name)?;
                let transport = transport.ok_or_else(|| {
                    Error::MalformedDocument(format!("binding {} has no transport", name.name))
                })?;

                self.definition.bindings.push(Binding {
                    name,
                    ty,
                    style,
                    transport,
                    operations,
                })
            }

            Some(ParseState::BindingOperation {
                name,
                input,
                output,
            }) => match next_state {
                Some(ParseState::Binding {
                    ref mut operations, ..
                }) => operations.push(BindingOperation {
                    name: self.target_namespaced(name)?,
                    input,
                    output,
                }),
                _ => return Err(misplaced("operation")),
            },

            Some(ParseState::BindingInput { body }) => match next_state {
                Some(ParseState::BindingOperation { ref mut input, .. }) => *input = body,
                _ => return Err(misplaced("input")),
            },

            Some(ParseState::BindingOutput { body }) => match next_state {
                Some(ParseState::BindingOperation { ref mut output, .. }) => *output = body,
                _ => return Err(misplaced("output")),
            },

            Some(ParseState::BindingBody { body: body_use }) => match next_state {
                Some(
                    ParseState::BindingInput { ref mut body }
                    | ParseState::BindingOutput { ref mut body },
                ) => *body = Some(body_use),
                _ => return Err(misplaced("body")),
            },

            Some(ParseState::Service { name, ports }) => {
                let name = self.target_namespaced(name)?;
                self.definition.services.push(Service { name, ports })
            }

            Some(ParseState::Port {
                name,
                binding,
                address,
            }) => match next_state {
                Some(ParseState::Service { ref mut ports, .. }) => {
                    let name = self.target_namespaced(name)?;
                    let location = address.ok_or_else(|| {
                        Error::MalformedDocument(format!("port {} has no address", name.name))
                    })?;

                    ports.push(Port {
                        name,
                        binding,
                        location,
                    })
                }
                _ => return Err(misplaced("port")),
            },

            Some(ParseState::Address { location }) => match next_state {
                Some(ParseState::Port {
                    ref mut address, ..
                }) => *address = Some(location),
                _ => return Err(misplaced("address")),
            },

            _ => (),
        }

        stack.extend(next_state);
        Ok(())
    }

    fn handle_text<B: BufRead>(
        &mut self,
        stack: &mut [ParseState],
        reader: &Reader<B>,
        text: BytesText<'_>,
    ) -> Result<(), Error> {
        if let Some(ParseState::Documentation(docs)) = stack.last_mut() {
            docs.push_str(&text.unescape_and_decode(reader)?);
        }

        Ok(())
    }
}

pub fn parse(url: Url) -> Result<(Definition, Namespaces), Error> {
    Parser::new(Some(url)).parse()
}

pub fn parse_str(document: &str) -> Result<(Definition, Namespaces), Error> {
    let mut parser = Parser::new(None);
    parser.parse_xml(Reader::from_str(document))?;
    Ok((parser.definition, parser.namespaces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XML_SCHEMA;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:tns="urn:calc" xmlns:soap-env="http://schemas.xmlsoap.org/wsdl/soap/" xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" targetNamespace="urn:calc">
  <wsdl:documentation>Calculator &amp; friends.</wsdl:documentation>
  <wsdl:types>
    <xsd:schema attributeFormDefault="unqualified" elementFormDefault="unqualified" targetNamespace="urn:calc">
      <xsd:complexType name="Point">
        <xsd:all>
          <xsd:element name="x" type="xsd:int"/>
        </xsd:all>
      </xsd:complexType>
      <xsd:element name="sum" type="tns:sum"/>
      <xsd:complexType name="sum">
        <xsd:sequence>
          <xsd:element name="values" type="xsd:float" maxOccurs="unbounded"/>
          <xsd:element name="origin" type="tns:Point" maxOccurs="1"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:element name="sumResponse" type="tns:sumResponse"/>
      <xsd:complexType name="sumResponse">
        <xsd:sequence/>
      </xsd:complexType>
    </xsd:schema>
  </wsdl:types>
  <wsdl:message name="sum">
    <wsdl:part element="tns:sum" name="parameters"/>
  </wsdl:message>
  <wsdl:portType name="CalcPortType">
    <wsdl:operation name="sum">
      <wsdl:documentation>
	Adds.</wsdl:documentation>
      <wsdl:input message="tns:sum" name="sum"/>
      <wsdl:output message="tns:sumResponse" name="sumResponse"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="CalcBinding" type="tns:CalcPortType">
    <soap-env:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="sum">
      <wsdl:input>
        <soap-env:body use="literal"/>
      </wsdl:input>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="CalcService">
    <wsdl:port name="CalcPort" binding="tns:CalcBinding">
      <soap-env:address location="http://localhost/calc?a=1&amp;b=2"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;

    #[test]
    fn parses_generated_layout() {
        let (definition, namespaces) = parse_str(DOCUMENT).unwrap();

        assert_eq!(definition.target_namespace.as_deref(), Some("urn:calc"));
        assert_eq!(definition.documentation.as_deref(), Some("Calculator & friends."));
        assert_eq!(definition.location(), Some("http://localhost/calc?a=1&b=2"));

        let fields = definition.element_fields("sum").unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields[0].is_repeated());
        assert!(!fields[1].is_repeated());

        match &fields[0].ty {
            FieldKind::Type(ty) => {
                assert_eq!(ty.name, "float");
                assert!(ty.is_in(&namespaces, XML_SCHEMA));
            }
            other => panic!("unexpected field kind {:?}", other),
        }

        assert!(definition.element_fields("sumResponse").unwrap().is_empty());
        assert!(definition.schema_type("Point").is_some());

        let operation = definition.operation("sum").unwrap();
        assert_eq!(operation.documentation.as_deref(), Some("\n\tAdds."));
        assert_eq!(operation.output.as_ref().unwrap().name, "sumResponse");

        let binding = &definition.bindings[0];
        assert_eq!(binding.style.as_deref(), Some("document"));
        assert_eq!(binding.operations[0].input.as_deref(), Some("literal"));
    }

    #[test]
    fn missing_target_namespace_is_malformed() {
        let error = parse_str(r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"/>"#)
            .unwrap_err();

        assert!(matches!(error, Error::MalformedDocument(_)));
    }

    #[test]
    fn undeclared_prefix_is_malformed() {
        let error = parse_str(
            r#"<definitions targetNamespace="urn:x"><binding name="b" type="nope:T"/></definitions>"#,
        )
        .unwrap_err();

        assert!(error.to_string().contains("nope"));
    }

    #[test]
    fn relative_import_without_base_fails() {
        let error = parse_str(
            r#"<definitions targetNamespace="urn:x"><import location="other.wsdl"/></definitions>"#,
        )
        .unwrap_err();

        assert!(matches!(error, Error::UrlParseError(_)));
    }
}
