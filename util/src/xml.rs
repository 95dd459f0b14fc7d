use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

use super::{
    soap::SoapVersion,
    value::{Struct, Value},
};

pub use quick_xml::{events, Reader, Writer};

pub trait ToXml {
    fn to_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()>;

    /// Writes the value as the content of an envelope body.
    fn to_body_xml<W: Write>(
        &self,
        writer: &mut Writer<W>,
        _version: SoapVersion,
    ) -> quick_xml::Result<()> {
        self.to_xml(writer)
    }
}

/// Element tree of a received message. Names are kept without their prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub prefix: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub text: String,
}

fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

impl Node {
    fn from_start<B: std::io::BufRead>(
        reader: &Reader<B>,
        start: &BytesStart<'_>,
    ) -> quick_xml::Result<Self> {
        let (prefix, name) = split_name(reader.decode(start.name())?);

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = reader.decode(attribute.key)?;
            let key = match split_name(key) {
                (Some("xmlns"), _) => key,
                (_, local) => local,
            };
            attributes.push((key.to_owned(), attribute.unescape_and_decode_value(reader)?));
        }

        Ok(Self {
            name: name.to_owned(),
            prefix: prefix.map(ToOwned::to_owned),
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Parses a document and returns its root element.
    pub fn parse(bytes: &[u8]) -> quick_xml::Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut stack: Vec<Node> = Vec::new();
        let mut buffer = Vec::new();

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Start(start) => stack.push(Self::from_start(&reader, &start)?),

                Event::Empty(start) => {
                    let node = Self::from_start(&reader, &start)?;

                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }

                Event::End(_) => {
                    let node = stack.pop().ok_or_else(|| {
                        quick_xml::Error::UnexpectedEof("unbalanced end tag".into())
                    })?;

                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }

                Event::Text(text) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text.unescape_and_decode(&reader)?);
                    }
                }

                Event::CData(data) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(reader.decode(&data)?);
                    }
                }

                Event::Eof => {
                    return Err(quick_xml::Error::UnexpectedEof("document element".into()))
                }

                _ => (),
            }

            buffer.clear();
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn first_element(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Namespace of this element, when declared on the element itself.
    pub fn namespace(&self) -> Option<&str> {
        match &self.prefix {
            Some(prefix) => self.attribute(&format!("xmlns:{}", prefix)),
            None => self.attribute("xmlns"),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.attribute("nil"), Some("true" | "1"))
    }

    /// Decodes without a schema: leaves become strings, repeated child names arrays.
    pub fn to_value(&self) -> Value {
        if self.is_nil() {
            return Value::Null;
        }

        if self.children.is_empty() {
            return Value::String(self.text.clone());
        }

        let mut fields = Struct::new();
        for child in &self.children {
            let value = child.to_value();

            match fields.take(&child.name) {
                Some(Value::Array(mut values)) => {
                    values.push(value);
                    fields.insert(child.name.clone(), Value::Array(values));
                }
                Some(previous) => {
                    fields.insert(child.name.clone(), Value::Array(vec![previous, value]))
                }
                None => fields.insert(child.name.clone(), value),
            }
        }

        Value::Struct(fields)
    }
}

/// Writes a value as the content of an element named `name`. Arrays repeat the element.
pub fn write_value<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
) -> quick_xml::Result<()> {
    match value {
        Value::Array(values) => {
            for value in values {
                write_value(writer, name, value)?;
            }
        }

        Value::Null => {
            writer.write_event(Event::Empty(BytesStart::borrowed_name(name.as_bytes())))?;
        }

        Value::Struct(fields) => {
            writer.write_event(Event::Start(BytesStart::borrowed_name(name.as_bytes())))?;
            write_fields(writer, fields)?;
            writer.write_event(Event::End(BytesEnd::borrowed(name.as_bytes())))?;
        }

        scalar => {
            let text = scalar.to_string();

            writer.write_event(Event::Start(BytesStart::borrowed_name(name.as_bytes())))?;
            writer.write_event(Event::Text(BytesText::from_plain_str(&text)))?;
            writer.write_event(Event::End(BytesEnd::borrowed(name.as_bytes())))?;
        }
    }

    Ok(())
}

pub fn write_fields<W: Write>(writer: &mut Writer<W>, fields: &Struct) -> quick_xml::Result<()> {
    for (name, value) in fields.fields() {
        write_value(writer, name, value)?;
    }

    Ok(())
}
