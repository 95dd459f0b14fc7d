//! Output formats of a service description.

use std::{convert::Infallible, fmt, str::FromStr};

use crate::description::Generator;

mod code;
mod html;

pub const WSDL_CONTENT_TYPE: &str = "application/wsdl+xml";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    Wsdl,
    Xml,
    /// API documentation page.
    #[default]
    Html,
    /// The WSDL document inside an HTML page.
    Text,
    /// The WSDL document with syntax highlighting.
    Syntax,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Wsdl | Self::Xml => WSDL_CONTENT_TYPE,
            Self::Html | Self::Text | Self::Syntax => HTML_CONTENT_TYPE,
        }
    }

    pub fn render(self, generator: &Generator, title: &str) -> quick_xml::Result<String> {
        match self {
            Self::Wsdl | Self::Xml => Ok(generator.document().to_owned()),
            Self::Html => html::render(generator, title),
            Self::Text => code::render(generator, title, false),
            Self::Syntax => code::render(generator, title, true),
        }
    }
}

/// Unknown names select the documentation page.
impl FromStr for Format {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.to_ascii_lowercase().as_str() {
            "wsdl" => Self::Wsdl,
            "xml" => Self::Xml,
            "text" => Self::Text,
            "syntax" => Self::Syntax,
            _ => Self::Html,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wsdl => "wsdl",
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Text => "text",
            Self::Syntax => "syntax",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("wsdl", Format::Wsdl)]
    #[test_case("XML", Format::Xml)]
    #[test_case("text", Format::Text)]
    #[test_case("syntax", Format::Syntax)]
    #[test_case("html", Format::Html)]
    #[test_case("xslt", Format::Html)]
    #[test_case("", Format::Html)]
    fn parses_names(name: &str, expected: Format) {
        assert_eq!(name.parse::<Format>(), Ok(expected));
    }

    #[test]
    fn content_types() {
        assert_eq!(Format::Xml.content_type(), "application/wsdl+xml");
        assert_eq!(Format::Syntax.content_type(), "text/html; charset=utf-8");
    }
}
