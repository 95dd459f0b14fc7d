use std::path::Path;
use url::Url;

mod parser;

pub mod builder;
pub mod catalog;
pub mod comment;
pub mod contract;
pub mod discover;
pub mod error;
pub mod reflect;
pub mod types;

pub use builder::build;
pub use catalog::{ClassMap, TypeCatalog};
pub use contract::Contract;
pub use discover::Discoverer;

pub const XML_SCHEMA: &str = "http://www.w3.org/2001/XMLSchema";
pub const SCHEMA_WSDL: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const SCHEMA_SOAP: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
pub const SCHEMA_SOAP_HTTP: &str = "http://schemas.xmlsoap.org/soap/http";
pub const SOAP_SCHEMA_ENCODING: &str = "http://schemas.xmlsoap.org/soap/encoding/";
pub const SOAP_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP12_ENVELOPE: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Parses a WSDL document from a URL or a local path.
pub fn parse<S: AsRef<str>>(
    url: S,
) -> Result<(types::Definition, types::Namespaces), error::Error> {
    let url = {
        match Url::parse(url.as_ref()) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::from_file_path(
                &Path::new(url.as_ref())
                    .canonicalize()
                    .map_err(|err| error::Error::PathConversionError(Some(err)))?,
            )
            .map_err(|()| error::Error::PathConversionError(None))?,
            Err(err) => return Err(err.into()),
        }
    };

    parser::parse(url)
}

/// Parses a WSDL document held in memory. Relative imports are not supported.
pub fn parse_str(
    document: &str,
) -> Result<(types::Definition, types::Namespaces), error::Error> {
    parser::parse_str(document)
}
