use thiserror::Error;

use super::{handler::HandlerError, soap::Fault};

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("Expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unable to read {value:?} as {expected}")]
    Parse {
        value: String,
        expected: &'static str,
    },

    #[error("Missing field {0}")]
    MissingField(String),

    #[error("Expected {expected} arguments, got {found}")]
    ArgumentCount { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Error processing XML")]
    XmlError(#[from] quick_xml::Error),

    #[error("Unable to load service description")]
    WsdlError(#[from] lather_wsdl::error::Error),

    #[error("No handler object has been set")]
    NoHandler,

    #[error("{0}")]
    Handler(HandlerError),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unable to reach service")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Error processing XML")]
    XmlError(#[from] quick_xml::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Service returned a fault: {0}")]
    Fault(Fault),
}
