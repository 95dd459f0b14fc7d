use lather_util::{error::ServerError, HandlerError};
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Raised by the handler; a `Receiver` fault has already been sent.
    #[error("{0}")]
    Handler(HandlerError),

    #[error("Unable to describe service")]
    Wsdl(#[from] lather_wsdl::error::Error),

    #[error("Error processing SOAP request")]
    Server(#[from] ServerError),

    #[error("The SOAP service handler is unset")]
    NoHandler,

    #[error("Invalid service location")]
    Location(#[from] url::ParseError),

    #[error("Error writing XML")]
    Xml(#[from] quick_xml::Error),

    #[error("Unable to save {0}")]
    Save(PathBuf, #[source] io::Error),

    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("Unable to read configuration")]
    Config(#[from] toml::de::Error),
}
