use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unable to convert provided path")]
    PathConversionError(Option<std::io::Error>),

    #[error("Unable to open file")]
    FileOpenError(quick_xml::Error),

    #[error("Unable to get file from server")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("Error processing XML")]
    XmlError(#[from] quick_xml::Error),

    #[error("Malformed WSDL document: {0}")]
    MalformedDocument(String),

    #[error("Failed reflection on type {0} (maybe missing in class map or class path)")]
    UnresolvedType(String),

    #[error("Got type named 'type', please check @param or @return in method documentation")]
    MalformedAnnotation,
}
