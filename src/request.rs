use std::{fmt, str::FromStr};
use tracing::{debug, warn};

use crate::{
    dispatch::SoapService,
    error::Error,
    format::Format,
    http::{Peer, Request},
};

pub const SOAP_MIME_TYPE: &str = "application/soap+xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Docs,
    Wsdl,
    Soap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTarget(pub String);

/// What a request asks for: documentation, the WSDL document or a SOAP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoapRequest {
    target: Target,
    format: Format,
}

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "docs" => Ok(Self::Docs),
            "wsdl" => Ok(Self::Wsdl),
            "soap" => Ok(Self::Soap),
            other => Err(UnknownTarget(other.to_owned())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Docs => "docs",
            Self::Wsdl => "wsdl",
            Self::Soap => "soap",
        })
    }
}

impl SoapRequest {
    pub fn new(target: Target, format: Format) -> Self {
        Self { target, format }
    }

    /// Inspects, in order: `target`, `docs`, `wsdl` and `soap` parameters, then a SOAP
    /// content type. Requests matching none of them get `default`.
    pub fn detect(request: &Request, default: Target) -> Self {
        let parameters = request.parameters();
        let param = |name: &str| {
            parameters
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        let format = param("docs").map_or(Format::Html, |format| {
            format.parse().unwrap_or_default()
        });

        let is_soap = request
            .content_type
            .as_deref()
            .map_or(false, |content_type| content_type.starts_with(SOAP_MIME_TYPE));

        let target = if is_soap {
            Target::Soap
        } else if let Some(target) = param("target") {
            target.parse().unwrap_or_else(|UnknownTarget(target)| {
                warn!(%target, "unknown request target, serving documentation");
                Target::Docs
            })
        } else if param("docs").is_some() {
            Target::Docs
        } else if param("wsdl").is_some() {
            Target::Wsdl
        } else if param("soap").is_some() {
            Target::Soap
        } else {
            default
        };

        debug!(%target, %format, "detected request target");
        Self { target, format }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn process(
        &self,
        service: &SoapService,
        request: &Request,
        peer: &mut dyn Peer,
    ) -> Result<(), Error> {
        match self.target {
            Target::Docs => service.send_documentation(self.format, peer),
            Target::Wsdl => service.send_description(peer),
            Target::Soap => service.handle_request(&request.body, peer),
        }
    }
}
