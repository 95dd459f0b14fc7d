//! Service configuration read from TOML.
//!
//! ```toml
//! location = "http://localhost/calculator"
//! namespace = "urn:calculator"
//! schema_dir = "/var/cache/soap"
//! class_path = ["app.types"]
//!
//! [class_map]
//! Employee = "app.types.Employee"
//! ```

use lather_wsdl::ClassMap;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::{action::SoapAction, error::Error};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Endpoint URL; inferred from the CGI environment when absent.
    pub location: Option<String>,
    pub namespace: Option<String>,
    /// Title used in generated documentation instead of the service name.
    pub name: Option<String>,
    /// Adapt document/literal requests to positional handler calls.
    pub wrapper: bool,
    /// Detect documentation and WSDL requests. When disabled every request is a SOAP call.
    pub request: bool,
    pub schema_dir: Option<PathBuf>,
    pub class_path: Vec<String>,
    pub class_map: ClassMap,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            location: None,
            namespace: None,
            name: None,
            wrapper: true,
            request: true,
            schema_dir: None,
            class_path: Vec::new(),
            class_map: ClassMap::new(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn location(&self) -> String {
        self.location
            .clone()
            .unwrap_or_else(|| SoapAction::from_env().url())
    }
}
