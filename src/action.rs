//! Service location inferred from explicit values or the CGI environment.

use std::{env, fmt};

/// Scheme, host, port and script name of the endpoint handling SOAP calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapAction {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

impl SoapAction {
    /// Reads `REQUEST_SCHEME`, `SERVER_NAME`, `SERVER_PORT` and `SCRIPT_NAME`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            scheme: lookup("REQUEST_SCHEME").unwrap_or_else(|| "http".into()),
            host: lookup("SERVER_NAME").unwrap_or_else(|| "localhost".into()),
            port: lookup("SERVER_PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(80),
            name: lookup("SCRIPT_NAME")
                .map(|name| name.trim_start_matches('/').to_owned())
                .unwrap_or_default(),
        }
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.name = name.as_ref().trim_start_matches('/').to_owned();
        self
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl Default for SoapAction {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl fmt::Display for SoapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            80 | 443 => write!(f, "{}://{}/{}", self.scheme, self.host, self.name),
            port => write!(f, "{}://{}:{}/{}", self.scheme, self.host, port, self.name),
        }
    }
}
