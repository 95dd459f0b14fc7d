//! Exposes the methods of a handler type as a SOAP service: a WSDL document and API
//! documentation generated from the handler's doc comments, and document/literal
//! dispatch of incoming calls.
//!
//! ```ignore
//! struct Calculator;
//!
//! #[lather::service]
//! impl Calculator {
//!     /// Adds two numbers.
//!     /// @param float $a
//!     /// @param float $b
//!     /// @return float
//!     pub fn add(&self, a: f64, b: f64) -> f64 {
//!         a + b
//!     }
//! }
//!
//! let service = lather::SoapService::from_handler(Calculator, "http://localhost/calculator")?;
//! let request = lather::http::Request::from_cgi(std::io::stdin())?;
//! service.process(&request, &mut lather::http::CgiPeer::new(std::io::stdout()))?;
//! ```

pub mod action;
pub mod config;
pub mod description;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod http;
mod markup;
pub mod request;
pub mod sample;
pub mod wrapper;

pub use lather_macro::{service, SoapType};
pub use lather_util as util;
pub use lather_wsdl as wsdl;

pub use action::SoapAction;
pub use config::ServiceConfig;
pub use description::{Generator, ServiceDescription};
pub use dispatch::SoapService;
pub use error::Error;
pub use format::Format;
pub use request::{SoapRequest, Target};
pub use wrapper::{DocumentLiteral, Unwrapped};
