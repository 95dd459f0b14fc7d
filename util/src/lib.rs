pub mod error;
pub mod handler;
pub mod server;
pub mod soap;
pub mod value;
pub mod xml;

pub use handler::{HandlerError, SoapHandler, UnknownMethod, WrappedHandler};
pub use server::{ServerOptions, SoapServer, Style, Use};
pub use soap::{Client, Envelope, Fault, FaultCode, Payload, SoapVersion};
pub use value::{FromValue, IntoValue, Struct, Value};
