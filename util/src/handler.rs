use super::value::Value;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives decoded document/literal calls: the request element as a struct of named
/// arguments, answering with the response content.
pub trait SoapHandler {
    fn invoke(&self, operation: &str, request: Value) -> Result<Value, HandlerError>;
}

/// A handler whose methods take positional arguments. `Ok(None)` marks a method
/// without a return value.
pub trait WrappedHandler {
    fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, HandlerError>;
}

impl<F> SoapHandler for F
where
    F: Fn(&str, Value) -> Result<Value, HandlerError>,
{
    fn invoke(&self, operation: &str, request: Value) -> Result<Value, HandlerError> {
        self(operation, request)
    }
}

impl<T: WrappedHandler + ?Sized> WrappedHandler for Box<T> {
    fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, HandlerError> {
        (**self).call(method, arguments)
    }
}

impl<T: WrappedHandler + ?Sized> WrappedHandler for std::sync::Arc<T> {
    fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>, HandlerError> {
        (**self).call(method, arguments)
    }
}

/// Error for a method name the handler does not implement.
#[derive(Debug, thiserror::Error)]
#[error("Function '{0}' doesn't exist")]
pub struct UnknownMethod(pub String);
