//! Adapters between document/literal calls and positional handler methods.

use lather_util::{HandlerError, SoapHandler, Struct, Value, WrappedHandler};
use lather_wsdl::Contract;
use std::collections::HashMap;
use tracing::debug;

/// Unpacks the request struct into positional arguments in declared parameter order and
/// wraps the result as `{return: value}`.
pub struct DocumentLiteral<H> {
    handler: H,
    parameters: HashMap<String, Vec<String>>,
}

/// Passes the request struct as the only argument and returns the result unchanged.
pub struct Unwrapped<H> {
    handler: H,
}

impl<H: WrappedHandler> DocumentLiteral<H> {
    pub fn new(handler: H, contract: &Contract) -> Self {
        let parameters: HashMap<String, Vec<String>> = contract
            .operations()
            .iter()
            .map(|operation| {
                let names = operation.input.iter().map(|param| param.name.clone());
                (operation.name.clone(), names.collect::<Vec<_>>())
            })
            .collect();

        Self {
            handler,
            parameters,
        }
    }

    pub fn into_inner(self) -> H {
        self.handler
    }
}

impl<H: WrappedHandler> SoapHandler for DocumentLiteral<H> {
    fn invoke(&self, operation: &str, request: Value) -> Result<Value, HandlerError> {
        let mut request = match request {
            Value::Null => Struct::new(),
            other => other.into_struct()?,
        };

        let arguments = match self.parameters.get(operation) {
            Some(names) => names
                .iter()
                .map(|name| request.take(name).unwrap_or(Value::Null))
                .collect(),
            None => request.into_fields().into_iter().map(|(_, value)| value).collect(),
        };

        debug!(operation, "forwarding document/literal call");

        Ok(match self.handler.call(operation, arguments)? {
            Some(value) => Value::Struct(Struct::new().with("return", value)),
            None => Value::Struct(Struct::new()),
        })
    }
}

impl<H: WrappedHandler> Unwrapped<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }
}

impl<H: WrappedHandler> SoapHandler for Unwrapped<H> {
    fn invoke(&self, operation: &str, request: Value) -> Result<Value, HandlerError> {
        Ok(self
            .handler
            .call(operation, vec![request])?
            .unwrap_or(Value::Null))
    }
}
