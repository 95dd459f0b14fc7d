use lather_wsdl::{
    catalog::ClassMap,
    contract::response_name,
    types::{Definition, Field, FieldKind, Namespaces, NamespacedName, TypeKind},
    XML_SCHEMA,
};
use tracing::{debug, warn};

use super::{
    error::ServerError,
    handler::SoapHandler,
    soap::{Envelope, Fault, FaultCode, Payload, SoapVersion},
    value::{Struct, Value},
    xml::Node,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Document,
    Rpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Use {
    #[default]
    Literal,
    Encoded,
}

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Where the service description was loaded from.
    pub uri: Option<String>,
    pub location: Option<String>,
    pub style: Style,
    pub encoding: Use,
    pub class_map: ClassMap,
    pub cache_wsdl: bool,
}

/// Decodes SOAP requests against a parsed service description, forwards them to a
/// handler and encodes the answer.
pub struct SoapServer {
    definition: Definition,
    namespaces: Namespaces,
    options: ServerOptions,
    handler: Option<Box<dyn SoapHandler>>,
}

struct Call {
    version: SoapVersion,
    operation: String,
    arguments: Struct,
}

impl SoapServer {
    pub fn new(definition: Definition, namespaces: Namespaces, options: ServerOptions) -> Self {
        Self {
            definition,
            namespaces,
            options,
            handler: None,
        }
    }

    /// Loads the description named by `options.uri`.
    pub fn load(options: ServerOptions) -> Result<Self, ServerError> {
        let uri = options
            .uri
            .clone()
            .ok_or_else(|| lather_wsdl::error::Error::MalformedDocument("no document URI".into()))?;
        let (definition, namespaces) = lather_wsdl::parse(uri)?;

        Ok(Self::new(definition, namespaces, options))
    }

    pub fn from_document(document: &str, options: ServerOptions) -> Result<Self, ServerError> {
        let (definition, namespaces) = lather_wsdl::parse_str(document)?;
        Ok(Self::new(definition, namespaces, options))
    }

    pub fn set_object(&mut self, handler: Box<dyn SoapHandler>) {
        self.handler = Some(handler);
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    fn namespace(&self) -> &str {
        self.definition.target_namespace.as_deref().unwrap_or_default()
    }

    /// Processes one request. The reply uses the envelope version of the request.
    /// Requests that cannot be decoded are answered with a `Sender` fault; handler
    /// failures are returned to the caller.
    pub fn handle(&self, request: &[u8]) -> Result<Vec<u8>, ServerError> {
        let call = match self.decode(request) {
            Ok(call) => call,
            Err((version, reason)) => {
                warn!(%reason, ?version, "rejecting request");
                return self.fault(version, FaultCode::Sender, &reason);
            }
        };

        let handler = self.handler.as_ref().ok_or(ServerError::NoHandler)?;

        debug!(operation = %call.operation, arguments = call.arguments.len(), "invoking handler");

        let result = handler
            .invoke(&call.operation, Value::Struct(call.arguments))
            .map_err(ServerError::Handler)?;

        let content = match result {
            Value::Struct(content) => content,
            Value::Null => Struct::new(),
            other => Struct::new().with("return", other),
        };

        let payload = Payload::new(
            self.response_element(&call.operation),
            self.namespace(),
            content,
        );

        Ok(Envelope::with_version(payload, call.version).to_request()?)
    }

    pub fn fault(
        &self,
        version: SoapVersion,
        code: FaultCode,
        reason: &str,
    ) -> Result<Vec<u8>, ServerError> {
        Ok(Envelope::with_version(Fault::new(code, reason), version).to_request()?)
    }

    fn decode(&self, request: &[u8]) -> Result<Call, (SoapVersion, String)> {
        let bad_request = |version| (version, "Bad Request".to_owned());

        let envelope = Node::parse(request).map_err(|_| bad_request(SoapVersion::default()))?;
        let version = SoapVersion::of(&envelope);

        if envelope.name != "Envelope" {
            return Err(bad_request(version));
        }

        let element = envelope
            .child("Body")
            .and_then(Node::first_element)
            .ok_or_else(|| bad_request(version))?;

        let operation = self.operation_for(&element.name).ok_or_else(|| {
            (version, format!("Procedure '{}' not present", element.name))
        })?;

        let arguments = match self.definition.element_fields(&element.name) {
            Some(fields) => self.decode_fields(element, fields),
            None => Ok(element.to_value().into_struct().unwrap_or_default()),
        }
        .map_err(|reason| (version, reason))?;

        Ok(Call {
            version,
            operation,
            arguments,
        })
    }

    /// Operation whose input message carries `element`.
    fn operation_for(&self, element: &str) -> Option<String> {
        self.definition
            .operations()
            .find(|operation| {
                operation
                    .input
                    .as_ref()
                    .and_then(|input| self.definition.message(&input.name))
                    .map_or(false, |message| {
                        message.parts.iter().any(|part| match &part.ty {
                            FieldKind::Type(ty) => ty.name == element,
                            FieldKind::Inner(_) => false,
                        })
                    })
            })
            .or_else(|| {
                self.definition
                    .operations()
                    .find(|operation| operation.name.name == element)
            })
            .map(|operation| operation.name.name.clone())
    }

    fn response_element(&self, operation: &str) -> String {
        self.definition
            .operation(operation)
            .and_then(|operation| operation.output.as_ref())
            .and_then(|output| self.definition.message(&output.name))
            .and_then(|message| message.parts.first())
            .and_then(|part| match &part.ty {
                FieldKind::Type(ty) => Some(ty.name.clone()),
                FieldKind::Inner(_) => None,
            })
            .unwrap_or_else(|| response_name(operation))
    }

    fn decode_fields(&self, node: &Node, fields: &[Field]) -> Result<Struct, String> {
        let mut result = Struct::new();

        for field in fields {
            let name = &field.name.name;
            let mut matches = node.children_named(name).peekable();

            if field.is_repeated() {
                let values = matches
                    .map(|child| self.decode_kind(child, &field.ty))
                    .collect::<Result<Vec<_>, _>>()?;
                result.insert(name.clone(), Value::Array(values));
            } else if let Some(child) = matches.peek() {
                result.insert(name.clone(), self.decode_kind(child, &field.ty)?);
            }
        }

        Ok(result)
    }

    fn decode_kind(&self, node: &Node, kind: &FieldKind) -> Result<Value, String> {
        if node.is_nil() {
            return Ok(Value::Null);
        }

        match kind {
            FieldKind::Type(ty) => self.decode_type(node, ty),
            FieldKind::Inner(kind) => self.decode_type_kind(node, None, kind),
        }
    }

    fn decode_type(&self, node: &Node, ty: &NamespacedName) -> Result<Value, String> {
        if ty.is_in(&self.namespaces, XML_SCHEMA) {
            return decode_scalar(&ty.name, &node.text);
        }

        match self.definition.schema_type(&ty.name) {
            Some(schema_type) => self.decode_type_kind(node, Some(&ty.name), &schema_type.kind),
            None => Ok(node.to_value()),
        }
    }

    fn decode_type_kind(
        &self,
        node: &Node,
        name: Option<&str>,
        kind: &TypeKind,
    ) -> Result<Value, String> {
        match kind {
            TypeKind::Struct(fields) => {
                let mut value = self.decode_fields(node, fields)?;

                if let Some(name) = name {
                    let full_name = self
                        .options
                        .class_map
                        .get(name)
                        .map(String::as_str)
                        .unwrap_or(name);
                    value.set_type_name(full_name);
                }

                Ok(Value::Struct(value))
            }

            TypeKind::Simple(base) | TypeKind::Alias(base) => self.decode_type(node, base),
        }
    }
}

fn decode_scalar(type_name: &str, text: &str) -> Result<Value, String> {
    let invalid = || format!("Invalid value {:?} for type {}", text, type_name);

    match type_name {
        "int" | "integer" | "long" | "short" | "byte" | "unsignedInt" | "unsignedShort"
        | "unsignedByte" | "nonNegativeInteger" | "positiveInteger" => {
            text.trim().parse().map(Value::Int).map_err(|_| invalid())
        }

        "float" | "double" | "decimal" => {
            text.trim().parse().map(Value::Float).map_err(|_| invalid())
        }

        "boolean" => match text.trim() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },

        _ => Ok(Value::String(text.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ClientError, handler::HandlerError, soap::decode_response};

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:tns="urn:shop" xmlns:soap-env="http://schemas.xmlsoap.org/wsdl/soap/" xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/" targetNamespace="urn:shop">
  <wsdl:types>
    <xsd:schema targetNamespace="urn:shop">
      <xsd:complexType name="Item">
        <xsd:all>
          <xsd:element name="sku" type="xsd:string"/>
          <xsd:element name="count" type="xsd:int"/>
        </xsd:all>
      </xsd:complexType>
      <xsd:element name="order" type="tns:order"/>
      <xsd:complexType name="order">
        <xsd:sequence>
          <xsd:element name="items" type="tns:Item" maxOccurs="unbounded"/>
          <xsd:element name="express" type="xsd:boolean" maxOccurs="1"/>
          <xsd:element name="discount" type="xsd:float" maxOccurs="1"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:element name="orderResponse" type="tns:orderResponse"/>
      <xsd:complexType name="orderResponse">
        <xsd:sequence>
          <xsd:element name="return" type="xsd:int" maxOccurs="1"/>
        </xsd:sequence>
      </xsd:complexType>
    </xsd:schema>
  </wsdl:types>
  <wsdl:message name="order"><wsdl:part element="tns:order" name="parameters"/></wsdl:message>
  <wsdl:message name="orderResponse"><wsdl:part element="tns:orderResponse" name="parameters"/></wsdl:message>
  <wsdl:portType name="ShopPortType">
    <wsdl:operation name="order">
      <wsdl:input message="tns:order" name="order"/>
      <wsdl:output message="tns:orderResponse" name="orderResponse"/>
    </wsdl:operation>
  </wsdl:portType>
</wsdl:definitions>"#;

    fn request(body: &str) -> Vec<u8> {
        format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="urn:shop"><soap:Body>{}</soap:Body></soap:Envelope>"#,
            body
        )
        .into_bytes()
    }

    fn server() -> SoapServer {
        let mut class_map = ClassMap::new();
        class_map.insert("Item".into(), "app.shop.Item".into());

        SoapServer::from_document(
            DOCUMENT,
            ServerOptions {
                class_map,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn decodes_typed_arguments() {
        let mut server = server();
        server.set_object(Box::new(|operation: &str, request: Value| -> Result<Value, HandlerError> {
            assert_eq!(operation, "order");

            let mut request = request.into_struct()?;
            let items = request.take("items").unwrap();
            let items = items.as_array().unwrap();

            assert_eq!(items.len(), 2);
            let first = items[0].as_struct().unwrap();
            assert_eq!(first.type_name(), Some("app.shop.Item"));
            assert_eq!(first.get("count"), Some(&Value::Int(3)));
            assert_eq!(request.get("express"), Some(&Value::Bool(true)));
            assert_eq!(request.get("discount"), Some(&Value::Float(0.5)));

            Ok(Value::Int(5))
        }));

        let response = server
            .handle(&request(
                "<ns1:order><items><sku>a</sku><count>3</count></items><items><sku>b</sku><count>1</count></items><express>1</express><discount>0.5</discount></ns1:order>",
            ))
            .unwrap();
        let response = String::from_utf8(response).unwrap();

        assert!(response.contains("<ns1:orderResponse xmlns:ns1=\"urn:shop\">"));
        assert!(response.contains("<return>5</return>"));
    }

    fn soap12_request(body: &str) -> Vec<u8> {
        format!(
            r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope" xmlns:ns1="urn:shop"><env:Body>{}</env:Body></env:Envelope>"#,
            body
        )
        .into_bytes()
    }

    fn fault_of(response: &[u8]) -> Fault {
        match decode_response(response) {
            Err(ClientError::Fault(fault)) => fault,
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn unknown_operation_is_a_sender_fault() {
        let server = server();
        let response = server.handle(&request("<ns1:refund/>")).unwrap();

        assert!(String::from_utf8_lossy(&response).contains("<faultcode>Sender</faultcode>"));
        assert_eq!(fault_of(&response).reason, "Procedure 'refund' not present");
    }

    #[test]
    fn soap12_requests_get_soap12_replies() {
        let mut server = server();
        server.set_object(Box::new(|_: &str, _: Value| -> Result<Value, HandlerError> {
            Ok(Value::Int(2))
        }));

        let response = String::from_utf8(server.handle(&soap12_request("<ns1:order/>")).unwrap())
            .unwrap();

        assert!(response.starts_with(
            "<env:Envelope xmlns:env=\"http://www.w3.org/2003/05/soap-envelope\">"
        ));
        assert!(response.contains("<return>2</return>"));
    }

    #[test]
    fn soap12_faults_use_code_and_reason() {
        let server = server();
        let response = server.handle(&soap12_request("<ns1:refund/>")).unwrap();
        let text = String::from_utf8_lossy(&response);

        assert!(text.contains("<env:Value>env:Sender</env:Value>"));
        assert!(!text.contains("faultstring"));

        let fault = fault_of(&response);
        assert_eq!(fault.code, "env:Sender");
        assert_eq!(fault.reason, "Procedure 'refund' not present");
    }

    #[test]
    fn malformed_envelope_is_a_sender_fault() {
        let server = server();
        let response = String::from_utf8(server.handle(b"<not-soap").unwrap()).unwrap();

        assert!(response.contains("<faultstring>Bad Request</faultstring>"));
    }

    #[test]
    fn invalid_scalar_is_a_sender_fault() {
        let server = server();
        let response = String::from_utf8(
            server
                .handle(&request("<ns1:order><discount>lots</discount></ns1:order>"))
                .unwrap(),
        )
        .unwrap();

        assert!(response.contains("Invalid value"));
    }

    #[test]
    fn handler_errors_are_returned() {
        let mut server = server();
        server.set_object(Box::new(|_: &str, _: Value| -> Result<Value, HandlerError> {
            Err("out of stock".into())
        }));

        match server.handle(&request("<ns1:order/>")) {
            Err(ServerError::Handler(error)) => assert_eq!(error.to_string(), "out of stock"),
            other => panic!("expected handler error, got {:?}", other.map(String::from_utf8)),
        }
    }

    #[test]
    fn missing_handler() {
        let server = server();
        assert!(matches!(
            server.handle(&request("<ns1:order/>")),
            Err(ServerError::NoHandler)
        ));
    }
}
