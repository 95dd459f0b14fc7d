use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::io::Cursor;

use super::{
    contract::{response_name, ComplexType, Contract, Operation},
    error::Error,
    SCHEMA_SOAP, SCHEMA_SOAP_HTTP, SCHEMA_WSDL, SOAP_SCHEMA_ENCODING, XML_SCHEMA,
};

fn max_occurs(repeated: bool) -> &'static str {
    if repeated {
        "unbounded"
    } else {
        "1"
    }
}

/// Operation documentation with its parameter and return trailer.
pub fn operation_documentation(contract: &Contract, operation: &Operation) -> String {
    let catalog = contract.catalog();
    let mut documentation = format!("\n\t{}", operation.documentation);

    for param in &operation.input {
        documentation.push_str(&format!(
            "\n\t@param {} {} [name={}]",
            catalog.schema_name(&param.type_name),
            param.docs,
            param.name
        ));
    }

    if let Some(output) = &operation.output {
        documentation.push_str(&format!(
            "\n\t@return {} {}",
            catalog.schema_name(&output.type_name),
            output.docs
        ));
    }

    documentation
}

struct DocumentWriter<'a> {
    contract: &'a Contract,
    writer: Writer<Cursor<Vec<u8>>>,
}

impl<'a> DocumentWriter<'a> {
    fn new(contract: &'a Contract) -> Self {
        Self {
            contract,
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        let start = BytesStart::borrowed_name(name.as_bytes())
            .with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), Error> {
        self.writer
            .write_event(Event::End(BytesEnd::borrowed(name.as_bytes())))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        let start = BytesStart::borrowed_name(name.as_bytes())
            .with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.start(name, &[])?;
        self.writer
            .write_event(Event::Text(BytesText::from_plain_str(text)))?;
        self.end(name)
    }

    fn type_reference(&self, type_name: &str) -> Result<String, Error> {
        self.contract
            .catalog()
            .qualified_name(type_name)
            .ok_or_else(|| Error::UnresolvedType(type_name.to_owned()))
    }

    fn write(mut self) -> Result<String, Error> {
        let contract = self.contract;
        let namespace = contract.namespace();

        self.writer
            .write_event(Event::Decl(BytesDecl::new(b"1.0", Some(b"utf-8"), None)))?;

        self.start(
            "wsdl:definitions",
            &[
                ("xmlns:xsd", XML_SCHEMA),
                ("xmlns:tns", namespace),
                ("xmlns:soap-env", SCHEMA_SOAP),
                ("xmlns:wsdl", SCHEMA_WSDL),
                ("xmlns:soapenc", SOAP_SCHEMA_ENCODING),
                ("targetNamespace", namespace),
            ],
        )?;

        if let Some(documentation) = contract.documentation() {
            self.text_element("wsdl:documentation", documentation)?;
        }

        self.write_types()?;
        self.write_messages()?;
        self.write_port_type()?;
        self.write_binding()?;
        self.write_service()?;

        self.end("wsdl:definitions")?;

        let bytes = self.writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|err| quick_xml::Error::Utf8(err.utf8_error()).into())
    }

    fn write_types(&mut self) -> Result<(), Error> {
        let contract = self.contract;

        self.start("wsdl:types", &[])?;
        self.start(
            "xsd:schema",
            &[
                ("attributeFormDefault", "unqualified"),
                ("elementFormDefault", "unqualified"),
                ("targetNamespace", contract.namespace()),
            ],
        )?;

        for complex in contract.complex_types() {
            self.write_complex_type(complex)?;
        }

        for operation in contract.operations() {
            let input = operation
                .input
                .iter()
                .map(|param| (param.name.as_str(), param.type_name.as_str(), param.repeated));
            self.write_message_type(&operation.name, input)?;

            let output = operation
                .output
                .iter()
                .map(|output| ("return", output.type_name.as_str(), output.repeated));
            self.write_message_type(&operation.response_name(), output)?;
        }

        self.end("xsd:schema")?;
        self.end("wsdl:types")
    }

    fn write_complex_type(&mut self, complex: &ComplexType) -> Result<(), Error> {
        let group = if complex.has_repeated_fields() {
            "xsd:sequence"
        } else {
            "xsd:all"
        };

        self.start("xsd:complexType", &[("name", complex.schema_name())])?;

        if complex.fields.is_empty() {
            self.empty(group, &[])?;
        } else {
            self.start(group, &[])?;

            for field in &complex.fields {
                let ty = self.type_reference(&field.type_name)?;

                if field.repeated {
                    self.empty(
                        "xsd:element",
                        &[
                            ("name", field.name.as_str()),
                            ("type", ty.as_str()),
                            ("minOccurs", "0"),
                            ("maxOccurs", "unbounded"),
                        ],
                    )?;
                } else {
                    self.empty(
                        "xsd:element",
                        &[("name", field.name.as_str()), ("type", ty.as_str())],
                    )?;
                }
            }

            self.end(group)?;
        }

        self.end("xsd:complexType")
    }

    fn write_message_type<'p>(
        &mut self,
        name: &str,
        parts: impl Iterator<Item = (&'p str, &'p str, bool)>,
    ) -> Result<(), Error> {
        let reference = format!("tns:{}", name);
        self.empty("xsd:element", &[("name", name), ("type", reference.as_str())])?;

        let parts = parts
            .map(|(part, type_name, repeated)| {
                Ok((part, self.type_reference(type_name)?, max_occurs(repeated)))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        self.start("xsd:complexType", &[("name", name)])?;

        if parts.is_empty() {
            self.empty("xsd:sequence", &[])?;
        } else {
            self.start("xsd:sequence", &[])?;

            for (part, ty, occurs) in &parts {
                self.empty(
                    "xsd:element",
                    &[("name", *part), ("type", ty.as_str()), ("maxOccurs", *occurs)],
                )?;
            }

            self.end("xsd:sequence")?;
        }

        self.end("xsd:complexType")
    }

    fn write_messages(&mut self) -> Result<(), Error> {
        let contract = self.contract;

        let names = contract
            .operations()
            .iter()
            .map(|operation| operation.name.clone())
            .chain(
                contract
                    .operations()
                    .iter()
                    .map(|operation| response_name(&operation.name)),
            );

        for name in names {
            let element = format!("tns:{}", name);

            self.start("wsdl:message", &[("name", name.as_str())])?;
            self.empty(
                "wsdl:part",
                &[("element", element.as_str()), ("name", "parameters")],
            )?;
            self.end("wsdl:message")?;
        }

        Ok(())
    }

    fn write_port_type(&mut self) -> Result<(), Error> {
        let contract = self.contract;
        let name = format!("{}PortType", contract.service_name());

        self.start("wsdl:portType", &[("name", name.as_str())])?;

        for operation in contract.operations() {
            self.start("wsdl:operation", &[("name", operation.name.as_str())])?;
            self.text_element(
                "wsdl:documentation",
                &operation_documentation(contract, operation),
            )?;

            for (kind, message) in [
                ("wsdl:input", operation.name.clone()),
                ("wsdl:output", operation.response_name()),
            ] {
                let reference = format!("tns:{}", message);
                self.empty(
                    kind,
                    &[("message", reference.as_str()), ("name", message.as_str())],
                )?;
            }

            self.end("wsdl:operation")?;
        }

        self.end("wsdl:portType")
    }

    fn write_binding(&mut self) -> Result<(), Error> {
        let contract = self.contract;
        let name = format!("{}Binding", contract.service_name());
        let port_type = format!("tns:{}PortType", contract.service_name());

        self.start(
            "wsdl:binding",
            &[("name", name.as_str()), ("type", port_type.as_str())],
        )?;
        self.empty(
            "soap-env:binding",
            &[("style", "document"), ("transport", SCHEMA_SOAP_HTTP)],
        )?;

        for operation in contract.operations() {
            self.start("wsdl:operation", &[("name", operation.name.as_str())])?;

            for kind in ["wsdl:input", "wsdl:output"] {
                self.start(kind, &[])?;
                self.empty("soap-env:body", &[("use", "literal")])?;
                self.end(kind)?;
            }

            self.end("wsdl:operation")?;
        }

        self.end("wsdl:binding")
    }

    fn write_service(&mut self) -> Result<(), Error> {
        let contract = self.contract;
        let service = contract.service_name();
        let name = format!("{}Service", service);
        let port = format!("{}Port", service);
        let binding = format!("tns:{}Binding", service);

        self.start("wsdl:service", &[("name", name.as_str())])?;
        self.start(
            "wsdl:port",
            &[("name", port.as_str()), ("binding", binding.as_str())],
        )?;
        self.empty("soap-env:address", &[("location", contract.location())])?;
        self.end("wsdl:port")?;
        self.end("wsdl:service")
    }
}

/// Serializes a discovered contract as a WSDL 1.1 document.
pub fn build(contract: &Contract) -> Result<String, Error> {
    DocumentWriter::new(contract).write()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        discover::Discoverer,
        reflect::{ClassInfo, ClassRegistry, MethodInfo, PropertyInfo, ServiceClass},
    };

    fn calculator() -> Contract {
        let class = ServiceClass::new("Calculator")
            .method(MethodInfo::new("add").doc(
                "Add two numbers.\n@param float $a First term.\n@param float $b\n@return float The sum.",
            ))
            .method(MethodInfo::new("clear").doc("Forget everything.\n@return void"));

        Discoverer::new("http://localhost/calc")
            .discover(&class, &ClassRegistry::new())
            .unwrap()
    }

    #[test]
    fn document_layout() {
        let document = build(&calculator()).unwrap();

        let types = document.find("<wsdl:types>").unwrap();
        let messages = document.find("<wsdl:message name=\"add\">").unwrap();
        let responses = document.find("<wsdl:message name=\"addResponse\">").unwrap();
        let port_type = document.find("<wsdl:portType name=\"CalculatorPortType\">").unwrap();
        let binding = document.find("<wsdl:binding name=\"CalculatorBinding\"").unwrap();
        let service = document.find("<wsdl:service name=\"CalculatorService\">").unwrap();

        assert!(types < messages);
        assert!(messages < document.find("<wsdl:message name=\"clear\">").unwrap());
        assert!(document.find("<wsdl:message name=\"clear\">").unwrap() < responses);
        assert!(responses < port_type);
        assert!(port_type < binding);
        assert!(binding < service);

        assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(document.contains("targetNamespace=\"http://localhost/calc\""));
        assert!(document.contains("xmlns:soap-env=\"http://schemas.xmlsoap.org/wsdl/soap/\""));
        assert!(document.contains(
            "<soap-env:binding style=\"document\" transport=\"http://schemas.xmlsoap.org/soap/http\"/>"
        ));
        assert!(document.contains("<soap-env:address location=\"http://localhost/calc\"/>"));
        assert!(document.contains("<wsdl:port name=\"CalculatorPort\" binding=\"tns:CalculatorBinding\">"));
    }

    #[test]
    fn message_elements() {
        let document = build(&calculator()).unwrap();

        assert!(document.contains("<xsd:element name=\"add\" type=\"tns:add\"/>"));
        assert!(document.contains("<xsd:element name=\"a\" type=\"xsd:float\" maxOccurs=\"1\"/>"));
        assert!(document.contains(
            "<xsd:element name=\"return\" type=\"xsd:float\" maxOccurs=\"1\"/>"
        ));
        assert!(document.contains("<wsdl:part element=\"tns:addResponse\" name=\"parameters\"/>"));
        assert!(document.contains(
            "<wsdl:input message=\"tns:add\" name=\"add\"/>"
        ));
        assert!(document.contains("<xsd:complexType name=\"clearResponse\">\n        <xsd:sequence/>"));
    }

    #[test]
    fn documentation_trailer() {
        let contract = calculator();
        let add = contract.operation("add").unwrap();

        assert_eq!(
            operation_documentation(&contract, add),
            "\n\tAdd two numbers.\n\t@param float First term. [name=a]\n\t@param float  [name=b]\n\t@return float The sum."
        );

        let clear = contract.operation("clear").unwrap();
        assert_eq!(operation_documentation(&contract, clear), "\n\tForget everything.");
    }

    #[test]
    fn repeated_fields_use_sequence() {
        let registry = ClassRegistry::new()
            .with_class(
                ClassInfo::new("app.Team")
                    .property(PropertyInfo::new("members").doc("@var string[]")),
            )
            .with_class(
                ClassInfo::new("app.Point")
                    .property(PropertyInfo::new("x").doc("@var int"))
                    .property(PropertyInfo::new("y").doc("@var int")),
            );
        let class = ServiceClass::new("Svc")
            .method(MethodInfo::new("team").doc("@return app.Team"))
            .method(MethodInfo::new("origin").doc("@return app.Point[]"));

        let contract = Discoverer::new("urn:svc").discover(&class, &registry).unwrap();
        let document = build(&contract).unwrap();

        assert!(document.contains("<xsd:complexType name=\"Team\">\n        <xsd:sequence>"));
        assert!(document.contains(
            "<xsd:element name=\"members\" type=\"xsd:string\" minOccurs=\"0\" maxOccurs=\"unbounded\"/>"
        ));
        assert!(document.contains("<xsd:complexType name=\"Point\">\n        <xsd:all>"));
        assert!(document.contains(
            "<xsd:element name=\"return\" type=\"tns:Point\" maxOccurs=\"unbounded\"/>"
        ));
        assert!(!document.contains("name=\"mixed\""));
    }

    #[test]
    fn generated_document_parses() {
        let document = build(&calculator()).unwrap();
        let (definition, _) = crate::parse_str(&document).unwrap();

        let fields = definition.element_fields("add").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name.name, "a");
        assert!(definition.element_fields("clearResponse").unwrap().is_empty());
        assert_eq!(definition.location(), Some("http://localhost/calc"));
        assert_eq!(definition.operations().count(), 2);
    }

    #[test]
    fn rebuilds_are_identical() {
        let contract = calculator();
        assert_eq!(build(&contract).unwrap(), build(&contract).unwrap());
        assert_eq!(build(&contract).unwrap(), build(&calculator()).unwrap());
    }

    #[test]
    fn service_documentation_is_escaped() {
        let class = ServiceClass::new("Svc").doc("Adds <numbers> & more.");
        let contract = Discoverer::new("urn:svc")
            .discover(&class, &ClassRegistry::new())
            .unwrap();

        let document = build(&contract).unwrap();
        assert!(document.contains("<wsdl:documentation>Adds &lt;numbers&gt; &amp; more.</wsdl:documentation>"));
    }
}
