//! Example SOAP messages for the documentation pages.
//!
//! Scalars are rendered as their schema type name. Structured types expand into their
//! fields; a type already being expanded further up renders as an empty element.

use lather_wsdl::{
    contract::{ComplexType, Contract, Operation},
    SOAP12_ENVELOPE,
};

use crate::markup::Markup;

const SOAP12_ENCODING: &str = "http://www.w3.org/2003/05/soap-encoding";

pub struct MessageSamples<'a> {
    contract: &'a Contract,
}

impl<'a> MessageSamples<'a> {
    pub fn new(contract: &'a Contract) -> Self {
        Self { contract }
    }

    /// Request envelope for an operation.
    pub fn message(&self, operation: &Operation) -> quick_xml::Result<String> {
        let mut markup = self.envelope()?;

        markup.start(&operation.name, &[])?;
        for param in &operation.input {
            self.parameter(&mut markup, &param.name, &param.type_name, &mut Vec::new())?;
        }
        markup.end(&operation.name)?;

        self.close(markup)
    }

    /// Response envelope for an operation.
    pub fn response(&self, operation: &Operation) -> quick_xml::Result<String> {
        let mut markup = self.envelope()?;
        let name = operation.response_name();

        markup.start(&name, &[])?;
        match &operation.output {
            Some(output) => {
                self.parameter(&mut markup, "return", &output.type_name, &mut Vec::new())?
            }
            None => markup.empty("return", &[])?,
        }
        markup.end(&name)?;

        self.close(markup)
    }

    /// Serialized form of a structured type.
    pub fn complex_type(&self, complex: &'a ComplexType) -> quick_xml::Result<String> {
        let mut markup = Markup::new();
        let mut path = vec![complex.name.as_str()];

        self.fields(&mut markup, complex.schema_name(), complex, &mut path)?;
        markup.finish()
    }

    fn envelope(&self) -> quick_xml::Result<Markup> {
        let mut markup = Markup::new();

        markup.declaration()?;
        markup.start(
            "soap:envelope",
            &[
                ("xmlns:soap", SOAP12_ENVELOPE),
                ("soap:encodingStyle", SOAP12_ENCODING),
            ],
        )?;
        markup.start("soap:body", &[("xmlns", self.contract.namespace())])?;

        Ok(markup)
    }

    fn close(&self, mut markup: Markup) -> quick_xml::Result<String> {
        markup.end("soap:body")?;
        markup.end("soap:envelope")?;
        markup.finish()
    }

    fn parameter(
        &self,
        markup: &mut Markup,
        name: &str,
        type_name: &str,
        path: &mut Vec<&'a str>,
    ) -> quick_xml::Result<()> {
        let catalog = self.contract.catalog();

        let complex = match catalog.complex_type(type_name) {
            Some(complex) => complex,
            None => return markup.element(name, &[], catalog.schema_name(type_name)),
        };

        if path.contains(&complex.name.as_str()) {
            return markup.empty(name, &[]);
        }

        path.push(&complex.name);
        self.fields(markup, name, complex, path)?;
        path.pop();

        Ok(())
    }

    fn fields(
        &self,
        markup: &mut Markup,
        name: &str,
        complex: &'a ComplexType,
        path: &mut Vec<&'a str>,
    ) -> quick_xml::Result<()> {
        if complex.fields.is_empty() {
            return markup.empty(name, &[]);
        }

        markup.start(name, &[])?;
        for field in &complex.fields {
            self.parameter(markup, &field.name, &field.type_name, path)?;
        }
        markup.end(name)
    }
}
