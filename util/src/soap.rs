use super::{
    error::ClientError,
    value::{Struct, Value},
    xml::{
        events::{BytesStart, BytesText, Event},
        write_fields, write_value, Node, ToXml, Writer,
    },
};

use bytes::Buf;
use lather_wsdl::{SOAP12_ENVELOPE, SOAP_ENVELOPE};
use reqwest::blocking::Client as Reqwest;
use std::{
    fmt,
    io::{Cursor, Read, Write},
};
use tracing::debug;
use url::Url;

pub struct Client {
    client: Reqwest,
    url: Url,
    namespace: String,
}

/// Envelope version of a message, told apart by the envelope namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoapVersion {
    #[default]
    Soap11,
    Soap12,
}

#[derive(Debug)]
pub struct Envelope<T> {
    version: SoapVersion,
    body: T,
}

/// A body element in the service namespace carrying named children.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub name: String,
    pub namespace: String,
    pub content: Struct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    Sender,
    Receiver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: String,
    pub reason: String,
}

impl Client {
    pub fn new(url: &str, namespace: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Reqwest::new(),
            url: Url::parse(url)?,
            namespace: namespace.into(),
        })
    }

    pub fn send<T: ToXml>(&self, request_envelope: &Envelope<T>) -> Result<Value, ClientError> {
        let response = self
            .client
            .post(self.url.clone())
            .body(request_envelope.to_request()?)
            .header(
                reqwest::header::CONTENT_TYPE,
                request_envelope.version().content_type(),
            )
            .send()?;

        debug!(url = %self.url, status = %response.status(), "received response");
        decode_response(response.bytes()?.reader())
    }

    /// Invokes a document/literal operation with named arguments.
    pub fn call(&self, operation: &str, arguments: Struct) -> Result<Value, ClientError> {
        let payload = Payload::new(operation, self.namespace.clone(), arguments);
        self.send(&Envelope::new(payload))
    }
}

/// Reads a response envelope into the content of its body element, or its fault.
pub fn decode_response<R: Read>(mut read: R) -> Result<Value, ClientError> {
    let mut bytes = Vec::new();
    read.read_to_end(&mut bytes)
        .map_err(|err| ClientError::XmlError(err.into()))?;

    let envelope = Node::parse(&bytes)?;
    let body = envelope
        .child("Body")
        .ok_or_else(|| ClientError::MalformedResponse("missing Body element".into()))?;
    let element = body
        .first_element()
        .ok_or_else(|| ClientError::MalformedResponse("empty Body element".into()))?;

    if element.name == "Fault" {
        return Err(ClientError::Fault(Fault::from_node(element)));
    }

    Ok(element.to_value())
}

impl SoapVersion {
    pub fn namespace(self) -> &'static str {
        match self {
            Self::Soap11 => SOAP_ENVELOPE,
            Self::Soap12 => SOAP12_ENVELOPE,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Soap11 => "text/xml; charset=utf-8",
            Self::Soap12 => "application/soap+xml; charset=utf-8",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            SOAP_ENVELOPE => Some(Self::Soap11),
            SOAP12_ENVELOPE => Some(Self::Soap12),
            _ => None,
        }
    }

    /// Version of a received envelope; anything unrecognised is answered as SOAP 1.1.
    pub fn of(envelope: &Node) -> Self {
        envelope
            .namespace()
            .and_then(Self::from_namespace)
            .unwrap_or_default()
    }

    pub fn detect(message: &[u8]) -> Self {
        Node::parse(message)
            .map(|envelope| Self::of(&envelope))
            .unwrap_or_default()
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Soap11 => "SOAP-ENV",
            Self::Soap12 => "env",
        }
    }
}

impl<T> Envelope<T> {
    pub fn new(body: T) -> Self {
        Self::with_version(body, SoapVersion::Soap11)
    }

    pub fn with_version(body: T, version: SoapVersion) -> Self {
        Self { version, body }
    }

    pub fn version(&self) -> SoapVersion {
        self.version
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn into_body(self) -> T {
        self.body
    }
}

impl<T: ToXml> Envelope<T> {
    pub fn to_request(&self) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        self.to_xml(&mut writer)?;
        Ok(writer.into_inner().into_inner())
    }
}

impl<T: ToXml> ToXml for Envelope<T> {
    fn to_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        let prefix = self.version.prefix();
        let declaration = format!("xmlns:{}", prefix);
        let envelope = BytesStart::owned_name(format!("{}:Envelope", prefix))
            .with_attributes([(declaration.as_str(), self.version.namespace())]);
        let body = BytesStart::owned_name(format!("{}:Body", prefix));

        writer.write_event(Event::Start(envelope.to_borrowed()))?;
        writer.write_event(Event::Start(body.to_borrowed()))?;
        self.body.to_body_xml(writer, self.version)?;
        writer.write_event(Event::End(body.to_end()))?;
        writer.write_event(Event::End(envelope.to_end()))?;
        Ok(())
    }
}

impl Payload {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, content: Struct) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            content,
        }
    }
}

impl ToXml for Payload {
    fn to_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        let name = format!("ns1:{}", self.name);
        let start = BytesStart::owned_name(name.as_bytes())
            .with_attributes([("xmlns:ns1", self.namespace.as_str())]);

        if self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start.to_borrowed()))?;
        write_fields(writer, &self.content)?;
        writer.write_event(Event::End(start.to_end()))?;
        Ok(())
    }
}

impl ToXml for Value {
    fn to_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        write_value(writer, "return", self)
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => f.write_str("Sender"),
            Self::Receiver => f.write_str("Receiver"),
        }
    }
}

impl Fault {
    pub fn new(code: FaultCode, reason: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            reason: reason.into(),
        }
    }

    /// Reads both the SOAP 1.1 (`faultcode`/`faultstring`) and 1.2 (`Code`/`Reason`) forms.
    fn from_node(node: &Node) -> Self {
        let code = node
            .child("faultcode")
            .map(|code| code.text.clone())
            .or_else(|| {
                node.child("Code")
                    .and_then(|code| code.child("Value"))
                    .map(|value| value.text.clone())
            })
            .unwrap_or_default();

        let reason = node
            .child("faultstring")
            .map(|reason| reason.text.clone())
            .or_else(|| {
                node.child("Reason")
                    .and_then(|reason| reason.child("Text"))
                    .map(|text| text.text.clone())
            })
            .unwrap_or_default();

        Self { code, reason }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason, self.code)
    }
}

impl ToXml for Fault {
    fn to_xml<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        self.to_body_xml(writer, SoapVersion::Soap11)
    }

    fn to_body_xml<W: Write>(
        &self,
        writer: &mut Writer<W>,
        version: SoapVersion,
    ) -> quick_xml::Result<()> {
        let prefix = version.prefix();
        let fault = BytesStart::owned_name(format!("{}:Fault", prefix));

        writer.write_event(Event::Start(fault.to_borrowed()))?;

        match version {
            SoapVersion::Soap11 => {
                write_text(writer, BytesStart::borrowed_name(b"faultcode"), &self.code)?;
                write_text(writer, BytesStart::borrowed_name(b"faultstring"), &self.reason)?;
            }

            SoapVersion::Soap12 => {
                let code = BytesStart::owned_name(format!("{}:Code", prefix));
                let value = if self.code.contains(':') {
                    self.code.clone()
                } else {
                    format!("{}:{}", prefix, self.code)
                };

                writer.write_event(Event::Start(code.to_borrowed()))?;
                write_text(writer, BytesStart::owned_name(format!("{}:Value", prefix)), &value)?;
                writer.write_event(Event::End(code.to_end()))?;

                let reason = BytesStart::owned_name(format!("{}:Reason", prefix));
                let text = BytesStart::owned_name(format!("{}:Text", prefix))
                    .with_attributes([("xml:lang", "en")]);

                writer.write_event(Event::Start(reason.to_borrowed()))?;
                write_text(writer, text, &self.reason)?;
                writer.write_event(Event::End(reason.to_end()))?;
            }
        }

        writer.write_event(Event::End(fault.to_end()))?;
        Ok(())
    }
}

fn write_text<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart,
    text: &str,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(start.to_borrowed()))?;
    writer.write_event(Event::Text(BytesText::from_plain_str(text)))?;
    writer.write_event(Event::End(start.to_end()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::{BufRead, BufReader},
        net::TcpListener,
        thread::{self, JoinHandle},
    };

    /// Answers a single HTTP request with `reply`, handing back the request's
    /// content type and body.
    fn serve_once(
        status: &'static str,
        reply: &'static str,
    ) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/calc", listener.local_addr().unwrap());

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_type = String::new();
            let mut length = 0;

            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }

                if let Some((name, value)) = line.split_once(':') {
                    match name.to_ascii_lowercase().as_str() {
                        "content-type" => content_type = value.trim().to_owned(),
                        "content-length" => length = value.trim().parse().unwrap(),
                        _ => {}
                    }
                }
            }

            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reply.len(),
                reply
            )
            .unwrap();

            (content_type, String::from_utf8(body).unwrap())
        });

        (url, server)
    }

    #[test]
    fn client_calls_operations() {
        let (url, server) = serve_once(
            "200 OK",
            r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body><ns1:addResponse xmlns:ns1="urn:calc"><return>5</return></ns1:addResponse></SOAP-ENV:Body></SOAP-ENV:Envelope>"#,
        );

        let client = Client::new(&url, "urn:calc").unwrap();
        let response = client
            .call("add", Struct::new().with("a", 2).with("b", 3))
            .unwrap()
            .into_struct()
            .unwrap();

        assert_eq!(response.get("return"), Some(&Value::String("5".into())));

        let (content_type, body) = server.join().unwrap();
        assert_eq!(content_type, "text/xml; charset=utf-8");
        assert!(body.contains("<ns1:add xmlns:ns1=\"urn:calc\">"));
        assert!(body.contains("<a>2</a>"));
        assert!(body.contains("<b>3</b>"));
    }

    #[test]
    fn client_reports_faults() {
        let (url, server) = serve_once(
            "500 Internal Server Error",
            r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"><env:Body><env:Fault><env:Code><env:Value>env:Receiver</env:Value></env:Code><env:Reason><env:Text xml:lang="en">Division by zero.</env:Text></env:Reason></env:Fault></env:Body></env:Envelope>"#,
        );

        let client = Client::new(&url, "urn:calc").unwrap();
        let payload = Payload::new("divide", "urn:calc", Struct::new().with("a", 1).with("b", 0));

        match client.send(&Envelope::with_version(payload, SoapVersion::Soap12)) {
            Err(ClientError::Fault(fault)) => assert_eq!(fault.reason, "Division by zero."),
            other => panic!("expected fault, got {:?}", other),
        }

        let (content_type, body) = server.join().unwrap();
        assert_eq!(content_type, "application/soap+xml; charset=utf-8");
        assert!(body.starts_with("<env:Envelope"));
    }

    #[test]
    fn payload_envelope() {
        let payload = Payload::new("addResponse", "urn:calc", Struct::new().with("return", 7.0));
        let request = String::from_utf8(Envelope::new(payload).to_request().unwrap()).unwrap();

        assert!(request.starts_with(
            "<SOAP-ENV:Envelope xmlns:SOAP-ENV=\"http://schemas.xmlsoap.org/soap/envelope/\">"
        ));
        assert!(request.contains("<ns1:addResponse xmlns:ns1=\"urn:calc\">"));
        assert!(request.contains("<return>7</return>"));
    }

    #[test]
    fn empty_payload_is_self_closing() {
        let payload = Payload::new("resetResponse", "urn:calc", Struct::new());
        let request = String::from_utf8(Envelope::new(payload).to_request().unwrap()).unwrap();

        assert!(request.contains("<ns1:resetResponse xmlns:ns1=\"urn:calc\"/>"));
    }

    #[test]
    fn decodes_result() {
        let response = br#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
            <SOAP-ENV:Body><ns1:addResponse xmlns:ns1="urn:calc"><return>7</return></ns1:addResponse></SOAP-ENV:Body>
        </SOAP-ENV:Envelope>"#;

        let value = decode_response(&response[..]).unwrap().into_struct().unwrap();
        assert_eq!(value.get("return"), Some(&Value::String("7".into())));
    }

    #[test]
    fn decodes_fault_in_both_versions() {
        let fault = Envelope::new(Fault::new(FaultCode::Receiver, "Division by zero."));
        let bytes = fault.to_request().unwrap();

        match decode_response(&bytes[..]) {
            Err(ClientError::Fault(fault)) => {
                assert_eq!(fault.code, "Receiver");
                assert_eq!(fault.reason, "Division by zero.");
            }
            other => panic!("expected fault, got {:?}", other),
        }

        let soap12 = br#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"><env:Body>
            <env:Fault><env:Code><env:Value>env:Sender</env:Value></env:Code>
            <env:Reason><env:Text xml:lang="en">Bad Request</env:Text></env:Reason></env:Fault>
        </env:Body></env:Envelope>"#;

        match decode_response(&soap12[..]) {
            Err(ClientError::Fault(fault)) => {
                assert_eq!(fault.code, "env:Sender");
                assert_eq!(fault.reason, "Bad Request");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn soap12_fault_uses_code_and_reason() {
        let fault = Envelope::with_version(
            Fault::new(FaultCode::Receiver, "Division by zero."),
            SoapVersion::Soap12,
        );
        let text = String::from_utf8(fault.to_request().unwrap()).unwrap();

        assert!(text.starts_with(
            "<env:Envelope xmlns:env=\"http://www.w3.org/2003/05/soap-envelope\">"
        ));
        assert!(text.contains("<env:Value>env:Receiver</env:Value>"));
        assert!(text.contains("<env:Text xml:lang=\"en\">Division by zero.</env:Text>"));
        assert!(!text.contains("faultcode"));

        match decode_response(text.as_bytes()) {
            Err(ClientError::Fault(fault)) => {
                assert_eq!(fault.code, "env:Receiver");
                assert_eq!(fault.reason, "Division by zero.");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn version_follows_envelope_namespace() {
        let soap12 = br#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body/></s:Envelope>"#;
        let soap11 = br#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body/></s:Envelope>"#;

        assert_eq!(SoapVersion::detect(soap12), SoapVersion::Soap12);
        assert_eq!(SoapVersion::detect(soap11), SoapVersion::Soap11);
        assert_eq!(SoapVersion::detect(b"<broken"), SoapVersion::Soap11);
        assert_eq!(
            SoapVersion::Soap12.content_type(),
            "application/soap+xml; charset=utf-8"
        );
    }

    #[test]
    fn missing_body_is_malformed() {
        let response = b"<Envelope><Header/></Envelope>";
        assert!(matches!(
            decode_response(&response[..]),
            Err(ClientError::MalformedResponse(_))
        ));
    }
}
