//! Host-agnostic request and response types, and a CGI binding for them.

use lather_util::SoapVersion;
use std::{
    env,
    io::{self, Read, Write},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub query: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Receives the responses produced while processing a request.
pub trait Peer {
    fn send(&mut self, response: Response) -> io::Result<()>;
}

/// Writes CGI responses: a `Status` and `Content-Type` header block, then the body.
pub struct CgiPeer<W> {
    out: W,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Reads `QUERY_STRING`, `CONTENT_TYPE` and `CONTENT_LENGTH` bytes of `input`.
    pub fn from_cgi<R: Read>(input: R) -> io::Result<Self> {
        let length = env::var("CONTENT_LENGTH")
            .ok()
            .and_then(|length| length.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let mut body = Vec::new();
        input.take(length).read_to_end(&mut body)?;

        Ok(Self {
            query: env::var("QUERY_STRING").unwrap_or_default(),
            content_type: env::var("CONTENT_TYPE").ok().filter(|value| !value.is_empty()),
            body,
        })
    }

    /// Query parameters followed by urlencoded form fields.
    pub fn parameters(&self) -> Vec<(String, String)> {
        let mut parameters: Vec<(String, String)> =
            url::form_urlencoded::parse(self.query.as_bytes())
                .into_owned()
                .collect();

        let is_form = self.content_type.as_deref().map_or(false, |content_type| {
            content_type.starts_with("application/x-www-form-urlencoded")
        });

        if is_form {
            parameters.extend(url::form_urlencoded::parse(&self.body).into_owned());
        }

        parameters
    }
}

impl Response {
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn soap(version: SoapVersion, body: Vec<u8>) -> Self {
        Self::new(version.content_type(), body)
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Peer for Vec<Response> {
    fn send(&mut self, response: Response) -> io::Result<()> {
        self.push(response);
        Ok(())
    }
}

impl<W: Write> CgiPeer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => "",
    }
}

impl<W: Write> Peer for CgiPeer<W> {
    fn send(&mut self, response: Response) -> io::Result<()> {
        write!(
            self.out,
            "Status: {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            response.status,
            reason(response.status),
            response.content_type,
            response.body.len()
        )?;
        self.out.write_all(&response.body)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_fields_follow_query() {
        let request = Request::new("docs=text")
            .content_type("application/x-www-form-urlencoded")
            .body("target=wsdl&x=a%20b");

        assert_eq!(
            request.parameters(),
            [
                ("docs".to_owned(), "text".to_owned()),
                ("target".to_owned(), "wsdl".to_owned()),
                ("x".to_owned(), "a b".to_owned()),
            ]
        );
    }

    #[test]
    fn xml_bodies_are_not_form_fields() {
        let request = Request::new("wsdl")
            .content_type("text/xml")
            .body("<a>target=soap</a>");

        assert_eq!(request.parameters(), [("wsdl".to_owned(), String::new())]);
    }

    #[test]
    fn cgi_output() {
        let mut peer = CgiPeer::new(Vec::new());
        peer.send(Response::new("text/plain", "hi").status(500)).unwrap();

        assert_eq!(
            String::from_utf8(peer.into_inner()).unwrap(),
            "Status: 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nhi"
        );
    }
}
