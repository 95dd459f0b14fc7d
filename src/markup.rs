use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::io::Cursor;

/// Indented element writer shared by the documentation pages and message samples.
pub(crate) struct Markup {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl Markup {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    pub fn declaration(&mut self) -> quick_xml::Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new(b"1.0", Some(b"utf-8"), None)))?;
        Ok(())
    }

    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> quick_xml::Result<()> {
        let start = BytesStart::borrowed_name(name.as_bytes())
            .with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> quick_xml::Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::borrowed(name.as_bytes())))?;
        Ok(())
    }

    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> quick_xml::Result<()> {
        let start = BytesStart::borrowed_name(name.as_bytes())
            .with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    /// Element with escaped text content, kept on one line.
    pub fn element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> quick_xml::Result<()> {
        self.start(name, attributes)?;
        self.writer
            .write_event(Event::Text(BytesText::from_plain_str(text)))?;
        self.end(name)
    }

    pub fn finish(self) -> quick_xml::Result<String> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|err| quick_xml::Error::Utf8(err.utf8_error()))
    }
}
