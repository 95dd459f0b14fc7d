use crate::{description::Generator, markup::Markup};

const STYLESHEET: &str = "https://www.w3schools.com/w3css/4/w3.css";
const HIGHLIGHT_STYLE: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/9.12.0/styles/solarized-dark.min.css";
const HIGHLIGHT_SCRIPT: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/9.12.0/highlight.min.js";

/// The WSDL document as escaped text, optionally marked up for highlight.js.
pub fn render(generator: &Generator, title: &str, highlight: bool) -> quick_xml::Result<String> {
    let mut markup = Markup::new();

    markup.start("html", &[])?;
    markup.start("head", &[])?;
    markup.element("title", &[], &format!("SOAP service - {}", title))?;
    markup.empty("link", &[("rel", "stylesheet"), ("href", STYLESHEET)])?;
    if highlight {
        markup.empty("link", &[("rel", "stylesheet"), ("href", HIGHLIGHT_STYLE)])?;
    }
    markup.end("head")?;

    markup.start("body", &[])?;

    if highlight {
        markup.element("h1", &[("class", "w3-center")], &format!("{} SOAP Service", title))?;
        markup.start("div", &[])?;
        markup.start("pre", &[])?;
        markup.element("code", &[("class", "xml")], generator.document())?;
        markup.end("pre")?;
        markup.end("div")?;
        markup.element("script", &[("src", HIGHLIGHT_SCRIPT)], "")?;
        markup.element("script", &[], "hljs.initHighlightingOnLoad()")?;
    } else {
        markup.start("div", &[("class", "w3-panel w3-card w3-light-grey")])?;
        markup.element("h3", &[], &format!("{} SOAP Service", title))?;
        markup.start("div", &[("class", "w3-code")])?;
        markup.element("pre", &[], generator.document())?;
        markup.end("div")?;
        markup.end("div")?;
    }

    markup.end("body")?;
    markup.end("html")?;
    markup.finish()
}
