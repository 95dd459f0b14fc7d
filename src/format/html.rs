use lather_wsdl::contract::{Contract, Operation};

use crate::{description::Generator, markup::Markup, sample::MessageSamples};

const STYLESHEET: &str = "https://www.w3schools.com/w3css/4/w3.css";
const PANEL: &str = "w3-panel w3-padding w3-border w3-border-blue w3-round";

fn type_label(contract: &Contract, type_name: &str, repeated: bool) -> (String, Option<String>) {
    let catalog = contract.catalog();
    let mut label = catalog.schema_name(type_name).to_owned();
    let anchor = catalog
        .complex_type(type_name)
        .map(|complex| format!("#type-{}", complex.schema_name()));

    if repeated {
        label.push_str("[]");
    }

    (label, anchor)
}

fn type_reference(
    markup: &mut Markup,
    contract: &Contract,
    type_name: &str,
    repeated: bool,
    class: &str,
) -> quick_xml::Result<()> {
    match type_label(contract, type_name, repeated) {
        (label, Some(anchor)) => {
            markup.element("a", &[("href", anchor.as_str()), ("class", class)], &label)
        }
        (label, None) => markup.element("span", &[("class", class)], &label),
    }
}

fn signature(
    markup: &mut Markup,
    contract: &Contract,
    operation: &Operation,
) -> quick_xml::Result<()> {
    match &operation.output {
        Some(output) => type_reference(
            markup,
            contract,
            &output.type_name,
            output.repeated,
            "method-return",
        )?,
        None => markup.element("span", &[("class", "method-return")], "void")?,
    }

    markup.element(
        "span",
        &[("class", "method-name"), ("style", "margin-left: 10px")],
        &operation.name,
    )?;
    markup.element("span", &[("class", "method-params")], "(")?;

    if operation.input.is_empty() {
        markup.element("span", &[("class", "method-param-type")], "void")?;
    }

    for (index, param) in operation.input.iter().enumerate() {
        if index > 0 {
            markup.element("span", &[], ", ")?;
        }

        type_reference(
            markup,
            contract,
            &param.type_name,
            param.repeated,
            "method-param-type",
        )?;
        markup.element(
            "span",
            &[("class", "method-param-name"), ("style", "margin-left: 5px")],
            &param.name,
        )?;
    }

    markup.element("span", &[("class", "method-params")], ")")
}

fn method(
    markup: &mut Markup,
    contract: &Contract,
    operation: &Operation,
) -> quick_xml::Result<()> {
    let samples = MessageSamples::new(contract);
    let id = format!("method-{}", operation.name);

    markup.start("div", &[("class", PANEL), ("id", id.as_str())])?;
    markup.element("h4", &[], "Method:")?;
    signature(markup, contract, operation)?;

    if !operation.documentation.is_empty() {
        markup.element("div", &[], &operation.documentation)?;
    }

    if !operation.input.is_empty() {
        markup.element("h4", &[], "Parameters:")?;
        markup.start("dl", &[])?;
        for param in &operation.input {
            markup.element("dt", &[], &param.name)?;
            markup.element("dd", &[], &param.docs)?;
        }
        markup.end("dl")?;
    }

    if let Some(output) = operation.output.as_ref().filter(|output| !output.docs.is_empty()) {
        markup.element("h4", &[], "Return:")?;
        markup.element("p", &[], &output.docs)?;
    }

    markup.element("h4", &[], "Message:")?;
    markup.element("pre", &[("class", "w3-code")], &samples.message(operation)?)?;
    markup.element("h4", &[], "Response:")?;
    markup.element("pre", &[("class", "w3-code")], &samples.response(operation)?)?;

    markup.end("div")
}

pub fn render(generator: &Generator, title: &str) -> quick_xml::Result<String> {
    let contract = generator.contract();
    let samples = MessageSamples::new(contract);
    let mut markup = Markup::new();

    markup.start("html", &[])?;
    markup.start("head", &[])?;
    markup.element("title", &[], &format!("SOAP service - {}", title))?;
    markup.empty("link", &[("rel", "stylesheet"), ("href", STYLESHEET)])?;
    markup.end("head")?;

    markup.start("body", &[])?;
    markup.element("h1", &[("class", "w3-center")], &format!("{} SOAP Service", title))?;

    if let Some(documentation) = contract.documentation() {
        markup.element("p", &[("class", "w3-container")], documentation)?;
    }

    markup.start("div", &[("class", "w3-container w3-right w3-padding")])?;
    markup.element(
        "a",
        &[("href", "?docs=syntax"), ("class", "w3-btn w3-blue-grey")],
        "WSDL",
    )?;
    markup.end("div")?;

    markup.element("h2", &[], "Methods")?;
    markup.start("div", &[])?;
    for operation in contract.operations() {
        method(&mut markup, contract, operation)?;
    }
    markup.end("div")?;

    markup.element("h2", &[], "Types")?;
    markup.start("div", &[])?;
    for complex in contract.complex_types() {
        let id = format!("type-{}", complex.schema_name());

        markup.start("div", &[("class", PANEL), ("id", id.as_str())])?;
        markup.element("h4", &[], complex.schema_name())?;
        if let Some(doc) = &complex.doc {
            markup.element("div", &[], &lather_wsdl::comment::summary(doc))?;
        }
        markup.element("pre", &[("class", "w3-code")], &samples.complex_type(complex)?)?;
        markup.end("div")?;
    }
    markup.end("div")?;

    markup.end("body")?;
    markup.end("html")?;
    markup.finish()
}
