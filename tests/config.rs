use lather::{
    http::Request,
    util::{error::ClientError, soap::decode_response},
    wsdl::reflect::{ClassInfo, ClassRegistry, PropertyInfo},
    Format, ServiceConfig, SoapService,
};
use std::fs;
use tracing_test::traced_test;

pub struct Thermometer;

#[lather::service(name = "lab.Thermometer")]
impl Thermometer {
    /// Converts a temperature.
    /// @param float $celsius
    /// @return Reading
    pub fn fahrenheit(&self, celsius: f64) -> lather::util::Struct {
        lather::util::Struct::new()
            .with("unit", "F")
            .with("value", celsius * 9.0 / 5.0 + 32.0)
    }
}

fn reading() -> ClassInfo {
    ClassInfo::new("lab.units.Measurement")
        .property(PropertyInfo::new("unit").doc("@var string"))
        .property(PropertyInfo::new("value").doc("@var float"))
}

fn config(schema_dir: &std::path::Path) -> ServiceConfig {
    let mut config = ServiceConfig::from_toml(
        r#"
        location = "http://localhost/lab/thermometer"
        namespace = "urn:lab"
        name = "Lab Thermometer"

        [class_map]
        Reading = "lab.units.Measurement"
        "#,
    )
    .unwrap();

    config.schema_dir = Some(schema_dir.to_owned());
    config
}

fn service(config: &ServiceConfig) -> SoapService {
    let mut service = SoapService::from_config(Thermometer, config).unwrap();
    service.set_loader(ClassRegistry::new().with_class(reading()));
    service
}

fn call() -> Request {
    Request::new("").content_type("application/soap+xml").body(
        r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="urn:lab"><soap:Body><ns1:fahrenheit><celsius>100</celsius></ns1:fahrenheit></soap:Body></soap:Envelope>"#,
    )
}

#[test]
fn configuration_reaches_the_description() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&config(dir.path()));
    let description = service.description();

    assert_eq!(description.location(), "http://localhost/lab/thermometer");
    assert_eq!(description.namespace(), "urn:lab");

    let document = description.dump(Format::Wsdl).unwrap();
    assert!(document.contains("targetNamespace=\"urn:lab\""));
    assert!(document.contains("<xsd:complexType name=\"Measurement\">"));

    let page = description.dump(Format::Html).unwrap();
    assert!(page.contains("Lab Thermometer SOAP Service"));
}

#[test]
#[traced_test]
fn schema_file_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let path = dir.path().join("thermometer.wsdl");

    let mut responses = Vec::new();
    service(&config).process(&call(), &mut responses).unwrap();

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("<wsdl:service name=\"ThermometerService\">"));
    assert!(logs_contain("saved service description"));

    service(&config).process(&call(), &mut responses).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), saved);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

    for response in &responses {
        assert!(response.text().contains("<value>212</value>"));
        assert!(response.text().contains("<unit>F</unit>"));
    }
}

#[test]
fn existing_schema_files_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let path = dir.path().join("thermometer.wsdl");

    let document = service(&config).description().dump(Format::Wsdl).unwrap();
    fs::write(&path, document.replace("fahrenheit", "kelvin")).unwrap();

    let mut responses = Vec::new();
    service(&config).process(&call(), &mut responses).unwrap();

    match decode_response(&responses[0].body[..]) {
        Err(ClientError::Fault(fault)) => {
            assert_eq!(fault.reason, "Procedure 'fahrenheit' not present")
        }
        other => panic!("expected fault, got {:?}", other),
    }
}

#[test]
fn detection_can_be_disabled_in_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.request = false;

    let mut responses = Vec::new();
    service(&config)
        .process(
            &Request {
                query: "wsdl".to_owned(),
                ..call()
            },
            &mut responses,
        )
        .unwrap();

    assert!(responses[0].text().contains("<value>212</value>"));
}
