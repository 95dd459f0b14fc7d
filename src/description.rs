use lather_wsdl::{
    reflect::{ClassLoader, ClassRegistry, ServiceClass},
    ClassMap, Contract, Discoverer,
};
use once_cell::unsync::OnceCell;
use std::{
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::Error,
    format::Format,
    http::{Peer, Response},
    sample::MessageSamples,
};

/// A discovered contract together with its WSDL document.
#[derive(Debug)]
pub struct Generator {
    contract: Contract,
    document: String,
}

impl Generator {
    pub fn new(
        discoverer: &Discoverer,
        class: &ServiceClass,
        loader: &dyn ClassLoader,
    ) -> Result<Self, Error> {
        let contract = discoverer.discover(class, loader)?;
        let document = lather_wsdl::build(&contract)?;

        debug!(
            service = contract.service_name(),
            operations = contract.operations().len(),
            types = contract.complex_types().len(),
            "generated service description"
        );

        Ok(Self { contract, document })
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn service_name(&self) -> &str {
        self.contract.service_name()
    }

    /// Caller aliases plus every structured type resolved during discovery.
    pub fn class_map(&self) -> &ClassMap {
        self.contract.class_map()
    }

    pub fn samples(&self) -> MessageSamples<'_> {
        MessageSamples::new(&self.contract)
    }
}

/// Identity of a service and its lazily generated description.
pub struct ServiceDescription {
    class: ServiceClass,
    loader: Box<dyn ClassLoader>,
    location: Url,
    namespace: Option<String>,
    name: Option<String>,
    document: Option<String>,
    class_path: Vec<String>,
    class_map: ClassMap,
    generator: OnceCell<Generator>,
}

impl ServiceDescription {
    pub fn new(class: ServiceClass, location: &str) -> Result<Self, Error> {
        Ok(Self {
            class,
            loader: Box::new(ClassRegistry::new()),
            location: Url::parse(location)?,
            namespace: None,
            name: None,
            document: None,
            class_path: Vec::new(),
            class_map: ClassMap::new(),
            generator: OnceCell::new(),
        })
    }

    pub fn class(&self) -> &ServiceClass {
        &self.class
    }

    pub fn set_loader(&mut self, loader: impl ClassLoader + 'static) {
        self.loader = Box::new(loader);
    }

    pub fn location(&self) -> &str {
        self.location.as_str()
    }

    pub fn set_location(&mut self, location: &str) -> Result<(), Error> {
        self.location = Url::parse(location)?;
        Ok(())
    }

    /// Target namespace, defaulting to the location.
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_else(|| self.location())
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = Some(namespace.into());
    }

    /// Title of the documentation pages, defaulting to the service name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn service_document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn set_service_document(&mut self, document: impl Into<String>) {
        self.document = Some(document.into());
    }

    pub fn class_path(&self) -> &[String] {
        &self.class_path
    }

    pub fn add_class_path(&mut self, path: impl Into<String>) {
        self.class_path.push(path.into());
    }

    pub fn set_class_path(&mut self, paths: Vec<String>) {
        self.class_path = paths;
    }

    pub fn add_class_map(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.class_map.insert(alias.into(), target.into());
    }

    pub fn set_class_map(&mut self, class_map: ClassMap) {
        self.class_map = class_map;
    }

    /// Discovers the contract and builds the WSDL document on first use.
    pub fn generator(&self) -> Result<&Generator, Error> {
        self.generator.get_or_try_init(|| {
            let discoverer = Discoverer::new(self.location())
                .namespace(self.namespace())
                .class_path(self.class_path.clone())
                .class_map(self.class_map.clone());

            Generator::new(&discoverer, &self.class, self.loader.as_ref())
        })
    }

    pub fn dump(&self, format: Format) -> Result<String, Error> {
        let generator = self.generator()?;
        let title = self.name().unwrap_or_else(|| generator.service_name());

        Ok(format.render(generator, title)?)
    }

    pub fn send(&self, format: Format, peer: &mut dyn Peer) -> Result<(), Error> {
        let body = self.dump(format)?;
        peer.send(Response::new(format.content_type(), body))?;
        Ok(())
    }

    /// Writes the description to `path` unless the file exists.
    ///
    /// The content goes to a temporary file in the same directory which is then
    /// persisted without replacing anything. Losing that race counts as success.
    pub fn save(&self, path: impl AsRef<Path>, format: Format) -> Result<(), Error> {
        let path = path.as_ref();
        let content = self.dump(format)?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut file =
            NamedTempFile::new_in(dir).map_err(|err| Error::Save(path.to_owned(), err))?;
        file.write_all(content.as_bytes())
            .map_err(|err| Error::Save(path.to_owned(), err))?;

        match file.persist_noclobber(path) {
            Ok(_) => {
                info!(path = %path.display(), %format, "saved service description");
                Ok(())
            }
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "service description already saved");
                Ok(())
            }
            Err(err) => Err(Error::Save(path.to_owned(), err.error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lather_wsdl::reflect::MethodInfo;
    use std::fs;

    fn description() -> ServiceDescription {
        let class = ServiceClass::new("app.Calculator")
            .method(MethodInfo::new("add").doc("Add.\n@param float $a\n@param float $b\n@return float"));

        ServiceDescription::new(class, "http://localhost/calc").unwrap()
    }

    #[test]
    fn rejects_invalid_locations() {
        assert!(matches!(
            ServiceDescription::new(ServiceClass::new("A"), "not a url"),
            Err(Error::Location(_))
        ));
    }

    #[test]
    fn generator_is_built_once() {
        let description = description();
        let first = description.generator().unwrap() as *const Generator;
        let second = description.generator().unwrap() as *const Generator;

        assert_eq!(first, second);
        assert_eq!(description.namespace(), "http://localhost/calc");
    }

    #[test]
    fn save_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calculator.wsdl");
        let description = description();

        description.save(&path, Format::Wsdl).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("CalculatorService"));

        fs::write(&path, "kept").unwrap();
        description.save(&path, Format::Wsdl).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn send_uses_format_content_type() {
        let description = description();
        let mut responses = Vec::new();

        description.send(Format::Xml, &mut responses).unwrap();
        description.send(Format::Html, &mut responses).unwrap();

        assert_eq!(responses[0].content_type, "application/wsdl+xml");
        assert!(responses[0].text().starts_with("<?xml"));
        assert!(responses[1].text().contains("<h1 class=\"w3-center\">Calculator SOAP Service</h1>"));
    }
}
