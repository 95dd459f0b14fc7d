use lather_util::{
    error::ServerError, FaultCode, ServerOptions, SoapServer, SoapVersion, Style, Use,
    WrappedHandler,
};
use lather_wsdl::{
    reflect::{ClassLoader, ServiceClass, SoapClass},
    types::{Definition, Namespaces},
};
use once_cell::unsync::OnceCell;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, error};

use crate::{
    config::ServiceConfig,
    description::{Generator, ServiceDescription},
    error::Error,
    format::Format,
    http::{Peer, Request, Response},
    request::{SoapRequest, Target},
    wrapper::{DocumentLiteral, Unwrapped},
};

/// Serves documentation, the WSDL document and SOAP calls for one handler.
pub struct SoapService {
    description: ServiceDescription,
    handler: Option<Arc<dyn WrappedHandler>>,
    schema_dir: Option<PathBuf>,
    wrapper: bool,
    request: bool,
    default_target: Target,
    definition: OnceCell<(Definition, Namespaces)>,
}

impl SoapService {
    pub fn new(class: ServiceClass, location: &str) -> Result<Self, Error> {
        Ok(Self {
            description: ServiceDescription::new(class, location)?,
            handler: None,
            schema_dir: None,
            wrapper: true,
            request: true,
            default_target: Target::Docs,
            definition: OnceCell::new(),
        })
    }

    pub fn from_handler<H>(handler: H, location: &str) -> Result<Self, Error>
    where
        H: SoapClass + WrappedHandler + 'static,
    {
        let mut service = Self::new(H::service_class(), location)?;
        service.set_handler(handler);
        Ok(service)
    }

    pub fn from_config<H>(handler: H, config: &ServiceConfig) -> Result<Self, Error>
    where
        H: SoapClass + WrappedHandler + 'static,
    {
        let mut service = Self::from_handler(handler, &config.location())?;

        let description = service.description_mut();
        if let Some(namespace) = &config.namespace {
            description.set_namespace(namespace.clone());
        }
        if let Some(name) = &config.name {
            description.set_name(name.clone());
        }
        description.set_class_path(config.class_path.clone());
        description.set_class_map(config.class_map.clone());

        service.schema_dir = config.schema_dir.clone();
        service.wrapper = config.wrapper;
        service.request = config.request;

        Ok(service)
    }

    pub fn set_handler(&mut self, handler: impl WrappedHandler + 'static) {
        self.handler = Some(Arc::new(handler));
    }

    pub fn set_loader(&mut self, loader: impl ClassLoader + 'static) {
        self.description.set_loader(loader);
    }

    /// Directory where the WSDL document is saved before the first SOAP call.
    pub fn set_schema_directory(&mut self, dir: impl Into<PathBuf>) {
        self.schema_dir = Some(dir.into());
    }

    pub fn set_wrapper(&mut self, wrapper: bool) {
        self.wrapper = wrapper;
    }

    /// When disabled every request is handled as a SOAP call.
    pub fn set_request_detection(&mut self, enabled: bool) {
        self.request = enabled;
    }

    pub fn set_default_target(&mut self, target: Target) {
        self.default_target = target;
    }

    pub fn description(&self) -> &ServiceDescription {
        &self.description
    }

    pub fn description_mut(&mut self) -> &mut ServiceDescription {
        &mut self.description
    }

    pub fn send_description(&self, peer: &mut dyn Peer) -> Result<(), Error> {
        self.description.send(Format::Xml, peer)
    }

    pub fn send_documentation(&self, format: Format, peer: &mut dyn Peer) -> Result<(), Error> {
        self.description.send(format, peer)
    }

    pub fn process(&self, request: &Request, peer: &mut dyn Peer) -> Result<(), Error> {
        if self.request {
            SoapRequest::detect(request, self.default_target).process(self, request, peer)
        } else {
            self.handle_request(&request.body, peer)
        }
    }

    /// Runs one SOAP call. A failing handler is answered with a `Receiver` fault and its
    /// error is returned afterwards.
    pub fn handle_request(&self, body: &[u8], peer: &mut dyn Peer) -> Result<(), Error> {
        let handler = self.handler.clone().ok_or(Error::NoHandler)?;
        let generator = self.description.generator()?;
        let uri = self.document_uri()?;

        let options = ServerOptions {
            uri: Some(uri.clone()),
            location: Some(self.description.location().to_owned()),
            style: Style::Document,
            encoding: Use::Literal,
            class_map: generator.class_map().clone(),
            cache_wsdl: self.schema_dir.is_some(),
        };

        let (definition, namespaces) = if options.cache_wsdl {
            self.definition
                .get_or_try_init(|| self.load_definition(&uri, generator))?
                .clone()
        } else {
            self.load_definition(&uri, generator)?
        };

        let mut server = SoapServer::new(definition, namespaces, options);
        if self.wrapper {
            server.set_object(Box::new(DocumentLiteral::new(handler, generator.contract())));
        } else {
            server.set_object(Box::new(Unwrapped::new(handler)));
        }

        let version = SoapVersion::detect(body);
        debug!(%uri, wrapper = self.wrapper, ?version, "handling SOAP request");

        match server.handle(body) {
            Ok(response) => {
                peer.send(Response::soap(version, response))?;
                Ok(())
            }
            Err(ServerError::Handler(err)) => {
                error!(error = %err, "SOAP handler failed");

                let fault = server.fault(version, FaultCode::Receiver, &err.to_string())?;
                peer.send(Response::soap(version, fault).status(500))?;
                Err(Error::Handler(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The explicit service document, else the saved schema file, else `{location}?wsdl`.
    fn document_uri(&self) -> Result<String, Error> {
        if let Some(document) = self.description.service_document() {
            return Ok(document.to_owned());
        }

        if let Some(path) = self.schema_path() {
            if !path.exists() {
                self.description.save(&path, Format::Wsdl)?;
            }

            if path.exists() {
                return Ok(path.to_string_lossy().into_owned());
            }
        }

        Ok(self.self_uri())
    }

    fn schema_path(&self) -> Option<PathBuf> {
        let file_name = format!("{}.wsdl", self.description.class().short_name().to_lowercase());
        self.schema_dir.as_deref().map(|dir| dir.join(file_name))
    }

    fn self_uri(&self) -> String {
        format!("{}?wsdl", self.description.location())
    }

    fn load_definition(
        &self,
        uri: &str,
        generator: &Generator,
    ) -> Result<(Definition, Namespaces), Error> {
        let parsed = if uri == self.self_uri() {
            lather_wsdl::parse_str(generator.document())?
        } else {
            lather_wsdl::parse(uri)?
        };

        Ok(parsed)
    }
}
