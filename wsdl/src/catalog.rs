//! Type name resolution.
//!
//! Primitive names map to XML Schema types through a fixed table. Structured names are
//! resolved to a [`ClassInfo`] through the class map, the class path and finally a
//! [`ClassLoader`], and registered in the target namespace once discovered.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{
    contract::{ComplexType, Field, TypeDescriptor},
    error::Error,
    reflect::{is_qualified, short_name, ClassInfo, ClassLoader},
    XML_SCHEMA,
};

/// Alias or short type name to fully-qualified type name.
pub type ClassMap = BTreeMap<String, String>;

const BASE_TYPES: [(&str, &str); 9] = [
    ("int", "int"),
    ("integer", "int"),
    ("float", "float"),
    ("double", "double"),
    ("string", "string"),
    ("boolean", "boolean"),
    ("bool", "boolean"),
    ("any", "any"),
    ("unknown_type", "any"),
];

#[derive(Debug, Clone)]
pub struct TypeCatalog {
    namespace: String,
    types: HashMap<String, TypeDescriptor>,
    aliases: HashMap<String, String>,
    complex_types: Vec<ComplexType>,
    mixed: ComplexType,
    class_path: Vec<String>,
    class_map: ClassMap,
}

impl TypeCatalog {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();

        let mut types: HashMap<_, _> = BASE_TYPES
            .iter()
            .map(|(name, schema_name)| {
                (
                    (*name).to_owned(),
                    TypeDescriptor {
                        name: (*schema_name).to_owned(),
                        namespace: XML_SCHEMA.to_owned(),
                    },
                )
            })
            .collect();

        for placeholder in ["mixed", "array"] {
            types.insert(
                placeholder.to_owned(),
                TypeDescriptor {
                    name: placeholder.to_owned(),
                    namespace: namespace.clone(),
                },
            );
        }

        Self {
            namespace,
            types,
            aliases: HashMap::new(),
            complex_types: Vec::new(),
            mixed: ComplexType::mixed(),
            class_path: Vec::new(),
            class_map: ClassMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
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

    pub fn class_map(&self) -> &ClassMap {
        &self.class_map
    }

    pub fn add_class_map(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.class_map.insert(alias.into(), target.into());
    }

    pub fn set_class_map(&mut self, map: ClassMap) {
        self.class_map = map;
    }

    pub fn resolve(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Namespace prefix used for a descriptor inside the generated document.
    pub fn prefix(&self, descriptor: &TypeDescriptor) -> &'static str {
        if descriptor.namespace == XML_SCHEMA {
            "xsd"
        } else {
            "tns"
        }
    }

    /// Prefixed schema type name, e.g. `xsd:float` or `tns:Employee`.
    pub fn qualified_name(&self, name: &str) -> Option<String> {
        self.resolve(name)
            .map(|descriptor| format!("{}:{}", self.prefix(descriptor), descriptor.name))
    }

    /// Schema name of a type, falling back to the name as written.
    pub fn schema_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.resolve(name)
            .map(|descriptor| descriptor.name.as_str())
            .unwrap_or(name)
    }

    pub fn complex_types(&self) -> &[ComplexType] {
        &self.complex_types
    }

    pub fn mixed(&self) -> &ComplexType {
        &self.mixed
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        let full = self
            .aliases
            .get(name)
            .or_else(|| self.class_map.get(name))
            .map(String::as_str)
            .unwrap_or(name);

        self.complex_types.iter().find(|complex| complex.name == full)
    }

    pub fn has_complex_type(&self, full_name: &str) -> bool {
        self.complex_types
            .iter()
            .any(|complex| complex.name == full_name)
    }

    /// Finds the description of a structured type referenced as `name`.
    pub fn lookup_class(&self, name: &str, loader: &dyn ClassLoader) -> Result<ClassInfo, Error> {
        let target = self.class_map.get(name).map(String::as_str).unwrap_or(name);

        if is_qualified(target) {
            return loader
                .load_class(target)
                .ok_or_else(|| Error::UnresolvedType(target.to_owned()));
        }

        for path in &self.class_path {
            let candidate = format!("{}.{}", path, target);

            if let Some(class) = loader.load_class(&candidate) {
                debug!(name, resolved = %candidate, "resolved type from class path");
                return Ok(class);
            }
        }

        if let Some(class) = loader.load_class(target) {
            return Ok(class);
        }

        if target == "type" {
            Err(Error::MalformedAnnotation)
        } else {
            Err(Error::UnresolvedType(target.to_owned()))
        }
    }

    /// Registers a structured type under its full name and the name it was referenced by.
    ///
    /// The short name is recorded in the class map. Registering an already known full
    /// name only adds the reference alias.
    pub fn register_complex_type(&mut self, referenced: &str, complex: ComplexType) {
        let full = complex.name.clone();
        let descriptor = TypeDescriptor {
            name: short_name(&full).to_owned(),
            namespace: self.namespace.clone(),
        };

        self.types.insert(referenced.to_owned(), descriptor.clone());
        self.types.insert(full.clone(), descriptor);
        self.aliases.insert(referenced.to_owned(), full.clone());
        self.class_map
            .insert(short_name(&full).to_owned(), full.clone());

        if !self.has_complex_type(&full) {
            self.complex_types.push(complex);
        }
    }

    pub(crate) fn set_fields(&mut self, full_name: &str, fields: Vec<Field>) {
        if let Some(complex) = self
            .complex_types
            .iter_mut()
            .find(|complex| complex.name == full_name)
        {
            complex.fields = fields;
        }
    }
}
