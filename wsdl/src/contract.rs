use super::{catalog::TypeCatalog, reflect::short_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    pub repeated: bool,
    pub docs: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnInfo {
    pub type_name: String,
    pub repeated: bool,
    pub docs: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub input: Vec<Parameter>,
    pub output: Option<ReturnInfo>,
    pub documentation: String,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub repeated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<Field>,
}

/// Everything discovered about a handler, ready for document assembly.
#[derive(Debug, Clone)]
pub struct Contract {
    pub(crate) class_name: String,
    pub(crate) service_name: String,
    pub(crate) documentation: Option<String>,
    pub(crate) namespace: String,
    pub(crate) location: String,
    pub(crate) operations: Vec<Operation>,
    pub(crate) catalog: TypeCatalog,
}

/// Name of the output message, element and type for an operation.
pub fn response_name(operation: &str) -> String {
    format!("{}Response", operation)
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: Vec::new(),
            output: None,
            documentation: String::new(),
            doc_comment: None,
        }
    }

    pub fn response_name(&self) -> String {
        response_name(&self.name)
    }

    pub fn is_void(&self) -> bool {
        self.output.is_none()
    }
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            repeated: false,
        }
    }

    pub fn repeated(mut self, repeated: bool) -> Self {
        self.repeated = repeated;
        self
    }
}

impl ComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            fields: Vec::new(),
        }
    }

    /// The scalar-union placeholder behind the `mixed` type name.
    pub fn mixed() -> Self {
        Self {
            name: "mixed".into(),
            doc: None,
            fields: vec![
                Field::new("varString", "string"),
                Field::new("varInt", "int"),
                Field::new("varFloat", "float"),
                Field::new("varArray", "array"),
                Field::new("varBoolean", "boolean"),
            ],
        }
    }

    pub fn schema_name(&self) -> &str {
        short_name(&self.name)
    }

    pub fn has_repeated_fields(&self) -> bool {
        self.fields.iter().any(|field| field.repeated)
    }
}

impl Contract {
    /// Fully-qualified name of the handler type.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Short name of the handler type, used to name the port type, binding and service.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|operation| operation.name == name)
    }

    /// Discovered structured types, excluding the `mixed` placeholder.
    pub fn complex_types(&self) -> &[ComplexType] {
        self.catalog.complex_types()
    }

    /// Looks up a structured type by a referenced, aliased or full name.
    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.catalog.complex_type(name)
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn class_map(&self) -> &super::catalog::ClassMap {
        self.catalog.class_map()
    }
}
