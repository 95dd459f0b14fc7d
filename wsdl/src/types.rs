//! Parsed form of a WSDL document.

#[derive(Default, Debug, Clone)]
pub struct Namespaces(Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacedName {
    namespace_idx: usize,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Struct(Vec<Field>),
    Simple(NamespacedName),
    Alias(NamespacedName),
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Type(NamespacedName),
    Inner(TypeKind),
}

#[derive(Debug, Clone)]
pub struct Type {
    pub name: NamespacedName,
    pub kind: TypeKind,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: NamespacedName,
    pub ty: FieldKind,
    pub max_occurs: Occurs,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: NamespacedName,
    pub parts: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub name: NamespacedName,
    pub documentation: Option<String>,
    pub input: Option<NamespacedName>,
    pub output: Option<NamespacedName>,
}

#[derive(Debug, Clone)]
pub struct PortType {
    pub name: NamespacedName,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub struct BindingOperation {
    pub name: NamespacedName,
    pub input: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: NamespacedName,
    pub ty: NamespacedName,
    pub style: Option<String>,
    pub transport: String,
    pub operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: NamespacedName,
    pub binding: NamespacedName,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: NamespacedName,
    pub ports: Vec<Port>,
}

#[derive(Default, Debug, Clone)]
pub struct Definition {
    pub target_namespace: Option<String>,
    pub documentation: Option<String>,
    pub types: Vec<Type>,
    pub elements: Vec<Type>,
    pub messages: Vec<Message>,
    pub port_types: Vec<PortType>,
    pub bindings: Vec<Binding>,
    pub services: Vec<Service>,
}

impl Namespaces {
    pub fn namespaces(&self) -> &[String] {
        &self.0
    }

    pub fn add_or_get(&mut self, namespace: &str) -> usize {
        if let Some(index) = self.index_of(namespace) {
            index
        } else {
            let index = self.0.len();
            self.0.push(namespace.to_owned());
            index
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn index_of(&self, namespace: &str) -> Option<usize> {
        self.0.iter().position(|value| value == namespace)
    }
}

impl NamespacedName {
    pub fn new(namespaces: &mut Namespaces, namespace: &str, name: String) -> Self {
        Self {
            namespace_idx: namespaces.add_or_get(namespace),
            name,
        }
    }

    pub fn index(&self) -> usize {
        self.namespace_idx
    }

    pub fn namespace<'a>(&self, namespaces: &'a Namespaces) -> Option<&'a str> {
        namespaces.get(self.namespace_idx)
    }

    pub fn is_in(&self, namespaces: &Namespaces, namespace: &str) -> bool {
        self.namespace(namespaces) == Some(namespace)
    }
}

impl Occurs {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unbounded" => Some(Self::Unbounded),
            other => other.parse().ok().map(Self::Bounded),
        }
    }

    pub fn is_repeated(self) -> bool {
        !matches!(self, Self::Bounded(0 | 1))
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        self.max_occurs.is_repeated()
    }
}

impl Definition {
    /// Top-level schema element by local name.
    pub fn element(&self, name: &str) -> Option<&Type> {
        self.elements.iter().find(|element| element.name.name == name)
    }

    /// Named schema type by local name.
    pub fn schema_type(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|ty| ty.name.name == name)
    }

    /// Fields of the structure an element describes, following a type reference.
    pub fn element_fields(&self, name: &str) -> Option<&[Field]> {
        match &self.element(name)?.kind {
            TypeKind::Struct(fields) => Some(fields),
            TypeKind::Alias(reference) => match &self.schema_type(&reference.name)?.kind {
                TypeKind::Struct(fields) => Some(fields),
                _ => None,
            },
            TypeKind::Simple(_) => None,
        }
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.port_types
            .iter()
            .flat_map(|port_type| port_type.operations.iter())
            .find(|operation| operation.name.name == name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.port_types
            .iter()
            .flat_map(|port_type| port_type.operations.iter())
    }

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.name.name == name)
    }

    /// Address of the first service port.
    pub fn location(&self) -> Option<&str> {
        self.services
            .iter()
            .flat_map(|service| service.ports.iter())
            .map(|port| port.location.as_str())
            .next()
    }
}
