//! Self-description of handler and value types.
//!
//! Discovery never inspects runtime type metadata. Handler types describe their methods
//! with a [`ServiceClass`] and structured value types describe their properties with a
//! [`ClassInfo`], either built by hand or emitted by the `service` and `SoapType` macros.
//! Type identities are dotted paths such as `app.types.Employee`.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    #[default]
    Regular,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub kind: MethodKind,
    pub is_static: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceClass {
    pub name: String,
    pub doc: Option<String>,
    pub methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub doc: Option<String>,
    pub properties: Vec<PropertyInfo>,
}

/// Implemented by handler types exposed as a service.
pub trait SoapClass {
    fn service_class() -> ServiceClass;
}

/// Implemented by structured types used as parameters, return values or fields.
pub trait SoapType {
    fn class_info() -> ClassInfo;
}

/// Resolves a fully-qualified type name to its description.
pub trait ClassLoader {
    fn load_class(&self, name: &str) -> Option<ClassInfo>;
}

/// Name-keyed [`ClassLoader`] filled by explicit registration.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassInfo>,
}

/// Returns the unqualified part of a dotted type name.
pub fn short_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) => &name[index + 1..],
        None => name,
    }
}

pub fn is_qualified(name: &str) -> bool {
    name.contains('.')
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Public, concrete, non-static and neither constructor nor destructor.
    pub fn is_operation(&self) -> bool {
        self.visibility == Visibility::Public
            && self.kind == MethodKind::Regular
            && !self.is_static
            && !self.is_abstract
    }
}

impl ServiceClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn property(mut self, property: PropertyInfo) -> Self {
        self.properties.push(property);
        self
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: ClassInfo) -> &mut Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn register_type<T: SoapType>(&mut self) -> &mut Self {
        self.register(T::class_info())
    }

    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.register(class);
        self
    }

    pub fn with_type<T: SoapType>(self) -> Self {
        self.with_class(T::class_info())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassLoader for ClassRegistry {
    fn load_class(&self, name: &str) -> Option<ClassInfo> {
        self.classes.get(name).cloned()
    }
}

impl<T: ClassLoader + ?Sized> ClassLoader for &T {
    fn load_class(&self, name: &str) -> Option<ClassInfo> {
        (**self).load_class(name)
    }
}

impl<T: ClassLoader + ?Sized> ClassLoader for std::sync::Arc<T> {
    fn load_class(&self, name: &str) -> Option<ClassInfo> {
        (**self).load_class(name)
    }
}
