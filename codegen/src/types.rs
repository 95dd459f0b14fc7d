use proc_macro2::Ident;
use syn::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    None,
    Shared,
    Exclusive,
    Owned,
}

#[derive(Debug, Clone)]
pub enum Output {
    Unit,
    Value(Type),
    /// `Result<T, E>`; `None` when `T` is `()`.
    Result(Option<Type>),
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub ident: Ident,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub ident: Ident,
    pub doc: Option<String>,
    pub visibility: Visibility,
    pub receiver: Receiver,
    pub arguments: Vec<Argument>,
    pub output: Output,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub self_ty: Type,
    pub ident: Ident,
    pub name: Option<String>,
    pub doc: Option<String>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub ident: Ident,
    pub doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub ident: Ident,
    pub name: Option<String>,
    pub doc: Option<String>,
    pub properties: Vec<Property>,
}

impl Method {
    pub fn is_constructor(&self) -> bool {
        self.ident == "new"
    }

    /// Methods reachable through the generated dispatcher.
    pub fn is_dispatched(&self) -> bool {
        self.visibility == Visibility::Public
            && self.receiver != Receiver::None
            && !self.is_constructor()
    }
}
