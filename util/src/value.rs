//! Dynamic values exchanged with handlers.
//!
//! Decoded requests arrive as a [`Struct`] of named arguments. Handlers may answer with
//! any [`Value`]; conversion to and from Rust types goes through [`IntoValue`] and
//! [`FromValue`].

use std::fmt;

use super::error::ValueError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Struct(Struct),
}

/// Ordered named fields, optionally tagged with the full name of the type they describe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    type_name: Option<String>,
    fields: Vec<(String, Value)>,
}

pub trait IntoValue {
    fn into_value(self) -> Value;
}

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Self::Struct(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_struct(self) -> Result<Struct, ValueError> {
        match self {
            Self::Struct(value) => Ok(value),
            other => Err(mismatch("struct", &other)),
        }
    }

    /// Converts into any [`FromValue`] type.
    pub fn convert<T: FromValue>(self) -> Result<T, ValueError> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::String(value) => f.write_str(value),
            Self::Array(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            Self::Struct(value) => write!(f, "{}", value.type_name().unwrap_or("struct")),
        }
    }
}

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = Some(type_name.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl IntoValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl IntoValue) {
        let name = name.into();
        let value = value.into_value();

        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn take(&mut self, name: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(key, _)| key == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Removes a field and converts it, treating an absent field as null.
    pub fn take_as<T: FromValue>(&mut self, name: &str) -> Result<T, ValueError> {
        match self.take(name) {
            Some(value) => T::from_value(value),
            None => T::from_value(Value::Null)
                .map_err(|_| ValueError::MissingField(name.to_owned())),
        }
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

fn parse_error(value: &str, expected: &'static str) -> ValueError {
    ValueError::Parse {
        value: value.to_owned(),
        expected,
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for Struct {
    fn into_value(self) -> Value {
        Value::Struct(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self.into())
    }
}

macro_rules! int_value {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(self.into())
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| parse_error(&wide.to_string(), stringify!($ty)))
                }
            }
        )*
    };
}

int_value!(i8, i16, i32, u8, u16, u32);

// Values beyond the range of `Value::Int` travel as their decimal text.
macro_rules! wide_int_value {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    i64::try_from(self).map_or_else(|_| Value::String(self.to_string()), Value::Int)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(wide) => <$ty>::try_from(wide)
                            .map_err(|_| parse_error(&wide.to_string(), stringify!($ty))),
                        Value::String(text) => text
                            .trim()
                            .parse()
                            .map_err(|_| parse_error(&text, stringify!($ty))),
                        other => Err(mismatch("int", &other)),
                    }
                }
            }
        )*
    };
}

wide_int_value!(u64, usize, isize);

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: IntoValue> IntoValue for Box<T> {
    fn into_value(self) -> Value {
        (*self).into_value()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for Struct {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.into_struct()
    }
}

impl FromValue for () {
    fn from_value(_: Value) -> Result<Self, ValueError> {
        Ok(())
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(value) => Ok(value),
            Value::Int(value) => Ok(value != 0),
            Value::String(text) => match text.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(parse_error(other, "boolean")),
            },
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(value) => Ok(value),
            Value::String(text) => text.trim().parse().map_err(|_| parse_error(&text, "int")),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(value) => Ok(value),
            Value::Int(value) => Ok(value as f64),
            Value::String(text) => text.trim().parse().map_err(|_| parse_error(&text, "float")),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|value| value as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(value) => Ok(value),
            scalar @ (Value::Bool(_) | Value::Int(_) | Value::Float(_)) => Ok(scalar.to_string()),
            other => Err(mismatch("string", &other)),
        }
    }
}

/// Repeated elements decode as arrays, but a single occurrence may arrive unwrapped.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Array(values) => values.into_iter().map(T::from_value).collect(),
            Value::Null => Ok(Vec::new()),
            single => Ok(vec![T::from_value(single)?]),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}
