//! Runtime values seen while executing generated code.

use crate::ast::Block;
use crate::error::EvalError;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// A shared, mutable object.
pub type ObjectRef = Rc<RefCell<Object>>;

/// A host-provided callable, invoked for any method called on it.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, EvalError>>;

/// An object: a class name and its fields.
#[derive(Debug, Clone, Default)]
pub struct Object {
    /// Runtime class name.
    pub class: String,
    /// Field values by name.
    pub fields: BTreeMap<String, Value>,
}

/// An anonymous implementation created by evaluating [`Expr::Lambda`](crate::Expr::Lambda).
#[derive(Clone)]
pub struct Closure {
    /// Implemented interface.
    pub interface: String,
    /// Implemented method.
    pub method: String,
    /// Parameter names.
    pub params: Vec<String>,
    /// Body.
    pub body: Block,
    /// Locals captured at creation.
    pub captured: HashMap<String, Value>,
    /// The enclosing `this`.
    pub this: Value,
}

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// Any integral number.
    Int(i64),
    /// Any floating-point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An object.
    Object(ObjectRef),
    /// An anonymous implementation.
    Closure(Rc<Closure>),
    /// A host callable.
    Native(NativeFn),
}

impl Value {
    /// A fresh object of `class` with the given fields.
    pub fn object<K: Into<String>>(
        class: &str,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Value::Object(Rc::new(RefCell::new(Object {
            class: class.to_string(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })))
    }

    /// A host callable.
    pub fn native(f: impl Fn(&[Value]) -> Result<Value, EvalError> + 'static) -> Self {
        Value::Native(Rc::new(f))
    }

    /// A string value.
    pub fn string(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    /// Returns `true` for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The runtime class name of an object or closure.
    pub fn class_name(&self) -> Option<String> {
        match self {
            Value::Object(obj) => Some(obj.borrow().class.clone()),
            Value::Closure(closure) => Some(closure.interface.clone()),
            Value::Str(_) => Some("java.lang.String".to_string()),
            _ => None,
        }
    }

    /// Reads a field of an object. Missing fields and non-objects read as `null`.
    pub fn get_field(&self, name: &str) -> Value {
        match self {
            Value::Object(obj) => obj.borrow().fields.get(name).cloned().unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Writes a field of an object. Returns `false` for non-objects.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        match self {
            Value::Object(obj) => {
                obj.borrow_mut().fields.insert(name.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Object(obj) => write!(f, "{}@{:p}", obj.borrow().class, Rc::as_ptr(obj)),
            Value::Closure(c) => write!(f, "<{}>", c.interface),
            Value::Native(_) => f.write_str("<native>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Object(obj) => write!(f, "Object({})", obj.borrow().class),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("interface", &self.interface)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_follows_string_conversion() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::string("hi").to_string(), "hi");
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Value::object("a.B", [("x", Value::Int(1))]);
        let b = Value::object("a.B", [("x", Value::Int(1))]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn fields_read_and_write() {
        let obj = Value::object::<&str>("a.B", []);
        assert!(obj.get_field("x").is_null());
        assert!(obj.set_field("x", Value::Int(3)));
        assert_eq!(obj.get_field("x"), Value::Int(3));
        assert!(!Value::Null.set_field("x", Value::Int(3)));
    }
}
