//! Declared types of members, as written in the component source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive (unboxed) value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `char`
    Char,
}

impl PrimitiveKind {
    /// All primitive kinds, in declaration order.
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Char,
    ];

    /// The source keyword for this primitive.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Char => "char",
        }
    }

    /// The fully-qualified name of the boxed counterpart.
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
            PrimitiveKind::Char => "java.lang.Character",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    fn from_boxed_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.boxed_name() == name)
    }
}

/// A declared type: `void`, a primitive, or a (possibly generic) class name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    /// No value.
    Void,
    /// An unboxed primitive.
    Primitive(PrimitiveKind),
    /// A reference type, by fully-qualified name including any type arguments.
    Class(String),
}

/// Fully-qualified name of the string type.
pub const STRING: &str = "java.lang.String";

impl TypeRef {
    /// Parses a type as written in source or in a program description.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == "void" {
            return TypeRef::Void;
        }
        match PrimitiveKind::from_keyword(text) {
            Some(kind) => TypeRef::Primitive(kind),
            None => TypeRef::Class(text.to_string()),
        }
    }

    /// Shorthand for a class type.
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class(name.into())
    }

    /// The string type.
    pub fn string() -> Self {
        TypeRef::Class(STRING.to_string())
    }

    /// Returns `true` for `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Returns `true` for the unboxed `boolean` primitive.
    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeRef::Primitive(PrimitiveKind::Boolean))
    }

    /// Returns `true` for any unboxed primitive.
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    /// Returns `true` for a reference type.
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Class(_))
    }

    /// Returns `true` for `java.lang.String`.
    pub fn is_string(&self) -> bool {
        self.erasure() == Some(STRING)
    }

    /// The class name with type arguments stripped, for reference types.
    pub fn erasure(&self) -> Option<&str> {
        match self {
            TypeRef::Class(name) => Some(name.split('<').next().unwrap_or(name).trim()),
            _ => None,
        }
    }

    /// The primitive kind behind this type, unboxing wrapper classes.
    pub fn unboxed(&self) -> Option<PrimitiveKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            TypeRef::Class(_) => self.erasure().and_then(PrimitiveKind::from_boxed_name),
            TypeRef::Void => None,
        }
    }

    /// The last segment of the erased class name, or the keyword otherwise.
    pub fn simple_name(&self) -> String {
        match self.erasure() {
            Some(name) => name.rsplit('.').next().unwrap_or(name).to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Primitive(kind) => f.write_str(kind.keyword()),
            TypeRef::Class(name) => f.write_str(name),
        }
    }
}

impl From<String> for TypeRef {
    fn from(text: String) -> Self {
        TypeRef::parse(&text)
    }
}

impl From<&str> for TypeRef {
    fn from(text: &str) -> Self {
        TypeRef::parse(text)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keywords() {
        assert_eq!(TypeRef::parse("void"), TypeRef::Void);
        assert_eq!(
            TypeRef::parse("int"),
            TypeRef::Primitive(PrimitiveKind::Int)
        );
        assert_eq!(
            TypeRef::parse(" boolean "),
            TypeRef::Primitive(PrimitiveKind::Boolean)
        );
        assert_eq!(
            TypeRef::parse("com.shop.Address"),
            TypeRef::class("com.shop.Address")
        );
    }

    #[test]
    fn boxed_types_unbox() {
        assert_eq!(
            TypeRef::class("java.lang.Integer").unboxed(),
            Some(PrimitiveKind::Int)
        );
        assert_eq!(TypeRef::string().unboxed(), None);
        assert!(!TypeRef::class("java.lang.Boolean").is_boolean());
    }

    #[test]
    fn erasure_strips_arguments() {
        let list = TypeRef::class("java.util.List<java.lang.String>");
        assert_eq!(list.erasure(), Some("java.util.List"));
        assert_eq!(list.simple_name(), "List");
        assert_eq!(TypeRef::Void.erasure(), None);
    }

    #[test]
    fn string_detection() {
        assert!(TypeRef::string().is_string());
        assert!(!TypeRef::class("java.lang.StringBuilder").is_string());
    }

    #[test]
    fn serde_uses_source_spelling() {
        let ty = TypeRef::Primitive(PrimitiveKind::Long);
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"long\"");
        let restored: TypeRef = serde_json::from_str("\"com.shop.Cart\"").unwrap();
        assert_eq!(restored.simple_name(), "Cart");
    }
}
