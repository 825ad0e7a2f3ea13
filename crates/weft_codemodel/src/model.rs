//! Generated classes and their declarations.

use crate::ast::Block;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use weft_model::{define_id, Arena, Modifier, Param, TypeRef};

/// Name of the after-injection initialization method of every generated class.
pub const INIT_METHOD: &str = "init_";

define_id!(
    /// Identity of a generated class within a [`CodeModel`].
    ClassId
);

/// A generated field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Modifiers.
    pub mods: BTreeSet<Modifier>,
    /// Declared type.
    pub ty: TypeRef,
    /// Field name.
    pub name: String,
}

impl FieldDecl {
    /// A `private` field.
    pub fn private(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            mods: BTreeSet::from([Modifier::Private]),
            ty,
            name: name.into(),
        }
    }
}

/// A generated method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Annotations, without the leading `@`.
    pub annotations: Vec<String>,
    /// Modifiers.
    pub mods: BTreeSet<Modifier>,
    /// Return type.
    pub ret: TypeRef,
    /// Method name.
    pub name: String,
    /// Parameters.
    pub params: Vec<Param>,
    /// Body.
    pub body: Block,
}

impl MethodDecl {
    /// A method with the given visibility and an empty body.
    pub fn new(
        visibility: Modifier,
        ret: TypeRef,
        name: impl Into<String>,
        params: Vec<Param>,
    ) -> Self {
        Self {
            annotations: Vec::new(),
            mods: BTreeSet::from([visibility]),
            ret,
            name: name.into(),
            params,
            body: Block::new(),
        }
    }

    /// Adds `@Override`.
    pub fn overriding(mut self) -> Self {
        self.annotations.push("Override".to_string());
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: Block) -> Self {
        self.body = body;
        self
    }

    /// Returns `true` if the parameter types equal `types`.
    pub fn matches_params(&self, types: &[TypeRef]) -> bool {
        self.params.len() == types.len() && self.params.iter().zip(types).all(|(p, t)| &p.ty == t)
    }
}

/// The synthesized output for one source component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedClass {
    /// Fully-qualified generated class name.
    pub name: String,
    /// The source component it extends.
    pub superclass: String,
    /// Generated fields, in declaration order.
    pub fields: Vec<FieldDecl>,
    /// Generated methods, in declaration order.
    pub methods: Vec<MethodDecl>,
}

impl GeneratedClass {
    /// An empty class named `name` extending `superclass`.
    pub fn new(name: impl Into<String>, superclass: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: superclass.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The class name without its package.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The package, or an empty string for the default package.
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) => &self.name[..pos],
            None => "",
        }
    }

    /// Returns `true` if a field named `name` is declared.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Declares `field` unless a field of that name exists. Returns `true` if added.
    pub fn add_field(&mut self, field: FieldDecl) -> bool {
        if self.has_field(&field.name) {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Returns the first method named `name`.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Returns `true` if a method named `name` is declared.
    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }

    /// Returns the method with the given name and parameter types.
    pub fn method_with(&self, name: &str, types: &[TypeRef]) -> Option<&MethodDecl> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.matches_params(types))
    }

    /// Declares `method` unless one with that name and parameter types exists.
    /// Returns `true` if added.
    pub fn add_method(&mut self, method: MethodDecl) -> bool {
        let types: Vec<TypeRef> = method.params.iter().map(|p| p.ty.clone()).collect();
        if self.method_with(&method.name, &types).is_some() {
            return false;
        }
        self.methods.push(method);
        true
    }

    /// The body of the [`INIT_METHOD`], created on first use.
    pub fn init_block(&mut self) -> &mut Block {
        let index = match self.methods.iter().position(|m| m.name == INIT_METHOD) {
            Some(index) => index,
            None => {
                self.methods.push(MethodDecl::new(
                    Modifier::Private,
                    TypeRef::Void,
                    INIT_METHOD,
                    Vec::new(),
                ));
                self.methods.len() - 1
            }
        };
        &mut self.methods[index].body
    }
}

/// Every class generated during one pass.
#[derive(Debug, Default)]
pub struct CodeModel {
    classes: Arena<ClassId, GeneratedClass>,
    by_name: HashMap<String, ClassId>,
}

impl CodeModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the class named `name`, creating it with `superclass` if absent.
    pub fn class_for(&mut self, name: &str, superclass: &str) -> ClassId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.classes.alloc(GeneratedClass::new(name, superclass));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Returns the class with the given ID.
    pub fn class(&self, id: ClassId) -> &GeneratedClass {
        &self.classes[id]
    }

    /// Returns a mutable reference to the class with the given ID.
    pub fn class_mut(&mut self, id: ClassId) -> &mut GeneratedClass {
        &mut self.classes[id]
    }

    /// Looks up a class by qualified name.
    pub fn by_name(&self, name: &str) -> Option<&GeneratedClass> {
        self.by_name.get(name).map(|&id| &self.classes[id])
    }

    /// Iterates over all classes in creation order.
    pub fn classes(&self) -> impl Iterator<Item = &GeneratedClass> {
        self.classes.values()
    }

    /// Returns the number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no class was generated.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
