//! The view-hierarchy oracle.
//!
//! Which model paths of a field are bound to which elements is decided by
//! the host's layout introspection. Synthesis only consumes the resulting
//! table `{path -> Slot}` through [`ViewHierarchy`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use weft_model::TypeRef;

/// Direction of a bound element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// A displaying element: population writes into it, recollection reads it.
    #[default]
    View,
    /// A data input: population reads it into the model.
    Input,
}

/// The terminal element bound to one leaf path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Identifier of the element, also the name of the host field holding it.
    pub element_id: String,
    /// Declared type of the model leaf.
    #[serde(rename = "type")]
    pub declared_type: TypeRef,
    /// Direction.
    #[serde(default)]
    pub kind: SlotKind,
    /// Read and written through `getText()`/`setText()`.
    #[serde(default)]
    pub textual: bool,
}

impl Slot {
    /// A textual view slot.
    pub fn view(element_id: impl Into<String>, declared_type: impl Into<TypeRef>) -> Self {
        Self {
            element_id: element_id.into(),
            declared_type: declared_type.into(),
            kind: SlotKind::View,
            textual: true,
        }
    }

    /// A textual input slot.
    pub fn input(element_id: impl Into<String>, declared_type: impl Into<TypeRef>) -> Self {
        Self {
            kind: SlotKind::Input,
            ..Self::view(element_id, declared_type)
        }
    }

    /// Marks the slot as read and written through the host companions.
    pub fn non_textual(mut self) -> Self {
        self.textual = false;
        self
    }
}

/// Answers which elements a component binds to one of its fields.
pub trait ViewHierarchy {
    /// The leaf-path table of `field` in the component `host`. Paths are
    /// dotted and relative to the field; a primitive or string field binds
    /// the path equal to its own name.
    fn slots(&self, host: &str, field: &str) -> BTreeMap<String, Slot>;
}

/// A fixed table, typically deserialized next to the program model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticViewHierarchy {
    bindings: BTreeMap<String, BTreeMap<String, BTreeMap<String, Slot>>>,
}

impl StaticViewHierarchy {
    /// An empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON form `{host: {field: {path: slot}}}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Binds `path` of `field` in `host`.
    pub fn bind(&mut self, host: &str, field: &str, path: &str, slot: Slot) -> &mut Self {
        self.bindings
            .entry(host.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default()
            .insert(path.to_string(), slot);
        self
    }
}

impl ViewHierarchy for StaticViewHierarchy {
    fn slots(&self, host: &str, field: &str) -> BTreeMap<String, Slot> {
        self.bindings
            .get(host)
            .and_then(|fields| fields.get(field))
            .cloned()
            .unwrap_or_default()
    }
}

/// Splits a dotted path into its segments.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_table() {
        let json = r#"{
            "com.shop.Form": {
                "address": {
                    "street": {
                        "element_id": "street", "type": "java.lang.String", "textual": true
                    },
                    "geo.zip": { "element_id": "zip", "type": "int", "kind": "input" }
                }
            }
        }"#;
        let hierarchy = StaticViewHierarchy::from_json(json).unwrap();
        let slots = hierarchy.slots("com.shop.Form", "address");
        assert_eq!(slots.len(), 2);
        assert_eq!(slots["street"], Slot::view("street", TypeRef::string()));
        let zip = &slots["geo.zip"];
        assert_eq!(zip.kind, SlotKind::Input);
        assert!(!zip.textual);
        assert_eq!(zip.declared_type, TypeRef::parse("int"));
    }

    #[test]
    fn unknown_field_has_no_slots() {
        let mut hierarchy = StaticViewHierarchy::new();
        hierarchy.bind("a.B", "name", "name", Slot::view("name", TypeRef::string()));
        assert!(hierarchy.slots("a.B", "other").is_empty());
        assert!(hierarchy.slots("a.C", "name").is_empty());
    }

    #[test]
    fn splits_segments() {
        assert_eq!(segments("y.z"), vec!["y", "z"]);
        assert_eq!(segments("x"), vec!["x"]);
    }
}
