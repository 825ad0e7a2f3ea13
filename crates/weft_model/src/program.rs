//! The whole declared program visible to one synthesis pass.

use crate::arena::Arena;
use crate::component::{Component, ComponentSource};
use crate::error::ModelError;
use crate::ids::{ComponentId, MemberId};
use crate::member::{Member, MemberKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use weft_common::ContentHash;

/// A program description: its components and the supertypes of any other
/// classes the components mention.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSource {
    /// Components, in declaration order.
    #[serde(default)]
    pub components: Vec<ComponentSource>,
    /// Direct supertypes of library classes, by qualified name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, Vec<String>>,
}

impl ProgramSource {
    /// Appends a component.
    pub fn with_component(mut self, component: ComponentSource) -> Self {
        self.components.push(component);
        self
    }

    /// Records the direct supertypes of a library class.
    pub fn with_type(mut self, name: impl Into<String>, supertypes: &[&str]) -> Self {
        self.types.insert(
            name.into(),
            supertypes.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

/// The loaded, indexed program.
#[derive(Debug, Default)]
pub struct Program {
    components: Arena<ComponentId, Component>,
    members: Arena<MemberId, Member>,
    by_name: HashMap<String, ComponentId>,
    by_key: HashMap<MemberKey, MemberId>,
    supertypes: HashMap<String, Vec<String>>,
}

impl Program {
    /// Parses and loads a JSON program description.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let source: ProgramSource =
            serde_json::from_str(json).map_err(|e| ModelError::Parse(e.to_string()))?;
        Self::from_source(source)
    }

    /// Loads a program description, rejecting duplicate components and members.
    pub fn from_source(source: ProgramSource) -> Result<Self, ModelError> {
        let mut program = Program::default();
        for (name, supers) in source.types {
            program.supertypes.insert(name, supers);
        }
        for component in source.components {
            program.add_component(component)?;
        }
        Ok(program)
    }

    fn add_component(&mut self, source: ComponentSource) -> Result<ComponentId, ModelError> {
        if self.by_name.contains_key(&source.name) {
            return Err(ModelError::DuplicateComponent(source.name));
        }
        let bytes = serde_json::to_vec(&source).map_err(|e| ModelError::Parse(e.to_string()))?;
        let fingerprint = ContentHash::from_bytes(&bytes);

        let mut members = Vec::with_capacity(source.members.len());
        for member in source.members {
            let member = Member::from_source(&source.name, member);
            let key = member.key();
            if self.by_key.contains_key(&key) {
                return Err(ModelError::DuplicateMember(key));
            }
            let id = self.members.alloc(member);
            self.by_key.insert(key, id);
            members.push(id);
        }

        self.supertypes
            .insert(source.name.clone(), source.supertypes.clone());
        let id = self.components.alloc(Component {
            name: source.name.clone(),
            supertypes: source.supertypes,
            directives: source.directives,
            members,
            fingerprint,
        });
        self.by_name.insert(source.name, id);
        Ok(id)
    }

    /// Returns the component with the given ID.
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id]
    }

    /// Looks up a component by qualified name.
    pub fn component_by_name(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// Iterates over all components in declaration order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components.iter()
    }

    /// Returns the number of components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Returns the member with the given ID.
    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id]
    }

    /// Returns the member with the given ID, or `None` for a foreign ID.
    pub fn try_member(&self, id: MemberId) -> Option<&Member> {
        self.members.try_get(id)
    }

    /// Looks up a member by its stable identity.
    pub fn member_by_key(&self, key: &MemberKey) -> Option<MemberId> {
        self.by_key.get(key).copied()
    }

    /// Iterates over a component's members in source order.
    pub fn members_of(&self, id: ComponentId) -> impl Iterator<Item = (MemberId, &Member)> {
        self.components[id]
            .members
            .iter()
            .map(move |&m| (m, &self.members[m]))
    }

    /// Finds a declared field of a component by simple name.
    pub fn find_field(&self, component: ComponentId, name: &str) -> Option<MemberId> {
        self.members_of(component)
            .find(|(_, m)| m.is_field() && m.name == name)
            .map(|(id, _)| id)
    }

    /// Finds declared methods of a component by simple name.
    pub fn find_methods<'a>(
        &'a self,
        component: ComponentId,
        name: &'a str,
    ) -> impl Iterator<Item = (MemberId, &'a Member)> + 'a {
        self.members_of(component)
            .filter(move |(_, m)| m.is_method() && m.name == name)
    }

    /// The component declared with the (erased) class name `ty`, if any.
    pub fn component_of_type(&self, ty: &str) -> Option<ComponentId> {
        let erased = ty.split('<').next().unwrap_or(ty).trim();
        self.component_by_name(erased)
    }

    /// Returns `true` if `ty` is `ancestor` or transitively extends it.
    pub fn is_subtype(&self, ty: &str, ancestor: &str) -> bool {
        let start = ty.split('<').next().unwrap_or(ty).trim();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(supers) = self.supertypes.get(current) {
                queue.extend(supers.iter().map(String::as_str));
            }
        }
        false
    }

    /// Content hash of a component's declared description.
    pub fn fingerprint(&self, id: ComponentId) -> ContentHash {
        self.components[id].fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;
    use crate::member::{MemberSource, Param};

    fn shop() -> ProgramSource {
        ProgramSource::default()
            .with_component(
                ComponentSource::new("com.shop.Cart")
                    .with_directive(DirectiveKind::External)
                    .with_member(MemberSource::method("total", "double", vec![]).public()),
            )
            .with_component(
                ComponentSource::new("com.shop.CheckoutView")
                    .with_supertype("com.shop.BaseView")
                    .with_member(
                        MemberSource::field("cart", "com.shop.Cart")
                            .with_directive(DirectiveKind::External),
                    ),
            )
            .with_type("java.util.ArrayList", &["java.util.List"])
            .with_type("java.util.List", &["java.util.Collection"])
    }

    #[test]
    fn load_and_lookup() {
        let program = Program::from_source(shop()).unwrap();
        assert_eq!(program.component_count(), 2);
        let view = program.component_by_name("com.shop.CheckoutView").unwrap();
        let cart_field = program.find_field(view, "cart").unwrap();
        assert_eq!(program.member(cart_field).name, "cart");
        let cart = program
            .component_of_type(program.member(cart_field).declared_type().erasure().unwrap())
            .unwrap();
        assert!(program.component(cart).is_external());
        assert_eq!(program.find_methods(cart, "total").count(), 1);
    }

    #[test]
    fn duplicate_component_rejected() {
        let source = shop().with_component(ComponentSource::new("com.shop.Cart"));
        let err = Program::from_source(source).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateComponent(ref n) if n == "com.shop.Cart"));
    }

    #[test]
    fn duplicate_member_rejected() {
        let source = ProgramSource::default().with_component(
            ComponentSource::new("a.B")
                .with_member(MemberSource::method("run", "void", vec![Param::new("x", "int")]))
                .with_member(MemberSource::method("run", "void", vec![Param::new("y", "int")])),
        );
        assert!(matches!(
            Program::from_source(source),
            Err(ModelError::DuplicateMember(_))
        ));
    }

    #[test]
    fn overloads_are_distinct_members() {
        let source = ProgramSource::default().with_component(
            ComponentSource::new("a.B")
                .with_member(MemberSource::method("run", "void", vec![]))
                .with_member(MemberSource::method("run", "void", vec![Param::new("x", "int")])),
        );
        let program = Program::from_source(source).unwrap();
        let b = program.component_by_name("a.B").unwrap();
        assert_eq!(program.find_methods(b, "run").count(), 2);
    }

    #[test]
    fn subtype_walks_transitively() {
        let program = Program::from_source(shop()).unwrap();
        assert!(program.is_subtype("java.util.ArrayList<String>", "java.util.Collection"));
        assert!(program.is_subtype("com.shop.CheckoutView", "com.shop.BaseView"));
        assert!(program.is_subtype("java.util.List", "java.util.List"));
        assert!(!program.is_subtype("java.util.Collection", "java.util.List"));
    }

    #[test]
    fn fingerprint_tracks_members() {
        let a = Program::from_source(shop()).unwrap();
        let b = Program::from_source(shop()).unwrap();
        let cart = a.component_by_name("com.shop.Cart").unwrap();
        assert_eq!(a.fingerprint(cart), b.fingerprint(cart));

        let mut changed = shop();
        changed.components[0]
            .members
            .push(MemberSource::method("clear", "void", vec![]).public());
        let c = Program::from_source(changed).unwrap();
        assert_ne!(a.fingerprint(cart), c.fingerprint(cart));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        assert!(matches!(
            Program::from_json("{ not json"),
            Err(ModelError::Parse(_))
        ));
        let program = Program::from_json(r#"{"components": [{"name": "a.B"}]}"#).unwrap();
        assert_eq!(program.component_count(), 1);
    }
}
