//! Null-guarded access to model leaves and bound elements.

use weft_codemodel::{Block, Expr, Stmt};

use crate::bindings::{segments, Slot};
use crate::names::{getter, setter, READ_FIELD, WRITE_FIELD};

/// Where a field's value lives: `f` on `this`, or `r.f` through a reference.
#[derive(Debug, Clone)]
pub(crate) struct FieldRoot {
    root: Expr,
    guards: Vec<Expr>,
}

impl FieldRoot {
    /// `field` of `this`, or of the reference field `through`.
    pub(crate) fn new(through: Option<&str>, field: &str) -> Self {
        match through {
            None => Self {
                root: Expr::name(field),
                guards: Vec::new(),
            },
            Some(reference) => Self {
                root: Expr::name(reference).field(field),
                guards: vec![Expr::name(reference).ne_null()],
            },
        }
    }

    /// Access to the field itself, for primitive and string fields.
    pub(crate) fn whole(&self) -> Leaf {
        Leaf {
            guards: self.guards.clone(),
            read: self.root.clone(),
            target: LeafTarget::Assign(self.root.clone()),
        }
    }

    /// Access to the dotted `path` below the field. Every object on the way
    /// is checked for null, the field itself included.
    pub(crate) fn path(&self, path: &str) -> Leaf {
        let mut guards = self.guards.clone();
        let mut current = self.root.clone();
        let segs = segments(path);
        let Some((last, parents)) = segs.split_last() else {
            return self.whole();
        };
        for segment in parents {
            guards.push(current.clone().ne_null());
            current = current.call(getter(segment), vec![]);
        }
        guards.push(current.clone().ne_null());
        Leaf {
            guards,
            read: current.clone().call(getter(last), vec![]),
            target: LeafTarget::Setter {
                parent: current,
                property: (*last).to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum LeafTarget {
    Assign(Expr),
    Setter { parent: Expr, property: String },
}

/// A guarded model leaf.
#[derive(Debug, Clone)]
pub(crate) struct Leaf {
    guards: Vec<Expr>,
    read: Expr,
    target: LeafTarget,
}

impl Leaf {
    /// The leaf's current value.
    pub(crate) fn read(&self) -> Expr {
        self.read.clone()
    }

    /// The statement storing `value` into the leaf.
    pub(crate) fn write(&self, value: Expr) -> Stmt {
        match &self.target {
            LeafTarget::Assign(target) => Stmt::Assign {
                target: target.clone(),
                value,
            },
            LeafTarget::Setter { parent, property } => {
                Stmt::Expr(parent.clone().call(setter(property), vec![value]))
            }
        }
    }

    /// Appends `inner` nested under `extra` guards followed by the leaf's own.
    pub(crate) fn guarded(&self, b: &mut Block, extra: Vec<Expr>, inner: impl FnOnce(&mut Block)) {
        let mut guards = extra;
        guards.extend(self.guards.iter().cloned());
        nest(b, &guards, inner);
    }
}

/// Appends `inner` nested inside one `if` per guard, outermost first.
pub(crate) fn nest(b: &mut Block, guards: &[Expr], inner: impl FnOnce(&mut Block)) {
    match guards.split_first() {
        None => inner(b),
        Some((first, rest)) => {
            b.if_then(first.clone(), |b| nest(b, rest, inner));
        }
    }
}

/// The element bound to `slot`, a field of the host.
pub(crate) fn element(slot: &Slot) -> Expr {
    Expr::name(slot.element_id.clone())
}

/// The element's current text.
pub(crate) fn read_element(slot: &Slot) -> Expr {
    if slot.textual {
        element(slot).call("getText", vec![]).call("toString", vec![])
    } else {
        Expr::call_this(READ_FIELD, vec![element(slot)])
    }
}

/// Shows `value` in the element.
pub(crate) fn write_element(slot: &Slot, value: Expr) -> Expr {
    let text = Expr::call_static("String", "valueOf", vec![value]);
    if slot.textual {
        element(slot).call("setText", vec![text])
    } else {
        Expr::call_this(WRITE_FIELD, vec![element(slot), text])
    }
}
