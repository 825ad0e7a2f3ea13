//! Directive resolution and code synthesis for annotated components.
//!
//! A pass resolves each component's directive-bearing members into
//! [`VirtualMember`](weft_model::VirtualMember)s, then runs the registered
//! [`Synthesizer`]s (delegation, population, recollection) into the
//! component's generated class. [`run_pass`] drives a whole program in
//! dependency order against the incremental [`Cache`](weft_cache::Cache).

mod access;
pub mod bindings;
pub mod codes;
pub mod coerce;
pub mod delegation;
pub mod error;
mod fields;
pub mod names;
pub mod options;
pub mod pipeline;
pub mod population;
mod procedure;
pub mod recollection;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod session;

pub use bindings::{Slot, SlotKind, StaticViewHierarchy, ViewHierarchy};
pub use error::MemberError;
pub use options::{SynthOptions, WEFT_VERSION};
pub use pipeline::{open_cache, run_pass, PassOutput};
pub use registry::{DirectiveRegistry, Synthesizer};
pub use request::populate_call;
pub use resolver::{Resolution, VirtualMemberResolver};
pub use session::BuildSession;
