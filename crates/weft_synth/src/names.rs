//! Names of runtime types and generated members.
//!
//! Generated code talks to a small runtime: continuation interfaces, the
//! population/recollection listener interfaces and a validator. Generated
//! members follow fixed naming so hosts and other generated classes can
//! reach them.

use weft_model::capitalize;

/// Success continuation interface.
pub const RUNNABLE: &str = "Runnable";
/// Method of [`RUNNABLE`].
pub const RUN: &str = "run";

/// Failure continuation interface.
pub const ON_FAILED: &str = "weft.runtime.OnFailedRunnable";
/// Method of [`ON_FAILED`].
pub const ON_FAILED_METHOD: &str = "onFailed";

/// Validator of a component's bound elements.
pub const VALIDATOR: &str = "weft.runtime.Validator";
/// Method of [`VALIDATOR`] taking a success and a failure continuation.
pub const VALIDATE: &str = "validate";

/// Exception class caught around field-local procedures.
pub const RUNTIME_EXCEPTION: &str = "RuntimeException";
/// Parameter type of a failure continuation.
pub const THROWABLE: &str = "Throwable";

/// Companion method converting a non-textual element to text.
pub const READ_FIELD: &str = "readField";
/// Companion method writing text into a non-textual element.
pub const WRITE_FIELD: &str = "writeField";

/// Name of the success continuation parameter.
pub const ON_DONE_PARAM: &str = "onDone";
/// Name of the failure continuation parameter.
pub const ON_FAILED_PARAM: &str = "onFailed";

/// Target name of whole-component procedures.
pub const THIS: &str = "this";

/// The population or recollection side of listener-overridable procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// Model to view.
    Populate,
    /// View to model.
    Recollect,
}

impl Flavor {
    /// `populate` or `recollect`.
    pub fn verb(self) -> &'static str {
        match self {
            Flavor::Populate => "populate",
            Flavor::Recollect => "recollect",
        }
    }

    /// The listener interface.
    pub fn listener_interface(self) -> &'static str {
        match self {
            Flavor::Populate => "weft.runtime.PopulateModelListener",
            Flavor::Recollect => "weft.runtime.RecollectModelListener",
        }
    }

    /// The listener interface's single method.
    pub fn listener_method(self) -> &'static str {
        match self {
            Flavor::Populate => "populateModel",
            Flavor::Recollect => "recollectModel",
        }
    }

    /// Name of the success continuation the listener receives.
    pub fn listener_done_param(self) -> &'static str {
        match self {
            Flavor::Populate => "afterPopulate",
            Flavor::Recollect => "afterRecollect",
        }
    }

    /// `_populate_x`, or `_populate_this` for the whole component.
    pub fn procedure(self, target: Option<&str>) -> String {
        format!("_{}_{}", self.verb(), target.unwrap_or(THIS))
    }

    /// Helper procedure for the nested group `group` of `field`.
    pub fn group_procedure(self, field: &str, group: &str) -> String {
        format!("_{}_{field}_{group}", self.verb())
    }

    /// Listener field name: `populateX` or `populateThis`.
    pub fn listener_field(self, target: Option<&str>) -> String {
        format!("{}{}", self.verb(), capitalize(target.unwrap_or(THIS)))
    }

    /// Listener setter name: `setPopulateX` or `setPopulateThis`.
    pub fn listener_setter(self, target: Option<&str>) -> String {
        format!("set{}", capitalize(&self.listener_field(target)))
    }
}

/// `getX` for property `x`.
pub fn getter(property: &str) -> String {
    format!("get{}", capitalize(property))
}

/// `setX` for property `x`.
pub fn setter(property: &str) -> String {
    format!("set{}", capitalize(property))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedure_names() {
        assert_eq!(Flavor::Populate.procedure(Some("cart")), "_populate_cart");
        assert_eq!(Flavor::Recollect.procedure(None), "_recollect_this");
        assert_eq!(Flavor::Populate.group_procedure("order", "address"), "_populate_order_address");
    }

    #[test]
    fn listener_names() {
        assert_eq!(Flavor::Populate.listener_field(Some("cart")), "populateCart");
        assert_eq!(Flavor::Populate.listener_setter(None), "setPopulateThis");
        assert_eq!(Flavor::Recollect.listener_setter(Some("form")), "setRecollectForm");
    }

    #[test]
    fn accessor_names() {
        assert_eq!(getter("street"), "getStreet");
        assert_eq!(setter("zip"), "setZip");
    }
}
