//! Opaque ID newtypes for model entities.

/// Defines a `u32` newtype usable as an [`Arena`](crate::arena::Arena) key.
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl $crate::arena::ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Stable identity of a declared member within a [`Program`](crate::Program).
    MemberId
);

define_id!(
    /// Stable identity of a component within a [`Program`](crate::Program).
    ComponentId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        assert_eq!(MemberId::from_raw(42).as_raw(), 42);
    }

    #[test]
    fn id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(ComponentId::from_raw(1));
        set.insert(ComponentId::from_raw(2));
        set.insert(ComponentId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = MemberId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let restored: MemberId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
