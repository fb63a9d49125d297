//! Typed identifiers for linkage elements.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new ID.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw ID value.
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a rigid body in a linkage.
    BodyId,
    "Body"
);

id_type!(
    /// Unique identifier for a named attachment offset on a body.
    OffsetId,
    "Offset"
);

id_type!(
    /// Unique identifier for a joint in a linkage.
    JointId,
    "Joint"
);
