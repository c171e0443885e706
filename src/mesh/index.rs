//! Type-safe index wrappers for mesh elements.
//!
//! Vertices, half-edges, and faces are addressed by u32-backed newtypes so
//! they cannot be mixed up at call sites. `u32::MAX` is reserved as the
//! invalid sentinel; boundary half-edges carry an invalid [`FaceId`].

use std::fmt::{self, Debug};

const INVALID: u32 = u32::MAX;

macro_rules! impl_index_type {
    ($(#[$doc:meta])* $name:ident, $display:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < INVALID as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(
    /// A type-safe vertex index.
    VertexId,
    "V"
);
impl_index_type!(
    /// A type-safe half-edge index.
    HalfEdgeId,
    "HE"
);
impl_index_type!(
    /// A type-safe face index.
    FaceId,
    "F"
);
