//! Index types for mesh elements.
//!
//! Vertices, half-edges (loops), edges and faces are addressed by distinct
//! wrapper types so a loop handle can never be passed where a face is
//! expected. The wrappers are generic over the integer width.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types that can back a mesh index.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v < <$ty>::MAX as usize,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index. Half-edges owned by a face are its loops.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe edge index (one per pair of twin half-edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "L");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_types() {
        let v: VertexId = VertexId::new(3);
        let l: HalfEdgeId = HalfEdgeId::new(3);
        let e: EdgeId = EdgeId::new(3);
        assert_eq!(v.index(), l.index());
        assert_eq!(l.index(), e.index());
        assert!(v.is_valid());
    }

    #[test]
    fn test_invalid_sentinel() {
        let f: FaceId<u16> = FaceId::invalid();
        assert!(!f.is_valid());
        assert_eq!(FaceId::<u16>::default(), f);
    }

    #[test]
    fn test_debug_format() {
        let l: HalfEdgeId = HalfEdgeId::new(42);
        assert_eq!(format!("{:?}", l), "L(42)");

        let invalid: EdgeId = EdgeId::invalid();
        assert_eq!(format!("{:?}", invalid), "E(INVALID)");
    }
}
