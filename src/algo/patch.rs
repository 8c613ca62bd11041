//! Face patches.
//!
//! A [`Patch`] is the caller-selected set of faces a UV operation works on.
//! Membership is a property of the call, not of the mesh: nothing is tagged
//! on the mesh elements themselves.

use std::collections::HashSet;

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex};

/// An ordered, duplicate-free set of faces.
#[derive(Debug, Clone)]
pub struct Patch<I: MeshIndex = u32> {
    faces: Vec<FaceId<I>>,
    members: HashSet<FaceId<I>>,
}

impl<I: MeshIndex> Patch<I> {
    /// Create a patch, validating every face id against the mesh.
    ///
    /// Duplicates are dropped; first-seen order is kept.
    pub fn new(
        mesh: &HalfEdgeMesh<I>,
        faces: impl IntoIterator<Item = FaceId<I>>,
    ) -> Result<Self> {
        let mut patch = Self {
            faces: Vec::new(),
            members: HashSet::new(),
        };
        for f in faces {
            if !mesh.contains_face(f) {
                return Err(MeshError::InvalidFace { face: f.index() });
            }
            if patch.members.insert(f) {
                patch.faces.push(f);
            }
        }
        Ok(patch)
    }

    /// A patch covering every face of the mesh.
    pub fn all(mesh: &HalfEdgeMesh<I>) -> Self {
        Self::from_unique(mesh.face_ids().collect())
    }

    /// Build a patch from faces already known to be valid and unique.
    pub(crate) fn from_unique(faces: Vec<FaceId<I>>) -> Self {
        let members = faces.iter().copied().collect();
        Self { faces, members }
    }

    /// Faces in patch order.
    #[inline]
    pub fn faces(&self) -> &[FaceId<I>] {
        &self.faces
    }

    /// Check whether a face belongs to the patch. Invalid ids never do.
    #[inline]
    pub fn contains(&self, f: FaceId<I>) -> bool {
        self.members.contains(&f)
    }

    /// Number of faces.
    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Check if the patch has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Iterate over every loop of every face, in patch order.
    pub fn loops<'a>(
        &'a self,
        mesh: &'a HalfEdgeMesh<I>,
    ) -> impl Iterator<Item = HalfEdgeId<I>> + 'a {
        self.faces.iter().flat_map(move |&f| mesh.face_halfedges(f))
    }
}
