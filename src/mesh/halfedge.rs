//! Polygonal half-edge mesh with per-loop UV attributes.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - A half-edge owned by a face is a **loop**: it carries that face corner's
//!   UV coordinate and pin flag
//! - Each [`Edge`] stores one of its half-edges and the `seam` flag
//! - Faces are arbitrary polygons (three or more corners)
//!
//! # Boundary Handling
//!
//! Mesh borders are closed with faceless half-edges, so every edge always
//! has exactly two half-edges. Faceless half-edges never carry UVs.

use nalgebra::{Point2, Point3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a faceless half-edge.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge (pointing in the reverse direction).
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid on the mesh border.
    pub face: FaceId<I>,

    /// The undirected edge shared with the twin.
    pub edge: EdgeId<I>,

    /// UV coordinate of the face corner at `origin`.
    pub uv: Point2<f64>,

    /// Whether `uv` is fixed during conformal solves.
    pub pin: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            edge: EdgeId::invalid(),
            uv: Point2::origin(),
            pin: false,
        }
    }

    /// Check if this half-edge lies outside every face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// An undirected edge.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// One of the two half-edges of this edge.
    pub halfedge: HalfEdgeId<I>,

    /// UV seam flag. Seams split UV islands and relaxation patches.
    pub seam: bool,
}

impl<I: MeshIndex> Edge<I> {
    /// Create a new edge referencing one of its half-edges.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            seam: false,
        }
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One loop of this face.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

/// A polygonal half-edge mesh with UV, pin and seam attributes.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_loops: usize, num_faces: usize) -> Self {
        // Roughly one faceless half-edge per eight loops on typical patches.
        let num_halfedges = num_loops + num_loops / 8;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            edges: Vec::with_capacity(num_halfedges / 2),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges, including faceless border half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Check whether a face id refers to a face of this mesh.
    #[inline]
    pub fn contains_face(&self, id: FaceId<I>) -> bool {
        id.is_valid() && id.index() < self.faces.len()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Loop attributes ====================

    /// Get the UV coordinate stored on a loop.
    #[inline]
    pub fn uv(&self, he: HalfEdgeId<I>) -> Point2<f64> {
        self.halfedge(he).uv
    }

    /// Set the UV coordinate stored on a loop.
    #[inline]
    pub fn set_uv(&mut self, he: HalfEdgeId<I>, uv: Point2<f64>) {
        self.halfedge_mut(he).uv = uv;
    }

    /// Check whether a loop's UV is pinned.
    #[inline]
    pub fn is_pinned(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).pin
    }

    /// Set or clear a loop's pin flag.
    #[inline]
    pub fn set_pinned(&mut self, he: HalfEdgeId<I>, pin: bool) {
        self.halfedge_mut(he).pin = pin;
    }

    // ==================== Edge attributes ====================

    /// Check whether an edge is marked as a UV seam.
    #[inline]
    pub fn is_seam(&self, e: EdgeId<I>) -> bool {
        self.edge(e).seam
    }

    /// Mark or unmark an edge as a UV seam.
    #[inline]
    pub fn set_seam(&mut self, e: EdgeId<I>, seam: bool) {
        self.edges[e.index()].seam = seam;
    }

    /// Check whether an edge lies on the mesh border (only one incident face).
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        let he = self.edge(e).halfedge;
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.twin(he))
    }

    /// Get the two endpoints of an edge.
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let he = self.edge(e).halfedge;
        [self.origin(he), self.dest(he)]
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Get the undirected edge of a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(he).edge
    }

    /// Check if a half-edge is faceless (on the mesh border).
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the mesh border.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let mut any = false;
        for he in self.vertex_halfedges(v) {
            any = true;
            if self.is_boundary_halfedge(he) {
                return true;
            }
        }
        // Isolated vertices count as border.
        !any
    }

    /// Find the half-edge going from `from` to `to`, if the two are adjacent.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from).find(|&he| self.dest(he) == to)
    }

    /// Number of corners of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over the loops (face corners) at a vertex.
    pub fn vertex_loops(&self, v: VertexId<I>) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.vertex_halfedges(v)
            .filter(move |&he| !self.is_boundary_halfedge(he))
    }

    /// Iterate over the loops of a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    // ==================== Geometry ====================

    /// Compute the 3D length of an edge.
    pub fn edge_length(&self, he: HalfEdgeId<I>) -> f64 {
        let p0 = self.position(self.origin(he));
        let p1 = self.position(self.dest(he));
        (p1 - p0).norm()
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() && self.halfedge(v.halfedge).origin.index() != i {
                return false;
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            if !he.twin.is_valid() || self.halfedge(he.twin).twin.index() != i {
                return false;
            }
            if !he.edge.is_valid() || self.halfedge(he.twin).edge != he.edge {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev.index() != i {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next.index() != i {
                return false;
            }
        }

        for e in &self.edges {
            if !e.halfedge.is_valid() {
                return false;
            }
        }

        self.faces.iter().all(|f| f.halfedge.is_valid())
    }
}

/// Iterator over outgoing half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() {
                mesh.num_halfedges()
            } else {
                0
            },
        }
    }
}

impl<I: MeshIndex> Iterator for VertexHalfEdgeIter<'_, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || !self.current.is_valid() {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;

        // twin(he) ends at the vertex; the half-edge after it in its face
        // (or border cycle) leaves the vertex again.
        let twin = self.mesh.twin(self.current);
        self.current = if twin.is_valid() {
            self.mesh.next(twin)
        } else {
            HalfEdgeId::invalid()
        };

        if self.current == self.start {
            self.remaining = 0;
        }

        Some(result)
    }
}

/// Iterator over the loops of a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<I: MeshIndex> Iterator for FaceHalfEdgeIter<'_, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_quads, test_meshes};

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_loop_attributes() {
        let mut mesh = test_meshes::quad_grid(1, 1);
        let l = mesh.face(FaceId::new(0)).halfedge;

        assert_eq!(mesh.uv(l), Point2::origin());
        assert!(!mesh.is_pinned(l));

        mesh.set_uv(l, Point2::new(0.25, 0.75));
        mesh.set_pinned(l, true);
        assert_eq!(mesh.uv(l), Point2::new(0.25, 0.75));
        assert!(mesh.is_pinned(l));

        // Attributes live on the loop, not on the twin.
        assert_eq!(mesh.uv(mesh.twin(l)), Point2::origin());
    }

    #[test]
    fn test_seam_shared_by_twins() {
        let mut mesh = test_meshes::quad_grid(2, 1);
        let a = mesh.find_halfedge(VertexId::new(1), VertexId::new(4)).unwrap();
        let e = mesh.edge_of(a);
        assert_eq!(mesh.edge_of(mesh.twin(a)), e);
        assert!(!mesh.is_boundary_edge(e));

        mesh.set_seam(e, true);
        assert!(mesh.is_seam(mesh.edge_of(mesh.twin(a))));
    }

    #[test]
    fn test_vertex_loops_around_interior_vertex() {
        let mesh = test_meshes::quad_grid(2, 2);
        // Center vertex of a 2x2 quad grid touches four faces.
        let center = VertexId::new(4);
        assert!(!mesh.is_boundary_vertex(center));
        assert_eq!(mesh.vertex_loops(center).count(), 4);

        let corner = VertexId::new(0);
        assert!(mesh.is_boundary_vertex(corner));
        assert_eq!(mesh.vertex_loops(corner).count(), 1);
    }

    #[test]
    fn test_face_degree_of_quad() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
        assert_eq!(mesh.face_degree(FaceId::new(0)), 4);
    }
}
