//! Mesh construction utilities.
//!
//! Builds polygonal half-edge meshes from face-vertex lists. Faces may mix
//! triangles, quads and n-gons; winding is taken as given.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Edge, Face, HalfEdge, HalfEdgeMesh};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygon faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of polygons, each an ordered list of vertex indices
///
/// # Example
/// ```
/// use rectuv::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 1.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut num_loops = 0;
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (k, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[k + 1..].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
        num_loops += face.len();
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), num_loops, faces.len());

    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&pos| mesh.add_vertex(pos)).collect();

    // Directed edge (v0, v1) -> loop
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_loops);

    // First pass: loops and faces
    for face in faces {
        let face = face.as_ref();
        let base = mesh.num_halfedges();
        let n = face.len();
        let face_id = FaceId::<I>::new(mesh.num_faces());
        mesh.faces.push(Face::new(HalfEdgeId::new(base)));

        for (k, &vi) in face.iter().enumerate() {
            let mut he = HalfEdge::new();
            he.origin = vertex_ids[vi];
            he.next = HalfEdgeId::new(base + (k + 1) % n);
            he.prev = HalfEdgeId::new(base + (k + n - 1) % n);
            he.face = face_id;
            mesh.halfedges.push(he);

            let id = HalfEdgeId::new(base + k);
            mesh.vertex_mut(vertex_ids[vi]).halfedge = id;

            let key = (vi, face[(k + 1) % n]);
            if edge_map.insert(key, id).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: key.0, v1: key.1 });
            }
        }
    }

    // Second pass: twins and edges, in loop order so ids are deterministic
    for index in 0..num_loops {
        let he = HalfEdgeId::<I>::new(index);
        if mesh.twin(he).is_valid() {
            continue;
        }
        let v0 = mesh.origin(he).index();
        let v1 = mesh.origin(mesh.next(he)).index();

        let edge = EdgeId::<I>::new(mesh.num_edges());
        mesh.edges.push(Edge::new(he));

        let twin = match edge_map.get(&(v1, v0)) {
            Some(&twin) => twin,
            None => {
                // Border: close with a faceless half-edge
                let border = HalfEdgeId::<I>::new(mesh.num_halfedges());
                let mut bhe = HalfEdge::new();
                bhe.origin = vertex_ids[v1];
                mesh.halfedges.push(bhe);
                border
            }
        };

        mesh.halfedge_mut(he).twin = twin;
        mesh.halfedge_mut(he).edge = edge;
        mesh.halfedge_mut(twin).twin = he;
        mesh.halfedge_mut(twin).edge = edge;
    }

    link_boundary_loops(&mut mesh, num_loops)?;
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and quad faces (counter-clockwise).
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Link faceless half-edges into border cycles.
///
/// A vertex with two outgoing border half-edges joins separate fans of
/// faces and cannot be linked unambiguously.
fn link_boundary_loops<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    first_border: usize,
) -> Result<()> {
    let border: Vec<HalfEdgeId<I>> = (first_border..mesh.num_halfedges())
        .map(HalfEdgeId::new)
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::with_capacity(border.len());
    for &he in &border {
        let origin = mesh.origin(he).index();
        if outgoing.insert(origin, he).is_some() {
            return Err(MeshError::NonManifoldVertex { vertex: origin });
        }
    }

    for &he in &border {
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
    Ok(())
}

/// Ensure border vertices point to a faceless outgoing half-edge, so that
/// walking around them starts and ends on the border.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for vid in mesh.vertex_ids().collect::<Vec<_>>() {
        let start = mesh.vertex(vid).halfedge;
        if !start.is_valid() {
            continue;
        }

        // Walk clockwise: prev(he) ends at vid, its twin leaves vid.
        let mut he = start;
        for _ in 0..mesh.num_halfedges() {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertex_mut(vid).halfedge = he;
                break;
            }
            let prev = mesh.prev(he);
            if !prev.is_valid() {
                break;
            }
            he = mesh.twin(prev);
            if he == start {
                break;
            }
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
    let faces: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();
    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_quads() -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
        // Two quads sharing edge 1-2
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2, 3], [1, 4, 5, 2]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        assert_eq!(mesh.num_faces(), 1);
        // 3 loops + 3 faceless border half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert_eq!(mesh.num_edges(), 3);
        assert!(mesh.is_valid());
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_two_quads() {
        let (vertices, faces) = two_quads();
        let mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 6);
        // 8 loops + 6 border half-edges
        assert_eq!(mesh.num_halfedges(), 14);
        assert_eq!(mesh.num_edges(), 7);
        assert!(mesh.is_valid());

        let shared = mesh.find_halfedge(VertexId::new(1), VertexId::new(2)).unwrap();
        assert!(!mesh.is_boundary_edge(mesh.edge_of(shared)));
        assert_eq!(mesh.face_of(shared), FaceId::new(0));
        assert_eq!(mesh.face_of(mesh.twin(shared)), FaceId::new(1));
    }

    #[test]
    fn test_border_cycle_is_linked() {
        let (vertices, faces) = two_quads();
        let mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();

        let start = mesh.vertex(VertexId::new(0)).halfedge;
        assert!(mesh.is_boundary_halfedge(start));

        let mut he = start;
        let mut count = 0;
        loop {
            assert!(mesh.is_boundary_halfedge(he));
            he = mesh.next(he);
            count += 1;
            if he == start || count > 10 {
                break;
            }
        }
        assert_eq!(count, 6);
    }

    #[test]
    fn test_mixed_polygons_roundtrip() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 1.5, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
        let mesh: HalfEdgeMesh<u16> = build_from_polygons(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_verts.len(), 5);
        assert_eq!(out_faces, faces);
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let result: Result<HalfEdgeMesh> = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = two_quads();
        let result: Result<HalfEdgeMesh> = build_from_quads(&vertices, &[[0, 1, 0, 3]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));

        let result: Result<HalfEdgeMesh> = build_from_polygons(&vertices, &[vec![0, 1]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_non_manifold_edge() {
        let (vertices, _) = two_quads();
        // Both faces use directed edge 0 -> 1
        let result: Result<HalfEdgeMesh> = build_from_triangles(&vertices, &[[0, 1, 2], [0, 1, 3]]);
        assert!(matches!(
            result,
            Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })
        ));
    }

    #[test]
    fn test_bowtie_vertex_is_rejected() {
        // Two triangles touching only at vertex 0.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let result: Result<HalfEdgeMesh> = build_from_triangles(&vertices, &[[0, 1, 2], [0, 3, 4]]);
        assert!(matches!(
            result,
            Err(MeshError::NonManifoldVertex { vertex: 0 })
        ));
    }

    #[test]
    fn test_empty_input() {
        let faces: Vec<[usize; 3]> = Vec::new();
        let result: Result<HalfEdgeMesh> = build_from_triangles(&[], &faces);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }
}
