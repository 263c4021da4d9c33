use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{GeometryError, Result};
use crate::geometry::Boundary;
use crate::math::{Point2, Point3};

use super::TriangleMesh;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates a surface boundary into a flat mesh.
///
/// The boundary's (x, y) coordinates are lifted onto the local XZ plane
/// (`y = 0`), so the mesh faces local +Y. Triangles are wound
/// counter-clockwise around +Y, and the first three vertices always form the
/// first triangle. The mesh carries no pose of its own; the caller places it
/// in world space.
pub struct TessellateBoundary<'a> {
    boundary: &'a Boundary,
}

impl<'a> TessellateBoundary<'a> {
    /// Creates a new `TessellateBoundary` operation.
    #[must_use]
    pub fn new(boundary: &'a Boundary) -> Self {
        Self { boundary }
    }

    /// Executes the triangulation, returning a mesh with generated normals.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the boundary intersects
    /// itself or encloses no triangle.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let outer: Vec<SpadePoint2<f64>> = self
            .boundary
            .open_points()
            .iter()
            .map(|p| SpadePoint2::new(p.x, p.y))
            .collect();

        let mut cdt = Cdt::new();
        insert_constraint_loop(&mut cdt, &outer)?;
        let interior = classify_interior_faces(&cdt);

        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();

        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }

            // spade yields counter-clockwise (x, y); lifted onto XZ that
            // faces -Y, so swap the last two corners.
            let [a, b, c] = face.vertices();
            let mut tri = [0u32; 3];
            for (slot, vh) in tri.iter_mut().zip([a, c, b]) {
                let idx = vh.fix().index();
                *slot = *vertex_map.entry(idx).or_insert_with(|| {
                    let pos = vh.position();
                    mesh.vertices.push(Point3::new(pos.x, 0.0, pos.y));
                    mesh.uvs.push(Point2::new(pos.x, pos.y));
                    (mesh.vertices.len() - 1) as u32
                });
            }
            mesh.indices.push(tri);
        }

        if mesh.indices.is_empty() {
            return Err(GeometryError::Degenerate("boundary encloses no triangle".into()).into());
        }

        mesh.compute_normals();
        Ok(mesh)
    }
}

fn insert_constraint_loop(cdt: &mut Cdt, points: &[SpadePoint2<f64>]) -> Result<()> {
    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt.insert(pt).map_err(|e: InsertionError| {
            GeometryError::Degenerate(format!("boundary point rejected: {e}"))
        })?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(GeometryError::Degenerate("boundary intersects itself".into()).into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(())
}

/// Marks the inner faces enclosed by the constraint loop.
///
/// Flood-fills from the faces bordering the outer face; crossing a
/// constraint edge increments the depth, odd depth means interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let mut visit = |face: FixedFaceHandle<InnerTag>,
                     depth: u32,
                     queue: &mut VecDeque<(FixedFaceHandle<InnerTag>, u32)>| {
        let idx = face.index();
        if depth_map.contains_key(&idx) {
            return;
        }
        depth_map.insert(idx, depth);
        if depth % 2 == 1 {
            interior.insert(idx);
        }
        queue.push_back((face, depth));
    };

    let outer = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            visit(inner.fix(), depth, &mut queue);
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            if let Some(neighbor) = edge.rev().face().as_inner() {
                let crossed = cdt.is_constraint_edge(edge.as_undirected().fix());
                visit(neighbor.fix(), depth + u32::from(crossed), &mut queue);
            }
        }
    }

    interior
}
