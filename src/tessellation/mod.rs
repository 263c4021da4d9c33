mod tessellate_boundary;

pub use tessellate_boundary::TessellateBoundary;

use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// A triangle mesh approximation of a surface.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Recomputes vertex normals as the area-weighted average of the
    /// adjacent triangle normals.
    ///
    /// Vertices not referenced by any triangle get a zero normal.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vector3::zeros(); self.vertices.len()];
        for tri in &self.indices {
            let [a, b, c] = tri.map(|i| i as usize);
            let (Some(pa), Some(pb), Some(pc)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let n = (pb - pa).cross(&(pc - pa));
            for i in [a, b, c] {
                acc[i] += n;
            }
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros))
            .collect();
    }

    /// Returns the first three vertex positions, if present.
    #[must_use]
    pub fn leading_triangle(&self) -> Option<[Point3; 3]> {
        match self.vertices.as_slice() {
            [a, b, c, ..] => Some([*a, *b, *c]),
            _ => None,
        }
    }
}
