//! Tracked surfaces and the arena that owns their meshes and materials.

pub mod registry;

pub use registry::SurfaceRegistry;

use std::fmt;

use crate::math::{Point3, Pose, Vector3};
use crate::tessellation::TriangleMesh;
use crate::Result;

slotmap::new_key_type! {
    /// Handle to a live surface context in the registry.
    pub struct SurfaceKey;
}

slotmap::new_key_type! {
    /// Handle to a renderable surface mesh. Pick events report this.
    pub struct MeshId;
}

slotmap::new_key_type! {
    /// Handle to a decorative material.
    pub struct MaterialId;
}

/// Opaque identity assigned to a surface by the detection source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orientation class of a surface, fixed when the surface is first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Classifies the orientation string reported by a detection source.
    ///
    /// Only `"vertical"` (any case) is vertical.
    #[must_use]
    pub fn classify(reported: &str) -> Self {
        if reported.trim().eq_ignore_ascii_case("vertical") {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }

    fn mesh_name(self) -> &'static str {
        match self {
            Self::Horizontal => "Floor",
            Self::Vertical => "Wall",
        }
    }
}

/// Decorative appearance applied to a surface mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Diffuse color.
    pub diffuse: [f64; 3],
}

impl Material {
    /// Fully transparent material that only takes part in picking.
    #[must_use]
    pub fn pass_through() -> Self {
        Self {
            alpha: 0.0,
            diffuse: [1.0, 1.0, 1.0],
        }
    }

    /// Semi-transparent grey material for simulated walls.
    #[must_use]
    pub fn translucent() -> Self {
        Self {
            alpha: 0.25,
            diffuse: [0.75, 0.75, 0.75],
        }
    }
}

/// The persistent record of one tracked surface.
#[derive(Debug, Clone)]
pub struct SurfaceContext {
    id: SurfaceId,
    orientation: Orientation,
    mesh: MeshId,
    material: MaterialId,
}

impl SurfaceContext {
    /// External identity of the surface.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Orientation class assigned at creation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Currently installed mesh.
    #[must_use]
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// Material shared by every mesh this surface has had.
    #[must_use]
    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Returns `true` if the surface can host the portal.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }
}

/// Renderable geometry of a surface, placed in world space by its pose.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    pub name: &'static str,
    pub geometry: TriangleMesh,
    pub pose: Pose,
    pub material: MaterialId,
}

impl SurfaceMesh {
    /// Returns the first three vertices transformed into world space.
    #[must_use]
    pub fn world_leading_triangle(&self) -> Option<[Point3; 3]> {
        let matrix = self.pose.world_matrix();
        self.geometry
            .leading_triangle()
            .map(|tri| tri.map(|p| matrix.transform_point(&p)))
    }

    /// Returns vertex `index` transformed into world space.
    #[must_use]
    pub fn world_vertex(&self, index: usize) -> Option<Point3> {
        self.geometry
            .vertices
            .get(index)
            .map(|p| self.pose.transform_point(p))
    }

    /// Returns the face normal of the first vertex in world space.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no normal or the pose collapses it.
    pub fn world_face_normal(&self) -> Result<Vector3> {
        let local = self.geometry.normals.first().copied().unwrap_or_else(Vector3::y);
        self.pose.transform_normal(&local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(Orientation::classify("Vertical"), Orientation::Vertical);
        assert_eq!(Orientation::classify("VERTICAL"), Orientation::Vertical);
        assert_eq!(Orientation::classify("horizontal"), Orientation::Horizontal);
        assert_eq!(Orientation::classify(""), Orientation::Horizontal);
    }

    #[test]
    fn surface_id_display() {
        assert_eq!(SurfaceId(7).to_string(), "#7");
    }
}
