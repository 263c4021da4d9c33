use tracing::{debug, info, warn};

use crate::config::{FramePlacement, SourceMode};
use crate::error::{GeometryError, Result, SelectionError};
use crate::geometry::ClipPlane;
use crate::math::{Point3, Vector3};
use crate::surface::{SurfaceContext, SurfaceMesh};

use super::FrameState;

/// Anchors the portal frame to a picked vertical surface.
///
/// This is the only writer of [`FrameState`]. Each successful selection
/// replaces the whole state; there is no blending between surfaces.
#[derive(Debug)]
pub struct PortalSelector {
    mode: SourceMode,
    placement: FramePlacement,
    state: FrameState,
}

impl PortalSelector {
    #[must_use]
    pub fn new(mode: SourceMode, placement: FramePlacement, clip_plane: ClipPlane) -> Self {
        Self {
            mode,
            placement,
            state: FrameState::hidden(clip_plane),
        }
    }

    /// Current frame state.
    #[must_use]
    pub fn frame_state(&self) -> &FrameState {
        &self.state
    }

    /// Places the frame at `contact` on the surface and, if
    /// `update_clip_plane` is set, clips the scene at the surface's plane.
    ///
    /// If no clip plane can be derived from the mesh the previous one is
    /// kept and the frame is still placed.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NotVertical`] if the surface is not
    /// vertical; the frame state is left unchanged.
    pub fn select(
        &mut self,
        surface: &SurfaceContext,
        mesh: &SurfaceMesh,
        contact: Point3,
        update_clip_plane: bool,
    ) -> Result<()> {
        if !surface.is_vertical() {
            debug!(surface = %surface.id(), "plane orientation is not vertical");
            return Err(SelectionError::NotVertical(surface.id()).into());
        }

        let mut next = self.state;
        next.anchor = Some(surface.id());

        let scale = self.placement.scale;
        next.transform.scaling = Vector3::new(scale, scale, scale);
        next.transform.position = contact;
        if let Some(height) = self.placement.height {
            next.transform.position.y = height;
        }

        if update_clip_plane {
            match derive_clip_plane(mesh) {
                Ok(plane) => next.clip_plane = plane,
                Err(e) => warn!(surface = %surface.id(), error = %e, "keeping previous clip plane"),
            }
        }

        next.transform.rotation = mesh.pose.rotation;
        if !mesh.pose.rotation.is_explicit() && update_clip_plane {
            // Without an explicit rotation the plane's facing comes from
            // the frame itself.
            if let Err(e) = reorient_by_frame(&mut next, mesh) {
                warn!(surface = %surface.id(), error = %e, "clip plane not re-oriented");
            }
        }

        self.state = next;
        info!(
            surface = %surface.id(),
            mode = ?self.mode,
            x = contact.x,
            y = contact.y,
            z = contact.z,
            "portal placed"
        );
        Ok(())
    }
}

/// Derives the plane through the mesh's first three world-space vertices,
/// facing the same way as the surface.
fn derive_clip_plane(mesh: &SurfaceMesh) -> Result<ClipPlane> {
    let facing = mesh.world_face_normal()?;
    let [p0, p1, p2] = mesh
        .world_leading_triangle()
        .ok_or_else(|| GeometryError::Degenerate("mesh has fewer than three vertices".into()))?;

    let plane = match ClipPlane::from_points(&p0, &p1, &p2) {
        Ok(plane) => plane,
        Err(_) => (3..mesh.geometry.vertices.len())
            .filter_map(|i| mesh.world_vertex(i))
            .find_map(|p| ClipPlane::from_points(&p0, &p1, &p).ok())
            .ok_or_else(|| GeometryError::Degenerate("mesh vertices are collinear".into()))?,
    };

    Ok(if plane.normal().dot(&facing) < 0.0 {
        plane.flipped()
    } else {
        plane
    })
}

/// Points the clip plane along the surface normal as rotated by the frame,
/// keeping it anchored at the mesh's first vertex.
fn reorient_by_frame(state: &mut FrameState, mesh: &SurfaceMesh) -> Result<()> {
    let local = mesh.geometry.normals.first().copied().unwrap_or_else(Vector3::y);
    let normal = state.transform.transform_normal(&local)?;
    let anchor = mesh
        .world_vertex(0)
        .ok_or_else(|| GeometryError::Degenerate("mesh has no vertices".into()))?;
    state.clip_plane = ClipPlane::from_normal_and_point(&normal, &anchor)?;
    Ok(())
}
