//! The portal frame and the selection logic that anchors it to a wall.

mod selector;

pub use selector::PortalSelector;

use crate::geometry::ClipPlane;
use crate::math::{Pose, Vector3};
use crate::surface::SurfaceId;

/// What the renderer samples every frame: where the portal frame sits and
/// which plane clips the scene behind it.
///
/// A zero scale hides the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub transform: Pose,
    pub clip_plane: ClipPlane,
    /// Surface currently hosting the portal.
    pub anchor: Option<SurfaceId>,
}

impl FrameState {
    /// A hidden frame with the given clip plane.
    #[must_use]
    pub fn hidden(clip_plane: ClipPlane) -> Self {
        Self {
            transform: Pose {
                scaling: Vector3::zeros(),
                ..Pose::identity()
            },
            clip_plane,
            anchor: None,
        }
    }

    /// Returns `true` once the frame has been placed with a non-zero scale.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.transform.scaling.iter().any(|s| s.abs() > 0.0)
    }
}
