use crate::geometry::ClipPlane;
use crate::math::Vector3;
use crate::surface::Material;

/// Whether surfaces come from a live tracker or the simulated room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Live,
    Simulated,
}

/// How the portal frame is placed at the contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlacement {
    /// Uniform frame scale once placed. Zero keeps the frame hidden.
    pub scale: f64,
    /// If set, the frame's height is pinned to this value.
    pub height: Option<f64>,
}

/// Layout of the simulated four-wall room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomConfig {
    /// Number of walls, spaced evenly around the vertical axis.
    pub wall_count: usize,
    /// Distance from the room center to each wall.
    pub half_extent: f64,
    /// Height of each wall's center above the floor.
    pub wall_center_height: f64,
    /// Index of the wall selected automatically once the room exists.
    pub auto_select_wall: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            wall_count: 4,
            half_extent: 10.0,
            wall_center_height: 2.0,
            auto_select_wall: 2,
        }
    }
}

/// Materials applied to newly created surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decorations {
    pub live: Material,
    pub simulated: Material,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            live: Material::pass_through(),
            simulated: Material::translucent(),
        }
    }
}

impl Decorations {
    /// Returns the decoration for surfaces produced in `mode`.
    #[must_use]
    pub fn for_mode(&self, mode: SourceMode) -> Material {
        match mode {
            SourceMode::Live => self.live,
            SourceMode::Simulated => self.simulated,
        }
    }
}

/// Parameters for the portal engine.
#[derive(Debug, Clone, Copy)]
pub struct PortalConfig {
    pub live_placement: FramePlacement,
    pub simulated_placement: FramePlacement,
    /// Clip plane in effect before any surface is selected.
    pub initial_clip_plane: ClipPlane,
    pub room: RoomConfig,
    pub decorations: Decorations,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            live_placement: FramePlacement {
                scale: 1.0,
                height: None,
            },
            simulated_placement: FramePlacement {
                scale: 4.0,
                height: Some(2.0),
            },
            initial_clip_plane: ClipPlane::from_unit_normal(Vector3::new(0.0, 0.0, -1.0), -10.0),
            room: RoomConfig::default(),
            decorations: Decorations::default(),
        }
    }
}

impl PortalConfig {
    /// Returns the frame placement used in `mode`.
    #[must_use]
    pub fn placement(&self, mode: SourceMode) -> FramePlacement {
        match mode {
            SourceMode::Live => self.live_placement,
            SourceMode::Simulated => self.simulated_placement,
        }
    }
}
