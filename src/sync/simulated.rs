use std::f64::consts::{FRAC_PI_2, TAU};

use crate::config::{RoomConfig, SourceMode};
use crate::math::{Point2, Point3, Pose, Rotation, Vector3};
use crate::surface::{Orientation, SurfaceId};

use super::{SequencedEvent, SurfaceEvent, SurfaceSource};

/// A fixed room of vertical walls, used when no live detector exists.
///
/// The first drain starts a session and adds every wall; later drains are
/// empty. Walls are unit squares scaled to size, tilted upright with Euler
/// angles (no explicit quaternion) and spaced evenly around the world up
/// axis, each facing the room center.
#[derive(Debug)]
pub struct SimulatedRoom {
    room: RoomConfig,
    emitted: bool,
}

impl SimulatedRoom {
    #[must_use]
    pub fn new(room: RoomConfig) -> Self {
        Self {
            room,
            emitted: false,
        }
    }

    /// Identity of wall `index`.
    #[must_use]
    pub fn wall_id(index: usize) -> SurfaceId {
        SurfaceId(index as u64)
    }

    /// Pose of wall `index`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn wall_pose(&self, index: usize) -> Pose {
        let angle = TAU / self.room.wall_count.max(1) as f64 * index as f64;
        let d = self.room.half_extent;
        let h = self.room.wall_center_height;
        Pose {
            position: Point3::new(d * angle.sin(), h, d * angle.cos()),
            rotation: Rotation::Euler(Vector3::new(-FRAC_PI_2, angle, 0.0)),
            scaling: Vector3::new(2.0 * d, 1.0, 2.0 * h),
        }
    }

    fn wall_boundary() -> Vec<Option<Point2>> {
        [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5), (-0.5, -0.5)]
            .iter()
            .map(|&(x, y)| Some(Point2::new(x, y)))
            .collect()
    }
}

impl SurfaceSource for SimulatedRoom {
    fn mode(&self) -> SourceMode {
        SourceMode::Simulated
    }

    fn drain(&mut self) -> Vec<SequencedEvent> {
        if self.emitted {
            return Vec::new();
        }
        self.emitted = true;

        let walls = (0..self.room.wall_count).map(|i| SurfaceEvent::Added {
            id: Self::wall_id(i),
            orientation: Orientation::Vertical,
            boundary: Self::wall_boundary(),
            pose: self.wall_pose(i),
        });
        std::iter::once(SurfaceEvent::SessionInit)
            .chain(walls)
            .zip(0u64..)
            .map(|(event, sequence)| SequencedEvent { sequence, event })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn first_drain_emits_session_and_walls_once() {
        let mut room = SimulatedRoom::new(RoomConfig::default());
        let events = room.drain();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].event, SurfaceEvent::SessionInit);
        assert!(events[1..]
            .iter()
            .all(|e| matches!(e.event, SurfaceEvent::Added { orientation: Orientation::Vertical, .. })));
        assert!(room.drain().is_empty());
    }

    #[test]
    fn walls_face_the_room_center() {
        let room = SimulatedRoom::new(RoomConfig::default());
        for i in 0..4 {
            let pose = room.wall_pose(i);
            let normal = pose.transform_direction(&Vector3::y()).unwrap_or_else(|_| Vector3::zeros());
            let to_center = -Vector3::new(pose.position.x, 0.0, pose.position.z).normalize();
            assert_relative_eq!(normal, to_center, epsilon = 1e-12);
            assert_relative_eq!(pose.position.y, 2.0);
            assert!(!pose.rotation.is_explicit());
        }
    }

    #[test]
    fn wall_spans_floor_to_twice_center_height() {
        let room = SimulatedRoom::new(RoomConfig::default());
        let pose = room.wall_pose(0);
        let bottom = pose.transform_point(&Point3::new(0.0, 0.0, -0.5));
        let top = pose.transform_point(&Point3::new(0.0, 0.0, 0.5));
        assert_relative_eq!(bottom.y.min(top.y), 0.0, epsilon = 1e-12);
        assert_relative_eq!(bottom.y.max(top.y), 4.0, epsilon = 1e-12);
        assert_relative_eq!(bottom.z, 10.0, epsilon = 1e-12);
    }
}
