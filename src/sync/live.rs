use std::collections::VecDeque;

use tracing::warn;

use crate::config::SourceMode;
use crate::math::{Matrix4, Point2, Point3, Pose};
use crate::surface::{Orientation, SurfaceId};
use crate::Result;

use super::{SequencedEvent, SurfaceEvent, SurfaceSource};

/// Queue fed by a live surface detector.
///
/// The detector reports plane-space boundaries as 3D points (only x and z
/// are meaningful) and a tracking-space transform per surface. Events are
/// numbered in the order they are pushed unless the detector supplies its
/// own sequence numbers via [`LiveSource::push`].
#[derive(Debug, Default)]
pub struct LiveSource {
    queue: VecDeque<SequencedEvent>,
    next_sequence: u64,
}

impl LiveSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an event with an explicit sequence number.
    pub fn push(&mut self, event: SequencedEvent) {
        self.next_sequence = self.next_sequence.max(event.sequence.saturating_add(1));
        self.queue.push_back(event);
    }

    /// Reports a newly detected surface.
    ///
    /// # Errors
    ///
    /// Returns an error if `transform` cannot be decomposed; nothing is
    /// enqueued in that case.
    pub fn surface_added(
        &mut self,
        id: SurfaceId,
        orientation: &str,
        boundary: &[Option<Point3>],
        transform: &Matrix4,
    ) -> Result<()> {
        let pose = decompose_or_warn(id, transform)?;
        self.enqueue(SurfaceEvent::Added {
            id,
            orientation: Orientation::classify(orientation),
            boundary: project_onto_plane(boundary),
            pose,
        });
        Ok(())
    }

    /// Reports a refreshed boundary or pose for a known surface.
    ///
    /// # Errors
    ///
    /// Returns an error if `transform` cannot be decomposed; nothing is
    /// enqueued in that case.
    pub fn surface_updated(
        &mut self,
        id: SurfaceId,
        boundary: &[Option<Point3>],
        transform: &Matrix4,
    ) -> Result<()> {
        let pose = decompose_or_warn(id, transform)?;
        self.enqueue(SurfaceEvent::Updated {
            id,
            boundary: project_onto_plane(boundary),
            pose,
        });
        Ok(())
    }

    /// Reports that a surface is gone.
    pub fn surface_removed(&mut self, id: SurfaceId) {
        self.enqueue(SurfaceEvent::Removed { id });
    }

    /// Reports that the tracking session (re)started.
    pub fn session_started(&mut self) {
        self.enqueue(SurfaceEvent::SessionInit);
    }

    fn enqueue(&mut self, event: SurfaceEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push_back(SequencedEvent { sequence, event });
    }
}

impl SurfaceSource for LiveSource {
    fn mode(&self) -> SourceMode {
        SourceMode::Live
    }

    fn drain(&mut self) -> Vec<SequencedEvent> {
        self.queue.drain(..).collect()
    }
}

fn decompose_or_warn(id: SurfaceId, transform: &Matrix4) -> Result<Pose> {
    Pose::decompose(transform).inspect_err(|e| {
        warn!(surface = %id, error = %e, "dropping surface event with unusable transform");
    })
}

/// Maps plane-space points onto the boundary's 2D (x, z) coordinates.
fn project_onto_plane(points: &[Option<Point3>]) -> Vec<Option<Point2>> {
    points
        .iter()
        .map(|p| p.map(|p| Point2::new(p.x, p.z)))
        .collect()
}
