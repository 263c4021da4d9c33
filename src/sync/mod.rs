//! Surface event stream and the synchronizer that applies it to the
//! registry.

mod live;
mod simulated;
mod synchronizer;

pub use live::LiveSource;
pub use simulated::SimulatedRoom;
pub use synchronizer::{SurfaceSynchronizer, SyncOutcome};

use crate::config::SourceMode;
use crate::math::{Point2, Pose};
use crate::surface::{Orientation, SurfaceId};

/// A notification from a surface source.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A surface was detected for the first time.
    Added {
        id: SurfaceId,
        orientation: Orientation,
        boundary: Vec<Option<Point2>>,
        pose: Pose,
    },
    /// A known surface changed its extent or pose.
    Updated {
        id: SurfaceId,
        boundary: Vec<Option<Point2>>,
        pose: Pose,
    },
    /// A surface is no longer tracked.
    Removed { id: SurfaceId },
    /// The tracking session (re)started; every known identity is void.
    SessionInit,
}

impl SurfaceEvent {
    /// The surface this event concerns, if any.
    #[must_use]
    pub fn surface(&self) -> Option<SurfaceId> {
        match self {
            Self::Added { id, .. } | Self::Updated { id, .. } | Self::Removed { id } => Some(*id),
            Self::SessionInit => None,
        }
    }
}

/// A [`SurfaceEvent`] stamped with the source's emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedEvent {
    pub sequence: u64,
    pub event: SurfaceEvent,
}

/// Something that produces surface events: a live tracker or a simulation.
pub trait SurfaceSource {
    /// Which kind of surfaces this source produces.
    fn mode(&self) -> SourceMode;

    /// Takes every event emitted since the last call, in emission order.
    fn drain(&mut self) -> Vec<SequencedEvent>;
}
