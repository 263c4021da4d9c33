use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{PortalError, RegistryError};
use crate::session::SessionLifecycle;
use crate::surface::{Material, SurfaceId, SurfaceKey, SurfaceRegistry};

use super::{SequencedEvent, SurfaceEvent};

/// What a single event did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created(SurfaceKey),
    Rebuilt(SurfaceKey),
    Removed(SurfaceId),
    SessionReset,
    /// The event was absorbed without changing anything.
    Ignored,
}

/// Applies surface events to a [`SurfaceRegistry`].
///
/// Every failure is absorbed here: degenerate boundaries, unknown surfaces
/// and out-of-order events leave the registry as it was. Events for one
/// identity must carry increasing sequence numbers; anything at or below the
/// last sequence seen for that identity is dropped.
#[derive(Debug)]
pub struct SurfaceSynchronizer {
    decoration: Material,
    last_sequence: HashMap<SurfaceId, u64>,
    session: SessionLifecycle,
}

impl SurfaceSynchronizer {
    /// Creates a synchronizer that decorates new surfaces with `decoration`.
    #[must_use]
    pub fn new(decoration: Material) -> Self {
        Self {
            decoration,
            last_sequence: HashMap::new(),
            session: SessionLifecycle::default(),
        }
    }

    /// Session bookkeeping.
    #[must_use]
    pub fn session(&self) -> &SessionLifecycle {
        &self.session
    }

    /// Applies one event.
    pub fn handle(&mut self, registry: &mut SurfaceRegistry, event: SequencedEvent) -> SyncOutcome {
        let SequencedEvent { sequence, event } = event;

        if let Some(id) = event.surface() {
            if self.is_stale(id, sequence) {
                warn!(surface = %id, sequence, "dropping out-of-order surface event");
                return SyncOutcome::Ignored;
            }
            self.last_sequence.insert(id, sequence);
        }

        match event {
            SurfaceEvent::Added {
                id,
                orientation,
                boundary,
                pose,
            } => {
                let existed = registry.contains(id);
                match registry.upsert(id, orientation, &boundary, pose, self.decoration) {
                    Ok(key) if existed => SyncOutcome::Rebuilt(key),
                    Ok(key) => SyncOutcome::Created(key),
                    Err(e) => absorb(id, &e),
                }
            }
            SurfaceEvent::Updated { id, boundary, pose } => {
                match registry.rebuild(id, &boundary, pose) {
                    Ok(key) => SyncOutcome::Rebuilt(key),
                    Err(e) => absorb(id, &e),
                }
            }
            SurfaceEvent::Removed { id } => {
                if registry.remove(id) {
                    SyncOutcome::Removed(id)
                } else {
                    debug!(surface = %id, "remove for unknown surface ignored");
                    SyncOutcome::Ignored
                }
            }
            SurfaceEvent::SessionInit => {
                self.session.on_session_init(registry, &mut self.last_sequence);
                SyncOutcome::SessionReset
            }
        }
    }

    /// Applies a batch of events in order.
    pub fn handle_all(
        &mut self,
        registry: &mut SurfaceRegistry,
        events: impl IntoIterator<Item = SequencedEvent>,
    ) -> Vec<SyncOutcome> {
        events
            .into_iter()
            .map(|event| self.handle(registry, event))
            .collect()
    }

    fn is_stale(&self, id: SurfaceId, sequence: u64) -> bool {
        self.last_sequence
            .get(&id)
            .is_some_and(|last| sequence <= *last)
    }
}

fn absorb(id: SurfaceId, error: &PortalError) -> SyncOutcome {
    match error {
        PortalError::Registry(RegistryError::UnknownSurface(_)) => {
            debug!(surface = %id, "update for unknown surface ignored");
        }
        _ => debug!(surface = %id, %error, "keeping previous surface geometry"),
    }
    SyncOutcome::Ignored
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Pose};
    use crate::surface::Orientation;

    fn rect(w: f64) -> Vec<Option<Point2>> {
        [(0.0, 0.0), (w, 0.0), (w, 1.0), (0.0, 1.0), (0.0, 0.0)]
            .iter()
            .map(|&(x, y)| Some(Point2::new(x, y)))
            .collect()
    }

    fn added(sequence: u64, id: u64, orientation: Orientation) -> SequencedEvent {
        SequencedEvent {
            sequence,
            event: SurfaceEvent::Added {
                id: SurfaceId(id),
                orientation,
                boundary: rect(1.0),
                pose: Pose::identity(),
            },
        }
    }

    fn updated(sequence: u64, id: u64, boundary: Vec<Option<Point2>>) -> SequencedEvent {
        SequencedEvent {
            sequence,
            event: SurfaceEvent::Updated {
                id: SurfaceId(id),
                boundary,
                pose: Pose::identity(),
            },
        }
    }

    fn removed(sequence: u64, id: u64) -> SequencedEvent {
        SequencedEvent {
            sequence,
            event: SurfaceEvent::Removed { id: SurfaceId(id) },
        }
    }

    #[test]
    fn add_update_remove_cycle() {
        let mut registry = SurfaceRegistry::new();
        let mut sync = SurfaceSynchronizer::new(Material::translucent());

        assert!(matches!(
            sync.handle(&mut registry, added(0, 1, Orientation::Vertical)),
            SyncOutcome::Created(_)
        ));
        let material = registry.get(SurfaceId(1)).unwrap().material();
        assert_eq!(registry.material(material), Some(&Material::translucent()));

        assert!(matches!(
            sync.handle(&mut registry, updated(1, 1, rect(2.0))),
            SyncOutcome::Rebuilt(_)
        ));
        assert_eq!(registry.get(SurfaceId(1)).unwrap().material(), material);

        assert_eq!(
            sync.handle(&mut registry, removed(2, 1)),
            SyncOutcome::Removed(SurfaceId(1))
        );
        assert!(registry.is_empty());
        assert_eq!(registry.material_count(), 0);
    }

    #[test]
    fn degenerate_update_is_absorbed() {
        let mut registry = SurfaceRegistry::new();
        let mut sync = SurfaceSynchronizer::new(Material::pass_through());
        sync.handle(&mut registry, added(0, 1, Orientation::Vertical));
        let mesh = registry.get(SurfaceId(1)).unwrap().mesh();

        let mut broken = rect(3.0);
        broken[1] = None;
        assert_eq!(sync.handle(&mut registry, updated(1, 1, broken)), SyncOutcome::Ignored);
        assert_eq!(registry.get(SurfaceId(1)).unwrap().mesh(), mesh);
    }

    #[test]
    fn unknown_update_and_remove_are_ignored() {
        let mut registry = SurfaceRegistry::new();
        let mut sync = SurfaceSynchronizer::new(Material::pass_through());
        assert_eq!(sync.handle(&mut registry, updated(0, 5, rect(1.0))), SyncOutcome::Ignored);
        assert_eq!(sync.handle(&mut registry, removed(1, 5)), SyncOutcome::Ignored);
        assert!(registry.is_empty());
    }

    #[test]
    fn stale_events_are_dropped() {
        let mut registry = SurfaceRegistry::new();
        let mut sync = SurfaceSynchronizer::new(Material::pass_through());
        sync.handle(&mut registry, added(0, 1, Orientation::Vertical));
        sync.handle(&mut registry, removed(2, 1));

        // A late update delivered after the remove must not resurrect anything.
        assert_eq!(sync.handle(&mut registry, updated(1, 1, rect(2.0))), SyncOutcome::Ignored);
        assert_eq!(
            sync.handle(&mut registry, added(1, 1, Orientation::Vertical)),
            SyncOutcome::Ignored
        );
        assert!(registry.is_empty());

        assert!(matches!(
            sync.handle(&mut registry, added(3, 1, Orientation::Vertical)),
            SyncOutcome::Created(_)
        ));
    }

    #[test]
    fn session_init_clears_registry_and_sequence_cache() {
        let mut registry = SurfaceRegistry::new();
        let mut sync = SurfaceSynchronizer::new(Material::pass_through());
        let outcomes = sync.handle_all(
            &mut registry,
            vec![
                added(10, 1, Orientation::Vertical),
                added(11, 2, Orientation::Horizontal),
                SequencedEvent {
                    sequence: 12,
                    event: SurfaceEvent::SessionInit,
                },
            ],
        );
        assert_eq!(outcomes[2], SyncOutcome::SessionReset);
        assert!(registry.is_empty());
        assert_eq!(registry.mesh_count(), 0);
        assert_eq!(sync.session().sessions_started(), 1);

        // A new session may restart numbering from zero.
        assert!(matches!(
            sync.handle(&mut registry, added(0, 1, Orientation::Vertical)),
            SyncOutcome::Created(_)
        ));
    }

    #[test]
    fn live_count_matches_script() {
        let mut registry = SurfaceRegistry::new();
        let mut sync = SurfaceSynchronizer::new(Material::pass_through());
        let script = [
            (added(0, 1, Orientation::Vertical), 1),
            (added(1, 2, Orientation::Horizontal), 2),
            (updated(2, 1, rect(4.0)), 2),
            (removed(3, 2), 1),
            (added(4, 3, Orientation::Vertical), 2),
            (removed(5, 1), 1),
            (removed(6, 3), 0),
        ];
        for (event, expected) in script {
            sync.handle(&mut registry, event);
            assert_eq!(registry.len(), expected);
            assert_eq!(registry.mesh_count(), expected);
        }
    }
}
