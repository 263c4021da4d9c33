//! Wires a surface source, the registry, the synchronizer and the portal
//! selector together.

use tracing::debug;

use crate::config::{PortalConfig, SourceMode};
use crate::error::{RegistryError, Result};
use crate::math::Point3;
use crate::portal::{FrameState, PortalSelector};
use crate::surface::{Material, MeshId, SurfaceContext, SurfaceId, SurfaceMesh, SurfaceRegistry};
use crate::sync::{SimulatedRoom, SurfaceSource, SurfaceSynchronizer, SyncOutcome};

/// The surface tracking and portal clipping engine.
///
/// Driven from a single thread: call [`PortalEngine::pump`] whenever the
/// source may have new events, forward pointer picks to
/// [`PortalEngine::on_pick`], and sample [`PortalEngine::frame_state`] once
/// per rendered frame.
#[derive(Debug)]
pub struct PortalEngine<S> {
    config: PortalConfig,
    source: S,
    registry: SurfaceRegistry,
    synchronizer: SurfaceSynchronizer,
    selector: PortalSelector,
    auto_selected: bool,
}

impl<S: SurfaceSource> PortalEngine<S> {
    #[must_use]
    pub fn new(source: S, config: PortalConfig) -> Self {
        let mode = source.mode();
        Self {
            synchronizer: SurfaceSynchronizer::new(config.decorations.for_mode(mode)),
            selector: PortalSelector::new(mode, config.placement(mode), config.initial_clip_plane),
            registry: SurfaceRegistry::new(),
            auto_selected: false,
            config,
            source,
        }
    }

    /// The event source, e.g. to feed a [`crate::sync::LiveSource`].
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    /// What the renderer should draw the portal with this frame.
    #[must_use]
    pub fn frame_state(&self) -> &FrameState {
        self.selector.frame_state()
    }

    /// Every tracked surface with its mesh and material, for the scene graph.
    pub fn surfaces(&self) -> impl Iterator<Item = (&SurfaceContext, &SurfaceMesh, &Material)> {
        self.registry.surfaces()
    }

    /// Applies every pending source event.
    ///
    /// With the simulated room, the configured wall is selected
    /// automatically once it exists, without touching the clip plane.
    pub fn pump(&mut self) -> Vec<SyncOutcome> {
        let events = self.source.drain();
        let outcomes = self.synchronizer.handle_all(&mut self.registry, events);
        if outcomes.contains(&SyncOutcome::SessionReset) {
            self.auto_selected = false;
        }

        if self.source.mode() == SourceMode::Simulated && !self.auto_selected {
            let wall = SimulatedRoom::wall_id(self.config.room.auto_select_wall);
            let position = self
                .registry
                .get(wall)
                .and_then(|ctx| self.registry.mesh(ctx.mesh()))
                .map(|mesh| mesh.pose.position);
            if let Some(position) = position {
                match self.select_surface(wall, position, false) {
                    Ok(()) => self.auto_selected = true,
                    Err(e) => debug!(surface = %wall, error = %e, "automatic selection failed"),
                }
            }
        }

        outcomes
    }

    /// Handles a pointer pick on a surface mesh at a world-space point.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMesh`] if the mesh belongs to no live
    /// surface, or a selection error if the surface cannot host the portal.
    /// The frame state is unchanged in both cases.
    pub fn on_pick(&mut self, mesh: MeshId, point: Point3) -> Result<()> {
        let Some(id) = self.registry.lookup_by_mesh(mesh).map(SurfaceContext::id) else {
            debug!(?mesh, "picked mesh is not a tracked surface");
            return Err(RegistryError::UnknownMesh.into());
        };
        let update_clip_plane = self.source.mode() == SourceMode::Live;
        self.select_surface(id, point, update_clip_plane)
    }

    /// Selects a surface by identity as the portal anchor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSurface`] if `id` is not tracked, or a
    /// selection error if the surface cannot host the portal.
    pub fn select_surface(
        &mut self,
        id: SurfaceId,
        contact: Point3,
        update_clip_plane: bool,
    ) -> Result<()> {
        let context = self
            .registry
            .get(id)
            .ok_or(RegistryError::UnknownSurface(id))?;
        let mesh = self
            .registry
            .mesh(context.mesh())
            .ok_or(RegistryError::UnknownMesh)?;
        self.selector.select(context, mesh, contact, update_clip_plane)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{Point3 as P3, Pose, Rotation, UnitQuaternion, Vector3};
    use crate::sync::LiveSource;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn plane_points(coords: &[(f64, f64)]) -> Vec<Option<P3>> {
        coords.iter().map(|&(x, z)| Some(P3::new(x, 0.0, z))).collect()
    }

    /// Tracker transform that stands a plane-space square up in z = 0.
    fn wall_transform() -> crate::math::Matrix4 {
        Pose {
            rotation: Rotation::Quaternion(UnitQuaternion::from_euler_angles(-FRAC_PI_2, 0.0, 0.0)),
            ..Pose::identity()
        }
        .world_matrix()
    }

    #[test]
    fn live_end_to_end() {
        init_tracing();
        let mut engine = PortalEngine::new(LiveSource::new(), PortalConfig::default());
        let s1 = SurfaceId(1);

        engine
            .source_mut()
            .surface_added(
                s1,
                "vertical",
                &plane_points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
                &wall_transform(),
            )
            .unwrap();
        engine.pump();
        assert_eq!(engine.registry().len(), 1);
        let first = engine.registry().get(s1).unwrap().clone();

        engine.on_pick(first.mesh(), P3::new(0.5, 0.5, 0.0)).unwrap();
        let state = *engine.frame_state();
        assert_relative_eq!(state.transform.position, P3::new(0.5, 0.5, 0.0));
        let normal = *state.clip_plane.normal();
        assert_relative_eq!(normal.dot(&Vector3::x()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal.dot(&Vector3::y()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-12);

        engine
            .source_mut()
            .surface_updated(
                s1,
                &plane_points(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
                &wall_transform(),
            )
            .unwrap();
        engine.pump();
        let second = engine.registry().get(s1).unwrap().clone();
        assert_ne!(second.mesh(), first.mesh());
        assert_eq!(second.material(), first.material());
        assert_eq!(*engine.frame_state(), state);

        engine.source_mut().surface_removed(s1);
        engine.pump();
        assert!(engine.registry().is_empty());
        assert!(engine.registry().lookup_by_mesh(second.mesh()).is_none());
        assert!(engine.on_pick(second.mesh(), P3::origin()).is_err());
        assert_eq!(*engine.frame_state(), state);
    }

    #[test]
    fn picking_horizontal_surface_leaves_frame_alone() {
        let mut engine = PortalEngine::new(LiveSource::new(), PortalConfig::default());
        engine
            .source_mut()
            .surface_added(
                SurfaceId(4),
                "horizontal",
                &plane_points(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0)]),
                &crate::math::Matrix4::identity(),
            )
            .unwrap();
        engine.pump();
        let before = *engine.frame_state();
        let mesh = engine.registry().get(SurfaceId(4)).unwrap().mesh();

        assert!(engine.on_pick(mesh, P3::new(1.0, 0.0, 1.0)).is_err());
        assert_eq!(*engine.frame_state(), before);
    }

    #[test]
    fn degenerate_update_keeps_pickable_mesh() {
        let mut engine = PortalEngine::new(LiveSource::new(), PortalConfig::default());
        let square = plane_points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        engine
            .source_mut()
            .surface_added(SurfaceId(1), "Vertical", &square, &wall_transform())
            .unwrap();
        engine.pump();
        let mesh = engine.registry().get(SurfaceId(1)).unwrap().mesh();

        let mut broken = square.clone();
        broken[1] = None;
        engine
            .source_mut()
            .surface_updated(SurfaceId(1), &broken, &wall_transform())
            .unwrap();
        assert_eq!(engine.pump(), vec![SyncOutcome::Ignored]);
        assert_eq!(engine.registry().get(SurfaceId(1)).unwrap().mesh(), mesh);
        assert!(engine.on_pick(mesh, P3::new(0.5, 0.5, 0.0)).is_ok());
    }

    #[test]
    fn session_restart_drops_surfaces() {
        let mut engine = PortalEngine::new(LiveSource::new(), PortalConfig::default());
        let square = plane_points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        for id in 0..3 {
            engine
                .source_mut()
                .surface_added(SurfaceId(id), "vertical", &square, &wall_transform())
                .unwrap();
        }
        engine.pump();
        assert_eq!(engine.surfaces().count(), 3);

        engine.source_mut().session_started();
        engine.pump();
        assert!(engine.registry().is_empty());
        assert_eq!(engine.registry().mesh_count(), 0);
        assert_eq!(engine.registry().material_count(), 0);
    }

    #[test]
    fn simulated_room_auto_selects_wall() {
        init_tracing();
        let config = PortalConfig::default();
        let mut engine = PortalEngine::new(SimulatedRoom::new(config.room), config);
        let outcomes = engine.pump();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(engine.registry().len(), 4);

        for (ctx, _, material) in engine.surfaces() {
            assert!(ctx.is_vertical());
            assert_eq!(*material, Material::translucent());
        }

        let state = *engine.frame_state();
        assert_eq!(state.anchor, Some(SurfaceId(2)));
        assert_relative_eq!(state.transform.position, P3::new(0.0, 2.0, -10.0), epsilon = 1e-9);
        assert_relative_eq!(state.transform.scaling, Vector3::new(4.0, 4.0, 4.0));
        assert!(!state.transform.rotation.is_explicit());
        assert_eq!(state.clip_plane, config.initial_clip_plane);

        // Nothing further happens on later pumps.
        assert!(engine.pump().is_empty());
        assert_eq!(*engine.frame_state(), state);
    }

    #[test]
    fn simulated_pick_updates_clip_plane_only_in_live_mode() {
        let config = PortalConfig::default();
        let mut engine = PortalEngine::new(SimulatedRoom::new(config.room), config);
        engine.pump();
        let mesh = engine.registry().get(SurfaceId(0)).unwrap().mesh();

        engine.on_pick(mesh, P3::new(3.0, 1.0, 10.0)).unwrap();
        let state = engine.frame_state();
        assert_eq!(state.anchor, Some(SurfaceId(0)));
        assert_relative_eq!(state.transform.position, P3::new(3.0, 2.0, 10.0));
        assert_eq!(state.clip_plane, config.initial_clip_plane);
    }
}
