use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::geometry::Boundary;
use crate::math::{Point2, Pose};
use crate::tessellation::{TessellateBoundary, TriangleMesh};

use super::{
    Material, MaterialId, MeshId, Orientation, SurfaceContext, SurfaceId, SurfaceKey, SurfaceMesh,
};

/// Owns every tracked surface together with its mesh and material.
///
/// Surfaces are addressed by their external [`SurfaceId`]; meshes map back to
/// their owning surface so pick events can be resolved. A mesh removed from
/// the arena never resolves again, since its generational key goes stale.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    contexts: SlotMap<SurfaceKey, SurfaceContext>,
    by_identity: HashMap<SurfaceId, SurfaceKey>,
    meshes: SlotMap<MeshId, SurfaceMesh>,
    by_mesh: SecondaryMap<MeshId, SurfaceKey>,
    materials: SlotMap<MaterialId, Material>,
}

impl SurfaceRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the surface if `id` is unknown, otherwise rebuilds its
    /// geometry.
    ///
    /// On creation the orientation is classified once and `material` is
    /// installed. On rebuild both `orientation` and `material` are ignored:
    /// the surface keeps its original classification and material.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the boundary is degenerate. The registry is
    /// left untouched in that case.
    pub fn upsert(
        &mut self,
        id: SurfaceId,
        orientation: Orientation,
        boundary: &[Option<Point2>],
        pose: Pose,
        material: Material,
    ) -> Result<SurfaceKey> {
        if self.by_identity.contains_key(&id) {
            return self.rebuild(id, boundary, pose);
        }

        let geometry = build_geometry(boundary)?;

        let material_id = self.materials.insert(material);
        let mesh_id = self.meshes.insert(SurfaceMesh {
            name: orientation.mesh_name(),
            geometry,
            pose,
            material: material_id,
        });
        let key = self.contexts.insert(SurfaceContext {
            id,
            orientation,
            mesh: mesh_id,
            material: material_id,
        });
        self.by_identity.insert(id, key);
        self.by_mesh.insert(mesh_id, key);

        debug!(surface = %id, ?orientation, "surface created");
        Ok(key)
    }

    /// Replaces the geometry of a known surface, keeping its material.
    ///
    /// The old mesh is disposed and its reverse entry removed; the new mesh
    /// takes its place.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSurface`] if `id` is not tracked, or a
    /// geometry error if the boundary is degenerate. Either way the registry
    /// is left untouched.
    pub fn rebuild(
        &mut self,
        id: SurfaceId,
        boundary: &[Option<Point2>],
        pose: Pose,
    ) -> Result<SurfaceKey> {
        let key = *self
            .by_identity
            .get(&id)
            .ok_or(RegistryError::UnknownSurface(id))?;
        let geometry = build_geometry(boundary)?;

        let context = self
            .contexts
            .get_mut(key)
            .ok_or(RegistryError::UnknownSurface(id))?;
        let new_mesh = self.meshes.insert(SurfaceMesh {
            name: context.orientation.mesh_name(),
            geometry,
            pose,
            material: context.material,
        });
        let old_mesh = std::mem::replace(&mut context.mesh, new_mesh);

        self.by_mesh.remove(old_mesh);
        self.meshes.remove(old_mesh);
        self.by_mesh.insert(new_mesh, key);

        debug!(surface = %id, "surface geometry rebuilt");
        Ok(key)
    }

    /// Disposes the surface's mesh and material and forgets it.
    ///
    /// Returns `false` if `id` was not tracked.
    pub fn remove(&mut self, id: SurfaceId) -> bool {
        let Some(key) = self.by_identity.remove(&id) else {
            return false;
        };
        if let Some(context) = self.contexts.remove(key) {
            self.dispose(&context);
        }
        debug!(surface = %id, "surface removed");
        true
    }

    /// Disposes every surface and empties all mappings.
    pub fn clear(&mut self) {
        let count = self.contexts.len();
        for (_, context) in self.contexts.drain() {
            self.by_mesh.remove(context.mesh);
            self.meshes.remove(context.mesh);
            self.materials.remove(context.material);
        }
        self.by_identity.clear();
        debug_assert!(self.meshes.is_empty() && self.materials.is_empty());
        debug!(count, "registry cleared");
    }

    /// Resolves the surface that owns `mesh`.
    #[must_use]
    pub fn lookup_by_mesh(&self, mesh: MeshId) -> Option<&SurfaceContext> {
        self.by_mesh.get(mesh).and_then(|key| self.contexts.get(*key))
    }

    /// Returns the context tracked for `id`.
    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&SurfaceContext> {
        self.by_identity.get(&id).and_then(|key| self.contexts.get(*key))
    }

    /// Returns the context behind `key`.
    #[must_use]
    pub fn context(&self, key: SurfaceKey) -> Option<&SurfaceContext> {
        self.contexts.get(key)
    }

    /// Returns `true` if `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.by_identity.contains_key(&id)
    }

    /// Returns a live mesh.
    #[must_use]
    pub fn mesh(&self, id: MeshId) -> Option<&SurfaceMesh> {
        self.meshes.get(id)
    }

    /// Returns a live material.
    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Number of tracked surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    /// Returns `true` if no surface is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    /// Number of live meshes.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of live materials.
    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Iterates over every surface with its current mesh and material, for
    /// inclusion in the scene graph.
    pub fn surfaces(&self) -> impl Iterator<Item = (&SurfaceContext, &SurfaceMesh, &Material)> {
        self.contexts.values().filter_map(|context| {
            let mesh = self.meshes.get(context.mesh)?;
            let material = self.materials.get(context.material)?;
            Some((context, mesh, material))
        })
    }

    fn dispose(&mut self, context: &SurfaceContext) {
        self.by_mesh.remove(context.mesh);
        self.meshes.remove(context.mesh);
        self.materials.remove(context.material);
    }
}

fn build_geometry(boundary: &[Option<Point2>]) -> Result<TriangleMesh> {
    let boundary = Boundary::new(boundary)?;
    TessellateBoundary::new(&boundary).execute()
}
