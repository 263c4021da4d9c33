use crate::error::{GeometryError, Result};

use super::{Matrix4, Point3, UnitQuaternion, Vector3, TOLERANCE};

/// Rotation of a posed object.
///
/// Surfaces reported by a live tracker carry an explicit quaternion obtained
/// by decomposing the tracker's transform. Simulated surfaces are authored
/// with Euler angles and have no explicit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Explicit rotation quaternion.
    Quaternion(UnitQuaternion),
    /// Euler angles in radians about X, Y and Z, applied in that order.
    Euler(Vector3),
}

impl Rotation {
    /// Returns the rotation as a quaternion.
    #[must_use]
    pub fn to_quaternion(&self) -> UnitQuaternion {
        match self {
            Self::Quaternion(q) => *q,
            Self::Euler(angles) => UnitQuaternion::from_euler_angles(angles.x, angles.y, angles.z),
        }
    }

    /// Returns `true` if the rotation is an explicit quaternion.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Quaternion(_))
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::Euler(Vector3::zeros())
    }
}

/// Position, rotation and non-uniform scale of an object in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3,
    pub rotation: Rotation,
    pub scaling: Vector3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: Rotation::default(),
            scaling: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Pose {
    /// Creates the identity pose.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Decomposes an affine transform into scaling, an explicit rotation
    /// quaternion and a position.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SingularTransform`] if the matrix has a
    /// non-finite entry or collapses an axis to zero length.
    pub fn decompose(matrix: &Matrix4) -> Result<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::SingularTransform.into());
        }

        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let mut scaling = Vector3::new(
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        );
        if scaling.iter().any(|s| *s < TOLERANCE) {
            return Err(GeometryError::SingularTransform.into());
        }
        if linear.determinant() < 0.0 {
            scaling.x = -scaling.x;
        }

        let mut basis = linear;
        for (i, s) in scaling.iter().enumerate() {
            basis.column_mut(i).unscale_mut(*s);
        }
        let rotation = UnitQuaternion::from_rotation_matrix(
            &nalgebra::Rotation3::from_matrix_unchecked(basis),
        );

        Ok(Self {
            position: Point3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]),
            rotation: Rotation::Quaternion(rotation),
            scaling,
        })
    }

    /// Composes the world matrix as `translation * rotation * scaling`.
    #[must_use]
    pub fn world_matrix(&self) -> Matrix4 {
        Matrix4::new_translation(&self.position.coords)
            * self.rotation.to_quaternion().to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scaling)
    }

    /// Transforms a local-space point into world space.
    #[must_use]
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        self.world_matrix().transform_point(point)
    }

    /// Rotates a local-space direction into world space and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the direction collapses.
    pub fn transform_direction(&self, direction: &Vector3) -> Result<Vector3> {
        let world = self.rotation.to_quaternion() * direction.component_mul(&self.scaling);
        let len = world.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(world / len)
    }

    /// Transforms a local-space surface normal into world space using the
    /// inverse-transpose of the linear part, and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the pose has a zero scale
    /// component or the normal collapses.
    pub fn transform_normal(&self, normal: &Vector3) -> Result<Vector3> {
        if self.scaling.iter().any(|s| s.abs() < TOLERANCE) {
            return Err(GeometryError::ZeroVector.into());
        }
        let world = self.rotation.to_quaternion() * normal.component_div(&self.scaling);
        let len = world.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(world / len)
    }
}
