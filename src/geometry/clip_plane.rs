use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// An oriented clipping plane `normal · p + d = 0`.
///
/// Points with a positive signed distance lie on the side the normal points
/// to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    normal: Vector3,
    d: f64,
}

impl ClipPlane {
    /// Creates a plane from raw coefficients, normalizing them.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the normal is zero-length.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let normal = Vector3::new(a, b, c);
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            normal: normal / len,
            d: d / len,
        })
    }

    /// Creates a plane from a normal that is already unit length.
    #[must_use]
    pub fn from_unit_normal(normal: Vector3, d: f64) -> Self {
        debug_assert!((normal.norm() - 1.0).abs() < 1e-9);
        Self { normal, d }
    }

    /// Creates a plane through `point` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the normal is zero-length.
    pub fn from_normal_and_point(normal: &Vector3, point: &Point3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        Ok(Self {
            normal,
            d: -normal.dot(&point.coords),
        })
    }

    /// Creates the plane through three points.
    ///
    /// The normal is `(p2 - p1) × (p3 - p1)`, so counter-clockwise points
    /// (seen from the front) yield a normal facing the viewer.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the points are collinear.
    pub fn from_points(p1: &Point3, p2: &Point3, p3: &Point3) -> Result<Self> {
        let normal = (p2 - p1).cross(&(p3 - p1));
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::Degenerate("plane points are collinear".into()).into());
        }
        let normal = normal / len;
        Ok(Self {
            normal,
            d: -normal.dot(&p1.coords),
        })
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the offset term.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.d
    }

    /// Returns `[a, b, c, d]`.
    #[must_use]
    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    /// Signed distance from the plane to `point`.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) + self.d
    }

    /// Returns the same plane with the opposite orientation.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn from_points_ccw_faces_up() {
        let plane = ClipPlane::from_points(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::new(1.0, 0.0, 1.0),
            &Point3::new(0.0, 1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(*plane.normal(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(plane.offset(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.signed_distance(&Point3::new(5.0, 5.0, 3.0)), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_points_fail() {
        let p = Point3::origin();
        assert!(ClipPlane::from_points(&p, &Point3::new(1.0, 0.0, 0.0), &Point3::new(2.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn new_normalizes_coefficients() {
        let plane = ClipPlane::new(0.0, 0.0, -2.0, -20.0).unwrap();
        assert_eq!(plane.coefficients(), [0.0, 0.0, -1.0, -10.0]);
        assert!(ClipPlane::new(0.0, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn flipped_keeps_points_on_plane() {
        let plane = ClipPlane::from_normal_and_point(&Vector3::x(), &Point3::new(3.0, 1.0, 1.0)).unwrap();
        let flipped = plane.flipped();
        assert_relative_eq!(flipped.signed_distance(&Point3::new(3.0, -4.0, 2.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(flipped.signed_distance(&Point3::new(4.0, 0.0, 0.0)), -1.0, epsilon = 1e-12);
    }
}
