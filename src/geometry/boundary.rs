use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{distinct_vertex_count, is_closed, signed_area_2d};
use crate::math::{Point2, TOLERANCE};

/// A validated, closed polygon describing a surface's extent in its own
/// tracking plane.
///
/// The last point always repeats the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    points: Vec<Point2>,
}

impl Boundary {
    /// Validates a reported boundary and closes it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if any point is missing or
    /// non-finite, if fewer than three distinct points remain, or if the
    /// polygon encloses no area.
    pub fn new(raw: &[Option<Point2>]) -> Result<Self> {
        let mut points = Vec::with_capacity(raw.len() + 1);
        for (i, pt) in raw.iter().enumerate() {
            let Some(pt) = pt else {
                return Err(GeometryError::Degenerate(format!("boundary point {i} is missing")).into());
            };
            if !pt.x.is_finite() || !pt.y.is_finite() {
                return Err(
                    GeometryError::Degenerate(format!("boundary point {i} is not finite")).into(),
                );
            }
            points.push(*pt);
        }

        if distinct_vertex_count(&points) < 3 {
            return Err(
                GeometryError::Degenerate("boundary needs at least 3 distinct points".into())
                    .into(),
            );
        }
        if signed_area_2d(&points).abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("boundary encloses no area".into()).into());
        }

        if !is_closed(&points) {
            points.push(points[0]);
        }
        Ok(Self { points })
    }

    /// Returns the closed point sequence, including the closing duplicate.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Returns the point sequence without the closing duplicate.
    #[must_use]
    pub fn open_points(&self) -> &[Point2] {
        &self.points[..self.points.len() - 1]
    }

    /// Signed area of the enclosed region.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.points)
    }
}
