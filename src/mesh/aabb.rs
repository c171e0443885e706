//! Axis-aligned bounding boxes.

use log::warn;
use nalgebra::Point3;

/// An axis-aligned bounding box in 3D.
///
/// Used by viewers to position the camera: [`Aabb::center`] is the look-at
/// point and [`Aabb::radius`] the framing distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Compute the bounding box of a set of points.
    ///
    /// An empty set yields a degenerate box at the origin and logs a warning.
    pub fn from_points<'a, P>(points: P) -> Self
    where
        P: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = match iter.next() {
            Some(p) => *p,
            None => {
                warn!("bounding box requested for empty point set");
                return Self {
                    min: Point3::origin(),
                    max: Point3::origin(),
                };
            }
        };

        let mut min = first;
        let mut max = first;
        for p in iter {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Self { min, max }
    }

    /// The center of the box.
    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Half the length of the box diagonal.
    pub fn radius(&self) -> f64 {
        0.5 * (self.max - self.min).norm()
    }
}
