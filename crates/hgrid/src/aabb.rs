//! World-space axis-aligned bounding boxes.

use nalgebra::{Point3, Vector3};

/// An axis-aligned bounding box in world coordinates.
///
/// # Example
///
/// ```
/// use hgrid::Aabb;
/// use nalgebra::Point3;
///
/// let aabb = Aabb::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 10.0, 10.0),
/// );
///
/// assert!(aabb.contains(&Point3::new(5.0, 5.0, 5.0)));
/// assert!(!aabb.contains(&Point3::new(15.0, 5.0, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a new AABB from minimum and maximum corners.
    ///
    /// The corners are automatically reordered if necessary.
    ///
    /// # Example
    ///
    /// ```
    /// use hgrid::Aabb;
    /// use nalgebra::Point3;
    ///
    /// // Corners can be specified in any order
    /// let aabb = Aabb::new(
    ///     Point3::new(10.0, 10.0, 10.0),
    ///     Point3::new(0.0, 0.0, 0.0),
    /// );
    /// assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
    /// assert_eq!(aabb.max, Point3::new(10.0, 10.0, 10.0));
    /// ```
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates a cubic AABB from its minimum corner and a linear size.
    ///
    /// # Example
    ///
    /// ```
    /// use hgrid::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::from_corner_size(Point3::new(1.0, 2.0, 3.0), 4.0);
    /// assert_eq!(aabb.max, Point3::new(5.0, 6.0, 7.0));
    /// ```
    #[must_use]
    pub fn from_corner_size(corner: Point3<f64>, size: f64) -> Self {
        Self {
            min: corner,
            max: Point3::new(corner.x + size, corner.y + size, corner.z + size),
        }
    }

    /// Returns the full size (dimensions) of the AABB.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns the largest extent among the three axes.
    ///
    /// This is the extent the grid uses to pick a resolution level for
    /// a non-cubic box.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Returns the center point of the AABB.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Checks if a point is inside the AABB.
    ///
    /// Points on the boundary are considered inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Checks if this AABB intersects another AABB.
    ///
    /// Boxes that merely touch on a face, edge, or corner count as
    /// intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new_auto_order() {
        let aabb = Aabb::new(Point3::new(5.0, -1.0, 3.0), Point3::new(1.0, 2.0, 0.0));
        assert_eq!(aabb.min, Point3::new(1.0, -1.0, 0.0));
        assert_eq!(aabb.max, Point3::new(5.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_corner_size() {
        let aabb = Aabb::from_corner_size(Point3::new(1.0, 2.0, 3.0), 2.0);
        assert_eq!(aabb.min, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.max, Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_size_and_max_extent() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 5.0, 3.0));
        assert_eq!(aabb.size(), nalgebra::Vector3::new(2.0, 5.0, 3.0));
        assert_eq!(aabb.max_extent(), 5.0);
    }

    #[test]
    fn test_center() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 6.0, 8.0));
        assert_eq!(aabb.center(), Point3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_center_of_offset_box() {
        let aabb = Aabb::from_corner_size(Point3::new(0.1, 0.2, 0.3), 0.3);
        let center = aabb.center();
        approx::assert_relative_eq!(center.x, 0.25);
        approx::assert_relative_eq!(center.y, 0.35);
        approx::assert_relative_eq!(center.z, 0.45);
    }

    #[test]
    fn test_contains_boundary() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(aabb.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!aabb.contains(&Point3::new(1.0, 1.0, 1.1)));
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let b = Aabb::new(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0));
        let c = Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_intersects_touching() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
    }
}
