//! Running axis-aligned bounding box over stroke points.

use serde::{Deserialize, Serialize};

/// Min/max extents of every point folded in so far.
///
/// Seeded at `(+∞, +∞, −∞, −∞)` so the first point sets all four sides.
/// An empty box keeps those infinities; check [`BoundingBox::is_empty`]
/// before deriving a size from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub const fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Extend the box to contain `(x, y)`.
    pub fn add_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// True until a point has been added.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl FromIterator<(f64, f64)> for BoundingBox {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut bbox = Self::empty();
        for (x, y) in iter {
            bbox.add_point(x, y);
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_infinite() {
        let b = BoundingBox::empty();
        assert!(b.is_empty());
        assert_eq!(b.min_x, f64::INFINITY);
        assert_eq!(b.max_y, f64::NEG_INFINITY);
    }

    #[test]
    fn first_point_sets_all_sides() {
        let mut b = BoundingBox::empty();
        b.add_point(3.5, -2.0);
        assert!(!b.is_empty());
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (3.5, -2.0, 3.5, -2.0));
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
    }

    #[test]
    fn reproduces_exact_extrema() {
        let points = [(12.25, 7.0), (-4.5, 30.125), (100.0, -0.75), (0.1, 0.2)];
        let b: BoundingBox = points.iter().copied().collect();
        assert_eq!(b.min_x, -4.5);
        assert_eq!(b.max_x, 100.0);
        assert_eq!(b.min_y, -0.75);
        assert_eq!(b.max_y, 30.125);
        assert_eq!(b.width(), 104.5);
        assert_eq!(b.height(), 30.875);
    }
}
