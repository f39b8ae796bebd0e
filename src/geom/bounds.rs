// Copyright 2016-2018 Matthew D. Michelotti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::geom::{v2, Vec2};

/// Tolerance, in world units, within which boxes that do not quite touch are
/// still treated as overlapping. Keeps content near a shared node border
/// reachable from both sides.
pub const ERROR_BOUNDARY: f64 = 2.0;

/// An axis-aligned bounding box given by its top-left and bottom-right corners.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct BoundingBox {
    /// Top-left (minimum) corner.
    pub tl: Vec2,
    /// Bottom-right (maximum) corner.
    pub br: Vec2,
}

impl BoundingBox {
    /// Constructs a new box from its corners.
    #[inline]
    pub fn new(tl: Vec2, br: Vec2) -> BoundingBox {
        BoundingBox { tl, br }
    }

    /// The square box of half-width `radius` centred on `centre`.
    pub fn around(centre: Vec2, radius: f64) -> BoundingBox {
        BoundingBox::new(v2(centre.x - radius, centre.y - radius), v2(centre.x + radius, centre.y + radius))
    }

    /// The smallest box containing both points.
    pub fn spanning(a: Vec2, b: Vec2) -> BoundingBox {
        BoundingBox::new(v2(a.x.min(b.x), a.y.min(b.y)), v2(a.x.max(b.x), a.y.max(b.y)))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.br.x - self.tl.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.br.y - self.tl.y
    }

    #[inline]
    pub fn centre(&self) -> Vec2 {
        v2((self.tl.x + self.br.x) * 0.5, (self.tl.y + self.br.y) * 0.5)
    }

    /// Returns the box grown by `amount` on every side.
    pub fn padded(&self, amount: f64) -> BoundingBox {
        BoundingBox::new(self.tl - v2(amount, amount), self.br + v2(amount, amount))
    }

    /// Closed containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.tl.x && point.x <= self.br.x && point.y >= self.tl.y && point.y <= self.br.y
    }

    /// Separating axis test between two boxes, allowing `ERROR_BOUNDARY` of slack.
    ///
    /// Returns true only if the boxes are apart by more than the slack on some axis.
    pub fn separated(&self, other: &BoundingBox) -> bool {
        self.tl.x - ERROR_BOUNDARY > other.br.x
            || self.tl.y - ERROR_BOUNDARY > other.br.y
            || other.tl.x - ERROR_BOUNDARY > self.br.x
            || other.tl.y - ERROR_BOUNDARY > self.br.y
    }

    /// Index of the quadrant containing `point`: bit 0 set for the right half,
    /// bit 1 set for the bottom half.
    pub fn child_index(&self, point: Vec2) -> usize {
        let centre = self.centre();
        let mut child = 0;
        if point.x > centre.x {
            child |= 1;
        }
        if point.y > centre.y {
            child |= 2;
        }
        child
    }

    /// The box of quadrant `child`, indexed as in `child_index`.
    pub fn quadrant(&self, child: usize) -> BoundingBox {
        let centre = self.centre();
        let (x1, x2) = if child & 1 != 0 { (centre.x, self.br.x) } else { (self.tl.x, centre.x) };
        let (y1, y2) = if child & 2 != 0 { (centre.y, self.br.y) } else { (self.tl.y, centre.y) };
        BoundingBox::new(v2(x1, y1), v2(x2, y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separated() {
        let a = BoundingBox::new(v2(0.0, 0.0), v2(10.0, 10.0));
        assert!(!a.separated(&BoundingBox::new(v2(5.0, 5.0), v2(20.0, 20.0))));
        assert!(!a.separated(&BoundingBox::new(v2(11.5, 0.0), v2(20.0, 10.0))));
        assert!(a.separated(&BoundingBox::new(v2(12.5, 0.0), v2(20.0, 10.0))));
        assert!(a.separated(&BoundingBox::new(v2(0.0, -20.0), v2(10.0, -2.5))));
        assert!(!a.separated(&BoundingBox::new(v2(0.0, -20.0), v2(10.0, -1.5))));
    }

    #[test]
    fn test_quadrants() {
        let bounds = BoundingBox::new(v2(-4.0, -2.0), v2(4.0, 6.0));
        assert_eq!(bounds.quadrant(0), BoundingBox::new(v2(-4.0, -2.0), v2(0.0, 2.0)));
        assert_eq!(bounds.quadrant(1), BoundingBox::new(v2(0.0, -2.0), v2(4.0, 2.0)));
        assert_eq!(bounds.quadrant(2), BoundingBox::new(v2(-4.0, 2.0), v2(0.0, 6.0)));
        assert_eq!(bounds.quadrant(3), BoundingBox::new(v2(0.0, 2.0), v2(4.0, 6.0)));
        for child in 0..4 {
            let centre = bounds.quadrant(child).centre();
            assert_eq!(bounds.child_index(centre), child);
        }
    }

    #[test]
    fn test_child_index_on_midline() {
        let bounds = BoundingBox::new(v2(0.0, 0.0), v2(8.0, 8.0));
        assert_eq!(bounds.child_index(v2(4.0, 4.0)), 0);
        assert_eq!(bounds.child_index(v2(4.1, 4.0)), 1);
        assert_eq!(bounds.child_index(v2(4.0, 4.1)), 2);
    }

    #[test]
    fn test_spanning() {
        let bounds = BoundingBox::spanning(v2(5.0, -1.0), v2(-3.0, 2.0));
        assert_eq!(bounds, BoundingBox::new(v2(-3.0, -1.0), v2(5.0, 2.0)));
        assert!(bounds.contains(v2(-3.0, 2.0)));
        assert!(!bounds.contains(v2(-3.1, 0.0)));
        assert_eq!(bounds.padded(1.0).width(), 10.0);
    }
}
