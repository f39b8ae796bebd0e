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

use crate::geom::{BoundingBox, Vec2};

/// Represents the four cardinal directions in 2D space, used to name the sides
/// of a `BoundingBox`.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum Card {
    /// Negative X direction (left side).
    MinusX,

    /// Negative Y direction (top side).
    MinusY,

    /// Positive X direction (right side).
    PlusX,

    /// Positive Y direction (bottom side).
    PlusY,
}

impl Card {
    /// Returns all cardinal directions.
    #[inline]
    pub fn values() -> [Card; 4] {
        [Card::MinusX, Card::MinusY, Card::PlusX, Card::PlusY]
    }

    /// Component of `vec` along this direction's axis (not negated).
    #[inline]
    pub fn axis(self, vec: Vec2) -> f64 {
        match self {
            Card::MinusX | Card::PlusX => vec.x,
            Card::MinusY | Card::PlusY => vec.y,
        }
    }

    /// Returns true if motion with axis component `speed` heads toward this side.
    #[inline]
    pub fn heads_toward(self, speed: f64) -> bool {
        match self {
            Card::MinusX | Card::MinusY => speed < 0.0,
            Card::PlusX | Card::PlusY => speed > 0.0,
        }
    }

    /// The coordinate of the side of `bounds` facing this direction.
    #[inline]
    pub fn side_of(self, bounds: &BoundingBox) -> f64 {
        match self {
            Card::MinusX => bounds.tl.x,
            Card::MinusY => bounds.tl.y,
            Card::PlusX => bounds.br.x,
            Card::PlusY => bounds.br.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::v2;

    #[test]
    fn test_sides() {
        let bounds = BoundingBox::new(v2(1.0, 2.0), v2(5.0, 8.0));
        assert_eq!(Card::MinusX.side_of(&bounds), 1.0);
        assert_eq!(Card::MinusY.side_of(&bounds), 2.0);
        assert_eq!(Card::PlusX.side_of(&bounds), 5.0);
        assert_eq!(Card::PlusY.side_of(&bounds), 8.0);
    }

    #[test]
    fn test_heads_toward() {
        assert!(Card::PlusX.heads_toward(1.0));
        assert!(!Card::PlusX.heads_toward(0.0));
        assert!(Card::MinusY.heads_toward(-0.5));
        assert!(!Card::MinusY.heads_toward(0.5));
    }
}
