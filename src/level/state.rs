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

use crate::level::records::{Object, ObjectFlags};

/// Snapshot of the mutable parts of a level: which objects are still visible,
/// and whether the door is open.
///
/// Bit `i & 31` of word `i >> 5` holds the visibility of object `i`, in the
/// order objects appear in the level file.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct LevelState {
    bits: Vec<u32>,
    door_open: bool,
}

impl LevelState {
    pub(crate) fn capture(objects: &[Object], door_open: bool) -> LevelState {
        let mut bits = vec![0; (objects.len() + 31) >> 5];
        for (index, object) in objects.iter().enumerate() {
            if object.is_visible() {
                bits[index >> 5] |= 1 << (index & 31);
            }
        }
        LevelState { bits, door_open }
    }

    /// Sets each object's visibility from the snapshot. Objects beyond the
    /// end of the snapshot are left alone.
    pub(crate) fn apply(&self, objects: &mut [Object]) {
        for (index, object) in objects.iter_mut().enumerate() {
            if let Some(word) = self.bits.get(index >> 5) {
                object.flags.set(ObjectFlags::VISIBLE, word & (1 << (index & 31)) != 0);
            }
        }
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.bits.get(index >> 5).map_or(false, |word| word & (1 << (index & 31)) != 0)
    }

    pub fn door_open(&self) -> bool {
        self.door_open
    }

    pub fn words(&self) -> &[u32] {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{v2, BoundingBox};
    use crate::level::records::ObjectKind;

    fn objects(count: usize) -> Vec<Object> {
        (0..count)
            .map(|i| Object {
                pos: v2(i as f64, 0.0),
                angle: 0.0,
                flags: if i % 3 == 0 { ObjectFlags::VISIBLE } else { ObjectFlags::empty() },
                bounds: BoundingBox::around(v2(i as f64, 0.0), 1.0),
                kind: ObjectKind::Door,
                last_frame: 0,
            })
            .collect()
    }

    #[test]
    fn test_bit_layout() {
        let state = LevelState::capture(&objects(40), true);
        assert_eq!(state.words().len(), 2);
        assert_eq!(state.words()[0] & 0xf, 0b1001);
        assert!(state.is_visible(33));
        assert!(!state.is_visible(34));
        assert!(!state.is_visible(400));
        assert!(state.door_open());
    }

    #[test]
    fn test_capture_then_apply() {
        let mut objects = objects(70);
        let state = LevelState::capture(&objects, false);
        for object in objects.iter_mut() {
            let visible = object.is_visible();
            object.flags.set(ObjectFlags::VISIBLE, !visible);
        }
        state.apply(&mut objects);
        for (i, object) in objects.iter().enumerate() {
            assert_eq!(object.is_visible(), i % 3 == 0);
        }
    }

    #[test]
    fn test_empty() {
        let state = LevelState::capture(&[], false);
        assert!(state.words().is_empty());
    }
}
