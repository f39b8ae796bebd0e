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

use crate::geom::Vec2;
use bitflags::bitflags;

/// Largest push a held direction ramps up to.
pub const PLAYER_STRENGTH: f64 = 0.14;

const PUSH_RAMP: f64 = 0.005;

/// Upward speed kept when jump is released mid-jump.
const JUMP_RELEASE_SPEED: f64 = -2.0;

bitflags! {
    /// Player input and jump bookkeeping shared by the game loop and the physics.
    #[derive(Default)]
    pub struct KeyFlags: u32 {
        const LEFT = 1;
        const RIGHT = 2;
        /// Jump is held.
        const JUMP = 4;
        /// The impulse for the current jump press has been applied.
        const JUMP_ISSUED = 8;
        /// In the air after a jump.
        const JUMPING = 16;
        /// Sprite faces left.
        const FLIP = 32;
    }
}

/// Buttons held this tick.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[derive(PartialEq, Copy, Clone, Debug, Default)]
pub struct Controls {
    pub flags: KeyFlags,
    /// Push applied along a surface while a direction is held.
    pub pusher: f64,
}

impl Controls {
    pub fn new() -> Controls {
        Controls::default()
    }

    pub fn is_flipped(&self) -> bool {
        self.flags.contains(KeyFlags::FLIP)
    }

    /// Folds one tick of input into the flags.
    ///
    /// Holding a direction ramps `pusher` toward `PLAYER_STRENGTH`; a fresh
    /// press starts it from zero. Releasing jump re-arms it and, if the
    /// player is still rising fast from a jump, caps the upward speed so
    /// short presses give short hops.
    pub fn poll(&mut self, input: Input, vel: &mut Vec2) {
        self.hold(input.left, KeyFlags::LEFT);
        self.hold(input.right, KeyFlags::RIGHT);

        if input.jump {
            self.flags.insert(KeyFlags::JUMP);
        } else {
            if self.flags.contains(KeyFlags::JUMPING) && vel.y < JUMP_RELEASE_SPEED {
                vel.y = JUMP_RELEASE_SPEED;
            }
            self.flags.remove(KeyFlags::JUMP | KeyFlags::JUMP_ISSUED);
        }
    }

    fn hold(&mut self, held: bool, direction: KeyFlags) {
        if !held {
            self.flags.remove(direction);
        } else if self.flags.contains(direction) {
            self.pusher = (self.pusher + PUSH_RAMP).min(PLAYER_STRENGTH);
        } else {
            self.flags.insert(direction);
            self.pusher = 0.0;
        }
    }
}
