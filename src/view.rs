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

use crate::config::LevelConfig;
use crate::geom::{v2, BoundingBox, Vec2};
use crate::level::Level;
use crate::quadtree::draw::Canvas;

/// World units covered by the view vertically, whatever the resolution.
pub const VIEW_HEIGHT: f64 = 480.0;

/// Camera over a level, plus the frame counter used to draw each item once.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Viewport {
    screen_width: f64,
    screen_height: f64,
    frame: u32,
    view: BoundingBox,
}

impl Viewport {
    pub fn new(screen_width: f64, screen_height: f64) -> Viewport {
        Viewport {
            screen_width,
            screen_height,
            frame: 0,
            view: BoundingBox::new(Vec2::zero(), Vec2::zero()),
        }
    }

    pub fn from_config(config: &LevelConfig) -> Viewport {
        Viewport::new(config.screen_width, config.screen_height)
    }

    /// Width of the view box in world units, keeping the screen's aspect.
    pub fn view_width(&self) -> f64 {
        self.screen_width * VIEW_HEIGHT / self.screen_height
    }

    /// The view box used by the last draw.
    pub fn view(&self) -> &BoundingBox {
        &self.view
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Starts a new frame centred on `centre` and draws everything behind the
    /// player.
    pub fn draw_background<C: Canvas + ?Sized>(&mut self, level: &mut Level, centre: Vec2, canvas: &mut C) {
        let half = v2(self.view_width() * 0.5, VIEW_HEIGHT * 0.5);
        self.view = BoundingBox::new(centre - half, centre + half);
        // zero is the "never drawn" frame of freshly loaded records
        self.frame = self.frame.wrapping_add(1).max(1);
        level.begin_draw(&self.view, self.frame, canvas);
    }

    /// Draws everything in front of the player, over the same box and frame
    /// as the last `draw_background`.
    pub fn draw_foreground<C: Canvas + ?Sized>(&self, level: &mut Level, canvas: &mut C) {
        level.end_draw(&self.view, self.frame, canvas);
    }
}
