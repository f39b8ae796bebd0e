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

use crate::errors::{ErrorKind, Result};
use crate::geom::{v2, Vec2};
use failure::ResultExt;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parameters that shape how a level is built.
///
/// The screen dimensions matter to the spatial index: a quadtree node is never
/// subdivided once it is no larger than one screen in either axis, so the same
/// level file indexes differently at different resolutions. Physics itself is
/// always unscaled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Player collision radius; collidable edges are pushed out by this much.
    pub collision_radius: f64,
    pub screen_width: f64,
    pub screen_height: f64,
    /// Leaf content count that triggers subdivision in the display tree.
    pub max_display_contents: usize,
    /// Leaf content count that triggers subdivision in the collision tree.
    pub max_collision_contents: usize,
    /// Half-width of the square region covered by both trees.
    pub world_extent: f64,
    /// Ceiling on fix-verts/fix-edges rounds. Defaults to two more than the
    /// edge count.
    pub fix_iteration_limit: Option<usize>,
}

impl Default for LevelConfig {
    fn default() -> LevelConfig {
        LevelConfig {
            collision_radius: 15.0,
            screen_width: 640.0,
            screen_height: 480.0,
            max_display_contents: 50,
            max_collision_contents: 200,
            world_extent: 65536.0,
            fix_iteration_limit: None,
        }
    }
}

impl LevelConfig {
    pub fn from_toml_str(text: &str) -> Result<LevelConfig> {
        toml::from_str(text).map_err(|error| ErrorKind::BadConfig(error.to_string()).into())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<LevelConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).context(ErrorKind::Unreadable(path.display().to_string()))?;
        LevelConfig::from_toml_str(&text)
    }

    /// Nodes must exceed this size in both axes to be subdivided.
    pub fn min_subdividable_size(&self) -> Vec2 {
        v2(self.screen_width, self.screen_height)
    }

    /// Factor applied to display-only measurements (edge overlay heights).
    /// Level files are authored against a 480 line display.
    pub fn display_scale(&self) -> f64 {
        self.screen_height / 480.0
    }

    pub(crate) fn fix_iteration_limit_for(&self, edge_count: usize) -> usize {
        self.fix_iteration_limit.unwrap_or(edge_count + 2)
    }
}
