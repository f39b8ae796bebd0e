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

//! Everything that makes up one playable level.
//!
//! A `Level` owns flat lists of geometry records plus two quadtrees over
//! them. The collision tree indexes expanded edges and collidable objects in
//! world units, for the physics. The display tree indexes triangles and
//! visible objects, for drawing, and is split per leaf into a background and
//! a foreground layer.

mod builder;
mod fixing;
mod loader;
mod records;
mod state;

pub use self::builder::{LevelBuilder, VertexRef};
pub use self::fixing::get_normal;
pub use self::loader::{load_level, load_level_from_str};
pub use self::records::*;
pub use self::state::LevelState;

use crate::assets::{BitmapId, SampleId};
use crate::config::LevelConfig;
use crate::geom::{v2, BoundingBox, Vec2};
use crate::quadtree::draw::{draw_layer, Canvas};
use crate::quadtree::{NodeId, QuadTree};

/// Sprites and sound for the built-in door object.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct DoorAssets {
    pub open: BitmapId,
    pub shut: BitmapId,
    pub sound: Option<SampleId>,
}

pub struct Level {
    pub(crate) geometry: Geometry,
    pub(crate) display_tree: QuadTree,
    pub(crate) collision_tree: QuadTree,
    visible: Vec<NodeId>,
    pub(crate) player_start: Vec2,
    pub(crate) total_objects: usize,
    pub(crate) objects_required: usize,
    pub(crate) initial_state: LevelState,
    door: DoorAssets,
    door_open: bool,
}

impl Level {
    /// An empty level whose trees span the configured world extent, with the
    /// door shut.
    pub fn new(config: &LevelConfig, door: DoorAssets) -> Level {
        let extent = config.world_extent;
        let world = BoundingBox::new(v2(-extent, -extent), v2(extent, extent));
        let min_size = config.min_subdividable_size();
        Level {
            geometry: Geometry {
                materials: Vec::new(),
                vertices: Vec::new(),
                edges: Vec::new(),
                triangles: Vec::new(),
                object_types: Vec::new(),
                objects: Vec::new(),
                door: ObjectType { image: door.shut, collect_sound: door.sound, radius: 14.0 + config.collision_radius },
            },
            display_tree: QuadTree::new(world, config.max_display_contents, min_size),
            collision_tree: QuadTree::new(world, config.max_collision_contents, min_size),
            visible: Vec::new(),
            player_start: Vec2::zero(),
            total_objects: 0,
            objects_required: 0,
            initial_state: LevelState::default(),
            door,
            door_open: false,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn display_tree(&self) -> &QuadTree {
        &self.display_tree
    }

    pub fn collision_tree(&self) -> &QuadTree {
        &self.collision_tree
    }

    /// Leaves found by the last `begin_draw`.
    pub fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn player_start(&self) -> Vec2 {
        self.player_start
    }

    /// Collectable objects in the level, not counting the door.
    pub fn total_objects(&self) -> usize {
        self.total_objects
    }

    /// Objects to collect before the door opens.
    pub fn objects_required(&self) -> usize {
        self.objects_required
    }

    pub fn initial_state(&self) -> &LevelState {
        &self.initial_state
    }

    pub fn is_door_open(&self) -> bool {
        self.door_open
    }

    /// Shows the door as open. Nothing closes it again except restoring a
    /// snapshot taken while it was shut.
    pub fn set_door_open(&mut self) {
        self.set_door(true);
    }

    fn set_door(&mut self, open: bool) {
        self.door_open = open;
        self.geometry.door.image = if open { self.door.open } else { self.door.shut };
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> &mut Object {
        self.geometry.object_mut(id)
    }

    pub fn borrow_state(&self) -> LevelState {
        LevelState::capture(&self.geometry.objects, self.door_open)
    }

    pub fn return_state(&mut self, state: &LevelState) {
        state.apply(&mut self.geometry.objects);
        self.set_door(state.door_open());
    }

    /// Puts every object and the door back as they were when loaded.
    pub fn reset(&mut self) {
        let initial = self.initial_state.clone();
        self.return_state(&initial);
    }

    /// The collision leaf for a point at `pos` moving with `vel`.
    pub fn get_collision_node(&self, pos: Vec2, vel: Vec2) -> NodeId {
        self.collision_tree.get_node(pos, vel)
    }

    /// Finds the display leaves overlapping `view` and draws their background
    /// layer. Call before drawing the player.
    pub fn begin_draw<C: Canvas + ?Sized>(&mut self, view: &BoundingBox, frame: u32, canvas: &mut C) {
        self.display_tree.collect_visible(view, &mut self.visible);
        draw_layer(&self.display_tree, &self.visible, &mut self.geometry, view, frame, false, canvas);
    }

    /// Draws the foreground layer of the leaves found by `begin_draw`. Call
    /// after drawing the player.
    pub fn end_draw<C: Canvas + ?Sized>(&mut self, view: &BoundingBox, frame: u32, canvas: &mut C) {
        draw_layer(&self.display_tree, &self.visible, &mut self.geometry, view, frame, true, canvas);
    }
}
