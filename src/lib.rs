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

//! Level and physics core of a 2D skateboarding platformer.
//!
//! A level is read from a text file into a `Level`: flat lists of polygon
//! geometry and collectable objects, indexed by two quadtrees. Collidable
//! polygon sides are pushed outward by the player's radius at load time, so
//! `physics::run_physics` can move the player as a point through
//! continuous time. Drawing goes through the `Canvas` trait and is clipped
//! to the leaves of the display tree under a `Viewport`.
//!
//! Windowing, audio and input devices live outside this crate. They register
//! named bitmaps and samples in an `AssetTable`, feed `Input` to `Controls`
//! each tick, and receive draw calls and `Pickup`s back.

pub mod assets;
pub mod config;
pub mod errors;
pub mod geom;
pub mod level;
pub mod physics;
pub mod quadtree;
pub mod view;

pub use crate::assets::AssetTable;
pub use crate::config::LevelConfig;
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::level::{load_level, load_level_from_str, Level, LevelState};
pub use crate::physics::pickup::{Pickup, Progress};
pub use crate::physics::{run_physics, Animation, Body, Controls, Input};
pub use crate::quadtree::draw::{Canvas, TexVertex};
pub use crate::view::Viewport;
