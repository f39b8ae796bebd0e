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

//! Continuous-time player physics.
//!
//! The player is a point moving against the expanded collision edges. Each
//! call to `run_physics` spends a time budget in sub-steps: every sub-step
//! finds the earliest event along the current straight-line motion (leaving
//! the collision leaf, or crossing an edge), moves up to it, reacts, and
//! carries on with whatever time is left.

mod controls;
pub mod pickup;

pub use self::controls::{Controls, Input, KeyFlags, PLAYER_STRENGTH};

use crate::geom::{Card, Vec2};
use crate::level::{EdgeId, Level};
use crate::quadtree::NodeId;
use log::warn;
use std::f64::consts::PI;

const GRAVITY: f64 = 0.1;
const AIR_DRAG: f64 = 0.997;

/// Distance kept between the player and a surface it rests on.
const CONTACT_DISTANCE: f64 = 0.05;

/// How far behind a surface the player may drift and still be pushed back out.
const SNAP_RANGE: f64 = 0.5;

const AIR_CONTROL: f64 = 0.05;
const LEAN_RECOVERY: f64 = 0.03;
const JUMP_IMPULSE: f64 = 5.0;
const FRICTION_SCALE: f64 = 0.05;

/// Remaining time below which a call ends.
const MIN_TIME: f64 = 0.01;

/// Sub-steps allowed per call. Only reached when every event takes zero
/// time, as when pressed against the outer wall of the world.
const MAX_SUBSTEPS: usize = 256;

/// Position, facing and velocity of the player.
#[derive(PartialEq, Copy, Clone, Debug, Default)]
pub struct Body {
    pub pos: Vec2,
    /// Lean in radians, 0 upright, increasing clockwise.
    pub angle: f64,
    pub vel: Vec2,
}

impl Body {
    pub fn at(pos: Vec2) -> Body {
        Body { pos, angle: 0.0, vel: Vec2::zero() }
    }
}

/// Walk-cycle feedback from the physics.
pub trait Animation {
    /// Called once per sub-step: with the distance moved along a surface on
    /// impact, or with zero when airborne.
    fn advance(&mut self, distance: f64, in_contact: bool);
}

/// An `Animation` that ignores its input.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct NoAnimation;

impl Animation for NoAnimation {
    fn advance(&mut self, _distance: f64, _in_contact: bool) {}
}

/// Removes the part of `vel` heading along `normal`, returning the amount
/// removed. Landing on anything ends a jump.
pub fn fix_up(vel: &mut Vec2, normal: Vec2, flags: &mut KeyFlags) -> f64 {
    if flags.contains(KeyFlags::JUMPING) {
        flags.remove(KeyFlags::JUMPING | KeyFlags::JUMP | KeyFlags::JUMP_ISSUED);
    }
    let removed = vel.dot(normal);
    *vel -= normal * removed;
    removed
}

/// Leans the player to match a surface with unit `normal`.
///
/// Surfaces within 45 degrees of flat, or within 45 degrees of the current
/// lean, are followed. Steeper ones only when `force` is set.
pub fn set_angle(normal: Vec2, angle: &mut f64, force: bool) {
    let new_angle = normal.x.atan2(-normal.y);
    let quarter = PI * 0.25;
    if force
        || (new_angle < quarter && new_angle >= 0.0)
        || (new_angle > -quarter && new_angle <= 0.0)
        || (new_angle - *angle).abs() < quarter
    {
        *angle = new_angle;
    }
}

/// Applies surface friction, steering and jumping to `vel` against a surface
/// with unit `normal`.
///
/// The along-surface speed is divided by `friction` before the push and the
/// friction decay are applied, then scaled back. `friction` must be positive;
/// the loader rejects materials without it.
pub fn do_friction(normal: Vec2, friction: f64, vel: &mut Vec2, controls: &mut Controls) {
    let (a, b) = (normal.x, normal.y);
    let mut forward = (vel.x * b - vel.y * a) / friction;
    let mut up = vel.x * a + vel.y * b;

    if controls.flags.contains(KeyFlags::LEFT) {
        forward += controls.pusher;
        controls.flags.insert(KeyFlags::FLIP);
    }
    if controls.flags.contains(KeyFlags::RIGHT) {
        forward -= controls.pusher;
        controls.flags.remove(KeyFlags::FLIP);
    }

    let level = FRICTION_SCALE * friction;
    forward = if forward > 0.0 {
        if forward < level {
            0.0
        } else {
            forward - level
        }
    } else if forward > -level {
        0.0
    } else {
        forward + level
    };

    let jump_state = controls.flags & (KeyFlags::JUMP | KeyFlags::JUMP_ISSUED);
    if jump_state == KeyFlags::JUMP {
        up += JUMP_IMPULSE;
        controls.flags.insert(KeyFlags::JUMP_ISSUED | KeyFlags::JUMPING);
    }

    vel.x = up * a + forward * friction * b;
    vel.y = up * b - forward * friction * a;
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
enum Event {
    LeftLeaf,
    HitEdge(EdgeId),
}

/// Advances `body` by `time` units against the level's collision edges.
///
/// Gravity and air drag are applied once, up front. Returns the collision
/// leaf the player ends up in, whose leading objects are the candidates for
/// pickup.
pub fn run_physics<A: Animation + ?Sized>(
    level: &Level,
    body: &mut Body,
    controls: &mut Controls,
    mut time: f64,
    anim: &mut A,
) -> NodeId {
    let geometry = level.geometry();
    let tree = level.collision_tree();
    let mut node = level.get_collision_node(body.pos, body.vel);

    body.vel.y += GRAVITY;
    body.vel = body.vel * AIR_DRAG;

    let mut steps = 0;
    while time > MIN_TIME {
        if steps == MAX_SUBSTEPS {
            warn!("physics gave up with {} time left at {:?}", time, body.pos);
            break;
        }
        steps += 1;

        let leaf = tree.node(node);

        // push back out of anything rounding error let us sink into
        let mut contact = false;
        for id in leaf.edges() {
            let edge = geometry.edge(id);
            let distance = edge.distance(body.pos);
            if distance >= -SNAP_RANGE && distance <= CONTACT_DISTANCE && edge.bounds.contains(body.pos) {
                body.pos += edge.normal * (CONTACT_DISTANCE - distance);
                contact = true;
            }
        }

        let motion = body.vel * time;
        let end = body.pos + motion;
        let mut event_time = 1.0;
        let mut event = None;

        for &side in Card::values().iter() {
            let speed = side.axis(motion);
            let boundary = side.side_of(leaf.bounds());
            if side.heads_toward(speed) && side.heads_toward(side.axis(end) - boundary) {
                let t = ((boundary - side.axis(body.pos)) / speed).max(0.0);
                if t < event_time {
                    event_time = t;
                    event = Some(Event::LeftLeaf);
                }
            }
        }

        for id in leaf.edges() {
            let edge = geometry.edge(id);
            let start = edge.distance(body.pos);
            let finish = edge.distance(end);
            if start >= -CONTACT_DISTANCE && finish < 0.0 && finish < start {
                let t = (start / (start - finish)).max(0.0);
                if t < event_time && edge.bounds.contains(body.pos + motion * t) {
                    event_time = t;
                    event = Some(Event::HitEdge(id));
                }
            }
        }

        body.pos += motion * event_time;
        if !contact {
            anim.advance(0.0, false);
        }

        match event {
            Some(Event::LeftLeaf) => node = level.get_collision_node(body.pos, body.vel),
            Some(Event::HitEdge(id)) => {
                let edge = geometry.edge(id);
                let friction = geometry.material(edge.material).friction;
                fix_up(&mut body.vel, edge.normal, &mut controls.flags);
                let along = body.vel.dot(edge.normal.perp());
                set_angle(edge.normal, &mut body.angle, along.abs() > 0.5);
                let facing = if controls.is_flipped() { 1.0 } else { -1.0 };
                anim.advance(along * facing, true);
                do_friction(edge.normal, friction, &mut body.vel, controls);
            }
            None if !contact => {
                if controls.flags.contains(KeyFlags::LEFT) {
                    body.vel.x -= AIR_CONTROL;
                    controls.flags.insert(KeyFlags::FLIP);
                }
                if controls.flags.contains(KeyFlags::RIGHT) {
                    body.vel.x += AIR_CONTROL;
                    controls.flags.remove(KeyFlags::FLIP);
                }
                let recovery = time * event_time * LEAN_RECOVERY;
                if body.angle > 0.0 {
                    body.angle = (body.angle - recovery).max(0.0);
                } else if body.angle < 0.0 {
                    body.angle = (body.angle + recovery).min(0.0);
                }
            }
            None => {}
        }

        time -= time * event_time;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::v2;

    const UP: Vec2 = Vec2 { x: 0.0, y: -1.0 };

    #[test]
    fn test_fix_up() {
        let mut vel = v2(3.0, 2.0);
        let mut flags = KeyFlags::JUMPING | KeyFlags::JUMP | KeyFlags::FLIP;
        let removed = fix_up(&mut vel, UP, &mut flags);
        assert_eq!(removed, -2.0);
        assert_eq!(vel, v2(3.0, 0.0));
        assert_eq!(flags, KeyFlags::FLIP);
    }

    #[test]
    fn test_fix_up_keeps_jump_on_ground() {
        let mut vel = v2(0.0, 1.0);
        let mut flags = KeyFlags::JUMP;
        fix_up(&mut vel, UP, &mut flags);
        assert_eq!(flags, KeyFlags::JUMP);
    }

    #[test]
    fn test_set_angle_bands() {
        let mut angle = 0.0;
        set_angle(UP, &mut angle, false);
        assert_eq!(angle, 0.0);

        // 30 degree slope facing up and right
        let slope = v2((PI / 6.0).sin(), -(PI / 6.0).cos());
        set_angle(slope, &mut angle, false);
        assert!((angle - PI / 6.0).abs() < 1e-12);

        // a wall is ignored from upright, but taken when forced
        let wall = v2(1.0, 0.0);
        angle = 0.0;
        set_angle(wall, &mut angle, false);
        assert_eq!(angle, 0.0);
        set_angle(wall, &mut angle, true);
        assert!((angle - PI / 2.0).abs() < 1e-12);

        // and followed when already leaning close to it
        angle = PI / 3.0;
        set_angle(wall, &mut angle, false);
        assert!((angle - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_friction_decays_to_zero() {
        let mut controls = Controls::new();
        let mut vel = v2(0.33, 0.0);
        let mut last = vel.x.abs();
        for _ in 0..20 {
            do_friction(UP, 1.0, &mut vel, &mut controls);
            assert!(vel.x >= 0.0);
            assert!(vel.x.abs() <= last);
            last = vel.x.abs();
        }
        assert_eq!(vel.x, 0.0);
    }

    #[test]
    fn test_friction_push_sets_facing() {
        let mut controls = Controls { flags: KeyFlags::LEFT, pusher: PLAYER_STRENGTH };
        let mut vel = Vec2::zero();
        do_friction(UP, 1.0, &mut vel, &mut controls);
        assert!(controls.is_flipped());
        assert!(vel.x < 0.0);
        assert!((vel.x + (PLAYER_STRENGTH - FRICTION_SCALE)).abs() < 1e-12);

        controls.flags = KeyFlags::RIGHT | KeyFlags::FLIP;
        let mut vel = Vec2::zero();
        do_friction(UP, 1.0, &mut vel, &mut controls);
        assert!(!controls.is_flipped());
        assert!(vel.x > 0.0);
    }

    #[test]
    fn test_jump_once_per_press() {
        let mut controls = Controls { flags: KeyFlags::JUMP, pusher: 0.0 };
        let mut vel = Vec2::zero();
        do_friction(UP, 1.0, &mut vel, &mut controls);
        assert_eq!(vel, v2(0.0, -5.0));
        assert!(controls.flags.contains(KeyFlags::JUMPING));
        assert!(controls.flags.contains(KeyFlags::JUMP_ISSUED));

        let mut vel = Vec2::zero();
        do_friction(UP, 1.0, &mut vel, &mut controls);
        assert_eq!(vel.y, 0.0);
    }
}
