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

use crate::assets::BitmapId;
use crate::geom::{v2, BoundingBox, Vec2};
use crate::level::{EdgeFlags, Geometry, ObjectId, TriangleId};
use crate::quadtree::{Container, NodeId, QuadTree};

/// A textured vertex in view coordinates.
///
/// `u` is the world x coordinate, so overlays on neighbouring triangles line
/// up. `v` runs from 0 at the top of the texture to 1 at the bottom.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct TexVertex {
    pub pos: Vec2,
    pub u: f64,
    pub v: f64,
}

/// Receives the draw calls made while walking the display tree.
///
/// Positions are relative to the top-left corner of the view box.
pub trait Canvas {
    /// Draws `image` centred on `centre`, rotated by `angle` radians.
    fn draw_object(&mut self, image: BitmapId, centre: Vec2, angle: f64);

    /// Fills a triangle with `texture`, mapped so that texel (u, v) is the
    /// world position of each corner.
    fn draw_triangle(&mut self, texture: BitmapId, corners: [TexVertex; 3]);

    /// Draws a textured overlay along one side of a triangle, as a fan of
    /// the four given vertices.
    fn draw_edge_quad(&mut self, texture: BitmapId, quad: [TexVertex; 4]);
}

fn draw_object<C: Canvas + ?Sized>(geometry: &Geometry, id: ObjectId, view: &BoundingBox, canvas: &mut C) {
    let object = geometry.object(id);
    if object.bounds.separated(view) || !object.is_visible() {
        return;
    }
    let image = geometry.object_type(object.kind).image;
    canvas.draw_object(image, object.bounds.centre() - view.tl, object.angle);
}

fn draw_fill<C: Canvas + ?Sized>(geometry: &Geometry, id: TriangleId, view: &BoundingBox, canvas: &mut C) {
    let triangle = geometry.triangle(id);
    if triangle.bounds.separated(view) {
        return;
    }
    let corner = |i: usize| {
        let pos = geometry.vertex(triangle.corners[i]).pos;
        TexVertex { pos: pos - view.tl, u: pos.x, v: pos.y }
    };
    let texture = geometry.material(triangle.material).fill;
    canvas.draw_triangle(texture, [corner(0), corner(1), corner(2)]);
}

fn draw_edges<C: Canvas + ?Sized>(geometry: &Geometry, id: TriangleId, view: &BoundingBox, canvas: &mut C) {
    let triangle = geometry.triangle(id);
    if triangle.bounds.separated(view) {
        return;
    }
    let texture = geometry.material(triangle.material).edge;
    for c in (0..3).rev() {
        if !triangle.edge_flags[c].contains(EdgeFlags::EDGE) {
            continue;
        }
        let c2 = (c + 1) % 3;
        let start = geometry.vertex(triangle.corners[c]).pos;
        let end = geometry.vertex(triangle.corners[c2]).pos;
        let start_width = f64::from(triangle.edge_widths[c]);
        let end_width = f64::from(triangle.edge_widths[c2]);
        let at = |pos: Vec2, nudge: f64, dy: f64, v: f64| TexVertex {
            pos: v2(pos.x - view.tl.x + nudge, pos.y - view.tl.y + dy),
            u: pos.x,
            v,
        };
        // one unit of overlap on the far end hides seams between overlays
        canvas.draw_edge_quad(
            texture,
            [
                at(start, 0.0, -start_width, 0.0),
                at(end, 1.0, -end_width, 0.0),
                at(end, 1.0, end_width, 1.0),
                at(start, 0.0, start_width, 1.0),
            ],
        );
    }
}

/// Draws one layer of every leaf in `visible`.
///
/// In each leaf the leading objects are drawn, then every triangle's fill,
/// then every triangle's edge overlays. An item already drawn in `frame`
/// (reached through an earlier leaf) is skipped, so every item is drawn at
/// most once per frame number.
pub fn draw_layer<C: Canvas + ?Sized>(
    tree: &QuadTree,
    visible: &[NodeId],
    geometry: &mut Geometry,
    view: &BoundingBox,
    frame: u32,
    post: bool,
    canvas: &mut C,
) {
    for &id in visible {
        let node = tree.node(id);
        let list = if post { node.post_contents() } else { node.contents() };
        let split = list.iter().position(|item| !item.is_object()).unwrap_or_else(|| list.len());
        let (objects, rest) = list.split_at(split);

        for item in objects {
            if let Container::Object(object) = *item {
                if geometry.object(object).last_frame != frame {
                    draw_object(geometry, object, view, canvas);
                    geometry.object_mut(object).last_frame = frame;
                }
            }
        }

        for item in rest {
            if let Container::Triangle(triangle) = *item {
                if geometry.triangle(triangle).last_frame != frame {
                    draw_fill(geometry, triangle, view, canvas);
                }
            }
        }

        for item in rest {
            if let Container::Triangle(triangle) = *item {
                if geometry.triangle(triangle).last_frame != frame {
                    draw_edges(geometry, triangle, view, canvas);
                    geometry.triangle_mut(triangle).last_frame = frame;
                }
            }
        }
    }
}
