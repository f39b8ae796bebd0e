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

use crate::assets::{BitmapId, SampleId};
use crate::geom::{BoundingBox, Vec2};
use crate::quadtree::{Container, ContentSource};
use bitflags::bitflags;

macro_rules! arena_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Hash)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position in the owning `Level` list.
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(VertexId);
arena_id!(EdgeId);
arena_id!(TriangleId);
arena_id!(ObjectId);
arena_id!(MaterialId);
arena_id!(ObjectTypeId);

bitflags! {
    /// Per-corner triangle flags for the side starting at that corner.
    pub struct EdgeFlags: u32 {
        /// Draw the material's edge overlay along this side.
        const EDGE = 0x1_0000;
        const COLLIDABLE = 0x2_0000;
        const FOREGROUND = 0x4_0000;
    }
}

bitflags! {
    pub struct ObjectFlags: u32 {
        const COLLIDABLE = 0x2_0000;
        const FOREGROUND = 0x4_0000;
        const VISIBLE = 0x8_0000;
        const DOOR = 0x10_0000;
    }
}

/// A corner of the level geometry.
#[derive(Clone, Debug)]
pub struct Vertex {
    /// Authored position.
    pub pos: Vec2,
    /// Expanded position: `pos` pushed out by the collision radius along the
    /// adjoining collidable edges. Equal to `pos` if no collidable edge meets here.
    pub normal: Vec2,
    pub(crate) edges: [Option<EdgeId>; 2],
}

impl Vertex {
    pub fn new(pos: Vec2) -> Vertex {
        Vertex { pos, normal: pos, edges: [None, None] }
    }

    /// The (at most two) collidable edges meeting at this vertex.
    pub fn edges(&self) -> [Option<EdgeId>; 2] {
        self.edges
    }
}

/// A collidable boundary line `normal · p + c = 0`, already pushed outward by
/// the collision radius, so the player can be treated as a point.
#[derive(Clone, Debug)]
pub struct Edge {
    /// Unit outward normal `(a, b)`.
    pub normal: Vec2,
    pub c: f64,
    pub(crate) end_points: [VertexId; 2],
    pub bounds: BoundingBox,
    pub material: MaterialId,
}

impl Edge {
    pub(crate) fn new(end_points: [VertexId; 2], material: MaterialId) -> Edge {
        Edge {
            normal: Vec2::zero(),
            c: 0.0,
            end_points,
            bounds: BoundingBox::new(Vec2::zero(), Vec2::zero()),
            material,
        }
    }

    /// Signed distance of `point` from the line, positive on the open side.
    #[inline]
    pub fn distance(&self, point: Vec2) -> f64 {
        self.normal.dot(point) + self.c
    }

    pub fn end_points(&self) -> [VertexId; 2] {
        self.end_points
    }
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub corners: [VertexId; 3],
    pub edge_flags: [EdgeFlags; 3],
    /// Overlay half-height per corner, already scaled for the display.
    pub edge_widths: [u32; 3],
    pub material: MaterialId,
    pub bounds: BoundingBox,
    pub(crate) last_frame: u32,
}

impl Triangle {
    /// True if any side is flagged to draw over the player.
    pub fn is_foreground(&self) -> bool {
        let all = self.edge_flags[0] | self.edge_flags[1] | self.edge_flags[2];
        all.contains(EdgeFlags::FOREGROUND)
    }
}

/// Either a level-defined object type or the built-in door.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum ObjectKind {
    Door,
    Typed(ObjectTypeId),
}

#[derive(Clone, Debug)]
pub struct Object {
    pub pos: Vec2,
    pub angle: f64,
    pub flags: ObjectFlags,
    pub bounds: BoundingBox,
    pub kind: ObjectKind,
    pub(crate) last_frame: u32,
}

impl Object {
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ObjectFlags::VISIBLE)
    }

    pub fn is_door(&self) -> bool {
        self.flags.contains(ObjectFlags::DOOR)
    }
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    pub image: BitmapId,
    /// Played on collection. Objects may be silent.
    pub collect_sound: Option<SampleId>,
    /// Pickup distance, including the player's collision radius.
    pub radius: f64,
}

#[derive(Clone, Debug)]
pub struct Material {
    pub fill: BitmapId,
    pub edge: BitmapId,
    pub friction: f64,
}

/// Flat ownership lists for everything a level is made of. All cross
/// references are ids into these lists.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub(crate) materials: Vec<Material>,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) object_types: Vec<ObjectType>,
    pub(crate) objects: Vec<Object>,
    pub(crate) door: ObjectType,
}

impl Geometry {
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn object_types(&self) -> &[ObjectType] {
        &self.object_types
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn triangle(&self, id: TriangleId) -> &Triangle {
        &self.triangles[id.0]
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.0]
    }

    pub(crate) fn triangle_mut(&mut self, id: TriangleId) -> &mut Triangle {
        &mut self.triangles[id.0]
    }

    /// The type of an object, resolving the built-in door.
    pub fn object_type(&self, kind: ObjectKind) -> &ObjectType {
        match kind {
            ObjectKind::Door => &self.door,
            ObjectKind::Typed(id) => &self.object_types[id.0],
        }
    }

    pub fn door(&self) -> &ObjectType {
        &self.door
    }
}

impl ContentSource for Geometry {
    fn bounds(&self, item: Container) -> BoundingBox {
        match item {
            Container::Edge(id) => self.edges[id.0].bounds,
            Container::Triangle(id) => self.triangles[id.0].bounds,
            Container::Object(id) => self.objects[id.0].bounds,
        }
    }

    fn is_foreground(&self, item: Container) -> bool {
        match item {
            Container::Edge(_) => false,
            Container::Triangle(id) => self.triangles[id.0].is_foreground(),
            Container::Object(id) => self.objects[id.0].flags.contains(ObjectFlags::FOREGROUND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::v2;

    #[test]
    fn test_triangle_foreground() {
        let mut triangle = Triangle {
            corners: [VertexId(0), VertexId(1), VertexId(2)],
            edge_flags: [EdgeFlags::EDGE, EdgeFlags::COLLIDABLE, EdgeFlags::empty()],
            edge_widths: [12, 0, 0],
            material: MaterialId(0),
            bounds: BoundingBox::new(Vec2::zero(), Vec2::zero()),
            last_frame: 0,
        };
        assert!(!triangle.is_foreground());
        triangle.edge_flags[2].insert(EdgeFlags::FOREGROUND);
        assert!(triangle.is_foreground());
    }

    #[test]
    fn test_object_flags() {
        let mut flags = ObjectFlags::VISIBLE;
        flags.insert(ObjectFlags::DOOR);
        assert!(flags.contains(ObjectFlags::DOOR));
        flags.set(ObjectFlags::VISIBLE, false);
        assert!(!flags.contains(ObjectFlags::VISIBLE));
        assert!(flags.contains(ObjectFlags::DOOR));
    }

    #[test]
    fn test_edge_distance() {
        let mut edge = Edge::new([VertexId(0), VertexId(1)], MaterialId(0));
        edge.normal = v2(0.0, -1.0);
        edge.c = 95.0;
        assert_eq!(edge.distance(v2(50.0, 50.0)), 45.0);
        assert_eq!(edge.distance(v2(50.0, 100.0)), -5.0);
    }
}
