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

use crate::assets::{AssetTable, BitmapId, SampleId};
use crate::config::LevelConfig;
use crate::errors::{ErrorKind, Result};
use crate::geom::{BoundingBox, Vec2};
use crate::level::fixing::{compact_edges, fix_geometry, init_edge, EdgeSlots};
use crate::level::records::*;
use crate::level::{DoorAssets, Level, LevelState};
use crate::quadtree::Container;
use log::info;

/// One corner of a triangle as written in a level file.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct VertexRef {
    pub vertex: VertexId,
    /// Half-height of the edge overlay starting here, in 480-line units.
    pub height: f64,
    /// `EDGE`, `COLLIDABLE` and `FOREGROUND` for the side starting here.
    pub flags: EdgeFlags,
}

/// Collects level records and turns them into a `Level`.
///
/// Records are added in level-file order: materials, vertices, triangles,
/// object types, objects, stats. Ids returned by one `add_*` call are only
/// meaningful to this builder.
pub struct LevelBuilder<'a> {
    assets: &'a AssetTable,
    config: LevelConfig,
    materials: Vec<Material>,
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    object_types: Vec<ObjectType>,
    objects: Vec<Object>,
    player_start: Vec2,
    objects_required: usize,
}

impl<'a> LevelBuilder<'a> {
    pub fn new(assets: &'a AssetTable, config: &LevelConfig) -> LevelBuilder<'a> {
        LevelBuilder {
            assets,
            config: config.clone(),
            materials: Vec::new(),
            vertices: Vec::new(),
            triangles: Vec::new(),
            object_types: Vec::new(),
            objects: Vec::new(),
            player_start: Vec2::zero(),
            objects_required: 0,
        }
    }

    pub fn add_material(&mut self, fill: BitmapId, edge: BitmapId, friction: f64) -> MaterialId {
        self.materials.push(Material { fill, edge, friction });
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_vertex(&mut self, pos: Vec2) -> VertexId {
        self.vertices.push(Vertex::new(pos));
        VertexId(self.vertices.len() - 1)
    }

    /// Adds a triangle. Overlay heights are scaled to the configured display
    /// height here; collision is unaffected by them.
    pub fn add_triangle(&mut self, corners: [VertexRef; 3], material: MaterialId) -> TriangleId {
        let scale = self.config.display_scale();
        let mut edge_widths = [0; 3];
        for (width, corner) in edge_widths.iter_mut().zip(corners.iter()) {
            *width = (corner.height * scale).max(0.0) as u32;
        }
        self.triangles.push(Triangle {
            corners: [corners[0].vertex, corners[1].vertex, corners[2].vertex],
            edge_flags: [corners[0].flags, corners[1].flags, corners[2].flags],
            edge_widths,
            material,
            bounds: BoundingBox::new(Vec2::zero(), Vec2::zero()),
            last_frame: 0,
        });
        TriangleId(self.triangles.len() - 1)
    }

    /// Adds an object type. Its pickup radius is the larger image dimension
    /// plus the collision radius.
    pub fn add_object_type(&mut self, image: BitmapId, collect_sound: Option<SampleId>) -> ObjectTypeId {
        let bitmap = self.assets.bitmap(image);
        let radius = f64::from(bitmap.width.max(bitmap.height)) + self.config.collision_radius;
        self.object_types.push(ObjectType { image, collect_sound, radius });
        ObjectTypeId(self.object_types.len() - 1)
    }

    /// Adds an object, initially visible. `flags` may carry `COLLIDABLE` and
    /// `FOREGROUND`; `DOOR` is implied by the kind.
    pub fn add_object(&mut self, pos: Vec2, angle: f64, kind: ObjectKind, mut flags: ObjectFlags) -> ObjectId {
        flags.insert(ObjectFlags::VISIBLE);
        flags.set(ObjectFlags::DOOR, kind == ObjectKind::Door);
        self.objects.push(Object {
            pos,
            angle,
            flags,
            bounds: BoundingBox::new(pos, pos),
            kind,
            last_frame: 0,
        });
        ObjectId(self.objects.len() - 1)
    }

    pub fn set_stats(&mut self, player_start: Vec2, objects_required: usize) {
        self.player_start = player_start;
        self.objects_required = objects_required;
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn object_type_count(&self) -> usize {
        self.object_types.len()
    }

    /// Expands the collidable geometry, builds both trees and takes the
    /// initial snapshot.
    pub fn build(self) -> Result<Level> {
        let LevelBuilder {
            assets,
            config,
            materials,
            mut vertices,
            mut triangles,
            object_types,
            mut objects,
            player_start,
            objects_required,
        } = self;
        let radius = config.collision_radius;

        let mut slots = EdgeSlots::new();
        for triangle in &triangles {
            for c in 0..3 {
                if triangle.edge_flags[c].contains(EdgeFlags::COLLIDABLE) {
                    let end_points = [triangle.corners[c], triangle.corners[(c + 1) % 3]];
                    let mut edge = Edge::new(end_points, triangle.material);
                    init_edge(&mut vertices, &mut edge, EdgeId(slots.len()), radius);
                    slots.push(Some(edge));
                }
            }
        }
        let initial_edges = slots.len();
        let limit = config.fix_iteration_limit_for(initial_edges);
        let iterations = fix_geometry(&mut vertices, &mut slots, radius, limit)?;
        let mut edges = compact_edges(&mut vertices, slots);
        for edge in edges.iter_mut() {
            let [v0, v1] = edge.end_points;
            edge.bounds = BoundingBox::spanning(vertices[v0.0].normal, vertices[v1.0].normal).padded(0.05);
        }

        let door = DoorAssets {
            open: assets.obtain_bitmap("dooropen").ok_or(ErrorKind::MissingSprite("dooropen"))?,
            shut: assets.obtain_bitmap("doorshut").ok_or(ErrorKind::MissingSprite("doorshut"))?,
            sound: assets.obtain_sample("dooropen"),
        };
        let mut level = Level::new(&config, door);

        for triangle in triangles.iter_mut() {
            triangle.bounds = triangle_bounds(&vertices, triangle);
        }
        for object in objects.iter_mut() {
            let radius = match object.kind {
                ObjectKind::Door => level.geometry.door.radius,
                ObjectKind::Typed(id) => object_types[id.0].radius,
            };
            object.bounds = BoundingBox::around(object.pos, radius);
        }

        level.total_objects = objects.iter().filter(|object| !object.is_door()).count();
        level.objects_required = objects_required;
        level.player_start = player_start;
        level.geometry.materials = materials;
        level.geometry.vertices = vertices;
        level.geometry.edges = edges;
        level.geometry.triangles = triangles;
        level.geometry.object_types = object_types;
        level.geometry.objects = objects;

        let geometry = &level.geometry;
        for index in 0..geometry.edges.len() {
            level.collision_tree.add_content(geometry, Container::Edge(EdgeId(index)));
        }
        for index in 0..geometry.triangles.len() {
            level.display_tree.add_content(geometry, Container::Triangle(TriangleId(index)));
        }
        for (index, object) in geometry.objects.iter().enumerate() {
            let item = Container::Object(ObjectId(index));
            if object.flags.contains(ObjectFlags::COLLIDABLE) {
                level.collision_tree.add_content(geometry, item);
            }
            if object.is_visible() {
                level.display_tree.add_content(geometry, item);
            }
        }

        level.display_tree.split(geometry);
        level.display_tree.order(false);
        level.display_tree.order(true);
        level.collision_tree.order(false);

        level.initial_state = LevelState::capture(&level.geometry.objects, false);

        info!(
            "Built level: {} vertices, {} triangles, {} of {} edges kept after {} fixing rounds, {} objects",
            level.geometry.vertices.len(),
            level.geometry.triangles.len(),
            level.geometry.edges.len(),
            initial_edges,
            iterations,
            level.geometry.objects.len()
        );
        Ok(level)
    }
}

// x spans the corners; y also covers the overlay height at any corner
// touching a drawn side.
fn triangle_bounds(vertices: &[Vertex], triangle: &Triangle) -> BoundingBox {
    let first = vertices[triangle.corners[0].0].pos;
    let mut bounds = BoundingBox::new(first, first);
    for c in 0..3 {
        let previous = (c + 2) % 3;
        let pos = vertices[triangle.corners[c].0].pos;
        bounds.tl.x = bounds.tl.x.min(pos.x);
        bounds.br.x = bounds.br.x.max(pos.x);
        let width = if (triangle.edge_flags[c] | triangle.edge_flags[previous]).contains(EdgeFlags::EDGE) {
            f64::from(triangle.edge_widths[c])
        } else {
            0.0
        };
        bounds.tl.y = bounds.tl.y.min(pos.y - width);
        bounds.br.y = bounds.br.y.max(pos.y + width);
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::v2;

    fn assets() -> AssetTable {
        let mut assets = AssetTable::new();
        assets.add_bitmap("grass", 64, 64);
        assets.add_bitmap("grass_edge", 32, 16);
        assets.add_bitmap("dooropen", 20, 40);
        assets.add_bitmap("doorshut", 20, 40);
        assets.add_bitmap("cherry", 12, 18);
        assets.add_sample("ding");
        assets
    }

    fn corner(vertex: VertexId, height: f64, flags: EdgeFlags) -> VertexRef {
        VertexRef { vertex, height, flags }
    }

    fn floor_builder<'a>(assets: &'a AssetTable, config: &LevelConfig) -> LevelBuilder<'a> {
        let mut builder = LevelBuilder::new(assets, config);
        let grass = assets.obtain_bitmap("grass").unwrap();
        let edge = assets.obtain_bitmap("grass_edge").unwrap();
        let material = builder.add_material(grass, edge, 1.0);
        let a = builder.add_vertex(v2(0.0, 100.0));
        let b = builder.add_vertex(v2(100.0, 100.0));
        let c = builder.add_vertex(v2(50.0, 150.0));
        let top = EdgeFlags::COLLIDABLE | EdgeFlags::EDGE;
        builder.add_triangle(
            [corner(a, 8.0, top), corner(b, 8.0, EdgeFlags::empty()), corner(c, 0.0, EdgeFlags::empty())],
            material,
        );
        builder
    }

    #[test]
    fn test_build_floor() {
        let assets = assets();
        let config = LevelConfig { collision_radius: 5.0, ..LevelConfig::default() };
        let mut builder = floor_builder(&assets, &config);
        let cherry = builder.add_object_type(assets.obtain_bitmap("cherry").unwrap(), assets.obtain_sample("ding"));
        builder.add_object(v2(50.0, 80.0), 0.0, ObjectKind::Typed(cherry), ObjectFlags::COLLIDABLE);
        builder.add_object(v2(90.0, 80.0), 0.0, ObjectKind::Door, ObjectFlags::empty());
        builder.set_stats(v2(10.0, 50.0), 1);
        let level = builder.build().unwrap();

        let geometry = level.geometry();
        assert_eq!(geometry.edges().len(), 1);
        let edge = &geometry.edges()[0];
        assert_eq!(edge.normal, v2(0.0, -1.0));
        assert_eq!(edge.c, 95.0);
        assert!(edge.bounds.contains(v2(-5.0, 95.0)));
        assert!(edge.bounds.contains(v2(105.0, 95.0)));

        assert_eq!(geometry.object_types()[0].radius, 23.0);
        assert_eq!(geometry.door().radius, 19.0);
        assert_eq!(geometry.objects()[0].bounds, BoundingBox::around(v2(50.0, 80.0), 23.0));
        assert!(geometry.objects()[1].is_door());
        assert!(geometry.objects().iter().all(|object| object.is_visible()));
        assert_eq!(level.total_objects(), 1);
        assert_eq!(level.objects_required(), 1);
        assert_eq!(level.player_start(), v2(10.0, 50.0));
        assert!(!level.is_door_open());
        assert_eq!(geometry.door().image, assets.obtain_bitmap("doorshut").unwrap());

        let triangle = &geometry.triangles()[0];
        assert_eq!(triangle.bounds, BoundingBox::new(v2(0.0, 92.0), v2(100.0, 150.0)));

        let leaf = level.collision_tree().node(level.get_collision_node(v2(50.0, 50.0), Vec2::zero()));
        assert_eq!(leaf.edges().collect::<Vec<_>>(), vec![EdgeId(0)]);
        assert_eq!(leaf.objects().collect::<Vec<_>>(), vec![ObjectId(0)]);
        assert_eq!(leaf.contents()[0], Container::Object(ObjectId(0)));
    }

    #[test]
    fn test_overlay_height_scales_with_display() {
        let assets = assets();
        let config = LevelConfig { screen_height: 960.0, ..LevelConfig::default() };
        let level = floor_builder(&assets, &config).build().unwrap();
        assert_eq!(level.geometry().triangles()[0].edge_widths[0], 16);
    }

    #[test]
    fn test_missing_door_sprite() {
        let mut assets = AssetTable::new();
        assets.add_bitmap("dooropen", 20, 40);
        let config = LevelConfig::default();
        let error = LevelBuilder::new(&assets, &config).build().err().unwrap();
        assert_eq!(error.kind(), &ErrorKind::MissingSprite("doorshut"));
        assert_eq!(error.to_string(), "Level load - Unable to obtain doorshut sprite");
    }

    #[test]
    fn test_foreground_objects_are_split() {
        let assets = assets();
        let config = LevelConfig::default();
        let mut builder = LevelBuilder::new(&assets, &config);
        let cherry = builder.add_object_type(assets.obtain_bitmap("cherry").unwrap(), None);
        builder.add_object(v2(0.0, 0.0), 0.0, ObjectKind::Typed(cherry), ObjectFlags::FOREGROUND);
        builder.add_object(v2(5.0, 0.0), 0.0, ObjectKind::Typed(cherry), ObjectFlags::empty());
        let level = builder.build().unwrap();
        let root = level.display_tree().node(level.display_tree().root());
        assert_eq!(root.contents(), &[Container::Object(ObjectId(1))]);
        assert_eq!(root.post_contents(), &[Container::Object(ObjectId(0))]);
        assert!(level.collision_tree().node(level.collision_tree().root()).contents().is_empty());
    }
}
