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

use crate::assets::SampleId;
use crate::geom::Vec2;
use crate::level::{Level, ObjectFlags, ObjectId};
use crate::quadtree::NodeId;

/// Collection counters for one play of a level.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Progress {
    /// Objects still needed to open the door. Negative once the player has
    /// walked through the open door.
    pub required_left: i32,
    pub total_left: i32,
}

impl Progress {
    pub fn new(level: &Level) -> Progress {
        Progress {
            required_left: level.objects_required() as i32,
            total_left: level.total_objects() as i32,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.required_left < 0
    }
}

/// Something the player touched during one `collect` call.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Pickup {
    /// An item was collected and hidden.
    Item { object: ObjectId, sound: Option<SampleId> },
    /// The player reached the open door.
    Door { sound: Option<SampleId> },
}

/// Collects every visible object in the collision leaf `leaf` within pickup
/// range of `player`.
///
/// `leaf` is the node returned by `run_physics`. Collecting the last required
/// item opens the door.
pub fn collect(level: &mut Level, leaf: NodeId, player: Vec2, progress: &mut Progress) -> Vec<Pickup> {
    let candidates: Vec<ObjectId> = level.collision_tree().node(leaf).objects().collect();
    let mut found = Vec::new();
    for id in candidates {
        let (is_door, sound) = {
            let geometry = level.geometry();
            let object = geometry.object(id);
            if !object.is_visible() {
                continue;
            }
            let kind = geometry.object_type(object.kind);
            if object.pos.dist_sq(player) > kind.radius * kind.radius {
                continue;
            }
            (object.is_door(), kind.collect_sound)
        };

        if is_door {
            if progress.required_left == 0 {
                found.push(Pickup::Door { sound });
                progress.required_left = -1;
            }
            continue;
        }

        level.object_mut(id).flags.remove(ObjectFlags::VISIBLE);
        found.push(Pickup::Item { object: id, sound });
        if progress.required_left > 0 {
            progress.required_left -= 1;
            if progress.required_left == 0 {
                level.set_door_open();
            }
        }
        progress.total_left -= 1;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetTable;
    use crate::config::LevelConfig;
    use crate::geom::v2;
    use crate::level::{LevelBuilder, ObjectKind};

    fn assets() -> AssetTable {
        let mut assets = AssetTable::new();
        assets.add_bitmap("dooropen", 20, 40);
        assets.add_bitmap("doorshut", 20, 40);
        assets.add_bitmap("cherry", 10, 10);
        assets.add_sample("ding");
        assets.add_sample("dooropen");
        assets
    }

    // two cherries and a door, all collidable, in a single root leaf
    fn level(assets: &AssetTable, required: usize) -> Level {
        let config = LevelConfig { collision_radius: 5.0, ..LevelConfig::default() };
        let mut builder = LevelBuilder::new(assets, &config);
        let cherry = builder.add_object_type(assets.obtain_bitmap("cherry").unwrap(), assets.obtain_sample("ding"));
        builder.add_object(v2(0.0, 0.0), 0.0, ObjectKind::Typed(cherry), ObjectFlags::COLLIDABLE);
        builder.add_object(v2(100.0, 0.0), 0.0, ObjectKind::Typed(cherry), ObjectFlags::COLLIDABLE);
        builder.add_object(v2(200.0, 0.0), 0.0, ObjectKind::Door, ObjectFlags::COLLIDABLE);
        builder.set_stats(Vec2::zero(), required);
        builder.build().unwrap()
    }

    #[test]
    fn test_collect_item() {
        let assets = assets();
        let mut level = level(&assets, 2);
        let mut progress = Progress::new(&level);
        assert_eq!(progress, Progress { required_left: 2, total_left: 2 });

        let leaf = level.get_collision_node(v2(3.0, 4.0), Vec2::zero());
        let found = collect(&mut level, leaf, v2(3.0, 4.0), &mut progress);
        assert_eq!(found, vec![Pickup::Item { object: ObjectId(0), sound: assets.obtain_sample("ding") }]);
        assert!(!level.geometry().object(ObjectId(0)).is_visible());
        assert_eq!(progress, Progress { required_left: 1, total_left: 1 });
        assert!(!level.is_door_open());

        // already collected
        assert!(collect(&mut level, leaf, v2(3.0, 4.0), &mut progress).is_empty());
    }

    #[test]
    fn test_range_is_inclusive() {
        let assets = assets();
        let mut level = level(&assets, 2);
        let mut progress = Progress::new(&level);
        let leaf = level.collision_tree().root();
        // radius is 10 + 5
        assert!(collect(&mut level, leaf, v2(100.0, 15.5), &mut progress).is_empty());
        assert_eq!(collect(&mut level, leaf, v2(100.0, 15.0), &mut progress).len(), 1);
    }

    #[test]
    fn test_door_needs_quota() {
        let assets = assets();
        let mut level = level(&assets, 1);
        let mut progress = Progress::new(&level);
        let leaf = level.collision_tree().root();

        assert!(collect(&mut level, leaf, v2(200.0, 0.0), &mut progress).is_empty());
        assert!(!progress.is_complete());

        collect(&mut level, leaf, v2(100.0, 0.0), &mut progress);
        assert_eq!(progress, Progress { required_left: 0, total_left: 1 });
        assert!(level.is_door_open());
        assert_eq!(level.geometry().door().image, assets.obtain_bitmap("dooropen").unwrap());

        let found = collect(&mut level, leaf, v2(200.0, 0.0), &mut progress);
        assert_eq!(found, vec![Pickup::Door { sound: assets.obtain_sample("dooropen") }]);
        assert!(progress.is_complete());
        assert!(level.geometry().object(ObjectId(2)).is_visible());
    }

    #[test]
    fn test_extra_items_after_quota() {
        let assets = assets();
        let mut level = level(&assets, 1);
        let mut progress = Progress::new(&level);
        let leaf = level.collision_tree().root();
        collect(&mut level, leaf, v2(0.0, 0.0), &mut progress);
        collect(&mut level, leaf, v2(100.0, 0.0), &mut progress);
        assert_eq!(progress, Progress { required_left: 0, total_left: 0 });
    }
}
