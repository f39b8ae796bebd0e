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

//! Named bitmaps and samples owned by the presentation layer.
//!
//! The level core never touches pixels or audio. It only needs to resolve the
//! names written in a level file to handles it can pass back out through a
//! `Canvas`, plus the bitmap dimensions that feed into object radii.

use fnv::FnvHashMap;

/// Handle to a bitmap registered in an `AssetTable`.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub struct BitmapId(usize);

/// Handle to a sound sample registered in an `AssetTable`.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub struct SampleId(usize);

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
}

#[derive(Default)]
pub struct AssetTable {
    bitmaps: Vec<Bitmap>,
    bitmap_names: FnvHashMap<String, BitmapId>,
    sample_names: FnvHashMap<String, SampleId>,
    sample_count: usize,
}

impl AssetTable {
    pub fn new() -> AssetTable {
        AssetTable::default()
    }

    /// Registers a bitmap under `name`, replacing any earlier one of that name.
    pub fn add_bitmap<S: Into<String>>(&mut self, name: S, width: u32, height: u32) -> BitmapId {
        let id = BitmapId(self.bitmaps.len());
        self.bitmaps.push(Bitmap { width, height });
        self.bitmap_names.insert(name.into(), id);
        id
    }

    /// Registers a sample under `name`, replacing any earlier one of that name.
    pub fn add_sample<S: Into<String>>(&mut self, name: S) -> SampleId {
        let id = SampleId(self.sample_count);
        self.sample_count += 1;
        self.sample_names.insert(name.into(), id);
        id
    }

    pub fn obtain_bitmap(&self, name: &str) -> Option<BitmapId> {
        self.bitmap_names.get(name).cloned()
    }

    pub fn obtain_sample(&self, name: &str) -> Option<SampleId> {
        self.sample_names.get(name).cloned()
    }

    pub fn bitmap(&self, id: BitmapId) -> Bitmap {
        self.bitmaps[id.0]
    }

    /// Index of `id` in registration order, for presentation layers that keep
    /// their own parallel storage.
    pub fn bitmap_index(id: BitmapId) -> usize {
        id.0
    }

    pub fn sample_index(id: SampleId) -> usize {
        id.0
    }
}
