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

//! Adaptive quadtree over level content.
//!
//! Every node covers an axis-aligned box. Leaves hold `Container`s, light
//! index entries naming an edge, triangle or object owned elsewhere. A leaf
//! that fills up is split into four quadrants, indexed so that bit 0 picks
//! the right half and bit 1 the bottom half:
//!
//! ```text
//!     0 | 1
//!    ---+---
//!     2 | 3
//! ```
//!
//! An item straddling a midline is stored in every child it overlaps, so the
//! same record may be reached through several leaves.

pub mod draw;


use crate::geom::{BoundingBox, Vec2, ERROR_BOUNDARY};
use crate::level::{EdgeId, ObjectId, TriangleId};
use log::debug;

/// Index entry stored in a quadtree leaf.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum Container {
    Edge(EdgeId),
    Triangle(TriangleId),
    Object(ObjectId),
}

impl Container {
    #[inline]
    pub fn is_object(self) -> bool {
        match self {
            Container::Object(_) => true,
            _ => false,
        }
    }
}

/// Supplies the box and layer of whatever a `Container` refers to.
pub trait ContentSource {
    fn bounds(&self, item: Container) -> BoundingBox;

    /// True for content drawn over the player rather than under.
    fn is_foreground(&self, item: Container) -> bool;
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
pub struct QuadTreeNode {
    bounds: BoundingBox,
    contents: Vec<Container>,
    post_contents: Vec<Container>,
    num_contents: usize,
    children: Option<[NodeId; 4]>,
}

impl QuadTreeNode {
    fn new(bounds: BoundingBox) -> QuadTreeNode {
        QuadTreeNode {
            bounds,
            contents: Vec::new(),
            post_contents: Vec::new(),
            num_contents: 0,
            children: None,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Background content. Objects come first once the tree is ordered.
    pub fn contents(&self) -> &[Container] {
        &self.contents
    }

    /// Foreground content, drawn after the player.
    pub fn post_contents(&self) -> &[Container] {
        &self.post_contents
    }

    /// Items ever added directly to this node. Not reduced by subdivision.
    pub fn num_contents(&self) -> usize {
        self.num_contents
    }

    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The edges stored in this leaf, in stored order.
    pub fn edges<'a>(&'a self) -> impl Iterator<Item = EdgeId> + 'a {
        self.contents.iter().filter_map(|item| match *item {
            Container::Edge(id) => Some(id),
            _ => None,
        })
    }

    /// The leading run of objects in this leaf.
    pub fn objects<'a>(&'a self) -> impl Iterator<Item = ObjectId> + 'a {
        self.contents.iter().take_while(|item| item.is_object()).filter_map(|item| match *item {
            Container::Object(id) => Some(id),
            _ => None,
        })
    }
}

/// Node arena rooted at `NodeId(0)`.
#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<QuadTreeNode>,
    threshold: usize,
    min_size: Vec2,
}

impl QuadTree {
    /// An empty tree covering `bounds`. A leaf is split when it reaches
    /// `threshold` items, provided it is wider than `min_size.x` and taller
    /// than `min_size.y`.
    pub fn new(bounds: BoundingBox, threshold: usize, min_size: Vec2) -> QuadTree {
        QuadTree { nodes: vec![QuadTreeNode::new(bounds)], threshold, min_size }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &QuadTreeNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].is_leaf() && self.nodes[0].contents.is_empty()
    }

    /// All leaves, in depth-first order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            match self.nodes[id.0].children {
                Some(children) => stack.extend(children.iter().rev()),
                None => result.push(id),
            }
        }
        result
    }

    /// Inserts `item` into every leaf its box is not separated from,
    /// splitting leaves that fill up.
    pub fn add_content<S: ContentSource + ?Sized>(&mut self, source: &S, item: Container) {
        let bounds = source.bounds(item);
        let root = self.root();
        self.add_to_node(source, root, item, &bounds);
    }

    fn add_to_node<S: ContentSource + ?Sized>(&mut self, source: &S, id: NodeId, item: Container, bounds: &BoundingBox) {
        if bounds.separated(&self.nodes[id.0].bounds) {
            return;
        }

        if let Some(children) = self.nodes[id.0].children {
            for &child in children.iter().rev() {
                self.add_to_node(source, child, item, bounds);
            }
            return;
        }

        let node = &mut self.nodes[id.0];
        node.contents.push(item);
        node.num_contents += 1;

        if node.num_contents == self.threshold
            && node.bounds.width() > self.min_size.x
            && node.bounds.height() > self.min_size.y
        {
            self.subdivide(source, id);
        }
    }

    fn subdivide<S: ContentSource + ?Sized>(&mut self, source: &S, id: NodeId) {
        let parent_bounds = self.nodes[id.0].bounds;
        debug!(
            "splitting quadtree node {} ({}x{}) at {} items",
            id.0,
            parent_bounds.width(),
            parent_bounds.height(),
            self.nodes[id.0].num_contents
        );

        let first = self.nodes.len();
        for child in 0..4 {
            self.nodes.push(QuadTreeNode::new(parent_bounds.quadrant(child)));
        }
        let children = [NodeId(first), NodeId(first + 1), NodeId(first + 2), NodeId(first + 3)];
        self.nodes[id.0].children = Some(children);

        let contents = std::mem::replace(&mut self.nodes[id.0].contents, Vec::new());
        for item in contents {
            let bounds = source.bounds(item);
            for &child in children.iter().rev() {
                self.add_to_node(source, child, item, &bounds);
            }
        }
    }

    /// The leaf containing `pos`.
    ///
    /// Within `ERROR_BOUNDARY` of a midline the quadrant is chosen by the
    /// sign of `vel` along that axis, preferring the side being moved into.
    pub fn get_node(&self, pos: Vec2, vel: Vec2) -> NodeId {
        let mut id = self.root();
        while let Some(children) = self.nodes[id.0].children {
            let bounds = &self.nodes[id.0].bounds;
            let mut child = bounds.child_index(pos);
            let centre = bounds.centre();
            if (pos.x - centre.x).abs() < ERROR_BOUNDARY {
                child = toggle(child, 1, vel.x);
            }
            if (pos.y - centre.y).abs() < ERROR_BOUNDARY {
                child = toggle(child, 2, vel.y);
            }
            id = children[child];
        }
        id
    }

    /// Rebuilds `visible` with every leaf not separated from `view`.
    pub fn collect_visible(&self, view: &BoundingBox, visible: &mut Vec<NodeId>) {
        visible.clear();
        self.collect_from(self.root(), view, visible);
    }

    fn collect_from(&self, id: NodeId, view: &BoundingBox, visible: &mut Vec<NodeId>) {
        let node = &self.nodes[id.0];
        if node.bounds.separated(view) {
            return;
        }
        match node.children {
            Some(children) => {
                for &child in children.iter() {
                    self.collect_from(child, view, visible);
                }
            }
            None => visible.push(id),
        }
    }

    /// Moves foreground content of every leaf into its post-contents list.
    pub fn split<S: ContentSource + ?Sized>(&mut self, source: &S) {
        for node in self.nodes.iter_mut().filter(|node| node.is_leaf()) {
            let (post, contents): (Vec<Container>, Vec<Container>) =
                node.contents.drain(..).partition(|&item| source.is_foreground(item));
            node.contents = contents;
            node.post_contents.extend(post);
        }
    }

    /// Stably reorders one list of every leaf so that objects come first.
    pub fn order(&mut self, post: bool) {
        for node in self.nodes.iter_mut().filter(|node| node.is_leaf()) {
            let list = if post { &mut node.post_contents } else { &mut node.contents };
            let (mut objects, others): (Vec<Container>, Vec<Container>) =
                list.drain(..).partition(|item| item.is_object());
            objects.extend(others);
            *list = objects;
        }
    }
}

fn toggle(child: usize, bit: usize, speed: f64) -> usize {
    if speed > 0.0 {
        child | bit
    } else if speed < 0.0 {
        child & !bit
    } else {
        child
    }
}
