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

// Turns authored collidable edges into an expanded boundary, pushed out by the
// player radius, with consistently connected edges.
//
// Each vertex shared by two edges is moved to the intersection of the two
// expanded lines, and each edge is then re-derived from its moved end points.
// An edge whose re-derived normal flips (or which shrinks to nothing) has been
// swallowed by its neighbours; it is spliced out and the process repeats until
// no edge collapses.

use crate::errors::{ErrorKind, Result};
use crate::geom::Vec2;
use crate::level::records::{Edge, EdgeId, Vertex};
use log::{debug, warn};

/// Edge storage while fixing runs. Collapsed edges leave a `None` behind so
/// ids stay stable until the list is compacted.
pub(crate) type EdgeSlots = Vec<Option<Edge>>;

/// Unit normal and offset of the line through `v1` and `v2`, oriented so the
/// normal points to the left of `v1 -> v2` in screen coordinates.
///
/// Returns `None` if the points are closer than one unit.
pub fn get_normal(v1: Vec2, v2: Vec2) -> Option<(Vec2, f64)> {
    let normal = Vec2::new(v2.y - v1.y, -(v2.x - v1.x));
    let length = normal.len();
    if length < 1.0 {
        return None;
    }
    let normal = Vec2::new(normal.x / length, normal.y / length);
    Some((normal, -v1.dot(normal)))
}

/// Sets up an edge from its authored end points, pushes it out by `radius`
/// and registers it with both end vertices.
pub(crate) fn init_edge(vertices: &mut [Vertex], edge: &mut Edge, id: EdgeId, radius: f64) {
    let [v0, v1] = edge.end_points;
    match get_normal(vertices[v0.0].pos, vertices[v1.0].pos) {
        Some((normal, c)) => {
            edge.normal = normal;
            edge.c = c - radius;
        }
        None => {
            // left with a zero normal; the first fix_edges pass removes it
            debug!("degenerate edge between vertices {} and {}", v0.0, v1.0);
        }
    }

    for &vertex in &[v0, v1] {
        let slots = &mut vertices[vertex.0].edges;
        if slots[0].is_none() {
            slots[0] = Some(id);
        } else {
            slots[1] = Some(id);
        }
    }
}

fn live<'a>(edges: &'a EdgeSlots, id: Option<EdgeId>) -> Option<&'a Edge> {
    id.and_then(|id| edges.get(id.0).and_then(|edge| edge.as_ref()))
}

// Where the first edge's expanded line meets the second edge's line.
fn intersection(vertices: &[Vertex], e1: &Edge, e2: &Edge, radius: f64) -> Option<Vec2> {
    let offset = e1.normal * radius;
    let p0 = vertices[e1.end_points[0].0].pos + offset;
    let p1 = vertices[e1.end_points[1].0].pos + offset;
    let d1 = e2.distance(p0);
    let d2 = e2.distance(p1);
    if d1 == d2 {
        return None;
    }
    let t = d1 / (d1 - d2);
    Some(p0 + (p1 - p0) * t)
}

/// Recomputes the expanded position of every vertex from its adjoining edges.
pub(crate) fn fix_verts(vertices: &mut [Vertex], edges: &EdgeSlots, radius: f64) {
    for index in 0..vertices.len() {
        let first = live(edges, vertices[index].edges[0]);
        let second = live(edges, vertices[index].edges[1]);
        let pos = vertices[index].pos;
        let normal = match (first, second) {
            (Some(e1), Some(e2)) => {
                intersection(vertices, e1, e2, radius).unwrap_or_else(|| pos + e1.normal * radius)
            }
            (Some(edge), None) | (None, Some(edge)) => {
                let direction = if edge.end_points[0].0 == index { 1.0 } else { -1.0 };
                pos + edge.normal * radius + edge.normal.perp() * (radius * direction)
            }
            (None, None) => continue,
        };
        vertices[index].normal = normal;
    }
}

/// Re-derives every edge from its end points' expanded positions, splicing
/// out edges that collapsed. Returns true if anything collapsed.
pub(crate) fn fix_edges(vertices: &mut [Vertex], edges: &mut EdgeSlots) -> bool {
    let mut not_finished = false;
    for index in 0..edges.len() {
        let (old_normal, [v0, v1]) = match edges[index] {
            Some(ref edge) => (edge.normal, edge.end_points),
            None => continue,
        };
        // a zero old normal marks an edge that was degenerate from the start
        match get_normal(vertices[v0.0].normal, vertices[v1.0].normal) {
            Some((normal, c)) if old_normal != Vec2::zero() && normal.dot(old_normal) >= 0.0 => {
                if let Some(ref mut edge) = edges[index] {
                    edge.normal = normal;
                    edge.c = c;
                }
            }
            _ => {
                debug!("edge {} collapsed while fixing", index);
                collapse_edge(vertices, edges, EdgeId(index));
                not_finished = true;
            }
        }
    }
    not_finished
}

// Removes an edge, reconnecting the edge that continued from its far end
// point to its near end point instead.
fn collapse_edge(vertices: &mut [Vertex], edges: &mut EdgeSlots, id: EdgeId) {
    let [v0, v1] = match edges[id.0].take() {
        Some(edge) => edge.end_points,
        None => return,
    };
    let next = match vertices[v1.0].edges {
        [Some(other), _] if other != id => Some(other),
        [_, Some(other)] if other != id => Some(other),
        _ => None,
    };

    let slots = &mut vertices[v0.0].edges;
    if slots[0] == Some(id) {
        if next.is_none() {
            slots[0] = slots[1];
            slots[1] = None;
        } else {
            slots[0] = next;
        }
    } else if slots[1] == Some(id) {
        slots[1] = next;
    }

    if let Some(next) = next {
        if let Some(ref mut next_edge) = edges[next.0] {
            if next_edge.end_points[0] == v1 {
                next_edge.end_points[0] = v0;
            } else {
                next_edge.end_points[1] = v0;
            }
        }
    }

    if v1 != v0 {
        vertices[v1.0].edges = [None, None];
    }
}

/// Alternates `fix_verts` and `fix_edges` until no edge collapses.
///
/// Returns the number of rounds used, or an error if `limit` rounds pass
/// without settling.
pub(crate) fn fix_geometry(vertices: &mut [Vertex], edges: &mut EdgeSlots, radius: f64, limit: usize) -> Result<usize> {
    let mut iterations = 0;
    loop {
        if iterations >= limit {
            warn!("edge fixing gave up after {} iterations", iterations);
            return Err(ErrorKind::DegenerateGeometry { iterations }.into());
        }
        iterations += 1;
        fix_verts(vertices, edges, radius);
        if !fix_edges(vertices, edges) {
            return Ok(iterations);
        }
    }
}

/// Drops collapsed edges, renumbering the survivors and the vertex
/// references to them.
pub(crate) fn compact_edges(vertices: &mut [Vertex], edges: EdgeSlots) -> Vec<Edge> {
    let mut remap = Vec::with_capacity(edges.len());
    let mut result = Vec::with_capacity(edges.len());
    for edge in edges {
        match edge {
            Some(edge) => {
                remap.push(Some(EdgeId(result.len())));
                result.push(edge);
            }
            None => remap.push(None),
        }
    }
    for vertex in vertices.iter_mut() {
        for slot in vertex.edges.iter_mut() {
            *slot = slot.and_then(|id| remap[id.0]);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::v2;
    use crate::level::records::{MaterialId, VertexId};

    fn polygon(points: &[Vec2], radius: f64) -> (Vec<Vertex>, EdgeSlots) {
        let mut vertices: Vec<Vertex> = points.iter().map(|&p| Vertex::new(p)).collect();
        let mut edges = EdgeSlots::new();
        for i in 0..points.len() {
            let mut edge = Edge::new([VertexId(i), VertexId((i + 1) % points.len())], MaterialId(0));
            init_edge(&mut vertices, &mut edge, EdgeId(i), radius);
            edges.push(Some(edge));
        }
        (vertices, edges)
    }

    #[test]
    fn test_get_normal() {
        let (normal, c) = get_normal(v2(0.0, 100.0), v2(100.0, 100.0)).unwrap();
        assert_eq!(normal, v2(0.0, -1.0));
        assert_eq!(c, 100.0);
        assert!(get_normal(v2(0.0, 0.0), v2(0.5, 0.5)).is_none());
    }

    #[test]
    fn test_single_edge_projects_ends() {
        let mut vertices = vec![Vertex::new(v2(0.0, 100.0)), Vertex::new(v2(100.0, 100.0))];
        let mut edge = Edge::new([VertexId(0), VertexId(1)], MaterialId(0));
        init_edge(&mut vertices, &mut edge, EdgeId(0), 5.0);
        assert_eq!(edge.c, 95.0);
        let mut edges = vec![Some(edge)];
        assert_eq!(fix_geometry(&mut vertices, &mut edges, 5.0, 4).unwrap(), 1);
        assert_eq!(vertices[0].normal, v2(-5.0, 95.0));
        assert_eq!(vertices[1].normal, v2(105.0, 95.0));
        let edge = edges[0].as_ref().unwrap();
        assert_eq!(edge.normal, v2(0.0, -1.0));
        assert_eq!(edge.c, 95.0);
    }

    #[test]
    fn test_square_expands_by_radius() {
        // clockwise on screen so the normals face outward
        let points = [v2(0.0, 0.0), v2(100.0, 0.0), v2(100.0, 100.0), v2(0.0, 100.0)];
        let radius = 10.0;
        let (mut vertices, mut edges) = polygon(&points, radius);
        let iterations = fix_geometry(&mut vertices, &mut edges, radius, 6).unwrap();
        assert_eq!(iterations, 1);
        for (vertex, &point) in vertices.iter().zip(points.iter()) {
            let centre = v2(50.0, 50.0);
            let outward = v2((point.x - centre.x).signum(), (point.y - centre.y).signum());
            let expected = point + outward * radius;
            assert!(vertex.normal.dist_sq(expected) < 1e-9, "{:?} vs {:?}", vertex.normal, expected);
        }
        for (i, edge) in edges.iter().enumerate() {
            let edge = edge.as_ref().unwrap();
            let raw = points[i];
            assert!((edge.distance(raw) + radius).abs() < 1e-9);
        }
    }

    #[test]
    fn test_notch_collapses() {
        // a slot narrower than the player, cut into the underside of a block
        let points = [
            v2(0.0, 0.0),
            v2(100.0, 0.0),
            v2(100.0, 100.0),
            v2(55.0, 100.0),
            v2(55.0, 90.0),
            v2(45.0, 90.0),
            v2(45.0, 100.0),
            v2(0.0, 100.0),
        ];
        let radius = 10.0;
        let (mut vertices, mut edges) = polygon(&points, radius);
        let iterations = fix_geometry(&mut vertices, &mut edges, radius, points.len() + 2).unwrap();
        assert!(iterations > 1);
        let survivors = edges.iter().filter(|edge| edge.is_some()).count();
        assert!(survivors < points.len());
        let edges = compact_edges(&mut vertices, edges);
        assert_eq!(edges.len(), survivors);
        for vertex in &vertices {
            for slot in vertex.edges.iter() {
                if let Some(id) = *slot {
                    assert!(id.0 < edges.len());
                }
            }
        }
    }

    #[test]
    fn test_degenerate_edge_is_removed() {
        let mut vertices = vec![Vertex::new(v2(0.0, 0.0)), Vertex::new(v2(0.5, 0.0))];
        let mut edge = Edge::new([VertexId(0), VertexId(1)], MaterialId(0));
        init_edge(&mut vertices, &mut edge, EdgeId(0), 5.0);
        let mut edges = vec![Some(edge)];
        assert_eq!(fix_geometry(&mut vertices, &mut edges, 5.0, 4).unwrap(), 2);
        assert!(edges[0].is_none());
        assert_eq!(vertices[0].edges, [None, None]);
        assert_eq!(vertices[1].edges, [None, None]);
    }

    #[test]
    fn test_degenerate_edge_between_neighbours_is_removed() {
        let points = [v2(0.0, 100.0), v2(50.0, 100.0), v2(50.5, 100.0), v2(100.0, 100.0)];
        let mut vertices: Vec<Vertex> = points.iter().map(|&p| Vertex::new(p)).collect();
        let mut edges = EdgeSlots::new();
        for i in 0..3 {
            let mut edge = Edge::new([VertexId(i), VertexId(i + 1)], MaterialId(0));
            init_edge(&mut vertices, &mut edge, EdgeId(i), 5.0);
            edges.push(Some(edge));
        }
        assert_eq!(fix_geometry(&mut vertices, &mut edges, 5.0, 4).unwrap(), 2);
        assert!(edges[1].is_none());
        assert_eq!(vertices[1].edges, [Some(EdgeId(0)), Some(EdgeId(2))]);
        assert_eq!(vertices[2].edges, [None, None]);
        let last = edges[2].as_ref().unwrap();
        assert_eq!(last.end_points, [VertexId(1), VertexId(3)]);
        assert_eq!(last.normal, v2(0.0, -1.0));
        assert_eq!(vertices[1].normal, v2(50.0, 95.0));
    }

    #[test]
    fn test_limit_is_reported() {
        let mut vertices = vec![Vertex::new(v2(0.0, 0.0)), Vertex::new(v2(0.5, 0.0))];
        let mut edge = Edge::new([VertexId(0), VertexId(1)], MaterialId(0));
        init_edge(&mut vertices, &mut edge, EdgeId(0), 5.0);
        let mut edges = vec![Some(edge)];
        let error = fix_geometry(&mut vertices, &mut edges, 5.0, 1).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::DegenerateGeometry { iterations: 1 });
    }
}
