use std::fmt::Write;
use std::ops::Range;

use log::{debug, warn};
use ultraviolet::Vec2;

use crate::body::{Body, ForceModel, radius_for_mass};
use crate::config::OpeningCriterion;
use crate::geometry::{Point, Quadrant, Rectangle};

/// Subdivision stops here; points that would need a deeper node are dropped.
pub const MAX_DEPTH: u32 = 32;

/// A point stored in a leaf, together with its mass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointMass {
    pub pos: Point,
    pub mass: f32,
    /// Collision radius used as the distance floor for leaf interactions.
    pub radius: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Node {
    /// Index of the first of four contiguous children (0 if leaf).
    pub children: u32,
    /// Index of the node visited after this subtree (0 if none).
    pub next: u32,
    /// Center of mass of the subtree.
    pub com: Vec2,
    /// Total mass of the subtree.
    pub mass: f32,
    /// Spatial bounds of the node.
    pub boundary: Rectangle,
    /// Root is 1.
    pub depth: u32,
    /// Offset of this node's point slots in the tree's point pool.
    pub points_start: u32,
    /// Number of points stored directly in this node (0 once subdivided).
    pub points_len: u32,
}

impl Node {
    fn new(next: u32, boundary: Rectangle, depth: u32, points_start: u32) -> Self {
        Self {
            children: 0,
            next,
            com: Vec2::zero(),
            mass: 0.0,
            boundary,
            depth,
            points_start,
            points_len: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children == 0
    }

    pub fn is_branch(&self) -> bool {
        self.children != 0
    }

    pub fn is_empty(&self) -> bool {
        self.mass <= 0.0
    }

    fn points(&self) -> Range<usize> {
        let start = self.points_start as usize;
        start..start + self.points_len as usize
    }
}

/// Barnes-Hut quadtree over point masses.
///
/// Nodes live in a flat vector; the four children of a node are contiguous and
/// ordered as [`Quadrant::ALL`]. Every node reserves `capacity` slots in a shared
/// point pool when it is created, so both node and point storage are plain `Copy`
/// data and [`Quadtree::clear`] only truncates two vectors.
#[derive(Debug, Clone)]
pub struct Quadtree {
    nodes: Vec<Node>,
    points: Vec<PointMass>,
    boundary: Rectangle,
    capacity: usize,
}

impl Quadtree {
    pub const ROOT: usize = 0;

    pub fn new(boundary: Rectangle) -> Self {
        Self::with_capacity(boundary, 1)
    }

    /// Capacities above 1 can hold several points per leaf but cannot subdivide;
    /// splitting a leaf with more than one buffered point panics.
    pub fn with_capacity(boundary: Rectangle, capacity: usize) -> Self {
        assert!(capacity > 0, "leaf capacity must be at least 1");
        let mut tree = Self {
            nodes: Vec::new(),
            points: Vec::new(),
            boundary,
            capacity,
        };
        tree.clear();
        tree
    }

    /// Drops every node and point, leaving an empty root leaf.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.points.clear();
        let root = self.alloc_node(0, self.boundary, 1);
        self.nodes.push(root);
    }

    pub fn boundary(&self) -> Rectangle {
        self.boundary
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().is_empty()
    }

    pub fn total_mass(&self) -> f32 {
        self.root().mass
    }

    pub fn center_of_mass(&self) -> Vec2 {
        self.root().com
    }

    /// Points stored directly in `node`.
    pub fn stored(&self, node: &Node) -> &[PointMass] {
        &self.points[node.points()]
    }

    fn alloc_node(&mut self, next: u32, boundary: Rectangle, depth: u32) -> Node {
        let start = self.points.len() as u32;
        self.points
            .extend(std::iter::repeat_n(PointMass::default(), self.capacity));
        Node::new(next, boundary, depth, start)
    }

    /// Inserts a point mass. Returns false when the point lies outside the tree
    /// or could not be placed in any leaf.
    pub fn insert(&mut self, pos: Point, mass: f32) -> bool {
        let point = PointMass {
            pos,
            mass,
            radius: radius_for_mass(mass),
        };
        self.insert_at(Self::ROOT, point)
    }

    fn insert_at(&mut self, node: usize, point: PointMass) -> bool {
        let pos = point.pos;
        if !self.nodes[node].boundary.contains(pos) {
            return false;
        }

        if self.nodes[node].is_leaf() {
            let range = self.nodes[node].points();
            if let Some(slot) = range.clone().find(|&i| self.points[i].pos == pos) {
                // Coincident points can never be split apart; merge them. The entry keeps
                // the larger of the two body radii, not the radius of the summed mass.
                debug!("merging coincident point at ({}, {})", pos.x, pos.y);
                let stored = &mut self.points[slot];
                stored.mass += point.mass;
                stored.radius = stored.radius.max(point.radius);
                self.refresh_leaf(node);
                return true;
            }

            if range.len() < self.capacity {
                self.points[range.end] = point;
                self.nodes[node].points_len += 1;
                self.refresh_leaf(node);
                return true;
            }

            if self.nodes[node].depth >= MAX_DEPTH {
                warn!(
                    "dropping point ({}, {}): leaf at maximum depth {} is full",
                    pos.x, pos.y, MAX_DEPTH
                );
                return false;
            }

            if !self.subdivide(node) {
                warn!(
                    "dropping point ({}, {}): node {} cannot be split any further",
                    pos.x, pos.y, node
                );
                return false;
            }
        }

        let first = self.nodes[node].children as usize;
        let accepted = (first..first + 4).any(|child| self.insert_at(child, point));
        if !accepted {
            warn!(
                "dropping point ({}, {}): no quadrant of node {} contains it",
                pos.x, pos.y, node
            );
        }
        self.aggregate(node);
        accepted
    }

    /// Splits a leaf into four children and pushes its buffered point down.
    ///
    /// Returns false and leaves the leaf untouched when a buffered point fits none
    /// of the quadrants, which happens once rounding collapses the boundary.
    fn subdivide(&mut self, node: usize) -> bool {
        let parent = self.nodes[node];
        assert!(
            parent.points_len <= 1,
            "cannot redistribute {} buffered points on subdivision; leaf capacity must be 1",
            parent.points_len
        );

        let quads = parent.boundary.quadrants();
        let fits = self.points[parent.points()]
            .iter()
            .all(|p| quads.iter().any(|q| q.contains(p.pos)));
        if !fits {
            return false;
        }

        let children = self.nodes.len() as u32;
        // Link the children together and the last one to the parent's successor,
        // so read-only walks need no stack.
        let nexts = [children + 1, children + 2, children + 3, parent.next];
        for (next, quad) in nexts.into_iter().zip(quads) {
            let child = self.alloc_node(next, quad, parent.depth + 1);
            self.nodes.push(child);
        }
        self.nodes[node].children = children;
        self.nodes[node].points_len = 0;

        let first = children as usize;
        for slot in parent.points() {
            let p = self.points[slot];
            let child = (first..first + 4).find(|&c| self.nodes[c].boundary.contains(p.pos));
            if let Some(child) = child {
                self.insert_at(child, p);
            }
        }
        true
    }

    /// Recomputes mass and center of mass of a leaf from its stored points.
    fn refresh_leaf(&mut self, node: usize) {
        let (mass, weighted) = self.points[self.nodes[node].points()]
            .iter()
            .fold((0.0, Vec2::zero()), |(m, w), p| (m + p.mass, w + p.pos * p.mass));
        self.set_aggregate(node, mass, weighted);
    }

    /// Recomputes mass and center of mass of a branch from its four children.
    fn aggregate(&mut self, node: usize) {
        let i = self.nodes[node].children as usize;
        let (mass, weighted) = self.nodes[i..i + 4]
            .iter()
            .fold((0.0, Vec2::zero()), |(m, w), c| (m + c.mass, w + c.com * c.mass));
        self.set_aggregate(node, mass, weighted);
    }

    fn set_aggregate(&mut self, node: usize, mass: f32, weighted: Vec2) {
        let n = &mut self.nodes[node];
        n.mass = mass;
        n.com = if mass > 0.0 { weighted / mass } else { Vec2::zero() };
    }

    /// Barnes-Hut force on `target` from every point in the tree.
    ///
    /// Leaves are summed exactly, skipping any stored point at the target's own
    /// position. A branch is collapsed to a single mass at its center of mass when
    /// `criterion` accepts it and it does not contain the target; otherwise its
    /// children are visited.
    pub fn calculate_force(
        &self,
        target: &Body,
        model: &ForceModel,
        criterion: &OpeningCriterion,
    ) -> Vec2 {
        let mut force = Vec2::zero();
        let mut node_idx = Self::ROOT;

        loop {
            let n = &self.nodes[node_idx];

            let descend = if n.is_empty() {
                false
            } else if n.is_leaf() {
                for p in self.stored(n) {
                    if p.pos == target.pos {
                        continue;
                    }
                    force += model.force(
                        target.pos,
                        target.mass,
                        p.pos,
                        p.mass,
                        target.radius + p.radius,
                    );
                }
                false
            } else {
                let d = (n.com - target.pos).mag();
                if !n.boundary.contains(target.pos) && criterion.accepts(&n.boundary, d) {
                    force += model.force(target.pos, target.mass, n.com, n.mass, target.radius);
                    false
                } else {
                    true
                }
            };

            if descend {
                node_idx = n.children as usize;
            } else {
                if n.next == 0 {
                    break;
                }
                node_idx = n.next as usize;
            }
        }

        force
    }

    /// Collects every stored point inside `range`.
    pub fn query(&self, range: &Rectangle) -> Vec<Point> {
        let mut found = Vec::new();
        let mut node_idx = Self::ROOT;

        loop {
            let n = &self.nodes[node_idx];

            if range.intersects(&n.boundary) && n.is_branch() {
                node_idx = n.children as usize;
                continue;
            }
            if range.intersects(&n.boundary) {
                found.extend(
                    self.stored(n)
                        .iter()
                        .map(|p| p.pos)
                        .filter(|&pos| range.contains(pos)),
                );
            }

            if n.next == 0 {
                break;
            }
            node_idx = n.next as usize;
        }

        found
    }

    /// Index of the leaf whose boundary contains `pos`, if `pos` is inside the tree.
    pub fn leaf_containing(&self, pos: Point) -> Option<usize> {
        if !self.boundary.contains(pos) {
            return None;
        }
        let mut node_idx = Self::ROOT;
        while self.nodes[node_idx].is_branch() {
            let first = self.nodes[node_idx].children as usize;
            node_idx = (first..first + 4).find(|&c| self.nodes[c].boundary.contains(pos))?;
        }
        Some(node_idx)
    }

    /// Human-readable indented dump, one line per node.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(Self::ROOT, "root", &mut out);
        out
    }

    fn dump_node(&self, node_idx: usize, label: &str, out: &mut String) {
        let n = &self.nodes[node_idx];
        let b = n.boundary;
        let indent = "  ".repeat(n.depth as usize - 1);
        let _ = write!(
            out,
            "{indent}{label} ({:.1}, {:.1}) {:.1}x{:.1} ",
            b.x,
            b.y,
            b.width(),
            b.height()
        );
        if n.is_empty() {
            let _ = writeln!(out, "empty");
        } else {
            let _ = writeln!(
                out,
                "occupied mass={:.2} com=({:.1}, {:.1})",
                n.mass, n.com.x, n.com.y
            );
        }

        if n.is_branch() {
            let first = n.children as usize;
            for (i, quadrant) in Quadrant::ALL.iter().enumerate() {
                self.dump_node(first + i, quadrant.label(), out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tree() -> Quadtree {
        Quadtree::new(Rectangle::from_extent(100.0, 100.0))
    }

    #[test]
    fn rejects_points_outside() {
        let mut t = tree();
        assert!(!t.insert(Vec2::new(100.0, 50.0), 1.0));
        assert!(!t.insert(Vec2::new(-0.1, 50.0), 1.0));
        assert_eq!(t.len(), 1);
        assert!(t.is_empty());
    }

    #[test]
    fn second_point_subdivides_root() {
        let mut t = tree();
        assert!(t.insert(Vec2::new(75.0, 25.0), 2.0));
        assert!(t.root().is_leaf());
        assert!(t.insert(Vec2::new(25.0, 75.0), 2.0));
        assert!(t.root().is_branch());
        assert_eq!(t.root().points_len, 0);
        assert_eq!(t.len(), 5);

        let first = t.root().children as usize;
        let ne = &t.nodes()[first];
        let sw = &t.nodes()[first + 3];
        assert_eq!(ne.depth, 2);
        assert_eq!(t.stored(ne)[0].pos, Vec2::new(75.0, 25.0));
        assert_eq!(t.stored(sw)[0].pos, Vec2::new(25.0, 75.0));
        assert_relative_eq!(t.total_mass(), 4.0);
        assert_relative_eq!(t.center_of_mass().x, 50.0);
        assert_relative_eq!(t.center_of_mass().y, 50.0);
    }

    #[test]
    fn coincident_points_merge() {
        let mut t = tree();
        assert!(t.insert(Vec2::new(10.0, 10.0), 1.0));
        assert!(t.insert(Vec2::new(10.0, 10.0), 3.0));
        assert!(t.root().is_leaf());
        assert_relative_eq!(t.total_mass(), 4.0);
    }

    #[test]
    fn merged_entry_keeps_body_radius() {
        let mut t = tree();
        t.insert(Vec2::new(10.0, 10.0), 25.0);
        t.insert(Vec2::new(10.0, 10.0), 16.0);
        let stored = t.stored(t.root())[0];
        assert_relative_eq!(stored.mass, 41.0);
        assert_relative_eq!(stored.radius, 10.0);
    }

    #[test]
    fn unsplittable_leaf_keeps_its_point() {
        let mut t = Quadtree::new(Rectangle::from_extent(600.0, 600.0));
        let a = Vec2::new(300.0, 300.0);
        assert!(t.insert(a, 1.0));

        // Adjacent floats: splitting eventually stops separating them.
        let b = Vec2::new(300.00003, 300.0);
        assert_ne!(a, b);
        let accepted = t.insert(b, 1.0);

        let expected = if accepted { 2.0 } else { 1.0 };
        assert_relative_eq!(t.total_mass(), expected);
        let leaf = t.leaf_containing(a).unwrap();
        assert!(t.stored(&t.nodes()[leaf]).iter().any(|p| p.pos == a));
        assert!(t.query(&Rectangle::new(300.0, 300.0, 1.0, 1.0)).contains(&a));
    }

    #[test]
    fn clear_resets_to_empty_leaf() {
        let mut t = tree();
        t.insert(Vec2::new(10.0, 10.0), 1.0);
        t.insert(Vec2::new(90.0, 90.0), 1.0);
        t.clear();
        assert_eq!(t.len(), 1);
        assert!(t.root().is_leaf());
        assert!(t.is_empty());
        assert_eq!(t.root().depth, 1);
    }

    #[test]
    #[should_panic(expected = "cannot redistribute")]
    fn subdividing_multi_point_leaf_panics() {
        let mut t = Quadtree::with_capacity(Rectangle::from_extent(100.0, 100.0), 2);
        t.insert(Vec2::new(10.0, 10.0), 1.0);
        t.insert(Vec2::new(60.0, 10.0), 1.0);
        t.insert(Vec2::new(60.0, 60.0), 1.0);
    }

    #[test]
    fn next_links_cover_every_node_once() {
        let mut t = tree();
        for (x, y) in [(10.0, 10.0), (12.0, 11.0), (80.0, 20.0), (40.0, 70.0), (41.0, 71.0)] {
            t.insert(Vec2::new(x, y), 1.0);
        }
        let mut seen = vec![false; t.len()];
        let mut idx = Quadtree::ROOT;
        loop {
            let n = &t.nodes()[idx];
            assert!(!seen[idx]);
            seen[idx] = true;
            idx = if n.is_branch() {
                n.children as usize
            } else if n.next == 0 {
                break;
            } else {
                n.next as usize
            };
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn query_returns_points_in_range() {
        let mut t = tree();
        for (x, y) in [(10.0, 10.0), (20.0, 20.0), (80.0, 80.0), (55.0, 45.0)] {
            t.insert(Vec2::new(x, y), 1.0);
        }
        let mut found = t.query(&Rectangle::new(15.0, 15.0, 10.0, 10.0));
        found.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(found, vec![Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0)]);
        assert!(t.query(&Rectangle::new(-50.0, -50.0, 5.0, 5.0)).is_empty());
    }

    #[test]
    fn dump_marks_empty_and_occupied() {
        let mut t = tree();
        t.insert(Vec2::new(75.0, 25.0), 1.0);
        t.insert(Vec2::new(25.0, 75.0), 1.0);
        let dump = t.dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("root (50.0, 50.0) 100.0x100.0 occupied mass=2.00"));
        assert!(lines[1].starts_with("  NE (75.0, 25.0) 50.0x50.0 occupied"));
        assert!(lines[2].starts_with("  NW") && lines[2].ends_with("empty"));
        assert!(lines[3].starts_with("  SE") && lines[3].ends_with("empty"));
        assert!(lines[4].starts_with("  SW") && lines[4].contains("occupied"));
    }
}
