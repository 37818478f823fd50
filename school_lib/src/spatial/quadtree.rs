use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{error::SchoolResult, options::OutOfBoundsPolicy};

use super::{
    arena::{NodeArena, NodeHandle},
    tracker::Tracker,
};

/// Points a node keeps inline before its list spills onto the heap, enough for
/// the default node capacity.
pub const INLINE_POINTS: usize = 4;

/// One region of the tree, the box `[center - extents, center + extents)`.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub center: Vec2,
    /// half width and half height
    pub extents: Vec2,
    pub capacity: usize,
    pub points: SmallVec<[Vec2; INLINE_POINTS]>,
    /// first of the four contiguous quadrant nodes, present iff subdivided
    pub children: Option<NodeHandle>,
}

impl QuadNode {
    pub fn new(center: Vec2, extents: Vec2, capacity: usize) -> Self {
        QuadNode {
            center,
            extents,
            capacity,
            points: SmallVec::new(),
            children: None,
        }
    }

    /// Turns a recycled arena slot back into an empty leaf.
    pub(crate) fn reinit(&mut self, center: Vec2, extents: Vec2, capacity: usize) {
        self.center = center;
        self.extents = extents;
        self.capacity = capacity;
        self.points.clear();
        self.children = None;
    }

    pub fn min_x(&self) -> f32 {
        self.center.x - self.extents.x
    }

    pub fn max_x(&self) -> f32 {
        self.center.x + self.extents.x
    }

    pub fn min_y(&self) -> f32 {
        self.center.y - self.extents.y
    }

    pub fn max_y(&self) -> f32 {
        self.center.y + self.extents.y
    }

    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }

    /// Half-open containment, a point on the max edge belongs to the neighbour.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// Separating axis test against the square of half width `radius` around
    /// `origin`.
    pub fn intersects_square(&self, origin: Vec2, radius: f32) -> bool {
        !(origin.x - radius > self.max_x()
            || origin.x + radius < self.min_x()
            || origin.y - radius > self.max_y()
            || origin.y + radius < self.min_y())
    }
}

/// Is `point` inside the half-open square of half width `radius` around `origin`.
///
/// The neighbourhood is a square, callers filter by true distance afterwards.
#[inline]
pub fn in_square(point: Vec2, origin: Vec2, radius: f32) -> bool {
    point.x >= origin.x - radius
        && point.x < origin.x + radius
        && point.y >= origin.y - radius
        && point.y < origin.y + radius
}

/// Node and point counts of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub points: usize,
    /// the root alone has depth 1
    pub max_depth: usize,
}

/// Outcome of bulk inserting one tick's positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub inserted: usize,
    pub dropped: usize,
}

/// Region quadtree rebuilt from scratch every tick on top of a [`NodeArena`].
///
/// A node stores up to `node_capacity` points itself, the insertion that finds
/// it full subdivides it into four quadrants. Points already stored stay where
/// they are, only later insertions are routed into the quadrants.
pub struct QuadTree {
    arena: NodeArena,
    root: NodeHandle,
    node_capacity: usize,
}

impl QuadTree {
    pub fn new(
        center: Vec2,
        extents: Vec2,
        node_capacity: usize,
        arena_capacity: usize,
    ) -> SchoolResult<Self> {
        let mut arena = NodeArena::new(arena_capacity);
        let root = arena.allocate(center, extents, node_capacity)?;

        Ok(QuadTree {
            arena,
            root,
            node_capacity,
        })
    }

    /// Throws the whole tree away and starts over with an empty root.
    pub fn rebuild(&mut self, center: Vec2, extents: Vec2) -> SchoolResult<()> {
        self.arena.reset();
        self.root = self.arena.allocate(center, extents, self.node_capacity)?;
        Ok(())
    }

    /// Rebuilds the tree around `center` with square extents `radius` and
    /// inserts all `points`.
    pub fn build(
        &mut self,
        points: &[Vec2],
        center: Vec2,
        radius: f32,
        policy: OutOfBoundsPolicy,
    ) -> SchoolResult<BuildReport> {
        self.rebuild(center, Vec2::new(radius, radius))?;

        let mut report = BuildReport::default();
        for point in points {
            let point = match policy {
                OutOfBoundsPolicy::Drop => *point,
                OutOfBoundsPolicy::Clamp => self.clamp_to_root(*point),
            };

            if self.insert(point)? {
                report.inserted += 1;
            } else {
                debug!(x = point.x, y = point.y, "position outside of the school region, dropped");
                report.dropped += 1;
            }
        }

        Ok(report)
    }

    /// Inserts one point, `Ok(false)` when no node of the tree contains it.
    pub fn insert(&mut self, point: Vec2) -> SchoolResult<bool> {
        self.insert_at(self.root, point)
    }

    fn insert_at(&mut self, handle: NodeHandle, point: Vec2) -> SchoolResult<bool> {
        let node = &mut self.arena[handle];
        if !node.contains(point) {
            return Ok(false);
        }

        if node.points.len() < node.capacity {
            node.points.push(point);
            return Ok(true);
        }

        let children = node.children;
        let first = match children {
            Some(first) => first,
            None => self.subdivide(handle)?,
        };

        for i in 0..4 {
            if self.insert_at(first.offset(i), point)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn subdivide(&mut self, handle: NodeHandle) -> SchoolResult<NodeHandle> {
        let (center, half_extents, capacity) = {
            let node = &self.arena[handle];
            (node.center, node.extents / 2., node.capacity)
        };

        let first = self
            .arena
            .allocate_quadrants(center, half_extents, capacity)?;
        self.arena[handle].children = Some(first);

        trace!(node = handle.index(), first_child = first.index(), "subdivided");
        Ok(first)
    }

    /// Collects every stored point inside the square of half width `radius`
    /// around `origin`.
    pub fn query_range(&self, origin: Vec2, radius: f32, out: &mut Vec<Vec2>) {
        self.query_at(self.root, origin, radius, out)
    }

    fn query_at(&self, handle: NodeHandle, origin: Vec2, radius: f32, out: &mut Vec<Vec2>) {
        let node = &self.arena[handle];
        if !node.intersects_square(origin, radius) {
            return;
        }

        out.extend(
            node.points
                .iter()
                .filter(|p| in_square(**p, origin, radius))
                .copied(),
        );

        if let Some(first) = node.children {
            for i in 0..4 {
                self.query_at(first.offset(i), origin, radius, out);
            }
        }
    }

    pub fn count(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.count_at(self.root, 1, &mut stats);
        stats
    }

    fn count_at(&self, handle: NodeHandle, depth: usize, stats: &mut TreeStats) {
        let node = &self.arena[handle];
        stats.nodes += 1;
        stats.points += node.points.len();
        stats.max_depth = stats.max_depth.max(depth);

        if let Some(first) = node.children {
            for i in 0..4 {
                self.count_at(first.offset(i), depth + 1, stats);
            }
        }
    }

    /// Every node of the current tree with its depth, parents before their
    /// quadrants. Meant for read-only consumers such as boundary drawing.
    pub fn regions(&self) -> impl Iterator<Item = (&QuadNode, usize)> + '_ {
        let mut stack = vec![(self.root, 1_usize)];

        std::iter::from_fn(move || {
            let (handle, depth) = stack.pop()?;
            let node = &self.arena[handle];
            if let Some(first) = node.children {
                // reversed so the quadrants come out in their natural order
                for i in (0..4).rev() {
                    stack.push((first.offset(i), depth + 1));
                }
            }
            Some((node, depth))
        })
    }

    pub fn root(&self) -> &QuadNode {
        &self.arena[self.root]
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn clamp_to_root(&self, point: Vec2) -> Vec2 {
        let root = self.root();
        Vec2::new(
            clamp_half_open(point.x, root.min_x(), root.max_x()),
            clamp_half_open(point.y, root.min_y(), root.max_y()),
        )
    }
}

/// Clamps into `[min, max)`, landing just below `max` rather than on it.
fn clamp_half_open(value: f32, min: f32, max: f32) -> f32 {
    if value >= max {
        max - max.abs().max(1.) * f32::EPSILON
    } else if value < min {
        min
    } else {
        value
    }
}

impl Tracker for QuadTree {
    fn query_range(&self, origin: Vec2, radius: f32, out: &mut Vec<Vec2>) {
        QuadTree::query_range(self, origin, radius, out)
    }

    fn get_no_entities(&self) -> usize {
        self.count().points
    }
}
