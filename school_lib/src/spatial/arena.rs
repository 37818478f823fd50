use std::ops::{Index, IndexMut};

use glam::Vec2;
use tracing::error;

use crate::error::{SchoolError, SchoolResult};

use super::quadtree::QuadNode;

/// Stable reference to a node handed out by a [`NodeArena`].
///
/// Only valid until the next [`NodeArena::reset`], holding on to one across
/// ticks will either panic on access or silently point at a node of the new
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

impl NodeHandle {
    pub fn index(self) -> usize {
        self.0
    }

    /// Handle `offset` slots further along the arena, used to address the
    /// siblings of a contiguous run of children.
    pub(crate) fn offset(self, offset: usize) -> NodeHandle {
        NodeHandle(self.0 + offset)
    }
}

/// Fixed capacity backing store for quadtree nodes.
///
/// Nodes are handed out by a cursor that only moves forward within a tick and
/// is rewound by [`NodeArena::reset`]. Slots are never freed, a reset slot gets
/// re-initialised in place on its next allocation so the inline point lists
/// keep whatever storage they already had.
pub struct NodeArena {
    nodes: Vec<QuadNode>,
    cursor: usize,
    capacity: usize,
}

impl NodeArena {
    pub fn new(capacity: usize) -> Self {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Appends one node and returns its handle.
    pub fn allocate(
        &mut self,
        center: Vec2,
        extents: Vec2,
        node_capacity: usize,
    ) -> SchoolResult<NodeHandle> {
        self.ensure_free(1)?;
        Ok(self.push(center, extents, node_capacity))
    }

    /// Allocates the four quadrants of a node being subdivided as one
    /// contiguous run, in the order `+x+y, -x+y, +x-y, -x-y`. Either all four
    /// are allocated or none is.
    ///
    /// Returns the handle of the first quadrant.
    pub fn allocate_quadrants(
        &mut self,
        center: Vec2,
        half_extents: Vec2,
        node_capacity: usize,
    ) -> SchoolResult<NodeHandle> {
        self.ensure_free(QUADRANTS.len())?;

        let first = NodeHandle(self.cursor);
        for (sx, sy) in QUADRANTS {
            let quadrant_center = Vec2::new(
                center.x + sx * half_extents.x,
                center.y + sy * half_extents.y,
            );
            self.push(quadrant_center, half_extents, node_capacity);
        }

        Ok(first)
    }

    /// Rewinds the cursor, every handle issued so far becomes invalid.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Number of nodes allocated since the last reset.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&QuadNode> {
        self.nodes[..self.cursor].get(handle.0)
    }

    fn ensure_free(&self, requested: usize) -> SchoolResult<()> {
        if self.cursor + requested > self.capacity {
            error!(
                capacity = self.capacity,
                requested, "node arena exhausted, aborting tree build"
            );
            return Err(SchoolError::ArenaExhausted {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn push(&mut self, center: Vec2, extents: Vec2, node_capacity: usize) -> NodeHandle {
        let handle = NodeHandle(self.cursor);

        if self.cursor < self.nodes.len() {
            self.nodes[self.cursor].reinit(center, extents, node_capacity);
        } else {
            self.nodes.push(QuadNode::new(center, extents, node_capacity));
        }
        self.cursor += 1;

        handle
    }
}

/// Signs of the quadrant centers relative to their parent's center.
pub(crate) const QUADRANTS: [(f32, f32); 4] = [(1., 1.), (-1., 1.), (1., -1.), (-1., -1.)];

impl Index<NodeHandle> for NodeArena {
    type Output = QuadNode;

    fn index(&self, handle: NodeHandle) -> &Self::Output {
        &self.nodes[..self.cursor][handle.0]
    }
}

impl IndexMut<NodeHandle> for NodeArena {
    fn index_mut(&mut self, handle: NodeHandle) -> &mut Self::Output {
        &mut self.nodes[..self.cursor][handle.0]
    }
}
