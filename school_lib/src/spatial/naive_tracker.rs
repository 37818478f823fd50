use glam::Vec2;

use super::{quadtree::in_square, tracker::Tracker};

/// A naive implementation of position tracking, which uses an O(N^2) algorithm
/// for finding a boid's neighbours.
///
/// Answers exactly the same square queries as the quadtree, minus the region
/// bounds, so it doubles as a reference when testing the tree.
#[derive(Debug, Default)]
pub struct NaiveTracker {
    positions: Vec<Vec2>,
}

impl NaiveTracker {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the tracked snapshot, keeping the allocation.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.positions.clear();
        self.positions.extend_from_slice(positions);
    }
}

impl Tracker for NaiveTracker {
    fn query_range(&self, origin: Vec2, radius: f32, out: &mut Vec<Vec2>) {
        out.extend(
            self.positions
                .iter()
                .filter(|p| in_square(**p, origin, radius))
                .copied(),
        );
    }

    fn get_no_entities(&self) -> usize {
        self.positions.len()
    }
}
