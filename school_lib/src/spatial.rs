//! Spatial indexing of the school, rebuilt from scratch every tick.
//!
//! The [`quadtree::QuadTree`] lives on a fixed [`arena::NodeArena`] so a
//! rebuild does no per node allocation, [`naive_tracker::NaiveTracker`] answers
//! the same queries by brute force.

pub mod arena;
pub mod naive_tracker;
pub mod quadtree;
pub mod tracker;

pub use arena::{NodeArena, NodeHandle};
pub use naive_tracker::NaiveTracker;
pub use quadtree::{BuildReport, QuadNode, QuadTree, TreeStats};
pub use tracker::Tracker;
