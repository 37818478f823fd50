use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    boid::BoidTuning,
    error::{SchoolError, SchoolResult},
};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub init_boids: usize,
    pub initiation_strat: InitiationStrategy,
    /// radius of the area boids spawn in around `initial_center`
    pub spawn_radius: f32,
    /// seed for spawning, `None` draws one from the OS
    pub seed: Option<u64>,
    /// tuning every spawned boid starts with
    pub tuning: BoidTuning,

    pub school_radius: f32,
    /// the tree root's half extent is `school_radius * school_radius_scale`,
    /// leaving room for the school to drift before the region follows
    pub school_radius_scale: f32,
    /// root center of the very first tick, later ticks use the school center
    pub initial_center: Vec2,

    /// points a tree node holds before it subdivides
    pub node_capacity: usize,
    /// total node slots in the arena
    pub arena_capacity: usize,
    /// half width of the square every boid queries for neighbours
    pub neighbour_search_radius: f32,

    pub separation_policy: SeparationPolicy,
    /// symmetric per axis bound applied to the combined steering, none if `None`
    pub acceleration_clamp: Option<f32>,
    pub out_of_bounds: OutOfBoundsPolicy,
    pub tracker_type: TrackerType,

    /// seconds per tick
    pub delta_time: f32,
    pub target_position: Vec2,
    pub target_motion: TargetMotion,

    pub sample_rate: u64,
    pub save_options: SaveOptions,
}

impl RunOptions {
    /// Half extent of the tree's root region.
    pub fn root_radius(&self) -> f32 {
        self.school_radius * self.school_radius_scale
    }

    /// Checks the preconditions the simulation steps rely on without checking
    /// them again every tick.
    pub fn validate(&self) -> SchoolResult<()> {
        let invalid = |reason: &str| Err(SchoolError::InvalidOptions(reason.to_owned()));

        if !(self.tuning.max_speed > 0.) {
            return invalid("max speed must be positive");
        }
        if !(self.delta_time > 0.) {
            return invalid("delta time must be positive");
        }
        if !(self.root_radius() > 0.) {
            return invalid("school radius and its scale must be positive");
        }
        if !(self.neighbour_search_radius > 0.) {
            return invalid("neighbour search radius must be positive");
        }
        if self.node_capacity == 0 {
            return invalid("node capacity must be at least 1");
        }
        if self.arena_capacity == 0 {
            return invalid("arena capacity must be at least 1");
        }
        if self.sample_rate == 0 {
            return invalid("sample rate must be at least 1");
        }
        if let Some(clamp) = self.acceleration_clamp {
            if !(clamp >= 0.) {
                return invalid("acceleration clamp must not be negative");
            }
        }

        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        let init_boids = 512;

        let sight_radius = 1.5;
        let max_speed = 5.;
        let target_weight = 1.;
        let separation_weight = 1.6;

        let school_radius = 40.;
        let spawn_radius = 20.;

        RunOptions {
            init_boids,
            initiation_strat: InitiationStrategy::Disc,
            spawn_radius,
            seed: None,
            tuning: BoidTuning::from_sight_radius(
                sight_radius,
                max_speed,
                target_weight,
                separation_weight,
            ),
            school_radius,
            school_radius_scale: 2.,
            initial_center: Vec2::ZERO,
            node_capacity: 4,
            arena_capacity: 16384,
            neighbour_search_radius: 10.,
            separation_policy: SeparationPolicy::Average,
            acceleration_clamp: None,
            out_of_bounds: OutOfBoundsPolicy::Drop,
            tracker_type: TrackerType::QuadTree,
            delta_time: 1. / 60.,
            target_position: Vec2::ZERO,
            target_motion: TargetMotion::Fixed,
            sample_rate: 1,
            save_options: SaveOptions {
                save_locations: false,
                save_locations_path: Some("./".to_owned()),
                save_locations_timestamp: true,
            },
        }
    }
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Disc"}
pub enum InitiationStrategy {
    /// uniformly inside the spawn radius, at rest
    Disc,
    /// on the spawn circle, heading inwards
    CircleCircumferenceIn,
}

/// How the neighbours' offsets are turned into a separation force. Both
/// normalize the result and scale it by the boid's separation weight, they
/// differ in how much a close neighbour counts.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SeparationPolicy {
    /// mean of the raw `self - other` offsets
    Average,
    /// sum of the component-wise inverted offsets, closer neighbours dominate
    InverseWeighted,
}

/// What building the tree does with a position outside the root region.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutOfBoundsPolicy {
    /// leave it out of this tick's tree, the boid keeps moving but is invisible
    /// to its neighbours
    Drop,
    /// pull it onto the region's border
    Clamp,
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrackerType {
    QuadTree,
    Naive,
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Orbit", "radius": 30, "angular_speed": 0.5}
pub enum TargetMotion {
    Fixed,
    /// held input axis in [-1, 1], moved at the target's fixed speed
    Axis { x: f32, y: f32 },
    /// circles the target's start position
    Orbit { radius: f32, angular_speed: f32 },
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub save_locations: bool,
    pub save_locations_path: Option<String>,
    pub save_locations_timestamp: bool,
}
