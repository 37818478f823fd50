use glam::f32::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    math_helpers::{clamp_per_axis, inverse_components, normalize_or_zero},
    options::SeparationPolicy,
    spatial::Tracker,
};

/// Static per boid tuning, fixed at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoidTuning {
    /// neighbours closer than this (squared) push the boid away
    pub sight_radius_sq: f32,
    pub max_speed: f32,
    pub target_weight: f32,
    pub separation_weight: f32,
}

impl BoidTuning {
    pub fn from_sight_radius(
        sight_radius: f32,
        max_speed: f32,
        target_weight: f32,
        separation_weight: f32,
    ) -> Self {
        BoidTuning {
            sight_radius_sq: sight_radius * sight_radius,
            max_speed,
            target_weight,
            separation_weight,
        }
    }
}

/// Per tick steering settings shared by every boid of the school.
#[derive(Debug, Clone, Copy)]
pub struct SteeringParams {
    pub neighbour_search_radius: f32,
    pub separation_policy: SeparationPolicy,
    pub acceleration_clamp: Option<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct Boid {
    // sequential id starting from 0
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub tuning: BoidTuning,
}

impl Boid {
    /// Creates a new [`Boid`] at rest with no pending acceleration.
    pub fn new(x: f32, y: f32, velocity: Vec2, tuning: BoidTuning, id: usize) -> Self {
        Boid {
            id,
            position: Vec2::new(x, y),
            velocity,
            acceleration: Vec2::ZERO,
            tuning,
        }
    }

    /// Computes this tick's steering: seeking the target plus keeping clear of
    /// the neighbours found in `tracker`.
    ///
    /// `neighbours` is scratch space for the query, it is cleared first so a
    /// worker can hand the same buffer to every boid it processes.
    pub fn steer<T: Tracker + ?Sized>(
        &self,
        target: Vec2,
        tracker: &T,
        params: &SteeringParams,
        neighbours: &mut Vec<Vec2>,
    ) -> Vec2 {
        neighbours.clear();
        tracker.query_range(self.position, params.neighbour_search_radius, neighbours);

        let sum = self.seek(target) + self.separation(neighbours, params.separation_policy);

        match params.acceleration_clamp {
            Some(limit) => clamp_per_axis(sum, limit),
            None => sum,
        }
    }

    /// Unit vector towards `target` scaled by the target weight, zero when
    /// already there.
    pub fn seek(&self, target: Vec2) -> Vec2 {
        normalize_or_zero(target - self.position) * self.tuning.target_weight
    }

    /// Pushes away from the neighbours within sight. Positions equal to the
    /// boid's own are taken to be the boid itself and skipped.
    pub fn separation(&self, others: &[Vec2], policy: SeparationPolicy) -> Vec2 {
        let mut steering = Vec2::ZERO;
        let mut count = 0;

        for other in others {
            if *other == self.position {
                continue;
            }

            let distance_sq = self.position.distance_squared(*other);
            if distance_sq >= self.tuning.sight_radius_sq || distance_sq <= 0. {
                continue;
            }

            let diff = self.position - *other;
            steering += match policy {
                SeparationPolicy::Average => diff,
                SeparationPolicy::InverseWeighted => inverse_components(diff),
            };
            count += 1;
        }

        if count == 0 {
            return Vec2::ZERO;
        }

        if policy == SeparationPolicy::Average {
            steering /= count as f32;
        }

        normalize_or_zero(steering) * self.tuning.separation_weight
    }

    /// Advances the boid by `delta_time` seconds using the acceleration
    /// accumulated by [`Boid::steer`], then clears it.
    pub fn integrate(&mut self, delta_time: f32) {
        self.velocity += self.acceleration;

        let max_speed = self.tuning.max_speed;
        if self.velocity.length_squared() > max_speed * max_speed {
            self.velocity = self.velocity.normalize() * max_speed;
        }

        self.position += self.velocity * delta_time;
        self.acceleration = Vec2::ZERO;
    }
}
