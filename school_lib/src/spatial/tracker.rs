use glam::Vec2;

// a tracker holds a snapshot of the school's positions for one tick and answers
// neighbourhood queries against it, it never knows which boid a position
// belongs to

/// Read-only neighbourhood lookup shared by all boids during the steering
/// phase, hence `Sync`.
pub trait Tracker: Sync {
    /// Appends every tracked position inside the half-open square of half width
    /// `radius` around `origin` to `out`.
    fn query_range(&self, origin: Vec2, radius: f32, out: &mut Vec<Vec2>);

    fn get_no_entities(&self) -> usize;
}
