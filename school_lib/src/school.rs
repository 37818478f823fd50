use std::f32::consts::PI;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    boid::{Boid, SteeringParams},
    error::SchoolResult,
    math_helpers::mean_position,
    options::{InitiationStrategy, OutOfBoundsPolicy, RunOptions, TrackerType},
    spatial::{BuildReport, NaiveTracker, QuadTree, Tracker, TreeStats},
    target::Target,
};

/// Rebuilds `tree` around `center` with half extent `radius` and inserts every
/// position of `points`.
pub fn build_tree(
    tree: &mut QuadTree,
    points: &[Vec2],
    center: Vec2,
    radius: f32,
    policy: OutOfBoundsPolicy,
) -> SchoolResult<BuildReport> {
    tree.build(points, center, radius, policy)
}

/// Steering acceleration of `boid` for this tick, see [`Boid::steer`].
pub fn steer<T: Tracker + ?Sized>(
    boid: &Boid,
    tracker: &T,
    target: Vec2,
    params: &SteeringParams,
    neighbours: &mut Vec<Vec2>,
) -> Vec2 {
    boid.steer(target, tracker, params, neighbours)
}

/// See [`Boid::integrate`].
pub fn integrate(boid: &mut Boid, delta_time: f32) {
    boid.integrate(delta_time)
}

/// Center of the school, `None` for an empty school.
pub fn recenter(points: &[Vec2]) -> Option<Vec2> {
    mean_position(points)
}

/// What happened during one successful [`School::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// positions that made it into this tick's index
    pub inserted: usize,
    /// positions outside the indexed region, invisible to neighbours this tick
    pub dropped: usize,
    /// center the next tick's tree will be built around
    pub school_center: Vec2,
    /// shape of this tick's tree, all zeros for the naive tracker
    pub tree: TreeStats,
}

/// The school of boids plus everything a tick needs: the spatial index that is
/// rebuilt every tick, the target and the tracked school center.
pub struct School {
    boids: Vec<Boid>,
    tree: QuadTree,
    naive: NaiveTracker,
    target: Target,
    /// center the next tree gets built around, one tick behind the boids
    school_center: Vec2,
    /// snapshot of the positions the index is built from, reused every tick
    positions: Vec<Vec2>,
    tick: u64,
    rng: Xoshiro256PlusPlus,
}

impl School {
    pub fn new(run_options: &RunOptions) -> SchoolResult<Self> {
        run_options.validate()?;

        let mut rng = get_rng(run_options);
        let boids = get_boids(run_options, &mut rng);

        Self::build(boids, rng, run_options)
    }

    /// Starts from boids spawned elsewhere, their ids are reassigned in order.
    pub fn with_boids(boids: Vec<Boid>, run_options: &RunOptions) -> SchoolResult<Self> {
        run_options.validate()?;

        let boids = boids
            .into_iter()
            .enumerate()
            .map(|(id, b)| Boid { id, ..b })
            .collect();

        Self::build(boids, get_rng(run_options), run_options)
    }

    fn build(
        boids: Vec<Boid>,
        rng: Xoshiro256PlusPlus,
        run_options: &RunOptions,
    ) -> SchoolResult<Self> {
        let radius = run_options.root_radius();
        let tree = QuadTree::new(
            run_options.initial_center,
            Vec2::new(radius, radius),
            run_options.node_capacity,
            run_options.arena_capacity,
        )?;

        Ok(School {
            positions: Vec::with_capacity(boids.len()),
            boids,
            tree,
            naive: NaiveTracker::new(),
            target: Target::new(run_options.target_position, run_options.target_motion),
            school_center: run_options.initial_center,
            tick: 0,
            rng,
        })
    }

    /// Runs one tick: index the current positions, track the school center,
    /// steer every boid and move it.
    ///
    /// When indexing fails the tick is abandoned before any boid, the target
    /// or the school center changed.
    pub fn update(&mut self, run_options: &RunOptions) -> SchoolResult<TickReport> {
        self.positions.clear();
        self.positions.extend(self.boids.iter().map(|b| b.position));

        // index the positions left by the previous tick, around the center
        // that tick computed
        let (build, tree_stats) = match run_options.tracker_type {
            TrackerType::QuadTree => {
                let build = build_tree(
                    &mut self.tree,
                    &self.positions,
                    self.school_center,
                    run_options.root_radius(),
                    run_options.out_of_bounds,
                )?;
                (build, self.tree.count())
            }
            TrackerType::Naive => {
                self.naive.rebuild(&self.positions);
                let build = BuildReport {
                    inserted: self.positions.len(),
                    dropped: 0,
                };
                (build, TreeStats::default())
            }
        };

        // the new center only seeds the next tick's tree
        if let Some(center) = recenter(&self.positions) {
            self.school_center = center;
        }

        self.target.advance(run_options.delta_time);

        let target = self.target.position;
        let params = SteeringParams {
            neighbour_search_radius: run_options.neighbour_search_radius,
            separation_policy: run_options.separation_policy,
            acceleration_clamp: run_options.acceleration_clamp,
        };
        let tracker: &dyn Tracker = match run_options.tracker_type {
            TrackerType::QuadTree => &self.tree,
            TrackerType::Naive => &self.naive,
        };

        // calculation loop, the index is read only from here on
        self.boids.par_iter_mut().for_each_init(
            || Vec::with_capacity(32),
            |neighbours, boid| {
                boid.acceleration = steer(boid, tracker, target, &params, neighbours);
            },
        );

        // update loop
        let delta_time = run_options.delta_time;
        self.boids
            .par_iter_mut()
            .for_each(|boid| integrate(boid, delta_time));

        self.tick += 1;

        let report = TickReport {
            tick: self.tick,
            inserted: build.inserted,
            dropped: build.dropped,
            school_center: self.school_center,
            tree: tree_stats,
        };
        debug!(
            tick = report.tick,
            inserted = report.inserted,
            dropped = report.dropped,
            nodes = report.tree.nodes,
            depth = report.tree.max_depth,
            center_x = report.school_center.x,
            center_y = report.school_center.y,
            "school updated"
        );

        Ok(report)
    }

    pub fn view(&self) -> &[Boid] {
        &self.boids
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut Target {
        &mut self.target
    }

    pub fn school_center(&self) -> Vec2 {
        self.school_center
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn get_no_entities(&self) -> usize {
        self.boids.len()
    }

    /// Spawns one more boid according to the run options.
    pub fn insert(&mut self, run_options: &RunOptions) {
        let b = get_boid(run_options, self.boids.len(), &mut self.rng);
        self.insert_boid(b);
    }

    pub fn insert_boid(&mut self, mut b: Boid) {
        b.id = self.boids.len();
        self.boids.push(b);
    }

    pub fn delete_last(&mut self) -> Option<Boid> {
        self.boids.pop()
    }

    /// Respawns the whole school and forgets the tracked center.
    pub fn restart(&mut self, run_options: &RunOptions) {
        self.boids = get_boids(run_options, &mut self.rng);
        self.school_center = run_options.initial_center;
        self.tick = 0;
    }
}

fn get_rng(run_options: &RunOptions) -> Xoshiro256PlusPlus {
    let seed = run_options
        .seed
        .unwrap_or_else(|| rand::thread_rng().gen());
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

fn get_boids(run_options: &RunOptions, rng: &mut Xoshiro256PlusPlus) -> Vec<Boid> {
    (0..run_options.init_boids)
        .map(|id| get_boid(run_options, id, rng))
        .collect()
}

fn get_boid(run_options: &RunOptions, id: usize, rng: &mut Xoshiro256PlusPlus) -> Boid {
    let center = run_options.initial_center;
    let r = run_options.spawn_radius;
    let angle = rng.gen::<f32>() * 2. * PI;
    let direction = Vec2::new(angle.cos(), angle.sin());

    match run_options.initiation_strat {
        InitiationStrategy::Disc => {
            // sqrt keeps the density uniform over the disc
            let distance = r * rng.gen::<f32>().sqrt();
            let position = center + direction * distance;

            Boid::new(position.x, position.y, Vec2::ZERO, run_options.tuning, id)
        }
        InitiationStrategy::CircleCircumferenceIn => {
            let init_vel: f32 = rng.gen::<f32>() / 3. + 0.5;
            let init_pos: f32 = rng.gen::<f32>() / 3. + 2. / 3.;

            let position = center + direction * r * init_pos;
            let velocity = -direction * run_options.tuning.max_speed * init_vel;

            Boid::new(position.x, position.y, velocity, run_options.tuning, id)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rstest::rstest;

    use super::School;
    use crate::{
        boid::{Boid, BoidTuning},
        error::SchoolError,
        math_helpers::mean_position,
        options::{InitiationStrategy, RunOptions, SeparationPolicy, TrackerType},
    };

    fn run_options() -> RunOptions {
        RunOptions {
            seed: Some(1),
            init_boids: 64,
            spawn_radius: 5.,
            ..Default::default()
        }
    }

    fn grid(n: usize, spacing: f32, offset: Vec2) -> Vec<Boid> {
        let tuning = BoidTuning::from_sight_radius(1., 5., 1., 1.6);
        (0..n * n)
            .map(|i| {
                let x = (i % n) as f32 * spacing + offset.x;
                let y = (i / n) as f32 * spacing + offset.y;
                Boid::new(x, y, Vec2::ZERO, tuning, i)
            })
            .collect()
    }

    #[test]
    fn should_spawn_reproducibly_from_a_seed() {
        let ro = run_options();
        let a = School::new(&ro).unwrap();
        let b = School::new(&ro).unwrap();

        assert_eq!(a.get_no_entities(), 64);
        for (x, y) in a.view().iter().zip(b.view()) {
            assert_eq!(x.position, y.position);
            assert!(x.position.length() <= ro.spawn_radius);
        }
    }

    #[test]
    fn should_spawn_on_the_circle_heading_inwards() {
        let ro = RunOptions {
            initiation_strat: InitiationStrategy::CircleCircumferenceIn,
            ..run_options()
        };
        let school = School::new(&ro).unwrap();

        for b in school.view() {
            assert!(b.position.length() >= ro.spawn_radius * 2. / 3. - 1e-4);
            assert!(b.velocity.length() <= ro.tuning.max_speed);
            assert!(b.velocity.dot(b.position) < 0.);
        }
    }

    #[test]
    fn should_lag_school_center_by_one_tick() {
        let ro = run_options();
        let boids = grid(4, 2., Vec2::new(10., -6.));
        let first_mean = mean_position(&boids.iter().map(|b| b.position).collect::<Vec<_>>());
        let mut school = School::with_boids(boids, &ro).unwrap();

        let report = school.update(&ro).unwrap();

        // first tree is built around the configured seed
        assert_eq!(school.tree().root().center, ro.initial_center);
        // the center of the pre-move positions is stored for the next tick
        assert_eq!(Some(report.school_center), first_mean);
        assert_eq!(school.school_center(), report.school_center);

        let second = school.update(&ro).unwrap();
        assert_eq!(school.tree().root().center, report.school_center);
        assert_ne!(second.school_center, report.school_center);
    }

    #[test]
    fn should_leave_school_untouched_when_arena_runs_out() {
        let ro = RunOptions {
            node_capacity: 1,
            arena_capacity: 3,
            ..run_options()
        };
        let mut school = School::with_boids(grid(3, 1., Vec2::ZERO), &ro).unwrap();
        let before: Vec<(Vec2, Vec2)> = school
            .view()
            .iter()
            .map(|b| (b.position, b.velocity))
            .collect();

        let res = school.update(&ro);

        assert!(matches!(res, Err(SchoolError::ArenaExhausted { capacity: 3 })));
        assert_eq!(school.tick(), 0);
        assert_eq!(school.school_center(), ro.initial_center);
        let after: Vec<(Vec2, Vec2)> = school
            .view()
            .iter()
            .map(|b| (b.position, b.velocity))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn should_report_boids_outside_the_region() {
        let ro = RunOptions {
            school_radius: 5.,
            ..run_options()
        };
        let mut boids = grid(2, 1., Vec2::ZERO);
        boids[3].position = Vec2::new(500., 500.);
        let mut school = School::with_boids(boids, &ro).unwrap();

        let report = school.update(&ro).unwrap();

        assert_eq!(report.inserted, 3);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn lone_boid_at_the_target_stays_still() {
        let ro = RunOptions {
            target_position: Vec2::new(2., 3.),
            ..run_options()
        };
        let tuning = ro.tuning;
        let mut school =
            School::with_boids(vec![Boid::new(2., 3., Vec2::ZERO, tuning, 0)], &ro).unwrap();

        school.update(&ro).unwrap();

        let b = school.view()[0];
        assert_eq!(b.velocity, Vec2::ZERO);
        assert_eq!(b.position, Vec2::new(2., 3.));
        assert_eq!(b.acceleration, Vec2::ZERO);
    }

    #[rstest]
    #[case(SeparationPolicy::Average)]
    #[case(SeparationPolicy::InverseWeighted)]
    fn quadtree_and_naive_trackers_agree(#[case] policy: SeparationPolicy) {
        let tree_ro = RunOptions {
            separation_policy: policy,
            target_position: Vec2::new(20., 20.),
            ..run_options()
        };
        let naive_ro = RunOptions {
            tracker_type: TrackerType::Naive,
            ..tree_ro.clone()
        };
        let boids = grid(6, 0.8, Vec2::new(-2., -2.));
        let mut with_tree = School::with_boids(boids.clone(), &tree_ro).unwrap();
        let mut with_naive = School::with_boids(boids, &naive_ro).unwrap();

        for _ in 0..3 {
            with_tree.update(&tree_ro).unwrap();
            with_naive.update(&naive_ro).unwrap();
        }

        for (a, b) in with_tree.view().iter().zip(with_naive.view()) {
            assert_relative_eq!(a.position.x, b.position.x, epsilon = 1e-4);
            assert_relative_eq!(a.position.y, b.position.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn school_gathers_around_the_target() {
        let ro = RunOptions {
            target_position: Vec2::new(30., 0.),
            ..run_options()
        };
        let mut school = School::new(&ro).unwrap();

        for _ in 0..900 {
            school.update(&ro).unwrap();
            assert!(school
                .view()
                .iter()
                .all(|b| b.velocity.length() <= b.tuning.max_speed + 1e-4));
        }

        let positions: Vec<Vec2> = school.view().iter().map(|b| b.position).collect();
        let center = mean_position(&positions).unwrap();
        assert!(center.distance(ro.target_position) < 5.);
    }

    #[test]
    fn should_insert_delete_and_restart() {
        let ro = run_options();
        let mut school = School::new(&ro).unwrap();

        school.insert(&ro);
        assert_eq!(school.get_no_entities(), 65);
        assert_eq!(school.view()[64].id, 64);

        let last = school.delete_last().unwrap();
        assert_eq!(last.id, 64);

        school.update(&ro).unwrap();
        school.restart(&ro);
        assert_eq!(school.tick(), 0);
        assert_eq!(school.get_no_entities(), 64);
        assert_eq!(school.school_center(), ro.initial_center);
    }
}
