use birdwatcher::{Birdwatcher, BoidData};
use error::SchoolResult;
use options::RunOptions;
use school::School;

pub mod boid;
pub mod error;
pub mod school;
pub mod spatial;
pub mod target;

pub mod birdwatcher;
pub mod math_helpers;
pub mod options;

/// Runs a school for `no_iter` ticks headless and returns the sampled data,
/// saving it first when the save options ask for it.
pub fn school_base(no_iter: u64, run_options: RunOptions) -> SchoolResult<Vec<BoidData>> {
    let mut school = School::new(&run_options)?;
    let mut bird_watcher = Birdwatcher::new(run_options.sample_rate);

    for _ in 0..no_iter {
        school.update(&run_options)?;
        bird_watcher.watch(&school);
    }

    bird_watcher.pop_data_save(&run_options.save_options)
}
