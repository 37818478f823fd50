use std::{error::Error, fs, path::Path};

use clap_serde_derive::{clap::Parser, ClapSerde};
use glam::Vec2;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use school_lib::{
    birdwatcher::Birdwatcher,
    boid::BoidTuning,
    options::{
        InitiationStrategy, OutOfBoundsPolicy, RunOptions, SaveOptions, SeparationPolicy,
        TargetMotion, TrackerType,
    },
    school::School,
};

mod cliargs;
use cliargs::{Args, Config};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config(Args::parse())?;
    let run_options = run_options(&config);

    let mut school = School::new(&run_options)?;
    let mut bird_watcher = Birdwatcher::new(run_options.sample_rate);

    info!(
        boids = school.get_no_entities(),
        ticks = config.ticks,
        tracker = ?run_options.tracker_type,
        "school spawned"
    );

    let mut dropped_total = 0;
    for _ in 0..config.ticks {
        let report = school.update(&run_options)?;
        bird_watcher.watch(&school);
        dropped_total += report.dropped;

        if config.log_every > 0 && report.tick % config.log_every == 0 {
            info!(
                tick = report.tick,
                center_x = report.school_center.x,
                center_y = report.school_center.y,
                nodes = report.tree.nodes,
                depth = report.tree.max_depth,
                dropped = report.dropped,
                "progress"
            );
        }
    }

    if dropped_total > 0 {
        warn!(
            dropped = dropped_total,
            "positions fell outside the indexed region, consider a larger school radius"
        );
    }

    let data = bird_watcher.pop_data_save(&run_options.save_options)?;
    info!(
        samples = data.len(),
        center_x = school.school_center().x,
        center_y = school.school_center().y,
        "run finished"
    );

    Ok(())
}

/// Merges the config file, when there is one, with whatever was passed on the command line.
fn load_config(mut args: Args) -> Result<Config, Box<dyn Error>> {
    let path = args.config_path.as_path();
    let Ok(raw) = fs::read_to_string(path) else {
        // If there is not config file return only config parsed from clap
        return Ok(Config::from(&mut args.config));
    };

    let file_config: <Config as ClapSerde>::Opt = if is_toml(path) {
        toml::from_str(&raw)?
    } else {
        serde_yaml::from_str(&raw)?
    };
    info!(path = %path.display(), "configuration loaded");

    Ok(Config::from(file_config).merge(&mut args.config))
}

fn is_toml(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "toml")
}

fn run_options(config: &Config) -> RunOptions {
    let defaults = RunOptions::default();

    RunOptions {
        init_boids: config.no_boids,
        initiation_strat: if config.ring_spawn {
            InitiationStrategy::CircleCircumferenceIn
        } else {
            InitiationStrategy::Disc
        },
        spawn_radius: config.spawn_radius,
        seed: Some(config.seed),
        tuning: BoidTuning::from_sight_radius(
            config.sight_radius,
            config.max_speed,
            config.target_weight,
            config.separation_weight,
        ),
        school_radius: config.school_radius,
        school_radius_scale: config.school_radius_scale,
        node_capacity: config.node_capacity,
        arena_capacity: config.arena_capacity,
        neighbour_search_radius: config.neighbour_search_radius,
        separation_policy: if config.inverse_separation {
            SeparationPolicy::InverseWeighted
        } else {
            SeparationPolicy::Average
        },
        acceleration_clamp: (config.acceleration_clamp > 0.).then_some(config.acceleration_clamp),
        out_of_bounds: if config.clamp_outside {
            OutOfBoundsPolicy::Clamp
        } else {
            OutOfBoundsPolicy::Drop
        },
        tracker_type: if config.naive {
            TrackerType::Naive
        } else {
            TrackerType::QuadTree
        },
        delta_time: config.delta_time,
        target_position: Vec2::new(config.target_x, config.target_y),
        target_motion: if config.axis_x != 0. || config.axis_y != 0. {
            TargetMotion::Axis {
                x: config.axis_x,
                y: config.axis_y,
            }
        } else {
            TargetMotion::Fixed
        },
        sample_rate: config.sample_rate,
        save_options: SaveOptions {
            save_locations: config.save,
            save_locations_timestamp: config.save_timestamp,

            // default
            save_locations_path: defaults.save_options.save_locations_path.clone(),
        },
        ..defaults
    }
}
