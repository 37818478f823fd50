// https://docs.rs/clap-serde/latest/clap_serde/#
// https://stackoverflow.com/questions/55133351/is-there-a-way-to-get-clap-to-use-default-values-from-a-file
use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Headless school of boids chasing a target, indexed by a quadtree rebuilt every tick.
pub struct Args {
    /// Config file, YAML unless it ends in `.toml`
    #[arg(short, long = "config", default_value = "config.yaml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the `-c` or `--config` arg option
pub struct Config {
    #[default(512)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub no_boids: usize,

    #[default(600)]
    #[arg(short = 'i', long)]
    /// number of ticks to simulate
    pub ticks: u64,

    #[default(0)]
    #[arg(long)]
    /// seed for spawning, runs with the same seed are identical
    pub seed: u64,

    #[default(4)]
    #[arg(short = 'r', long)]
    /// ratio of ticks/sample_rate, e,g, 4 = sample every 4th tick
    pub sample_rate: u64,

    #[default(60)]
    #[arg(long)]
    /// log a progress line every this many ticks, 0 = never
    pub log_every: u64,

    #[default(true)]
    #[arg(short = 's', long)]
    pub save: bool,

    #[default(false)]
    #[arg(short = 't', long)]
    pub save_timestamp: bool,

    #[default(0.01666667)]
    #[arg(long = "dt")]
    /// seconds per tick
    pub delta_time: f32,

    #[default(20.)]
    #[arg(long = "spawn_radius")]
    pub spawn_radius: f32,
    #[default(false)]
    #[arg(long = "ring")]
    /// spawn on a ring heading inwards instead of a filled disc
    pub ring_spawn: bool,

    #[default(1.5)]
    #[arg(long = "sight")]
    pub sight_radius: f32,
    #[default(5.)]
    #[arg(long = "max_speed")]
    pub max_speed: f32,
    #[default(1.)]
    #[arg(long = "target_weight")]
    pub target_weight: f32,
    #[default(1.6)]
    #[arg(long = "sep_weight")]
    pub separation_weight: f32,
    #[default(false)]
    #[arg(long = "inverse_sep")]
    /// weight neighbours by their inverted offsets instead of averaging them
    pub inverse_separation: bool,
    #[default(0.)]
    #[arg(long = "acc_clamp")]
    /// per axis acceleration bound, 0 = unbounded
    pub acceleration_clamp: f32,

    #[default(40.)]
    #[arg(long = "school_radius")]
    pub school_radius: f32,
    #[default(2.)]
    #[arg(long = "radius_scale")]
    pub school_radius_scale: f32,
    #[default(4)]
    #[arg(long = "node_capacity")]
    pub node_capacity: usize,
    #[default(16384)]
    #[arg(long = "arena_capacity")]
    pub arena_capacity: usize,
    #[default(10.)]
    #[arg(long = "search_radius")]
    pub neighbour_search_radius: f32,
    #[default(false)]
    #[arg(long = "clamp_outside")]
    /// clamp boids outside the indexed region onto its border instead of dropping them
    pub clamp_outside: bool,
    #[default(false)]
    #[arg(long = "naive")]
    /// brute force neighbour lookup instead of the quadtree
    pub naive: bool,

    #[default(30.)]
    #[arg(long = "target_x")]
    pub target_x: f32,
    #[default(0.)]
    #[arg(long = "target_y")]
    pub target_y: f32,
    #[default(0.)]
    #[arg(long = "axis_x")]
    /// held horizontal input for the target in [-1, 1]
    pub axis_x: f32,
    #[default(0.)]
    #[arg(long = "axis_y")]
    /// held vertical input for the target in [-1, 1]
    pub axis_y: f32,
}
