use std::{fs::OpenOptions, mem};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{error::SchoolResult, options::SaveOptions, school::School};

// so right now, this is more of a boid data acummulator than a birdwatcher
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoidData {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub time: u64,
}

pub struct Birdwatcher {
    locations: Vec<BoidData>,
    tick_counter: u64,
    sample_rate: u64,
}

const PREFIX: &str = "school-data";

impl Birdwatcher {
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            locations: Vec::new(),
            tick_counter: 0,
            // a zero rate would never sample and divide by zero doing so
            sample_rate: sample_rate.max(1),
        }
    }

    /// Triggers data collection, records the school every `sample_rate`th call.
    pub fn watch(&mut self, school: &School) {
        if !self.should_sample() {
            return;
        }

        let time = self.tick_counter / self.sample_rate;
        self.locations.extend(school.view().iter().map(|b| BoidData {
            id: b.id,
            x: b.position.x,
            y: b.position.y,
            vx: b.velocity.x,
            vy: b.velocity.y,
            time,
        }));
    }

    pub fn restart(&mut self) {
        self.locations.clear();
        self.tick_counter = 0;
    }

    pub fn pop_data(&mut self) -> Vec<BoidData> {
        mem::take(&mut self.locations)
    }

    /// Saves the latest data in CSV format, then returns it while emptying the birdwatcher's memory
    ///
    /// Depending on save options, either attempts to overwrite the current file or write's a new timestamped file
    pub fn pop_data_save(&mut self, save_options: &SaveOptions) -> SchoolResult<Vec<BoidData>> {
        let data = self.pop_data();

        if !save_options.save_locations {
            return Ok(data);
        }

        if let Some(path) = &save_options.save_locations_path {
            let file_path = format!(
                "{path}{file_name}",
                file_name = Birdwatcher::get_dataset_name(save_options, Utc::now())
            );

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&file_path)?;
            let mut wtr = csv::Writer::from_writer(file);

            for b in data.iter() {
                wtr.serialize(b)?;
            }
            wtr.flush()?;

            info!(path = %file_path, rows = data.len(), "school data saved");
        }

        Ok(data)
    }

    fn get_dataset_name(save_options: &SaveOptions, now: DateTime<Utc>) -> String {
        match save_options.save_locations_timestamp {
            true => {
                let datetime_part = now.timestamp_millis();
                format!(
                    "{prefix}_{datetime}.csv",
                    prefix = PREFIX,
                    datetime = datetime_part
                )
            }
            false => format!("{prefix}.csv", prefix = PREFIX),
        }
    }

    fn should_sample(&mut self) -> bool {
        self.tick_counter += 1;

        self.tick_counter % self.sample_rate == 0
    }
}
