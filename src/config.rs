use serde_derive::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::Error;

/// Construction-time settings of a `CrossingDetector`. Loading only parses;
/// `CrossingDetector::new` validates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Blobs with area at or below this are not vehicles.
    pub area_threshold: f64,
    /// Largest area still classified as a car.
    pub vehicle_size_threshold: f64,
    pub counting_line: [[f64; 2]; 2],
    pub speed_line: [[f64; 2]; 2],

    // resume a stream mid-episode
    #[serde(default)]
    pub counting_engaged: bool,
    #[serde(default)]
    pub speed_engaged: bool,
}

impl DetectorConfig {
    pub fn new(
        area_threshold: f64,
        vehicle_size_threshold: f64,
        counting_line: [[f64; 2]; 2],
        speed_line: [[f64; 2]; 2],
    ) -> Self {
        Self {
            area_threshold,
            vehicle_size_threshold,
            counting_line,
            speed_line,
            counting_engaged: false,
            speed_engaged: false,
        }
    }

    pub fn with_engaged(mut self, counting: bool, speed: bool) -> Self {
        self.counting_engaged = counting;
        self.speed_engaged = speed;
        self
    }

    pub fn from_yaml_str(src: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(src)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}
