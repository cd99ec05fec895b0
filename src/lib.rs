pub mod bbox;
pub mod candidate;
pub mod class;
pub mod config;
pub mod detector;
pub mod error;
pub mod frame;
pub mod latch;
pub mod line;
pub mod tally;

pub use candidate::Candidate;
pub use class::VehicleClass;
pub use config::DetectorConfig;
pub use detector::{CrossingDetector, FrameOutcome};
pub use error::Error;
pub use frame::Frame;
pub use latch::Latch;
pub use line::{LineCrossTest, LineSegment};
pub use tally::Tally;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

pub trait Counting {
    fn update(&mut self, frames: &[Frame], src: &str) -> Result<Vec<FrameOutcome>, Error>;
    fn tally(&self, src: &str) -> Tally;
}

/// Keeps one detector and tally per named video source, all built from the same config.
pub struct StreamCounter {
    config: DetectorConfig,
    streams: HashMap<String, (CrossingDetector, Tally)>,
}

impl StreamCounter {
    /// Fails early on a config no detector could be built from.
    pub fn new(config: DetectorConfig) -> Result<Self, Error> {
        CrossingDetector::new(config.clone())?;

        Ok(Self {
            config,
            streams: HashMap::new(),
        })
    }

    #[inline]
    pub fn detector(&self, src: &str) -> Option<&CrossingDetector> {
        self.streams.get(src).map(|(detector, _)| detector)
    }

    #[inline]
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.streams.keys().map(String::as_str)
    }
}

impl crate::Counting for StreamCounter {
    /// All frames are checked before any of them is processed, so a rejected batch
    /// leaves the source's detector and tally as they were.
    fn update(&mut self, frames: &[Frame], src: &str) -> Result<Vec<FrameOutcome>, Error> {
        for frame in frames {
            frame.validate().map_err(|err| Error::Frame {
                index: frame.index,
                source: Box::new(err),
            })?;
        }

        let (detector, tally) = match self.streams.entry(src.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let detector = CrossingDetector::new(self.config.clone())?;
                entry.insert((detector, Tally::new()))
            }
        };

        let mut outcomes = Vec::with_capacity(frames.len());
        for frame in frames {
            let outcome = detector.process_frame(frame)?;
            tally.record(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    #[inline]
    fn tally(&self, src: &str) -> Tally {
        self.streams
            .get(src)
            .map(|(_, tally)| *tally)
            .unwrap_or_default()
    }
}
