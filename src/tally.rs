use serde_derive::{Deserialize, Serialize};

use crate::class::VehicleClass;
use crate::detector::FrameOutcome;

/// Running totals a downstream collaborator can persist or display.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub frames: u64,
    pub vehicles: u64,
    pub cars: u64,
    pub vans: u64,
    pub lorries: u64,
    pub speed_triggers: u64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;

        if outcome.counted {
            self.vehicles += 1;

            match outcome.class {
                Some(VehicleClass::Car) => self.cars += 1,
                Some(VehicleClass::Van) => self.vans += 1,
                Some(VehicleClass::Lorry) => self.lorries += 1,
                None => {}
            }
        }

        if outcome.speed_triggered {
            self.speed_triggers += 1;
        }
    }

    #[inline]
    pub fn count_of(&self, class: VehicleClass) -> u64 {
        match class {
            VehicleClass::Car => self.cars,
            VehicleClass::Van => self.vans,
            VehicleClass::Lorry => self.lorries,
        }
    }
}
