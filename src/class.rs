use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Multiplier on the size threshold that separates vans from lorries.
pub const VAN_FACTOR: f64 = 1.9;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Car,
    Van,
    Lorry,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [VehicleClass::Car, VehicleClass::Van, VehicleClass::Lorry];

    /// Ties go to the smaller class.
    pub fn from_area(area: f64, vehicle_size_threshold: f64) -> Self {
        if area <= vehicle_size_threshold {
            VehicleClass::Car
        } else if area <= VAN_FACTOR * vehicle_size_threshold {
            VehicleClass::Van
        } else {
            VehicleClass::Lorry
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Car => "Car",
            VehicleClass::Van => "Van",
            VehicleClass::Lorry => "Lorry",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
