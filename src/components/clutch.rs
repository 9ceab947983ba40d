use crate::error::VehicleError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Coupling strength between engine and gearbox
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ClutchConfig {
    /// Torque per unit of clutch slip speed (N m s)
    pub strength: f32,
}

impl Default for ClutchConfig {
    fn default() -> Self {
        Self { strength: 10.0 }
    }
}

impl ClutchConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.strength > 0.0) {
            return Err(VehicleError::InvalidClutch("strength must be positive".into()));
        }
        Ok(())
    }
}
