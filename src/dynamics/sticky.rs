use crate::core::VehicleTuningContext;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Low-speed timers of one tire
///
/// Once a tire has been nearly at rest for long enough, its slip is
/// zeroed in that direction and the external solver holds it in place
/// with a velocity target instead.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct StickyTireState {
    /// Time spent with low longitudinal and wheel speed (s)
    pub long_timer: f32,

    /// Time spent with low lateral and longitudinal speed (s)
    pub lat_timer: f32,

    /// Longitudinal override engaged
    pub long_active: bool,

    /// Lateral override engaged
    pub lat_active: bool,
}

impl StickyTireState {
    /// Advances the timers and decides whether each override is engaged
    ///
    /// Airborne tires reset. A tire that is exactly stationary with a
    /// stationary wheel engages immediately when the driver shows no
    /// intent to accelerate.
    pub fn update(
        &mut self,
        in_contact: bool,
        long_speed: f32,
        lat_speed: f32,
        omega: f32,
        radius: f32,
        intent_to_accelerate: bool,
        dt: f32,
        tuning: &VehicleTuningContext,
    ) {
        if !in_contact {
            *self = Self::default();
            return;
        }

        let threshold = tuning.sticky_tire_threshold_speed;
        let slow_long = long_speed.abs() < threshold;

        if slow_long && (omega * radius).abs() < threshold && !intent_to_accelerate {
            self.long_timer += dt;
        } else {
            self.long_timer = 0.0;
        }
        if slow_long && lat_speed.abs() < threshold && !intent_to_accelerate {
            self.lat_timer += dt;
        } else {
            self.lat_timer = 0.0;
        }

        let at_rest = long_speed == 0.0 && omega == 0.0 && !intent_to_accelerate;
        let was_active = self.long_active;
        self.long_active = at_rest || self.long_timer > tuning.sticky_tire_timeout;
        self.lat_active = self.lat_timer > tuning.sticky_tire_timeout;

        if self.long_active && !was_active {
            log::debug!("sticky tire engaged (long speed {}, omega {})", long_speed, omega);
        }
    }
}
