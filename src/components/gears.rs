use std::fmt;

use crate::error::VehicleError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Most forward gears a gearbox may have
pub const MAX_FORWARD_GEARS: usize = 30;

/// A gearbox position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Gear {
    Reverse,
    #[default]
    Neutral,
    /// Forward gear, counting from 1
    Forward(u8),
}

impl Gear {
    pub const FIRST: Gear = Gear::Forward(1);

    /// Position in the sequence reverse, neutral, first, second...
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Gear::Reverse => 0,
            Gear::Neutral => 1,
            Gear::Forward(k) => k as usize + 1,
        }
    }

    /// Inverse of [`Gear::index`]
    #[inline]
    pub fn from_index(index: usize) -> Gear {
        match index {
            0 => Gear::Reverse,
            1 => Gear::Neutral,
            k => Gear::Forward((k - 1).min(u8::MAX as usize) as u8),
        }
    }

    /// Returns true for any forward gear
    #[inline]
    pub fn is_forward(self) -> bool {
        matches!(self, Gear::Forward(_))
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gear::Reverse => write!(f, "R"),
            Gear::Neutral => write!(f, "N"),
            Gear::Forward(k) => write!(f, "{}", k),
        }
    }
}

/// Gear ratios and shift timing
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GearboxConfig {
    /// Ratio of reverse gear, negative
    pub reverse_ratio: f32,

    /// Forward ratios from first gear up, each smaller than the previous
    pub forward_ratios: Vec<f32>,

    /// Final drive ratio applied on top of every gear
    pub final_ratio: f32,

    /// Time spent in neutral during a gear change (s)
    pub switch_time: f32,
}

impl Default for GearboxConfig {
    fn default() -> Self {
        Self {
            reverse_ratio: -4.0,
            forward_ratios: vec![4.0, 2.0, 1.5, 1.1, 1.0],
            final_ratio: 4.0,
            switch_time: 0.5,
        }
    }
}

impl GearboxConfig {
    /// Number of forward gears
    #[inline]
    pub fn forward_count(&self) -> usize {
        self.forward_ratios.len()
    }

    /// Ratio of a gear, excluding the final drive
    ///
    /// Neutral and forward gears past the top gear give zero.
    pub fn ratio(&self, gear: Gear) -> f32 {
        match gear {
            Gear::Reverse => self.reverse_ratio,
            Gear::Neutral => 0.0,
            Gear::Forward(k) => {
                let k = k as usize;
                if k >= 1 && k <= self.forward_ratios.len() {
                    self.forward_ratios[k - 1]
                } else {
                    0.0
                }
            }
        }
    }

    /// Highest forward gear
    #[inline]
    pub fn top_gear(&self) -> Gear {
        Gear::Forward(self.forward_count() as u8)
    }

    /// The gear one step up, if any
    pub fn next_up(&self, gear: Gear) -> Option<Gear> {
        match gear {
            Gear::Reverse => Some(Gear::Neutral),
            Gear::Neutral if self.forward_count() > 0 => Some(Gear::FIRST),
            Gear::Forward(k) if (k as usize) < self.forward_count() => Some(Gear::Forward(k + 1)),
            _ => None,
        }
    }

    /// The gear one step down, if any
    pub fn next_down(&self, gear: Gear) -> Option<Gear> {
        match gear {
            Gear::Reverse => None,
            Gear::Neutral => Some(Gear::Reverse),
            Gear::Forward(k) if k <= 1 => Some(Gear::Neutral),
            Gear::Forward(k) => Some(Gear::Forward(k - 1)),
        }
    }

    /// Returns true if the gear exists in this gearbox
    pub fn contains(&self, gear: Gear) -> bool {
        match gear {
            Gear::Forward(k) => k >= 1 && (k as usize) <= self.forward_count(),
            _ => true,
        }
    }

    /// Checks ratios and timing
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(VehicleError::InvalidGears(reason));

        if !(self.reverse_ratio < 0.0) {
            return fail(format!("reverse ratio must be negative, got {}", self.reverse_ratio));
        }
        if self.forward_ratios.is_empty() || self.forward_ratios.len() > MAX_FORWARD_GEARS {
            return fail(format!(
                "between 1 and {} forward gears required, got {}",
                MAX_FORWARD_GEARS,
                self.forward_ratios.len()
            ));
        }
        if self.forward_ratios.iter().any(|r| !(*r > 0.0)) {
            return fail("forward ratios must be positive".into());
        }
        if let Some(i) = self.forward_ratios.windows(2).position(|w| !(w[1] < w[0])) {
            return fail(format!(
                "gear {} ratio must be smaller than gear {} ratio",
                i + 2,
                i + 1
            ));
        }
        if !(self.final_ratio > 0.0) {
            return fail("final ratio must be positive".into());
        }
        if !(self.switch_time >= 0.0) {
            return fail("switch time must be non-negative".into());
        }
        Ok(())
    }
}

/// Automatic shifting thresholds
///
/// Thresholds are engine speed divided by max engine speed, one entry per
/// forward gear.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct AutoboxConfig {
    /// Shift up above this normalized engine speed
    pub up_ratios: Vec<f32>,

    /// Shift down below this normalized engine speed
    pub down_ratios: Vec<f32>,

    /// Minimum time between automatic shifts (s)
    pub latency: f32,
}

impl AutoboxConfig {
    /// Uniform thresholds for a gearbox with `forward_gears` forward gears
    pub fn for_gears(forward_gears: usize) -> Self {
        Self {
            up_ratios: vec![0.65; forward_gears],
            down_ratios: vec![0.5; forward_gears],
            latency: 2.0,
        }
    }

    /// Up threshold for a forward gear
    #[inline]
    pub fn up_ratio(&self, gear: Gear) -> Option<f32> {
        match gear {
            Gear::Forward(k) => (k as usize).checked_sub(1).and_then(|i| self.up_ratios.get(i)).copied(),
            _ => None,
        }
    }

    /// Down threshold for a forward gear
    #[inline]
    pub fn down_ratio(&self, gear: Gear) -> Option<f32> {
        match gear {
            Gear::Forward(k) => (k as usize).checked_sub(1).and_then(|i| self.down_ratios.get(i)).copied(),
            _ => None,
        }
    }

    /// Checks the thresholds match the gearbox
    pub fn validate(&self, gears: &GearboxConfig) -> Result<()> {
        let fail = |reason: String| Err(VehicleError::InvalidAutobox(reason));

        let n = gears.forward_count();
        if self.up_ratios.len() != n || self.down_ratios.len() != n {
            return fail(format!("expected {} up and down thresholds", n));
        }
        for (i, (up, down)) in self.up_ratios.iter().zip(&self.down_ratios).enumerate() {
            if !(0.0..=1.0).contains(up) || !(0.0..=1.0).contains(down) {
                return fail(format!("gear {} thresholds must lie in [0, 1]", i + 1));
            }
            if !(down < up) {
                return fail(format!("gear {} down threshold must be below up threshold", i + 1));
            }
        }
        if !(self.latency >= 0.0) {
            return fail("latency must be non-negative".into());
        }
        Ok(())
    }
}
