pub mod tuning;
pub mod query;

pub use self::tuning::{VehicleTuningContext, SubstepConfig};
pub use self::query::{
    ActorId, ChassisBody, ContactReaction, NoContactReaction, NoPoseSink, QueryFilter, RaycastHit,
    ReactionImpulse, SceneQuery, SuspensionRay, WheelPoseSink, WheelPoses,
};

use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Largest number of wheels a single vehicle may carry
pub const MAX_WHEELS: usize = 20;

/// Typed index of a wheel within its vehicle
///
/// Four-wheel vehicles use the first four slots in the order front-left,
/// front-right, rear-left, rear-right. Tanks alternate left and right
/// track wheels by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct WheelIndex(usize);

impl WheelIndex {
    pub const FRONT_LEFT: WheelIndex = WheelIndex(0);
    pub const FRONT_RIGHT: WheelIndex = WheelIndex(1);
    pub const REAR_LEFT: WheelIndex = WheelIndex(2);
    pub const REAR_RIGHT: WheelIndex = WheelIndex(3);

    /// Creates an index, returning `None` past [`MAX_WHEELS`]
    #[inline]
    pub fn new(index: usize) -> Option<Self> {
        (index < MAX_WHEELS).then_some(Self(index))
    }

    /// Returns the raw slot number
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Iterates the first `count` wheel indices
    pub fn range(count: usize) -> impl Iterator<Item = WheelIndex> {
        (0..count.min(MAX_WHEELS)).map(WheelIndex)
    }
}

impl fmt::Display for WheelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "FL"),
            1 => write!(f, "FR"),
            2 => write!(f, "RL"),
            3 => write!(f, "RR"),
            n => write!(f, "W{}", n),
        }
    }
}
