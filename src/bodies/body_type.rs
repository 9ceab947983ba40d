#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// How a body the wheels touch is simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RigidBodyType {
    /// Fully simulated; receives the reaction to the suspension and tire forces
    Dynamic,

    /// Moved programmatically; never receives reaction impulses
    Kinematic,

    /// Never moves
    #[default]
    Static,
}

impl RigidBodyType {
    /// Returns true if reaction impulses should be applied to this body
    #[inline]
    pub fn receives_reactions(self) -> bool {
        self == RigidBodyType::Dynamic
    }
}
