//! Contact surfaces and the tire friction table.

mod friction_pairs;
mod lookup;

pub use self::friction_pairs::FrictionPairs;
pub use self::lookup::SurfaceTypeLookup;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Identity of a contact material as reported by the raycast collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MaterialId(pub u32);

/// Drivable surface category (tarmac, mud, ice...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SurfaceType(pub u32);

impl SurfaceType {
    /// Surface type reported for materials missing from the table
    pub const DEFAULT: SurfaceType = SurfaceType(0);
}

/// Tire compound category (slicks, wets, snow...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TireType(pub u32);
