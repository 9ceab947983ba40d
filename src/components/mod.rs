//! Immutable per-vehicle configuration.
//!
//! Every struct validates itself with simple range checks. A vehicle is
//! only created once all of its components pass.

mod wheel;
mod suspension;
mod tire;
mod engine;
mod gears;
mod clutch;
mod differential;
mod ackermann;

pub use self::wheel::WheelConfig;
pub use self::suspension::SuspensionConfig;
pub use self::tire::{TireConfig, TireLoadFilter};
pub use self::engine::EngineConfig;
pub use self::gears::{AutoboxConfig, Gear, GearboxConfig, MAX_FORWARD_GEARS};
pub use self::clutch::ClutchConfig;
pub use self::differential::{Differential4WConfig, DifferentialType, TankDriveModel, TrackSide};
pub use self::ackermann::AckermannGeometry;
