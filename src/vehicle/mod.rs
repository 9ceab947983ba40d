//! Vehicles and the substep loop that drives them.

mod input;
mod state;
mod setup;
mod sprung;
mod stepper;
pub mod batch;

pub use self::input::{
    smooth_inputs_4w, DriveInputs, DriveInputs4W, InputSmoothing, NoDriveInputs, TankInputs,
};
pub use self::state::{
    StickyTireConstraint, SuspensionLimitConstraint, VehicleConstraints, VehicleState, WheelState,
};
pub use self::setup::{DriveDesc, DriveKind, EngineDriveDesc, Vehicle, VehicleDesc, WheelDesc};
pub use self::sprung::compute_sprung_masses;
pub use self::stepper::UpdateContext;
