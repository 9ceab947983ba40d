use std::f32::consts::PI;
use std::sync::Arc;

use crate::components::{
    AckermannGeometry, AutoboxConfig, ClutchConfig, Differential4WConfig, EngineConfig, Gear,
    GearboxConfig, SuspensionConfig, TankDriveModel, TireConfig, TireLoadFilter, TrackSide,
    WheelConfig,
};
use crate::core::{
    ChassisBody, QueryFilter, SceneQuery, SubstepConfig, WheelIndex, MAX_WHEELS,
};
use crate::dynamics::suspension::suspension_ray;
use crate::dynamics::{CombinedSlipTireModel, GearboxState, TireForceModel};
use crate::error::VehicleError;
use crate::math::Vector3;
use crate::Result;

use super::input::{DriveInputs, DriveInputs4W, NoDriveInputs, TankInputs};
use super::sprung::compute_sprung_masses;
use super::state::{VehicleConstraints, VehicleState, WheelState};

/// Wheel, suspension and tire of one corner
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WheelDesc {
    pub wheel: WheelConfig,
    pub suspension: SuspensionConfig,
    pub tire: TireConfig,
}

impl WheelDesc {
    pub fn new(wheel: WheelConfig, suspension: SuspensionConfig, tire: TireConfig) -> Self {
        Self { wheel, suspension, tire }
    }

    fn validate(&self, index: usize) -> Result<()> {
        self.wheel.validate(index)?;
        self.suspension.validate(index)?;
        self.tire.validate(index)
    }
}

/// Engine, gearbox and clutch shared by every engine-driven vehicle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineDriveDesc {
    pub engine: EngineConfig,
    pub gears: GearboxConfig,

    /// Automatic gearbox thresholds; the autobox is enabled when present
    pub autobox: Option<AutoboxConfig>,
    pub clutch: ClutchConfig,
}

impl EngineDriveDesc {
    fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.gears.validate()?;
        if let Some(autobox) = &self.autobox {
            autobox.validate(&self.gears)?;
        }
        self.clutch.validate()
    }
}

/// How torque reaches the wheels
#[derive(Debug, Clone, PartialEq)]
pub enum DriveDesc {
    /// Engine and four-wheel differential; wheels past the first four are undriven
    FourWheel {
        drive: EngineDriveDesc,
        differential: Differential4WConfig,
        ackermann: AckermannGeometry,
    },

    /// Engine driving two tracks; `sides` assigns every wheel to a track
    Tank {
        drive: EngineDriveDesc,
        model: TankDriveModel,
        sides: Vec<TrackSide>,
    },

    /// Torques and steer angles come straight from the caller
    NoDrive,
}

/// Drive type without its configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveKind {
    FourWheel,
    Tank,
    NoDrive,
}

impl DriveDesc {
    /// Default engine, gearbox and differential for a road car
    pub fn four_wheel() -> Self {
        DriveDesc::FourWheel {
            drive: EngineDriveDesc::default(),
            differential: Differential4WConfig::default(),
            ackermann: AckermannGeometry::default(),
        }
    }

    /// Default tank drive with wheels alternating left and right
    pub fn tank(wheel_count: usize, model: TankDriveModel) -> Self {
        let sides = (0..wheel_count)
            .map(|i| if i % 2 == 0 { TrackSide::Left } else { TrackSide::Right })
            .collect();
        DriveDesc::Tank {
            drive: EngineDriveDesc::default(),
            model,
            sides,
        }
    }

    pub fn kind(&self) -> DriveKind {
        match self {
            DriveDesc::FourWheel { .. } => DriveKind::FourWheel,
            DriveDesc::Tank { .. } => DriveKind::Tank,
            DriveDesc::NoDrive => DriveKind::NoDrive,
        }
    }

    /// Engine, gearbox and clutch, if the drive has an engine
    pub fn engine_drive(&self) -> Option<&EngineDriveDesc> {
        match self {
            DriveDesc::FourWheel { drive, .. } | DriveDesc::Tank { drive, .. } => Some(drive),
            DriveDesc::NoDrive => None,
        }
    }

    fn validate(&self, wheel_count: usize) -> Result<()> {
        match self {
            DriveDesc::FourWheel { drive, differential, ackermann } => {
                if wheel_count < 4 {
                    return Err(VehicleError::WheelCountMismatch { expected: 4, found: wheel_count });
                }
                drive.validate()?;
                differential.validate()?;
                ackermann.validate()
            }
            DriveDesc::Tank { drive, sides, .. } => {
                if sides.len() != wheel_count {
                    return Err(VehicleError::WheelCountMismatch {
                        expected: wheel_count,
                        found: sides.len(),
                    });
                }
                if !sides.contains(&TrackSide::Left) || !sides.contains(&TrackSide::Right) {
                    return Err(VehicleError::InvalidParameter(
                        "tank needs at least one wheel on each track".to_string(),
                    ));
                }
                drive.validate()
            }
            DriveDesc::NoDrive => Ok(()),
        }
    }

    fn default_inputs(&self, wheel_count: usize) -> DriveInputs {
        match self {
            DriveDesc::FourWheel { .. } => DriveInputs::FourWheel(DriveInputs4W::default()),
            DriveDesc::Tank { .. } => DriveInputs::Tank(TankInputs::default()),
            DriveDesc::NoDrive => DriveInputs::NoDrive(NoDriveInputs::zeroed(wheel_count)),
        }
    }
}

/// Everything needed to create a [`Vehicle`]
#[derive(Debug, Clone)]
pub struct VehicleDesc {
    pub wheels: Vec<WheelDesc>,
    pub drive: DriveDesc,
    pub load_filter: TireLoadFilter,
    pub substeps: SubstepConfig,
    pub tire_model: Arc<dyn TireForceModel>,

    /// Filter handed to every suspension raycast; the chassis actor is
    /// always excluded in addition
    pub query_filter: QueryFilter,
}

impl VehicleDesc {
    /// Creates an empty description for a drive type
    pub fn new(drive: DriveDesc) -> Self {
        let substeps = match drive {
            DriveDesc::Tank { .. } => SubstepConfig::tank(),
            _ => SubstepConfig::default(),
        };
        Self {
            wheels: Vec::new(),
            drive,
            load_filter: TireLoadFilter::default(),
            substeps,
            tire_model: Arc::new(CombinedSlipTireModel),
            query_filter: QueryFilter::default(),
        }
    }

    pub fn with_wheel(mut self, wheel: WheelDesc) -> Self {
        self.wheels.push(wheel);
        self
    }

    pub fn with_tire_model(mut self, model: Arc<dyn TireForceModel>) -> Self {
        self.tire_model = model;
        self
    }

    pub fn with_substeps(mut self, substeps: SubstepConfig) -> Self {
        self.substeps = substeps;
        self
    }

    pub fn with_load_filter(mut self, filter: TireLoadFilter) -> Self {
        self.load_filter = filter;
        self
    }

    /// A four-door sedan on a +Y up, +Z forward chassis
    ///
    /// Track 1.6 m, wheelbase 2.6 m, wheel centres 0.35 m below the centre
    /// of mass. Sprung masses split `chassis_mass` evenly; front wheels
    /// steer and rear wheels carry the handbrake.
    pub fn sedan(chassis_mass: f32) -> Result<Self> {
        let half_track = 0.8;
        let half_base = 1.3;
        let height = -0.35;
        let offsets = [
            Vector3::new(half_track, height, half_base),
            Vector3::new(-half_track, height, half_base),
            Vector3::new(half_track, height, -half_base),
            Vector3::new(-half_track, height, -half_base),
        ];
        let masses = compute_sprung_masses(&offsets, chassis_mass, &Vector3::y(), &Vector3::z())?;

        let mut desc = Self::new(DriveDesc::four_wheel());
        for (i, (offset, sprung_mass)) in offsets.iter().zip(masses).enumerate() {
            let wheel = if i < 2 {
                WheelConfig::default().with_max_steer(PI / 3.0)
            } else {
                WheelConfig::default().with_brakes(1500.0, 4000.0)
            };
            let mut suspension = SuspensionConfig::at(*offset);
            suspension.sprung_mass = sprung_mass;
            desc = desc.with_wheel(WheelDesc::new(wheel, suspension, TireConfig::default()));
        }
        Ok(desc)
    }

    /// Runs every range check; the first violation is returned
    pub fn validate(&self) -> Result<()> {
        let count = self.wheels.len();
        if count == 0 || count > MAX_WHEELS {
            return Err(VehicleError::InvalidParameter(format!(
                "wheel count must be in 1..={}, found {}",
                MAX_WHEELS, count
            )));
        }
        for (i, wheel) in self.wheels.iter().enumerate() {
            wheel.validate(i)?;
        }
        self.load_filter.validate()?;
        self.substeps.validate()?;
        self.drive.validate(count)
    }
}

/// A raycast vehicle: configuration, inputs and runtime state
///
/// The chassis rigid body lives outside and is handed in on every call.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub(super) wheels: Vec<WheelConfig>,
    pub(super) suspensions: Vec<SuspensionConfig>,
    pub(super) tires: Vec<TireConfig>,
    pub(super) load_filter: TireLoadFilter,
    pub(super) drive: DriveDesc,
    pub(super) tire_model: Arc<dyn TireForceModel>,
    pub(super) substeps: SubstepConfig,
    pub(super) query_filter: QueryFilter,
    pub(super) inputs: DriveInputs,
    pub(super) state: VehicleState,
    pub(super) constraints: VehicleConstraints,
}

impl Vehicle {
    /// Validates a description and creates the vehicle at rest in neutral
    pub fn new(desc: VehicleDesc) -> Result<Self> {
        if let Err(err) = desc.validate() {
            log::warn!("vehicle setup rejected: {}", err);
            return Err(err);
        }

        let count = desc.wheels.len();
        let mut wheels = Vec::with_capacity(count);
        let mut suspensions = Vec::with_capacity(count);
        let mut tires = Vec::with_capacity(count);
        for wheel in desc.wheels {
            wheels.push(wheel.wheel);
            suspensions.push(wheel.suspension);
            tires.push(wheel.tire);
        }

        let mut state = VehicleState::at_rest(count);
        state.gearbox.set_use_autobox(
            desc.drive.engine_drive().map_or(false, |d| d.autobox.is_some()),
        );

        log::debug!(
            "created {:?} vehicle with {} wheels, tire model {:?}",
            desc.drive.kind(),
            count,
            desc.tire_model
        );

        Ok(Self {
            inputs: desc.drive.default_inputs(count),
            wheels,
            suspensions,
            tires,
            load_filter: desc.load_filter,
            drive: desc.drive,
            tire_model: desc.tire_model,
            substeps: desc.substeps,
            query_filter: desc.query_filter,
            state,
            constraints: VehicleConstraints::default(),
        })
    }

    #[inline]
    pub fn wheel_count(&self) -> usize {
        self.wheels.len()
    }

    pub fn drive_kind(&self) -> DriveKind {
        self.drive.kind()
    }

    pub fn drive(&self) -> &DriveDesc {
        &self.drive
    }

    pub fn wheel_config(&self, wheel: WheelIndex) -> Option<&WheelConfig> {
        self.wheels.get(wheel.get())
    }

    pub fn suspension_config(&self, wheel: WheelIndex) -> Option<&SuspensionConfig> {
        self.suspensions.get(wheel.get())
    }

    pub fn tire_config(&self, wheel: WheelIndex) -> Option<&TireConfig> {
        self.tires.get(wheel.get())
    }

    pub fn substeps(&self) -> &SubstepConfig {
        &self.substeps
    }

    pub fn inputs(&self) -> &DriveInputs {
        &self.inputs
    }

    /// Replaces the controls; they must match the drive type
    pub fn set_inputs(&mut self, inputs: DriveInputs) -> Result<()> {
        let matches = matches!(
            (&inputs, self.drive.kind()),
            (DriveInputs::FourWheel(_), DriveKind::FourWheel)
                | (DriveInputs::Tank(_), DriveKind::Tank)
                | (DriveInputs::NoDrive(_), DriveKind::NoDrive)
        );
        if !matches {
            return Err(VehicleError::InvalidParameter(format!(
                "inputs do not match a {:?} drive",
                self.drive.kind()
            )));
        }
        if let DriveInputs::NoDrive(no_drive) = &inputs {
            let count = self.wheel_count();
            for found in [
                no_drive.drive_torques.len(),
                no_drive.brake_torques.len(),
                no_drive.steer_angles.len(),
            ] {
                if found != count {
                    return Err(VehicleError::WheelCountMismatch { expected: count, found });
                }
            }
        }
        self.inputs = inputs;
        Ok(())
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn wheel_state(&self, wheel: WheelIndex) -> Option<&WheelState> {
        self.state.wheels.get(wheel.get())
    }

    /// Sets a wheel's angular speed, e.g. when placing a moving vehicle
    pub fn set_wheel_omega(&mut self, wheel: WheelIndex, omega: f32) {
        if let Some(state) = self.state.wheels.get_mut(wheel.get()) {
            state.omega = omega;
        }
    }

    #[inline]
    pub fn engine_omega(&self) -> f32 {
        self.state.engine_omega
    }

    pub fn set_engine_omega(&mut self, omega: f32) {
        let max = self.drive.engine_drive().map_or(0.0, |d| d.engine.max_omega);
        self.state.engine_omega = omega.clamp(0.0, max);
    }

    pub fn gearbox(&self) -> &GearboxState {
        &self.state.gearbox
    }

    #[inline]
    pub fn current_gear(&self) -> Gear {
        self.state.gearbox.current_gear()
    }

    #[inline]
    pub fn target_gear(&self) -> Gear {
        self.state.gearbox.target_gear()
    }

    pub fn request_gear_up(&mut self) {
        self.state.gearbox.request_gear_up();
    }

    pub fn request_gear_down(&mut self) {
        self.state.gearbox.request_gear_down();
    }

    /// Engages a gear immediately, skipping the neutral pass-through
    pub fn force_gear(&mut self, gear: Gear) -> Result<()> {
        let drive = self.drive.engine_drive().ok_or_else(|| {
            VehicleError::InvalidParameter("vehicle has no gearbox".to_string())
        })?;
        if !drive.gears.contains(gear) {
            return Err(VehicleError::InvalidGears(format!("gearbox has no gear {}", gear)));
        }
        self.state.gearbox.force_gear(gear);
        Ok(())
    }

    /// Enables the autobox; fails if no autobox thresholds were configured
    pub fn set_use_autobox(&mut self, enabled: bool) -> Result<()> {
        let has_autobox = self.drive.engine_drive().map_or(false, |d| d.autobox.is_some());
        if enabled && !has_autobox {
            return Err(VehicleError::InvalidAutobox("no autobox configured".to_string()));
        }
        self.state.gearbox.set_use_autobox(enabled);
        Ok(())
    }

    /// Constraint rows produced by the last update
    pub fn constraints(&self) -> &VehicleConstraints {
        &self.constraints
    }

    /// Zeroes every speed, timer and input and returns to neutral
    pub fn set_to_rest_state(&mut self) {
        let use_autobox = self.state.gearbox.use_autobox();
        self.state = VehicleState::at_rest(self.wheel_count());
        self.state.gearbox.set_use_autobox(use_autobox);
        self.inputs = self.drive.default_inputs(self.wheel_count());
        self.constraints.clear();
    }

    /// Casts one suspension ray per wheel and stores the results
    ///
    /// Must run for every vehicle before any of them is updated.
    pub fn suspension_raycasts(&mut self, scene: &dyn SceneQuery, chassis: &dyn ChassisBody) {
        let com_pose = chassis.global_pose() * chassis.center_of_mass_local();
        let mut filter = self.query_filter;
        if let Some(actor) = chassis.actor_id() {
            filter.exclude_actor = Some(actor);
        }

        for ((wheel, suspension), state) in self
            .wheels
            .iter()
            .zip(&self.suspensions)
            .zip(self.state.wheels.iter_mut())
        {
            let ray = suspension_ray(&com_pose, suspension, wheel);
            state.hit = scene.raycast(&ray, &filter);
            state.ray = Some(ray);
        }
    }
}
