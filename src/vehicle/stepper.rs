//! The fixed-substep update loop.
//!
//! Every update is split into a speed-dependent number of substeps. Each
//! substep pre-biases a copy of the chassis velocity by gravity for the
//! tire slips, runs the gearbox, differential and brakes, resolves every
//! suspension and tire, solves the drivetrain, advances the wheel angles
//! and finally applies the accumulated chassis force as an impulse. The
//! damper reads the jounce change between substeps. Wheel poses and
//! constraint rows are written once all substeps are done.

use std::f32::consts::TAU;

use nalgebra::Translation3;

use crate::components::{SuspensionConfig, TrackSide};
use crate::core::{ChassisBody, ContactReaction, VehicleTuningContext, WheelIndex, WheelPoseSink};
use crate::dynamics::differential::{diff_ratios_4w, tank_ratios};
use crate::dynamics::drivetrain::{solve_coupled, solve_tank, solve_uncoupled};
use crate::dynamics::steering::{steer_angles_4w, toe_angles};
use crate::dynamics::suspension::{self, SuspensionInput};
use crate::dynamics::tire::compute_slips;
use crate::dynamics::{DrivenWheel, EngineInput, TireForceInput};
use crate::math::{axis_angle, sign, Point3, Transform, Vector3, EPSILON};
use crate::surface::{FrictionPairs, SurfaceType, SurfaceTypeLookup};

use super::input::DriveInputs;
use super::setup::{DriveDesc, Vehicle};
use super::state::{StickyTireConstraint, SuspensionLimitConstraint};

/// Scene data shared read-only by every vehicle in one physics step
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    pub tuning: &'a VehicleTuningContext,
    pub friction_pairs: &'a FrictionPairs,

    /// Built from `friction_pairs` once per step
    pub surfaces: &'a SurfaceTypeLookup,

    pub gravity: Vector3,
}

impl<'a> UpdateContext<'a> {
    pub fn new(
        tuning: &'a VehicleTuningContext,
        friction_pairs: &'a FrictionPairs,
        surfaces: &'a SurfaceTypeLookup,
        gravity: Vector3,
    ) -> Self {
        Self { tuning, friction_pairs, surfaces, gravity }
    }
}

/// Gearbox output for one substep
#[derive(Debug, Clone, Copy, Default)]
struct DriveCommand {
    gear_ratio: f32,
    accel: f32,
}

/// Brake and direct drive torques of every wheel for one substep
#[derive(Debug, Default)]
struct WheelTorques {
    /// Brake torque, opposing the wheel's spin
    brake: Vec<f32>,

    /// Brake torque magnitude, also acting on a wheel at rest
    brake_magnitude: Vec<f32>,

    /// Torque applied straight to the wheel by the caller
    drive: Vec<f32>,
}

impl Vehicle {
    /// Advances the vehicle by `dt` seconds
    ///
    /// Reads the hits stored by the last [`Vehicle::suspension_raycasts`],
    /// applies impulses to `chassis`, pushes reaction impulses for dynamic
    /// bodies under the wheels into `reactions` and writes every wheel pose
    /// to `poses`. Never fails; a non-positive `dt` does nothing.
    pub fn update(
        &mut self,
        dt: f32,
        ctx: &UpdateContext<'_>,
        chassis: &mut dyn ChassisBody,
        reactions: &mut dyn ContactReaction,
        poses: &mut dyn WheelPoseSink,
    ) {
        if !(dt > 0.0) {
            return;
        }
        self.constraints.clear();

        let com_local = chassis.center_of_mass_local();
        let com_pose = chassis.global_pose() * com_local;
        let forward = com_pose.rotation * ctx.tuning.forward();
        let substeps = self.substeps.count_for(chassis.linear_velocity().dot(&forward));
        let sub_dt = dt / substeps as f32;

        self.update_steer_angles();
        let friction_multipliers = self.update_surfaces(ctx.friction_pairs, ctx.surfaces);

        for _ in 0..substeps {
            self.substep(sub_dt, ctx, &com_pose, &friction_multipliers, chassis, reactions);
        }

        self.collect_constraints(ctx.tuning, &com_pose);
        self.write_wheel_poses(ctx.tuning, &com_pose, poses);
    }

    fn update_steer_angles(&mut self) {
        let mut angles = vec![0.0; self.wheel_count()];
        match (&self.drive, &self.inputs) {
            (DriveDesc::FourWheel { ackermann, .. }, DriveInputs::FourWheel(inputs)) => {
                steer_angles_4w(inputs.steer(), &self.wheels, ackermann, &mut angles);
            }
            (_, DriveInputs::NoDrive(inputs)) => {
                for ((angle, wheel), steer) in
                    angles.iter_mut().zip(&self.wheels).zip(&inputs.steer_angles)
                {
                    *angle = steer + wheel.toe_angle;
                }
            }
            _ => toe_angles(&self.wheels, &mut angles),
        }
        for (state, angle) in self.state.wheels.iter_mut().zip(angles) {
            state.steer_angle = angle;
        }
    }

    fn update_surfaces(&mut self, pairs: &FrictionPairs, surfaces: &SurfaceTypeLookup) -> Vec<f32> {
        self.state
            .wheels
            .iter_mut()
            .zip(&self.tires)
            .map(|(state, tire)| {
                state.surface_type = state
                    .hit
                    .map_or(SurfaceType::DEFAULT, |hit| surfaces.surface_type(hit.material));
                pairs.friction(state.surface_type, tire.tire_type)
            })
            .collect()
    }

    fn drive_command(&mut self, dt: f32) -> DriveCommand {
        let drive = match &self.drive {
            DriveDesc::FourWheel { drive, .. } | DriveDesc::Tank { drive, .. } => drive,
            DriveDesc::NoDrive => return DriveCommand::default(),
        };
        let accel = match &self.inputs {
            DriveInputs::FourWheel(inputs) => inputs.accel,
            DriveInputs::Tank(inputs) => inputs.accel,
            DriveInputs::NoDrive(_) => 0.0,
        }
        .clamp(0.0, 1.0);

        let output = self.state.gearbox.update(
            dt,
            &drive.gears,
            drive.autobox.as_ref(),
            self.state.engine_omega / drive.engine.max_omega,
            accel,
        );
        DriveCommand {
            gear_ratio: output.gear_ratio,
            accel: output.accel,
        }
    }

    /// Clutch torque fraction and engine speed weight of every wheel
    fn drive_ratios(&self) -> (Vec<f32>, Vec<f32>) {
        let n = self.wheel_count();
        let mut torque = vec![0.0; n];
        let mut speed = vec![0.0; n];

        match (&self.drive, &self.inputs) {
            (DriveDesc::FourWheel { differential, .. }, _) => {
                let w = &self.state.wheels;
                let ratios = diff_ratios_4w(
                    differential,
                    [w[0].omega, w[1].omega, w[2].omega, w[3].omega],
                );
                torque[..4].copy_from_slice(&ratios.torque);
                speed[..4].copy_from_slice(&ratios.speed);
            }
            (DriveDesc::Tank { model, sides, .. }, DriveInputs::Tank(inputs)) => {
                let left = model.clamp_thrust(inputs.thrust_left);
                let right = model.clamp_thrust(inputs.thrust_right);
                tank_ratios(left, right, sides, &mut torque);
                speed.copy_from_slice(&torque);
            }
            _ => {}
        }
        (torque, speed)
    }

    fn wheel_torques(&self) -> WheelTorques {
        let n = self.wheel_count();
        let mut magnitudes = vec![0.0; n];
        let mut drive = vec![0.0; n];

        match (&self.drive, &self.inputs) {
            (_, DriveInputs::FourWheel(inputs)) => {
                let inputs = inputs.clamped();
                for (magnitude, wheel) in magnitudes.iter_mut().zip(&self.wheels) {
                    *magnitude = inputs.brake * wheel.max_brake_torque
                        + inputs.handbrake * wheel.max_hand_brake_torque;
                }
            }
            (DriveDesc::Tank { sides, .. }, DriveInputs::Tank(inputs)) => {
                for ((magnitude, wheel), side) in magnitudes.iter_mut().zip(&self.wheels).zip(sides) {
                    let brake = match side {
                        TrackSide::Left => inputs.brake_left,
                        TrackSide::Right => inputs.brake_right,
                    };
                    *magnitude = brake.clamp(0.0, 1.0) * wheel.max_brake_torque;
                }
            }
            (_, DriveInputs::NoDrive(inputs)) => {
                for (magnitude, brake) in magnitudes.iter_mut().zip(&inputs.brake_torques) {
                    *magnitude = brake.abs();
                }
                for (torque, input) in drive.iter_mut().zip(&inputs.drive_torques) {
                    *torque = *input;
                }
            }
            _ => {}
        }

        let brake = magnitudes
            .iter()
            .zip(&self.state.wheels)
            .map(|(magnitude, state)| -sign(state.omega) * magnitude)
            .collect();
        WheelTorques { brake, brake_magnitude: magnitudes, drive }
    }

    fn substep(
        &mut self,
        dt: f32,
        ctx: &UpdateContext<'_>,
        com_pose: &Transform,
        friction_multipliers: &[f32],
        chassis: &mut dyn ChassisBody,
        reactions: &mut dyn ContactReaction,
    ) {
        let tuning = ctx.tuning;
        let gravity = ctx.gravity;
        let gravity_magnitude = gravity.norm();
        let linear = chassis.linear_velocity();
        let angular = chassis.angular_velocity();
        // Tire forces react against gravity instead of being undone by it
        let biased = linear + gravity * dt;

        let command = self.drive_command(dt);
        let (torque_ratio, speed_ratio) = self.drive_ratios();
        let torques = self.wheel_torques();

        let up = com_pose.rotation * tuning.up();
        let forward = com_pose.rotation * tuning.forward();
        let lateral_local = tuning.lateral();
        let com = com_pose.translation.vector;

        let mut force = Vector3::zeros();
        let mut torque = Vector3::zeros();
        let mut tire_torques = vec![0.0; self.wheel_count()];

        for i in 0..self.wheel_count() {
            let wheel = &self.wheels[i];
            let susp = &self.suspensions[i];
            let tire = &self.tires[i];
            let state = &mut self.state.wheels[i];

            let contact = suspension::resolve(&SuspensionInput {
                wheel,
                suspension: susp,
                load_filter: &self.load_filter,
                hit: state.hit.as_ref(),
                com_pose,
                prev_jounce: state.in_contact.then_some(state.jounce),
                dt,
                gravity,
                min_contact_cosine: tuning.min_contact_cosine,
            });

            state.jounce = contact.jounce;
            state.suspension_limit_error = contact.limit_error;
            force += contact.force;
            torque += contact.torque;

            if !contact.in_contact {
                state.clear_contact();
                continue;
            }

            let wheel_forward = axis_angle(&up, state.steer_angle) * forward;
            let normal = contact.normal;
            let long_dir = match (wheel_forward - normal * normal.dot(&wheel_forward)).try_normalize(EPSILON) {
                Some(dir) => dir,
                None => {
                    log::trace!("wheel {} forward is parallel to the contact normal", i);
                    state.clear_contact();
                    continue;
                }
            };
            let lat_dir = normal.cross(&long_dir);

            // Camber of the wheel plane against the contact plane
            let wheel_up = com_pose.rotation
                * axis_angle(&tuning.up(), state.steer_angle)
                * axis_angle(&tuning.forward(), camber_rotation(susp, contact.jounce, &lateral_local))
                * tuning.up();
            let camber = wheel_up.dot(&lat_dir).clamp(-1.0, 1.0).asin();

            let r = contact.contact_point.coords - com;
            let velocity = biased + angular.cross(&r);
            let long_speed = velocity.dot(&long_dir);
            let lat_speed = velocity.dot(&lat_dir);

            let intent = match self.drive {
                DriveDesc::NoDrive => torques.drive[i] != 0.0,
                _ => command.accel > 0.0 && command.gear_ratio != 0.0 && torque_ratio[i] != 0.0,
            };
            state.sticky.update(
                true,
                long_speed,
                lat_speed,
                state.omega,
                wheel.radius,
                intent,
                dt,
                tuning,
            );

            let mut slips = compute_slips(
                long_speed,
                lat_speed,
                state.omega,
                wheel.radius,
                intent || torques.brake_magnitude[i] > 0.0,
                tuning.min_long_slip_denominator,
                tuning.min_lat_speed_for_tire_model,
            );
            if state.sticky.long_active {
                slips.long = 0.0;
            }
            if state.sticky.lat_active {
                slips.lat = 0.0;
            }

            let friction = tire.friction_at(slips.long) * friction_multipliers[i];
            let forces = self.tire_model.compute(
                tire,
                &TireForceInput {
                    friction,
                    long_slip: slips.long,
                    lat_slip: slips.lat,
                    camber,
                    omega: state.omega,
                    radius: wheel.radius,
                    rest_load: contact.rest_load,
                    normalized_load: contact.normalized_load,
                    load: contact.tire_load,
                    gravity: gravity_magnitude,
                },
            );

            let tire_force = long_dir * forces.long_force + lat_dir * forces.lat_force;
            force += tire_force;
            torque += (com_pose.rotation * susp.tire_force_app_point_offset).cross(&tire_force);
            tire_torques[i] = forces.wheel_torque;

            if let Some(actor) = contact.reaction_actor {
                reactions.apply_impulse_at_point(
                    actor,
                    -(contact.force + tire_force) * dt,
                    contact.reaction_point,
                );
            }

            state.in_contact = true;
            state.camber = camber;
            state.long_slip = slips.long;
            state.lat_slip = slips.lat;
            state.friction = friction;
            state.tire_load = contact.tire_load;
            state.normalized_load = contact.normalized_load;
            state.long_force = forces.long_force;
            state.lat_force = forces.lat_force;
            state.align_moment = forces.align_moment;
            state.long_speed = long_speed;
            state.lat_speed = lat_speed;
            state.long_dir = long_dir;
            state.lat_dir = lat_dir;
            state.contact_point = contact.contact_point;
        }

        let driven: Vec<DrivenWheel> = (0..self.wheel_count())
            .map(|i| DrivenWheel {
                omega: self.state.wheels[i].omega,
                recip_moi: self.wheels[i].recip_moi(),
                damping_rate: self.wheels[i].damping_rate,
                torque: torques.brake[i] + torques.drive[i] + tire_torques[i],
                torque_ratio: torque_ratio[i],
                speed_ratio: speed_ratio[i],
                brake_torque: torques.brake_magnitude[i],
            })
            .collect();
        self.solve_drivetrain(&driven, command, dt);
        self.integrate_wheel_angles(tuning, dt);

        chassis.apply_impulse(force * dt, torque * dt);
    }

    fn solve_drivetrain(&mut self, driven: &[DrivenWheel], command: DriveCommand, dt: f32) {
        let mut omegas = vec![0.0; driven.len()];

        match &self.drive {
            DriveDesc::FourWheel { drive, .. } | DriveDesc::Tank { drive, .. } => {
                let engine = &drive.engine;
                let omega = self.state.engine_omega;
                let input = EngineInput {
                    omega,
                    moi: engine.moi,
                    drive_torque: engine.drive_torque(command.accel, omega),
                    damping_rate: engine.damping_rate(command.accel, command.gear_ratio != 0.0),
                    max_omega: engine.max_omega,
                };

                let solution = if let DriveDesc::Tank { sides, .. } = &self.drive {
                    solve_tank(driven, sides, &input, command.gear_ratio, drive.clutch.strength, dt, &mut omegas)
                } else {
                    let (coupled, free) = driven.split_at(4);
                    let (coupled_out, free_out) = omegas.split_at_mut(4);
                    solve_uncoupled(free, dt, free_out);
                    solve_coupled(coupled, &input, command.gear_ratio, drive.clutch.strength, dt, coupled_out)
                };
                self.state.engine_omega = solution.engine_omega;
            }
            DriveDesc::NoDrive => solve_uncoupled(driven, dt, &mut omegas),
        }

        for (state, omega) in self.state.wheels.iter_mut().zip(omegas) {
            state.omega = omega;
        }
    }

    /// Advances wheel rotation angles
    ///
    /// Below the integration threshold speed the wheel turns at a blend of
    /// its own speed and the speed it would have rolling freely, which hides
    /// low-speed jitter in the tire model.
    fn integrate_wheel_angles(&mut self, tuning: &VehicleTuningContext, dt: f32) {
        let threshold = tuning.threshold_forward_speed_for_wheel_angle_integration;
        for (state, wheel) in self.state.wheels.iter_mut().zip(&self.wheels) {
            let speed = state.long_speed.abs();
            state.corrected_omega = if state.in_contact && speed < threshold {
                let alpha = speed / threshold;
                alpha * state.omega + (1.0 - alpha) * state.long_speed * wheel.recip_radius()
            } else {
                state.omega
            };
            state.rotation_angle = (state.rotation_angle + state.corrected_omega * dt).rem_euclid(TAU);
        }
    }

    fn collect_constraints(&mut self, tuning: &VehicleTuningContext, com_pose: &Transform) {
        let n = self.wheel_count();
        for ((index, susp), state) in WheelIndex::range(n).zip(&self.suspensions).zip(&self.state.wheels) {
            if state.suspension_limit_error > 0.0 {
                self.constraints.suspension_limits.push(SuspensionLimitConstraint {
                    wheel: index,
                    direction: com_pose.rotation * susp.travel_direction,
                    point: com_pose * Point3::from(susp.force_app_point_offset),
                    error: state.suspension_limit_error,
                });
            }
            if !state.in_contact {
                continue;
            }
            let sticky_rows = [
                (state.sticky.long_active, state.long_dir),
                (state.sticky.lat_active, state.lat_dir),
            ];
            for (active, direction) in sticky_rows {
                if active {
                    self.constraints.sticky_tires.push(StickyTireConstraint {
                        wheel: index,
                        direction,
                        point: state.contact_point,
                        target_speed: 0.0,
                        damping: tuning.sticky_tire_damping,
                    });
                }
            }
        }
    }

    /// Writes each wheel's world transform
    ///
    /// Impulses only change velocities, so the pose the step started from
    /// is still the chassis pose.
    fn write_wheel_poses(
        &self,
        tuning: &VehicleTuningContext,
        com_pose: &Transform,
        poses: &mut dyn WheelPoseSink,
    ) {
        let up = tuning.up();
        let forward = tuning.forward();
        let lateral = tuning.lateral();
        let n = self.wheel_count();

        for ((index, susp), state) in WheelIndex::range(n).zip(&self.suspensions).zip(&self.state.wheels) {
            let position = susp.wheel_centre_offset - susp.travel_direction * state.jounce;
            let rotation = axis_angle(&up, state.steer_angle)
                * axis_angle(&forward, camber_rotation(susp, state.jounce, &lateral))
                * axis_angle(&lateral, state.rotation_angle);
            let local = Transform::from_parts(Translation3::from(position), rotation);
            poses.set_wheel_pose(index, &(com_pose * local));
        }
    }
}

/// Rotation about the forward axis that applies suspension camber
///
/// Positive camber tilts the top of the wheel outward, so left and right
/// wheels rotate in opposite directions.
fn camber_rotation(suspension: &SuspensionConfig, jounce: f32, lateral: &Vector3) -> f32 {
    let camber = suspension.camber_at(jounce);
    if suspension.wheel_centre_offset.dot(lateral) >= 0.0 {
        -camber
    } else {
        camber
    }
}
