//! Two-phase stepping of many vehicles.
//!
//! All suspension raycasts of all vehicles run first, then every vehicle is
//! updated. The surface lookup is rebuilt once per step and shared by every
//! vehicle. With the `parallel` feature the update phase can run on the
//! rayon pool; each vehicle then buffers its reaction impulses and the
//! buffers are flushed in entry order afterwards.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{
    ChassisBody, ContactReaction, ReactionImpulse, SceneQuery, VehicleTuningContext, WheelPoseSink,
};
use crate::math::Vector3;
use crate::surface::{FrictionPairs, SurfaceTypeLookup};

use super::setup::Vehicle;
use super::stepper::UpdateContext;

/// Reaction impulses collected by one vehicle during a parallel update
pub type ReactionBuffer = Vec<ReactionImpulse>;

/// One vehicle with the chassis and pose sink it is stepped against
#[derive(Debug)]
pub struct VehicleEntry<'a, C, P> {
    pub vehicle: &'a mut Vehicle,
    pub chassis: &'a mut C,
    pub poses: &'a mut P,
}

impl<'a, C, P> VehicleEntry<'a, C, P> {
    pub fn new(vehicle: &'a mut Vehicle, chassis: &'a mut C, poses: &'a mut P) -> Self {
        Self { vehicle, chassis, poses }
    }
}

/// Per-step settings for [`update_vehicles`]
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub tuning: &'a VehicleTuningContext,
    pub friction_pairs: &'a FrictionPairs,
    pub gravity: Vector3,
    pub dt: f32,
}

/// Casts the suspension rays of every vehicle
pub fn suspension_raycasts<S, C, P>(scene: &S, entries: &mut [VehicleEntry<'_, C, P>])
where
    S: SceneQuery,
    C: ChassisBody,
{
    for entry in entries.iter_mut() {
        entry.vehicle.suspension_raycasts(scene, &*entry.chassis);
    }
}

/// Updates every vehicle in entry order
pub fn update_vehicles<C, P>(
    ctx: &StepContext<'_>,
    entries: &mut [VehicleEntry<'_, C, P>],
    reactions: &mut dyn ContactReaction,
) where
    C: ChassisBody,
    P: WheelPoseSink,
{
    let surfaces = SurfaceTypeLookup::new(ctx.friction_pairs);
    let update_ctx = UpdateContext::new(ctx.tuning, ctx.friction_pairs, &surfaces, ctx.gravity);

    for entry in entries.iter_mut() {
        entry.vehicle.update(ctx.dt, &update_ctx, &mut *entry.chassis, reactions, &mut *entry.poses);
    }
}

/// Updates every vehicle on the rayon pool
///
/// Reaction impulses reach `reactions` in entry order once all vehicles
/// are done, so the result matches [`update_vehicles`].
#[cfg(feature = "parallel")]
pub fn update_vehicles_parallel<C, P>(
    ctx: &StepContext<'_>,
    entries: &mut [VehicleEntry<'_, C, P>],
    reactions: &mut dyn ContactReaction,
) where
    C: ChassisBody + Send,
    P: WheelPoseSink + Send,
{
    let surfaces = SurfaceTypeLookup::new(ctx.friction_pairs);
    let update_ctx = UpdateContext::new(ctx.tuning, ctx.friction_pairs, &surfaces, ctx.gravity);

    let buffers: Vec<ReactionBuffer> = entries
        .par_iter_mut()
        .map(|entry| {
            let mut buffer = ReactionBuffer::new();
            entry.vehicle.update(ctx.dt, &update_ctx, &mut *entry.chassis, &mut buffer, &mut *entry.poses);
            buffer
        })
        .collect();

    for reaction in buffers.into_iter().flatten() {
        reactions.apply_impulse_at_point(reaction.actor, reaction.impulse, reaction.point);
    }
}
