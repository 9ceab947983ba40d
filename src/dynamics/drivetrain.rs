//! Implicit engine and wheel speed solve.
//!
//! The clutch couples engine speed to the gearbox-side wheel speed
//! `G * Σ cⱼ ωⱼ`. Clutch torque, wheel damping and engine damping are all
//! evaluated at the end of the substep, which gives one small dense linear
//! system per substep:
//!
//! ```text
//! wheel i : ωᵢ'(1 + dt·dᵢ/Iᵢ) + dt/Iᵢ·K·G²·aᵢ·Σ cⱼωⱼ' − dt/Iᵢ·K·G·aᵢ·ωₑ' = ωᵢ + dt·Tᵢ/Iᵢ
//! engine  : ωₑ'(1 + dt·(K + dₑ)/Iₑ) − dt/Iₑ·K·G·Σ cⱼωⱼ'           = ωₑ + dt·τₑ/Iₑ
//! ```

use nalgebra::{DMatrix, DVector};

use crate::components::TrackSide;
use crate::math::linear::{solve_least_squares, solve_square};
use crate::math::sign;

/// One wheel as seen by the drivetrain solve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrivenWheel {
    /// Angular speed before the solve
    pub omega: f32,

    /// Reciprocal of the moment of inertia about the axle
    pub recip_moi: f32,

    /// Angular damping rate
    pub damping_rate: f32,

    /// External torque: brake plus tire reaction
    pub torque: f32,

    /// Fraction of clutch torque delivered to this wheel
    pub torque_ratio: f32,

    /// Weight of this wheel in the gearbox-side speed
    pub speed_ratio: f32,

    /// Magnitude of the brake torque acting on this wheel
    pub brake_torque: f32,
}

/// Engine state for the drivetrain solve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineInput {
    pub omega: f32,
    pub moi: f32,
    pub drive_torque: f32,
    pub damping_rate: f32,
    pub max_omega: f32,
}

/// Result of a coupled solve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrivetrainSolution {
    pub engine_omega: f32,
}

/// Solves a car drivetrain, writing new wheel speeds into `out`
///
/// `gear_ratio` already includes the final drive. The clutch is open while
/// the gear ratio is zero.
pub fn solve_coupled(
    wheels: &[DrivenWheel],
    engine: &EngineInput,
    gear_ratio: f32,
    clutch_strength: f32,
    dt: f32,
    out: &mut [f32],
) -> DrivetrainSolution {
    let n = wheels.len();
    let g = gear_ratio;
    let k = if g == 0.0 { 0.0 } else { clutch_strength };

    let mut a = DMatrix::<f32>::zeros(n + 1, n + 1);
    let mut b = DVector::<f32>::zeros(n + 1);

    for (i, wheel) in wheels.iter().enumerate() {
        let dt_over_i = dt * wheel.recip_moi;
        for (j, other) in wheels.iter().enumerate() {
            a[(i, j)] = dt_over_i * k * g * g * wheel.torque_ratio * other.speed_ratio;
        }
        a[(i, i)] += 1.0 + dt_over_i * wheel.damping_rate;
        a[(i, n)] = -dt_over_i * k * g * wheel.torque_ratio;
        b[i] = wheel.omega + dt_over_i * wheel.torque;
    }

    let dt_over_ie = dt / engine.moi;
    for (j, wheel) in wheels.iter().enumerate() {
        a[(n, j)] = -dt_over_ie * k * g * wheel.speed_ratio;
    }
    a[(n, n)] = 1.0 + dt_over_ie * (k + engine.damping_rate);
    b[n] = engine.omega + dt_over_ie * engine.drive_torque;

    let x = solve_square(&a, &b);

    for (i, wheel) in wheels.iter().enumerate() {
        out[i] = brake_sanity(wheel, x[i], dt);
    }
    DrivetrainSolution {
        engine_omega: x[n].clamp(0.0, engine.max_omega),
    }
}

/// Solves a tracked drivetrain, writing new wheel speeds into `out`
///
/// Every wheel keeps its own row but the unknowns are reduced to left
/// track speed, right track speed and engine speed, so the system is
/// over-determined and solved in the least-squares sense.
pub fn solve_tank(
    wheels: &[DrivenWheel],
    sides: &[TrackSide],
    engine: &EngineInput,
    gear_ratio: f32,
    clutch_strength: f32,
    dt: f32,
    out: &mut [f32],
) -> DrivetrainSolution {
    const LEFT: usize = 0;
    const RIGHT: usize = 1;
    const ENGINE: usize = 2;

    let n = wheels.len();
    let g = gear_ratio;
    let k = if g == 0.0 { 0.0 } else { clutch_strength };
    let column = |side: TrackSide| match side {
        TrackSide::Left => LEFT,
        TrackSide::Right => RIGHT,
    };

    // Summed speed contributions of each track
    let mut track_speed = [0.0f32; 2];
    for (wheel, side) in wheels.iter().zip(sides) {
        track_speed[column(*side)] += wheel.speed_ratio;
    }

    let mut a = DMatrix::<f32>::zeros(n + 1, 3);
    let mut b = DVector::<f32>::zeros(n + 1);

    for (i, (wheel, side)) in wheels.iter().zip(sides).enumerate() {
        let dt_over_i = dt * wheel.recip_moi;
        let coupling = dt_over_i * k * g * g * wheel.torque_ratio;
        a[(i, LEFT)] = coupling * track_speed[LEFT];
        a[(i, RIGHT)] = coupling * track_speed[RIGHT];
        a[(i, column(*side))] += 1.0 + dt_over_i * wheel.damping_rate;
        a[(i, ENGINE)] = -dt_over_i * k * g * wheel.torque_ratio;
        b[i] = wheel.omega + dt_over_i * wheel.torque;
    }

    let dt_over_ie = dt / engine.moi;
    a[(n, LEFT)] = -dt_over_ie * k * g * track_speed[LEFT];
    a[(n, RIGHT)] = -dt_over_ie * k * g * track_speed[RIGHT];
    a[(n, ENGINE)] = 1.0 + dt_over_ie * (k + engine.damping_rate);
    b[n] = engine.omega + dt_over_ie * engine.drive_torque;

    let x = solve_least_squares(&a, &b);

    for (i, (wheel, side)) in wheels.iter().zip(sides).enumerate() {
        out[i] = brake_sanity(wheel, x[column(*side)], dt);
    }
    DrivetrainSolution {
        engine_omega: x[ENGINE].clamp(0.0, engine.max_omega),
    }
}

/// Advances wheels that are not connected to an engine
pub fn solve_uncoupled(wheels: &[DrivenWheel], dt: f32, out: &mut [f32]) {
    for (wheel, omega) in wheels.iter().zip(out.iter_mut()) {
        let dt_over_i = dt * wheel.recip_moi;
        let raw = (wheel.omega + dt_over_i * wheel.torque) / (1.0 + dt_over_i * wheel.damping_rate);
        *omega = brake_sanity(wheel, raw, dt);
    }
}

/// Post-solve brake correction
///
/// A braked wheel whose speed changes sign is stopped. A wheel at rest gets
/// no brake torque in the solve, so here the brake holds it against up to
/// its full torque and only the excess turns the wheel.
#[inline]
fn brake_sanity(wheel: &DrivenWheel, solved: f32, dt: f32) -> f32 {
    if !(wheel.brake_torque > 0.0) {
        return solved;
    }
    if wheel.omega == 0.0 {
        let hold = wheel.brake_torque * dt * wheel.recip_moi;
        return sign(solved) * (solved.abs() - hold).max(0.0);
    }
    if wheel.omega * solved < 0.0 {
        0.0
    } else {
        solved
    }
}
