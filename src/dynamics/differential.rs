use crate::components::{Differential4WConfig, DifferentialType, TrackSide};
use crate::math::EPSILON;

/// Per-wheel drive torque fractions and engine speed contributions
///
/// `torque[i]` is the fraction of clutch torque routed to wheel `i`;
/// `speed[i]` weights wheel `i` in the gearbox-side speed the clutch
/// compares against the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiffRatios {
    pub torque: [f32; 4],
    pub speed: [f32; 4],
}

/// Splits torque between two wheels of a limited slip pair
///
/// Once the faster wheel spins more than `bias` times the slower one,
/// torque shifts toward the slower wheel. Returns fractions summing to 1.
pub fn split_torque(w1: f32, w2: f32, bias: f32, default_split: f32) -> (f32, f32) {
    let w1_abs = w1.abs();
    let w2_abs = w2.abs();
    let omega_max = w1_abs.max(w2_abs);
    let omega_min = w1_abs.min(w2_abs);

    let delta = omega_max - bias * omega_min;
    let delta_torque = if delta > 0.0 && omega_max > EPSILON {
        delta / omega_max
    } else {
        0.0
    };

    let (f1, f2) = if w1_abs >= w2_abs {
        (
            default_split * (1.0 - delta_torque),
            (1.0 - default_split) * (1.0 + delta_torque),
        )
    } else {
        (
            default_split * (1.0 + delta_torque),
            (1.0 - default_split) * (1.0 - delta_torque),
        )
    };

    let sum = f1 + f2;
    if sum > EPSILON {
        (f1 / sum, f2 / sum)
    } else {
        (default_split, 1.0 - default_split)
    }
}

/// Torque and speed ratios of a four-wheel differential
///
/// `omegas` are the wheel speeds in front-left, front-right, rear-left,
/// rear-right order. Speed contributions always follow the open split so
/// the engine sees a stable gearbox speed.
pub fn diff_ratios_4w(config: &Differential4WConfig, omegas: [f32; 4]) -> DiffRatios {
    let [fl, fr, rl, rr] = omegas;
    let front_rear = config.front_rear_split;
    let front_lr = config.front_left_right_split;
    let rear_lr = config.rear_left_right_split;

    let open_4wd = [
        front_rear * front_lr,
        front_rear * (1.0 - front_lr),
        (1.0 - front_rear) * rear_lr,
        (1.0 - front_rear) * (1.0 - rear_lr),
    ];
    let open_front = [front_lr, 1.0 - front_lr, 0.0, 0.0];
    let open_rear = [0.0, 0.0, rear_lr, 1.0 - rear_lr];

    match config.kind {
        DifferentialType::Open4WD => DiffRatios { torque: open_4wd, speed: open_4wd },
        DifferentialType::OpenFrontWD => DiffRatios { torque: open_front, speed: open_front },
        DifferentialType::OpenRearWD => DiffRatios { torque: open_rear, speed: open_rear },
        DifferentialType::LimitedSlip4WD => {
            let (tfl, tfr) = split_torque(fl, fr, config.front_bias, front_lr);
            let (trl, trr) = split_torque(rl, rr, config.rear_bias, rear_lr);
            let (front, rear) = split_torque(fl + fr, rl + rr, config.centre_bias, front_rear);
            DiffRatios {
                torque: [tfl * front, tfr * front, trl * rear, trr * rear],
                speed: open_4wd,
            }
        }
        DifferentialType::LimitedSlipFrontWD => {
            let (tfl, tfr) = split_torque(fl, fr, config.front_bias, front_lr);
            DiffRatios {
                torque: [tfl, tfr, 0.0, 0.0],
                speed: open_front,
            }
        }
        DifferentialType::LimitedSlipRearWD => {
            let (trl, trr) = split_torque(rl, rr, config.rear_bias, rear_lr);
            DiffRatios {
                torque: [0.0, 0.0, trl, trr],
                speed: open_rear,
            }
        }
    }
}

/// Signed torque fraction of every tank wheel
///
/// Each side receives its thrust over the summed thrust magnitudes,
/// shared equally between that side's wheels. Zero thrust on both sides
/// decouples the tracks from the engine.
pub fn tank_ratios(thrust_left: f32, thrust_right: f32, sides: &[TrackSide], out: &mut [f32]) {
    let sum = thrust_left.abs() + thrust_right.abs();
    let left_count = sides.iter().filter(|s| **s == TrackSide::Left).count().max(1) as f32;
    let right_count = sides.iter().filter(|s| **s == TrackSide::Right).count().max(1) as f32;

    for (side, ratio) in sides.iter().zip(out.iter_mut()) {
        *ratio = if sum > EPSILON {
            match side {
                TrackSide::Left => thrust_left / sum / left_count,
                TrackSide::Right => thrust_right / sum / right_count,
            }
        } else {
            0.0
        };
    }
}
