use crate::components::{AckermannGeometry, WheelConfig};
use crate::core::WheelIndex;

/// Steer angles of the two wheels on one axle (rad)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxleSteer {
    pub left: f32,
    pub right: f32,
}

/// Ackermann-corrected steer angles for one axle
///
/// `steer` is the normalized command in [-1, 1], positive turning left, and
/// `steer_gain` the maximum steer angle. The inner wheel takes the full
/// angle; the outer wheel is blended toward the perfect Ackermann angle by
/// `accuracy`. A zero command returns zero without touching any trig.
pub fn ackermann_steer_angles(
    steer: f32,
    steer_gain: f32,
    accuracy: f32,
    width: f32,
    axle_separation: f32,
) -> AxleSteer {
    let steer_angle = steer * steer_gain;
    if steer_angle == 0.0 {
        return AxleSteer::default();
    }

    let inner = steer_angle.abs();
    let outer = (axle_separation / (width + axle_separation / inner.tan())).atan();
    let corrected = inner + accuracy * (outer - inner);

    if steer_angle > 0.0 {
        AxleSteer { left: inner, right: corrected }
    } else {
        AxleSteer { left: -corrected, right: -inner }
    }
}

/// Steer angles for a four-wheel layout plus any extra wheels
///
/// Front and rear axles are corrected independently using each axle's
/// left wheel max steer as the gain. Wheels past the first four steer by
/// their own max steer with no correction. Every wheel adds its toe.
pub fn steer_angles_4w(
    steer: f32,
    wheels: &[WheelConfig],
    geometry: &AckermannGeometry,
    out: &mut [f32],
) {
    let steer = steer.clamp(-1.0, 1.0);
    let front = axle(steer, wheels, WheelIndex::FRONT_LEFT, geometry.front_width, geometry);
    let rear = axle(steer, wheels, WheelIndex::REAR_LEFT, geometry.rear_width, geometry);
    let axle_angles = [front.left, front.right, rear.left, rear.right];

    for (i, (wheel, angle)) in wheels.iter().zip(out.iter_mut()).enumerate() {
        let base = match axle_angles.get(i) {
            Some(a) => *a,
            None => steer * wheel.max_steer,
        };
        *angle = base + wheel.toe_angle;
    }
}

fn axle(
    steer: f32,
    wheels: &[WheelConfig],
    left: WheelIndex,
    width: f32,
    geometry: &AckermannGeometry,
) -> AxleSteer {
    let gain = wheels.get(left.get()).map_or(0.0, |w| w.max_steer);
    ackermann_steer_angles(steer, gain, geometry.accuracy, width, geometry.axle_separation)
}

/// Toe-only steer angles, used by tracked vehicles
pub fn toe_angles(wheels: &[WheelConfig], out: &mut [f32]) {
    for (wheel, angle) in wheels.iter().zip(out.iter_mut()) {
        *angle = wheel.toe_angle;
    }
}
