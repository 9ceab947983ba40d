use nalgebra::{DMatrix, DVector};

use crate::error::VehicleError;
use crate::math::linear::solve_square;
use crate::math::{Vector3, EPSILON};
use crate::Result;

/// Splits a chassis mass between its springs so the vehicle sits level
///
/// `offsets` are the spring positions relative to the centre of mass and
/// `up`/`forward` the chassis basis. Masses balance total weight and both
/// tipping moments about the centre of mass. With more than three wheels
/// the system is under-determined and the least-norm solution is taken,
/// which spreads mass evenly across symmetric layouts.
pub fn compute_sprung_masses(
    offsets: &[Vector3],
    total_mass: f32,
    up: &Vector3,
    forward: &Vector3,
) -> Result<Vec<f32>> {
    if !(total_mass > 0.0) {
        return Err(VehicleError::InvalidParameter("total mass must be positive".to_string()));
    }

    let lateral = up.cross(forward);
    let planar: Vec<(f32, f32)> = offsets
        .iter()
        .map(|p| (p.dot(&lateral), p.dot(forward)))
        .collect();

    let masses = match planar.len() {
        0 => return Err(VehicleError::InvalidParameter("no wheels".to_string())),
        1 => vec![total_mass],
        2 => {
            // Position of the centre of mass along the line joining both springs
            let (x0, z0) = planar[0];
            let (x1, z1) = planar[1];
            let (dx, dz) = (x1 - x0, z1 - z0);
            let length_sq = dx * dx + dz * dz;
            let t = if length_sq > EPSILON {
                -(x0 * dx + z0 * dz) / length_sq
            } else {
                0.5
            };
            vec![total_mass * (1.0 - t), total_mass * t]
        }
        n => {
            let mut a = DMatrix::<f32>::zeros(3, n);
            for (i, &(x, z)) in planar.iter().enumerate() {
                a[(0, i)] = 1.0;
                a[(1, i)] = x;
                a[(2, i)] = z;
            }
            let b = DVector::from_vec(vec![total_mass, 0.0, 0.0]);
            let y = solve_square(&(&a * a.transpose()), &b);
            (a.transpose() * y).iter().copied().collect()
        }
    };

    if masses.iter().any(|m| !(*m > 0.0) || !m.is_finite()) {
        return Err(VehicleError::InvalidParameter(
            "centre of mass must lie inside the wheel base".to_string(),
        ));
    }
    Ok(masses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_wheels_lever_rule() {
        let up = Vector3::y();
        let forward = Vector3::z();
        let offsets = [Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, -3.0)];
        let masses = compute_sprung_masses(&offsets, 100.0, &up, &forward).unwrap();
        assert!((masses[0] - 75.0).abs() < 1e-3);
        assert!((masses[1] - 25.0).abs() < 1e-3);
    }
}
