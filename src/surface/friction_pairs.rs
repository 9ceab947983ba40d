use super::{MaterialId, SurfaceType, TireType};
use crate::error::VehicleError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Friction multipliers for every (surface type, tire type) pair
///
/// The table also records which surface type each contact material maps
/// to. It is read-only while vehicles step and may be shared by all of
/// them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FrictionPairs {
    /// Material to surface type assignments
    materials: Vec<(MaterialId, SurfaceType)>,

    /// Number of surface types
    surface_count: u32,

    /// Number of tire types
    tire_count: u32,

    /// Row-major multipliers, indexed by surface then tire
    multipliers: Vec<f32>,
}

impl FrictionPairs {
    /// Creates a table with every multiplier set to 1
    pub fn new(surface_count: u32, tire_count: u32) -> Result<Self> {
        if surface_count == 0 || tire_count == 0 {
            return Err(VehicleError::InvalidFrictionTable(
                "at least one surface type and one tire type are required".into(),
            ));
        }
        Ok(Self {
            materials: Vec::new(),
            surface_count,
            tire_count,
            multipliers: vec![1.0; (surface_count * tire_count) as usize],
        })
    }

    /// Maps a contact material to a surface type
    pub fn set_material_surface(&mut self, material: MaterialId, surface: SurfaceType) -> Result<()> {
        if surface.0 >= self.surface_count {
            return Err(VehicleError::InvalidFrictionTable(format!(
                "surface type {} out of range (count {})",
                surface.0, self.surface_count
            )));
        }
        match self.materials.iter_mut().find(|(m, _)| *m == material) {
            Some(entry) => entry.1 = surface,
            None => self.materials.push((material, surface)),
        }
        Ok(())
    }

    /// Sets the multiplier for a surface and tire pair
    pub fn set_friction(&mut self, surface: SurfaceType, tire: TireType, friction: f32) -> Result<()> {
        if !(friction >= 0.0) {
            return Err(VehicleError::InvalidFrictionTable(format!(
                "friction must be non-negative, got {}",
                friction
            )));
        }
        let index = self.index(surface, tire).ok_or_else(|| {
            VehicleError::InvalidFrictionTable(format!(
                "pair ({}, {}) out of range",
                surface.0, tire.0
            ))
        })?;
        self.multipliers[index] = friction;
        Ok(())
    }

    /// Returns the multiplier for a pair, or 1 when either index is out of range
    #[inline]
    pub fn friction(&self, surface: SurfaceType, tire: TireType) -> f32 {
        self.index(surface, tire)
            .map(|i| self.multipliers[i])
            .unwrap_or(1.0)
    }

    /// Returns the material assignments
    pub fn materials(&self) -> &[(MaterialId, SurfaceType)] {
        &self.materials
    }

    /// Returns the number of surface types
    pub fn surface_count(&self) -> u32 {
        self.surface_count
    }

    /// Returns the number of tire types
    pub fn tire_count(&self) -> u32 {
        self.tire_count
    }

    #[inline]
    fn index(&self, surface: SurfaceType, tire: TireType) -> Option<usize> {
        (surface.0 < self.surface_count && tire.0 < self.tire_count)
            .then(|| (surface.0 * self.tire_count + tire.0) as usize)
    }
}

impl Default for FrictionPairs {
    /// One surface type, one tire type, multiplier 1
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            surface_count: 1,
            tire_count: 1,
            multipliers: vec![1.0],
        }
    }
}
