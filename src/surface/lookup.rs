use super::{FrictionPairs, MaterialId, SurfaceType};

#[derive(Debug, Clone, Copy)]
struct Slot {
    material: MaterialId,
    surface: SurfaceType,
}

/// Open-addressed map from contact material to surface type
///
/// Built from a [`FrictionPairs`] table once per physics step and shared
/// read-only by every vehicle in that step.
#[derive(Debug, Clone)]
pub struct SurfaceTypeLookup {
    slots: Vec<Option<Slot>>,
    mask: usize,
}

impl SurfaceTypeLookup {
    /// Builds the map with linear probing at a load factor of at most one half
    pub fn new(pairs: &FrictionPairs) -> Self {
        let capacity = (pairs.materials().len() * 2).max(8).next_power_of_two();
        let mut lookup = Self {
            slots: vec![None; capacity],
            mask: capacity - 1,
        };
        for &(material, surface) in pairs.materials() {
            lookup.insert(material, surface);
        }
        lookup
    }

    fn insert(&mut self, material: MaterialId, surface: SurfaceType) {
        let mut i = Self::hash(material) & self.mask;
        loop {
            match &mut self.slots[i] {
                Some(slot) if slot.material == material => {
                    slot.surface = surface;
                    return;
                }
                Some(_) => i = (i + 1) & self.mask,
                empty => {
                    *empty = Some(Slot { material, surface });
                    return;
                }
            }
        }
    }

    /// Returns the surface type of a material, or [`SurfaceType::DEFAULT`] if unknown
    pub fn surface_type(&self, material: MaterialId) -> SurfaceType {
        let mut i = Self::hash(material) & self.mask;
        for _ in 0..self.slots.len() {
            match self.slots[i] {
                Some(slot) if slot.material == material => return slot.surface,
                Some(_) => i = (i + 1) & self.mask,
                None => break,
            }
        }
        SurfaceType::DEFAULT
    }

    #[inline]
    fn hash(material: MaterialId) -> usize {
        // Fibonacci hashing spreads sequential ids
        (material.0.wrapping_mul(0x9E37_79B9) >> 7) as usize
    }
}
