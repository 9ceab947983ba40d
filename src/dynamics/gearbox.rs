use crate::components::{AutoboxConfig, Gear, GearboxConfig};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Gear ratio and throttle the rest of the substep should use
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GearboxOutput {
    /// Current gear ratio times the final drive; zero in neutral
    pub gear_ratio: f32,

    /// Throttle after any autobox suppression
    pub accel: f32,
}

/// Gear change state machine with an optional autobox
///
/// Every change passes through neutral: starting a shift sets the current
/// gear to neutral and the target gear to the requested one, and the
/// current gear only snaps to the target once the switch timer exceeds the
/// gearbox switch time. Requests made mid-shift are dropped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GearboxState {
    current: Gear,
    target: Gear,
    switch_elapsed: f32,
    autobox_elapsed: f32,
    gear_up_requested: bool,
    gear_down_requested: bool,
    use_autobox: bool,
    autobox_shift: bool,
}

impl Default for GearboxState {
    fn default() -> Self {
        Self::new()
    }
}

impl GearboxState {
    /// Neutral, at rest, autobox off
    pub fn new() -> Self {
        Self {
            current: Gear::Neutral,
            target: Gear::Neutral,
            switch_elapsed: 0.0,
            autobox_elapsed: 0.0,
            gear_up_requested: false,
            gear_down_requested: false,
            use_autobox: false,
            autobox_shift: false,
        }
    }

    /// Gear currently engaged (neutral while shifting)
    #[inline]
    pub fn current_gear(&self) -> Gear {
        self.current
    }

    /// Gear being shifted into
    #[inline]
    pub fn target_gear(&self) -> Gear {
        self.target
    }

    /// True while a shift is under way
    #[inline]
    pub fn is_shifting(&self) -> bool {
        self.current != self.target
    }

    /// Time since the current shift started (s)
    #[inline]
    pub fn switch_elapsed(&self) -> f32 {
        self.switch_elapsed
    }

    /// Time since the last autobox shift (s)
    #[inline]
    pub fn autobox_elapsed(&self) -> f32 {
        self.autobox_elapsed
    }

    /// Returns true if the autobox is enabled
    #[inline]
    pub fn use_autobox(&self) -> bool {
        self.use_autobox
    }

    /// Enables or disables the autobox
    pub fn set_use_autobox(&mut self, enabled: bool) {
        self.use_autobox = enabled;
    }

    /// Requests one gear up; ignored if a shift is already under way
    pub fn request_gear_up(&mut self) {
        self.gear_up_requested = true;
    }

    /// Requests one gear down; ignored if a shift is already under way
    pub fn request_gear_down(&mut self) {
        self.gear_down_requested = true;
    }

    /// Engages a gear immediately, cancelling any shift
    pub fn force_gear(&mut self, gear: Gear) {
        self.current = gear;
        self.target = gear;
        self.switch_elapsed = 0.0;
        self.autobox_shift = false;
        self.gear_up_requested = false;
        self.gear_down_requested = false;
    }

    /// Returns to neutral and clears every timer, keeping the autobox setting
    pub fn reset(&mut self) {
        let use_autobox = self.use_autobox;
        *self = Self::new();
        self.use_autobox = use_autobox;
    }

    /// Advances the state machine by one substep
    ///
    /// `normalized_engine_omega` is engine speed divided by its maximum.
    pub fn update(
        &mut self,
        dt: f32,
        gears: &GearboxConfig,
        autobox: Option<&AutoboxConfig>,
        normalized_engine_omega: f32,
        accel: f32,
    ) -> GearboxOutput {
        let mut accel = accel;

        if let (true, Some(autobox)) = (self.use_autobox, autobox) {
            // No throttle while an automatic shift passes through neutral
            if self.is_shifting() && self.current == Gear::Neutral && self.autobox_shift {
                accel = 0.0;
            }
            self.process_autobox(dt, gears, autobox, normalized_engine_omega, accel);
        }

        self.process_gears(dt, gears);

        GearboxOutput {
            gear_ratio: gears.ratio(self.current) * gears.final_ratio,
            accel,
        }
    }

    fn process_autobox(
        &mut self,
        dt: f32,
        gears: &GearboxConfig,
        autobox: &AutoboxConfig,
        normalized_engine_omega: f32,
        accel: f32,
    ) {
        // Throttle in neutral engages first gear without waiting out the latency
        if !self.is_shifting() && self.current == Gear::Neutral && accel > 0.0 {
            log::debug!("autobox: engaging {} from neutral", Gear::FIRST);
            self.gear_up_requested = true;
            self.autobox_shift = true;
            self.autobox_elapsed = 0.0;
            return;
        }
        if self.is_shifting() || self.autobox_elapsed <= autobox.latency {
            self.autobox_elapsed += dt;
            return;
        }
        if !self.current.is_forward() {
            return;
        }

        let up = autobox.up_ratio(self.current).unwrap_or(f32::MAX);
        let down = autobox.down_ratio(self.current).unwrap_or(0.0);

        if self.current != gears.top_gear() && normalized_engine_omega > up {
            log::debug!("autobox: shift up from {} at {:.2}", self.current, normalized_engine_omega);
            self.gear_up_requested = true;
            self.autobox_shift = true;
            self.autobox_elapsed = 0.0;
        } else if self.current != Gear::FIRST && normalized_engine_omega < down {
            log::debug!("autobox: shift down from {} at {:.2}", self.current, normalized_engine_omega);
            self.gear_down_requested = true;
            self.autobox_shift = true;
            self.autobox_elapsed = 0.0;
        }
    }

    fn process_gears(&mut self, dt: f32, gears: &GearboxConfig) {
        let up = std::mem::take(&mut self.gear_up_requested);
        let down = std::mem::take(&mut self.gear_down_requested);

        if self.is_shifting() {
            if self.switch_elapsed > gears.switch_time {
                self.current = self.target;
                self.switch_elapsed = 0.0;
                self.autobox_shift = false;
                log::debug!("gear change complete: {}", self.current);
            } else {
                self.switch_elapsed += dt;
            }
            return;
        }

        // Both pressed cancels out
        let next = match (up, down) {
            (true, false) => gears.next_up(self.current),
            (false, true) => gears.next_down(self.current),
            _ => None,
        };
        if let Some(next) = next {
            self.target = next;
            self.current = Gear::Neutral;
            self.switch_elapsed = 0.0;
        }
    }
}
