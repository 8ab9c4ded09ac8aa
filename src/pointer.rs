//! # Pointer Translation Module
//!
//! Turns normalized stick vectors into absolute cursor motion, and exposes
//! the click/scroll pass-throughs.
//!
//! ## Dead zone
//!
//! The dead zone is a hard cutoff on the vector magnitude, not a per-axis
//! check and not a smooth curve: below the threshold the whole move is
//! suppressed. Above it the vector is rescaled by
//! `(magnitude - dead_zone) / (1 - dead_zone)` along its original direction,
//! which removes the dead-zone gap while keeping the output magnitude in
//! `[0, 1]`.
//!
//! ## Motion
//!
//! The shaped vector is scaled by sensitivity times the transient sensitivity
//! factor, rounded to integer deltas, and added to the current cursor
//! position (Y inverted, so pushing the stick up moves the cursor up). The
//! candidate position is clamped by the display topology before the OS
//! cursor-set call. A failed cursor-set is dropped: polling recurs at
//! ~100 Hz, so a missed frame self-corrects on the next cycle.

use std::sync::Arc;

use tracing::debug;

use crate::backend::{PointerAction, PointerBackend};
use crate::display::{DisplayTopology, Point};

/// Mouse buttons the translator can press and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Sensitivity and dead-zone settings for pointer motion.
///
/// All setters clamp: sensitivity to `[1.0, 30.0]`, dead zone to
/// `[0.0, 0.5]`, and the transient factor to `[0.0, 5.0]`.
#[derive(Debug, Clone, Copy)]
pub struct SensitivityConfig {
    sensitivity: f32,
    dead_zone: f32,
    factor: f32,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            sensitivity: 10.0,
            dead_zone: 0.1,
            factor: 1.0,
        }
    }
}

impl SensitivityConfig {
    /// Creates a config from persisted preference values, clamping both.
    #[must_use]
    pub fn new(sensitivity: f32, dead_zone: f32) -> Self {
        let mut config = Self::default();
        config.set_sensitivity(sensitivity);
        config.set_dead_zone(dead_zone);
        config
    }

    #[must_use]
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    #[must_use]
    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    #[must_use]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Sets the base sensitivity multiplier, clamped to `[1.0, 30.0]`.
    pub fn set_sensitivity(&mut self, value: f32) {
        self.sensitivity = value.clamp(1.0, 30.0);
    }

    /// Sets the dead-zone radius, clamped to `[0.0, 0.5]`.
    pub fn set_dead_zone(&mut self, value: f32) {
        self.dead_zone = value.clamp(0.0, 0.5);
    }

    /// Sets the transient sensitivity factor, clamped to `[0.0, 5.0]`.
    ///
    /// Applied on top of base sensitivity while a modifier button is held.
    pub fn set_factor(&mut self, value: f32) {
        self.factor = value.clamp(0.0, 5.0);
    }
}

/// Translates stick vectors into cursor motion and forwards clicks.
pub struct PointerTranslator {
    config: SensitivityConfig,
    topology: Arc<DisplayTopology>,
    backend: Arc<dyn PointerBackend>,
}

impl PointerTranslator {
    /// Creates a translator over the given topology and pointer backend.
    #[must_use]
    pub fn new(
        config: SensitivityConfig,
        topology: Arc<DisplayTopology>,
        backend: Arc<dyn PointerBackend>,
    ) -> Self {
        Self {
            config,
            topology,
            backend,
        }
    }

    /// Current sensitivity settings.
    #[must_use]
    pub fn config(&self) -> &SensitivityConfig {
        &self.config
    }

    /// Mutable access for UI/host adjustments.
    pub fn config_mut(&mut self) -> &mut SensitivityConfig {
        &mut self.config
    }

    /// Moves the cursor according to a normalized stick vector.
    ///
    /// Sub-dead-zone motion is fully suppressed. Otherwise the cursor is
    /// displaced by the shaped vector scaled by sensitivity and the transient
    /// factor, with Y inverted, clamped into the virtual desktop. Side effect
    /// only; cursor-set failures are logged at debug and dropped.
    pub fn move_cursor(&self, x_delta: f32, y_delta: f32) {
        let magnitude = (x_delta * x_delta + y_delta * y_delta).sqrt();
        if magnitude < self.config.dead_zone {
            return;
        }

        // Remove the dead-zone gap, preserving direction
        let scale = (magnitude - self.config.dead_zone) / (1.0 - self.config.dead_zone);
        let x_delta = x_delta / magnitude * scale;
        let y_delta = y_delta / magnitude * scale;

        let (cur_x, cur_y) = match self.backend.cursor_position() {
            Ok(pos) => pos,
            Err(e) => {
                debug!("cursor position query failed: {e}");
                return;
            }
        };

        let gain = self.config.sensitivity * self.config.factor;
        let desired = Point::new(
            cur_x + (x_delta * gain).round() as i32,
            // Stick up means cursor up on screen
            cur_y - (y_delta * gain).round() as i32,
        );

        let adjusted = self.topology.adjust_position(desired);
        if let Err(e) = self.backend.set_cursor_position(adjusted.x, adjusted.y) {
            debug!("cursor set failed: {e}");
        }
    }

    /// Presses a mouse button. Stateless pass-through to input injection.
    pub fn press(&self, button: MouseButton) {
        self.inject(match button {
            MouseButton::Left => PointerAction::LeftDown,
            MouseButton::Right => PointerAction::RightDown,
            MouseButton::Middle => PointerAction::MiddleDown,
        });
    }

    /// Releases a mouse button.
    pub fn release(&self, button: MouseButton) {
        self.inject(match button {
            MouseButton::Left => PointerAction::LeftUp,
            MouseButton::Right => PointerAction::RightUp,
            MouseButton::Middle => PointerAction::MiddleUp,
        });
    }

    /// Scrolls the wheel; positive delta scrolls up.
    pub fn scroll(&self, delta: i32) {
        self.inject(PointerAction::Wheel(delta));
    }

    fn inject(&self, action: PointerAction) {
        if let Err(e) = self.backend.inject(action) {
            debug!("input injection failed: {e}");
        }
    }
}
