//! # Controller State Module
//!
//! Normalized view of one raw controller sample.
//!
//! ## Buttons
//!
//! Nine digital buttons are tracked, identified by their XInput bitmask:
//!
//! | Button | Mask | Desktop role |
//! |--------|------|--------------|
//! | A | 0x1000 | Left click |
//! | B | 0x2000 | Right click |
//! | X | 0x4000 | Middle click |
//! | Y | 0x8000 | Unbound |
//! | Left shoulder | 0x0100 | Precision mode |
//! | Right shoulder | 0x0200 | Fast mode |
//! | Left stick click | 0x0040 | Left click |
//! | Start | 0x0010 | Pause combo |
//! | Back | 0x0020 | Pause combo |
//!
//! ## Stick normalization
//!
//! Raw stick axes are signed 16-bit with asymmetric extent: -32768 through
//! 32767. Each axis is normalized independently per sign so both extremes
//! land exactly on ±1.0: positive values divide by 32767, negative values by
//! 32768, and zero maps to zero exactly.

use crate::backend::RawSample;

/// Maximum positive raw stick axis value.
pub const MAX_THUMB_VALUE: i16 = 32767;
/// Minimum negative raw stick axis value.
pub const MIN_THUMB_VALUE: i16 = -32768;

/// Digital buttons tracked by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    LeftThumb,
    Start,
    Back,
}

impl Button {
    /// Every tracked button, in diff/emission order.
    pub const ALL: [Button; 9] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::LeftThumb,
        Button::Start,
        Button::Back,
    ];

    /// XInput `wButtons` bitmask for this button.
    #[must_use]
    pub fn mask(self) -> u16 {
        match self {
            Button::A => 0x1000,
            Button::B => 0x2000,
            Button::X => 0x4000,
            Button::Y => 0x8000,
            Button::LeftShoulder => 0x0100,
            Button::RightShoulder => 0x0200,
            Button::LeftThumb => 0x0040,
            Button::Start => 0x0010,
            Button::Back => 0x0020,
        }
    }

    /// Index into per-button state arrays, matching [`Button::ALL`] order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Button::A => 0,
            Button::B => 1,
            Button::X => 2,
            Button::Y => 3,
            Button::LeftShoulder => 4,
            Button::RightShoulder => 5,
            Button::LeftThumb => 6,
            Button::Start => 7,
            Button::Back => 8,
        }
    }
}

/// A normalized 2D stick reading, each axis in [-1.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickVector {
    pub x: f32,
    pub y: f32,
}

/// Normalizes a raw stick axis value to [-1.0, 1.0].
///
/// Scaling is asymmetric per sign of the raw value, so that both
/// representable extremes map exactly to ±1.0.
///
/// # Examples
///
/// ```
/// use gamepad_pointer::controller::normalize_thumb;
///
/// assert_eq!(normalize_thumb(0), 0.0);
/// assert_eq!(normalize_thumb(32767), 1.0);
/// assert_eq!(normalize_thumb(-32768), -1.0);
/// ```
#[must_use]
pub fn normalize_thumb(value: i16) -> f32 {
    if value == 0 {
        return 0.0;
    }
    if value > 0 {
        f32::from(value) / f32::from(MAX_THUMB_VALUE)
    } else {
        // -MIN_THUMB_VALUE overflows i16, so divide by its magnitude directly
        f32::from(value) / 32768.0
    }
}

/// Normalized controller state for one poll cycle.
///
/// Owned by the polling loop; every event carries a read-only copy of the
/// relevant fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    /// Whether the native query succeeded this cycle.
    pub connected: bool,
    /// Per-button pressed flags, indexed by [`Button::index`].
    pub buttons: [bool; Button::ALL.len()],
    /// Left trigger magnitude, raw byte.
    pub left_trigger: u8,
    /// Right trigger magnitude, raw byte.
    pub right_trigger: u8,
    /// Left stick, normalized.
    pub left_stick: StickVector,
    /// Right stick, normalized.
    pub right_stick: StickVector,
}

impl ControllerState {
    /// Derives a normalized state from a raw sample.
    ///
    /// `None` (device absent) yields the disconnected default state.
    #[must_use]
    pub fn from_sample(sample: Option<&RawSample>) -> Self {
        let Some(sample) = sample else {
            return Self::default();
        };

        let mut buttons = [false; Button::ALL.len()];
        for button in Button::ALL {
            buttons[button.index()] = sample.buttons & button.mask() != 0;
        }

        Self {
            connected: true,
            buttons,
            left_trigger: sample.left_trigger,
            right_trigger: sample.right_trigger,
            left_stick: StickVector {
                x: normalize_thumb(sample.thumb_lx),
                y: normalize_thumb(sample.thumb_ly),
            },
            right_stick: StickVector {
                x: normalize_thumb(sample.thumb_rx),
                y: normalize_thumb(sample.thumb_ry),
            },
        }
    }

    /// Whether the given button is pressed in this state.
    #[must_use]
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons[button.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Normalization Tests ====================

    #[test]
    fn test_normalize_zero_is_exact() {
        assert_eq!(normalize_thumb(0), 0.0);
    }

    #[test]
    fn test_normalize_positive_extreme() {
        assert!((normalize_thumb(MAX_THUMB_VALUE) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_negative_extreme() {
        assert!((normalize_thumb(MIN_THUMB_VALUE) + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_asymmetric_divisors() {
        // Same magnitude, different divisors per sign
        let pos = normalize_thumb(16384);
        let neg = normalize_thumb(-16384);
        assert!((pos - 16384.0 / 32767.0).abs() < 1e-6);
        assert!((neg + 16384.0 / 32768.0).abs() < 1e-6);
        assert!(pos.abs() > neg.abs());
    }

    #[test]
    fn test_normalize_stays_in_unit_interval() {
        for raw in [i16::MIN, -1, 0, 1, 1000, -1000, i16::MAX] {
            let n = normalize_thumb(raw);
            assert!((-1.0..=1.0).contains(&n), "normalize({raw}) = {n}");
        }
    }

    // ==================== Button Mask Tests ====================

    #[test]
    fn test_button_masks_match_xinput() {
        assert_eq!(Button::A.mask(), 0x1000);
        assert_eq!(Button::B.mask(), 0x2000);
        assert_eq!(Button::X.mask(), 0x4000);
        assert_eq!(Button::Y.mask(), 0x8000);
        assert_eq!(Button::LeftShoulder.mask(), 0x0100);
        assert_eq!(Button::RightShoulder.mask(), 0x0200);
        assert_eq!(Button::LeftThumb.mask(), 0x0040);
        assert_eq!(Button::Start.mask(), 0x0010);
        assert_eq!(Button::Back.mask(), 0x0020);
    }

    #[test]
    fn test_button_indices_match_all_order() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }

    #[test]
    fn test_button_masks_are_distinct() {
        for a in Button::ALL {
            for b in Button::ALL {
                if a != b {
                    assert_eq!(a.mask() & b.mask(), 0);
                }
            }
        }
    }

    // ==================== State Derivation Tests ====================

    #[test]
    fn test_state_from_none_is_disconnected() {
        let state = ControllerState::from_sample(None);
        assert!(!state.connected);
        assert_eq!(state, ControllerState::default());
    }

    #[test]
    fn test_state_from_sample_buttons() {
        let sample = RawSample {
            buttons: Button::A.mask() | Button::Back.mask(),
            ..RawSample::default()
        };
        let state = ControllerState::from_sample(Some(&sample));
        assert!(state.connected);
        assert!(state.pressed(Button::A));
        assert!(state.pressed(Button::Back));
        assert!(!state.pressed(Button::B));
        assert!(!state.pressed(Button::Start));
    }

    #[test]
    fn test_state_from_sample_sticks_and_triggers() {
        let sample = RawSample {
            left_trigger: 200,
            right_trigger: 35,
            thumb_lx: MAX_THUMB_VALUE,
            thumb_ly: MIN_THUMB_VALUE,
            thumb_rx: 0,
            thumb_ry: 16384,
            ..RawSample::default()
        };
        let state = ControllerState::from_sample(Some(&sample));
        assert_eq!(state.left_trigger, 200);
        assert_eq!(state.right_trigger, 35);
        assert_eq!(state.left_stick.x, 1.0);
        assert_eq!(state.left_stick.y, -1.0);
        assert_eq!(state.right_stick.x, 0.0);
        assert!(state.right_stick.y > 0.0);
    }
}
