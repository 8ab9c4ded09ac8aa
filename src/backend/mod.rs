//! # Backend Module
//!
//! The platform boundary, abstracted behind traits so the core never depends
//! on a concrete OS API.
//!
//! Three seams:
//!
//! - [`DeviceBackend`]: raw controller state queries and vibration.
//! - [`PointerBackend`]: cursor position get/set and low-level input
//!   injection (clicks, wheel).
//! - [`DisplayBackend`]: one-shot monitor enumeration.
//!
//! Production code uses the platform implementation (currently
//! [`windows`] over XInput/Win32); tests use the recording mocks in
//! [`mocks`].

use std::io;

use crate::display::Display;

#[cfg(windows)]
pub mod windows;

/// One raw controller sample, as returned by the native state query.
///
/// Stick axes are signed 16-bit with asymmetric extent
/// (-32768..32767); triggers are raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    /// Packet sequence number; increments when the device state changes.
    pub packet: u32,
    /// Button bitmask (XInput layout).
    pub buttons: u16,
    /// Left trigger magnitude (0-255).
    pub left_trigger: u8,
    /// Right trigger magnitude (0-255).
    pub right_trigger: u8,
    /// Left stick X axis.
    pub thumb_lx: i16,
    /// Left stick Y axis.
    pub thumb_ly: i16,
    /// Right stick X axis.
    pub thumb_rx: i16,
    /// Right stick Y axis.
    pub thumb_ry: i16,
}

/// A low-level pointer event submitted to the OS input-injection facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    MiddleDown,
    MiddleUp,
    /// Vertical wheel motion; positive scrolls up, in 0..120 tick units.
    Wheel(i32),
}

/// Trait for querying controller hardware.
pub trait DeviceBackend: Send + Sync {
    /// Reads the current state of the controller in the given slot.
    ///
    /// Returns `None` when no device is connected there; the poller turns
    /// that into a connection-changed edge rather than an error.
    fn query(&self, index: u32) -> Option<RawSample>;

    /// Sets the rumble motor speeds. Fire-and-forget.
    fn set_vibration(&self, index: u32, left_motor: u16, right_motor: u16) -> io::Result<()>;
}

/// Trait for cursor state and input injection.
pub trait PointerBackend: Send + Sync {
    /// Current absolute cursor position in virtual-desktop coordinates.
    fn cursor_position(&self) -> io::Result<(i32, i32)>;

    /// Moves the cursor to an absolute position.
    fn set_cursor_position(&self, x: i32, y: i32) -> io::Result<()>;

    /// Synthesizes one pointer event (button edge or wheel motion).
    fn inject(&self, action: PointerAction) -> io::Result<()>;
}

/// Trait for enumerating the monitor layout.
pub trait DisplayBackend {
    /// Lists all displays with their virtual-desktop bounds.
    fn enumerate(&self) -> io::Result<Vec<Display>>;
}
