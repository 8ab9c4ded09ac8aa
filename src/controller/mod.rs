//! # Controller Module
//!
//! Controller state handling:
//! - Button identities and their XInput bitmasks
//! - Stick normalization and per-cycle state snapshots
//! - The background polling loop with edge detection and event fan-out

pub mod poller;
pub mod state;

pub use poller::{ControllerEvent, DevicePoller, TriggerSide};
pub use state::{normalize_thumb, Button, ControllerState, StickVector};
