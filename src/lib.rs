//! # Gamepad Pointer Library
//!
//! Drive the desktop mouse pointer with a game controller.
//!
//! This library translates a controller's analog and digital inputs into
//! pointer motion and click events on a multi-monitor desktop:
//! - Background device polling with connection and button edge detection
//! - Dead-zone shaping and sensitivity scaling of stick input
//! - Multi-monitor topology tracking and virtual-desktop clamping

pub mod backend;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod pointer;
pub mod range;
