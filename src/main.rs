//! # Gamepad Pointer
//!
//! Drive the desktop mouse pointer with a game controller.
//!
//! The binary owns the wiring between the polling loop and the pointer
//! translator:
//!
//! - Left stick moves the cursor (dead zone and sensitivity applied)
//! - A and left-stick click are the left button, B the right, X the middle
//! - Triggers scroll the wheel: left up, right down, speed from pull depth
//! - Left shoulder held slows the cursor (precision), right shoulder held
//!   speeds it up
//! - Back + Start together toggles pause; resuming fires a rumble pulse
//!
//! Settings load from `settings.toml` under the user config directory and
//! are written back on exit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use gamepad_pointer::config::Config;
use gamepad_pointer::controller::{Button, ControllerEvent, DevicePoller, TriggerSide};
use gamepad_pointer::display::DisplayTopology;
use gamepad_pointer::pointer::{MouseButton, PointerTranslator, SensitivityConfig};
use gamepad_pointer::range::map_range_clamped;

/// Rumble pulse fired on connect and on resume.
const PULSE_STRENGTH: u16 = 30000;
const PULSE_DURATION: Duration = Duration::from_millis(200);

/// Maps a trigger pull to a wheel delta, or `None` below the threshold.
///
/// Magnitude above the threshold rescales from `[threshold, 255]` into
/// `[0, scroll_max]` wheel units.
fn trigger_scroll(magnitude: u8, threshold: u8, scroll_max: f32) -> Option<i32> {
    if magnitude <= threshold {
        return None;
    }
    let amount = map_range_clamped(
        f32::from(magnitude - threshold),
        f32::from(threshold),
        255.0,
        0.0,
        scroll_max,
    );
    Some(amount as i32)
}

/// Latches Back and Start; both held together fires the pause toggle once.
#[derive(Debug, Default)]
struct PauseCombo {
    back_held: bool,
    start_held: bool,
}

impl PauseCombo {
    /// Feeds one button edge; returns true when the combo triggers.
    ///
    /// Both latches reset on trigger, so the combo re-arms only after a
    /// fresh press of each button.
    fn update(&mut self, button: Button, pressed: bool) -> bool {
        match button {
            Button::Back => self.back_held = pressed,
            Button::Start => self.start_held = pressed,
            _ => return false,
        }
        if self.back_held && self.start_held {
            self.back_held = false;
            self.start_held = false;
            true
        } else {
            false
        }
    }
}

/// Event-loop state and bindings.
struct Host {
    translator: PointerTranslator,
    paused: bool,
    combo: PauseCombo,
    trigger_threshold: u8,
    scroll_max: f32,
    precision_factor: f32,
    fast_factor: f32,
}

impl Host {
    fn new(translator: PointerTranslator, config: &Config) -> Self {
        Self {
            translator,
            paused: false,
            combo: PauseCombo::default(),
            trigger_threshold: config.controller.trigger_threshold,
            scroll_max: config.controller.scroll_max,
            precision_factor: config.controller.precision_factor,
            fast_factor: config.controller.fast_factor,
        }
    }

    fn handle(&mut self, event: ControllerEvent, poller: &DevicePoller) {
        match event {
            ControllerEvent::ConnectionChanged(connected) => {
                if connected {
                    info!("controller connected");
                    poller.pulse_vibration(PULSE_STRENGTH, PULSE_STRENGTH, PULSE_DURATION);
                } else {
                    info!("controller disconnected");
                }
            }

            ControllerEvent::StickMoved { x, y } => {
                if !self.paused {
                    self.translator.move_cursor(x, y);
                }
            }

            ControllerEvent::TriggerChanged { side, magnitude } => {
                if self.paused {
                    return;
                }
                if let Some(amount) =
                    trigger_scroll(magnitude, self.trigger_threshold, self.scroll_max)
                {
                    let amount = match side {
                        TriggerSide::Left => amount,
                        TriggerSide::Right => -amount,
                    };
                    self.translator.scroll(amount);
                }
            }

            ControllerEvent::ButtonChanged { button, pressed } => {
                self.handle_button(button, pressed, poller);
            }
        }
    }

    fn handle_button(&mut self, button: Button, pressed: bool, poller: &DevicePoller) {
        match button {
            // Click bindings, suppressed while paused
            Button::A | Button::LeftThumb => self.click(MouseButton::Left, pressed),
            Button::B => self.click(MouseButton::Right, pressed),
            Button::X => self.click(MouseButton::Middle, pressed),

            // Speed modifiers apply even while paused, like any preference
            Button::LeftShoulder => {
                let factor = if pressed { self.precision_factor } else { 1.0 };
                self.translator.config_mut().set_factor(factor);
            }
            Button::RightShoulder => {
                let factor = if pressed { self.fast_factor } else { 1.0 };
                self.translator.config_mut().set_factor(factor);
            }

            Button::Back | Button::Start => {
                if self.combo.update(button, pressed) {
                    self.paused = !self.paused;
                    info!(paused = self.paused, "pause toggled");
                    if !self.paused {
                        poller.pulse_vibration(PULSE_STRENGTH, PULSE_STRENGTH, PULSE_DURATION);
                    }
                }
            }

            Button::Y => {}
        }
    }

    fn click(&self, mouse: MouseButton, pressed: bool) {
        if self.paused {
            return;
        }
        if pressed {
            self.translator.press(mouse);
        } else {
            self.translator.release(mouse);
        }
    }
}

#[cfg(windows)]
fn build_backends() -> Result<(
    Arc<dyn gamepad_pointer::backend::DeviceBackend>,
    Arc<dyn gamepad_pointer::backend::PointerBackend>,
    Vec<gamepad_pointer::display::Display>,
)> {
    use gamepad_pointer::backend::windows::{Win32Displays, Win32Pointer, XInputDevice};
    use gamepad_pointer::backend::DisplayBackend;

    let displays = Win32Displays.enumerate()?;
    Ok((Arc::new(XInputDevice), Arc::new(Win32Pointer), displays))
}

#[cfg(not(windows))]
fn build_backends() -> Result<(
    Arc<dyn gamepad_pointer::backend::DeviceBackend>,
    Arc<dyn gamepad_pointer::backend::PointerBackend>,
    Vec<gamepad_pointer::display::Display>,
)> {
    anyhow::bail!("no platform backend available for this operating system")
}

/// Main entry point for gamepad-pointer.
///
/// Initializes logging, loads settings, enumerates displays, starts the
/// controller polling loop, and runs the event loop until Ctrl+C.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("gamepad-pointer v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = Config::default_path();
    let config = Config::load_or_default(&config_path);

    let (device, pointer, displays) = build_backends()?;

    let topology = Arc::new(DisplayTopology::new(displays));
    for disp in topology.displays() {
        info!(
            "display {}: {}x{} at ({}, {}){}",
            disp.name,
            disp.bounds.width,
            disp.bounds.height,
            disp.bounds.left,
            disp.bounds.top,
            if disp.is_primary { " primary" } else { "" },
        );
    }

    let translator = PointerTranslator::new(
        SensitivityConfig::new(config.pointer.sensitivity, config.pointer.dead_zone),
        Arc::clone(&topology),
        pointer,
    );
    let mut host = Host::new(translator, &config);

    let mut poller = DevicePoller::new(device, config.controller.index);
    let mut events = poller.subscribe();
    let mut display_changes = topology.subscribe_current();
    poller.start();

    info!("polling controller slot {}", config.controller.index);
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => host.handle(event, &poller),
                Err(RecvError::Lagged(n)) => warn!("event loop lagged, dropped {n} events"),
                Err(RecvError::Closed) => break,
            },

            _ = display_changes.changed() => {
                info!("active display: {}", display_changes.borrow_and_update().name);
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    poller.stop().await;

    // Persist the numeric preferences
    let mut config = config;
    config.pointer.sensitivity = host.translator.config().sensitivity();
    config.pointer.dead_zone = host.translator.config().dead_zone();
    if let Err(e) = config.save(&config_path) {
        warn!("could not save settings to {}: {e}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Trigger Scroll Tests ====================

    #[test]
    fn test_trigger_scroll_below_threshold() {
        assert_eq!(trigger_scroll(0, 20, 80.0), None);
        assert_eq!(trigger_scroll(20, 20, 80.0), None);
    }

    #[test]
    fn test_trigger_scroll_just_above_threshold() {
        // Barely over: maps below the source interval and clamps to zero
        assert_eq!(trigger_scroll(21, 20, 80.0), Some(0));
    }

    #[test]
    fn test_trigger_scroll_full_pull() {
        // (255 - 20) mapped from [20, 255] into [0, 80] ~= 73
        assert_eq!(trigger_scroll(255, 20, 80.0), Some(73));
    }

    #[test]
    fn test_trigger_scroll_monotonic() {
        let mut last = -1;
        for magnitude in 21..=255u8 {
            let amount = trigger_scroll(magnitude, 20, 80.0).unwrap();
            assert!(amount >= last);
            last = amount;
        }
    }

    // ==================== Pause Combo Tests ====================

    #[test]
    fn test_combo_requires_both_buttons() {
        let mut combo = PauseCombo::default();
        assert!(!combo.update(Button::Back, true));
        assert!(!combo.update(Button::Back, false));
        assert!(!combo.update(Button::Start, true));
        assert!(!combo.update(Button::Start, false));
    }

    #[test]
    fn test_combo_fires_once_when_both_held() {
        let mut combo = PauseCombo::default();
        assert!(!combo.update(Button::Back, true));
        assert!(combo.update(Button::Start, true));
    }

    #[test]
    fn test_combo_resets_after_firing() {
        let mut combo = PauseCombo::default();
        combo.update(Button::Back, true);
        assert!(combo.update(Button::Start, true));

        // Still physically held, but the latches are spent
        assert!(!combo.update(Button::Start, false));
        assert!(!combo.update(Button::Start, true));

        // A fresh press of each re-arms
        assert!(combo.update(Button::Back, true));
    }

    #[test]
    fn test_combo_ignores_other_buttons() {
        let mut combo = PauseCombo::default();
        combo.update(Button::Back, true);
        assert!(!combo.update(Button::A, true));
        assert!(combo.update(Button::Start, true));
    }

    #[test]
    fn test_combo_order_independent() {
        let mut combo = PauseCombo::default();
        assert!(!combo.update(Button::Start, true));
        assert!(combo.update(Button::Back, true));
    }
}
