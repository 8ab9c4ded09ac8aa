//! # Device Poller Module
//!
//! Background sampling loop over the [`DeviceBackend`] boundary.
//!
//! Every 10 ms (~100 Hz) the loop queries raw controller state, derives a
//! [`ControllerState`], diffs it against the previous cycle, and fans the
//! resulting [`ControllerEvent`]s out over a broadcast channel:
//!
//! - **Connection** and **button** signals are edge-filtered: one event per
//!   transition, nothing on steady state.
//! - **Stick** and **trigger** signals are continuous: emitted every cycle
//!   while the device is connected.
//!
//! Cancellation is cooperative. [`DevicePoller::stop`] raises a flag that the
//! loop observes at the top of each cycle, so worst-case shutdown latency is
//! one cycle. A failed native query is not an error: it surfaces as a
//! `ConnectionChanged(false)` edge and polling continues unabated.
//!
//! ## Usage
//!
//! ```no_run
//! use std::io;
//! use std::sync::Arc;
//! use gamepad_pointer::backend::{DeviceBackend, RawSample};
//! use gamepad_pointer::controller::{ControllerEvent, DevicePoller};
//!
//! struct Gamepad;
//!
//! impl DeviceBackend for Gamepad {
//!     fn query(&self, _index: u32) -> Option<RawSample> { None }
//!     fn set_vibration(&self, _i: u32, _l: u16, _r: u16) -> io::Result<()> { Ok(()) }
//! }
//!
//! # async fn run() {
//! let mut poller = DevicePoller::new(Arc::new(Gamepad), 0);
//! let mut events = poller.subscribe();
//! poller.start();
//!
//! while let Ok(event) = events.recv().await {
//!     if let ControllerEvent::StickMoved { x, y } = event {
//!         println!("stick at ({x}, {y})");
//!     }
//! }
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::backend::DeviceBackend;
use crate::controller::state::{Button, ControllerState};

/// Sampling interval: 10 ms, ~100 Hz.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Broadcast channel capacity for controller events.
///
/// At ~100 Hz with three continuous events per cycle this buffers well under
/// a second of backlog before a slow consumer starts lagging.
const EVENT_CAPACITY: usize = 256;

/// Which trigger a [`ControllerEvent::TriggerChanged`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSide {
    Left,
    Right,
}

/// Discrete notification emitted by the polling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    /// The device appeared or disappeared.
    ConnectionChanged(bool),
    /// Left-stick vector, normalized; emitted every connected cycle.
    StickMoved { x: f32, y: f32 },
    /// Trigger magnitude, raw byte; emitted every connected cycle.
    TriggerChanged { side: TriggerSide, magnitude: u8 },
    /// A button crossed a press/release edge.
    ButtonChanged { button: Button, pressed: bool },
}

/// Computes the events one cycle produces, given the previous cycle's state.
///
/// Emission order: connection edge first, then the continuous stick and
/// trigger signals, then button edges in [`Button::ALL`] order.
fn diff_events(previous: &ControllerState, next: &ControllerState) -> Vec<ControllerEvent> {
    let mut events = Vec::new();

    if next.connected != previous.connected {
        events.push(ControllerEvent::ConnectionChanged(next.connected));
    }

    if next.connected {
        events.push(ControllerEvent::StickMoved {
            x: next.left_stick.x,
            y: next.left_stick.y,
        });
        events.push(ControllerEvent::TriggerChanged {
            side: TriggerSide::Left,
            magnitude: next.left_trigger,
        });
        events.push(ControllerEvent::TriggerChanged {
            side: TriggerSide::Right,
            magnitude: next.right_trigger,
        });

        for button in Button::ALL {
            let pressed = next.pressed(button);
            if pressed != previous.pressed(button) {
                events.push(ControllerEvent::ButtonChanged { button, pressed });
            }
        }
    }

    events
}

/// Owns the background sampling loop for one controller slot.
///
/// One producer, any number of [`DevicePoller::subscribe`]d consumers.
/// Events are delivered in emission order; subscribers that join late miss
/// earlier events.
pub struct DevicePoller {
    backend: Arc<dyn DeviceBackend>,
    index: u32,
    events: broadcast::Sender<ControllerEvent>,
    running: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl DevicePoller {
    /// Creates a poller for the given controller slot. Does not start polling.
    #[must_use]
    pub fn new(backend: Arc<dyn DeviceBackend>, index: u32) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            index,
            events,
            running: Arc::new(AtomicBool::new(false)),
            connected: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Subscribes to the event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Whether the device was connected as of the most recent cycle.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Spawns the sampling loop.
    ///
    /// Button edge state starts fresh on every call. Calling `start` while
    /// the loop is already running is a logged no-op; it only restarts after
    /// [`DevicePoller::stop`].
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("polling loop already running, start ignored");
            return;
        }

        let backend = Arc::clone(&self.backend);
        let index = self.index;
        let events = self.events.clone();
        let running = Arc::clone(&self.running);
        let connected = Arc::clone(&self.connected);

        debug!(index, "starting controller polling loop");
        self.task = Some(tokio::spawn(async move {
            let mut tick = interval(POLL_INTERVAL);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut previous = ControllerState::default();

            loop {
                tick.tick().await;
                // Stop flag is observed at the top of each cycle
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let sample = backend.query(index);
                let next = ControllerState::from_sample(sample.as_ref());
                connected.store(next.connected, Ordering::SeqCst);

                for event in diff_events(&previous, &next) {
                    // Send only fails with zero subscribers; that is fine
                    let _ = events.send(event);
                }
                previous = next;
            }

            debug!(index, "controller polling loop exited");
        }));
    }

    /// Signals cancellation and waits for the loop to exit.
    ///
    /// The loop exits at the top of its next cycle, so this resolves within
    /// roughly one polling interval.
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Sets rumble motor speeds. No-op while the device is disconnected;
    /// native failures are logged and dropped.
    pub fn set_vibration(&self, left_motor: u16, right_motor: u16) {
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self.backend.set_vibration(self.index, left_motor, right_motor) {
            debug!("vibration call failed: {e}");
        }
    }

    /// Fires a timed rumble pulse, resetting the motors after `duration`.
    ///
    /// No-op while disconnected; fire-and-forget like [`DevicePoller::set_vibration`].
    pub fn pulse_vibration(&self, left_motor: u16, right_motor: u16, duration: Duration) {
        if !self.is_connected() {
            return;
        }
        let backend = Arc::clone(&self.backend);
        let index = self.index;
        tokio::spawn(async move {
            if backend.set_vibration(index, left_motor, right_motor).is_ok() {
                tokio::time::sleep(duration).await;
                let _ = backend.set_vibration(index, 0, 0);
            }
        });
    }
}

impl Drop for DevicePoller {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mocks::MockDevice;
    use crate::backend::RawSample;
    use tokio::time::sleep;

    fn sample_with_buttons(buttons: u16) -> RawSample {
        RawSample {
            buttons,
            ..RawSample::default()
        }
    }

    fn connected_states(masks: &[u16]) -> Vec<ControllerState> {
        masks
            .iter()
            .map(|&m| ControllerState::from_sample(Some(&sample_with_buttons(m))))
            .collect()
    }

    // ==================== Diff Tests ====================

    #[test]
    fn test_no_events_while_disconnected() {
        let prev = ControllerState::default();
        let next = ControllerState::default();
        assert!(diff_events(&prev, &next).is_empty());
    }

    #[test]
    fn test_connection_edge_fires_once() {
        let disconnected = ControllerState::default();
        let connected = ControllerState::from_sample(Some(&RawSample::default()));

        let events = diff_events(&disconnected, &connected);
        assert_eq!(events[0], ControllerEvent::ConnectionChanged(true));

        // Steady connected state: no further connection events
        let steady = diff_events(&connected, &connected);
        assert!(!steady
            .iter()
            .any(|e| matches!(e, ControllerEvent::ConnectionChanged(_))));
    }

    #[test]
    fn test_disconnect_emits_only_connection_event() {
        let connected = ControllerState::from_sample(Some(&RawSample::default()));
        let disconnected = ControllerState::default();

        let events = diff_events(&connected, &disconnected);
        assert_eq!(events, vec![ControllerEvent::ConnectionChanged(false)]);
    }

    #[test]
    fn test_continuous_signals_every_connected_cycle() {
        let state = ControllerState::from_sample(Some(&RawSample {
            left_trigger: 100,
            right_trigger: 50,
            thumb_lx: 16384,
            ..RawSample::default()
        }));

        // Even with zero change, stick and both triggers are emitted
        let events = diff_events(&state, &state);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ControllerEvent::StickMoved { .. }));
        assert_eq!(
            events[1],
            ControllerEvent::TriggerChanged {
                side: TriggerSide::Left,
                magnitude: 100
            }
        );
        assert_eq!(
            events[2],
            ControllerEvent::TriggerChanged {
                side: TriggerSide::Right,
                magnitude: 50
            }
        );
    }

    #[test]
    fn test_button_edge_detection_sequence() {
        // A-button mask sequence: press, hold, release, press again
        let states = connected_states(&[0x1000, 0x1000, 0, 0x1000]);
        let mut previous = ControllerState::from_sample(Some(&RawSample::default()));

        let mut button_events = Vec::new();
        for (cycle, state) in states.iter().enumerate() {
            for event in diff_events(&previous, state) {
                if let ControllerEvent::ButtonChanged { button, pressed } = event {
                    button_events.push((cycle, button, pressed));
                }
            }
            previous = *state;
        }

        assert_eq!(
            button_events,
            vec![
                (0, Button::A, true),
                (2, Button::A, false),
                (3, Button::A, true),
            ]
        );
    }

    #[test]
    fn test_simultaneous_button_edges() {
        let prev = ControllerState::from_sample(Some(&sample_with_buttons(0x1000)));
        let next = ControllerState::from_sample(Some(&sample_with_buttons(0x2000 | 0x0010)));

        let edges: Vec<_> = diff_events(&prev, &next)
            .into_iter()
            .filter_map(|e| match e {
                ControllerEvent::ButtonChanged { button, pressed } => Some((button, pressed)),
                _ => None,
            })
            .collect();

        // A released, B and Start pressed, in Button::ALL order
        assert_eq!(
            edges,
            vec![
                (Button::A, false),
                (Button::B, true),
                (Button::Start, true),
            ]
        );
    }

    #[test]
    fn test_connection_event_precedes_continuous_signals() {
        let disconnected = ControllerState::default();
        let connected = ControllerState::from_sample(Some(&sample_with_buttons(0x1000)));

        let events = diff_events(&disconnected, &connected);
        assert_eq!(events[0], ControllerEvent::ConnectionChanged(true));
        assert!(matches!(events[1], ControllerEvent::StickMoved { .. }));
        // The held button also fires against the fresh edge state
        assert!(events.contains(&ControllerEvent::ButtonChanged {
            button: Button::A,
            pressed: true
        }));
    }

    // ==================== Loop Lifecycle Tests ====================

    #[tokio::test]
    async fn test_poller_emits_connection_and_stick_events() {
        let device = MockDevice::new(vec![Some(RawSample::default())]);
        let mut poller = DevicePoller::new(Arc::new(device), 0);
        let mut rx = poller.subscribe();

        poller.start();
        sleep(Duration::from_millis(100)).await;
        poller.stop().await;

        let mut got_connect = false;
        let mut stick_count = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                ControllerEvent::ConnectionChanged(true) => got_connect = true,
                ControllerEvent::StickMoved { .. } => stick_count += 1,
                _ => {}
            }
        }
        assert!(got_connect);
        assert!(stick_count >= 2, "expected several cycles, got {stick_count}");
        assert!(poller.is_connected());
    }

    #[tokio::test]
    async fn test_poller_silent_while_disconnected() {
        let device = MockDevice::disconnected();
        let mut poller = DevicePoller::new(Arc::new(device), 0);
        let mut rx = poller.subscribe();

        poller.start();
        sleep(Duration::from_millis(60)).await;
        poller.stop().await;

        // Initially-disconnected state is not an edge: nothing is emitted
        assert!(rx.try_recv().is_err());
        assert!(!poller.is_connected());
    }

    #[tokio::test]
    async fn test_stop_halts_emission() {
        let device = MockDevice::new(vec![Some(RawSample::default())]);
        let mut poller = DevicePoller::new(Arc::new(device), 0);
        let mut rx = poller.subscribe();

        poller.start();
        sleep(Duration::from_millis(60)).await;
        poller.stop().await;

        while rx.try_recv().is_ok() {}
        sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err(), "events after stop");
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let device = MockDevice::new(vec![Some(RawSample::default())]);
        let mut poller = DevicePoller::new(Arc::new(device), 0);

        poller.start();
        sleep(Duration::from_millis(40)).await;
        poller.stop().await;

        let mut rx = poller.subscribe();
        poller.start();
        sleep(Duration::from_millis(60)).await;
        poller.stop().await;

        // Fresh edge state on restart: the connection edge fires again
        let mut got_connect = false;
        while let Ok(event) = rx.try_recv() {
            if event == ControllerEvent::ConnectionChanged(true) {
                got_connect = true;
            }
        }
        assert!(got_connect);
    }

    // ==================== Vibration Tests ====================

    #[tokio::test]
    async fn test_vibration_noop_while_disconnected() {
        let device = MockDevice::disconnected();
        let recorded = Arc::clone(&device.vibrations);
        let poller = DevicePoller::new(Arc::new(device), 0);

        poller.set_vibration(30000, 30000);
        assert!(recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vibration_passes_through_when_connected() {
        let device = MockDevice::new(vec![Some(RawSample::default())]);
        let recorded = Arc::clone(&device.vibrations);
        let mut poller = DevicePoller::new(Arc::new(device), 0);

        poller.start();
        sleep(Duration::from_millis(60)).await;
        poller.set_vibration(30000, 20000);
        poller.stop().await;

        assert_eq!(recorded.lock().unwrap().as_slice(), &[(30000, 20000)]);
    }

    #[tokio::test]
    async fn test_pulse_vibration_resets_motors() {
        let device = MockDevice::new(vec![Some(RawSample::default())]);
        let recorded = Arc::clone(&device.vibrations);
        let mut poller = DevicePoller::new(Arc::new(device), 0);

        poller.start();
        sleep(Duration::from_millis(60)).await;
        poller.pulse_vibration(30000, 30000, Duration::from_millis(30));
        sleep(Duration::from_millis(100)).await;
        poller.stop().await;

        assert_eq!(
            recorded.lock().unwrap().as_slice(),
            &[(30000, 30000), (0, 0)]
        );
    }
}
