//! # Display Topology Module
//!
//! Tracks the monitors that make up the desktop and keeps the cursor inside
//! them.
//!
//! The display set is enumerated once at construction and treated as static
//! for the process lifetime (no hot-plug re-enumeration). Two questions are
//! answered per cursor move:
//!
//! - Which monitor contains the desired position? The answer is cached as the
//!   "current" display, and changes are published on a watch channel so the
//!   host can surface them.
//! - Where may the cursor actually go? Any desired position is clamped into
//!   the virtual desktop bounds, the union rectangle of every monitor.
//!
//! ## Usage
//!
//! ```
//! use gamepad_pointer::display::{Display, DisplayTopology, Point, Rect};
//!
//! let topology = DisplayTopology::new(vec![
//!     Display::new("\\\\.\\DISPLAY1", Rect::new(0, 0, 1920, 1080), true),
//!     Display::new("\\\\.\\DISPLAY2", Rect::new(1920, 0, 1920, 1080), false),
//! ]);
//!
//! // Positions beyond the right edge clamp to the last addressable pixel
//! let clamped = topology.adjust_position(Point::new(3900, 500));
//! assert_eq!(clamped, Point::new(3839, 500));
//! ```

use std::sync::Mutex;

use tokio::sync::watch;
use tracing::warn;

/// A point in virtual-desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in virtual-desktop coordinates.
///
/// `right()` and `bottom()` are exclusive: a 1920-wide rectangle at the origin
/// spans pixels 0 through 1919.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle from its origin and size.
    #[must_use]
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Whether the point lies inside this rectangle.
    ///
    /// Left/top edges are inclusive, right/bottom exclusive.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }
}

/// A single monitor: identity plus bounds in virtual-desktop coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    /// Device name as reported by the platform (e.g. `\\.\DISPLAY1`).
    pub name: String,
    /// Monitor bounds within the virtual desktop.
    pub bounds: Rect,
    /// Whether the platform marks this monitor as primary.
    pub is_primary: bool,
}

impl Display {
    /// Creates a new display entry.
    #[must_use]
    pub fn new(name: impl Into<String>, bounds: Rect, is_primary: bool) -> Self {
        Self {
            name: name.into(),
            bounds,
            is_primary,
        }
    }
}

/// Bounds used when the platform reports no monitors at all.
const FALLBACK_BOUNDS: Rect = Rect {
    left: 0,
    top: 0,
    width: 1920,
    height: 1080,
};

/// Tracks the monitor layout and clamps cursor positions into it.
///
/// The display set is immutable after construction; only the current-display
/// index mutates, guarded by a mutex so [`DisplayTopology::adjust_position`]
/// never loses a change notification.
#[derive(Debug)]
pub struct DisplayTopology {
    displays: Vec<Display>,
    primary: usize,
    current: Mutex<usize>,
    changed_tx: watch::Sender<Display>,
}

impl DisplayTopology {
    /// Builds a topology from an enumerated display set.
    ///
    /// The primary display is the first entry flagged as primary, falling back
    /// to the first entry. An empty set degrades to a single default monitor
    /// so position adjustment stays total.
    #[must_use]
    pub fn new(mut displays: Vec<Display>) -> Self {
        if displays.is_empty() {
            warn!("no displays enumerated, assuming a single {}x{} primary",
                FALLBACK_BOUNDS.width, FALLBACK_BOUNDS.height);
            displays.push(Display::new("default", FALLBACK_BOUNDS, true));
        }

        let primary = displays
            .iter()
            .position(|d| d.is_primary)
            .unwrap_or(0);

        let (changed_tx, _) = watch::channel(displays[primary].clone());

        Self {
            displays,
            primary,
            current: Mutex::new(primary),
            changed_tx,
        }
    }

    /// All known displays, in enumeration order.
    #[must_use]
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// The display most recently determined to contain the cursor.
    #[must_use]
    pub fn current_display(&self) -> Display {
        let idx = *self.current.lock().unwrap();
        self.displays[idx].clone()
    }

    /// Subscribes to current-display changes.
    ///
    /// The receiver starts out holding the display current at subscription
    /// time and observes every change made by [`DisplayTopology::adjust_position`].
    #[must_use]
    pub fn subscribe_current(&self) -> watch::Receiver<Display> {
        self.changed_tx.subscribe()
    }

    /// The smallest rectangle enclosing every display.
    #[must_use]
    pub fn virtual_bounds(&self) -> Rect {
        // The constructor guarantees at least one display
        let mut left = i32::MAX;
        let mut top = i32::MAX;
        let mut right = i32::MIN;
        let mut bottom = i32::MIN;

        for d in &self.displays {
            left = left.min(d.bounds.left);
            top = top.min(d.bounds.top);
            right = right.max(d.bounds.right());
            bottom = bottom.max(d.bounds.bottom());
        }

        Rect::new(left, top, right - left, bottom - top)
    }

    /// Clamps a desired cursor position into the virtual desktop.
    ///
    /// Determines the display containing `desired` (first match in
    /// enumeration order, primary display if none), records it as current,
    /// fires a change notification if it differs from the previous value, and
    /// returns `desired` clamped to `[left, right-1] x [top, bottom-1]` of the
    /// union bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_pointer::display::{Display, DisplayTopology, Point, Rect};
    ///
    /// let topology = DisplayTopology::new(vec![
    ///     Display::new("main", Rect::new(0, 0, 1920, 1080), true),
    /// ]);
    /// assert_eq!(
    ///     topology.adjust_position(Point::new(-50, 2000)),
    ///     Point::new(0, 1079),
    /// );
    /// ```
    pub fn adjust_position(&self, desired: Point) -> Point {
        let containing = self
            .displays
            .iter()
            .position(|d| d.bounds.contains(desired))
            .unwrap_or(self.primary);
        self.set_current(containing);

        let bounds = self.virtual_bounds();
        Point::new(
            desired.x.clamp(bounds.left, bounds.right() - 1),
            desired.y.clamp(bounds.top, bounds.bottom() - 1),
        )
    }

    /// Updates the current display and notifies on change.
    fn set_current(&self, idx: usize) {
        let mut current = self.current.lock().unwrap();
        if *current != idx {
            *current = idx;
            self.changed_tx.send_replace(self.displays[idx].clone());
        }
    }
}
