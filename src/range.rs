//! # Range Mapping Module
//!
//! Linear rescaling of a value from one interval to another, used wherever a
//! raw magnitude has to become something else entirely (trigger bytes into
//! scroll-wheel units, for example).
//!
//! ## Degenerate intervals
//!
//! A zero-width source interval would divide by zero. Instead of erroring, the
//! mapping is defined to return the midpoint of the destination interval, so
//! callers never have to special-case it.
//!
//! ## Usage
//!
//! ```
//! use gamepad_pointer::range::{map_range, map_range_clamped};
//!
//! // 50% of 0..255 is 50% of 0..80
//! assert!((map_range(127.5, 0.0, 255.0, 0.0, 80.0) - 40.0).abs() < 0.001);
//!
//! // Out-of-range inputs extrapolate unless clamped
//! assert!(map_range(300.0, 0.0, 255.0, 0.0, 80.0) > 80.0);
//! assert_eq!(map_range_clamped(300.0, 0.0, 255.0, 0.0, 80.0), 80.0);
//! ```

/// Linearly rescales `value` from `[src_min, src_max]` to `[dst_min, dst_max]`.
///
/// Inputs outside the source interval extrapolate past the destination
/// interval; use [`map_range_clamped`] when the result must stay inside it.
///
/// If the source interval is narrower than `f32::EPSILON`, returns the midpoint
/// of the destination interval.
///
/// # Examples
///
/// ```
/// use gamepad_pointer::range::map_range;
///
/// assert_eq!(map_range(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
/// assert_eq!(map_range(3.0, 3.0, 3.0, 0.0, 10.0), 5.0); // degenerate source
/// ```
#[must_use]
pub fn map_range(value: f32, src_min: f32, src_max: f32, dst_min: f32, dst_max: f32) -> f32 {
    if (src_max - src_min).abs() < f32::EPSILON {
        return (dst_min + dst_max) / 2.0;
    }

    (value - src_min) / (src_max - src_min) * (dst_max - dst_min) + dst_min
}

/// Like [`map_range`], but the result is clamped to `[dst_min, dst_max]`.
///
/// The destination interval must be ordered (`dst_min <= dst_max`); the caller
/// guards that.
///
/// # Examples
///
/// ```
/// use gamepad_pointer::range::map_range_clamped;
///
/// assert_eq!(map_range_clamped(-5.0, 0.0, 10.0, 0.0, 100.0), 0.0);
/// assert_eq!(map_range_clamped(15.0, 0.0, 10.0, 0.0, 100.0), 100.0);
/// ```
#[must_use]
pub fn map_range_clamped(
    value: f32,
    src_min: f32,
    src_max: f32,
    dst_min: f32,
    dst_max: f32,
) -> f32 {
    map_range(value, src_min, src_max, dst_min, dst_max).clamp(dst_min, dst_max)
}
