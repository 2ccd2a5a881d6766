//! Numeric utilities: safe and centralized integer conversions.
//!
//! Prefer saturating conversions when clamping is safer than panicking or truncating
//! (sizing hints, counters rendered for logs).

#[inline]
#[must_use]
pub fn f64_to_usize_saturating(v: f64) -> usize {
    if !v.is_finite() || v <= 0.0 {
        0
    } else if v >= usize::MAX as f64 {
        usize::MAX
    } else {
        v as usize
    }
}
