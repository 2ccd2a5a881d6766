use crate::cache::config::DEFAULT_LOAD_FACTOR;

/// Number of entry slots to preallocate for a new store.
///
/// Mirrors a hash table that starts with `initial_capacity` buckets and grows once
/// `buckets * load_factor` entries are present. Never more than the cache can ever hold
/// (`capacity` plus the transient entry that triggers an eviction).
#[must_use]
pub fn initial_slots(capacity: usize, initial_capacity: usize, load_factor: f32) -> usize {
    let lf = if load_factor.is_finite() && load_factor > 0.0 {
        f64::from(load_factor)
    } else {
        f64::from(DEFAULT_LOAD_FACTOR)
    };
    let threshold = crate::utils::num::f64_to_usize_saturating((initial_capacity as f64 * lf).floor());
    threshold.clamp(1, capacity.saturating_add(1))
}
