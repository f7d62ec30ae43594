use std::borrow::Cow;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Offset added to currents before taking log10.
pub const LOG_EPSILON: f64 = 1e-12;

/// Indices kept by a seeded random downsample of `len` items to at most `cap`.
///
/// Returns `None` when no downsampling is needed (`cap` unset or `cap >= len`).
/// A cap of zero is clamped to one. The selection is drawn without
/// replacement from a generator seeded fresh from `seed`, so identical
/// arguments always yield identical indices, in the same order.
pub fn downsample_indices(len: usize, cap: Option<usize>, seed: u64) -> Option<Vec<usize>> {
    let cap = cap?;
    if cap >= len {
        return None;
    }
    let amount = cap.max(1);
    let mut rng = StdRng::seed_from_u64(seed);
    Some(rand::seq::index::sample(&mut rng, len, amount).into_vec())
}

/// Seeded random downsampling. Borrows the input untouched when under the cap.
pub fn downsample<T: Clone>(items: &[T], cap: Option<usize>, seed: u64) -> Cow<'_, [T]> {
    match downsample_indices(items.len(), cap, seed) {
        Some(indices) => Cow::Owned(indices.into_iter().map(|i| items[i].clone()).collect()),
        None => Cow::Borrowed(items),
    }
}

/// Positive-current mask and `log10(ids + eps)` of the masked entries.
///
/// Non-positive currents are dropped from the log values only; callers keep
/// them for linear views, so log panels may show fewer points.
pub fn log_mask(currents: &[f64], eps: f64) -> (Vec<bool>, Vec<f64>) {
    let mask: Vec<bool> = currents.iter().map(|&i| i > 0.0).collect();
    let logs = currents
        .iter()
        .zip(&mask)
        .filter(|(_, keep)| **keep)
        .map(|(&i, _)| (i + eps).log10())
        .collect();
    (mask, logs)
}

/// Select the entries of `values` where `mask` is set.
pub fn apply_mask(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(&v, _)| v)
        .collect()
}
