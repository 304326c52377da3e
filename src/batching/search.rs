//! Adaptive batch size search
//!
//! Finds the largest prefix of the remaining notes whose prompt fits the
//! budget, starting from a predicted size. Growth is capped at 20% per step
//! and shrinking at 30%, so a good prediction converges in a handful of
//! renders. The ratio of found to predicted size is folded into an
//! accuracy factor that seeds the next search.

use tracing::debug;

/// Multiplier applied to a fitting probe before trying again.
pub const GROWTH_FACTOR: f64 = 1.2;
/// Multiplier applied to a failing probe while no size has fit yet.
pub const SHRINK_FACTOR: f64 = 0.7;
/// Weight of the previous accuracy factor in the moving average.
pub const ACCURACY_MEMORY: f64 = 0.9;

/// Result of one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Number of items to take for the next batch
    pub batch_size: usize,
    /// Accuracy factor to carry into the next search
    pub accuracy_factor: f64,
    /// Whether `validate` accepted `batch_size` during the search
    pub confirmed: bool,
}

/// Find the largest `n <= total_items` for which `validate(n)` holds.
///
/// `validate` must be monotonic: if `n` fits, every smaller size fits.
/// Returns `(batch_size, updated_accuracy_factor)`. When nothing fits the
/// batch size falls back to 1 and the caller must check that item alone.
pub fn find_batch_size<F>(
    total_items: usize,
    predicted_size: usize,
    validate: F,
    accuracy_factor: f64,
) -> (usize, f64)
where
    F: FnMut(usize) -> bool,
{
    let outcome = search(total_items, predicted_size, validate, accuracy_factor);
    (outcome.batch_size, outcome.accuracy_factor)
}

/// Same as [`find_batch_size`], also reporting whether the size was confirmed.
pub fn search<F>(
    total_items: usize,
    predicted_size: usize,
    mut validate: F,
    accuracy_factor: f64,
) -> SearchOutcome
where
    F: FnMut(usize) -> bool,
{
    if total_items == 0 {
        return SearchOutcome {
            batch_size: 0,
            accuracy_factor,
            confirmed: false,
        };
    }

    // A prediction beyond the remaining items starts from the whole remainder.
    let adjusted = ((predicted_size as f64 * accuracy_factor) as usize).clamp(1, total_items);
    let mut current = adjusted;
    let mut last_valid: Option<usize> = None;
    let mut shrinking = false;

    while current > 0 && current <= total_items {
        if validate(current) {
            debug!(size = current, "probe fits");
            last_valid = Some(current);
            if shrinking || current == total_items {
                break;
            }
            let next = total_items.min((current as f64 * GROWTH_FACTOR) as usize);
            if next == current {
                break;
            }
            current = next;
        } else {
            debug!(size = current, "probe too large");
            if last_valid.is_some() {
                break;
            }
            shrinking = true;
            current = (current as f64 * SHRINK_FACTOR) as usize;
        }
    }

    let batch_size = last_valid.unwrap_or(current.max(1));

    SearchOutcome {
        batch_size,
        accuracy_factor: updated_accuracy(accuracy_factor, batch_size, predicted_size),
        confirmed: last_valid.is_some(),
    }
}

/// Exponential moving average of actual / predicted batch size.
fn updated_accuracy(previous: f64, batch_size: usize, predicted_size: usize) -> f64 {
    if predicted_size == 0 {
        return previous;
    }
    ACCURACY_MEMORY * previous + (1.0 - ACCURACY_MEMORY) * (batch_size as f64 / predicted_size as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validator accepting sizes up to `limit`, recording each probe.
    fn limit_validator(limit: usize, probes: &mut Vec<usize>) -> impl FnMut(usize) -> bool + '_ {
        move |n| {
            probes.push(n);
            n <= limit
        }
    }

    #[test]
    fn test_empty_input() {
        let mut probes = Vec::new();
        let (size, acc) = find_batch_size(0, 10, limit_validator(5, &mut probes), 0.7);
        assert_eq!(size, 0);
        assert_eq!(acc, 0.7);
        assert!(probes.is_empty());
    }

    #[test]
    fn test_grows_until_failure() {
        let mut probes = Vec::new();
        let (size, acc) = find_batch_size(100, 10, limit_validator(15, &mut probes), 1.0);

        // 10 -> 12 -> 14 -> 16 (fails)
        assert_eq!(probes, vec![10, 12, 14, 16]);
        assert_eq!(size, 14);
        assert!((acc - (0.9 + 0.1 * 1.4)).abs() < 1e-9);
    }

    #[test]
    fn test_shrinks_until_fit() {
        let mut probes = Vec::new();
        let (size, _) = find_batch_size(100, 50, limit_validator(20, &mut probes), 1.0);

        // 50 -> 35 -> 24 -> 16 (fits, stop)
        assert_eq!(probes, vec![50, 35, 24, 16]);
        assert_eq!(size, 16);
    }

    #[test]
    fn test_stops_at_total() {
        let mut probes = Vec::new();
        let (size, _) = find_batch_size(12, 10, limit_validator(100, &mut probes), 1.0);
        assert_eq!(probes, vec![10, 12]);
        assert_eq!(size, 12);
    }

    #[test]
    fn test_growth_stalls_on_small_sizes() {
        // int(4 * 1.2) == 4, so growth cannot make progress
        let mut probes = Vec::new();
        let (size, _) = find_batch_size(100, 4, limit_validator(100, &mut probes), 1.0);
        assert_eq!(probes, vec![4]);
        assert_eq!(size, 4);
    }

    #[test]
    fn test_nothing_fits_falls_back_to_one() {
        let mut probes = Vec::new();
        let outcome = search(100, 3, limit_validator(0, &mut probes), 1.0);

        // 3 -> 2 -> 1 -> 0
        assert_eq!(probes, vec![3, 2, 1]);
        assert_eq!(outcome.batch_size, 1);
        assert!(!outcome.confirmed);
    }

    #[test]
    fn test_accuracy_factor_scales_probe() {
        let mut probes = Vec::new();
        let (size, _) = find_batch_size(100, 20, limit_validator(100, &mut probes), 0.5);
        assert_eq!(probes[0], 10);
        assert_eq!(size, 100);
    }

    #[test]
    fn test_prediction_beyond_total_probes_total() {
        let mut probes = Vec::new();
        let outcome = search(5, 50, limit_validator(100, &mut probes), 1.0);

        assert_eq!(probes, vec![5]);
        assert_eq!(outcome.batch_size, 5);
        assert!(outcome.confirmed);
        assert!((outcome.accuracy_factor - (0.9 + 0.1 * 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_prediction_keeps_accuracy() {
        let mut probes = Vec::new();
        let (size, acc) = find_batch_size(10, 0, limit_validator(3, &mut probes), 0.8);
        assert_eq!(size, 1);
        assert_eq!(acc, 0.8);
    }
}
