//! Batch size prediction
//!
//! Closed-form guess of how many notes fit in one prompt. The guess only
//! seeds the adaptive search, so it errs on the small side: a probe that
//! fits is cheap to grow from, while an oversized probe renders a large
//! prompt for nothing.

/// Fixed per-note overhead (metadata, separators, XML tags) in characters.
pub const NOTE_OVERHEAD_CHARS: f64 = 15.0;
/// Efficiency reached by very large notes.
pub const MAX_BASE_EFFICIENCY: f64 = 0.49;
/// How far below [`MAX_BASE_EFFICIENCY`] tiny notes start.
pub const SMALL_NOTE_EFFICIENCY_PENALTY: f64 = 0.18;
/// Note size (characters) over which the small-note penalty decays.
pub const EFFICIENCY_DECAY_CHARS: f64 = 530.0;
/// Prompt size at which the prompt scale is 1.0.
pub const REFERENCE_PROMPT_SIZE: f64 = 100_000.0;
pub const MIN_PROMPT_SCALE: f64 = 0.80;
pub const MAX_PROMPT_SCALE: f64 = 1.25;
/// Pessimism multiplier applied to the combined efficiency.
pub const CONSERVATIVE_FACTOR: f64 = 0.80;

/// Predict notes-per-batch for a prompt budget of `max_chars`.
///
/// Always returns at least 1.
pub fn predict_batch_size(max_chars: usize, note_count: usize, avg_note_size: f64) -> usize {
    let max_chars = max_chars as f64;

    let base_efficiency =
        MAX_BASE_EFFICIENCY - SMALL_NOTE_EFFICIENCY_PENALTY * (-avg_note_size / EFFICIENCY_DECAY_CHARS).exp();
    let prompt_scale = (max_chars / REFERENCE_PROMPT_SIZE)
        .sqrt()
        .clamp(MIN_PROMPT_SCALE, MAX_PROMPT_SCALE);
    let efficiency = base_efficiency * prompt_scale * CONSERVATIVE_FACTOR;

    let total_effective_size = note_count as f64 * (avg_note_size + NOTE_OVERHEAD_CHARS);
    let usable_prompt_size = max_chars * efficiency;
    if usable_prompt_size <= 0.0 || !usable_prompt_size.is_finite() {
        return 1;
    }

    let num_batches = (total_effective_size / usable_prompt_size).ceil().max(1.0) as usize;

    (note_count / num_batches).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_notes_large_budget() {
        // 100 notes of ~20 chars against a 20k prompt: one batch worth
        // 20000 * 0.3133 * 0.8 * 0.8 = 4010 usable, 100 * 35 = 3500 needed
        assert_eq!(predict_batch_size(20_000, 100, 20.0), 100);
    }

    #[test]
    fn test_splits_when_budget_tight() {
        // usable = 2500 * (0.49 - 0.18 * e^(-20/530)) * 0.8 * 0.8 = 501.3
        // batches = ceil(3500 / 501.3) = 7, size = 100 / 7 = 14
        assert_eq!(predict_batch_size(2_500, 100, 20.0), 14);
    }

    #[test]
    fn test_zero_budget_degrades_to_one() {
        assert_eq!(predict_batch_size(0, 100, 20.0), 1);
    }

    #[test]
    fn test_no_notes() {
        assert_eq!(predict_batch_size(10_000, 0, 0.0), 1);
    }

    #[test]
    fn test_tiny_budget_predicts_one() {
        assert_eq!(predict_batch_size(10, 5, 40.0), 1);
    }

    #[test]
    fn test_prompt_scale_clamped() {
        // Above 156_250 chars the scale stops growing, so the usable size is
        // linear in max_chars from there on (modulo integer batch rounding).
        let a = predict_batch_size(200_000, 10_000, 100.0);
        let b = predict_batch_size(400_000, 10_000, 100.0);
        assert_eq!(a, 588);
        assert_eq!(b, 1111);
    }
}
