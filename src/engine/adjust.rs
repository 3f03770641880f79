//! Quarter / clock / score multipliers.
//!
//! Shared by every evaluator. The adjustment only sees a scalar and the game
//! timing, never which decision asked for it.

use super::situation::GameTiming;

/// Bounds for adjusted probabilities.
pub const PROBABILITY_FLOOR: f64 = 0.05;
pub const PROBABILITY_CEILING: f64 = 0.95;

/// Multiplier for the current timing and score.
///
/// | quarter | clock  | trailing      | leading by >7 |
/// |---------|--------|---------------|---------------|
/// | 4       | <300s  | ×1.15         | ×0.85         |
/// | 4       | <600s  | ×1.10         | ×0.90         |
/// | 3       | any    | ×1.08 if <−7  |               |
/// | 2       | <120s  | ×1.12         |               |
pub fn situational_multiplier(timing: GameTiming) -> f64 {
    let GameTiming {
        quarter,
        clock_seconds_remaining: clock,
        score_differential: diff,
    } = timing;

    match quarter {
        4 if clock < 300 => {
            if diff < 0 {
                1.15
            } else if diff > 7 {
                0.85
            } else {
                1.0
            }
        }
        4 if clock < 600 => {
            if diff < 0 {
                1.10
            } else if diff > 7 {
                0.90
            } else {
                1.0
            }
        }
        3 if diff < -7 => 1.08,
        2 if clock < 120 && diff < 0 => 1.12,
        _ => 1.0,
    }
}

/// Scale a probability and keep it within [0.05, 0.95].
pub fn adjust_probability(base: f64, timing: GameTiming) -> f64 {
    (base * situational_multiplier(timing)).clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING)
}
