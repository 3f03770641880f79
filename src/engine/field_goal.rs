//! Field goal attempt.

use tracing::debug;

use super::adjust::adjust_probability;
use super::fallback::{
    field_goal_epa, field_goal_success, field_goal_success_simplified, field_goal_wpa_multiplier,
};
use super::situation::{GameTiming, SituationDescriptor};
use super::{
    Decision, DecisionMetrics, Detail, EngineContext, Fidelity, Polarity, ProbabilityPolarity,
};

/// Snap and hold add this much to the line of scrimmage.
pub const SNAP_AND_HOLD_YARDS: u32 = 17;

/// Kicks within this many yards of the kicker's range lose some accuracy.
const RANGE_EDGE_YARDS: u32 = 5;
const RANGE_EDGE_FACTOR: f64 = 0.90;

/// Reported when the kick is longer than the kicker's range.
const OUT_OF_RANGE_WPA: f64 = -5.0;
const OUT_OF_RANGE_EPA: f64 = -3.0;

const POLARITY: ProbabilityPolarity = ProbabilityPolarity {
    td: Polarity::Positive,
    fg: Polarity::Positive,
    no_score: Polarity::Positive,
};

pub fn evaluate(context: &EngineContext, situation: &SituationDescriptor) -> DecisionMetrics {
    let yl = situation.yardline_100();
    let kick_distance = yl + SNAP_AND_HOLD_YARDS;
    let range = situation.kicker_range_yards();

    if kick_distance > range {
        debug!("{} yard kick beyond {} yard range", kick_distance, range);
        return out_of_range(kick_distance);
    }

    let base = match context.fidelity {
        Fidelity::Full => field_goal_success(kick_distance),
        Fidelity::Simplified => field_goal_success_simplified(kick_distance),
    };
    let base = if kick_distance + RANGE_EDGE_YARDS > range {
        base * RANGE_EDGE_FACTOR
    } else {
        base
    };
    let timing = situation.timing();
    let p = adjust_probability(base, timing);

    let (epa_make, epa_miss) = field_goal_epa(kick_distance);
    let wpa = p * field_goal_wpa_multiplier(yl) * late_game_factor(timing);

    DecisionMetrics {
        decision: Decision::FieldGoal,
        td_prob: 0.0,
        fg_prob: p * 100.0,
        no_score_prob: (1.0 - p) * 100.0,
        epa: p * epa_make + (1.0 - p) * epa_miss,
        wpa,
        polarity: POLARITY,
        fallbacks: Vec::new(),
        detail: Detail::FieldGoal {
            kick_distance,
            success_rate: p,
            in_range: true,
        },
    }
}

/// Three points matter most when they tie or take the lead late.
fn late_game_factor(timing: GameTiming) -> f64 {
    if !timing.is_late_fourth() {
        return 1.0;
    }
    match timing.score_differential {
        0 => 1.25,
        -3 => 1.20,
        3 => 0.90,
        d if d < -7 => 0.80,
        d if d > 7 => 0.85,
        _ => 1.0,
    }
}

fn out_of_range(kick_distance: u32) -> DecisionMetrics {
    DecisionMetrics {
        decision: Decision::FieldGoal,
        td_prob: 0.0,
        fg_prob: 0.0,
        no_score_prob: 100.0,
        epa: OUT_OF_RANGE_EPA,
        wpa: OUT_OF_RANGE_WPA,
        polarity: POLARITY,
        fallbacks: Vec::new(),
        detail: Detail::FieldGoal {
            kick_distance,
            success_rate: 0.0,
            in_range: false,
        },
    }
}
