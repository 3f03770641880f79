//! Punt: hand the ball over, further back.
//!
//! Outcome probabilities here belong to the receiving team, so every
//! probability output is reported negated.

use tracing::warn;

use super::fallback::{punt_bands, punt_distance_band, PuntEstimate};
use super::interpolate::EmpiricalTable;
use super::lookup::PuntTables;
use super::situation::{GameTiming, SituationDescriptor};
use super::{
    Decision, DecisionMetrics, Detail, EngineContext, EngineError, Fidelity, Polarity,
    ProbabilityPolarity,
};

/// Nominal gross distance that the punt tables were built around.
const REFERENCE_GROSS_YARDS: f64 = 50.0;

/// Receiving team's yardline_100 after a touchback.
const TOUCHBACK_YARDLINE: f64 = 80.0;

const POLARITY: ProbabilityPolarity = ProbabilityPolarity {
    td: Polarity::Negated,
    fg: Polarity::Negated,
    no_score: Polarity::Negated,
};

/// Where the ball ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuntFlight {
    pub actual_distance: f64,
    /// Punting team's yardline_100 minus the distance, at least 1.
    pub landing_position: f64,
}

pub fn flight(yardline_100: u32, punter_range_yards: u32) -> PuntFlight {
    let (factor, cap) = punt_distance_band(yardline_100);
    let actual_distance = (punter_range_yards as f64 * factor).min(cap);
    PuntFlight {
        actual_distance,
        landing_position: (yardline_100 as f64 - actual_distance).max(1.0),
    }
}

pub fn evaluate(
    context: &EngineContext,
    situation: &SituationDescriptor,
) -> Result<DecisionMetrics, EngineError> {
    let yl = situation.yardline_100();
    let flight = flight(yl, situation.punter_range_yards());
    let mut fallbacks = Vec::new();

    let mut estimate = match context.fidelity {
        Fidelity::Full => blended(context, situation, flight, &mut fallbacks)?,
        Fidelity::Simplified => {
            touchback_weighted(&context.tables.punt, yl as f64, flight, &mut fallbacks)
        }
    };
    late_game_scaling(&mut estimate, situation.timing());

    let PuntEstimate {
        epa,
        wpa,
        opp_td_prob: td,
        opp_fg_prob: fg,
    } = estimate;

    Ok(DecisionMetrics {
        decision: Decision::Punt,
        td_prob: -td * 100.0,
        fg_prob: -fg * 100.0,
        no_score_prob: -(1.0 - td - fg).max(0.0) * 100.0,
        epa,
        wpa,
        polarity: POLARITY,
        fallbacks,
        detail: Detail::Punt {
            actual_distance: flight.actual_distance,
            landing_position: flight.landing_position,
            score_prob: -(td + fg) * 100.0,
            win_prob: wpa * 100.0,
        },
    })
}

/// Interpolate at the line of scrimmage, scale by punter quality and average
/// the opponent's chances with those from the landing spot.
fn blended(
    context: &EngineContext,
    situation: &SituationDescriptor,
    flight: PuntFlight,
    fallbacks: &mut Vec<&'static str>,
) -> Result<PuntEstimate, EngineError> {
    let at_scrimmage = interpolate_all(
        &context.tables.punt,
        situation.yardline_100() as f64,
        fallbacks,
    );
    let quality = situation.punter_range_yards() as f64 / REFERENCE_GROSS_YARDS;

    let landing = context
        .tables
        .opponent_scoring
        .lookup(flight.landing_position)
        .ok_or_else(|| EngineError::unavailable("opponent scoring table has no rows"))?;

    Ok(PuntEstimate {
        epa: at_scrimmage.epa * quality,
        wpa: at_scrimmage.wpa * quality,
        opp_td_prob: (at_scrimmage.opp_td_prob + landing.opp_td_prob) / 2.0,
        opp_fg_prob: (at_scrimmage.opp_fg_prob + landing.opp_fg_prob) / 2.0,
    })
}

/// Single read at a touchback-weighted position, without quality scaling or
/// blending.
fn touchback_weighted(
    tables: &PuntTables,
    yardline_100: f64,
    flight: PuntFlight,
    fallbacks: &mut Vec<&'static str>,
) -> PuntEstimate {
    let touchback = match tables.touchback_prob.interpolate(yardline_100) {
        Ok(p) => p.clamp(0.0, 1.0),
        Err(e) => {
            warn!("touchback_prob interpolation failed, assuming no touchbacks: {}", e);
            fallbacks.push("touchback_prob");
            0.0
        }
    };
    let adjusted = touchback * TOUCHBACK_YARDLINE
        + (1.0 - touchback) * (100.0 - flight.landing_position);
    interpolate_all(tables, adjusted, fallbacks)
}

fn interpolate_all(tables: &PuntTables, x: f64, fallbacks: &mut Vec<&'static str>) -> PuntEstimate {
    let bands = punt_bands(x);
    PuntEstimate {
        epa: read(&tables.epa, x, bands.epa, "punt_epa", fallbacks),
        wpa: read(&tables.wpa, x, bands.wpa, "punt_wpa", fallbacks),
        opp_td_prob: read(&tables.opp_td_prob, x, bands.opp_td_prob, "opp_td_prob", fallbacks),
        opp_fg_prob: read(&tables.opp_fg_prob, x, bands.opp_fg_prob, "opp_fg_prob", fallbacks),
    }
}

fn read(
    table: &EmpiricalTable,
    x: f64,
    band: f64,
    metric: &'static str,
    fallbacks: &mut Vec<&'static str>,
) -> f64 {
    match table.interpolate(x) {
        Ok(v) => v,
        Err(e) => {
            warn!("{} interpolation failed, using banded value: {}", metric, e);
            fallbacks.push(metric);
            band
        }
    }
}

/// Late in the game a leading team's punt concedes less, a trailing team's
/// more.
fn late_game_scaling(estimate: &mut PuntEstimate, timing: GameTiming) {
    if !timing.is_late_fourth() {
        return;
    }
    if timing.score_differential > 0 {
        estimate.opp_td_prob *= 0.85;
        estimate.opp_fg_prob *= 0.90;
    } else if timing.score_differential < 0 {
        estimate.opp_td_prob *= 1.10;
        estimate.opp_fg_prob *= 1.05;
    }
}
