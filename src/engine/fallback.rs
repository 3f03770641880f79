//! Analytic estimates used when a trained model or empirical table cannot
//! answer.
//!
//! Every function here is total: banded constants keyed on field position,
//! distance to gain or kick length. Nothing in this module can fail, which is
//! what makes it the terminus of the recovery chain.

use super::model::FeatureVector;

// ── Conversion ───────────────────────────────────────────────────────────────

/// Lower/upper bounds on the analytic conversion rate.
const CONVERSION_MIN: f64 = 0.08;
const CONVERSION_MAX: f64 = 0.92;

/// League-wide fourth-down conversion rate by distance to gain.
pub fn conversion_base_rate(distance_to_gain: u32) -> f64 {
    match distance_to_gain {
        0 | 1 => 0.78,
        2 => 0.68,
        3 => 0.58,
        4 => 0.52,
        5..=7 => 0.42,
        8..=10 => 0.31,
        _ => 0.22,
    }
}

/// Field-position scaling: defences tighten near the goal line, and snaps
/// deep in one's own territory convert more easily.
pub fn conversion_field_factor(yardline_100: u32) -> f64 {
    if yardline_100 <= 5 {
        0.82
    } else if yardline_100 <= 15 {
        0.91
    } else if yardline_100 >= 80 {
        1.15
    } else {
        1.0
    }
}

pub fn conversion_probability(yardline_100: u32, distance_to_gain: u32) -> f64 {
    let p = conversion_base_rate(distance_to_gain) * conversion_field_factor(yardline_100);
    p.clamp(CONVERSION_MIN, CONVERSION_MAX)
}

// ── Go-for-it values ─────────────────────────────────────────────────────────

/// (EPA on conversion, EPA on failure) by field position.
pub fn go_epa_bands(yardline_100: u32) -> (f64, f64) {
    if yardline_100 <= 10 {
        (6.2, -3.2)
    } else if yardline_100 <= 20 {
        (5.1, -2.8)
    } else if yardline_100 <= 30 {
        (4.2, -2.3)
    } else if yardline_100 <= 50 {
        (2.8, -1.8)
    } else {
        (1.6, -1.2)
    }
}

/// Win-probability stakes of the snap, larger nearer the goal line and when
/// trailing.
pub fn go_wpa_multiplier(yardline_100: u32, score_differential: i32) -> f64 {
    let base = if yardline_100 <= 10 {
        32.0
    } else if yardline_100 <= 30 {
        26.0
    } else if yardline_100 <= 50 {
        20.0
    } else {
        14.0
    };
    if score_differential < 0 {
        base * 1.25
    } else if score_differential > 7 {
        base * 0.75
    } else {
        base
    }
}

/// (WPA on conversion, WPA on failure). The stakes are split evenly around a
/// 50% baseline.
pub fn go_wpa_bands(yardline_100: u32, score_differential: i32) -> (f64, f64) {
    let m = go_wpa_multiplier(yardline_100, score_differential);
    ((1.0 - 0.5) * m, (0.0 - 0.5) * m)
}

/// Analytic estimators in the shape of the trained-model calls.
pub fn conversion_from_features(f: &FeatureVector) -> f64 {
    conversion_probability(f.yardline_100, f.ydstogo)
}

pub fn epa_success_from_features(f: &FeatureVector) -> f64 {
    go_epa_bands(f.yardline_100).0
}

pub fn wpa_success_from_features(f: &FeatureVector) -> f64 {
    go_wpa_bands(f.yardline_100, f.score_differential).0
}

// ── Field goal ───────────────────────────────────────────────────────────────

/// Make rate by kick distance, 5-yard bands.
pub fn field_goal_success(kick_distance: u32) -> f64 {
    match kick_distance {
        0..=19 => 0.99,
        20..=25 => 0.96,
        26..=30 => 0.91,
        31..=35 => 0.84,
        36..=40 => 0.76,
        41..=45 => 0.66,
        46..=50 => 0.54,
        51..=55 => 0.41,
        56..=60 => 0.28,
        _ => 0.15,
    }
}

/// Coarser make-rate table used in simplified fidelity mode.
pub fn field_goal_success_simplified(kick_distance: u32) -> f64 {
    match kick_distance {
        0..=20 => 0.95,
        21..=25 => 0.92,
        26..=30 => 0.88,
        31..=35 => 0.82,
        36..=40 => 0.75,
        41..=45 => 0.65,
        46..=50 => 0.52,
        51..=55 => 0.38,
        56..=60 => 0.25,
        61..=65 => 0.15,
        _ => 0.08,
    }
}

/// (EPA on make, EPA on miss). Longer kicks are worth more when made and
/// hand the opponent better field position when missed.
pub fn field_goal_epa(kick_distance: u32) -> (f64, f64) {
    if kick_distance <= 30 {
        (2.8, -1.8)
    } else if kick_distance <= 45 {
        (3.0, -2.0)
    } else {
        (3.2, -2.2)
    }
}

/// WPA per unit of make probability, by field position.
pub fn field_goal_wpa_multiplier(yardline_100: u32) -> f64 {
    if yardline_100 <= 10 {
        12.0
    } else if yardline_100 <= 30 {
        15.0
    } else if yardline_100 <= 50 {
        18.0
    } else {
        20.0
    }
}

// ── Punt ─────────────────────────────────────────────────────────────────────

/// Punt outcome estimates at the line of scrimmage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuntEstimate {
    pub epa: f64,
    pub wpa: f64,
    pub opp_td_prob: f64,
    pub opp_fg_prob: f64,
}

pub fn punt_bands(yardline_100: f64) -> PuntEstimate {
    let (epa, wpa, opp_td_prob, opp_fg_prob) = if yardline_100 <= 10.0 {
        (-1.8, -0.18, 0.45, 0.35)
    } else if yardline_100 <= 20.0 {
        (-1.2, -0.12, 0.38, 0.28)
    } else if yardline_100 <= 40.0 {
        (-0.6, -0.02, 0.28, 0.32)
    } else if yardline_100 <= 60.0 {
        (0.1, 0.08, 0.18, 0.26)
    } else {
        (0.6, 0.12, 0.10, 0.18)
    };
    PuntEstimate {
        epa,
        wpa,
        opp_td_prob,
        opp_fg_prob,
    }
}

/// How much of the punter's nominal range is used, and the hard cap on the
/// distance, by field position. Punts near one's own goal line are shorter
/// and safer.
pub fn punt_distance_band(yardline_100: u32) -> (f64, f64) {
    if yardline_100 <= 10 {
        (0.70, 35.0)
    } else if yardline_100 <= 20 {
        (0.80, 40.0)
    } else if yardline_100 <= 40 {
        (0.90, 45.0)
    } else {
        (0.85, 50.0)
    }
}
