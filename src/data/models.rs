use serde::{Deserialize, Serialize};

/// One row of `punt_summary.csv`: mean outcomes of punts from a field position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuntSummaryRow {
    /// yardline_100 of the punting team
    pub field_position: f64,
    pub punt_epa: f64,
    pub punt_wpa: f64,
    pub opp_td_prob: f64,
    pub opp_fg_prob: f64,
    /// Share of punts from here that ended in a touchback
    #[serde(default)]
    pub touchback_prob: Option<f64>,
}

/// One row of `fail_epa_wpa_averages.csv`: mean EPA/WPA of failed
/// fourth-down attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailAverageRow {
    pub yardline_100: f64,
    pub ydstogo: f64,
    #[serde(alias = "epa_fail")]
    pub epa: f64,
    #[serde(alias = "wpa_fail")]
    pub wpa: f64,
}

/// One row of `scoreprobability.csv`: next-score probabilities by
/// field position and distance to gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProbabilityRow {
    pub yardline_100: f64,
    pub ydstogo: f64,
    pub td_prob: f64,
    pub fg_prob: f64,
    pub opp_td_prob: f64,
    pub opp_fg_prob: f64,
    pub no_score_prob: f64,
}

/// One row of `opponentscoreprobability.csv`, keyed by the receiving
/// team's starting field position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentScoringRow {
    pub yardline_100: f64,
    pub opp_td_prob: f64,
    pub opp_fg_prob: f64,
}
