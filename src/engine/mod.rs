//! Fourth-down decision metrics.
//!
//! Given a [`SituationDescriptor`], each of the three evaluators (go for it,
//! field goal, punt) independently produces a [`DecisionMetrics`] record, and
//! the recommendation picks the one with the greatest WPA. Everything the
//! evaluators read lives in an immutable [`EngineContext`] built once at
//! start-up, so evaluations can run concurrently without coordination.

pub mod adjust;
pub mod error;
pub mod fallback;
pub mod field_goal;
pub mod go_for_it;
pub mod interpolate;
pub mod lookup;
pub mod model;
pub mod punt;
pub mod recommend;
pub mod situation;

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub use error::EngineError;
pub use lookup::{FailAverageTable, OpponentScoringTable, PuntTables, ScoringProbabilityTable};
pub use model::{Estimator, Output, Predictor};
pub use recommend::Recommendation;
pub use situation::{SituationDescriptor, SituationInput};

/// Which punt and field-goal model variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    /// Blended punt model and the finer field-goal table.
    #[default]
    Full,
    /// Single-pass touchback-weighted punt model and the coarser field-goal
    /// table.
    Simplified,
}

/// The three mutually-exclusive fourth-down choices, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Go,
    FieldGoal,
    Punt,
}

impl Decision {
    /// Lower wins when WPA ties.
    pub fn priority(&self) -> u8 {
        match self {
            Decision::Go => 0,
            Decision::FieldGoal => 1,
            Decision::Punt => 2,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Go => write!(f, "Go"),
            Decision::FieldGoal => write!(f, "FG"),
            Decision::Punt => write!(f, "Punt"),
        }
    }
}

/// Sign convention of a reported percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Reported as-is.
    Positive,
    /// Reported as the negation of its magnitude.
    Negated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbabilityPolarity {
    pub td: Polarity,
    pub fg: Polarity,
    pub no_score: Polarity,
}

/// Decision-specific intermediate values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detail {
    Go {
        /// Adjusted conversion probability, as a fraction.
        conversion_prob: f64,
        epa_success: f64,
        epa_fail: f64,
        wpa_success: f64,
        wpa_fail: f64,
    },
    FieldGoal {
        kick_distance: u32,
        /// Adjusted make probability, as a fraction.
        success_rate: f64,
        in_range: bool,
    },
    Punt {
        actual_distance: f64,
        landing_position: f64,
        /// −(opponent TD + opponent FG) · 100
        score_prob: f64,
        /// WPA · 100
        win_prob: f64,
    },
}

/// Value estimate for one decision.
///
/// Probabilities are percentages; their signs follow `polarity`. `epa` and
/// `wpa` are unscaled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionMetrics {
    pub decision: Decision,
    pub td_prob: f64,
    pub fg_prob: f64,
    pub no_score_prob: f64,
    pub epa: f64,
    pub wpa: f64,
    pub polarity: ProbabilityPolarity,
    /// Sub-metrics answered by an analytic formula in this evaluation.
    pub fallbacks: Vec<&'static str>,
    pub detail: Detail,
}

/// All three decisions plus the pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub situation: SituationDescriptor,
    pub go: DecisionMetrics,
    pub field_goal: DecisionMetrics,
    pub punt: DecisionMetrics,
    pub recommendation: Recommendation,
}

/// Trained models available at start-up; `None` selects the analytic
/// estimator for that metric.
#[derive(Clone, Default)]
pub struct TrainedModels {
    pub conversion: Option<Arc<dyn Predictor>>,
    pub epa_success: Option<Arc<dyn Predictor>>,
    pub wpa_success: Option<Arc<dyn Predictor>>,
}

/// Empirical tables loaded at start-up.
#[derive(Debug, Clone)]
pub struct EmpiricalTables {
    pub punt: PuntTables,
    pub fail_averages: FailAverageTable,
    pub scoring: ScoringProbabilityTable,
    pub opponent_scoring: OpponentScoringTable,
}

/// Which metrics are backed by a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub conversion: bool,
    pub epa_success: bool,
    pub wpa_success: bool,
}

/// Everything an evaluation reads. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub conversion: Estimator,
    pub epa_success: Estimator,
    pub wpa_success: Estimator,
    pub tables: EmpiricalTables,
    pub fidelity: Fidelity,
}

impl EngineContext {
    pub fn new(tables: EmpiricalTables, models: TrainedModels, fidelity: Fidelity) -> Self {
        EngineContext {
            conversion: select(
                models.conversion,
                Output::Probability,
                fallback::conversion_from_features,
            ),
            epa_success: select(
                models.epa_success,
                Output::Value,
                fallback::epa_success_from_features,
            ),
            wpa_success: select(
                models.wpa_success,
                Output::Value,
                fallback::wpa_success_from_features,
            ),
            tables,
            fidelity,
        }
    }

    pub fn model_status(&self) -> ModelStatus {
        ModelStatus {
            conversion: self.conversion.is_trained(),
            epa_success: self.epa_success.is_trained(),
            wpa_success: self.wpa_success.is_trained(),
        }
    }
}

fn select(model: Option<Arc<dyn Predictor>>, output: Output, formula: model::AnalyticFn) -> Estimator {
    match model {
        Some(model) => Estimator::trained(model, output, formula),
        None => Estimator::Analytic(formula),
    }
}

/// Evaluate all three decisions and recommend one.
pub fn evaluate(
    context: &EngineContext,
    situation: &SituationDescriptor,
) -> Result<Evaluation, EngineError> {
    let go = go_for_it::evaluate(context, situation)?;
    let field_goal = field_goal::evaluate(context, situation);
    let punt = punt::evaluate(context, situation)?;
    let recommendation = recommend::recommend(&[&go, &field_goal, &punt])?;

    debug!(
        "yardline_100={} ydstogo={} clock={} -> {} (wpa {:.3})",
        situation.yardline_100(),
        situation.distance_to_gain(),
        situation.clock_seconds_remaining(),
        recommendation.decision,
        recommendation.wpa
    );

    Ok(Evaluation {
        situation: *situation,
        go,
        field_goal,
        punt,
        recommendation,
    })
}

/// Validate caller input and evaluate.
pub fn evaluate_input(
    context: &EngineContext,
    input: &SituationInput,
) -> Result<Evaluation, EngineError> {
    let situation = SituationDescriptor::from_input(input)?;
    evaluate(context, &situation)
}
