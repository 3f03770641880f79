//! Trained-model adapter.
//!
//! The offline pipeline exports a conversion classifier and success-case
//! EPA/WPA regressors as plain coefficient files. This module evaluates them
//! against a [`FeatureVector`] and wraps each metric in an [`Estimator`] that
//! knows which analytic formula answers when the model cannot.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::error::ModelError;
use super::situation::SituationDescriptor;

/// Inputs the models were trained on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub ydstogo: u32,
    pub qtr: u8,
    pub score_differential: i32,
    pub yardline_100: u32,
    pub half_seconds_remaining: u32,
}

impl FeatureVector {
    pub fn from_situation(situation: &SituationDescriptor) -> Self {
        FeatureVector {
            ydstogo: situation.distance_to_gain(),
            qtr: situation.quarter(),
            score_differential: situation.score_differential(),
            yardline_100: situation.yardline_100(),
            half_seconds_remaining: situation.half_seconds_remaining(),
        }
    }

    /// Look a feature up by its training-column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "ydstogo" => Some(self.ydstogo as f64),
            "qtr" => Some(self.qtr as f64),
            "score_differential" => Some(self.score_differential as f64),
            "yardline_100" => Some(self.yardline_100 as f64),
            "half_seconds_remaining" => Some(self.half_seconds_remaining as f64),
            _ => None,
        }
    }
}

/// Anything that turns a feature vector into a scalar prediction.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Logistic,
    Linear,
}

impl ModelKind {
    fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Logistic => "logistic",
            ModelKind::Linear => "linear",
        }
    }
}

/// A linear model in exported form: named features, one coefficient each,
/// and an intercept. `logistic` models pass the linear term through a
/// sigmoid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoefficientModel {
    #[serde(default)]
    pub name: String,
    pub kind: ModelKind,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl CoefficientModel {
    pub fn from_json(name: &str, json: &str) -> serde_json::Result<Self> {
        let mut model: CoefficientModel = serde_json::from_str(json)?;
        if model.name.is_empty() {
            model.name = name.to_string();
        }
        Ok(model)
    }

    fn linear_term(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        if self.coefficients.len() != self.features.len() {
            return Err(ModelError::ShapeMismatch {
                model: self.name.clone(),
                coefficients: self.coefficients.len(),
                features: self.features.len(),
            });
        }
        let mut z = self.intercept;
        for (feature, coef) in self.features.iter().zip(&self.coefficients) {
            let x = features
                .get(feature)
                .ok_or_else(|| ModelError::UnknownFeature {
                    model: self.name.clone(),
                    feature: feature.clone(),
                })?;
            z += coef * x;
        }
        Ok(z)
    }
}

/// Wraps a logistic model; predicts P(conversion).
#[derive(Debug, Clone)]
pub struct Classifier(CoefficientModel);

/// Wraps a linear model; predicts a real-valued EPA or WPA.
#[derive(Debug, Clone)]
pub struct Regressor(CoefficientModel);

impl Classifier {
    pub fn new(model: CoefficientModel) -> Result<Self, ModelError> {
        match model.kind {
            ModelKind::Logistic => Ok(Classifier(model)),
            kind => Err(ModelError::WrongKind {
                model: model.name,
                kind: kind.as_str(),
            }),
        }
    }
}

impl Regressor {
    pub fn new(model: CoefficientModel) -> Result<Self, ModelError> {
        match model.kind {
            ModelKind::Linear => Ok(Regressor(model)),
            kind => Err(ModelError::WrongKind {
                model: model.name,
                kind: kind.as_str(),
            }),
        }
    }
}

impl Predictor for Classifier {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let z = self.0.linear_term(features)?;
        let p = sigmoid(z);
        if !p.is_finite() {
            return Err(ModelError::NonFinite {
                model: self.0.name.clone(),
            });
        }
        Ok(p)
    }

    fn name(&self) -> &str {
        &self.0.name
    }
}

impl Predictor for Regressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let y = self.0.linear_term(features)?;
        if !y.is_finite() {
            return Err(ModelError::NonFinite {
                model: self.0.name.clone(),
            });
        }
        Ok(y)
    }

    fn name(&self) -> &str {
        &self.0.name
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Closed-form stand-in for a model.
pub type AnalyticFn = fn(&FeatureVector) -> f64;

/// Whether a metric is bounded to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Probability,
    Value,
}

/// How a single metric is estimated. Chosen once, when the context is built.
#[derive(Clone)]
pub enum Estimator {
    /// A trained model, with the analytic formula that stands in for it
    /// whenever an invocation fails.
    Trained {
        model: Arc<dyn Predictor>,
        output: Output,
        fallback: AnalyticFn,
    },
    /// No model available: the analytic formula is the estimator.
    Analytic(AnalyticFn),
}

impl fmt::Debug for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Estimator::Trained { model, output, .. } => f
                .debug_struct("Trained")
                .field("model", &model.name())
                .field("output", output)
                .finish(),
            Estimator::Analytic(_) => f.write_str("Analytic"),
        }
    }
}

/// A value plus where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub from_model: bool,
}

impl Estimator {
    pub fn trained(model: Arc<dyn Predictor>, output: Output, fallback: AnalyticFn) -> Self {
        Estimator::Trained {
            model,
            output,
            fallback,
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, Estimator::Trained { .. })
    }

    /// Estimate `metric` for these features. A failed model call is logged
    /// and answered by the analytic formula.
    pub fn estimate(&self, metric: &str, features: &FeatureVector) -> Estimate {
        match self {
            Estimator::Analytic(formula) => Estimate {
                value: formula(features),
                from_model: false,
            },
            Estimator::Trained {
                model,
                output,
                fallback,
            } => match invoke(model.as_ref(), *output, features) {
                Ok(value) => Estimate {
                    value,
                    from_model: true,
                },
                Err(e) => {
                    warn!("{} model failed, using fallback: {}", metric, e);
                    Estimate {
                        value: fallback(features),
                        from_model: false,
                    }
                }
            },
        }
    }
}

fn invoke(model: &dyn Predictor, output: Output, features: &FeatureVector) -> Result<f64, ModelError> {
    let value = model.predict(features)?;
    if !value.is_finite() {
        return Err(ModelError::NonFinite {
            model: model.name().to_string(),
        });
    }
    if output == Output::Probability && !(0.0..=1.0).contains(&value) {
        return Err(ModelError::OutOfRange {
            model: model.name().to_string(),
            value,
        });
    }
    Ok(value)
}
