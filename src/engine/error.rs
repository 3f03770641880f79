use thiserror::Error;

/// Errors surfaced by the decision engine.
///
/// Estimator failures never show up here: they are recovered inside the
/// evaluators. What remains is either a rejected input or a condition no
/// fallback layer could absorb.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Yardline must be between 1 and 50, got {0}")]
    InvalidYardline(i64),

    #[error("team side must be 'own' or 'opponent', got '{0}'")]
    InvalidSide(String),

    #[error("distance to gain must be at least 1, got {0}")]
    InvalidDistance(i64),

    #[error("quarter must be one of 1st/2nd/3rd/4th, got '{0}'")]
    InvalidQuarter(String),

    #[error("degenerate table '{table}': need at least two distinct keys, found {keys}")]
    DegenerateTable { table: String, keys: usize },

    #[error("engine unavailable: {reason}")]
    Unavailable { reason: String },
}

impl EngineError {
    /// True for errors caused by the caller's situation rather than the engine.
    pub fn is_input_error(&self) -> bool {
        match self {
            EngineError::InvalidYardline(_)
            | EngineError::InvalidSide(_)
            | EngineError::InvalidDistance(_)
            | EngineError::InvalidQuarter(_) => true,
            EngineError::DegenerateTable { .. } | EngineError::Unavailable { .. } => false,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        EngineError::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Failures while invoking a trained model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("model '{model}' references unknown feature '{feature}'")]
    UnknownFeature { model: String, feature: String },

    #[error("model '{model}' has {coefficients} coefficients for {features} features")]
    ShapeMismatch {
        model: String,
        coefficients: usize,
        features: usize,
    },

    #[error("model '{model}' is a {kind} model and cannot be used here")]
    WrongKind { model: String, kind: &'static str },

    #[error("model '{model}' produced a non-finite value")]
    NonFinite { model: String },

    #[error("model '{model}' produced probability {value} outside [0, 1]")]
    OutOfRange { model: String, value: f64 },
}
