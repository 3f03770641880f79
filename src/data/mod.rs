use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::engine::error::ModelError;
use crate::engine::model::{Classifier, CoefficientModel, Regressor};
use crate::engine::{
    EmpiricalTables, EngineContext, FailAverageTable, Fidelity, OpponentScoringTable, Predictor,
    PuntTables, ScoringProbabilityTable, TrainedModels,
};

pub mod models;
use models::*;

// ── File names ───────────────────────────────────────────────────────────────

pub const PUNT_SUMMARY_FILE: &str = "punt_summary.csv";
pub const FAIL_AVERAGES_FILE: &str = "fail_epa_wpa_averages.csv";
pub const SCORING_FILE: &str = "scoreprobability.csv";
pub const OPPONENT_SCORING_FILE: &str = "opponentscoreprobability.csv";

pub const CONVERSION_MODEL_FILE: &str = "go_for_it_model.json";
pub const EPA_SUCCESS_MODEL_FILE: &str = "epa_model_success.json";
pub const WPA_SUCCESS_MODEL_FILE: &str = "wpa_model_success.json";

/// Load every table and model and build the context evaluations run against.
pub fn load_context(data_dir: &Path, models_dir: &Path, fidelity: Fidelity) -> Result<EngineContext> {
    let tables = load_tables(data_dir)?;
    let models = load_models(models_dir);
    Ok(EngineContext::new(tables, models, fidelity))
}

// ── Tables ───────────────────────────────────────────────────────────────────

pub fn load_tables(data_dir: &Path) -> Result<EmpiricalTables> {
    let punt: Vec<PuntSummaryRow> = read_csv(&data_dir.join(PUNT_SUMMARY_FILE))?;
    let fail_averages: Vec<FailAverageRow> = read_csv(&data_dir.join(FAIL_AVERAGES_FILE))?;
    let scoring: Vec<ScoringProbabilityRow> = read_csv(&data_dir.join(SCORING_FILE))?;
    let opponent_scoring: Vec<OpponentScoringRow> =
        read_csv(&data_dir.join(OPPONENT_SCORING_FILE))?;
    info!("{}: {} rows", PUNT_SUMMARY_FILE, punt.len());

    let tables = EmpiricalTables {
        punt: PuntTables::from_rows(&punt),
        fail_averages: FailAverageTable::new(fail_averages),
        scoring: ScoringProbabilityTable::new(scoring),
        opponent_scoring: OpponentScoringTable::new(opponent_scoring),
    };

    for column in tables.punt.columns() {
        if column.len() < 2 {
            warn!(
                "Punt column {} has {} usable points, banded values will be used",
                column.name(),
                column.len()
            );
        }
    }
    info!("{}: {} rows", FAIL_AVERAGES_FILE, tables.fail_averages.len());
    if tables.fail_averages.is_empty() {
        warn!("{} is empty, failed conversions will use banded values", FAIL_AVERAGES_FILE);
    }
    info!("{}: {} rows", SCORING_FILE, tables.scoring.len());
    if tables.scoring.is_empty() {
        warn!("{} is empty, evaluations will be unavailable", SCORING_FILE);
    }
    info!("{}: {} rows", OPPONENT_SCORING_FILE, tables.opponent_scoring.len());
    if tables.opponent_scoring.is_empty() {
        warn!("{} is empty, full-fidelity punts will be unavailable", OPPONENT_SCORING_FILE);
    }

    Ok(tables)
}

/// Read a headed CSV file into rows. Unknown columns are ignored.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        // +2: one-based, after the header.
        let row: T = record
            .with_context(|| format!("Malformed row at line {} of {}", i + 2, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

// ── Models ───────────────────────────────────────────────────────────────────

pub fn load_models(models_dir: &Path) -> TrainedModels {
    TrainedModels {
        conversion: load_model(&models_dir.join(CONVERSION_MODEL_FILE), |m| {
            Classifier::new(m).map(|c| Arc::new(c) as Arc<dyn Predictor>)
        }),
        epa_success: load_model(&models_dir.join(EPA_SUCCESS_MODEL_FILE), |m| {
            Regressor::new(m).map(|r| Arc::new(r) as Arc<dyn Predictor>)
        }),
        wpa_success: load_model(&models_dir.join(WPA_SUCCESS_MODEL_FILE), |m| {
            Regressor::new(m).map(|r| Arc::new(r) as Arc<dyn Predictor>)
        }),
    }
}

/// A model that is missing or cannot be used leaves its metric to the
/// analytic estimator.
fn load_model(
    path: &Path,
    wrap: impl FnOnce(CoefficientModel) -> Result<Arc<dyn Predictor>, ModelError>,
) -> Option<Arc<dyn Predictor>> {
    if !path.exists() {
        warn!("Model file {} not found, using analytic estimator", path.display());
        return None;
    }
    match read_model(path).and_then(|m| wrap(m).map_err(anyhow::Error::from)) {
        Ok(model) => {
            info!("Loaded model {} from {}", model.name(), path.display());
            Some(model)
        }
        Err(e) => {
            warn!("Ignoring model {}: {:#}", path.display(), e);
            None
        }
    }
}

fn read_model(path: &Path) -> Result<CoefficientModel> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model: {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    CoefficientModel::from_json(&name, &json)
        .with_context(|| format!("Failed to parse model: {}", path.display()))
}
