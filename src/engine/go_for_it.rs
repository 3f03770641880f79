//! Go-for-it: convert with probability p, otherwise turn it over on downs.

use tracing::warn;

use super::adjust::adjust_probability;
use super::fallback::{go_epa_bands, go_wpa_bands};
use super::model::FeatureVector;
use super::situation::SituationDescriptor;
use super::{
    Decision, DecisionMetrics, Detail, EngineContext, EngineError, Polarity, ProbabilityPolarity,
};

const POLARITY: ProbabilityPolarity = ProbabilityPolarity {
    td: Polarity::Positive,
    fg: Polarity::Positive,
    no_score: Polarity::Negated,
};

pub fn evaluate(
    context: &EngineContext,
    situation: &SituationDescriptor,
) -> Result<DecisionMetrics, EngineError> {
    let features = FeatureVector::from_situation(situation);
    let yl = situation.yardline_100();
    let ytg = situation.distance_to_gain();
    let mut fallbacks = Vec::new();

    let conversion = context.conversion.estimate("conversion_prob", &features);
    if !conversion.from_model {
        fallbacks.push("conversion_prob");
    }
    let p = adjust_probability(conversion.value, situation.timing());

    let epa_success = context.epa_success.estimate("epa_success", &features);
    if !epa_success.from_model {
        fallbacks.push("epa_success");
    }
    let wpa_success = context.wpa_success.estimate("wpa_success", &features);
    if !wpa_success.from_model {
        fallbacks.push("wpa_success");
    }

    let (epa_fail, wpa_fail) = match context.tables.fail_averages.lookup(yl as f64, ytg as f64) {
        Some(row) => (row.epa, row.wpa),
        None => {
            warn!("Fail-average table is empty, using banded failure values");
            fallbacks.push("epa_fail");
            fallbacks.push("wpa_fail");
            (
                go_epa_bands(yl).1,
                go_wpa_bands(yl, situation.score_differential()).1,
            )
        }
    };

    let scoring = context
        .tables
        .scoring
        .lookup(yl as f64, ytg as f64)
        .ok_or_else(|| EngineError::unavailable("scoring probability table has no rows"))?;

    Ok(DecisionMetrics {
        decision: Decision::Go,
        td_prob: p * scoring.td_prob * 100.0,
        fg_prob: p * scoring.fg_prob * 100.0,
        no_score_prob: -(1.0 - p) * 100.0,
        epa: p * epa_success.value + (1.0 - p) * epa_fail,
        wpa: p * wpa_success.value + (1.0 - p) * wpa_fail,
        polarity: POLARITY,
        fallbacks,
        detail: Detail::Go {
            conversion_prob: p,
            epa_success: epa_success.value,
            epa_fail,
            wpa_success: wpa_success.value,
            wpa_fail,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::ModelError;
    use crate::engine::test_support::*;
    use crate::engine::{EngineContext, Fidelity, Predictor, TrainedModels};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    struct Fixed(f64);

    impl Predictor for Fixed {
        fn predict(&self, _: &FeatureVector) -> Result<f64, ModelError> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn detail(m: &DecisionMetrics) -> (f64, f64, f64, f64, f64) {
        match m.detail {
            Detail::Go {
                conversion_prob,
                epa_success,
                epa_fail,
                wpa_success,
                wpa_fail,
            } => (conversion_prob, epa_success, epa_fail, wpa_success, wpa_fail),
            _ => panic!("go detail expected"),
        }
    }

    #[test]
    fn blends_success_and_failure_by_conversion_probability() {
        // Own 40, 4th-and-4, 8:00 left, tied: no situational scaling.
        let m = evaluate(&context(), &situation(&input())).unwrap();
        let (p, es, ef, ws, wf) = detail(&m);
        assert_relative_eq!(p, 0.52);
        assert_relative_eq!(es, 1.6);
        assert_relative_eq!(ef, -1.6);
        assert_relative_eq!(ws, 0.5 * 14.0);
        assert_relative_eq!(wf, -0.08);
        assert_relative_eq!(m.epa, p * es + (1.0 - p) * ef, epsilon = 1e-12);
        assert_relative_eq!(m.wpa, p * ws + (1.0 - p) * wf, epsilon = 1e-12);
        assert_relative_eq!(m.td_prob, 0.52 * 0.20 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(m.fg_prob, 0.52 * 0.15 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(m.no_score_prob, -48.0, epsilon = 1e-9);
        assert_eq!(m.polarity.no_score, Polarity::Negated);
        assert_eq!(
            m.fallbacks,
            vec!["conversion_prob", "epa_success", "wpa_success"]
        );
    }

    #[test]
    fn trained_models_are_used_when_present() {
        let models = TrainedModels {
            conversion: Some(Arc::new(Fixed(0.4))),
            epa_success: Some(Arc::new(Fixed(2.5))),
            wpa_success: Some(Arc::new(Fixed(0.06))),
        };
        let ctx = EngineContext::new(tables(), models, Fidelity::Full);
        let m = evaluate(&ctx, &situation(&input())).unwrap();
        let (p, es, _, ws, _) = detail(&m);
        assert_relative_eq!(p, 0.4);
        assert_relative_eq!(es, 2.5);
        assert_relative_eq!(ws, 0.06);
        assert!(m.fallbacks.is_empty());
    }

    #[test]
    fn out_of_range_model_output_falls_back_to_formula() {
        let models = TrainedModels {
            conversion: Some(Arc::new(Fixed(f64::INFINITY))),
            ..TrainedModels::default()
        };
        let ctx = EngineContext::new(tables(), models, Fidelity::Full);
        let m = evaluate(&ctx, &situation(&input())).unwrap();
        assert_relative_eq!(detail(&m).0, 0.52);
        assert!(m.fallbacks.contains(&"conversion_prob"));
    }

    #[test]
    fn empty_fail_table_uses_bands() {
        let mut t = tables();
        t.fail_averages = Default::default();
        let ctx = EngineContext::new(t, TrainedModels::default(), Fidelity::Full);
        let m = evaluate(&ctx, &situation(&input())).unwrap();
        let (_, _, ef, _, wf) = detail(&m);
        assert_relative_eq!(ef, -1.2);
        assert_relative_eq!(wf, -0.5 * 14.0);
        assert!(m.fallbacks.contains(&"epa_fail"));
        assert!(m.fallbacks.contains(&"wpa_fail"));
    }

    #[test]
    fn conversion_probability_is_bounded() {
        let ctx = context();
        let mut i = input();
        for ytg in [1, 2, 5, 10, 25] {
            for (q, clock, diff) in [(4, "1:00", -3), (4, "1:00", 14), (2, "1:30", -1), (1, "15:00", 0)] {
                i.distance_to_gain = ytg;
                i.quarter = q.to_string();
                i.clock = clock.into();
                i.score_differential = diff;
                let p = detail(&evaluate(&ctx, &situation(&i)).unwrap()).0;
                assert!((0.05..=0.95).contains(&p), "ytg={ytg} q={q} p={p}");
            }
        }
    }
}
