use serde::Serialize;

use super::{Decision, DecisionMetrics, EngineError};

/// The chosen decision and the WPA it was chosen on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub decision: Decision,
    pub wpa: f64,
}

/// WPA is compared at two decimal places so sub-noise differences do not
/// decide the call.
fn rounded(wpa: f64) -> f64 {
    (wpa * 100.0).round() / 100.0
}

/// Pick the candidate with the greatest WPA. Ties go to Go, then field
/// goal, then punt. Candidates with a non-finite WPA are skipped.
pub fn recommend(candidates: &[&DecisionMetrics]) -> Result<Recommendation, EngineError> {
    let mut best: Option<(&DecisionMetrics, f64)> = None;
    for &candidate in candidates {
        if !candidate.wpa.is_finite() {
            continue;
        }
        let score = rounded(candidate.wpa);
        let better = match best {
            None => true,
            Some((current, current_score)) => {
                score > current_score
                    || (score == current_score
                        && candidate.decision.priority() < current.decision.priority())
            }
        };
        if better {
            best = Some((candidate, score));
        }
    }

    best.map(|(m, _)| Recommendation {
        decision: m.decision,
        wpa: m.wpa,
    })
    .ok_or_else(|| EngineError::unavailable("no decision has a finite WPA"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Detail, Polarity, ProbabilityPolarity};

    fn metrics(decision: Decision, wpa: f64) -> DecisionMetrics {
        DecisionMetrics {
            decision,
            td_prob: 0.0,
            fg_prob: 0.0,
            no_score_prob: 0.0,
            epa: 0.0,
            wpa,
            polarity: ProbabilityPolarity {
                td: Polarity::Positive,
                fg: Polarity::Positive,
                no_score: Polarity::Positive,
            },
            fallbacks: Vec::new(),
            detail: Detail::FieldGoal {
                kick_distance: 0,
                success_rate: 0.0,
                in_range: false,
            },
        }
    }

    #[test]
    fn highest_wpa_wins() {
        let go = metrics(Decision::Go, 0.02);
        let fg = metrics(Decision::FieldGoal, 0.09);
        let punt = metrics(Decision::Punt, -0.01);
        let rec = recommend(&[&go, &fg, &punt]).unwrap();
        assert_eq!(rec.decision, Decision::FieldGoal);
        assert_eq!(rec.wpa, 0.09);
    }

    #[test]
    fn exact_tie_goes_for_it() {
        let go = metrics(Decision::Go, 0.05);
        let fg = metrics(Decision::FieldGoal, 0.05);
        let punt = metrics(Decision::Punt, 0.05);
        assert_eq!(recommend(&[&punt, &fg, &go]).unwrap().decision, Decision::Go);
        assert_eq!(recommend(&[&punt, &fg]).unwrap().decision, Decision::FieldGoal);
    }

    #[test]
    fn differences_below_rounding_tie() {
        let go = metrics(Decision::Go, 0.0501);
        let punt = metrics(Decision::Punt, 0.0504);
        let rec = recommend(&[&go, &punt]).unwrap();
        assert_eq!(rec.decision, Decision::Go);
        assert_eq!(rec.wpa, 0.0501);
    }

    #[test]
    fn go_and_field_goal_near_tie() {
        let go = metrics(Decision::Go, 0.0501);
        let fg = metrics(Decision::FieldGoal, 0.0504);
        assert_eq!(recommend(&[&fg, &go]).unwrap().decision, Decision::Go);

        // A full hundredth apart after rounding: the kick wins.
        let go = metrics(Decision::Go, 0.0449);
        let rec = recommend(&[&go, &fg]).unwrap();
        assert_eq!(rec.decision, Decision::FieldGoal);
        assert_eq!(rec.wpa, 0.0504);

        // The kick still outranks a punt it only trails below rounding.
        let fg = metrics(Decision::FieldGoal, 0.0501);
        let punt = metrics(Decision::Punt, 0.0504);
        assert_eq!(recommend(&[&go, &punt, &fg]).unwrap().decision, Decision::FieldGoal);
    }

    #[test]
    fn non_finite_candidates_are_skipped() {
        let go = metrics(Decision::Go, f64::NAN);
        let fg = metrics(Decision::FieldGoal, -5.0);
        let punt = metrics(Decision::Punt, -0.2);
        assert_eq!(recommend(&[&go, &fg, &punt]).unwrap().decision, Decision::Punt);

        let fg = metrics(Decision::FieldGoal, f64::INFINITY);
        assert!(matches!(
            recommend(&[&go, &fg]),
            Err(EngineError::Unavailable { .. })
        ));
    }
}
