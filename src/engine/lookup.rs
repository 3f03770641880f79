//! Read-only empirical tables and their nearest-row lookups.

use crate::data::models::{
    FailAverageRow, OpponentScoringRow, PuntSummaryRow, ScoringProbabilityRow,
};

use super::interpolate::EmpiricalTable;

/// Mean EPA/WPA after a failed conversion, by (yardline_100, ydstogo).
#[derive(Debug, Clone, Default)]
pub struct FailAverageTable {
    rows: Vec<FailAverageRow>,
}

impl FailAverageTable {
    pub fn new(rows: Vec<FailAverageRow>) -> Self {
        FailAverageTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact `(yardline_100, ydstogo)` match, else the row nearest in
    /// yardline (then in ydstogo, then first in file order).
    pub fn lookup(&self, yardline_100: f64, ydstogo: f64) -> Option<&FailAverageRow> {
        if let Some(row) = self
            .rows
            .iter()
            .find(|r| r.yardline_100 == yardline_100 && r.ydstogo == ydstogo)
        {
            return Some(row);
        }
        nearest(&self.rows, |r| {
            (
                (r.yardline_100 - yardline_100).abs(),
                (r.ydstogo - ydstogo).abs(),
            )
        })
    }
}

/// Next-score probabilities by (yardline_100, ydstogo).
#[derive(Debug, Clone, Default)]
pub struct ScoringProbabilityTable {
    rows: Vec<ScoringProbabilityRow>,
}

impl ScoringProbabilityTable {
    pub fn new(rows: Vec<ScoringProbabilityRow>) -> Self {
        ScoringProbabilityTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact match, else the row minimising the summed absolute difference
    /// across both keys (first row on ties).
    pub fn lookup(&self, yardline_100: f64, ydstogo: f64) -> Option<&ScoringProbabilityRow> {
        if let Some(row) = self
            .rows
            .iter()
            .find(|r| r.yardline_100 == yardline_100 && r.ydstogo == ydstogo)
        {
            return Some(row);
        }
        nearest(&self.rows, |r| {
            (
                (r.yardline_100 - yardline_100).abs() + (r.ydstogo - ydstogo).abs(),
                0.0,
            )
        })
    }
}

/// The receiving team's scoring chances from where a punt leaves them.
#[derive(Debug, Clone, Default)]
pub struct OpponentScoringTable {
    rows: Vec<OpponentScoringRow>,
}

impl OpponentScoringTable {
    pub fn new(rows: Vec<OpponentScoringRow>) -> Self {
        OpponentScoringTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lookup(&self, yardline_100: f64) -> Option<&OpponentScoringRow> {
        if let Some(row) = self.rows.iter().find(|r| r.yardline_100 == yardline_100) {
            return Some(row);
        }
        nearest(&self.rows, |r| ((r.yardline_100 - yardline_100).abs(), 0.0))
    }
}

/// First row with the smallest `(primary, secondary)` distance.
fn nearest<T>(rows: &[T], distance: impl Fn(&T) -> (f64, f64)) -> Option<&T> {
    let mut best: Option<(&T, (f64, f64))> = None;
    for row in rows {
        let d = distance(row);
        if d.0.is_nan() || d.1.is_nan() {
            continue;
        }
        let closer = match best {
            None => true,
            Some((_, b)) => d.0 < b.0 || (d.0 == b.0 && d.1 < b.1),
        };
        if closer {
            best = Some((row, d));
        }
    }
    best.map(|(row, _)| row)
}

/// One interpolator per punt metric, all keyed by the punting team's
/// yardline_100.
#[derive(Debug, Clone)]
pub struct PuntTables {
    pub epa: EmpiricalTable,
    pub wpa: EmpiricalTable,
    pub opp_td_prob: EmpiricalTable,
    pub opp_fg_prob: EmpiricalTable,
    pub touchback_prob: EmpiricalTable,
}

impl PuntTables {
    pub fn from_rows(rows: &[PuntSummaryRow]) -> Self {
        PuntTables {
            epa: column(rows, "punt_epa", |r| Some(r.punt_epa)),
            wpa: column(rows, "punt_wpa", |r| Some(r.punt_wpa)),
            opp_td_prob: column(rows, "opp_td_prob", |r| Some(r.opp_td_prob)),
            opp_fg_prob: column(rows, "opp_fg_prob", |r| Some(r.opp_fg_prob)),
            touchback_prob: column(rows, "touchback_prob", |r| r.touchback_prob),
        }
    }

    pub fn columns(&self) -> [&EmpiricalTable; 5] {
        [
            &self.epa,
            &self.wpa,
            &self.opp_td_prob,
            &self.opp_fg_prob,
            &self.touchback_prob,
        ]
    }
}

fn column(
    rows: &[PuntSummaryRow],
    name: &str,
    value: impl Fn(&PuntSummaryRow) -> Option<f64>,
) -> EmpiricalTable {
    EmpiricalTable::new(
        name,
        rows.iter()
            .filter_map(|r| value(r).map(|v| (r.field_position, v))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(yl: f64, ytg: f64, epa: f64) -> FailAverageRow {
        FailAverageRow {
            yardline_100: yl,
            ydstogo: ytg,
            epa,
            wpa: epa / 10.0,
        }
    }

    fn scoring(yl: f64, ytg: f64, td: f64) -> ScoringProbabilityRow {
        ScoringProbabilityRow {
            yardline_100: yl,
            ydstogo: ytg,
            td_prob: td,
            fg_prob: 0.2,
            opp_td_prob: 0.1,
            opp_fg_prob: 0.05,
            no_score_prob: 0.3,
        }
    }

    #[test]
    fn fail_average_exact_match_wins() {
        let t = FailAverageTable::new(vec![fail(40.0, 2.0, -1.0), fail(40.0, 3.0, -2.0)]);
        assert_eq!(t.lookup(40.0, 3.0).unwrap().epa, -2.0);
    }

    #[test]
    fn fail_average_nearest_by_yardline_then_distance() {
        let t = FailAverageTable::new(vec![
            fail(30.0, 3.0, -1.0),
            fail(44.0, 9.0, -2.0),
            fail(44.0, 4.0, -3.0),
            fail(47.0, 3.0, -4.0),
        ]);
        // yardline 45: 44 and 47 are 1 and 2 away; between the two 44 rows the
        // one nearer in ydstogo wins.
        assert_eq!(t.lookup(45.0, 3.0).unwrap().epa, -3.0);
        // Yardline distance dominates ydstogo distance.
        assert_eq!(t.lookup(31.0, 10.0).unwrap().epa, -1.0);
    }

    #[test]
    fn fail_average_ties_keep_file_order() {
        let t = FailAverageTable::new(vec![fail(40.0, 3.0, -1.0), fail(50.0, 3.0, -2.0)]);
        assert_eq!(t.lookup(45.0, 3.0).unwrap().epa, -1.0);
        assert!(FailAverageTable::default().lookup(45.0, 3.0).is_none());
    }

    #[test]
    fn scoring_lookup_uses_summed_distance() {
        let t = ScoringProbabilityTable::new(vec![
            scoring(20.0, 10.0, 0.1),
            scoring(25.0, 4.0, 0.2),
            scoring(22.0, 2.0, 0.3),
        ]);
        assert_eq!(t.lookup(25.0, 4.0).unwrap().td_prob, 0.2);
        // (24, 3): distances 11, 2, 3 -> second row.
        assert_eq!(t.lookup(24.0, 3.0).unwrap().td_prob, 0.2);
        // (21, 3): distances 8, 5, 2 -> third row.
        assert_eq!(t.lookup(21.0, 3.0).unwrap().td_prob, 0.3);
        assert!(ScoringProbabilityTable::default().lookup(1.0, 1.0).is_none());
    }

    #[test]
    fn opponent_lookup_handles_fractional_landing_spots() {
        let row = |yl: f64, td: f64| OpponentScoringRow {
            yardline_100: yl,
            opp_td_prob: td,
            opp_fg_prob: 0.1,
        };
        let t = OpponentScoringTable::new(vec![row(10.0, 0.5), row(20.0, 0.4), row(30.0, 0.3)]);
        assert_eq!(t.lookup(20.0).unwrap().opp_td_prob, 0.4);
        assert_eq!(t.lookup(26.5).unwrap().opp_td_prob, 0.3);
        // Exactly between two rows: first wins.
        assert_eq!(t.lookup(15.0).unwrap().opp_td_prob, 0.5);
    }

    #[test]
    fn punt_tables_skip_missing_touchback_values() {
        let rows = vec![
            PuntSummaryRow {
                field_position: 30.0,
                punt_epa: -0.5,
                punt_wpa: -0.02,
                opp_td_prob: 0.3,
                opp_fg_prob: 0.2,
                touchback_prob: Some(0.05),
            },
            PuntSummaryRow {
                field_position: 40.0,
                punt_epa: -0.3,
                punt_wpa: 0.0,
                opp_td_prob: 0.25,
                opp_fg_prob: 0.2,
                touchback_prob: None,
            },
        ];
        let t = PuntTables::from_rows(&rows);
        assert_eq!(t.epa.len(), 2);
        assert_eq!(t.touchback_prob.len(), 1);
        assert_eq!(t.epa.name(), "punt_epa");
    }
}
