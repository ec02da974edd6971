use super::frequency::{CategoricalStats, FrequencyCounter};
use super::histogram::{build_histogram, Histogram};
use super::measure::Measure;
use super::numeric::{NumericAccumulator, NumericStats};
use crate::table::{Column, ColumnKind, ColumnValues};
use datalens_common::{DatalensError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Basic statistics, shaped by the column's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BasicStats {
    Numeric(NumericStats),
    Categorical(CategoricalStats),
}

impl BasicStats {
    pub fn count(&self) -> u64 {
        match self {
            BasicStats::Numeric(s) => s.count,
            BasicStats::Categorical(s) => s.count,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericStats> {
        match self {
            BasicStats::Numeric(s) => Some(s),
            BasicStats::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalStats> {
        match self {
            BasicStats::Categorical(s) => Some(s),
            BasicStats::Numeric(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub null_count: u64,
    pub null_rate: f64,
    pub histogram: Measure<Histogram>,
    pub skewness: Measure<f64>,
    pub kurtosis: Measure<f64>,
    pub basic_stats: BasicStats,
}

/// Profiles one column. `hist_bins` must already be validated (>= 1).
pub fn profile_column(col: &Column, hist_bins: usize, row_count: usize) -> Result<ColumnProfile> {
    debug!(column = col.name(), kind = ?col.kind(), "profiling column");
    let null_count = col.values().null_count();
    let null_rate = if row_count == 0 {
        0.0
    } else {
        null_count as f64 / row_count as f64
    };

    let (histogram, skewness, kurtosis, basic_stats) = match col.values() {
        ColumnValues::Numeric(values) => {
            let mut acc = NumericAccumulator::with_capacity(values.len() - null_count);
            for (row, v) in values.iter().enumerate() {
                let Some(v) = *v else { continue };
                if !v.is_finite() {
                    return Err(DatalensError::data_validation(
                        col.name(),
                        format!("value {v} at row {row} cannot be compared numerically"),
                    ));
                }
                acc.add(v);
            }
            let summary = acc.finish();
            (
                Measure::Value(build_histogram(&summary.values, hist_bins)),
                Measure::from(summary.skewness),
                Measure::from(summary.kurtosis),
                BasicStats::Numeric(summary.stats),
            )
        }
        ColumnValues::Categorical(values) => {
            let mut freq = FrequencyCounter::new();
            for v in values.iter().flatten() {
                freq.add(v);
            }
            (
                Measure::not_applicable(),
                Measure::not_applicable(),
                Measure::not_applicable(),
                BasicStats::Categorical(freq.finish()),
            )
        }
    };

    Ok(ColumnProfile {
        name: col.name().to_owned(),
        dtype: col.dtype().to_owned(),
        kind: col.kind(),
        null_count: null_count as u64,
        null_rate,
        histogram,
        skewness,
        kurtosis,
        basic_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_column_with_null() {
        let col = Column::numeric("age", vec![Some(10.0), Some(20.0), None, Some(40.0)]);
        let p = profile_column(&col, 2, 4).unwrap();
        assert_eq!(p.null_count, 1);
        assert_eq!(p.null_rate, 0.25);
        assert_eq!(p.basic_stats.count(), 3);
        let h = p.histogram.value().unwrap();
        assert_eq!(h.counts.iter().sum::<u64>(), 3);
        assert_eq!(h.bins, vec![10.0, 25.0, 40.0]);
        assert!(p.skewness.value().is_some());
        assert!(p.kurtosis.is_undefined());
    }

    #[test]
    fn categorical_column_marks_numeric_stats_not_applicable() {
        let col = Column::categorical(
            "category",
            ["a", "b", "a", "a"].iter().map(|s| Some(s.to_string())).collect(),
        );
        let p = profile_column(&col, 10, 4).unwrap();
        assert!(p.histogram.is_not_applicable());
        assert!(p.skewness.is_not_applicable());
        assert!(p.kurtosis.is_not_applicable());
        let s = p.basic_stats.as_categorical().unwrap();
        assert_eq!(s.top.as_deref(), Some("a"));
        assert_eq!(s.freq, Some(3));
    }

    #[test]
    fn all_null_numeric_is_degenerate_not_fault() {
        let col = Column::numeric("x", vec![None, None]);
        let p = profile_column(&col, 4, 2).unwrap();
        assert_eq!(p.null_rate, 1.0);
        let stats = p.basic_stats.as_numeric().unwrap();
        assert_eq!(stats.count, 0);
        assert!(stats.std.is_none());
        assert_eq!(p.histogram.value().unwrap().counts, vec![0, 0, 0, 0]);
        assert!(p.skewness.is_undefined());
    }

    #[test]
    fn all_null_categorical_has_no_top() {
        let col = Column::categorical("c", vec![None, None, None]);
        let s = profile_column(&col, 10, 3).unwrap();
        let s = s.basic_stats.as_categorical().unwrap();
        assert_eq!(s.count, 0);
        assert!(s.top.is_none());
        assert!(s.freq.is_none());
    }

    #[test]
    fn nan_in_numeric_column_is_rejected() {
        let col = Column::numeric("bad", vec![Some(1.0), Some(f64::NAN)]);
        match profile_column(&col, 10, 2).unwrap_err() {
            DatalensError::DataValidation { column, reason } => {
                assert_eq!(column, "bad");
                assert!(reason.contains("row 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_rows_has_zero_null_rate() {
        let col = Column::numeric("empty", Vec::new());
        let p = profile_column(&col, 3, 0).unwrap();
        assert_eq!(p.null_rate, 0.0);
        assert_eq!(p.histogram.value().unwrap().counts.len(), 3);
    }
}
