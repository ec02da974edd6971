pub mod column;
pub mod frequency;
pub mod histogram;
pub mod measure;
pub mod numeric;
pub mod report;

pub use column::{profile_column, BasicStats, ColumnProfile};
pub use frequency::CategoricalStats;
pub use histogram::{build_histogram, Histogram};
pub use measure::{ColumnMap, Measure};
pub use numeric::NumericStats;
pub use report::{Profile, SummaryRow};

use crate::table::Table;
use datalens_common::{DatalensError, ProfilingConfig, Result};
use rayon::prelude::*;
use tracing::debug;

pub const DEFAULT_HIST_BINS: usize = 10;

#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub hist_bins: usize,
    /// profile columns on the rayon pool; output order is unaffected
    pub parallel: bool,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            hist_bins: DEFAULT_HIST_BINS,
            parallel: true,
        }
    }
}

impl From<&ProfilingConfig> for ProfileOptions {
    fn from(cfg: &ProfilingConfig) -> Self {
        Self {
            hist_bins: cfg.histogram_bins,
            parallel: cfg.parallel_columns,
        }
    }
}

/// Profiles `table` with `hist_bins` histogram buckets per numeric column.
pub fn profile(table: &Table, hist_bins: usize) -> Result<Profile> {
    profile_with(
        table,
        &ProfileOptions {
            hist_bins,
            ..ProfileOptions::default()
        },
    )
}

pub fn profile_with(table: &Table, opts: &ProfileOptions) -> Result<Profile> {
    let columns = profile_columns(table, opts)?;
    debug!(
        rows = table.row_count(),
        columns = columns.len(),
        "table profiled"
    );
    Ok(Profile::from_columns(table.row_count(), columns))
}

/// Per-column profiles in table order. Rejects `hist_bins == 0` before any work.
pub fn profile_columns(table: &Table, opts: &ProfileOptions) -> Result<Vec<ColumnProfile>> {
    if opts.hist_bins == 0 {
        return Err(DatalensError::invalid_argument(
            "hist_bins",
            "must be at least 1, got 0",
        ));
    }
    let rows = table.row_count();
    let results: Vec<Result<ColumnProfile>> = if opts.parallel {
        table
            .columns()
            .par_iter()
            .map(|c| profile_column(c, opts.hist_bins, rows))
            .collect()
    } else {
        table
            .columns()
            .iter()
            .map(|c| profile_column(c, opts.hist_bins, rows))
            .collect()
    };
    // first failing column in table order, regardless of completion order
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::numeric("age", vec![Some(10.0), Some(20.0), None, Some(40.0)]).with_dtype("int64"),
            Column::categorical(
                "category",
                ["a", "b", "a", "a"].iter().map(|s| Some(s.to_string())).collect(),
            ),
            Column::numeric("score", vec![Some(1.5), Some(2.5), Some(2.5), Some(9.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn shape_and_column_order() {
        let p = profile(&sample_table(), 2).unwrap();
        assert_eq!(p.shape, (4, 3));
        assert_eq!(p.columns, vec!["age", "category", "score"]);
        for map_keys in [
            p.data_types.keys().collect::<Vec<_>>(),
            p.null_values.keys().collect(),
            p.null_rate.keys().collect(),
            p.histogram.keys().collect(),
            p.skewness.keys().collect(),
            p.kurtosis.keys().collect(),
            p.basic_stats.keys().collect(),
        ] {
            assert_eq!(map_keys, vec!["age", "category", "score"]);
        }
    }

    #[test]
    fn age_example() {
        let p = profile(&sample_table(), 2).unwrap();
        assert_eq!(p.null_values.get("age"), Some(&1));
        assert_eq!(p.null_rate.get("age"), Some(&0.25));
        assert_eq!(p.data_types.get("age").map(String::as_str), Some("int64"));
        let stats = p.basic_stats.get("age").and_then(BasicStats::as_numeric).unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean.unwrap() - 23.333333333333332).abs() < 1e-9);
        let h = p.histogram.get("age").and_then(Measure::value).unwrap();
        assert_eq!(h.counts.len(), 2);
        assert_eq!(h.counts.iter().sum::<u64>(), 3);
        assert_eq!(h.bins.first(), Some(&10.0));
        assert_eq!(h.bins.last(), Some(&40.0));
    }

    #[test]
    fn category_example() {
        let p = profile(&sample_table(), 10).unwrap();
        assert_eq!(
            p.basic_stats.get("category"),
            Some(&BasicStats::Categorical(CategoricalStats {
                count: 4,
                unique: 2,
                top: Some("a".into()),
                freq: Some(3),
            }))
        );
        assert!(p.skewness.get("category").unwrap().is_not_applicable());
        assert_eq!(p.data_types.get("category").map(String::as_str), Some("object"));
    }

    #[test]
    fn zero_bins_is_invalid_argument() {
        let err = profile(&sample_table(), 0).unwrap_err();
        assert!(matches!(err, DatalensError::InvalidArgument { name: "hist_bins", .. }));
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let t = sample_table();
        let par = profile_with(&t, &ProfileOptions { hist_bins: 3, parallel: true }).unwrap();
        let seq = profile_with(&t, &ProfileOptions { hist_bins: 3, parallel: false }).unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn idempotent() {
        let t = sample_table();
        assert_eq!(profile(&t, 5).unwrap(), profile(&t, 5).unwrap());
    }

    #[test]
    fn first_invalid_column_in_table_order_is_reported() {
        let t = Table::new(vec![
            Column::numeric("ok", vec![Some(1.0), Some(2.0)]),
            Column::numeric("first_bad", vec![Some(f64::INFINITY), Some(2.0)]),
            Column::numeric("second_bad", vec![Some(f64::NAN), Some(2.0)]),
        ])
        .unwrap();
        for parallel in [true, false] {
            let err = profile_with(&t, &ProfileOptions { hist_bins: 2, parallel }).unwrap_err();
            assert!(matches!(err, DatalensError::DataValidation { ref column, .. } if column == "first_bad"));
        }
    }

    #[test]
    fn empty_table() {
        let p = profile(&Table::new(Vec::new()).unwrap(), 10).unwrap();
        assert_eq!(p.shape, (0, 0));
        assert!(p.columns.is_empty());
        assert!(p.basic_stats.is_empty());
    }

    #[test]
    fn summary_rows_flatten_both_kinds() {
        let rows = profile(&sample_table(), 2).unwrap().summary_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].column, "age");
        assert_eq!(rows[0].null_values, 1);
        assert!(rows[0].unique.is_none());
        assert_eq!(rows[1].top.as_deref(), Some("a"));
        assert!(rows[1].mean.is_none());
    }

    #[test]
    fn json_uses_markers() {
        let p = profile(&sample_table(), 2).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["shape"], serde_json::json!([4, 3]));
        assert_eq!(v["skewness"]["category"], "not_applicable");
        assert_eq!(v["kurtosis"]["age"], serde_json::Value::Null);
        assert_eq!(v["basic_stats"]["category"]["top"], "a");
        let back: Profile = serde_json::from_value(v).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn extreme_finite_values_profile_and_round_trip() {
        let t = Table::new(vec![Column::numeric("x", vec![Some(-1e308), Some(0.0), Some(1e308)])]).unwrap();
        let p = profile(&t, 2).unwrap();
        let h = p.histogram.get("x").and_then(Measure::value).unwrap();
        assert!(h.bins.iter().all(|e| e.is_finite()), "{:?}", h.bins);
        assert!(h.bins.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(h.counts, vec![1, 2]);
        let stats = p.basic_stats.get("x").and_then(BasicStats::as_numeric).unwrap();
        assert_eq!(stats.mean, Some(0.0));

        let json = serde_json::to_string(&p).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
