use super::column::{BasicStats, ColumnProfile};
use super::histogram::Histogram;
use super::measure::{ColumnMap, Measure};
use serde::{Deserialize, Serialize};

/// Statistical profile of a whole table.
///
/// Every name in `columns` has an entry in each per-column map, in the same
/// order as `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub shape: (usize, usize),
    pub columns: Vec<String>,
    pub data_types: ColumnMap<String>,
    pub null_values: ColumnMap<u64>,
    pub null_rate: ColumnMap<f64>,
    pub histogram: ColumnMap<Measure<Histogram>>,
    pub skewness: ColumnMap<Measure<f64>>,
    pub kurtosis: ColumnMap<Measure<f64>>,
    pub basic_stats: ColumnMap<BasicStats>,
}

/// One flattened line per column, for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub column: String,
    pub data_type: String,
    pub null_values: u64,
    pub null_rate: f64,
    pub count: u64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unique: Option<u64>,
    pub top: Option<String>,
    pub freq: Option<u64>,
}

impl Profile {
    pub fn from_columns(row_count: usize, columns: Vec<ColumnProfile>) -> Self {
        let n = columns.len();
        let mut profile = Profile {
            shape: (row_count, n),
            columns: Vec::with_capacity(n),
            data_types: ColumnMap::with_capacity(n),
            null_values: ColumnMap::with_capacity(n),
            null_rate: ColumnMap::with_capacity(n),
            histogram: ColumnMap::with_capacity(n),
            skewness: ColumnMap::with_capacity(n),
            kurtosis: ColumnMap::with_capacity(n),
            basic_stats: ColumnMap::with_capacity(n),
        };
        for c in columns {
            profile.columns.push(c.name.clone());
            profile.data_types.push(c.name.clone(), c.dtype);
            profile.null_values.push(c.name.clone(), c.null_count);
            profile.null_rate.push(c.name.clone(), c.null_rate);
            profile.histogram.push(c.name.clone(), c.histogram);
            profile.skewness.push(c.name.clone(), c.skewness);
            profile.kurtosis.push(c.name.clone(), c.kurtosis);
            profile.basic_stats.push(c.name, c.basic_stats);
        }
        profile
    }

    pub fn row_count(&self) -> usize {
        self.shape.0
    }

    pub fn column_count(&self) -> usize {
        self.shape.1
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.columns
            .iter()
            .map(|name| {
                let mut row = SummaryRow {
                    column: name.clone(),
                    data_type: self.data_types.get(name).cloned().unwrap_or_default(),
                    null_values: self.null_values.get(name).copied().unwrap_or(0),
                    null_rate: self.null_rate.get(name).copied().unwrap_or(0.0),
                    count: 0,
                    mean: None,
                    std: None,
                    min: None,
                    max: None,
                    unique: None,
                    top: None,
                    freq: None,
                };
                match self.basic_stats.get(name) {
                    Some(BasicStats::Numeric(s)) => {
                        row.count = s.count;
                        row.mean = s.mean;
                        row.std = s.std;
                        row.min = s.min;
                        row.max = s.max;
                    }
                    Some(BasicStats::Categorical(s)) => {
                        row.count = s.count;
                        row.unique = Some(s.unique);
                        row.top = s.top.clone();
                        row.freq = s.freq;
                    }
                    None => {}
                }
                row
            })
            .collect()
    }
}
