use serde::{Deserialize, Serialize};

/// Equal-width histogram: `bins` holds `counts.len() + 1` ascending edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub counts: Vec<u64>,
    pub bins: Vec<f64>,
}

impl Histogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Edge value used for every bin boundary when there is nothing to bin.
pub const EMPTY_EDGE: f64 = 0.0;

/// Buckets `values` into `bins` equal-width bins over [min, max].
///
/// Buckets are half-open `[lo, hi)` except the last, which includes its upper
/// edge. A constant input is widened around its value, by 0.5 or by enough to
/// keep every edge distinct at that magnitude. With no values the counts are
/// all zero and every edge sits at [`EMPTY_EDGE`]. `bins` must be at least 1;
/// the caller validates it.
pub fn build_histogram(values: &[f64], bins: usize) -> Histogram {
    debug_assert!(bins > 0);
    if values.is_empty() {
        return Histogram {
            counts: vec![0; bins],
            bins: vec![EMPTY_EDGE; bins + 1],
        };
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max { widen(min, bins) } else { (min, max) };

    // half of one bucket width; `hi - lo` itself may overflow
    let half_width = (hi * 0.5 - lo * 0.5) / bins as f64;
    let edges = bin_edges(lo, hi, half_width, bins);
    let mut counts = vec![0u64; bins];
    for &v in values {
        let mut idx = ((v * 0.5 - lo * 0.5) / half_width) as usize;
        idx = idx.min(bins - 1);
        // float rounding can land one bucket off near an edge
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx < bins - 1 && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }
    Histogram { counts, bins: edges }
}

fn widen(v: f64, bins: usize) -> (f64, f64) {
    let pad = (v.abs() * f64::EPSILON * bins as f64).max(0.5);
    ((v - pad).max(f64::MIN), (v + pad).min(f64::MAX))
}

fn bin_edges(lo: f64, hi: f64, half_width: f64, bins: usize) -> Vec<f64> {
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| {
            let half = i as f64 * half_width;
            lo + half + half
        })
        .collect();
    edges[bins] = hi;
    edges
}
