use serde::{Deserialize, Serialize};

/// Basic statistics of a numeric column. Fields are `None` when the column
/// has too few non-null values for the statistic to exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericStats {
    pub count: u64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Collects non-null values, then computes moments in two passes.
pub struct NumericAccumulator {
    values: Vec<f64>,
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub stats: NumericStats,
    /// bias-corrected sample skewness, `None` below 3 samples
    pub skewness: Option<f64>,
    /// bias-corrected excess kurtosis, `None` below 4 samples
    pub kurtosis: Option<f64>,
    pub values: Vec<f64>,
}

impl NumericAccumulator {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            values: Vec::with_capacity(cap),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn add(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
        self.values.push(v);
    }

    pub fn finish(self) -> NumericSummary {
        let n = self.values.len();
        if n == 0 {
            return NumericSummary {
                stats: NumericStats { count: 0, mean: None, std: None, min: None, max: None },
                skewness: None,
                kurtosis: None,
                values: self.values,
            };
        }
        let nf = n as f64;
        // moments are taken on values scaled by a power of two so sums of
        // large finite values cannot overflow; the scaling itself is exact
        let scale = magnitude_scale(self.min.abs().max(self.max.abs()));
        let mean_scaled = self.values.iter().map(|v| v / scale).sum::<f64>() / nf;
        let (mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0);
        for &v in &self.values {
            let d = v / scale - mean_scaled;
            let d2 = d * d;
            s2 += d2;
            s3 += d2 * d;
            s4 += d2 * d2;
        }
        let std = (n >= 2)
            .then(|| (s2 / (nf - 1.0)).sqrt() * scale)
            .filter(|s| s.is_finite());
        NumericSummary {
            stats: NumericStats {
                count: n as u64,
                // clamp guards against the mean drifting outside [min, max] by an ulp
                mean: Some((mean_scaled * scale).clamp(self.min, self.max)),
                std,
                min: Some(self.min),
                max: Some(self.max),
            },
            skewness: sample_skewness(n, s2, s3).filter(|g| g.is_finite()),
            kurtosis: sample_kurtosis(n, s2, s4).filter(|g| g.is_finite()),
            values: self.values,
        }
    }
}

/// Power of two near `max_abs`, so scaled values stay within (-2, 2).
fn magnitude_scale(max_abs: f64) -> f64 {
    if max_abs == 0.0 {
        return 1.0;
    }
    let exp = (max_abs.log2().floor() as i32).clamp(-1000, 1023);
    2f64.powi(exp)
}

impl Default for NumericAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// G1 = sqrt(n(n-1)) / (n-2) * m3 / m2^1.5, from central moment sums.
fn sample_skewness(n: usize, s2: f64, s3: f64) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let m2 = s2 / nf;
    if m2 <= f64::EPSILON * f64::EPSILON {
        return Some(0.0);
    }
    let m3 = s3 / nf;
    let g1 = m3 / m2.powf(1.5);
    Some((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1)
}

/// G2 (excess) = n(n+1)(n-1) S4 / ((n-2)(n-3) S2^2) - 3(n-1)^2 / ((n-2)(n-3)).
fn sample_kurtosis(n: usize, s2: f64, s4: f64) -> Option<f64> {
    if n < 4 {
        return None;
    }
    let nf = n as f64;
    if s2 / nf <= f64::EPSILON * f64::EPSILON {
        return Some(0.0);
    }
    let denom = (nf - 2.0) * (nf - 3.0);
    let num = nf * (nf + 1.0) * (nf - 1.0) * s4;
    Some(num / (denom * s2 * s2) - 3.0 * (nf - 1.0).powi(2) / denom)
}
