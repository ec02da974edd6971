use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Basic statistics of a categorical column. `top`/`freq` are `None` when
/// the column has no non-null values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoricalStats {
    pub count: u64,
    pub unique: u64,
    pub top: Option<String>,
    pub freq: Option<u64>,
}

/// Counts occurrences of each distinct value, remembering where each value
/// first appeared so the mode is stable under ties.
pub struct FrequencyCounter<'a> {
    map: HashMap<&'a str, (u64, usize)>,
    total: u64,
}

impl<'a> FrequencyCounter<'a> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            total: 0,
        }
    }

    pub fn add(&mut self, val: &'a str) {
        let order = self.map.len();
        self.map.entry(val).or_insert((0, order)).0 += 1;
        self.total += 1;
    }

    pub fn distinct(&self) -> usize {
        self.map.len()
    }

    /// Most frequent value; ties go to the value seen first.
    pub fn mode(&self) -> Option<(&'a str, u64)> {
        self.map
            .iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(v, (c, _))| (*v, *c))
    }

    pub fn finish(self) -> CategoricalStats {
        let mode = self.mode();
        CategoricalStats {
            count: self.total,
            unique: self.distinct() as u64,
            top: mode.map(|(v, _)| v.to_owned()),
            freq: mode.map(|(_, c)| c),
        }
    }
}

impl Default for FrequencyCounter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(values: &[&'static str]) -> CategoricalStats {
        let mut fc = FrequencyCounter::new();
        for v in values {
            fc.add(*v);
        }
        fc.finish()
    }

    #[test]
    fn mode_and_counts() {
        let s = stats(&["a", "b", "a", "a"]);
        assert_eq!(
            s,
            CategoricalStats { count: 4, unique: 2, top: Some("a".into()), freq: Some(3) }
        );
    }

    #[test]
    fn tie_goes_to_first_seen() {
        assert_eq!(stats(&["y", "x", "x", "y"]).top.as_deref(), Some("y"));
        assert_eq!(stats(&["x", "y", "y", "x"]).top.as_deref(), Some("x"));
    }

    #[test]
    fn empty_string_is_a_value() {
        let s = stats(&["", "", "z"]);
        assert_eq!(s.top.as_deref(), Some(""));
        assert_eq!(s.freq, Some(2));
    }

    #[test]
    fn no_values_has_no_mode() {
        let s = stats(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.unique, 0);
        assert!(s.top.is_none());
        assert!(s.freq.is_none());
    }
}
