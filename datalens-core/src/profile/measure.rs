use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A per-column statistic that may not exist.
///
/// `NotApplicable` means the statistic does not apply to the column's kind
/// (skewness of a categorical column) and serializes as `"not_applicable"`.
/// `Undefined` means the kind is right but there is too little data
/// (skewness of two samples) and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure<T> {
    Value(T),
    NotApplicable(NotApplicableTag),
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotApplicableTag {
    #[serde(rename = "not_applicable")]
    NotApplicable,
}

impl<T> Measure<T> {
    pub fn not_applicable() -> Self {
        Measure::NotApplicable(NotApplicableTag::NotApplicable)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Measure::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Measure::NotApplicable(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Measure::Undefined)
    }
}

impl<T> From<Option<T>> for Measure<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Measure::Undefined, Measure::Value)
    }
}

/// Column name → value, kept in table column order. Serializes as a map.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> ColumnMap<T> {
    pub fn with_capacity(cap: usize) -> Self {
        Self { entries: Vec::with_capacity(cap) }
    }

    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ColumnMap<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> FromIterator<(String, T)> for ColumnMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<T: Serialize> Serialize for ColumnMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ColumnMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ColumnMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for ColumnMapVisitor<T> {
            type Value = ColumnMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map keyed by column name")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, T>()? {
                    entries.push((k, v));
                }
                Ok(ColumnMap { entries })
            }
        }

        deserializer.deserialize_map(ColumnMapVisitor(PhantomData))
    }
}
