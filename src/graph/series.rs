//! Series groups and series entries of a library graph

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::AttributeMap;

/// Errors raised when converting series groups to and from their stored form
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode series groups: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("failed to decode series groups: {0}")]
    Decoding(#[source] serde_json::Error),
}

/// Aggregation applied across the series of a group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Operator {
    #[default]
    None = 0,
    Average = 1,
    Sum = 2,
}

impl TryFrom<u8> for Operator {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Average),
            2 => Ok(Self::Sum),
            other => Err(format!("unknown operator code {}", other)),
        }
    }
}

impl From<Operator> for u8 {
    fn from(op: Operator) -> Self {
        op as u8
    }
}

/// Consolidation policy used when downsampling points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Consolidate {
    #[default]
    None = 0,
    Average = 1,
    First = 2,
    Last = 3,
    Max = 4,
    Min = 5,
    Sum = 6,
}

impl TryFrom<u8> for Consolidate {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Average),
            2 => Ok(Self::First),
            3 => Ok(Self::Last),
            4 => Ok(Self::Max),
            5 => Ok(Self::Min),
            6 => Ok(Self::Sum),
            other => Err(format!("unknown consolidation code {}", other)),
        }
    }
}

impl From<Consolidate> for u8 {
    fn from(c: Consolidate) -> Self {
        c as u8
    }
}

/// A single time-series reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Display label, may be empty
    #[serde(default)]
    pub name: String,
    pub origin: String,
    pub source: String,
    pub metric: String,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub options: AttributeMap,
}

impl Series {
    /// Create a series from its three identifying coordinates
    pub fn new(
        origin: impl Into<String>,
        source: impl Into<String>,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            source: source.into(),
            metric: metric.into(),
            ..Self::default()
        }
    }

    /// Set the display label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// A series is valid when origin, source and metric are all set
    pub fn is_valid(&self) -> bool {
        !self.origin.is_empty() && !self.source.is_empty() && !self.metric.is_empty()
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Name: {:?}, Origin: {:?}, Source: {:?}, Metric: {:?}}}",
            self.name, self.origin, self.source, self.metric
        )
    }
}

/// A named group of series sharing an aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesGroup {
    pub name: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub consolidate: Consolidate,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub options: AttributeMap,
}

impl SeriesGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_consolidate(mut self, consolidate: Consolidate) -> Self {
        self.consolidate = consolidate;
        self
    }
}

/// Ordered list of series groups, stored as a single JSON text blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesGroups(pub Vec<SeriesGroup>);

impl SeriesGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to the stored JSON form
    pub fn encode(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Encoding)
    }

    /// Parse the stored JSON form
    pub fn decode(data: &str) -> Result<Self, CodecError> {
        serde_json::from_str(data).map_err(CodecError::Decoding)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesGroup> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SeriesGroup> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<SeriesGroup>> for SeriesGroups {
    fn from(groups: Vec<SeriesGroup>) -> Self {
        Self(groups)
    }
}

impl<'a> IntoIterator for &'a SeriesGroups {
    type Item = &'a SeriesGroup;
    type IntoIter = std::slice::Iter<'a, SeriesGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
