//! Observation records ingested from an external source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single point of the observed scalar series.
///
/// `time` must be non-decreasing across a stream. This is a caller
/// precondition; nothing downstream checks it.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Observation {
    /// Observation timestamp (any monotone numeric clock)
    pub time: f64,
    /// Observed value of the tracked quantity
    #[serde(alias = "dove_location")]
    pub location: f64,
    /// Source-specific fields, carried through untouched
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub aux: Map<String, Value>,
}

impl Observation {
    /// Create an observation with no auxiliary fields.
    pub fn new(time: f64, location: f64) -> Self {
        Self {
            time,
            location,
            aux: Map::new(),
        }
    }

    /// Attach an auxiliary field.
    pub fn with_aux(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.aux.insert(key.into(), value.into());
        self
    }
}
