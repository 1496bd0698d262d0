use crate::error::{ConversionError, ServiceError};
use crate::graph::payload::Rgb;
use crate::graph::{GraphSnapshot, IntoSnapshot};
use serde::{Deserialize, Serialize};

/// An operation as stored by the persistence service.
///
/// Nodes and edges are kept as separate JSON strings holding the raw graph
/// snapshot, never the compiled tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub nodes: String,
    pub edges: String,
    pub owner: i64,
}

impl IntoSnapshot for &OperationRecord {
    fn into_snapshot(self) -> Result<GraphSnapshot, ConversionError> {
        GraphSnapshot::from_parts(&self.nodes, &self.edges)
    }
}

/// Request body for saving a sampled color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavedColor {
    pub user_id: i64,
    pub coordinate: String,
    pub rgb: String,
    pub name: String,
}

/// A parsed sampler reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorReading {
    pub coordinate: String,
    pub rgb: Rgb,
}

impl ColorReading {
    /// Parses `"<coordinate>|<r>,<g>,<b>"`.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let parse_err = |message: &str| ServiceError::SampleParse {
            raw: raw.to_string(),
            message: message.to_string(),
        };
        let (coordinate, rgb) = raw
            .trim()
            .split_once('|')
            .ok_or_else(|| parse_err("missing '|' separator"))?;
        let coordinate = coordinate.trim();
        if coordinate.is_empty() {
            return Err(parse_err("empty coordinate"));
        }
        let rgb = rgb.parse::<Rgb>().map_err(|e| parse_err(&e.to_string()))?;
        Ok(Self {
            coordinate: coordinate.to_string(),
            rgb,
        })
    }
}
