use super::model::GraphSnapshot;
use crate::error::ConversionError;
use serde_json::Value;

/// Anything that can be turned into a canonical [`GraphSnapshot`].
///
/// Stored operations, CLI input files and hand-built fixtures all reach the
/// compiler through this trait. Implementations must route node data through
/// the snapshot's deserializer so legacy payloads are migrated and ports are
/// recomputed.
///
/// # Example
///
/// ```rust,no_run
/// use keyweave::prelude::*;
/// use keyweave::error::ConversionError;
///
/// struct StoredGraph { nodes: String, edges: String }
///
/// impl IntoSnapshot for StoredGraph {
///     fn into_snapshot(self) -> std::result::Result<GraphSnapshot, ConversionError> {
///         GraphSnapshot::from_parts(&self.nodes, &self.edges)
///     }
/// }
/// ```
pub trait IntoSnapshot {
    /// Consumes the value and converts it into a snapshot.
    fn into_snapshot(self) -> Result<GraphSnapshot, ConversionError>;
}

impl IntoSnapshot for GraphSnapshot {
    fn into_snapshot(self) -> Result<GraphSnapshot, ConversionError> {
        Ok(self)
    }
}

impl IntoSnapshot for &str {
    fn into_snapshot(self) -> Result<GraphSnapshot, ConversionError> {
        GraphSnapshot::from_json(self)
    }
}

impl IntoSnapshot for Value {
    fn into_snapshot(self) -> Result<GraphSnapshot, ConversionError> {
        serde_json::from_value(self).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }
}
