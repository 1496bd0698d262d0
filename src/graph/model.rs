use super::legacy;
use super::payload::Payload;
use super::ports::{PortId, PortSet, ports_for};
use crate::error::ConversionError;
use serde::{Deserialize, Serialize};

pub type NodeId = String;
pub type EdgeId = String;

/// The shape hint every node is drawn with unless a persisted one says otherwise.
pub const DEFAULT_SHAPE: &str = "rect";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 80.0,
            height: 36.0,
        }
    }
}

/// A placed graph vertex. `label` and `ports` are always derived from `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "legacy::PersistedNode")]
pub struct Node {
    pub id: NodeId,
    pub shape: String,
    pub position: Position,
    pub size: Size,
    pub label: String,
    pub ports: PortSet,
    #[serde(rename = "data")]
    pub payload: Payload,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, payload: Payload, position: Position, size: Size) -> Self {
        Self {
            id: id.into(),
            shape: DEFAULT_SHAPE.to_string(),
            position,
            size,
            label: payload.label(),
            ports: ports_for(&payload),
            payload,
        }
    }

    /// Replaces the payload and regenerates the derived label and ports.
    pub fn set_payload(&mut self, payload: Payload) {
        self.label = payload.label();
        self.ports = ports_for(&payload);
        self.payload = payload;
    }

    pub fn has_port(&self, port: PortId) -> bool {
        self.ports.contains(port)
    }

    pub fn swatch(&self) -> Option<String> {
        self.payload.swatch()
    }
}

/// One end of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub node_id: NodeId,
    pub port_id: PortId,
}

impl Endpoint {
    pub fn new(node_id: impl Into<NodeId>, port_id: PortId) -> Self {
        Self {
            node_id: node_id.into(),
            port_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "legacy::PersistedEdge")]
pub struct Edge {
    pub id: EdgeId,
    pub source: Endpoint,
    pub target: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// True when both edges connect the same ports of the same nodes.
    pub fn same_connection(&self, source: &Endpoint, target: &Endpoint) -> bool {
        self.source == *source && self.target == *target
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source.node_id == node_id || self.target.node_id == node_id
    }
}

/// The canonical serializable form of a graph, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parses a `{nodes, edges}` document. Legacy untagged node data is migrated on the way in.
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }

    /// Parses the separately stored node and edge arrays of an operation record.
    pub fn from_parts(nodes_json: &str, edges_json: &str) -> Result<Self, ConversionError> {
        let nodes = serde_json::from_str(nodes_json)
            .map_err(|e| ConversionError::JsonParseError(format!("nodes: {}", e)))?;
        let edges = serde_json::from_str(edges_json)
            .map_err(|e| ConversionError::JsonParseError(format!("edges: {}", e)))?;
        Ok(Self { nodes, edges })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes nodes and edges separately, the way operation records store them.
    pub fn to_parts(&self) -> Result<(String, String), serde_json::Error> {
        Ok((
            serde_json::to_string(&self.nodes)?,
            serde_json::to_string(&self.edges)?,
        ))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
