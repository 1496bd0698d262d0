//! The live graph of one editor session.
//!
//! [`Canvas`] owns every node and edge, enforces the connection rules and
//! notifies subscribed listeners after each mutation. Listeners observe the
//! canvas read-only; they cannot mutate it from inside a callback.

mod events;

pub use events::{GraphEvent, GraphListener, ListenerId};

use crate::catalog::NodeTemplate;
use crate::config::EditorConfig;
use crate::error::ConnectError;
use crate::graph::payload::{Payload, TimeKind};
use crate::graph::{Edge, EdgeId, Endpoint, GraphSnapshot, Node, NodeId, Position, Size};
use crate::ids::random_id;
use tracing::{debug, warn};

/// A timer node that a reset node may point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRef {
    pub node_id: NodeId,
    pub timer_id: String,
    pub name: String,
    pub duration: u32,
}

pub struct Canvas {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_size: Size,
    drop_position: Position,
    listeners: Vec<(ListenerId, Box<dyn GraphListener>)>,
    next_listener: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Canvas {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            node_size: config.node_size,
            drop_position: config.drop_position,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Places a template, at `position` or the configured drop position.
    pub fn place(&mut self, template: &NodeTemplate, position: Option<Position>) -> NodeId {
        let node = Node::new(
            random_id(),
            template.payload.clone(),
            position.unwrap_or(self.drop_position),
            self.node_size,
        );
        let id = node.id.clone();
        debug!(node = %id, label = %node.label, "Placed node");
        self.nodes.push(node);
        self.emit(GraphEvent::NodeAdded(id.clone()));
        id
    }

    /// Connects two ports.
    ///
    /// Only port existence is checked, not direction: any port of the source
    /// node may feed any port of the target node.
    pub fn connect(&mut self, source: Endpoint, target: Endpoint) -> Result<EdgeId, ConnectError> {
        if source.node_id == target.node_id {
            return Err(ConnectError::SelfLoop(source.node_id));
        }
        for end in [&source, &target] {
            let node = self
                .node(&end.node_id)
                .ok_or_else(|| ConnectError::UnknownNode(end.node_id.clone()))?;
            if !node.has_port(end.port_id) {
                return Err(ConnectError::UnknownPort {
                    node_id: end.node_id.clone(),
                    port: end.port_id.to_string(),
                });
            }
        }
        if self.edges.iter().any(|e| e.same_connection(&source, &target)) {
            return Err(ConnectError::Duplicate {
                source_node: source.node_id,
                source_port: source.port_id.to_string(),
                target_node: target.node_id,
                target_port: target.port_id.to_string(),
            });
        }

        let edge = Edge {
            id: random_id(),
            source,
            target,
            label: None,
        };
        let id = edge.id.clone();
        debug!(
            edge = %id,
            from = %edge.source.node_id,
            to = %edge.target.node_id,
            port = %edge.source.port_id,
            "Connected"
        );
        self.edges.push(edge);
        self.emit(GraphEvent::EdgeAdded(id.clone()));
        Ok(id)
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        let incident: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|e| e.touches(id))
            .map(|e| e.id.clone())
            .collect();
        for edge_id in incident {
            self.remove_edge(&edge_id);
        }
        let node = self.nodes.remove(idx);
        debug!(node = %node.id, "Removed node");
        self.emit(GraphEvent::NodeRemoved(node.id.clone()));
        Some(node)
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let idx = self.edges.iter().position(|e| e.id == id)?;
        let edge = self.edges.remove(idx);
        debug!(edge = %edge.id, "Removed edge");
        self.emit(GraphEvent::EdgeRemoved(edge.id.clone()));
        Some(edge)
    }

    /// Removes whichever node or edge has this id. Returns false if neither exists.
    pub fn remove(&mut self, id: &str) -> bool {
        self.remove_node(id).is_some() || self.remove_edge(id).is_some()
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.position = position;
        self.emit(GraphEvent::NodeChanged(id.to_string()));
        true
    }

    /// Replaces a node's payload, regenerating its label and ports.
    ///
    /// Edges attached to ports the new payload no longer exposes are removed.
    pub fn update_payload(&mut self, id: &str, payload: Payload) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.set_payload(payload);
        debug!(node = %id, label = %node.label, "Updated payload");

        let stale: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|e| {
                (e.source.node_id == id && !node.has_port(e.source.port_id))
                    || (e.target.node_id == id && !node.has_port(e.target.port_id))
            })
            .map(|e| e.id.clone())
            .collect();
        for edge_id in stale {
            self.remove_edge(&edge_id);
        }
        self.emit(GraphEvent::NodeChanged(id.to_string()));
        true
    }

    /// The canonical serializable form of the current graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    /// Replaces the graph, recomputing every node's label and ports from its payload.
    ///
    /// Edges whose endpoints no longer resolve to a node port are dropped.
    pub fn hydrate(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot
            .nodes
            .into_iter()
            .map(|n| {
                let shape = n.shape;
                let mut node = Node::new(n.id, n.payload, n.position, n.size);
                node.shape = shape;
                node
            })
            .collect();

        let (kept, dropped): (Vec<Edge>, Vec<Edge>) = snapshot
            .edges
            .into_iter()
            .partition(|e| self.resolves(&e.source) && self.resolves(&e.target));
        for edge in &dropped {
            warn!(edge = %edge.id, "Dropping edge with unresolvable endpoint on hydrate");
        }
        self.edges = kept;

        debug!(nodes = self.nodes.len(), edges = self.edges.len(), "Hydrated canvas");
        self.emit(GraphEvent::Reset);
    }

    /// Every configured timer on the canvas, in node order.
    pub fn timers(&self) -> Vec<TimerRef> {
        self.nodes
            .iter()
            .filter_map(|n| {
                let event = n
                    .payload
                    .as_time_event()
                    .filter(|e| e.kind == TimeKind::Timer)?;
                Some(TimerRef {
                    node_id: n.id.clone(),
                    timer_id: event.timer_id.clone()?,
                    name: event.timer_name.clone().unwrap_or_default(),
                    duration: event.amount?,
                })
            })
            .collect()
    }

    pub fn subscribe(&mut self, listener: Box<dyn GraphListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Releases every listener. Called when the editor surface closes.
    pub fn dispose(&mut self) {
        debug!(listeners = self.listeners.len(), "Disposing canvas listeners");
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn resolves(&self, end: &Endpoint) -> bool {
        self.node(&end.node_id)
            .is_some_and(|n| n.has_port(end.port_id))
    }

    fn emit(&mut self, event: GraphEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener.on_event(&event, self);
        }
        self.listeners = listeners;
    }
}
