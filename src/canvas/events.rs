use super::Canvas;
use crate::graph::{EdgeId, NodeId};

/// A structural change to the live graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    /// Payload, label, ports or position changed.
    NodeChanged(NodeId),
    EdgeAdded(EdgeId),
    EdgeRemoved(EdgeId),
    /// The whole graph was replaced by a hydrate.
    Reset,
}

/// Handle returned by [`Canvas::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(super) u64);

/// Receives every graph event after the mutation has been applied.
pub trait GraphListener {
    fn on_event(&mut self, event: &GraphEvent, canvas: &Canvas);
}

impl<F> GraphListener for F
where
    F: FnMut(&GraphEvent, &Canvas),
{
    fn on_event(&mut self, event: &GraphEvent, canvas: &Canvas) {
        self(event, canvas)
    }
}
