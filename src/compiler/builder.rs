use super::{CompileWarning, MAX_PATH_DEPTH};
use crate::action::{ActionChild, ActionElement, Branch};
use crate::error::CompileError;
use crate::graph::{Edge, GraphSnapshot, Node, PortId};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::HashMap;

/// Expands a snapshot into action children, one root-to-leaf path at a time.
pub(super) struct TreeBuilder<'a> {
    nodes: AHashMap<&'a str, &'a Node>,
    outgoing: HashMap<&'a str, Vec<&'a Edge>>,
    incoming: AHashSet<&'a str>,
    warnings: Vec<CompileWarning>,
}

impl<'a> TreeBuilder<'a> {
    pub(super) fn new(snapshot: &'a GraphSnapshot) -> Self {
        let nodes: AHashMap<&str, &Node> =
            snapshot.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut warnings = Vec::new();
        let (live, dangling): (Vec<&Edge>, Vec<&Edge>) = snapshot.edges.iter().partition(|e| {
            nodes.contains_key(e.source.node_id.as_str())
                && nodes.contains_key(e.target.node_id.as_str())
        });
        for edge in dangling {
            warnings.push(CompileWarning::DanglingEdge {
                edge_id: edge.id.clone(),
                source: edge.source.node_id.clone(),
                target: edge.target.node_id.clone(),
            });
        }

        let incoming = live
            .iter()
            .copied()
            .map(|e| e.target.node_id.as_str())
            .collect();
        // Grouping keeps edge order within each source.
        let outgoing = live
            .into_iter()
            .into_group_map_by(|e| e.source.node_id.as_str());

        Self {
            nodes,
            outgoing,
            incoming,
            warnings,
        }
    }

    /// Nodes without incoming edges, in snapshot order.
    pub(super) fn start_candidates(&self, snapshot: &'a GraphSnapshot) -> Vec<&'a Node> {
        snapshot
            .nodes
            .iter()
            .filter(|n| !self.incoming.contains(n.id.as_str()))
            .collect()
    }

    pub(super) fn warn(&mut self, warning: CompileWarning) {
        self.warnings.push(warning);
    }

    pub(super) fn into_warnings(self) -> Vec<CompileWarning> {
        self.warnings
    }

    /// Builds the children of `root`. `None` when it has no reachable successors.
    ///
    /// Walks with an explicit stack so long chains cannot exhaust the thread stack.
    pub(super) fn build_children(
        &mut self,
        root: &'a str,
    ) -> Result<Option<Vec<ActionChild>>, CompileError> {
        let mut ancestors = AHashSet::new();
        ancestors.insert(root);
        let mut stack = vec![self.frame(root, None)];

        while let Some(frame) = stack.last_mut() {
            let from = frame.node_id;
            let Some(edge) = frame.edges.next() else {
                let Some(done) = stack.pop() else { break };
                ancestors.remove(done.node_id);
                let children = (!done.children.is_empty()).then_some(done.children);
                match (done.link, stack.last_mut()) {
                    (Some((node, branch)), Some(parent)) => parent.children.push(ActionChild {
                        element: ActionElement::from(&node.payload),
                        branch,
                        children,
                    }),
                    _ => return Ok(children),
                }
                continue;
            };

            let target_id = edge.target.node_id.as_str();
            if ancestors.contains(target_id) {
                self.warnings.push(CompileWarning::CycleTruncated {
                    edge_id: edge.id.clone(),
                    from: from.to_string(),
                    to: target_id.to_string(),
                });
                continue;
            }
            let Some(target) = self.nodes.get(target_id).copied() else {
                continue;
            };
            if stack.len() >= MAX_PATH_DEPTH {
                return Err(CompileError::PathTooDeep {
                    node_id: target_id.to_string(),
                    limit: MAX_PATH_DEPTH,
                });
            }

            ancestors.insert(target_id);
            stack.push(self.frame(target_id, Some((target, branch_of(edge)))));
        }
        Ok(None)
    }

    fn frame(&self, node_id: &'a str, link: Option<(&'a Node, Branch)>) -> Frame<'a> {
        let edges = self.outgoing.get(node_id).cloned().unwrap_or_default();
        Frame {
            node_id,
            children: Vec::with_capacity(edges.len()),
            edges: edges.into_iter(),
            link,
        }
    }
}

/// A node on the current path whose outgoing edges are still being walked.
struct Frame<'a> {
    node_id: &'a str,
    edges: std::vec::IntoIter<&'a Edge>,
    children: Vec<ActionChild>,
    // The node and branch this frame becomes in its parent; `None` for the root.
    link: Option<(&'a Node, Branch)>,
}

fn branch_of(edge: &Edge) -> Branch {
    match edge.source.port_id {
        PortId::No => Branch::No,
        PortId::Yes | PortId::In => Branch::Yes,
    }
}
