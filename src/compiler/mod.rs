use crate::action::{ActionTree, KeyAction};
use crate::error::{CompileError, ConversionError};
use crate::graph::{EdgeId, GraphSnapshot, IntoSnapshot, NodeId};
use itertools::Itertools;
use std::fmt;
use tracing::{debug, instrument, warn};

mod builder;

use builder::TreeBuilder;

/// Longest root-to-leaf path a compiled tree may hold, header included.
///
/// Deeper graphs fail with [`CompileError::PathTooDeep`]; the tree's derived
/// clone, drop and serde impls recurse once per level.
pub const MAX_PATH_DEPTH: usize = 256;

/// A structural anomaly the compiler resolves on its own instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// Several nodes had no incoming edge; the first in node order was used.
    MultipleStartCandidates {
        chosen: NodeId,
        candidates: Vec<NodeId>,
    },
    /// Every node had an incoming edge; the first node was used.
    NoStartCandidate { chosen: NodeId },
    /// An edge back to an ancestor on the current path was not followed.
    CycleTruncated {
        edge_id: EdgeId,
        from: NodeId,
        to: NodeId,
    },
    /// An edge referenced a node that is not in the snapshot.
    DanglingEdge {
        edge_id: EdgeId,
        source: NodeId,
        target: NodeId,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::MultipleStartCandidates { chosen, candidates } => write!(
                f,
                "{} nodes have no incoming edge ({}); starting at '{}'",
                candidates.len(),
                candidates.iter().join(", "),
                chosen
            ),
            CompileWarning::NoStartCandidate { chosen } => write!(
                f,
                "every node has an incoming edge; starting at '{}'",
                chosen
            ),
            CompileWarning::CycleTruncated { edge_id, from, to } => write!(
                f,
                "edge '{}' from '{}' loops back to '{}' and was not followed",
                edge_id, from, to
            ),
            CompileWarning::DanglingEdge {
                edge_id,
                source,
                target,
            } => write!(
                f,
                "edge '{}' ({} -> {}) references a missing node and was skipped",
                edge_id, source, target
            ),
        }
    }
}

/// A compiled tree together with the anomalies tolerated while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub tree: ActionTree,
    pub warnings: Vec<CompileWarning>,
}

/// Turns a graph snapshot into an [`ActionTree`].
///
/// Compilation is pure: the same snapshot always yields the same tree and the
/// same warnings.
///
/// Every root-to-leaf path is expanded on its own, so a node reachable along
/// several paths is copied into each of them. Stacked diamonds (`a -> b|c -> d
/// -> e|f -> g ...`) therefore grow the tree exponentially in the number of
/// diamonds.
pub struct Compiler {
    snapshot: GraphSnapshot,
}

pub struct CompilerBuilder {
    snapshot: GraphSnapshot,
}

impl CompilerBuilder {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self { snapshot }
    }

    /// Starts from any source that converts into a snapshot, such as stored JSON.
    pub fn from_source(source: impl IntoSnapshot) -> Result<Self, ConversionError> {
        Ok(Self::new(source.into_snapshot()?))
    }

    pub fn build(self) -> Compiler {
        Compiler {
            snapshot: self.snapshot,
        }
    }
}

impl Compiler {
    pub fn builder(snapshot: GraphSnapshot) -> CompilerBuilder {
        CompilerBuilder::new(snapshot)
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn compile(&self) -> Result<ActionTree, CompileError> {
        self.compile_with_diagnostics().map(|c| c.tree)
    }

    #[instrument(skip_all, fields(nodes = self.snapshot.nodes.len(), edges = self.snapshot.edges.len()))]
    pub fn compile_with_diagnostics(&self) -> Result<Compilation, CompileError> {
        let mut builder = TreeBuilder::new(&self.snapshot);

        let candidates = builder.start_candidates(&self.snapshot);
        let start = match candidates.as_slice() {
            [only] => *only,
            [first, ..] => {
                builder.warn(CompileWarning::MultipleStartCandidates {
                    chosen: first.id.clone(),
                    candidates: candidates.iter().map(|n| n.id.clone()).collect(),
                });
                *first
            }
            [] => {
                let first = self.snapshot.nodes.first().ok_or(CompileError::EmptyGraph)?;
                builder.warn(CompileWarning::NoStartCandidate {
                    chosen: first.id.clone(),
                });
                first
            }
        };

        let header = match start.payload.as_key_element() {
            Some(key) => KeyAction::from(key),
            None => {
                return Err(CompileError::StartNotKeyElement {
                    node_id: start.id.clone(),
                    found: start.payload.tag().to_string(),
                });
            }
        };

        let children = builder.build_children(start.id.as_str())?;
        let warnings = builder.into_warnings();
        for warning in &warnings {
            warn!(%warning, "Tolerated graph anomaly");
        }

        let tree = ActionTree { header, children };
        debug!(
            start = %start.id,
            actions = tree.len(),
            depth = tree.depth(),
            "Compiled action tree"
        );
        Ok(Compilation { tree, warnings })
    }
}

/// Compiles a snapshot in one call.
pub fn compile(snapshot: &GraphSnapshot) -> Result<ActionTree, CompileError> {
    Compiler::builder(snapshot.clone()).build().compile()
}
