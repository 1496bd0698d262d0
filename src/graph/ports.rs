//! Port schema: which sockets a node exposes, derived purely from its payload.
//!
//! Ports are never trusted from persisted data. Every time a node is placed or
//! re-hydrated its ports are recomputed here, so catalog-driven node types can
//! evolve without leaving stale sockets behind.

use super::payload::{Payload, TimeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a port on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortId {
    /// Trigger input.
    #[serde(rename = "i")]
    In,
    /// Success output.
    #[serde(rename = "y")]
    Yes,
    /// Failure output.
    #[serde(rename = "n")]
    No,
}

impl PortId {
    pub fn as_str(self) -> &'static str {
        match self {
            PortId::In => "i",
            PortId::Yes => "y",
            PortId::No => "n",
        }
    }

    pub fn is_output(self) -> bool {
        !matches!(self, PortId::In)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "i" => Ok(PortId::In),
            "y" => Ok(PortId::Yes),
            "n" => Ok(PortId::No),
            other => Err(format!("unknown port '{}'", other)),
        }
    }
}

/// Where and how a port is drawn. Purely visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortGroup {
    Top,
    Bottom,
    BottomGreen,
    BottomRed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub group: PortGroup,
}

/// The resolved ports of one node, in drawing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortSet(Vec<Port>);

impl PortSet {
    /// Trigger in, success out, failure out.
    pub fn branching() -> Self {
        PortSet(vec![
            Port {
                id: PortId::In,
                group: PortGroup::Top,
            },
            Port {
                id: PortId::Yes,
                group: PortGroup::BottomGreen,
            },
            Port {
                id: PortId::No,
                group: PortGroup::BottomRed,
            },
        ])
    }

    /// Trigger in, success out.
    pub fn sequential() -> Self {
        PortSet(vec![
            Port {
                id: PortId::In,
                group: PortGroup::Top,
            },
            Port {
                id: PortId::Yes,
                group: PortGroup::Bottom,
            },
        ])
    }

    /// Success out only; for nodes that can only start an action.
    pub fn source_only() -> Self {
        PortSet(vec![Port {
            id: PortId::Yes,
            group: PortGroup::Bottom,
        }])
    }

    pub fn contains(&self, id: PortId) -> bool {
        self.0.iter().any(|p| p.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = PortId> + '_ {
        self.0.iter().map(|p| p.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Port> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves the port set for a payload.
pub fn ports_for(payload: &Payload) -> PortSet {
    match payload {
        Payload::KeyElement(k) if k.is_pointer() => PortSet::source_only(),
        Payload::KeyElement(_) => PortSet::sequential(),
        Payload::TimeEvent(t) if t.kind == TimeKind::Delay => PortSet::sequential(),
        Payload::TimeEvent(_) | Payload::Skill(_) | Payload::ColorSample(_) => {
            PortSet::branching()
        }
    }
}
