use crate::graph::payload::{Payload, TimeKind};
use crate::graph::{EdgeId, Node, NodeId};
use std::fmt;

/// An entry of a node or edge context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    SetKeyUpDelay,
    SampleNow,
    SaveColor,
    DeletePermanently,
    SetValue,
    ConfigureTimer,
    SelectResetTimer,
    Delete,
    Cancel,
    DeleteEdge,
}

impl MenuItem {
    pub fn name(self) -> &'static str {
        match self {
            MenuItem::SetKeyUpDelay => "set key-up delay",
            MenuItem::SampleNow => "sample now",
            MenuItem::SaveColor => "save",
            MenuItem::DeletePermanently => "delete permanently",
            MenuItem::SetValue => "set value",
            MenuItem::ConfigureTimer => "configure timer",
            MenuItem::SelectResetTimer => "select timer to reset",
            MenuItem::Delete => "delete",
            MenuItem::Cancel => "cancel",
            MenuItem::DeleteEdge => "delete connection",
        }
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub item: MenuItem,
    pub enabled: bool,
}

impl MenuEntry {
    fn enabled(item: MenuItem) -> Self {
        Self {
            item,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    Node(NodeId),
    Edge(EdgeId),
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub target: MenuTarget,
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    /// The entries offered for a node, chosen by its payload.
    pub fn for_node(node: &Node) -> Self {
        let mut entries = Vec::new();
        match &node.payload {
            Payload::KeyElement(_) => entries.push(MenuEntry::enabled(MenuItem::SetKeyUpDelay)),
            Payload::ColorSample(sample) => {
                entries.push(MenuEntry::enabled(MenuItem::SampleNow));
                entries.push(MenuEntry {
                    item: MenuItem::SaveColor,
                    enabled: sample.is_sampled(),
                });
                if sample.saved_id.is_some() {
                    entries.push(MenuEntry::enabled(MenuItem::DeletePermanently));
                }
            }
            Payload::TimeEvent(event) => entries.push(MenuEntry::enabled(match event.kind {
                TimeKind::Delay | TimeKind::Stamina => MenuItem::SetValue,
                TimeKind::Timer => MenuItem::ConfigureTimer,
                TimeKind::ResetTimer => MenuItem::SelectResetTimer,
            })),
            Payload::Skill(_) => {}
        }
        entries.push(MenuEntry::enabled(MenuItem::Delete));
        entries.push(MenuEntry::enabled(MenuItem::Cancel));
        Self {
            target: MenuTarget::Node(node.id.clone()),
            entries,
        }
    }

    pub fn for_edge(edge_id: impl Into<EdgeId>) -> Self {
        Self {
            target: MenuTarget::Edge(edge_id.into()),
            entries: vec![
                MenuEntry::enabled(MenuItem::DeleteEdge),
                MenuEntry::enabled(MenuItem::Cancel),
            ],
        }
    }

    pub fn entry(&self, item: MenuItem) -> Option<&MenuEntry> {
        self.entries.iter().find(|e| e.item == item)
    }

    pub fn items(&self) -> impl Iterator<Item = MenuItem> + '_ {
        self.entries.iter().map(|e| e.item)
    }
}
