//! The node and edge edit interaction.
//!
//! [`EditSession`] is a small state machine: `Idle`, one open menu, or one
//! open dialog. Opening a menu discards whatever was open before without
//! committing it. Activating any menu entry closes the menu; some entries
//! open a dialog in its place. A dialog stays open when its input fails
//! validation or when saving a color fails, so the user can correct and retry.
//!
//! Remote calls (sampling, saving and deleting colors) go through the
//! [`EditContext`]. A failed call leaves the canvas and catalog untouched.

mod dialog;
mod menu;

pub use dialog::{Dialog, DialogInput};
pub use menu::{Menu, MenuEntry, MenuItem, MenuTarget};

use crate::canvas::Canvas;
use crate::catalog::Catalog;
use crate::config::DialogLimits;
use crate::error::EditError;
use crate::graph::payload::{Payload, TimeKind};
use crate::graph::{EdgeId, Node, NodeId};
use crate::ids::random_id;
use crate::services::{ColorReading, ColorSampler, ColorStore, NewSavedColor};
use crate::session::SessionContext;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    MenuOpen(Menu),
    DialogOpen { node: NodeId, dialog: Dialog },
}

/// Everything an edit may touch.
pub struct EditContext<'a> {
    pub canvas: &'a mut Canvas,
    pub catalog: &'a mut Catalog,
    pub session: &'a SessionContext,
    pub sampler: &'a dyn ColorSampler,
    pub colors: &'a dyn ColorStore,
}

/// What an activation or commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Closed,
    DialogOpened,
    Updated(NodeId),
    Sampled(NodeId),
    ColorSaved { node: NodeId, saved_id: i64 },
    ColorDeleted { node: NodeId, saved_id: i64 },
    NodeRemoved(NodeId),
    EdgeRemoved(EdgeId),
}

#[derive(Debug, Default)]
pub struct EditSession {
    state: EditState,
    limits: DialogLimits,
}

impl EditSession {
    pub fn new(limits: DialogLimits) -> Self {
        Self {
            state: EditState::Idle,
            limits,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn menu(&self) -> Option<&Menu> {
        match &self.state {
            EditState::MenuOpen(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        match &self.state {
            EditState::DialogOpen { dialog, .. } => Some(dialog),
            _ => None,
        }
    }

    /// Opens the context menu of a node, replacing anything already open.
    pub fn open_node_menu(&mut self, canvas: &Canvas, node_id: &str) -> Result<Menu, EditError> {
        let node = canvas
            .node(node_id)
            .ok_or_else(|| EditError::UnknownNode(node_id.to_string()))?;
        Ok(self.open(Menu::for_node(node)))
    }

    pub fn open_edge_menu(&mut self, canvas: &Canvas, edge_id: &str) -> Result<Menu, EditError> {
        if canvas.edge(edge_id).is_none() {
            return Err(EditError::UnknownEdge(edge_id.to_string()));
        }
        Ok(self.open(Menu::for_edge(edge_id)))
    }

    /// Outside click: closes any menu or dialog without committing.
    pub fn dismiss(&mut self) {
        if self.state != EditState::Idle {
            debug!("Edit interaction dismissed");
        }
        self.state = EditState::Idle;
    }

    fn open(&mut self, menu: Menu) -> Menu {
        debug!(on = ?menu.target, items = menu.entries.len(), "Menu opened");
        self.state = EditState::MenuOpen(menu.clone());
        menu
    }

    /// Activates a menu entry. The menu closes whatever the result.
    pub async fn activate(
        &mut self,
        item: MenuItem,
        ctx: &mut EditContext<'_>,
    ) -> Result<EditOutcome, EditError> {
        let menu = match std::mem::take(&mut self.state) {
            EditState::MenuOpen(menu) => menu,
            other => {
                self.state = other;
                return Err(EditError::NoMenuOpen);
            }
        };
        let entry = menu
            .entry(item)
            .ok_or_else(|| EditError::ItemNotOffered(item.to_string()))?;
        if !entry.enabled {
            return Err(match item {
                MenuItem::SaveColor => EditError::NoSample,
                _ => EditError::ItemDisabled(item.to_string()),
            });
        }
        debug!(%item, on = ?menu.target, "Menu item activated");

        let node_id = match menu.target {
            MenuTarget::Edge(edge_id) => {
                return match item {
                    MenuItem::DeleteEdge => ctx
                        .canvas
                        .remove_edge(&edge_id)
                        .map(|e| EditOutcome::EdgeRemoved(e.id))
                        .ok_or(EditError::UnknownEdge(edge_id)),
                    _ => Ok(EditOutcome::Closed),
                };
            }
            MenuTarget::Node(node_id) => node_id,
        };
        let node = ctx
            .canvas
            .node(&node_id)
            .cloned()
            .ok_or_else(|| EditError::UnknownNode(node_id.clone()))?;

        match item {
            MenuItem::Cancel => Ok(EditOutcome::Closed),
            MenuItem::Delete => {
                ctx.canvas.remove_node(&node_id);
                Ok(EditOutcome::NodeRemoved(node_id))
            }
            MenuItem::SampleNow => self.sample(node, ctx).await,
            _ => {
                let dialog = self.dialog_for(item, &node, ctx.canvas)?;
                debug!(dialog = dialog.name(), node = %node_id, "Dialog opened");
                self.state = EditState::DialogOpen {
                    node: node_id,
                    dialog,
                };
                Ok(EditOutcome::DialogOpened)
            }
        }
    }

    /// Closes the open dialog without committing.
    pub fn cancel_dialog(&mut self) -> Result<(), EditError> {
        match self.state {
            EditState::DialogOpen { .. } => {
                self.state = EditState::Idle;
                Ok(())
            }
            _ => Err(EditError::NoDialogOpen),
        }
    }

    /// Commits the open dialog.
    ///
    /// Invalid input and failed color saves keep the dialog open. Every other
    /// outcome returns to `Idle`.
    pub async fn commit(
        &mut self,
        input: DialogInput,
        ctx: &mut EditContext<'_>,
    ) -> Result<EditOutcome, EditError> {
        let (node_id, dialog) = match &self.state {
            EditState::DialogOpen { node, dialog } => (node.clone(), dialog.clone()),
            _ => return Err(EditError::NoDialogOpen),
        };
        if !input.fits(&dialog) {
            return Err(EditError::DialogMismatch(dialog.name().to_string()));
        }
        let Some(node) = ctx.canvas.node(&node_id).cloned() else {
            self.state = EditState::Idle;
            return Err(EditError::UnknownNode(node_id));
        };

        let result = self.apply(dialog, input, node, ctx).await;
        match &result {
            Ok(_) => self.state = EditState::Idle,
            Err(EditError::InvalidInput { .. }) | Err(EditError::NotSignedIn) => {}
            Err(EditError::Service(_))
                if matches!(self.dialog(), Some(Dialog::SaveColor { .. })) => {}
            Err(_) => self.state = EditState::Idle,
        }
        result
    }

    fn dialog_for(
        &self,
        item: MenuItem,
        node: &Node,
        canvas: &Canvas,
    ) -> Result<Dialog, EditError> {
        let offered = || EditError::ItemNotOffered(item.to_string());
        let dialog = match (item, &node.payload) {
            (MenuItem::SetKeyUpDelay, Payload::KeyElement(key)) => Dialog::KeyUpDelay {
                current: key.key_up_delay,
                max: self.limits.key_up_delay_max,
            },
            (MenuItem::SaveColor, Payload::ColorSample(sample)) => {
                match (&sample.coordinate, sample.rgb) {
                    (Some(coordinate), Some(rgb)) => Dialog::SaveColor {
                        coordinate: coordinate.clone(),
                        rgb,
                    },
                    _ => return Err(EditError::NoSample),
                }
            }
            (MenuItem::DeletePermanently, Payload::ColorSample(sample)) => Dialog::ConfirmDelete {
                saved_id: sample.saved_id.ok_or_else(offered)?,
            },
            (MenuItem::SetValue, Payload::TimeEvent(event)) => Dialog::Value {
                kind: event.kind,
                current: event.amount.unwrap_or(0),
            },
            (MenuItem::ConfigureTimer, Payload::TimeEvent(event)) => {
                let configured = event.is_configured_timer();
                Dialog::Timer {
                    name: if configured {
                        event.timer_name.clone().unwrap_or_default()
                    } else {
                        String::new()
                    },
                    duration: if configured { event.amount } else { None },
                    initializes: event.initializes.unwrap_or(false),
                    max: self.limits.timer_duration_max,
                }
            }
            (MenuItem::SelectResetTimer, Payload::TimeEvent(event)) => Dialog::ResetTimer {
                options: canvas.timers(),
                selected: event.timer_id.clone(),
            },
            _ => return Err(offered()),
        };
        Ok(dialog)
    }

    async fn sample(
        &self,
        node: Node,
        ctx: &mut EditContext<'_>,
    ) -> Result<EditOutcome, EditError> {
        let Payload::ColorSample(mut sample) = node.payload else {
            return Err(EditError::ItemNotOffered(MenuItem::SampleNow.to_string()));
        };
        let raw = ctx.sampler.sample().await.map_err(|e| {
            error!(node = %node.id, error = %e, "Color sampling failed");
            e
        })?;
        let reading = ColorReading::parse(&raw)?;
        sample.coordinate = Some(reading.coordinate);
        sample.rgb = Some(reading.rgb);
        ctx.canvas.update_payload(&node.id, Payload::ColorSample(sample));
        Ok(EditOutcome::Sampled(node.id))
    }

    async fn apply(
        &self,
        dialog: Dialog,
        input: DialogInput,
        node: Node,
        ctx: &mut EditContext<'_>,
    ) -> Result<EditOutcome, EditError> {
        let node_id = node.id.clone();
        let payload = match (dialog, input, node.payload) {
            (
                Dialog::KeyUpDelay { .. },
                DialogInput::KeyUpDelay(value),
                Payload::KeyElement(mut key),
            ) => {
                key.key_up_delay = dialog::key_up_delay(value, &self.limits)?;
                Payload::KeyElement(key)
            }
            (
                Dialog::Value { kind, .. },
                DialogInput::Value(value),
                Payload::TimeEvent(mut event),
            ) => {
                event.amount = Some(dialog::amount(kind, value)?);
                Payload::TimeEvent(event)
            }
            (
                Dialog::Timer { .. },
                DialogInput::Timer {
                    name,
                    duration,
                    initializes,
                },
                Payload::TimeEvent(mut event),
            ) => {
                let name = dialog::non_empty("timer name", &name)?;
                let duration = dialog::timer_duration(duration, &self.limits)?;
                event.kind = TimeKind::Timer;
                event.timer_name = Some(name);
                event.amount = Some(duration);
                event.timer_id = Some(random_id());
                event.initializes = Some(initializes);
                Payload::TimeEvent(event)
            }
            (
                Dialog::ResetTimer { .. },
                DialogInput::ResetTimer { timer_id },
                Payload::TimeEvent(mut event),
            ) => {
                // Resolve against the live canvas; the timer may have changed since the
                // dialog opened.
                let timer = ctx
                    .canvas
                    .timers()
                    .into_iter()
                    .find(|t| t.timer_id == timer_id)
                    .ok_or(EditError::UnknownTimer(timer_id))?;
                event.timer_name = Some(timer.name);
                event.timer_id = Some(timer.timer_id);
                Payload::TimeEvent(event)
            }
            (
                Dialog::SaveColor { coordinate, rgb },
                DialogInput::ColorName(name),
                Payload::ColorSample(mut sample),
            ) => {
                let name = dialog::non_empty("color name", &name)?;
                let user_id = ctx.session.user_id.ok_or(EditError::NotSignedIn)?;
                let saved = ctx
                    .colors
                    .create(NewSavedColor {
                        user_id,
                        coordinate,
                        rgb: rgb.to_string(),
                        name: name.clone(),
                    })
                    .await
                    .map_err(|e| {
                        error!(node = %node_id, error = %e, "Saving color failed");
                        e
                    })?;
                let saved_id = saved.id;
                sample.saved_id = Some(saved_id);
                sample.name = Some(name);
                ctx.canvas.update_payload(&node_id, Payload::ColorSample(sample));
                ctx.catalog.push_saved_color(saved);
                return Ok(EditOutcome::ColorSaved {
                    node: node_id,
                    saved_id,
                });
            }
            (Dialog::ConfirmDelete { saved_id }, DialogInput::Confirm, Payload::ColorSample(_)) => {
                ctx.colors.delete(saved_id).await.map_err(|e| {
                    error!(saved_id, error = %e, "Deleting color failed");
                    e
                })?;
                ctx.canvas.remove_node(&node_id);
                ctx.catalog.remove_saved_color(saved_id);
                return Ok(EditOutcome::ColorDeleted {
                    node: node_id,
                    saved_id,
                });
            }
            (dialog, _, _) => return Err(EditError::DialogMismatch(dialog.name().to_string())),
        };

        ctx.canvas.update_payload(&node_id, payload);
        Ok(EditOutcome::Updated(node_id))
    }
}
