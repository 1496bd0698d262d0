//! One open editor: the canvas, its palette and edit session, wired to the
//! owning operation form.
//!
//! The surface is where failures become notices. Validation problems are
//! shown as warnings, service failures as errors; neither changes the graph.

use crate::canvas::Canvas;
use crate::catalog::{Catalog, NodeTemplate, Palette, PaletteSection};
use crate::compiler::{Compilation, Compiler};
use crate::config::EditorConfig;
use crate::editor::{DialogInput, EditContext, EditOutcome, EditSession, Menu, MenuItem};
use crate::error::{CompileError, ConnectError, EditError, SaveError, ServiceError};
use crate::graph::{EdgeId, Endpoint, GraphSnapshot, NodeId, Position};
use crate::propagation::{PaletteRefresher, SnapshotPublisher};
use crate::services::{CatalogSource, ColorSampler, ColorStore, Notice, Notifier, OperationStore};
use crate::session::{OperationForm, SessionContext, store_record};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// The remote capabilities an editor needs.
#[derive(Clone)]
pub struct EditorServices {
    pub sampler: Rc<dyn ColorSampler>,
    pub colors: Rc<dyn ColorStore>,
    pub notifier: Rc<dyn Notifier>,
}

pub struct EditorSurface {
    canvas: Canvas,
    catalog: Catalog,
    palette: Palette,
    editor: EditSession,
    refresher: PaletteRefresher,
    form: Rc<RefCell<OperationForm>>,
    session: SessionContext,
    services: EditorServices,
}

impl EditorSurface {
    /// Opens an editor on the form's current graph.
    ///
    /// The graph is hydrated before the form is subscribed, so opening an
    /// operation does not mark it dirty.
    pub fn open(
        config: &EditorConfig,
        session: SessionContext,
        form: Rc<RefCell<OperationForm>>,
        catalog: Catalog,
        services: EditorServices,
    ) -> Self {
        let mut canvas = Canvas::new(config);
        canvas.hydrate(form.borrow().snapshot().clone());
        form.borrow_mut().sync_snapshot(canvas.snapshot());
        canvas.subscribe(Box::new(SnapshotPublisher::new(Rc::clone(&form))));

        let mut palette = Palette::new();
        palette.initialize(&catalog);
        let mut refresher = PaletteRefresher::new(&config.debounce);
        refresher.baseline(&catalog);

        debug!(nodes = canvas.nodes().len(), "Editor opened");
        Self {
            canvas,
            catalog,
            palette,
            editor: EditSession::new(config.limits.clone()),
            refresher,
            form,
            session,
            services,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn editor(&self) -> &EditSession {
        &self.editor
    }

    pub fn form(&self) -> &Rc<RefCell<OperationForm>> {
        &self.form
    }

    pub fn place(&mut self, template: &NodeTemplate, position: Option<Position>) -> NodeId {
        self.canvas.place(template, position)
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        self.canvas.move_node(node_id, position)
    }

    /// Connects two ports. Rejections are logged but not shown to the user,
    /// who simply sees the drag snap back.
    pub fn connect(&mut self, source: Endpoint, target: Endpoint) -> Result<EdgeId, ConnectError> {
        self.canvas.connect(source, target).inspect_err(|e| {
            debug!(error = %e, "Connection rejected");
        })
    }

    pub fn open_node_menu(&mut self, node_id: &str) -> Result<Menu, EditError> {
        self.editor.open_node_menu(&self.canvas, node_id)
    }

    pub fn open_edge_menu(&mut self, edge_id: &str) -> Result<Menu, EditError> {
        self.editor.open_edge_menu(&self.canvas, edge_id)
    }

    pub fn dismiss(&mut self) {
        self.editor.dismiss();
    }

    pub async fn activate(
        &mut self,
        item: MenuItem,
        now: Instant,
    ) -> Result<EditOutcome, EditError> {
        let mut ctx = EditContext {
            canvas: &mut self.canvas,
            catalog: &mut self.catalog,
            session: &self.session,
            sampler: self.services.sampler.as_ref(),
            colors: self.services.colors.as_ref(),
        };
        let result = self.editor.activate(item, &mut ctx).await;
        self.after_edit(&result, now);
        result
    }

    pub async fn commit(
        &mut self,
        input: DialogInput,
        now: Instant,
    ) -> Result<EditOutcome, EditError> {
        let mut ctx = EditContext {
            canvas: &mut self.canvas,
            catalog: &mut self.catalog,
            session: &self.session,
            sampler: self.services.sampler.as_ref(),
            colors: self.services.colors.as_ref(),
        };
        let result = self.editor.commit(input, &mut ctx).await;
        self.after_edit(&result, now);
        result
    }

    pub fn cancel_dialog(&mut self) -> Result<(), EditError> {
        self.editor.cancel_dialog()
    }

    /// Refetches the catalog. Changed sections are refreshed after their debounce.
    pub async fn reload_catalog(
        &mut self,
        source: &dyn CatalogSource,
        now: Instant,
    ) -> Result<(), ServiceError> {
        let fresh = match Catalog::load(source, &self.session).await {
            Ok(fresh) => fresh,
            Err(e) => {
                error!(error = %e, "Catalog reload failed");
                self.notify(Notice::error(format!("Could not load the catalog: {}", e)));
                return Err(e);
            }
        };
        if fresh.elements() != self.catalog.elements() {
            self.catalog.set_elements(fresh.elements().to_vec());
        }
        if fresh.skills() != self.catalog.skills() {
            self.catalog.set_skills(fresh.skills().to_vec());
        }
        if fresh.saved_colors() != self.catalog.saved_colors() {
            self.catalog.set_saved_colors(fresh.saved_colors().to_vec());
        }
        self.refresher.observe(&self.catalog, now);
        Ok(())
    }

    /// Runs due palette refreshes.
    pub fn poll(&mut self, now: Instant) -> Vec<PaletteSection> {
        self.refresher.poll(now, &self.catalog, &mut self.palette)
    }

    pub fn next_refresh(&self) -> Option<Instant> {
        self.refresher.next_deadline()
    }

    /// Compiles the current graph, surfacing tolerated anomalies as warnings.
    pub fn compile(&self) -> Result<Compilation, CompileError> {
        let compiled = Compiler::builder(self.canvas.snapshot())
            .build()
            .compile_with_diagnostics();
        match &compiled {
            Ok(compilation) => {
                for warning in &compilation.warnings {
                    self.notify(Notice::warning(warning.to_string()));
                }
            }
            Err(e) => self.notify(Notice::warning(e.to_string())),
        }
        compiled
    }

    pub async fn save(&mut self, store: &dyn OperationStore) -> Result<i64, SaveError> {
        let result = self.persist(store).await;
        match &result {
            Ok(_) => self.notify(Notice::success("Operation saved")),
            Err(SaveError::Service(e)) => {
                error!(error = %e, "Saving operation failed");
                self.notify(Notice::error(format!("Could not save the operation: {}", e)));
            }
            Err(e) => self.notify(Notice::warning(e.to_string())),
        }
        result
    }

    async fn persist(&self, store: &dyn OperationStore) -> Result<i64, SaveError> {
        // Build the record first so no form borrow is held across the store call.
        let record = self.form.borrow().to_record(&self.session)?;
        let id = store_record(store, &record).await?;
        self.form.borrow_mut().mark_saved(id);
        Ok(id)
    }

    /// Tears the editor down and returns the final graph.
    pub fn close(mut self) -> GraphSnapshot {
        self.editor.dismiss();
        self.canvas.dispose();
        debug!("Editor closed");
        self.canvas.snapshot()
    }

    fn after_edit(&mut self, result: &Result<EditOutcome, EditError>, now: Instant) {
        match result {
            Ok(outcome) => {
                if let Some(message) = success_message(outcome) {
                    self.notify(Notice::success(message));
                }
            }
            Err(EditError::Service(e)) => {
                error!(error = %e, "Edit failed");
                self.notify(Notice::error(e.to_string()));
            }
            Err(e) => {
                warn!(error = %e, "Edit rejected");
                self.notify(Notice::warning(e.to_string()));
            }
        }
        self.refresher.observe(&self.catalog, now);
    }

    fn notify(&self, notice: Notice) {
        self.services.notifier.notify(notice);
    }
}

fn success_message(outcome: &EditOutcome) -> Option<&'static str> {
    match outcome {
        EditOutcome::Sampled(_) => Some("Color sampled"),
        EditOutcome::ColorSaved { .. } => Some("Color saved"),
        EditOutcome::ColorDeleted { .. } => Some("Color deleted permanently"),
        EditOutcome::Updated(_) => Some("Node updated"),
        _ => None,
    }
}
