use super::SessionContext;
use crate::compiler::Compiler;
use crate::error::{ConversionError, SaveError};
use crate::graph::{GraphSnapshot, IntoSnapshot};
use crate::propagation::SnapshotSink;
use crate::services::{OperationRecord, OperationStore};
use tracing::{debug, info};

/// The form that owns an operation while it is being edited.
///
/// The canvas publishes every change here; the form is the source of truth
/// for whether there are unsaved edits and for what gets saved.
#[derive(Debug, Clone, Default)]
pub struct OperationForm {
    pub id: Option<i64>,
    pub name: String,
    pub icon: String,
    snapshot: GraphSnapshot,
    dirty: bool,
}

impl OperationForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Opens a stored record for editing.
    pub fn from_record(record: &OperationRecord) -> Result<Self, ConversionError> {
        Ok(Self {
            id: record.id,
            name: record.name.clone(),
            icon: record.icon.clone(),
            snapshot: record.into_snapshot()?,
            dirty: false,
        })
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Builds the record to persist. Runs every save check except the store call.
    pub fn to_record(&self, ctx: &SessionContext) -> Result<OperationRecord, SaveError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SaveError::EmptyName);
        }
        let owner = ctx.user_id.ok_or(SaveError::NotSignedIn)?;
        Compiler::builder(self.snapshot.clone()).build().compile()?;

        let (nodes, edges) = self
            .snapshot
            .to_parts()
            .map_err(|e| SaveError::Serialize(e.to_string()))?;
        Ok(OperationRecord {
            id: self.id,
            name: name.to_string(),
            icon: self.icon.clone(),
            nodes,
            edges,
            owner,
        })
    }

    /// Validates and persists the operation, creating it on first save.
    ///
    /// On failure nothing about the form changes.
    pub async fn save(
        &mut self,
        store: &dyn OperationStore,
        ctx: &SessionContext,
    ) -> Result<i64, SaveError> {
        let record = self.to_record(ctx)?;
        let id = store_record(store, &record).await?;
        self.mark_saved(id);
        Ok(id)
    }

    /// Records a successful save: the form now has an id and no unsaved edits.
    pub fn mark_saved(&mut self, id: i64) {
        self.id = Some(id);
        self.dirty = false;
    }

    /// Adopts the canvas's normalized copy of the graph without marking unsaved edits.
    pub fn sync_snapshot(&mut self, snapshot: GraphSnapshot) {
        self.snapshot = snapshot;
    }
}

/// Creates the record when it has no id yet, otherwise updates it. Returns the record id.
pub async fn store_record(
    store: &dyn OperationStore,
    record: &OperationRecord,
) -> Result<i64, SaveError> {
    let id = match record.id {
        Some(id) => {
            store.update(record).await?;
            id
        }
        None => store.create(record).await?,
    };
    info!(id, operation = %record.name, "Saved operation");
    Ok(id)
}

impl SnapshotSink for OperationForm {
    fn publish(&mut self, snapshot: GraphSnapshot) {
        debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "Form received snapshot"
        );
        self.snapshot = snapshot;
        self.dirty = true;
    }
}
