//! Interfaces to the collaborators outside this crate.
//!
//! Every remote call is async and runs on the editor's single thread, so the
//! traits are declared `?Send`. Implementations report failures as
//! [`ServiceError`]; callers never retry.

mod notify;
mod records;

pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use records::{ColorReading, NewSavedColor, OperationRecord};

use crate::action::ActionTree;
use crate::catalog::{CatalogElement, CatalogSkill, SavedColor};
use crate::error::ServiceError;
use crate::session::RunMode;
use async_trait::async_trait;

/// Read-only catalog lists.
#[async_trait(?Send)]
pub trait CatalogSource {
    async fn elements(&self) -> Result<Vec<CatalogElement>, ServiceError>;
    async fn skills(&self) -> Result<Vec<CatalogSkill>, ServiceError>;
    async fn saved_colors(&self, user_id: i64) -> Result<Vec<SavedColor>, ServiceError>;
}

/// Persistence of operation records.
#[async_trait(?Send)]
pub trait OperationStore {
    /// Creates a record and returns its new id.
    async fn create(&self, record: &OperationRecord) -> Result<i64, ServiceError>;
    async fn update(&self, record: &OperationRecord) -> Result<(), ServiceError>;
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
    async fn list_by_owner(&self, owner: i64) -> Result<Vec<OperationRecord>, ServiceError>;
}

/// Persistence of named color samples.
#[async_trait(?Send)]
pub trait ColorStore {
    async fn create(&self, color: NewSavedColor) -> Result<SavedColor, ServiceError>;
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
}

/// Reads the pixel under the cursor as `"<coordinate>|<r>,<g>,<b>"`.
#[async_trait(?Send)]
pub trait ColorSampler {
    async fn sample(&self) -> Result<String, ServiceError>;
}

/// The external engine that executes compiled trees.
#[async_trait(?Send)]
pub trait AutomationEngine {
    /// Starts (`start == true`) or stops the given trees.
    async fn run(&self, trees: Vec<ActionTree>, start: bool) -> Result<(), ServiceError>;
    async fn set_mode(&self, mode: RunMode) -> Result<(), ServiceError>;
}
