//! Per-session state that lives outside the canvas: identity, the operation
//! form and the run coordinator.

mod context;
mod form;
mod run;

pub use context::SessionContext;
pub use form::{OperationForm, store_record};
pub use run::{ModeListener, ModeListenerId, RunCoordinator, RunMode};
