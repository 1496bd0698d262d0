//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need to build, edit and compile graphs.

// Graph model
pub use crate::graph::{
    ColorSample, Edge, Endpoint, GraphSnapshot, IntoSnapshot, KeyElement, Node, Payload, PortId,
    Position, Rgb, Size, Skill, TimeEvent, TimeKind,
};

// Editing
pub use crate::canvas::{Canvas, GraphEvent, GraphListener};
pub use crate::catalog::{Catalog, NodeTemplate, Palette, PaletteSection};
pub use crate::editor::{DialogInput, EditContext, EditOutcome, EditSession, MenuItem};
pub use crate::propagation::{PaletteRefresher, SnapshotPublisher, SnapshotSink};

// Compilation
pub use crate::action::{ActionTree, Branch, DisplayTree};
pub use crate::compiler::{Compilation, CompileWarning, Compiler};

// Session
pub use crate::config::EditorConfig;
pub use crate::session::{OperationForm, RunCoordinator, RunMode, SessionContext};

// Error types
pub use crate::error::{CompileError, ConnectError, ConversionError, EditError, SaveError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
