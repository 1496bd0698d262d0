//! # keyweave - Node-Graph Authoring and Compilation of Action Trees
//!
//! **keyweave** lets a user compose input-automation actions (key presses,
//! skill casts, timers, pixel-color checks, conditional delays) as a directed
//! graph of nodes and ports, and compiles that graph into the nested action
//! tree an automation engine executes.
//!
//! ## Core Workflow
//!
//! 1.  **Load the Catalog**: Fetch key elements, skills and saved colors through a
//!     `CatalogSource` and turn them into palette templates.
//! 2.  **Edit the Graph**: Place templates on a `Canvas`, connect their ports and edit
//!     node payloads through the `EditSession` menus and dialogs.
//! 3.  **Propagate**: Every canvas change republishes the full `GraphSnapshot` to the
//!     owning `OperationForm`, which is what gets saved.
//! 4.  **Compile**: Use `Compiler::builder` to turn a snapshot into an `ActionTree` and
//!     hand it to the `AutomationEngine` through a `RunCoordinator`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyweave::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut canvas = Canvas::default();
//!
//!     let press = NodeTemplate::new(Payload::KeyElement(KeyElement {
//!         code: 65,
//!         key: "A".to_string(),
//!         key_up_delay: 0,
//!     }));
//!     let wait = NodeTemplate::new(Payload::TimeEvent(TimeEvent::template(TimeKind::Delay)));
//!
//!     let a = canvas.place(&press, Some(Position::new(0.0, 0.0)));
//!     let d = canvas.place(&wait, Some(Position::new(0.0, 80.0)));
//!     canvas.connect(Endpoint::new(a, PortId::Yes), Endpoint::new(d, PortId::In))?;
//!
//!     let compiler = Compiler::builder(canvas.snapshot()).build();
//!     let compilation = compiler.compile_with_diagnostics()?;
//!     for warning in &compilation.warnings {
//!         println!("warning: {}", warning);
//!     }
//!     println!("{}", DisplayTree::new(&compilation.tree));
//!     println!("{}", compilation.tree.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Persisted Data
//!
//! Node payloads are stored with an explicit `"type"` discriminant. Graphs
//! written before that field existed are still readable: the deserializer
//! infers each payload from its legacy fields (see [`graph::legacy`]), and
//! ports and labels are always recomputed from the payload.

pub mod action;
pub mod canvas;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod editor;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod propagation;
pub mod services;
pub mod session;
pub mod surface;

mod ids;
