use crate::action::ActionTree;
use crate::compiler::Compiler;
use crate::error::RunError;
use crate::graph::GraphSnapshot;
use crate::services::AutomationEngine;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info};

/// How the engine fires an operation's trigger key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunMode {
    /// Repeat while the trigger is held down.
    #[default]
    Hold,
    /// Run once per press.
    Click,
}

impl RunMode {
    /// The numeric mode the engine understands.
    pub fn engine_code(self) -> u8 {
        match self {
            RunMode::Hold => 1,
            RunMode::Click => 2,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Hold => write!(f, "hold"),
            RunMode::Click => write!(f, "click"),
        }
    }
}

/// Told about every mode change after running operations were restarted.
pub trait ModeListener {
    fn on_mode_change(&mut self, mode: RunMode);
}

impl<F> ModeListener for F
where
    F: FnMut(RunMode),
{
    fn on_mode_change(&mut self, mode: RunMode) {
        self(mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeListenerId(u64);

struct Running {
    name: String,
    tree: ActionTree,
}

/// Tracks the run mode and the operation currently handed to the engine.
///
/// Only one operation runs at a time.
pub struct RunCoordinator<E> {
    engine: E,
    mode: RunMode,
    running: Option<Running>,
    listeners: Vec<(ModeListenerId, Box<dyn ModeListener>)>,
    next_listener: u64,
}

impl<E: AutomationEngine> RunCoordinator<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            mode: RunMode::default(),
            running: None,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Name of the running operation, if any.
    pub fn running(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.name.as_str())
    }

    /// Compiles the operation's latest snapshot and starts it.
    pub async fn start(&mut self, name: &str, snapshot: &GraphSnapshot) -> Result<(), RunError> {
        if let Some(current) = &self.running {
            return Err(RunError::AlreadyRunning(current.name.clone()));
        }
        let tree = Compiler::builder(snapshot.clone()).build().compile()?;
        self.engine.run(vec![tree.clone()], true).await?;
        info!(operation = name, mode = %self.mode, "Started operation");
        self.running = Some(Running {
            name: name.to_string(),
            tree,
        });
        Ok(())
    }

    pub async fn stop(&mut self, name: &str) -> Result<(), RunError> {
        let tree = match &self.running {
            Some(r) if r.name == name => r.tree.clone(),
            _ => return Err(RunError::NotRunning(name.to_string())),
        };
        self.engine.run(vec![tree], false).await?;
        self.running = None;
        info!(operation = name, "Stopped operation");
        Ok(())
    }

    /// Switches the engine mode, then restarts the running operation under it.
    pub async fn change_mode(&mut self, mode: RunMode) -> Result<(), RunError> {
        self.engine.set_mode(mode).await?;
        self.mode = mode;
        info!(%mode, "Run mode changed");

        if let Some(running) = &self.running {
            let trees = vec![running.tree.clone()];
            if let Err(e) = self.restart(trees).await {
                error!(operation = %running.name, error = %e, "Restart after mode change failed");
                self.running = None;
                return Err(e);
            }
        }

        for (_, listener) in self.listeners.iter_mut() {
            listener.on_mode_change(mode);
        }
        Ok(())
    }

    pub fn subscribe(&mut self, listener: Box<dyn ModeListener>) -> ModeListenerId {
        let id = ModeListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ModeListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    async fn restart(&self, trees: Vec<ActionTree>) -> Result<(), RunError> {
        self.engine.run(trees.clone(), false).await?;
        self.engine.run(trees, true).await?;
        Ok(())
    }
}
