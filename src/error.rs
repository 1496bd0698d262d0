use thiserror::Error;

/// Errors that can occur while compiling a graph snapshot into an action tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("The graph is empty; place at least one key element")]
    EmptyGraph,

    #[error("The action must start on a key element, but node '{node_id}' is a {found}")]
    StartNotKeyElement { node_id: String, found: String },

    #[error("The path reaching node '{node_id}' is longer than {limit} actions")]
    PathTooDeep { node_id: String, limit: usize },
}

/// Reasons the canvas refuses a new connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("A node cannot be connected to itself ('{0}')")]
    SelfLoop(String),

    #[error("Node '{0}' is not on the canvas")]
    UnknownNode(String),

    #[error("Node '{node_id}' has no port '{port}'")]
    UnknownPort { node_id: String, port: String },

    #[error("An identical connection {source_node}:{source_port} -> {target_node}:{target_port} already exists")]
    Duplicate {
        source_node: String,
        source_port: String,
        target_node: String,
        target_port: String,
    },
}

/// Errors raised by the node edit menus and dialogs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Node '{0}' is not on the canvas")]
    UnknownNode(String),

    #[error("Edge '{0}' is not on the canvas")]
    UnknownEdge(String),

    #[error("No menu is open")]
    NoMenuOpen,

    #[error("No dialog is open")]
    NoDialogOpen,

    #[error("Menu item '{0}' is not offered for this node")]
    ItemNotOffered(String),

    #[error("Menu item '{0}' is disabled")]
    ItemDisabled(String),

    #[error("Sample a color before saving it")]
    NoSample,

    #[error("The submitted values do not belong to the open '{0}' dialog")]
    DialogMismatch(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Timer '{0}' is no longer on the canvas")]
    UnknownTimer(String),

    #[error("A signed-in user is required to save colors")]
    NotSignedIn,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Failures reported by an external collaborator (catalog, persistence, sampler, engine).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Service request failed: {0}")]
    Transport(String),

    #[error("Service rejected the request (code {code}): {message}")]
    Rejected { code: u32, message: String },

    #[error("Could not parse color sample '{raw}': {message}")]
    SampleParse { raw: String, message: String },
}

/// Errors raised when saving an operation from the editor form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("The operation name must not be empty")]
    EmptyName,

    #[error("A signed-in user is required to save operations")]
    NotSignedIn,

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Failed to serialize the graph: {0}")]
    Serialize(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Errors raised when starting, stopping or switching running operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("Operation '{0}' is already running; stop it first")]
    AlreadyRunning(String),

    #[error("Operation '{0}' is not running")]
    NotRunning(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Errors raised while reading persisted or legacy graph data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}' has invalid payload data: {message}")]
    InvalidPayload { node_id: String, message: String },

    #[error("Edge '{edge_id}' is invalid: {message}")]
    InvalidEdge { edge_id: String, message: String },

    #[error("Invalid RGB value '{0}', expected 'r,g,b'")]
    InvalidRgb(String),
}

/// Errors raised while loading the editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{path}': {message}")]
    Parse { path: String, message: String },
}
