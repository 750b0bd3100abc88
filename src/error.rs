use crate::graph::NodeId;
use thiserror::Error;

/// Errors raised while building or mutating a block graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Block type '{0}' is not registered")]
    UnknownNodeType(String),

    #[error("Node '{0}' does not exist in the graph")]
    NodeNotFound(NodeId),

    #[error("A node with id '{0}' already exists in the graph")]
    DuplicateNodeId(NodeId),

    #[error("Block type '{type_id}' has no field named '{field}'")]
    UnknownField { type_id: String, field: String },

    #[error("Block type '{type_id}' has no slot named '{slot}'")]
    UnknownSlot { type_id: String, slot: String },

    #[error("Slot '{slot}' on node '{node_id}' expects {expected}, but was given {found}")]
    InvalidSlotArity {
        node_id: NodeId,
        slot: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(
        "Node '{child_id}' of type '{child_type}' cannot be placed in slot '{slot}' of node '{node_id}': {message}"
    )]
    TypeMismatchInSlot {
        node_id: NodeId,
        slot: String,
        child_id: NodeId,
        child_type: String,
        message: &'static str,
    },

    #[error("Binding node '{child_id}' under '{node_id}' would make it its own ancestor")]
    WouldCreateCycle { node_id: NodeId, child_id: NodeId },

    #[error("Node '{0}' is not a member of a statement chain")]
    NotInChain(NodeId),
}

/// Errors raised while emitting source code from a block graph.
///
/// Every variant carries the id of the node that caused it so the editor can
/// highlight the failing block.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("Node '{node_id}' references unregistered block type '{type_id}'")]
    UnknownNodeType { node_id: NodeId, type_id: String },

    #[error("No renderer is registered for block type '{type_id}' (node '{node_id}')")]
    UnhandledNodeType { node_id: NodeId, type_id: String },

    #[error("Node '{node_id}' is missing required field '{field}'")]
    MissingRequiredField { node_id: NodeId, field: String },

    #[error("Node '{node_id}' is missing required slot '{slot}'")]
    MissingRequiredSlot { node_id: NodeId, slot: String },

    #[error("Field '{field}' on node '{node_id}' has invalid value '{value}': {reason}")]
    InvalidFieldValue {
        node_id: NodeId,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Node '{node_id}' of type '{type_id}' cannot be placed here: {message}")]
    InvalidPlacement {
        node_id: NodeId,
        type_id: String,
        message: String,
    },

    #[error(
        "Slot '{slot}' on node '{node_id}' holds node '{child_id}', which {message}"
    )]
    TypeMismatchInSlot {
        node_id: NodeId,
        slot: String,
        child_id: NodeId,
        message: &'static str,
    },

    #[error("Node '{node_id}' was reached twice while walking the graph; the chain is cyclic")]
    CyclicChain { node_id: NodeId },

    #[error("Node '{0}' is referenced by the graph but does not exist")]
    DanglingReference(NodeId),
}

impl EmitError {
    /// The node the editor should highlight for this error.
    pub fn node_id(&self) -> &NodeId {
        match self {
            EmitError::UnknownNodeType { node_id, .. }
            | EmitError::UnhandledNodeType { node_id, .. }
            | EmitError::MissingRequiredField { node_id, .. }
            | EmitError::MissingRequiredSlot { node_id, .. }
            | EmitError::InvalidFieldValue { node_id, .. }
            | EmitError::InvalidPlacement { node_id, .. }
            | EmitError::TypeMismatchInSlot { node_id, .. }
            | EmitError::CyclicChain { node_id } => node_id,
            EmitError::DanglingReference(node_id) => node_id,
        }
    }
}

/// Errors reported by the external refinement collaborator.
///
/// These never describe a problem with the block graph itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefinementError {
    #[error("http error: {0}")]
    Http(String),

    #[error("response error: {0}")]
    Response(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("refinement request timed out after {0} seconds")]
    Timeout(u64),

    #[error("refinement response contained no code")]
    EmptyResponse,

    #[error("missing API key: environment variable '{0}' is not set")]
    MissingApiKey(String),
}

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for environment variable '{name}': '{value}'")]
    InvalidEnv { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
