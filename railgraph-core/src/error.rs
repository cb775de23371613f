use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("There is no such node {0}")]
    MissingNode(NodeId),
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("Storage error: {0}")]
    Store(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
