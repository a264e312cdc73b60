use crate::domain::MeshError;
use crate::kernel::ArrayType;

use thiserror::Error;

/// Errors returned at the boundary between the dynamics kernel and the rest of the model
#[derive(Debug, Error)]
pub enum DynamicsError {
    #[error("field '{0}' is not registered with the dynamics kernel")]
    UnregisteredField(String),

    #[error("field '{0}' is registered but has not been set")]
    MissingData(String),

    #[error("array for field '{name}' has {found} values, expected {expected}")]
    ArrayLength {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("array for field '{name}' has type {found}, expected {expected}")]
    ArrayType {
        name: String,
        expected: ArrayType,
        found: ArrayType,
    },

    #[error("invalid dynamics configuration: {0}")]
    Config(String),

    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("cannot read configuration file")]
    Io(#[from] std::io::Error),
}

pub type DynamicsResult<T> = Result<T, DynamicsError>;
