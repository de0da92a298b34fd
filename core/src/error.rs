use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Pool nesting exceeded maximum depth {depth}")]
    DepthExceeded { depth: usize },

    #[error("Invalid table name '{name}': expected 'namespace:id'")]
    InvalidTableName { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PoolResult<T> = Result<T, PoolError>;
