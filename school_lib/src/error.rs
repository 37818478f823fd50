use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchoolError {
    /// The node arena ran out of slots while building this tick's tree. Either
    /// the arena is too small for the agent count or the per node capacity is
    /// too low and the tree subdivided runaway deep.
    #[error("node arena exhausted, all {capacity} slots are in use")]
    ArenaExhausted { capacity: usize },

    #[error("invalid run options: {0}")]
    InvalidOptions(String),

    #[error("could not write school data: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize school data: {0}")]
    Csv(#[from] csv::Error),
}

pub type SchoolResult<T> = Result<T, SchoolError>;
