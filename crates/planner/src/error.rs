use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Simulating an unaffordable or dead-target action. Upstream filtering
    /// is supposed to make this unreachable.
    #[error("precondition violated: {0}")]
    Precondition(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}
