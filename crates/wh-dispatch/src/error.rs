use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("task list parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
