use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid media key: {0}")]
    InvalidKey(String),
}
