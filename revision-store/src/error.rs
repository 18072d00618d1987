use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("cannot replace revision file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if the error was caused by the revision file not existing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
