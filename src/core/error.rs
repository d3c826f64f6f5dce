use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Not available: {0}")]
    NotAvailable(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProbeError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProbeError::Io { path: path.into(), source }
    }

    /// Returns `true` if the data source is simply missing on this host.
    pub fn is_missing(&self) -> bool {
        match self {
            ProbeError::NotAvailable(_) => true,
            ProbeError::Io { source, .. } | ProbeError::IoError(source) => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
