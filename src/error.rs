use thiserror::Error;

/// Errors surfaced by the backend client and the key-value store.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },
}

pub type StoreError = Error;
