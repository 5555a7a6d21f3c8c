use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Attached process has exited")]
    ProcessDetached,

    #[error("Invalid build profile: {0}")]
    InvalidProfile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a per-read fault that a scan absorbs locally,
    /// as opposed to a terminal condition.
    pub fn is_read_fault(&self) -> bool {
        matches!(self, Error::MemoryReadFailed { .. })
    }

    /// Check if this error means the run can no longer continue.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_) | Error::ProcessOpenFailed(_) | Error::ProcessDetached
        )
    }
}
