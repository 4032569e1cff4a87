use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Found conflicting tweaks with the ID '{0}'")]
    DuplicateTweakId(String),

    #[error("A consumer of type {0} has already been registered; only one consumer per type is allowed")]
    ConsumerAlreadyRegistered(String),

    #[error("No consumer of type {0} is registered")]
    ConsumerNotRegistered(String),

    #[error("The registered consumer of type {0} differs from the one being unregistered")]
    ConsumerMismatch(String),

    #[error("Settings not loaded: {0}")]
    SettingsNotLoaded(String),

    #[error("Consumer {0} is already borrowed")]
    ConsumerBusy(String),

    #[error("Slot rejected settings: {0}")]
    SlotRejected(String),

    #[error("Patch {patch_id} is already applied by {owner}")]
    PatchConflict { patch_id: String, owner: String },

    #[error("Failed to install patch on {target}: {message}")]
    InstallFailed { target: String, message: String },

    #[error("Failed to remove patch {handle}: {message}")]
    RemoveFailed { handle: u64, message: String },

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Configuration errors are authoring bugs rather than runtime conditions.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::DuplicateTweakId(_)
                | Error::ConsumerAlreadyRegistered(_)
                | Error::ConsumerNotRegistered(_)
                | Error::ConsumerMismatch(_)
        )
    }
}
