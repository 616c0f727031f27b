use thiserror::Error;

/// Library error type for carousel operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured container id does not resolve to an element.
    #[error("container element '{0}' not found")]
    ContainerNotFound(String),

    /// The image source could not be read or fetched.
    #[error("failed to fetch images from {origin}: {reason}")]
    SourceFetchFailed { origin: String, reason: String },

    /// The image source was reachable but its payload did not match the expected schema.
    #[error("malformed image data from {origin}: {reason}")]
    MalformedImageData { origin: String, reason: String },

    /// Construction input failed validation.
    #[error("invalid carousel configuration: {0}")]
    InvalidConfig(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn fetch(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceFetchFailed {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedImageData {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
