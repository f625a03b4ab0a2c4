//! Errors raised while deriving names from test locations.

use thiserror::Error;

/// A test location could not be turned into a linkable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("test location '{location}' does not end with a recognized source suffix ({expected})")]
    MissingSuffix { location: String, expected: String },

    #[error("test location '{location}' is empty once its suffix is removed")]
    Empty { location: String },

    #[error("test location '{location}' yields '{name}', which is not a valid routine identifier: {reason}")]
    InvalidIdentifier {
        location: String,
        name: String,
        reason: String,
    },
}

impl NamingError {
    /// The offending test location.
    pub fn location(&self) -> &str {
        match self {
            NamingError::MissingSuffix { location, .. }
            | NamingError::Empty { location }
            | NamingError::InvalidIdentifier { location, .. } => location,
        }
    }
}
