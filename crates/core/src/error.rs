// Error types for the ID Generator client
//
// Decision: One error enum per concern (validation, storage, auth) with thiserror
// Decision: Display strings are the inline messages shown to the user

use thiserror::Error;

use crate::validation::ValidationError;

/// Which auth call produced an error. Connectivity messages differ per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Login,
    Register,
}

impl AuthOperation {
    /// Message shown when the request never produced a response
    pub fn network_message(&self) -> &'static str {
        match self {
            AuthOperation::Login => "Unable to connect to server. Please try again later.",
            AuthOperation::Register => "Network error! Is your backend running?",
        }
    }

    /// Message shown when the server rejected the request without explaining why
    pub fn fallback_message(&self) -> &'static str {
        match self {
            AuthOperation::Login => "Login failed. Please check your credentials.",
            AuthOperation::Register => "Registration failed",
        }
    }
}

impl std::fmt::Display for AuthOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthOperation::Login => write!(f, "login"),
            AuthOperation::Register => write!(f, "register"),
        }
    }
}

/// Errors from the persistent key-value storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is not a JSON object: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the auth flows
#[derive(Error, Debug)]
pub enum AuthError {
    /// Client-side validation failed; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Server answered but refused the credentials or registration
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response
    #[error("{}", .operation.network_message())]
    Network {
        operation: AuthOperation,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a body we cannot interpret
    #[error("Unexpected response from server ({operation}, HTTP {status}): {detail}")]
    UnexpectedResponse {
        operation: AuthOperation,
        status: u16,
        detail: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Text for the inline, dismissible error message
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_network(&self) -> bool {
        matches!(self, AuthError::Network { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { .. })
    }
}
