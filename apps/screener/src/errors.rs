use thiserror::Error;

/// Failure talking to the remote analysis service.
///
/// Nothing here is fatal: callers turn every variant into a notification
/// plus a safe default via [`ClientError::user_message`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ClientError {
    /// Short sentence safe to show in a notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http(e) => {
                tracing::error!("Transport error: {e}");
                if e.is_timeout() {
                    "The analysis service took too long to respond".to_string()
                } else {
                    "Could not reach the analysis service".to_string()
                }
            }
            ClientError::Api { status, message } => {
                tracing::error!("Service returned {status}: {message}");
                if *status >= 500 {
                    "The analysis service ran into an error".to_string()
                } else if message.is_empty() {
                    format!("Request rejected (status {status})")
                } else {
                    message.clone()
                }
            }
            ClientError::Parse(e) => {
                tracing::error!("Malformed response: {e}");
                "Received an unreadable response from the analysis service".to_string()
            }
            ClientError::Io(e) => {
                tracing::error!("I/O error: {e}");
                "Could not read the selected file".to_string()
            }
            ClientError::NotFound(what) => format!("{what} was not found"),
        }
    }
}
