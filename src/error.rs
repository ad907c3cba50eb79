use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no details"))]
    Http {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    /// The single line shown to the user for this failure. Server-supplied
    /// messages win; everything else gets a generic text.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(e) => {
                tracing::error!("Network error: {}", e);
                "Could not reach the server. Please check the API address.".to_string()
            }
            ClientError::Http {
                message: Some(msg), ..
            } => msg.clone(),
            ClientError::Http {
                status,
                message: None,
            } => {
                tracing::warn!("Request failed with status {} and no error body", status);
                format!("Request failed ({})", status.as_u16())
            }
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Parse(e) => {
                tracing::error!("Unexpected response: {}", e);
                "The server sent an unexpected response.".to_string()
            }
            ClientError::Config(msg) => msg.clone(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parse(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Trim `value` and fail with a validation error naming `field` when
/// nothing is left.
pub fn require<'a>(field: &str, value: &'a str) -> ClientResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ClientError::Validation(format!("{field} is required.")))
    } else {
        Ok(trimmed)
    }
}
