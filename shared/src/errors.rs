use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{code}: {message}")]
    Provider { code: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OAuth2 exchange failed: {0}")]
    OAuth(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl GatewayError {
    /// Build a provider error from a Cognito service error, keeping the
    /// error code so handlers can branch on it.
    pub fn provider(source: impl aws_sdk_cognitoidentityprovider::error::ProvideErrorMetadata) -> Self {
        let code = source.meta().code().unwrap_or("UnknownError").to_string();
        let message = source
            .meta()
            .message()
            .unwrap_or("No error message provided")
            .to_string();
        GatewayError::Provider { code, message }
    }

    pub fn is_user_not_found(&self) -> bool {
        matches!(self, GatewayError::Provider { code, .. } if code == "UserNotFoundException")
    }

    pub fn is_username_exists(&self) -> bool {
        matches!(self, GatewayError::Provider { code, .. } if code == "UsernameExistsException")
    }

    pub fn is_group_exists(&self) -> bool {
        matches!(self, GatewayError::Provider { code, .. } if code == "GroupExistsException")
    }

    /// JSON payload surfaced to the caller for provider errors.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            GatewayError::Provider { code, message } => {
                serde_json::json!({ "code": code, "message": message })
            }
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
