use crate::GatewayError;

/// Process-lifetime configuration for the auth-gateway Lambda.
/// Read once at cold start and shared by every invocation.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub pool_client_id: String,
    pub user_pool_id: String,
    /// Ordered redirect allow-list; the first entry is the default base.
    pub redirect_uris: Vec<String>,
    /// Cognito hosted-UI domain, only needed for the OAuth2 code login.
    pub cognito_domain: Option<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        let pool_client_id = require_env("POOL_CLIENT_ID")?;
        let user_pool_id = require_env("USER_POOL_ID")?;
        let redirect_uris = parse_uri_list(&require_env("REDIRECT_URI")?);
        if redirect_uris.is_empty() {
            return Err(GatewayError::Config(
                "REDIRECT_URI contains no entries".to_string(),
            ));
        }
        let cognito_domain = std::env::var("COGNITO_DOMAIN").ok();

        Ok(Self {
            pool_client_id,
            user_pool_id,
            redirect_uris,
            cognito_domain,
        })
    }

    pub fn cognito_domain(&self) -> Result<&str, GatewayError> {
        self.cognito_domain
            .as_deref()
            .ok_or_else(|| GatewayError::Config("COGNITO_DOMAIN not set".to_string()))
    }
}

/// Process-lifetime configuration for the custom-message Lambda.
#[derive(Debug, Clone)]
pub struct CustomizerConfig {
    /// Deployment domain segment used in parameter paths.
    pub domain: String,
    /// Parameter-store path prefix, e.g. "/cognito-gateway".
    pub parameter_path: String,
    /// Bucket holding message body templates.
    pub s3_bucket: String,
    /// Base for the reset-password link (first REDIRECT_URI entry).
    pub redirect_uri: String,
}

impl CustomizerConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        let domain = require_env("DOMAIN")?;
        let parameter_path = require_env("PARAMETER_PATH")?;
        let s3_bucket = require_env("S3_BUCKET")?;
        let redirect_uri = parse_uri_list(&require_env("REDIRECT_URI")?)
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Config("REDIRECT_URI contains no entries".to_string()))?;

        Ok(Self {
            domain,
            parameter_path,
            s3_bucket,
            redirect_uri,
        })
    }

    /// Parameter name: {prefix}/{domain}/{suffix}
    pub fn parameter_name(&self, suffix: &str) -> String {
        format!("{}/{}/{}", self.parameter_path, self.domain, suffix)
    }

    /// S3 object key: the parameter path without its leading slash.
    pub fn object_key(&self, suffix: &str) -> String {
        self.parameter_name(suffix)
            .trim_start_matches('/')
            .to_string()
    }
}

fn require_env(name: &str) -> Result<String, GatewayError> {
    std::env::var(name).map_err(|_| GatewayError::Config(format!("{} not set", name)))
}

/// Split a comma-separated URI list, dropping empty segments.
pub fn parse_uri_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uri_list() {
        let uris = parse_uri_list("https://a.example,http://localhost:4200");
        assert_eq!(uris, vec!["https://a.example", "http://localhost:4200"]);

        assert!(parse_uri_list("").is_empty());
        assert_eq!(parse_uri_list("https://a.example,"), vec!["https://a.example"]);
    }

    #[test]
    fn test_parameter_and_object_names() {
        let config = CustomizerConfig {
            domain: "test".to_string(),
            parameter_path: "/cognito-gateway".to_string(),
            s3_bucket: "templates".to_string(),
            redirect_uri: "http://localhost".to_string(),
        };

        assert_eq!(
            config.parameter_name("CustomMessage_SignUp/Subject"),
            "/cognito-gateway/test/CustomMessage_SignUp/Subject"
        );
        assert_eq!(
            config.object_key("CustomMessage_SignUp/Message"),
            "cognito-gateway/test/CustomMessage_SignUp/Message"
        );
    }
}
