use serde::Deserialize;
use tracing::debug;

use crate::GatewayResult;

/// Tokens returned by the hosted-UI token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
}

/// Subset of the userInfo response the gateway carries through.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// OAuth2 authorization-code exchange against the Cognito hosted-UI domain.
/// This is the one path that bypasses the primary SDK and talks HTTPS
/// directly.
pub struct OAuthService {
    http: reqwest::Client,
    pool_client_id: String,
}

impl OAuthService {
    pub fn new(pool_client_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            pool_client_id,
        }
    }

    /// Exchange an authorization code for tokens. The redirect URI must match
    /// the one used on the authorize call.
    pub async fn exchange_code(
        &self,
        domain: &str,
        code: &str,
        redirect_uri: &str,
    ) -> GatewayResult<TokenResponse> {
        debug!("Exchanging authorization code at {}/oauth2/token", domain);

        let response = self
            .http
            .post(format!("{}/oauth2/token", domain))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.pool_client_id.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<TokenResponse>().await?)
    }

    pub async fn user_info(&self, domain: &str, access_token: &str) -> GatewayResult<UserInfo> {
        let response = self
            .http
            .get(format!("{}/oauth2/userInfo", domain))
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<UserInfo>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{
            "access_token": "access",
            "id_token": "id",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "token_type": "Bearer"
        }"#;
        let tokens: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(tokens.expires_in, 3600);
    }

    #[test]
    fn test_user_info_parsing_without_email() {
        let info: UserInfo = serde_json::from_str(r#"{"username": "bob"}"#).unwrap();
        assert_eq!(info.username, "bob");
        assert!(info.email.is_none());
    }
}
