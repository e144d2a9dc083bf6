use aws_sdk_cognitoidentityprovider::types::{
    AttributeType, AuthFlowType, AuthenticationResultType, ChallengeNameType,
};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use serde_json::{json, Value};
use tracing::info;

use crate::{GatewayError, GatewayResult};

/// Typed wrapper over every Cognito operation the gateway consumes. One
/// client per process; errors are mapped to `GatewayError::Provider` with the
/// service error code preserved for branching.
pub struct CognitoService {
    client: CognitoClient,
    pool_client_id: String,
    user_pool_id: String,
}

impl CognitoService {
    pub fn new(client: CognitoClient, pool_client_id: String, user_pool_id: String) -> Self {
        Self {
            client,
            pool_client_id,
            user_pool_id,
        }
    }

    pub async fn sign_up(&self, username: &str, password: &str) -> GatewayResult<()> {
        self.client
            .sign_up()
            .client_id(&self.pool_client_id)
            .username(username)
            .password(password)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        info!("Signed up user: {}", username);
        Ok(())
    }

    pub async fn create_group(&self, group_name: &str) -> GatewayResult<()> {
        self.client
            .create_group()
            .group_name(group_name)
            .user_pool_id(&self.user_pool_id)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        info!("Created group: {}", group_name);
        Ok(())
    }

    pub async fn admin_add_user_to_group(
        &self,
        group_name: &str,
        username: &str,
    ) -> GatewayResult<()> {
        self.client
            .admin_add_user_to_group()
            .group_name(group_name)
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        info!("Added user {} to group {}", username, group_name);
        Ok(())
    }

    pub async fn admin_confirm_sign_up(&self, username: &str) -> GatewayResult<()> {
        self.client
            .admin_confirm_sign_up()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(())
    }

    /// Mark the user's email attribute verified.
    pub async fn admin_mark_email_verified(&self, username: &str) -> GatewayResult<()> {
        let attribute = AttributeType::builder()
            .name("email_verified")
            .value("true")
            .build()
            .map_err(|e| GatewayError::Config(format!("invalid user attribute: {}", e)))?;

        self.client
            .admin_update_user_attributes()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .user_attributes(attribute)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(())
    }

    /// Administrative user creation: no caller-supplied password, Cognito
    /// generates the invitation flow.
    pub async fn admin_create_user(
        &self,
        username: &str,
        email: Option<&str>,
    ) -> GatewayResult<()> {
        let mut request = self
            .client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(username);

        if let Some(email) = email {
            let attribute = AttributeType::builder()
                .name("email")
                .value(email)
                .build()
                .map_err(|e| GatewayError::Config(format!("invalid user attribute: {}", e)))?;
            request = request.user_attributes(attribute);
        }

        request
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        info!("Admin-created user: {}", username);
        Ok(())
    }

    /// Current pool status for the user, e.g. FORCE_CHANGE_PASSWORD.
    pub async fn admin_get_user_status(&self, username: &str) -> GatewayResult<String> {
        let output = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(output
            .user_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default())
    }

    pub async fn admin_set_user_password(
        &self,
        username: &str,
        password: &str,
        permanent: bool,
    ) -> GatewayResult<()> {
        self.client
            .admin_set_user_password()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .password(password)
            .permanent(permanent)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(())
    }

    /// USER_PASSWORD_AUTH flow. The payload keeps the provider's wire casing
    /// so callers see the same shape the provider documents.
    pub async fn initiate_password_auth(
        &self,
        username: &str,
        password: &str,
    ) -> GatewayResult<Value> {
        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.pool_client_id)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(auth_payload(
            output.challenge_name().map(|c| c.as_str()),
            output.session(),
            output.challenge_parameters().map(|p| json!(p)),
            output.authentication_result(),
        ))
    }

    /// REFRESH_TOKEN_AUTH flow.
    pub async fn initiate_refresh_auth(&self, refresh_token: &str) -> GatewayResult<Value> {
        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::RefreshTokenAuth)
            .client_id(&self.pool_client_id)
            .auth_parameters("REFRESH_TOKEN", refresh_token)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(auth_payload(
            output.challenge_name().map(|c| c.as_str()),
            output.session(),
            output.challenge_parameters().map(|p| json!(p)),
            output.authentication_result(),
        ))
    }

    /// Answer an auth challenge; the challenge name is the provider's
    /// required discriminator and the session must already be URL-decoded.
    pub async fn respond_to_auth_challenge(
        &self,
        challenge_name: &str,
        username: &str,
        new_password: &str,
        session: &str,
    ) -> GatewayResult<Value> {
        let output = self
            .client
            .respond_to_auth_challenge()
            .client_id(&self.pool_client_id)
            .challenge_name(ChallengeNameType::from(challenge_name))
            .challenge_responses("USERNAME", username)
            .challenge_responses("NEW_PASSWORD", new_password)
            .session(session)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(auth_payload(
            output.challenge_name().map(|c| c.as_str()),
            output.session(),
            output.challenge_parameters().map(|p| json!(p)),
            output.authentication_result(),
        ))
    }

    pub async fn change_password(
        &self,
        access_token: &str,
        previous_password: &str,
        proposed_password: &str,
    ) -> GatewayResult<()> {
        self.client
            .change_password()
            .access_token(access_token)
            .previous_password(previous_password)
            .proposed_password(proposed_password)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(())
    }

    pub async fn forgot_password(&self, username: &str) -> GatewayResult<()> {
        self.client
            .forgot_password()
            .client_id(&self.pool_client_id)
            .username(username)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        info!("Password reset initiated for: {}", username);
        Ok(())
    }

    pub async fn confirm_forgot_password(
        &self,
        username: &str,
        password: &str,
        code: &str,
    ) -> GatewayResult<()> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.pool_client_id)
            .username(username)
            .password(password)
            .confirmation_code(code)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(())
    }

    pub async fn confirm_sign_up(&self, username: &str, code: &str) -> GatewayResult<()> {
        self.client
            .confirm_sign_up()
            .client_id(&self.pool_client_id)
            .username(username)
            .confirmation_code(code)
            .send()
            .await
            .map_err(|e| GatewayError::provider(e.into_service_error()))?;

        Ok(())
    }
}

/// Reassemble an auth response in the provider's wire shape. Only the fields
/// handlers branch on plus the token block are carried.
fn auth_payload(
    challenge_name: Option<&str>,
    session: Option<&str>,
    challenge_parameters: Option<Value>,
    result: Option<&AuthenticationResultType>,
) -> Value {
    let mut payload = serde_json::Map::new();

    if let Some(name) = challenge_name {
        payload.insert("ChallengeName".to_string(), json!(name));
    }
    if let Some(session) = session {
        payload.insert("Session".to_string(), json!(session));
    }
    if let Some(parameters) = challenge_parameters {
        payload.insert("ChallengeParameters".to_string(), parameters);
    }
    if let Some(result) = result {
        payload.insert(
            "AuthenticationResult".to_string(),
            authentication_result_payload(result),
        );
    }

    Value::Object(payload)
}

fn authentication_result_payload(result: &AuthenticationResultType) -> Value {
    let mut tokens = serde_json::Map::new();
    if let Some(token) = result.access_token() {
        tokens.insert("AccessToken".to_string(), json!(token));
    }
    tokens.insert("ExpiresIn".to_string(), json!(result.expires_in()));
    if let Some(token_type) = result.token_type() {
        tokens.insert("TokenType".to_string(), json!(token_type));
    }
    if let Some(token) = result.refresh_token() {
        tokens.insert("RefreshToken".to_string(), json!(token));
    }
    if let Some(token) = result.id_token() {
        tokens.insert("IdToken".to_string(), json!(token));
    }
    Value::Object(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_payload_with_challenge() {
        let payload = auth_payload(
            Some("NEW_PASSWORD_REQUIRED"),
            Some("session-token"),
            Some(json!({"USER_ID_FOR_SRP": "bob"})),
            None,
        );

        assert_eq!(payload["ChallengeName"], "NEW_PASSWORD_REQUIRED");
        assert_eq!(payload["Session"], "session-token");
        assert_eq!(payload["ChallengeParameters"]["USER_ID_FOR_SRP"], "bob");
        assert!(payload.get("AuthenticationResult").is_none());
    }

    #[test]
    fn test_auth_payload_with_tokens() {
        let result = AuthenticationResultType::builder()
            .access_token("access")
            .expires_in(3600)
            .token_type("Bearer")
            .refresh_token("refresh")
            .id_token("id")
            .build();

        let payload = auth_payload(None, None, None, Some(&result));
        let tokens = &payload["AuthenticationResult"];
        assert_eq!(tokens["AccessToken"], "access");
        assert_eq!(tokens["ExpiresIn"], 3600);
        assert_eq!(tokens["TokenType"], "Bearer");
        assert_eq!(tokens["RefreshToken"], "refresh");
        assert_eq!(tokens["IdToken"], "id");
        assert!(payload.get("ChallengeName").is_none());
    }
}
