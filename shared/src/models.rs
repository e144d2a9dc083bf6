use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{GatewayError, GatewayResult};

/// Inbound API-Gateway-style proxy event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRequest {
    pub path: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
    #[serde(rename = "queryStringParameters", default)]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(rename = "httpMethod", default)]
    pub http_method: String,
}

impl ProxyRequest {
    pub fn query(&self, name: &str) -> &str {
        self.query_string_parameters
            .get(name)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Decode the body (base64 when flagged) and parse it as a JSON object.
    /// Parse failures are invocation errors, not client 400s.
    pub fn parse_body(&self) -> GatewayResult<serde_json::Value> {
        let raw = self
            .body
            .as_deref()
            .ok_or_else(|| GatewayError::InvalidBody("no body present".to_string()))?;

        let text = if self.is_base64_encoded {
            let bytes = BASE64_STANDARD
                .decode(raw)
                .map_err(|e| GatewayError::InvalidBody(format!("base64 decode failed: {}", e)))?;
            String::from_utf8(bytes)
                .map_err(|e| GatewayError::InvalidBody(format!("body is not utf-8: {}", e)))?
        } else {
            raw.to_string()
        };

        Ok(serde_json::from_str(&text)?)
    }
}

/// Outbound proxy response: either a JSON body or a redirect.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyResponse {
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

/// One variant per supported body-path operation. Adding an operation means
/// one new variant here plus one handler arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Register,
    AdminRegister,
    Login,
    ChangePassword,
    ForgotPassword,
    ResetPassword,
    RefreshToken,
    RespondToChallenge,
}

impl CommandKind {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/register" => Some(CommandKind::Register),
            "/adminRegister" => Some(CommandKind::AdminRegister),
            "/login" => Some(CommandKind::Login),
            "/changePassword" => Some(CommandKind::ChangePassword),
            "/forgotPassword" => Some(CommandKind::ForgotPassword),
            "/resetPassword" => Some(CommandKind::ResetPassword),
            "/refreshToken" => Some(CommandKind::RefreshToken),
            "/respondToChallenge" => Some(CommandKind::RespondToChallenge),
            _ => None,
        }
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CommandKind::Register => &["username", "password"],
            CommandKind::AdminRegister => &["username", "groups"],
            CommandKind::Login => &["username", "password"],
            CommandKind::ChangePassword => &["accessToken", "password", "previousPassword"],
            CommandKind::ForgotPassword => &["username"],
            CommandKind::ResetPassword => &["username", "password", "code"],
            CommandKind::RefreshToken => &["refreshToken"],
            CommandKind::RespondToChallenge => &["username", "password", "session", "challengeName"],
        }
    }

    /// Documented missing-fields message for this operation. Literal strings,
    /// part of the response contract.
    pub fn missing_fields_message(&self) -> &'static str {
        match self {
            CommandKind::Register => "missing fields 'username', 'password'",
            CommandKind::AdminRegister => "missing fields 'username', 'groups'",
            CommandKind::Login => "missing fields 'username', 'password'",
            CommandKind::ChangePassword => {
                "missing fields 'accessToken', 'password', 'previousPassword'"
            }
            CommandKind::ForgotPassword => "missing fields 'username'",
            CommandKind::ResetPassword => "missing fields 'username', 'password', 'code'",
            CommandKind::RefreshToken => "missing fields 'refreshToken'",
            CommandKind::RespondToChallenge => {
                "missing fields 'username', 'password', 'session', 'challengeName'"
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Presence requests a random-named group for the new user.
    #[serde(rename = "createNewGroup", default)]
    pub create_new_group: Option<serde_json::Value>,
    /// Presence requests admin confirmation plus email_verified=true.
    #[serde(rename = "confirmSignUp", default)]
    pub confirm_sign_up: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminRegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// OAuth2 authorization code; when present the code flow is used instead.
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub password: String,
    #[serde(rename = "previousPassword")]
    pub previous_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub username: String,
    pub password: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondToChallengeRequest {
    pub username: String,
    pub password: String,
    /// URL-encoded session token carried over from the challenge response.
    pub session: String,
    #[serde(rename = "challengeName")]
    pub challenge_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_kind_from_path() {
        assert_eq!(CommandKind::from_path("/register"), Some(CommandKind::Register));
        assert_eq!(CommandKind::from_path("/login"), Some(CommandKind::Login));
        assert_eq!(
            CommandKind::from_path("/respondToChallenge"),
            Some(CommandKind::RespondToChallenge)
        );
        assert_eq!(CommandKind::from_path("/confirmSignUp"), None);
        assert_eq!(CommandKind::from_path("/nope"), None);
    }

    #[test]
    fn test_missing_fields_messages_name_required_fields() {
        for kind in [
            CommandKind::Register,
            CommandKind::AdminRegister,
            CommandKind::Login,
            CommandKind::ChangePassword,
            CommandKind::ForgotPassword,
            CommandKind::ResetPassword,
            CommandKind::RefreshToken,
            CommandKind::RespondToChallenge,
        ] {
            let message = kind.missing_fields_message();
            for field in kind.required_fields() {
                assert!(
                    message.contains(&format!("'{}'", field)),
                    "{:?} message does not name {}",
                    kind,
                    field
                );
            }
        }
    }

    #[test]
    fn test_parse_plain_body() {
        let request = ProxyRequest {
            body: Some(r#"{"username":"bob"}"#.to_string()),
            ..Default::default()
        };
        let obj = request.parse_body().unwrap();
        assert_eq!(obj["username"], "bob");
    }

    #[test]
    fn test_parse_base64_body() {
        let request = ProxyRequest {
            body: Some(BASE64_STANDARD.encode(r#"{"username":"bob"}"#)),
            is_base64_encoded: true,
            ..Default::default()
        };
        let obj = request.parse_body().unwrap();
        assert_eq!(obj["username"], "bob");
    }

    #[test]
    fn test_unparseable_body_is_an_error() {
        let request = ProxyRequest {
            body: Some("not json".to_string()),
            ..Default::default()
        };
        assert!(request.parse_body().is_err());
    }
}
