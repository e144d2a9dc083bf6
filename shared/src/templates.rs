use crate::utils::email_local_part;

/// Lifecycle trigger categories the customizer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    SignUp,
    ForgotPassword,
    AdminCreateUser,
}

impl TriggerKind {
    /// Map a Cognito triggerSource string; unhandled triggers return None and
    /// the event passes through untouched.
    pub fn from_source(trigger_source: &str) -> Option<Self> {
        match trigger_source {
            "CustomMessage_SignUp" => Some(TriggerKind::SignUp),
            "CustomMessage_ForgotPassword" => Some(TriggerKind::ForgotPassword),
            "CustomMessage_AdminCreateUser" => Some(TriggerKind::AdminCreateUser),
            _ => None,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            TriggerKind::SignUp => "CustomMessage_SignUp",
            TriggerKind::ForgotPassword => "CustomMessage_ForgotPassword",
            TriggerKind::AdminCreateUser => "CustomMessage_AdminCreateUser",
        }
    }

    pub fn default_subject(&self) -> &'static str {
        match self {
            TriggerKind::SignUp => "Your Verification Link",
            TriggerKind::ForgotPassword => "Your Reset Password link",
            TriggerKind::AdminCreateUser => "Your Account has been Created",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            TriggerKind::SignUp => "Thank you for signing up. ${link}",
            TriggerKind::ForgotPassword => "You have requested a password reset. ${link}",
            TriggerKind::AdminCreateUser => "Your account has been created. ${link}",
        }
    }

    pub fn link_path(&self) -> &'static str {
        match self {
            TriggerKind::SignUp => "/confirmSignUp",
            TriggerKind::ForgotPassword => "/lostpassword",
            TriggerKind::AdminCreateUser => "/confirmRegistration",
        }
    }

    pub fn link_text(&self) -> &'static str {
        match self {
            TriggerKind::SignUp => "Click this link to verify",
            TriggerKind::ForgotPassword => "Click this link to Reset Password",
            TriggerKind::AdminCreateUser => "Click this link to finalize your account.",
        }
    }
}

/// Subject and body resolved for one trigger; body may contain the
/// ${link}, ${email} and ${emailLocal} placeholder tokens.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub subject: String,
    pub message: String,
}

impl MessageTemplate {
    /// Stored values win; absent or empty values fall back to the
    /// compiled-in defaults for the trigger.
    pub fn resolve(kind: TriggerKind, subject: Option<String>, message: Option<String>) -> Self {
        Self {
            subject: subject
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| kind.default_subject().to_string()),
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| kind.default_message().to_string()),
        }
    }
}

/// Fields merged into the verification/reset link, in their fixed query order.
#[derive(Debug, Clone)]
pub struct LinkFields<'a> {
    pub user_status: &'a str,
    pub code: &'a str,
    pub username: &'a str,
    pub client_id: &'a str,
    pub region: &'a str,
    pub email: &'a str,
}

/// Build the anchor element pointing at the confirmation/reset endpoint.
/// Query parameter order is fixed: userStatus, code, username, clientId,
/// region, email.
pub fn build_link(base: &str, kind: TriggerKind, fields: &LinkFields<'_>, text: &str) -> String {
    format!(
        "<a href=\"{}{}?userStatus={}&code={}&username={}&clientId={}&region={}&email={}\" target=\"_blank\">{}</a>",
        base,
        kind.link_path(),
        fields.user_status,
        fields.code,
        fields.username,
        fields.client_id,
        fields.region,
        fields.email,
        text
    )
}

/// Substitute the placeholder tokens in the message body. Literal substring
/// replacement, first occurrence only.
pub fn render_message(template: &str, link: &str, email: &str) -> String {
    template
        .replacen("${link}", link, 1)
        .replacen("${email}", email, 1)
        .replacen("${emailLocal}", email_local_part(email), 1)
}
