use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, info};

use gateway_shared::{
    build_link, render_message, CustomizerConfig, LinkFields, TemplateService, TriggerKind,
};

// Custom structs to handle Cognito's null values properly
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomMessageRequest {
    pub user_attributes: HashMap<String, String>,
    pub code_parameter: Option<String>,
    pub username_parameter: Option<String>,
    pub client_metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomMessageResponse {
    pub sms_message: Option<String>,
    pub email_message: Option<String>,
    pub email_subject: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomMessageEvent {
    pub version: Option<String>,
    pub trigger_source: String,
    pub region: String,
    pub user_pool_id: String,
    pub user_name: String,
    pub caller_context: HashMap<String, Value>,
    pub request: CustomMessageRequest,
    pub response: CustomMessageResponse,
}

async fn function_handler(
    templates: &TemplateService,
    event: LambdaEvent<CustomMessageEvent>,
) -> Result<CustomMessageEvent, Error> {
    let mut response_event = event.payload;

    info!("Trigger source: {}", response_event.trigger_source);

    match customize(templates, &mut response_event).await {
        Ok(_) => Ok(response_event),
        Err(e) => {
            // Never block the Cognito flow over a customization failure;
            // the pool falls back to its own default message.
            error!("Failed to compose custom message: {}", e);
            Ok(response_event)
        }
    }
}

async fn customize(
    templates: &TemplateService,
    event: &mut CustomMessageEvent,
) -> Result<(), Error> {
    let Some(kind) = TriggerKind::from_source(&event.trigger_source) else {
        info!("Unhandled trigger source: {}", event.trigger_source);
        return Ok(());
    };

    let template = templates.template_for(kind).await;

    // Reset links point back at the web app; confirmation links point at the
    // gateway's own HTTP API.
    let base = match kind {
        TriggerKind::ForgotPassword => templates.config().redirect_uri.clone(),
        TriggerKind::SignUp | TriggerKind::AdminCreateUser => templates
            .http_api_url()
            .await
            .ok_or("CognitoHttpApiUrl parameter not readable")?,
    };

    let email = event
        .request
        .user_attributes
        .get("email")
        .cloned()
        .unwrap_or_default();
    let user_status = event
        .request
        .user_attributes
        .get("cognito:user_status")
        .cloned()
        .unwrap_or_default();
    let client_id = event
        .caller_context
        .get("clientId")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let fields = LinkFields {
        user_status: &user_status,
        code: event.request.code_parameter.as_deref().unwrap_or_default(),
        username: &event.user_name,
        client_id,
        region: &event.region,
        email: link_email(kind, event.request.username_parameter.as_deref(), &email),
    };

    let link = build_link(&base, kind, &fields, kind.link_text());

    event.response.email_subject = Some(template.subject);
    event.response.email_message = Some(render_message(&template.message, &link, &email));

    info!("Composed {} message for {}", event.trigger_source, event.user_name);
    Ok(())
}

/// The link's email parameter. Admin-created users get the username
/// placeholder so Cognito substitutes the real username at send time.
fn link_email<'a>(kind: TriggerKind, username_parameter: Option<&'a str>, email: &'a str) -> &'a str {
    match kind {
        TriggerKind::AdminCreateUser => username_parameter.unwrap_or(email),
        _ => email,
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let config = CustomizerConfig::from_env()?;

    // Clients are constructed once and shared across invocations.
    let templates = TemplateService::new(
        aws_sdk_ssm::Client::new(&sdk_config),
        aws_sdk_s3::Client::new(&sdk_config),
        config,
    );
    let templates = &templates;

    run(service_fn(move |event| async move {
        function_handler(templates, event).await
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_email_uses_username_placeholder_for_admin_create() {
        assert_eq!(
            link_email(TriggerKind::AdminCreateUser, Some("{username}"), "a@b.com"),
            "{username}"
        );
        assert_eq!(
            link_email(TriggerKind::AdminCreateUser, None, "a@b.com"),
            "a@b.com"
        );
        assert_eq!(
            link_email(TriggerKind::SignUp, Some("{username}"), "a@b.com"),
            "a@b.com"
        );
        assert_eq!(link_email(TriggerKind::ForgotPassword, None, "a@b.com"), "a@b.com");
    }

    #[test]
    fn test_event_round_trip() {
        let json = r#"{
            "version": "1",
            "triggerSource": "CustomMessage_SignUp",
            "region": "us-east-2",
            "userPoolId": "us-east-2_pool",
            "userName": "42575cda",
            "callerContext": {"awsSdkVersion": "aws-sdk-js-2.6.4", "clientId": "197cl4e"},
            "request": {
                "userAttributes": {
                    "cognito:user_status": "UNCONFIRMED",
                    "email": "mfriesen@gmail.com"
                },
                "codeParameter": "{####}",
                "usernameParameter": null,
                "clientMetadata": null
            },
            "response": {"smsMessage": null, "emailMessage": null, "emailSubject": null}
        }"#;

        let event: CustomMessageEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.trigger_source, "CustomMessage_SignUp");
        assert_eq!(event.request.code_parameter.as_deref(), Some("{####}"));
        assert_eq!(
            event.request.user_attributes.get("cognito:user_status").map(String::as_str),
            Some("UNCONFIRMED")
        );

        let echoed = serde_json::to_value(&event).unwrap();
        assert_eq!(echoed["userPoolId"], "us-east-2_pool");
        assert_eq!(echoed["callerContext"]["clientId"], "197cl4e");
    }
}
