use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use futures_util::future::try_join_all;
use serde_json::{json, Value};
use std::future::Future;
use tracing::{error, info};

use gateway_shared::{
    redirect, resolve_redirect_uri, response, AdminRegisterRequest, ChangePasswordRequest,
    CognitoService, CommandKind, ForgotPasswordRequest, GatewayConfig, GatewayError,
    GatewayResult, LoginRequest, OAuthService, ProxyRequest, ProxyResponse, RefreshTokenRequest,
    RegisterRequest, ResetPasswordRequest, RespondToChallengeRequest,
};
use gateway_shared::utils::{random_password, random_string};
use gateway_shared::validation::is_valid_fields;

/// Clients and configuration constructed once at process start and shared by
/// every invocation.
pub struct HandlerContext {
    pub cognito: CognitoService,
    pub oauth: OAuthService,
    pub config: GatewayConfig,
}

impl HandlerContext {
    pub fn new(sdk_config: &aws_config::SdkConfig, config: GatewayConfig) -> Self {
        let cognito = CognitoService::new(
            CognitoClient::new(sdk_config),
            config.pool_client_id.clone(),
            config.user_pool_id.clone(),
        );
        let oauth = OAuthService::new(config.pool_client_id.clone());
        Self {
            cognito,
            oauth,
            config,
        }
    }
}

/// Route one proxy event to exactly one handler. Dispatch order matters:
/// body paths, then the query-driven confirm paths, then the OPTIONS
/// preflight short-circuit, then the invalid-body catch-all.
pub async fn route(ctx: &HandlerContext, request: ProxyRequest) -> GatewayResult<ProxyResponse> {
    if let (Some(path), true) = (request.path.as_deref(), request.body.is_some()) {
        let obj = request.parse_body()?;

        let Some(kind) = CommandKind::from_path(path) else {
            return Ok(response(400, &json!({"message": "invalid request"})));
        };

        // The code login carries no username/password.
        let skip_validation = kind == CommandKind::Login && obj.get("code").is_some();
        if !skip_validation && !is_valid_fields(&obj, kind.required_fields()) {
            return Ok(response(
                400,
                &json!({"message": kind.missing_fields_message()}),
            ));
        }

        let result = dispatch(ctx, kind, obj, &request).await;

        // Provider failures surface as 400 with the provider payload unless
        // a handler already mapped them (admin-register, forgot-password).
        return match result {
            Ok(resp) => Ok(resp),
            Err(err @ GatewayError::Provider { .. }) => {
                error!("Provider error: {}", err);
                Ok(response(400, &err.to_payload()))
            }
            // A body that validated but does not decode into the command's
            // payload (e.g. a null username) is still a client error.
            Err(GatewayError::Serialization(err)) => {
                error!("Body decode failed: {}", err);
                Ok(response(400, &json!({"message": "invalid request body"})))
            }
            Err(err) => Err(err),
        };
    }

    let path = request.path.as_deref().unwrap_or_default();
    if path == "/confirmSignUp" {
        return Ok(confirm_sign_up(ctx, &request).await);
    }
    if path == "/confirmRegistration" {
        return Ok(confirm_registration(ctx, &request).await);
    }
    if request.http_method == "OPTIONS" {
        return Ok(response(200, &json!({"message": "it's all good"})));
    }

    Ok(response(400, &json!({"message": "invalid body"})))
}

/// Decode the body into the command's payload and run the handler. Decode
/// failures come back as `GatewayError::Serialization` for the caller to map.
async fn dispatch(
    ctx: &HandlerContext,
    kind: CommandKind,
    obj: Value,
    request: &ProxyRequest,
) -> GatewayResult<ProxyResponse> {
    match kind {
        CommandKind::Register => register(ctx, serde_json::from_value(obj)?).await,
        CommandKind::AdminRegister => admin_register(ctx, serde_json::from_value(obj)?).await,
        CommandKind::Login => login(ctx, serde_json::from_value(obj)?, request).await,
        CommandKind::ChangePassword => change_password(ctx, serde_json::from_value(obj)?).await,
        CommandKind::ForgotPassword => forgot_password(ctx, serde_json::from_value(obj)?).await,
        CommandKind::ResetPassword => reset_password(ctx, serde_json::from_value(obj)?).await,
        CommandKind::RefreshToken => refresh_token(ctx, serde_json::from_value(obj)?).await,
        CommandKind::RespondToChallenge => {
            respond_to_challenge(ctx, serde_json::from_value(obj)?).await
        }
    }
}

async fn register(ctx: &HandlerContext, req: RegisterRequest) -> GatewayResult<ProxyResponse> {
    ctx.cognito.sign_up(&req.username, &req.password).await?;

    if req.create_new_group.is_some() {
        let group_name = random_string(10);
        ctx.cognito.create_group(&group_name).await?;
        ctx.cognito
            .admin_add_user_to_group(&group_name, &req.username)
            .await?;
    }

    if req.confirm_sign_up.is_some() {
        ctx.cognito.admin_confirm_sign_up(&req.username).await?;
        ctx.cognito.admin_mark_email_verified(&req.username).await?;
    }

    Ok(response(200, &json!({"message": "User registered"})))
}

async fn admin_register(
    ctx: &HandlerContext,
    req: AdminRegisterRequest,
) -> GatewayResult<ProxyResponse> {
    if let Err(err) = ctx
        .cognito
        .admin_create_user(&req.username, req.email.as_deref())
        .await
    {
        if err.is_username_exists() {
            return Ok(response(400, &err.to_payload()));
        }
        error!("Admin register failed for {}: {}", req.username, err);
        return Ok(response(500, &json!({"message": "Internal Server Error"})));
    }

    let memberships = req
        .groups
        .iter()
        .map(|group| ensure_group_membership(ctx, group, &req.username));

    if let Err(err) = join_group_memberships(memberships).await {
        error!("Group setup failed for {}: {}", req.username, err);
        return Ok(response(500, &json!({"message": "Internal Server Error"})));
    }

    Ok(response(200, &json!({"message": "User registered"})))
}

/// All group branches run concurrently and must finish before the response
/// goes out; one rejection fails the aggregate.
async fn join_group_memberships<F>(memberships: impl IntoIterator<Item = F>) -> GatewayResult<()>
where
    F: Future<Output = GatewayResult<()>>,
{
    try_join_all(memberships).await.map(|_| ())
}

/// Create the group (tolerating an existing one) and add the user to it.
async fn ensure_group_membership(
    ctx: &HandlerContext,
    group_name: &str,
    username: &str,
) -> GatewayResult<()> {
    match ctx.cognito.create_group(group_name).await {
        Ok(()) => {}
        Err(err) if err.is_group_exists() => {
            info!("Group {} already exists", group_name);
        }
        Err(err) => return Err(err),
    }

    ctx.cognito.admin_add_user_to_group(group_name, username).await
}

async fn login(
    ctx: &HandlerContext,
    req: LoginRequest,
    request: &ProxyRequest,
) -> GatewayResult<ProxyResponse> {
    if let Some(code) = req.code.as_deref() {
        return Ok(login_with_code(ctx, code, request).await);
    }

    let payload = ctx
        .cognito
        .initiate_password_auth(
            req.username.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(response(200, &payload))
}

/// OAuth2 code login. Failures never surface as an error page: they fold
/// into a success=false redirect against the resolved base.
async fn login_with_code(ctx: &HandlerContext, code: &str, request: &ProxyRequest) -> ProxyResponse {
    let base = resolve_redirect_target(ctx, request);

    match oauth_login(ctx, code, &base).await {
        Ok(payload) => response(200, &payload),
        Err(err) => {
            error!("Code login failed: {}", err);
            redirect(format!("{}?success=false", base))
        }
    }
}

async fn oauth_login(
    ctx: &HandlerContext,
    code: &str,
    redirect_uri: &str,
) -> GatewayResult<serde_json::Value> {
    let domain = ctx.config.cognito_domain()?;
    let tokens = ctx.oauth.exchange_code(domain, code, redirect_uri).await?;
    let user = ctx.oauth.user_info(domain, &tokens.access_token).await?;

    Ok(json!({
        "AuthenticationResult": {
            "AccessToken": tokens.access_token,
            "ExpiresIn": tokens.expires_in,
            "TokenType": tokens.token_type,
            "RefreshToken": tokens.refresh_token,
            "IdToken": tokens.id_token,
        },
        "username": user.username,
        "email": user.email,
    }))
}

async fn change_password(
    ctx: &HandlerContext,
    req: ChangePasswordRequest,
) -> GatewayResult<ProxyResponse> {
    ctx.cognito
        .change_password(&req.access_token, &req.previous_password, &req.password)
        .await?;

    Ok(response(200, &json!({"message": "Change Password"})))
}

async fn forgot_password(
    ctx: &HandlerContext,
    req: ForgotPasswordRequest,
) -> GatewayResult<ProxyResponse> {
    let success = response(200, &json!({"message": "Password reset sent"}));

    match forgot_password_flow(ctx, &req.username).await {
        Ok(()) => Ok(success),
        // Same response whether or not the account exists.
        Err(err) if err.is_user_not_found() => {
            info!("Forgot password for unknown user masked as success");
            Ok(success)
        }
        Err(err) => Err(err),
    }
}

/// A user stuck in FORCE_CHANGE_PASSWORD cannot start forgot-password, so a
/// random permanent password is assigned first to clear that state.
async fn forgot_password_flow(ctx: &HandlerContext, username: &str) -> GatewayResult<()> {
    let status = ctx.cognito.admin_get_user_status(username).await?;

    if status == "FORCE_CHANGE_PASSWORD" {
        info!("Clearing FORCE_CHANGE_PASSWORD before reset for {}", username);
        ctx.cognito
            .admin_set_user_password(username, &random_password(), true)
            .await?;
    }

    ctx.cognito.forgot_password(username).await
}

async fn reset_password(
    ctx: &HandlerContext,
    req: ResetPasswordRequest,
) -> GatewayResult<ProxyResponse> {
    ctx.cognito
        .confirm_forgot_password(&req.username, &req.password, &req.code)
        .await?;

    Ok(response(200, &json!({"message": "Password Updated"})))
}

async fn refresh_token(
    ctx: &HandlerContext,
    req: RefreshTokenRequest,
) -> GatewayResult<ProxyResponse> {
    let payload = ctx.cognito.initiate_refresh_auth(&req.refresh_token).await?;
    Ok(response(200, &payload))
}

async fn respond_to_challenge(
    ctx: &HandlerContext,
    req: RespondToChallengeRequest,
) -> GatewayResult<ProxyResponse> {
    let session = urlencoding::decode(&req.session)
        .map_err(|e| GatewayError::InvalidBody(format!("session is not url-encoded: {}", e)))?;

    let payload = ctx
        .cognito
        .respond_to_auth_challenge(&req.challenge_name, &req.username, &req.password, &session)
        .await?;

    Ok(response(200, &payload))
}

async fn confirm_sign_up(ctx: &HandlerContext, request: &ProxyRequest) -> ProxyResponse {
    let username = request.query("username");
    let user_status = request.query("userStatus");
    let code = request.query("code");
    let base = resolve_redirect_target(ctx, request);

    let success = match ctx.cognito.confirm_sign_up(username, code).await {
        Ok(()) => true,
        Err(err) => {
            error!("Confirm sign up failed for {}: {}", username, err);
            false
        }
    };

    redirect(format!(
        "{}?success={}&username={}&userStatus={}",
        base, success, username, user_status
    ))
}

/// Log in with the confirmation code as a one-time password. A
/// NEW_PASSWORD_REQUIRED challenge overrides the user status and carries the
/// session forward so the client can respond to the challenge.
async fn confirm_registration(ctx: &HandlerContext, request: &ProxyRequest) -> ProxyResponse {
    let username = request.query("username");
    let user_status = request.query("userStatus").to_string();
    let code = request.query("code");
    let base = resolve_redirect_target(ctx, request);

    match ctx.cognito.initiate_password_auth(username, code).await {
        Ok(payload) => redirect(confirm_registration_location(
            &base,
            &user_status,
            code,
            &payload,
        )),
        Err(err) => {
            error!("Confirm registration failed for {}: {}", username, err);
            redirect(format!(
                "{}?success=false&userStatus={}&code={}",
                base,
                user_status,
                urlencoding::encode(code)
            ))
        }
    }
}

/// Build the confirm-registration redirect from the auth payload. A
/// NEW_PASSWORD_REQUIRED challenge overrides the user status and carries the
/// session forward (URL-encoded) for the follow-up challenge response.
fn confirm_registration_location(
    base: &str,
    user_status: &str,
    code: &str,
    payload: &Value,
) -> String {
    let mut user_status = user_status;
    let mut session = None;

    if payload["ChallengeName"].as_str() == Some("NEW_PASSWORD_REQUIRED") {
        user_status = "NEW_PASSWORD_REQUIRED";
        session = payload["Session"].as_str();
    }

    let mut location = format!(
        "{}?success=true&userStatus={}&code={}",
        base,
        user_status,
        urlencoding::encode(code)
    );
    if let Some(session) = session {
        location.push_str("&session=");
        location.push_str(&urlencoding::encode(session));
    }
    location
}

/// Resolve the redirect base from the allow-list and the caller-supplied
/// redirect_uri query override (URL-decoded).
fn resolve_redirect_target(ctx: &HandlerContext, request: &ProxyRequest) -> String {
    let requested = request
        .query_string_parameters
        .get("redirect_uri")
        .and_then(|raw| urlencoding::decode(raw).ok())
        .map(|decoded| decoded.into_owned());

    resolve_redirect_uri(&ctx.config.redirect_uris, requested.as_deref()).to_string()
}
