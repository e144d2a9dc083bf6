use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;

use gateway_shared::{GatewayConfig, ProxyRequest, ProxyResponse};

mod handlers;

use handlers::{route, HandlerContext};

async fn function_handler(
    ctx: &HandlerContext,
    event: LambdaEvent<ProxyRequest>,
) -> Result<ProxyResponse, Error> {
    let (request, _context) = event.into_parts();

    info!(
        "Handling {} {}",
        request.http_method,
        request.path.as_deref().unwrap_or("-")
    );

    Ok(route(ctx, request).await?)
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
    let config = GatewayConfig::from_env()?;

    // Clients are constructed once and shared across invocations.
    let ctx = HandlerContext::new(&sdk_config, config);
    let ctx = &ctx;

    run(service_fn(move |event| async move {
        function_handler(ctx, event).await
    }))
    .await
}
