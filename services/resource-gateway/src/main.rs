use std::net::SocketAddr;
use std::sync::Arc;

use common_config::load;
use common_obs::ObsInit;
use common_oauth::Authenticator;
use resource_gateway::config::GatewayConfig;
use resource_gateway::{build_router, SERVICE_NAME};
use tokio::net::TcpListener;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn build_sha() -> &'static str {
    option_env!("BUILD_SHA").unwrap_or("unknown")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ObsInit::init(SERVICE_NAME)?;

    let config = load::<GatewayConfig>()?;
    let addr = config.socket_addr()?;
    tracing::info!(
        event = "service_start",
        service = SERVICE_NAME,
        version = VERSION,
        build_sha = build_sha(),
        listen_addr = %addr,
        token_service = %config.oauth.base_url,
        token_timeout_ms = config.oauth.timeout_ms,
        "starting service"
    );

    let authenticator = Arc::new(Authenticator::from_config(&config.oauth)?);
    let router = build_router(authenticator);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!(event = "service_stop", service = SERVICE_NAME);

    Ok(())
}
