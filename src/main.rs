use std::sync::Arc;

use health_onboard::api::query_routes;
use health_onboard::checkin::{DailyCheckIn, ProxyCheckIn, StaticCheckIn};
use health_onboard::config::Config;
use health_onboard::dispatch::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    eprintln!("🩺 Health Onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Query API: http://{}/query", config.bind);
    eprintln!("   Sessions: {}", config.session_file.display());

    // ── Daily check-in ───────────────────────────────────────────────────
    let check_in: Arc<dyn DailyCheckIn> = match config.check_in.clone() {
        Some(proxy) => {
            eprintln!("   Check-in: {} ({})", proxy.endpoint, proxy.model);
            Arc::new(ProxyCheckIn::new(proxy)?)
        }
        None => {
            eprintln!("   Check-in: static reply (set LLMPROXY_ENDPOINT to enable)");
            Arc::new(StaticCheckIn::default())
        }
    };

    let dispatcher = Arc::new(Dispatcher::new(config.session_file.clone(), check_in));
    let app = query_routes(dispatcher);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "Query server started");
    axum::serve(listener, app).await?;

    Ok(())
}
