use dotenv::dotenv;
use eyre::WrapErr;
use studyhub_api::{
    App,
    config::{Env, ServerConfig},
    router,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(env: Env) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("studyhub_api=debug,tower_http=info"));

    let (json, pretty) = match env {
        Env::Production => (Some(fmt::layer().json()), None),
        Env::Dev | Env::Staging => (None, Some(fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    init_tracing(Env::from_env());

    let config = ServerConfig::new_from_env();
    let listen_addr = config.listen_addr;

    let app = App::new(config).wrap_err("couldn't create the database pool")?;

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .wrap_err_with(|| format!("couldn't bind to {listen_addr}"))?;

    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
