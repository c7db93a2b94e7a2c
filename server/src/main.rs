use todo_core::{TodoService, TodoStore};
use todo_server::AppConfig;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_server=debug,todo_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let store = TodoStore::connect(&config.database_url, config.max_connections).await?;
    store.migrate().await?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(database = %config.database_url, "listening on {addr}");

    todo_server::run(listener, TodoService::new(store), shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
