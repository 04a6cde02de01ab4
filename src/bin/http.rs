use std::net::SocketAddr;

use task_autoscheduler::{SchedulingPolicy, http_api};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("AUTOSCHEDULER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let state = http_api::AppState::new(SchedulingPolicy::default());
    http_api::serve(addr, state).await?;
    Ok(())
}
