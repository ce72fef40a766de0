use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::signal;

use crate::{
    accounts, auth, config::AppConfig, error, middleware, organizations, state::AppState, users,
};

pub fn build_app(state: AppState) -> Router {
    let protected = middleware::protect(
        Router::new()
            .merge(users::router())
            .merge(organizations::router())
            .merge(accounts::router()),
        &state,
    );

    let router = Router::new()
        .merge(auth::router())
        .route("/health", get(|| async { "ok" }))
        .merge(protected)
        .fallback(error::not_found)
        .with_state(state.clone());

    middleware::apply(router, &state)
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "listen for ctrl-c");
        return;
    }
    tracing::info!("shutdown requested");
}
