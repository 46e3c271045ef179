use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tower_http::trace::TraceLayer;

use model_docs::{
    config::AppConfig, logging::init_tracing, metamodel::sources_from_config, routes::router,
    state::AppState, typegraph::TypeGraph,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.logging.rust_log)?;

    if cfg.metamodel.source_count() == 0 {
        tracing::warn!("no metamodel sources configured; serving an empty type graph");
    }
    let sources = sources_from_config(&cfg.metamodel);
    let graph = TypeGraph::extract(&sources).context("failed to extract type graph")?;

    let addr: SocketAddr = format!("{}:{}", cfg.general.host, cfg.general.port)
        .parse()
        .context("invalid host/port")?;

    let state = AppState::new(cfg, graph);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
