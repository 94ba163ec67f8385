use axum::{Router, routing::post};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::ingest::Ingestor;
use crate::store::{HttpStore, ObjectStore};

pub mod routes;

/// Server state
pub struct AppState<S> {
    pub ingestor: Ingestor<S>,
}

/// RPC routes of the AST graph service.
pub fn router<S: ObjectStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route(routes::INGEST_AST_PATH, post(routes::ingest_ast::<S>))
        .route(
            "/ast.ASTGraphService/GetASTNodes",
            post(|| routes::unimplemented_rpc("GetASTNodes")),
        )
        .route(
            "/ast.ASTGraphService/UpdateASTNodes",
            post(|| routes::unimplemented_rpc("UpdateASTNodes")),
        )
        .route(
            "/ast.ASTGraphService/DeleteASTNodes",
            post(|| routes::unimplemented_rpc("DeleteASTNodes")),
        )
        .route(
            "/ast.ASTGraphService/TraverseGraph",
            post(|| routes::unimplemented_rpc("TraverseGraph")),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<S, F>(
    listener: TcpListener,
    ingestor: Ingestor<S>,
    shutdown: F,
) -> anyhow::Result<()>
where
    S: ObjectStore + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(Arc::new(AppState { ingestor }));

    tracing::info!("RPC server listening at {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

pub async fn start_server(config: &ProxyConfig, store: HttpStore) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen_addr()).await?;
    serve(listener, Ingestor::new(store), shutdown_signal()).await?;
    tracing::info!("RPC server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down RPC server...");
}
