mod handlers;
mod middleware;

use std::{
    future::{Future, IntoFuture},
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use tokio::{net::TcpListener, sync::oneshot};
use tracing::warn;

use crate::{application::render::RenderService, infra::error::InfraError};

use middleware::{log_responses, set_request_context};

pub use middleware::REQUEST_ID_HEADER;

#[derive(Clone)]
pub struct HttpState {
    pub render: Arc<RenderService>,
}

/// Build the public router.
///
/// Each route is bound to a single method; the method router answers any
/// other method with 405 and an `Allow` header.
pub fn build_router(state: HttpState, body_limit: usize) -> Router {
    Router::new()
        .route(
            "/pdf",
            post(handlers::render_pdf).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/image",
            post(handlers::render_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/license", get(handlers::license))
        .route("/version", get(handlers::version))
        .with_state(state)
        .layer(from_fn(log_responses))
        .layer(from_fn(set_request_context))
}

/// Serve `router` until `signal` resolves, then let open responses drain for
/// at most `grace`.
///
/// Connections still open after `grace` are abandoned; they are dropped with
/// the runtime, which kills their renderer processes.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    signal: F,
    grace: Duration,
) -> Result<(), InfraError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = oneshot::channel();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            signal.await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result.map_err(|err| InfraError::server(err.to_string())),
        () = drain_deadline(signalled_rx, grace) => {
            warn!(
                target = "htmlpress::serve",
                grace_ms = grace.as_millis() as u64,
                "Graceful shutdown timed out, abandoning open responses"
            );
            Ok(())
        }
    }
}

async fn drain_deadline(signalled: oneshot::Receiver<()>, grace: Duration) {
    if signalled.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
