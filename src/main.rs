use std::{process, sync::Arc};

use htmlpress::{
    application::{
        error::AppError,
        render::{RenderService, Renderer},
    },
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let settings = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let render = RenderService::new(
        Renderer::new(settings.renderer.pdf_path.clone(), "pdf"),
        Renderer::new(settings.renderer.image_path.clone(), "image"),
    );
    let state = HttpState {
        render: Arc::new(render),
    };

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    // Validated to fit in usize when settings were loaded.
    let body_limit = usize::try_from(settings.server.max_body_bytes.get()).unwrap_or(usize::MAX);
    let router = http::build_router(state, body_limit);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "htmlpress::serve",
        addr = %settings.server.addr,
        wkhtmltopdf = %settings.renderer.pdf_path.display(),
        wkhtmltoimage = %settings.renderer.image_path.display(),
        graceful_shutdown_secs = settings.server.graceful_shutdown.as_secs(),
        "Starting webserver"
    );

    http::serve(
        listener,
        router,
        shutdown_signal(),
        settings.server.graceful_shutdown,
    )
    .await?;

    info!(target = "htmlpress::serve", "Webserver stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
