use dyscalculia_screening::config::Config;
use dyscalculia_screening::logging::init_tracing;
use dyscalculia_screening::screening::ScreeningConfig;
use dyscalculia_screening::state::AppState;
use dyscalculia_screening::{connect_cache, create_app_with};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level);

    let screening = ScreeningConfig::from_env();
    let engine = match AppState::create_engine(screening) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "Risk classifier could not be initialized");
            std::process::exit(1);
        }
    };

    let cache = connect_cache(config.redis_url.as_deref()).await;
    let app = create_app_with(AppState::new(engine, cache));

    let addr = config.bind_addr();
    tracing::info!(%addr, "screening service listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
