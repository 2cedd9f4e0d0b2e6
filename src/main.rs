//! Game hub binary entrypoint wiring the trivia actor, REST, WebSocket and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use game_hub::{
    config::AppConfig,
    dao::content_store::InMemoryContentStore,
    routes,
    services::trivia_runtime::TriviaHandle,
    state::{
        AppState, ClientHub, DISPLAY_STREAM_CAPACITY, SharedState, clock::SystemClock,
        questions::QuestionBank, state_machine::TriviaEngine,
    },
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let mut questions = QuestionBank::load_or_builtin(&config.questions_path);
    if config.trivia.shuffle_options {
        questions = questions.shuffled(&mut rand::rng());
    }
    info!(questions = questions.len(), "question bank ready");

    let tick_period = config.trivia.tick_period;
    let engine = TriviaEngine::new(config.trivia, Arc::new(questions), Arc::new(SystemClock));

    let clients = Arc::new(ClientHub::new(DISPLAY_STREAM_CAPACITY));
    let (trivia, _actor) = TriviaHandle::spawn(engine, tick_period, clients.clone());
    let content = Arc::new(InMemoryContentStore::load_or_welcome(
        config.content_path.as_deref(),
    ));

    let app_state = AppState::new(clients, trivia, content);
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
