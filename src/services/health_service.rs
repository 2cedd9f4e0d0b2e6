use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// How long the trivia actor gets to answer a health probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Probe the trivia actor and the content store.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let connections = state.clients().len();

    if let Err(err) = state.content().health_check().await {
        warn!(error = %err, "content store health check failed");
        return HealthResponse::degraded(connections);
    }

    match timeout(PROBE_TIMEOUT, state.trivia().snapshot()).await {
        Ok(Ok(_)) => HealthResponse::ok(connections),
        Ok(Err(err)) => {
            warn!(error = %err, "trivia engine unavailable");
            HealthResponse::degraded(connections)
        }
        Err(_) => {
            warn!("trivia engine did not answer the health probe in time");
            HealthResponse::degraded(connections)
        }
    }
}
