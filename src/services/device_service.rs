use std::time::SystemTime;

use tracing::{debug, warn};
use validator::Validate;

use crate::{
    dto::{stats::StatsResponse, ws::HeartbeatRequest},
    state::SharedState,
};

/// Refresh the device behind a `device_heartbeat`. Invalid identities are dropped.
pub fn record_heartbeat(state: &SharedState, request: HeartbeatRequest) {
    if let Err(err) = request.validate() {
        warn!(error = %err, "ignoring heartbeat with invalid session id");
        return;
    }
    debug!(session_id = %request.session_id, "device heartbeat");
    state
        .devices()
        .track(&request.session_id, None, SystemTime::now());
}

/// Record the browser behind a successful join.
pub fn record_join(state: &SharedState, session_id: &str, user_agent: Option<String>) {
    state
        .devices()
        .track(session_id, user_agent, SystemTime::now());
}

/// Device counters as of now.
pub fn stats(state: &SharedState) -> StatsResponse {
    state.devices().stats(SystemTime::now()).into()
}
