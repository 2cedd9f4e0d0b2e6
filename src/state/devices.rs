//! Browsers that talked to the hub, kept in memory for the stats endpoint.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;

/// A device counts as active when it was seen within this window.
pub const ACTIVE_WINDOW: Duration = Duration::from_secs(5 * 60);

/// What the hub knows about one browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// User agent reported on join, if any.
    pub user_agent: Option<String>,
    /// First time the device was seen.
    pub connected_at: SystemTime,
    /// Last join or heartbeat.
    pub last_seen: SystemTime,
}

/// Totals reported by `/api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStats {
    /// Every device seen since startup.
    pub total: usize,
    /// Devices seen within [`ACTIVE_WINDOW`].
    pub active: usize,
}

/// Device records keyed by browser session identity.
#[derive(Debug, Default)]
pub struct DeviceTracker {
    devices: DashMap<String, DeviceRecord>,
}

impl DeviceTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity for `session_id`, creating the record on first sight.
    /// A known user agent is kept when `user_agent` is `None`.
    pub fn track(&self, session_id: &str, user_agent: Option<String>, now: SystemTime) {
        self.devices
            .entry(session_id.to_string())
            .and_modify(|record| {
                record.last_seen = now;
                if user_agent.is_some() {
                    record.user_agent = user_agent.clone();
                }
            })
            .or_insert_with(|| DeviceRecord {
                user_agent: user_agent.clone(),
                connected_at: now,
                last_seen: now,
            });
    }

    /// Record for `session_id`, if the device was ever seen.
    pub fn get(&self, session_id: &str) -> Option<DeviceRecord> {
        self.devices.get(session_id).map(|entry| entry.clone())
    }

    /// Totals as of `now`.
    pub fn stats(&self, now: SystemTime) -> DeviceStats {
        let active = self
            .devices
            .iter()
            .filter(|entry| {
                now.duration_since(entry.last_seen)
                    .map_or(true, |age| age <= ACTIVE_WINDOW)
            })
            .count();
        DeviceStats {
            total: self.devices.len(),
            active,
        }
    }
}
