use serde::Serialize;
use utoipa::ToSchema;

use crate::state::devices::DeviceStats;

/// Device counters returned by `/api/stats`, in the display pages' snake_case.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Devices seen since startup.
    pub total_devices: usize,
    /// Devices seen in the last five minutes.
    pub active_devices: usize,
}

impl From<DeviceStats> for StatsResponse {
    fn from(stats: DeviceStats) -> Self {
        Self {
            total_devices: stats.total,
            active_devices: stats.active,
        }
    }
}
