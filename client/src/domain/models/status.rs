//! Readiness, connector and health payloads.

use serde::{Deserialize, Serialize};

/// Aggregate compliance score for one scope and category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessItem {
    /// School scope; `None` for the district aggregate.
    pub school_id: Option<String>,
    /// School name for school-scoped items.
    pub school_name: Option<String>,
    /// Readiness category.
    pub category: String,
    /// Score from 0 to 100.
    pub score: i64,
    /// Open error findings.
    pub open_errors: u64,
    /// Open warning findings.
    pub open_warnings: u64,
}

/// Response of `GET /readiness`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessResponse {
    /// Readiness items.
    pub items: Vec<ReadinessItem>,
}

/// Response of `POST /connectors/powerschool/sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTrigger {
    /// Queue status, `queued` on acceptance.
    pub status: String,
    /// Background task identifier, when a broker accepted the job.
    pub task_id: Option<String>,
}

/// Status of one connector in the admin health report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorStatus {
    /// Connector identifier.
    pub id: String,
    /// `healthy`, `degraded` or `error`.
    pub status: String,
    /// Last successful sync.
    pub last_sync_at: Option<String>,
}

/// Response of `GET /admin/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminHealth {
    /// Connector statuses for the district.
    pub connectors: Vec<ConnectorStatus>,
    /// Completion time of the latest rule run.
    pub last_validation: Option<String>,
    /// Completion time of the latest connector sync.
    pub latest_sync_finished_at: Option<String>,
}

/// Response of `GET /health/live`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Liveness {
    /// `ok` when the API is up.
    pub status: String,
}
