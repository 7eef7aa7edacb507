//! Rule engine records: versions, runs and results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One execution of the rule engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleRun {
    /// Run identifier.
    pub id: String,
    /// Owning district.
    pub district_id: String,
    /// Rule version the run was pinned to, if any.
    pub rule_version_id: Option<String>,
    /// Who started the run.
    pub initiated_by: Option<String>,
    /// `pending`, `running`, `success` or `failed`.
    pub status: String,
    /// Start timestamp.
    pub started_at: Option<String>,
    /// Completion timestamp.
    pub finished_at: Option<String>,
    /// Scope filter the run was started with.
    pub scope: Option<Value>,
    /// Creation timestamp.
    pub created_at: Option<String>,
}

/// One finding produced by a rule run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleResult {
    /// Result identifier.
    pub id: String,
    /// Run that produced the finding.
    pub rule_run_id: String,
    /// Owning district.
    pub district_id: String,
    /// School the finding concerns, if any.
    pub school_id: Option<String>,
    /// Kind of entity the finding concerns.
    pub entity_type: String,
    /// Entity the finding concerns, if any.
    pub entity_id: Option<String>,
    /// `error`, `warning` or `info`.
    pub severity: String,
    /// Workflow status of the finding.
    pub status: String,
    /// Human-readable finding.
    pub message: String,
    /// Rule-specific details.
    pub details: Option<Value>,
    /// Creation timestamp.
    pub created_at: Option<String>,
}

/// Versioned rule definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleVersion {
    /// Version identifier.
    pub id: String,
    /// Owning district; `None` for global rules.
    pub district_id: Option<String>,
    /// Stable rule code.
    pub code: String,
    /// Rule title.
    pub title: String,
    /// Default severity of findings.
    pub severity: String,
    /// Entity kind the rule applies to.
    pub applies_to: String,
    /// Rule expression.
    pub dsl: Value,
    /// Suggested remediation.
    pub remediation: Option<String>,
    /// Whether the rule takes part in runs.
    pub enabled: bool,
}
