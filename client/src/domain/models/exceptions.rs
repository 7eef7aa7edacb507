//! Exceptions, memos and evidence packets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tracked deviation against a rule result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionRecord {
    /// Exception identifier.
    pub id: String,
    /// Owning district.
    pub district_id: String,
    /// Rule result the exception waives.
    pub rule_result_id: String,
    /// Assigned owner.
    pub owner_user_id: Option<String>,
    /// `open`, `in_review`, `resolved` or `won't_fix`.
    pub status: String,
    /// Justification text.
    pub rationale: Option<String>,
    /// Resolution deadline.
    pub due_date: Option<NaiveDate>,
    /// Approver, once approved.
    pub approval_user_id: Option<String>,
    /// Approval timestamp.
    pub approved_at: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

/// Partial update of an exception. Unset fields are omitted from the body.
///
/// # Examples
/// ```
/// use precheck_client::domain::ExceptionUpdate;
///
/// let update = ExceptionUpdate::default().status("resolved");
/// assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"status":"resolved"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionUpdate {
    /// New workflow status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,
    /// New justification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// New deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Approve the exception.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl ExceptionUpdate {
    /// Set the status field.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the owner field.
    #[must_use]
    pub fn owner_user_id(mut self, owner: impl Into<String>) -> Self {
        self.owner_user_id = Some(owner.into());
        self
    }

    /// Set the rationale field.
    #[must_use]
    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Set the due date field.
    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the approval flag.
    #[must_use]
    pub fn approved(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Body of `POST /exceptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionCreate {
    /// Rule result to waive.
    pub rule_result_id: String,
    /// Justification text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Resolution deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Memo attached to an exception.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionMemo {
    /// Memo identifier.
    pub id: String,
    /// Owning district.
    pub district_id: String,
    /// Exception the memo belongs to.
    pub exception_id: String,
    /// Memo title.
    pub title: String,
    /// Markdown body.
    pub body_md: String,
    /// Author kind, `user` unless generated.
    pub generated_by: String,
    /// Creation timestamp.
    pub created_at: Option<String>,
}

/// Body of `POST /exceptions/{id}/memo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionMemoCreate {
    /// Memo title.
    pub title: String,
    /// Markdown body.
    pub body_md: String,
    /// Author kind.
    pub generated_by: String,
}

impl ExceptionMemoCreate {
    /// Memo authored by a user.
    pub fn by_user(title: impl Into<String>, body_md: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body_md: body_md.into(),
            generated_by: "user".to_owned(),
        }
    }
}

/// Body of `POST /evidence/packets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidencePacketCreate {
    /// Packet name.
    pub name: String,
    /// Optional description; sent as `null` when absent.
    pub description: Option<String>,
    /// Exceptions bundled into the packet.
    pub exception_ids: Vec<String>,
}

/// Evidence packet created for audit submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidencePacket {
    /// Packet identifier.
    pub id: String,
    /// Owning district.
    pub district_id: String,
    /// Packet name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Download location of the generated archive.
    pub zip_url: Option<String>,
    /// SHA-256 of the archive.
    pub sha256: Option<String>,
    /// Creator.
    pub created_by: Option<String>,
}
