//! Records exchanged with the compliance API.
//!
//! Response records decode leniently: missing fields take their default
//! value, and no field is validated beyond its JSON type. Type correctness is
//! a contract with the server. Identifiers and timestamps stay strings; the
//! server emits naive timestamps that the client does not interpret.

mod auth;
mod exceptions;
mod imports;
mod rules;
mod status;
mod tenancy;

pub use auth::{AuthResponse, LoginOutcome, SsoLoginRequest, UserAccount};
pub use exceptions::{
    EvidencePacket, EvidencePacketCreate, ExceptionCreate, ExceptionMemo, ExceptionMemoCreate,
    ExceptionRecord, ExceptionUpdate,
};
pub use imports::{CsvFile, CsvImportResult, StudentCsvMapping};
pub use rules::{RuleResult, RuleRun, RuleVersion};
pub use status::{
    AdminHealth, ConnectorStatus, Liveness, ReadinessItem, ReadinessResponse, SyncTrigger,
};
pub use tenancy::{District, School};
