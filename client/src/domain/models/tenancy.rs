//! Districts and schools.

use serde::{Deserialize, Serialize};

/// Tenant record returned by `GET /districts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct District {
    /// District identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// IANA timezone, e.g. `America/Chicago`.
    pub timezone: String,
    /// NCES identifier, when known.
    pub nces_id: Option<String>,
    /// Creation timestamp as sent by the server.
    pub created_at: Option<String>,
    /// Last update timestamp as sent by the server.
    pub updated_at: Option<String>,
}

/// School within a district.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct School {
    /// School identifier.
    pub id: String,
    /// Owning district.
    pub district_id: String,
    /// Display name.
    pub name: String,
    /// School level (elementary, middle, high...).
    pub level: Option<String>,
    /// NCES identifier, when known.
    pub nces_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_district_payload_decodes() {
        let district: District = serde_json::from_str(r#"{"id":"d1"}"#).expect("lenient decode");
        assert_eq!(district.id, "d1");
        assert!(district.name.is_empty());
        assert!(district.nces_id.is_none());
    }
}
