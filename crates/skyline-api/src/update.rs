//! Pending package upgrade record

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Repository label fragment marking a security channel
pub const SECURITY_MARKER: &str = "-security";

/// A pending package upgrade reported by a host
///
/// Two records describe the same update iff their package names are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    /// Package identifier
    pub package_name: String,
    /// Installed version (empty if the source omitted it)
    #[serde(default)]
    pub current_version: String,
    /// Version that would be installed
    #[serde(default)]
    pub new_version: String,
    /// Originating repository or channel label
    #[serde(default)]
    pub repository: String,
    /// Whether the repository is a security channel
    #[serde(default, rename = "security")]
    pub is_security: bool,
}

impl UpdateRecord {
    /// Create a record, deriving `is_security` from the repository label
    pub fn new(
        package_name: impl Into<String>,
        current_version: impl Into<String>,
        new_version: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        let repository = repository.into();
        Self {
            package_name: package_name.into(),
            current_version: current_version.into(),
            new_version: new_version.into(),
            is_security: is_security_repository(&repository),
            repository,
        }
    }
}

/// Check whether a repository label denotes a security channel
#[must_use]
pub fn is_security_repository(repository: &str) -> bool {
    repository.contains(SECURITY_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_derived_from_repository() {
        let record = UpdateRecord::new("openssl", "1.1", "1.2", "Ubuntu:20.04/focal-security");
        assert!(record.is_security);

        let record = UpdateRecord::new("vim", "8.1", "8.2", "Ubuntu:20.04/focal-updates");
        assert!(!record.is_security);
    }

    #[test]
    fn test_security_marker_any_position() {
        assert!(is_security_repository("-security"));
        assert!(is_security_repository("Debian:bullseye-security, Debian:11/stable [amd64]"));
        assert!(is_security_repository("x-securityy"));
        assert!(!is_security_repository("security"));
        assert!(!is_security_repository(""));
    }

    #[test]
    fn test_wire_format() {
        let record = UpdateRecord::new("libfoo", "1.0", "1.1", "focal-security");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["packageName"], "libfoo");
        assert_eq!(json["currentVersion"], "1.0");
        assert_eq!(json["newVersion"], "1.1");
        assert_eq!(json["repository"], "focal-security");
        assert_eq!(json["security"], true);
    }

    #[test]
    fn test_decode_ignores_server_fields() {
        let json = r#"{"id": 7, "packageName": "curl", "newVersion": "7.68", "createdAt": "now"}"#;
        let record: UpdateRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.package_name, "curl");
        assert_eq!(record.current_version, "");
        assert!(!record.is_security);
    }
}
