//! Partner directory collaborator.
//!
//! Resolves partner/user ids to display names and roles. The engine uses it
//! to fill `assignedToName` and to choose a notification link. Unknown ids
//! and lookup failures are tolerated by callers; they fall back to the raw id.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerRole {
    Admin,
    Manager,
    /// External developer, agency, finishing or decoration partner
    Partner,
}

impl PartnerRole {
    /// Internal staff work from the admin back-office.
    pub fn is_staff(&self) -> bool {
        matches!(self, PartnerRole::Admin | PartnerRole::Manager)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub role: PartnerRole,
}

impl Partner {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: PartnerRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("partner directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of partners and internal users by id.
#[async_trait]
pub trait PartnerDirectory: Send + Sync + 'static {
    /// `Ok(None)` for unknown ids; `Err` only when the directory itself fails.
    async fn resolve_by_id(&self, id: &str) -> Result<Option<Partner>, DirectoryError>;
}

/// In-memory directory seeded from configuration.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    partners: DashMap<String, Partner>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_partners(partners: impl IntoIterator<Item = Partner>) -> Self {
        let directory = Self::new();
        for partner in partners {
            directory.insert(partner);
        }
        directory
    }

    /// Insert or replace an entry.
    pub fn insert(&self, partner: Partner) {
        self.partners.insert(partner.id.clone(), partner);
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

#[async_trait]
impl PartnerDirectory for StaticDirectory {
    async fn resolve_by_id(&self, id: &str) -> Result<Option<Partner>, DirectoryError> {
        Ok(self.partners.get(id).map(|entry| entry.value().clone()))
    }
}

/// Resolve a display name, falling back to the raw id.
pub async fn display_name(directory: &dyn PartnerDirectory, id: &str) -> String {
    match directory.resolve_by_id(id).await {
        Ok(Some(partner)) => partner.name,
        Ok(None) => id.to_string(),
        Err(e) => {
            tracing::warn!(partner_id = %id, error = %e, "Directory lookup failed, using raw id");
            id.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DownDirectory;

    #[async_trait]
    impl PartnerDirectory for DownDirectory {
        async fn resolve_by_id(&self, _id: &str) -> Result<Option<Partner>, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_static_directory_resolves() {
        let dir = StaticDirectory::from_partners([
            Partner::new("admin-1", "Operations Admin", PartnerRole::Admin),
            Partner::new("el-mottaheda-group", "El Mottaheda Group", PartnerRole::Partner),
        ]);
        let partner = dir.resolve_by_id("el-mottaheda-group").await.unwrap().unwrap();
        assert_eq!(partner.name, "El Mottaheda Group");
        assert_eq!(partner.role, PartnerRole::Partner);
        assert!(dir.resolve_by_id("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_display_name_falls_back_to_id() {
        let dir = StaticDirectory::new();
        assert_eq!(display_name(&dir, "ghost-7").await, "ghost-7");
        assert_eq!(display_name(&DownDirectory, "admin-1").await, "admin-1");
    }

    #[test]
    fn test_role_is_staff() {
        assert!(PartnerRole::Admin.is_staff());
        assert!(PartnerRole::Manager.is_staff());
        assert!(!PartnerRole::Partner.is_staff());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&PartnerRole::Manager).unwrap();
        assert_eq!(json, r#""manager""#);
    }
}
