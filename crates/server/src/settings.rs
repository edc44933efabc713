use models::policy::{AllowedEmailDomains, StatusTransitionRules};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-backed runtime settings. Each policy lives in its own JSON file so an
/// operator can edit it without touching the database; a missing file means
/// the policy's default (no restriction).
#[derive(Debug, Clone)]
pub struct SettingsStore {
    email_domains_path: PathBuf,
    status_rules_path: PathBuf,
}

impl SettingsStore {
    pub fn from_env() -> Self {
        Self {
            email_domains_path: dotenvy::var("EMAIL_DOMAINS_FILE")
                .unwrap_or_else(|_| "config/email_domains.json".to_string())
                .into(),
            status_rules_path: dotenvy::var("STATUS_RULES_FILE")
                .unwrap_or_else(|_| "config/status_rules.json".to_string())
                .into(),
        }
    }

    pub async fn load_email_domains(&self) -> io::Result<AllowedEmailDomains> {
        Self::load(&self.email_domains_path).await
    }

    pub async fn save_email_domains(&self, value: &AllowedEmailDomains) -> io::Result<()> {
        Self::save(&self.email_domains_path, value).await
    }

    pub async fn load_status_rules(&self) -> io::Result<StatusTransitionRules> {
        Self::load(&self.status_rules_path).await
    }

    pub async fn save_status_rules(&self, value: &StatusTransitionRules) -> io::Result<()> {
        Self::save(&self.status_rules_path, value).await
    }

    async fn load<T: DeserializeOwned + Default>(path: &Path) -> io::Result<T> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e),
        }
    }

    async fn save<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process;

    fn temp_store(tag: &str) -> SettingsStore {
        let dir = std::env::temp_dir().join(format!("settings-{tag}-{}", process::id()));
        SettingsStore {
            email_domains_path: dir.join("email_domains.json"),
            status_rules_path: dir.join("status_rules.json"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let store = temp_store("missing");
        let domains = store.load_email_domains().await.unwrap();
        assert!(domains.domains.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = temp_store("roundtrip");
        let domains = AllowedEmailDomains {
            domains: vec!["university.edu".to_string()],
        };

        store.save_email_domains(&domains).await.unwrap();
        let loaded = store.load_email_domains().await.unwrap();
        assert_eq!(loaded, domains);
    }
}
