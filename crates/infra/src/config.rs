//! Configuration loading and representation.
//!
//! Everything is read from environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STOCKPOS_BACKEND` | `memory` (`memory` \| `firestore`) |
//! | `STOCKPOS_COLLECTION` | `inventory` |
//! | `STOCKPOS_CONCURRENCY` | `last-writer-wins` (`last-writer-wins` \| `optimistic`) |
//! | `STOCKPOS_FIRESTORE_PROJECT_ID` | required for `firestore` |
//! | `STOCKPOS_FIRESTORE_DATABASE` | `(default)` |
//! | `STOCKPOS_FIRESTORE_API_KEY` | unset |
//! | `STOCKPOS_FIRESTORE_BASE_URL` | `https://firestore.googleapis.com/v1` |

use thiserror::Error;

pub const DEFAULT_COLLECTION: &str = "inventory";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}' (expected one of: {expected})")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// How updates treat records changed by someone else since the edit began.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Overwrite unconditionally.
    #[default]
    LastWriterWins,
    /// Reject the update if the stored `updatedAt` moved since the edit began.
    Optimistic,
}

/// Connection settings for a Firestore database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: DEFAULT_FIRESTORE_DATABASE.to_string(),
            api_key: None,
            base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
        }
    }

    /// `{base}/projects/{project}/databases/{database}/documents`
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Process-local collection; contents are lost on exit.
    Memory,
    Firestore(FirestoreConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub collection: String,
    pub concurrency: ConcurrencyMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            collection: DEFAULT_COLLECTION.to_string(),
            concurrency: ConcurrencyMode::default(),
        }
    }
}

impl StoreConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (blank values count as unset).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let collection = get("STOCKPOS_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        let concurrency = match get("STOCKPOS_CONCURRENCY").as_deref() {
            None | Some("last-writer-wins") => ConcurrencyMode::LastWriterWins,
            Some("optimistic") => ConcurrencyMode::Optimistic,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STOCKPOS_CONCURRENCY",
                    value: other.to_string(),
                    expected: "last-writer-wins, optimistic",
                });
            }
        };

        let backend = match get("STOCKPOS_BACKEND").as_deref() {
            None | Some("memory") => Backend::Memory,
            Some("firestore") => {
                let project_id = get("STOCKPOS_FIRESTORE_PROJECT_ID")
                    .ok_or(ConfigError::Missing("STOCKPOS_FIRESTORE_PROJECT_ID"))?;
                Backend::Firestore(FirestoreConfig {
                    project_id,
                    database: get("STOCKPOS_FIRESTORE_DATABASE")
                        .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.to_string()),
                    api_key: get("STOCKPOS_FIRESTORE_API_KEY"),
                    base_url: get("STOCKPOS_FIRESTORE_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.to_string()),
                })
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STOCKPOS_BACKEND",
                    value: other.to_string(),
                    expected: "memory, firestore",
                });
            }
        };

        Ok(Self {
            backend,
            collection,
            concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn empty_environment_uses_in_memory_defaults() {
        assert_eq!(load(&[]).unwrap(), StoreConfig::default());
    }

    #[test]
    fn firestore_backend_reads_connection_settings() {
        let cfg = load(&[
            ("STOCKPOS_BACKEND", "firestore"),
            ("STOCKPOS_FIRESTORE_PROJECT_ID", "shop-1"),
            ("STOCKPOS_FIRESTORE_API_KEY", "abc"),
            ("STOCKPOS_FIRESTORE_BASE_URL", "http://localhost:8080/v1/"),
            ("STOCKPOS_COLLECTION", "stock"),
            ("STOCKPOS_CONCURRENCY", "optimistic"),
        ])
        .unwrap();

        assert_eq!(cfg.collection, "stock");
        assert_eq!(cfg.concurrency, ConcurrencyMode::Optimistic);
        match cfg.backend {
            Backend::Firestore(fs) => {
                assert_eq!(fs.api_key.as_deref(), Some("abc"));
                assert_eq!(
                    fs.documents_url(),
                    "http://localhost:8080/v1/projects/shop-1/databases/(default)/documents"
                );
            }
            Backend::Memory => panic!("expected firestore backend"),
        }
    }

    #[test]
    fn firestore_without_project_is_rejected() {
        let err = load(&[("STOCKPOS_BACKEND", "firestore")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("STOCKPOS_FIRESTORE_PROJECT_ID"));
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(matches!(
            load(&[("STOCKPOS_BACKEND", "postgres")]),
            Err(ConfigError::Invalid { key: "STOCKPOS_BACKEND", .. })
        ));
        assert!(matches!(
            load(&[("STOCKPOS_CONCURRENCY", "pessimistic")]),
            Err(ConfigError::Invalid { key: "STOCKPOS_CONCURRENCY", .. })
        ));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = load(&[("STOCKPOS_BACKEND", "  "), ("STOCKPOS_COLLECTION", "")]).unwrap();
        assert_eq!(cfg, StoreConfig::default());
    }
}
