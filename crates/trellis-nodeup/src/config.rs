//! Provisioning settings
//!
//! Settings can be deserialized from a config document (camelCase keys,
//! every field optional) and then overridden from the environment:
//!
//! | field | default | variable |
//! |---|---|---|
//! | `credentialsDir` | `/srv/kubernetes` | `TRELLIS_CREDENTIALS_DIR` |
//! | `maxUserDataBytes` | `16384` | `TRELLIS_MAX_USER_DATA_BYTES` |
//! | `nodeupSource` | empty | `NODEUP_URL` |
//! | `nodeupSourceHash` | empty | `NODEUP_HASH` |
//!
//! Empty variables are ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use trellis_common::{Error, Result};

use crate::bootstrap::{EnvSource, ProcessEnv, DEFAULT_MAX_USER_DATA_BYTES};
use crate::credentials::{CredentialMaterializer, DEFAULT_CREDENTIALS_DIR};
use crate::keystore::KeyStore;

const ENV_CREDENTIALS_DIR: &str = "TRELLIS_CREDENTIALS_DIR";
const ENV_MAX_USER_DATA_BYTES: &str = "TRELLIS_MAX_USER_DATA_BYTES";
const ENV_NODEUP_URL: &str = "NODEUP_URL";
const ENV_NODEUP_HASH: &str = "NODEUP_HASH";

/// Settings for rendering boot data and materializing credentials
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeupSettings {
    /// Directory credential files are written to on nodes
    pub credentials_dir: PathBuf,

    /// Largest boot script accepted, in bytes
    pub max_user_data_bytes: usize,

    /// Comma-separated nodeup download URLs
    pub nodeup_source: String,

    /// SHA-256 of the nodeup binary
    pub nodeup_source_hash: String,
}

impl Default for NodeupSettings {
    fn default() -> Self {
        Self {
            credentials_dir: PathBuf::from(DEFAULT_CREDENTIALS_DIR),
            max_user_data_bytes: DEFAULT_MAX_USER_DATA_BYTES,
            nodeup_source: String::new(),
            nodeup_source_hash: String::new(),
        }
    }
}

impl NodeupSettings {
    /// Defaults overridden from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_source(&ProcessEnv)
    }

    /// Defaults overridden from `env`
    pub fn from_env_source(env: &dyn EnvSource) -> Result<Self> {
        Self::default().with_env_overrides(env)
    }

    /// Apply overrides from `env` on top of these settings
    ///
    /// Fails with a `Serialization` error if the size limit is not a
    /// non-negative integer.
    pub fn with_env_overrides(mut self, env: &dyn EnvSource) -> Result<Self> {
        let var = |name: &str| env.var(name).filter(|v| !v.is_empty());

        if let Some(dir) = var(ENV_CREDENTIALS_DIR) {
            self.credentials_dir = PathBuf::from(dir);
        }
        if let Some(limit) = var(ENV_MAX_USER_DATA_BYTES) {
            self.max_user_data_bytes = limit.trim().parse().map_err(|e| {
                Error::serialization_for_kind(
                    "settings",
                    format!("{}={:?} is not a byte count: {}", ENV_MAX_USER_DATA_BYTES, limit, e),
                )
            })?;
        }
        if let Some(source) = var(ENV_NODEUP_URL) {
            self.nodeup_source = source;
        }
        if let Some(hash) = var(ENV_NODEUP_HASH) {
            self.nodeup_source_hash = hash;
        }
        Ok(self)
    }

    /// Credential materializer writing under [`Self::credentials_dir`]
    pub fn materializer<'a>(&self, key_store: &'a dyn KeyStore) -> CredentialMaterializer<'a> {
        CredentialMaterializer::with_credentials_dir(key_store, self.credentials_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::MemoryKeyStore;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = NodeupSettings::default();
        assert_eq!(settings.credentials_dir, PathBuf::from("/srv/kubernetes"));
        assert_eq!(settings.max_user_data_bytes, 16384);
        assert!(settings.nodeup_source.is_empty());
        assert!(settings.nodeup_source_hash.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let settings = NodeupSettings::from_env_source(&env(&[
            ("TRELLIS_CREDENTIALS_DIR", "/etc/trellis/pki"),
            ("TRELLIS_MAX_USER_DATA_BYTES", " 32768 "),
            ("NODEUP_URL", "https://a/nodeup,https://b/nodeup"),
            ("NODEUP_HASH", "abc123"),
        ]))
        .unwrap();

        assert_eq!(settings.credentials_dir, PathBuf::from("/etc/trellis/pki"));
        assert_eq!(settings.max_user_data_bytes, 32768);
        assert_eq!(settings.nodeup_source, "https://a/nodeup,https://b/nodeup");
        assert_eq!(settings.nodeup_source_hash, "abc123");
    }

    #[test]
    fn test_empty_variables_are_ignored() {
        let settings = NodeupSettings::from_env_source(&env(&[
            ("TRELLIS_CREDENTIALS_DIR", ""),
            ("TRELLIS_MAX_USER_DATA_BYTES", ""),
        ]))
        .unwrap();
        assert_eq!(settings, NodeupSettings::default());
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let err = NodeupSettings::from_env_source(&env(&[("TRELLIS_MAX_USER_DATA_BYTES", "16k")]))
            .unwrap_err();
        match err {
            Error::Serialization { kind, message } => {
                assert_eq!(kind.as_deref(), Some("settings"));
                assert!(message.contains("TRELLIS_MAX_USER_DATA_BYTES"));
            }
            other => panic!("Expected Serialization, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_partial_document() {
        let settings: NodeupSettings =
            serde_json::from_str(r#"{"nodeupSource": "https://a/nodeup", "maxUserDataBytes": 8192}"#)
                .unwrap();
        assert_eq!(settings.nodeup_source, "https://a/nodeup");
        assert_eq!(settings.max_user_data_bytes, 8192);
        assert_eq!(settings.credentials_dir, PathBuf::from("/srv/kubernetes"));
    }

    #[test]
    fn test_env_overrides_document() {
        let settings: NodeupSettings =
            serde_json::from_str(r#"{"nodeupSourceHash": "from-file"}"#).unwrap();
        let settings = settings
            .with_env_overrides(&env(&[("NODEUP_HASH", "from-env")]))
            .unwrap();
        assert_eq!(settings.nodeup_source_hash, "from-env");
    }

    #[test]
    fn test_materializer_uses_credentials_dir() {
        let settings = NodeupSettings {
            credentials_dir: PathBuf::from("/opt/pki"),
            ..Default::default()
        };
        let store = MemoryKeyStore::new();
        let materializer = settings.materializer(&store);
        assert_eq!(materializer.certificate_path("ca"), PathBuf::from("/opt/pki/ca.pem"));
    }
}
