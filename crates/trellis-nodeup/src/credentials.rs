//! Credential materialization
//!
//! Turns named key store entries into file directives. Nothing is written to
//! disk here; the directives are applied later by the plan engine.

use std::path::{Path, PathBuf};

use tracing::debug;

use trellis_common::Result;

use crate::builder::{DirectiveSink, ProvisioningDirective};
use crate::keystore::KeyStore;

/// Default directory for credential files on a node
pub const DEFAULT_CREDENTIALS_DIR: &str = "/srv/kubernetes";

/// Emits file directives for certificates and private keys
pub struct CredentialMaterializer<'a> {
    key_store: &'a dyn KeyStore,
    credentials_dir: PathBuf,
}

impl<'a> CredentialMaterializer<'a> {
    /// Materializer writing under [`DEFAULT_CREDENTIALS_DIR`]
    pub fn new(key_store: &'a dyn KeyStore) -> Self {
        Self::with_credentials_dir(key_store, DEFAULT_CREDENTIALS_DIR)
    }

    /// Materializer writing under `credentials_dir`
    pub fn with_credentials_dir(
        key_store: &'a dyn KeyStore,
        credentials_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            key_store,
            credentials_dir: credentials_dir.into(),
        }
    }

    /// Default location of the certificate named `name`
    pub fn certificate_path(&self, name: &str) -> PathBuf {
        self.credentials_dir.join(format!("{}.pem", name))
    }

    /// Default location of the private key named `name`
    pub fn private_key_path(&self, name: &str) -> PathBuf {
        self.credentials_dir.join(format!("{}-key.pem", name))
    }

    /// Add a directive writing certificate `name` as PEM
    ///
    /// `path` overrides the default location unless it is empty. On any
    /// error nothing is added to `sink`.
    pub fn certificate(
        &self,
        sink: &dyn DirectiveSink,
        name: &str,
        path: Option<&Path>,
    ) -> Result<()> {
        let pem = self.key_store.cert(name)?.as_pem()?;
        let location = resolve(path).unwrap_or_else(|| self.certificate_path(name));

        debug!(credential = %name, path = %location.display(), "materializing certificate");
        sink.add_directive(ProvisioningDirective::file(location, pem));
        Ok(())
    }

    /// Add a directive writing private key `name` as PEM
    ///
    /// `path` overrides the default location unless it is empty. On any
    /// error nothing is added to `sink`.
    pub fn private_key(
        &self,
        sink: &dyn DirectiveSink,
        name: &str,
        path: Option<&Path>,
    ) -> Result<()> {
        let pem = self.key_store.private_key(name)?.as_pem()?;
        let location = resolve(path).unwrap_or_else(|| self.private_key_path(name));

        debug!(credential = %name, path = %location.display(), "materializing private key");
        sink.add_directive(ProvisioningDirective::file(location, pem));
        Ok(())
    }
}

fn resolve(path: Option<&Path>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
