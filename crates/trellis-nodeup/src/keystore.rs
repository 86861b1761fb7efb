//! Key store seam
//!
//! The key store that issues and persists certificates and private keys lives
//! outside this crate. Provisioning only needs to fetch material by name and
//! serialize it to PEM, which is what [`KeyStore`] exposes.
//!
//! PEM serialization validates the material: certificates must be a
//! `CERTIFICATE` block holding a parsable X.509 structure, and private keys
//! must load as a key pair. Malformed material is reported as a serialization
//! error instead of being written to a node.

use std::collections::BTreeMap;

#[cfg(test)]
use mockall::automock;
use parking_lot::RwLock;
use rcgen::KeyPair;
use x509_parser::prelude::*;
use zeroize::Zeroizing;

use trellis_common::{Error, Result};

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// An X.509 certificate held by the key store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    pem: String,
}

impl Certificate {
    /// Wrap PEM text; validation happens on serialization
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self { pem: pem.into() }
    }

    /// Serialize to PEM
    ///
    /// Fails with a `Serialization` error of kind "certificate" if the
    /// material is not a well-formed certificate.
    pub fn as_pem(&self) -> Result<String> {
        let block = ::pem::parse(self.pem.as_bytes())
            .map_err(|e| Error::serialization_for_kind("certificate", e.to_string()))?;

        if block.tag() != CERTIFICATE_TAG {
            return Err(Error::serialization_for_kind(
                "certificate",
                format!("expected {} PEM block, found {}", CERTIFICATE_TAG, block.tag()),
            ));
        }

        X509Certificate::from_der(block.contents()).map_err(|e| {
            Error::serialization_for_kind("certificate", format!("invalid X.509 data: {}", e))
        })?;

        Ok(self.pem.clone())
    }
}

/// A private key held by the key store
///
/// The PEM text is wiped from memory when the value is dropped.
#[derive(Clone)]
pub struct PrivateKey {
    pem: Zeroizing<String>,
}

impl PrivateKey {
    /// Wrap PEM text; validation happens on serialization
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self {
            pem: Zeroizing::new(pem.into()),
        }
    }

    /// Serialize to PEM
    ///
    /// Fails with a `Serialization` error of kind "private key" if the
    /// material does not load as a key pair.
    pub fn as_pem(&self) -> Result<String> {
        KeyPair::from_pem(&self.pem)
            .map_err(|e| Error::serialization_for_kind("private key", e.to_string()))?;
        Ok(self.pem.to_string())
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey").field("pem", &"[REDACTED]").finish()
    }
}

/// Source of named PKI material
///
/// Implementations return `CredentialNotFound` for unknown names and
/// `KeyStore` for backend failures.
#[cfg_attr(test, automock)]
pub trait KeyStore: Send + Sync {
    /// Look up a certificate by name
    fn cert(&self, name: &str) -> Result<Certificate>;

    /// Look up a private key by name
    fn private_key(&self, name: &str) -> Result<PrivateKey>;
}

/// In-memory key store
///
/// Useful for wiring and tests, and for callers that already hold all
/// material in memory.
#[derive(Default)]
pub struct MemoryKeyStore {
    certs: RwLock<BTreeMap<String, Certificate>>,
    keys: RwLock<BTreeMap<String, PrivateKey>>,
}

impl MemoryKeyStore {
    /// Create an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a certificate under `name`, replacing any previous one
    pub fn insert_cert(&self, name: impl Into<String>, cert: Certificate) {
        self.certs.write().insert(name.into(), cert);
    }

    /// Store a private key under `name`, replacing any previous one
    pub fn insert_private_key(&self, name: impl Into<String>, key: PrivateKey) {
        self.keys.write().insert(name.into(), key);
    }
}

impl std::fmt::Debug for MemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyStore")
            .field("certs", &self.certs.read().keys().collect::<Vec<_>>())
            .field("keys", &self.keys.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl KeyStore for MemoryKeyStore {
    fn cert(&self, name: &str) -> Result<Certificate> {
        self.certs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::certificate_not_found(name))
    }

    fn private_key(&self, name: &str) -> Result<PrivateKey> {
        self.keys
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::private_key_not_found(name))
    }
}
