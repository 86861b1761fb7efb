//! Error types for node provisioning
//!
//! Errors are structured with fields to aid debugging. Variants carry names,
//! template identifiers and messages only; credential material and rendered
//! boot data never end up inside an error.

use thiserror::Error;

/// Main error type for trellis operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A named certificate or private key is absent from the key store
    #[error("{kind} '{name}' not found in key store")]
    CredentialNotFound {
        /// Name the credential was requested under
        name: String,
        /// Kind of credential ("certificate" or "private key")
        kind: String,
    },

    /// The key store failed for a reason other than a missing name
    #[error("key store error for '{name}': {message}")]
    KeyStore {
        /// Name the credential was requested under
        name: String,
        /// Description of what failed
        message: String,
    },

    /// Structured data could not be converted to its textual form
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// What was being serialized (if known)
        kind: Option<String>,
    },

    /// The injected node configuration builder failed
    #[error("node config build failed for instance group {instance_group}: {message}")]
    ConfigBuild {
        /// Instance group the configuration was built for
        instance_group: String,
        /// Description of what failed
        message: String,
    },

    /// A template could not be parsed
    #[error("template syntax error in {template}: {message}")]
    TemplateSyntax {
        /// Name of the offending template
        template: String,
        /// Parser diagnostic
        message: String,
    },

    /// A template failed while expanding
    #[error("template execution error in {template}: {message}")]
    TemplateExecution {
        /// Name of the offending template
        template: String,
        /// Description of what failed
        message: String,
    },

    /// Rendered boot data exceeds the platform limit
    #[error("rendered {template} is {size} bytes, over the {limit} byte user-data limit")]
    UserDataTooLarge {
        /// Name of the template that produced the output
        template: String,
        /// Size of the rendered output in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },
}

impl Error {
    /// Create a not-found error for a certificate
    pub fn certificate_not_found(name: impl Into<String>) -> Self {
        Self::CredentialNotFound {
            name: name.into(),
            kind: "certificate".to_string(),
        }
    }

    /// Create a not-found error for a private key
    pub fn private_key_not_found(name: impl Into<String>) -> Self {
        Self::CredentialNotFound {
            name: name.into(),
            kind: "private key".to_string(),
        }
    }

    /// Create a key store backend error
    pub fn key_store(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::KeyStore {
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error naming what was being serialized
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a config build error for an instance group
    pub fn config_build(instance_group: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ConfigBuild {
            instance_group: instance_group.into(),
            message: msg.into(),
        }
    }

    /// Create a template syntax error
    pub fn template_syntax(template: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TemplateSyntax {
            template: template.into(),
            message: msg.into(),
        }
    }

    /// Create a template execution error
    pub fn template_execution(template: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TemplateExecution {
            template: template.into(),
            message: msg.into(),
        }
    }

    /// Create an oversized user-data error
    pub fn user_data_too_large(template: impl Into<String>, size: usize, limit: usize) -> Self {
        Self::UserDataTooLarge {
            template: template.into(),
            size,
            limit,
        }
    }

    /// Check if this error is retryable
    ///
    /// Nothing in this crate retries. The classification is for the
    /// orchestration layer: only key store backend failures can succeed on a
    /// second attempt, everything else needs an input or template fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::KeyStore { .. } => true,
            Error::CredentialNotFound { .. }
            | Error::Serialization { .. }
            | Error::ConfigBuild { .. }
            | Error::TemplateSyntax { .. }
            | Error::TemplateExecution { .. }
            | Error::UserDataTooLarge { .. } => false,
        }
    }

    /// Get the template name if this error came from rendering
    pub fn template(&self) -> Option<&str> {
        match self {
            Error::TemplateSyntax { template, .. }
            | Error::TemplateExecution { template, .. }
            | Error::UserDataTooLarge { template, .. } => Some(template),
            _ => None,
        }
    }
}
