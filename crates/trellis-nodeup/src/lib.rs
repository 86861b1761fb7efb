//! Node provisioning for trellis clusters
//!
//! Two artifacts are produced for a newly launched node:
//! - file directives materializing its certificates and private keys, added
//!   to a shared [`ModelBuilderContext`] by [`CredentialMaterializer`]
//! - the first-boot script, rendered by [`BootstrapScript`]

#![deny(missing_docs)]

pub mod bootstrap;
pub mod builder;
pub mod cluster_spec;
pub mod config;
pub mod credentials;
pub mod keystore;
pub mod model;

pub use bootstrap::{BootstrapScript, NodeConfigBuilder};
pub use builder::{
    DirectiveSink, FileType, ModelBuilderContext, ProvisioningDirective, ProvisioningPlan,
};
pub use cluster_spec::serialize_cluster_spec;
pub use config::NodeupSettings;
pub use credentials::CredentialMaterializer;
pub use keystore::{Certificate, KeyStore, MemoryKeyStore, PrivateKey};
pub use trellis_common::{Error, Result};
