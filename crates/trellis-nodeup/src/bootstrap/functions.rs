//! Functions available to the boot script template
//!
//! The set is closed: each variant holds only the data it needs, captured
//! when a render starts. Environment bundles are therefore read once per
//! render, however often the template calls them.

use std::sync::Arc;

use trellis_common::template::TemplateFunction;
use trellis_common::yaml::to_canonical_yaml;
use trellis_common::{Error, Result};

use super::env::{AwsRegion, S3Credentials};
use super::NodeConfigBuilder;
use crate::model::InstanceGroup;

/// One callable template function
#[derive(Clone)]
pub enum BootstrapFunction {
    /// `NodeUpSource()`: comma-separated nodeup download URLs
    NodeUpSource(String),
    /// `NodeUpSourceHash()`: SHA-256 of the nodeup binary
    NodeUpSourceHash(String),
    /// `KubeEnv()`: node configuration for the group, as YAML
    KubeEnv {
        /// Builder producing the configuration
        builder: Arc<dyn NodeConfigBuilder>,
        /// Group the configuration is built for
        instance_group: InstanceGroup,
    },
    /// `S3Env()`: object store export lines, or nothing
    S3Env(Option<S3Credentials>),
    /// `AWS_REGION()`: region export line, or nothing
    AwsRegion(Option<AwsRegion>),
}

impl BootstrapFunction {
    fn kube_env(
        builder: &dyn NodeConfigBuilder,
        instance_group: &InstanceGroup,
    ) -> Result<String> {
        let config = builder.build(instance_group).map_err(|err| match err {
            Error::ConfigBuild { .. } => err,
            other => Error::config_build(&instance_group.name, other.to_string()),
        })?;
        to_canonical_yaml(&config)
    }
}

impl TemplateFunction for BootstrapFunction {
    fn name(&self) -> &str {
        match self {
            Self::NodeUpSource(_) => "NodeUpSource",
            Self::NodeUpSourceHash(_) => "NodeUpSourceHash",
            Self::KubeEnv { .. } => "KubeEnv",
            Self::S3Env(_) => "S3Env",
            Self::AwsRegion(_) => "AWS_REGION",
        }
    }

    fn call(&self) -> Result<String> {
        match self {
            Self::NodeUpSource(source) => Ok(source.clone()),
            Self::NodeUpSourceHash(hash) => Ok(hash.clone()),
            Self::KubeEnv {
                builder,
                instance_group,
            } => Self::kube_env(builder.as_ref(), instance_group),
            Self::S3Env(credentials) => Ok(credentials
                .as_ref()
                .map(S3Credentials::exports)
                .unwrap_or_default()),
            Self::AwsRegion(region) => Ok(region
                .as_ref()
                .map(AwsRegion::exports)
                .unwrap_or_default()),
        }
    }
}

impl std::fmt::Debug for BootstrapFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeUpSource(source) => f.debug_tuple("NodeUpSource").field(source).finish(),
            Self::NodeUpSourceHash(hash) => f.debug_tuple("NodeUpSourceHash").field(hash).finish(),
            Self::KubeEnv { instance_group, .. } => f
                .debug_struct("KubeEnv")
                .field("instance_group", &instance_group.name)
                .finish_non_exhaustive(),
            Self::S3Env(credentials) => f.debug_tuple("S3Env").field(credentials).finish(),
            Self::AwsRegion(region) => f.debug_tuple("AwsRegion").field(region).finish(),
        }
    }
}
