//! Boot script rendering
//!
//! [`BootstrapScript`] renders the user data a new instance runs on first
//! boot. Per render it:
//! 1. Skips bastion groups entirely (`Ok(None)`)
//! 2. Serializes the embedded cluster spec when the cluster asks for it
//! 3. Captures the template functions, reading the environment once
//! 4. Renders the template and enforces the user-data size limit

mod env;
mod functions;

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

use trellis_common::template::{RenderedTemplate, TemplateContext, TemplateEngine};
use trellis_common::{Error, Result};

use crate::cluster_spec::serialize_cluster_spec;
use crate::config::NodeupSettings;
use crate::model::{ClusterSpec, InstanceGroup, InstanceGroupRole, NodeUpConfig};

pub use env::{AwsRegion, EnvSource, ProcessEnv, S3Credentials};
pub use functions::BootstrapFunction;

/// Name the embedded boot template renders under
pub const NODEUP_TEMPLATE_NAME: &str = "nodeup.sh";

/// Embedded boot template
pub const NODEUP_TEMPLATE: &str = include_str!("../../templates/nodeup.sh");

/// Raw user-data limit of EC2 instances, in bytes
pub const DEFAULT_MAX_USER_DATA_BYTES: usize = 16384;

/// Builds the node configuration for an instance group
///
/// Any `Fn(&InstanceGroup) -> Result<NodeUpConfig>` closure is a builder.
#[cfg_attr(test, automock)]
pub trait NodeConfigBuilder: Send + Sync {
    /// Build the configuration for `instance_group`
    fn build(&self, instance_group: &InstanceGroup) -> Result<NodeUpConfig>;
}

impl<F> NodeConfigBuilder for F
where
    F: Fn(&InstanceGroup) -> Result<NodeUpConfig> + Send + Sync,
{
    fn build(&self, instance_group: &InstanceGroup) -> Result<NodeUpConfig> {
        self(instance_group)
    }
}

/// Renders first-boot scripts for instance groups
pub struct BootstrapScript {
    nodeup_source: String,
    nodeup_source_hash: String,
    builder: Arc<dyn NodeConfigBuilder>,
    env: Arc<dyn EnvSource>,
    template_name: String,
    template: String,
    max_user_data_bytes: usize,
    engine: TemplateEngine,
}

impl BootstrapScript {
    /// Renderer for the embedded template, reading the process environment
    pub fn new(
        nodeup_source: impl Into<String>,
        nodeup_source_hash: impl Into<String>,
        builder: impl NodeConfigBuilder + 'static,
    ) -> Self {
        Self {
            nodeup_source: nodeup_source.into(),
            nodeup_source_hash: nodeup_source_hash.into(),
            builder: Arc::new(builder),
            env: Arc::new(ProcessEnv),
            template_name: NODEUP_TEMPLATE_NAME.to_string(),
            template: NODEUP_TEMPLATE.to_string(),
            max_user_data_bytes: DEFAULT_MAX_USER_DATA_BYTES,
            engine: TemplateEngine::new(),
        }
    }

    /// Renderer configured from `settings`
    pub fn from_settings(
        settings: &NodeupSettings,
        builder: impl NodeConfigBuilder + 'static,
    ) -> Self {
        Self::new(
            settings.nodeup_source.clone(),
            settings.nodeup_source_hash.clone(),
            builder,
        )
        .with_max_user_data_bytes(settings.max_user_data_bytes)
    }

    /// Read environment bundles from `env` instead of the process
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Render `source` under `name` instead of the embedded template
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.template_name = name.into();
        self.template = source.into();
        self
    }

    /// Reject output larger than `limit` bytes
    pub fn with_max_user_data_bytes(mut self, limit: usize) -> Self {
        self.max_user_data_bytes = limit;
        self
    }

    /// Render the boot script for `instance_group`
    ///
    /// Returns `Ok(None)` for bastion groups, which boot without one.
    ///
    /// # Errors
    ///
    /// - `Serialization` if the embedded cluster spec or the node
    ///   configuration cannot be converted
    /// - `ConfigBuild` if the node configuration builder fails
    /// - `TemplateSyntax` / `TemplateExecution` for template failures
    /// - `UserDataTooLarge` if the script exceeds the size limit
    pub fn render_nodeup(
        &self,
        instance_group: &InstanceGroup,
        cluster_spec: &ClusterSpec,
    ) -> Result<Option<RenderedTemplate>> {
        if instance_group.role == InstanceGroupRole::Bastion {
            debug!(instance_group = %instance_group.name, "bastion group, no boot script");
            return Ok(None);
        }

        let embed = cluster_spec.enable_cluster_spec_in_user_data;
        let spec_content = serialize_cluster_spec(
            cluster_spec,
            instance_group,
            embed,
            cluster_spec.enable_cluster_spec_hash,
        )?;

        let ctx = TemplateContext::builder()
            .bool("IncludeClusterSpec", embed)
            .string("ClusterSpecContent", spec_content)
            .build();

        let functions = self.functions(instance_group);
        let rendered = self
            .engine
            .render(&self.template_name, &self.template, &functions, &ctx)?;

        if rendered.len() > self.max_user_data_bytes {
            return Err(Error::user_data_too_large(
                rendered.name(),
                rendered.len(),
                self.max_user_data_bytes,
            ));
        }

        info!(
            instance_group = %instance_group.name,
            template = %rendered.name(),
            bytes = rendered.len(),
            "rendered boot script"
        );
        Ok(Some(rendered))
    }

    fn functions(&self, instance_group: &InstanceGroup) -> Vec<BootstrapFunction> {
        vec![
            BootstrapFunction::NodeUpSource(self.nodeup_source.clone()),
            BootstrapFunction::NodeUpSourceHash(self.nodeup_source_hash.clone()),
            BootstrapFunction::KubeEnv {
                builder: Arc::clone(&self.builder),
                instance_group: instance_group.clone(),
            },
            BootstrapFunction::S3Env(S3Credentials::read(self.env.as_ref())),
            BootstrapFunction::AwsRegion(AwsRegion::read(self.env.as_ref())),
        ]
    }
}

impl std::fmt::Debug for BootstrapScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapScript")
            .field("nodeup_source", &self.nodeup_source)
            .field("nodeup_source_hash", &self.nodeup_source_hash)
            .field("template_name", &self.template_name)
            .field("max_user_data_bytes", &self.max_user_data_bytes)
            .finish_non_exhaustive()
    }
}
