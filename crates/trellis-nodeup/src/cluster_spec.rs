//! Cluster spec embedding for boot data
//!
//! A node can receive the component configs it needs inline in its boot
//! script instead of fetching them from the config store. Worker nodes get
//! the container runtime, kube-proxy, kubelet and cloud config sections;
//! control-plane nodes additionally get the API server, controller manager,
//! scheduler and control-plane kubelet sections.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use tracing::debug;

use trellis_common::yaml::to_canonical_yaml;
use trellis_common::Result;

use crate::model::{
    is_control_plane, CloudConfiguration, ClusterSpec, DockerConfig, InstanceGroup,
    KubeApiServerConfig, KubeControllerManagerConfig, KubeProxyConfig, KubeSchedulerConfig,
    KubeletConfigSpec,
};

/// Sections every node receives. Unset configs are written as `null`.
#[derive(Serialize)]
struct EmbeddedClusterSpec<'a> {
    docker: Option<&'a DockerConfig>,
    #[serde(rename = "kubeProxy")]
    kube_proxy: Option<&'a KubeProxyConfig>,
    kubelet: Option<&'a KubeletConfigSpec>,
    #[serde(rename = "cloudConfig")]
    cloud_config: Option<&'a CloudConfiguration>,
    #[serde(flatten)]
    control_plane: Option<ControlPlaneSections<'a>>,
}

#[derive(Serialize)]
struct ControlPlaneSections<'a> {
    #[serde(rename = "kubeAPIServer")]
    kube_api_server: Option<&'a KubeApiServerConfig>,
    #[serde(rename = "kubeControllerManager")]
    kube_controller_manager: Option<&'a KubeControllerManagerConfig>,
    #[serde(rename = "kubeScheduler")]
    kube_scheduler: Option<&'a KubeSchedulerConfig>,
    #[serde(rename = "masterKubelet")]
    master_kubelet: Option<&'a KubeletConfigSpec>,
}

impl<'a> EmbeddedClusterSpec<'a> {
    fn new(spec: &'a ClusterSpec, control_plane: bool) -> Self {
        Self {
            docker: spec.docker.as_ref(),
            kube_proxy: spec.kube_proxy.as_ref(),
            kubelet: spec.kubelet.as_ref(),
            cloud_config: spec.cloud_config.as_ref(),
            control_plane: control_plane.then(|| ControlPlaneSections {
                kube_api_server: spec.kube_api_server.as_ref(),
                kube_controller_manager: spec.kube_controller_manager.as_ref(),
                kube_scheduler: spec.kube_scheduler.as_ref(),
                master_kubelet: spec.master_kubelet.as_ref(),
            }),
        }
    }
}

/// Serialize the sections of `spec` that `instance_group` needs
///
/// Returns an empty string when `embed` is false; `encode` then has no
/// effect. Otherwise the sections are written as canonical YAML with sorted
/// keys and, when `encode` is true, base64-encoded (standard alphabet,
/// padded). The encoding is reversible and is not a digest.
///
/// # Errors
///
/// `Serialization` if the sections cannot be converted. No partial output is
/// returned.
pub fn serialize_cluster_spec(
    spec: &ClusterSpec,
    instance_group: &InstanceGroup,
    embed: bool,
    encode: bool,
) -> Result<String> {
    if !embed {
        return Ok(String::new());
    }

    let control_plane = is_control_plane(instance_group.role);
    let yaml = to_canonical_yaml(&EmbeddedClusterSpec::new(spec, control_plane))?;

    debug!(
        instance_group = %instance_group.name,
        control_plane,
        encode,
        bytes = yaml.len(),
        "serialized embedded cluster spec"
    );

    if encode {
        Ok(STANDARD.encode(yaml.as_bytes()))
    } else {
        Ok(yaml)
    }
}
