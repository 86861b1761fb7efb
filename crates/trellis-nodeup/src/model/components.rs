//! Per-component configuration carried by the cluster spec
//!
//! Only the fields boot data needs are modelled. Every field is optional and
//! omitted from serialized output when unset, so an embedded section shows
//! exactly what the operator configured.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Container runtime settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DockerConfig {
    /// Daemon log level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Storage driver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Runtime version to install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Bridge interface address
    #[serde(rename = "bridgeIP", default, skip_serializing_if = "Option::is_none")]
    pub bridge_ip: Option<String>,
}

/// kube-proxy settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubeProxyConfig {
    /// Container image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// CPU request for the proxy pod
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_request: Option<String>,
    /// API server address the proxy talks to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    /// Pod network range
    #[serde(rename = "clusterCIDR", default, skip_serializing_if = "Option::is_none")]
    pub cluster_cidr: Option<String>,
    /// Feature gates passed through verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_gates: BTreeMap<String, String>,
}

/// kubelet settings, used for both worker and control-plane kubelets
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubeletConfigSpec {
    /// Path to the kubelet kubeconfig
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,
    /// Directory of static pod manifests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_manifest_path: Option<String>,
    /// Cloud provider name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
    /// Cluster DNS server address
    #[serde(rename = "clusterDNS", default, skip_serializing_if = "Option::is_none")]
    pub cluster_dns: Option<String>,
    /// Cluster DNS domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,
    /// Feature gates passed through verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_gates: BTreeMap<String, String>,
}

/// kube-apiserver settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubeApiServerConfig {
    /// Container image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Cloud provider name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
    /// Service network range
    #[serde(
        rename = "serviceClusterIPRange",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub service_cluster_ip_range: Option<String>,
    /// etcd endpoints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub etcd_servers: Vec<String>,
}

/// kube-controller-manager settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubeControllerManagerConfig {
    /// Container image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Cloud provider name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
    /// Pod network range
    #[serde(rename = "clusterCIDR", default, skip_serializing_if = "Option::is_none")]
    pub cluster_cidr: Option<String>,
}

/// kube-scheduler settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KubeSchedulerConfig {
    /// Container image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Whether leader election is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_election: Option<bool>,
}

/// Cloud provider configuration file settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfiguration {
    /// Tags identifying cluster nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_tags: Option<String>,
    /// Instance name prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_instance_prefix: Option<String>,
    /// Whether the cluster spans zones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multizone: Option<bool>,
}
