//! Cluster-wide specification

use serde::{Deserialize, Serialize};

use super::components::{
    CloudConfiguration, DockerConfig, KubeApiServerConfig, KubeControllerManagerConfig,
    KubeProxyConfig, KubeSchedulerConfig, KubeletConfigSpec,
};

/// Desired state of a cluster
///
/// Supplied by the caller and never modified here. Network and etcd topology
/// are carried for completeness; boot data only reads the component configs
/// and the two user-data flags.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Cloud provider name (e.g. "aws")
    #[serde(default)]
    pub cloud_provider: String,

    /// Kubernetes version nodes run
    #[serde(default)]
    pub kubernetes_version: String,

    /// Subnets the cluster spans
    #[serde(default)]
    pub subnets: Vec<ClusterSubnetSpec>,

    /// Range that is not masqueraded
    #[serde(rename = "nonMasqueradeCIDR", default)]
    pub non_masquerade_cidr: String,

    /// VPC network range
    #[serde(rename = "networkCIDR", default)]
    pub network_cidr: String,

    /// etcd clusters backing the control plane
    #[serde(default)]
    pub etcd_clusters: Vec<EtcdClusterSpec>,

    /// Embed the component configs in boot data
    #[serde(default)]
    pub enable_cluster_spec_in_user_data: bool,

    /// Base64-encode the embedded component configs
    #[serde(default)]
    pub enable_cluster_spec_hash: bool,

    /// Container runtime
    #[serde(default)]
    pub docker: Option<DockerConfig>,

    /// kube-proxy
    #[serde(default)]
    pub kube_proxy: Option<KubeProxyConfig>,

    /// Worker kubelet
    #[serde(default)]
    pub kubelet: Option<KubeletConfigSpec>,

    /// Cloud provider config file
    #[serde(default)]
    pub cloud_config: Option<CloudConfiguration>,

    /// kube-apiserver (control plane only)
    #[serde(rename = "kubeAPIServer", default)]
    pub kube_api_server: Option<KubeApiServerConfig>,

    /// kube-controller-manager (control plane only)
    #[serde(default)]
    pub kube_controller_manager: Option<KubeControllerManagerConfig>,

    /// kube-scheduler (control plane only)
    #[serde(default)]
    pub kube_scheduler: Option<KubeSchedulerConfig>,

    /// Control-plane kubelet (control plane only)
    #[serde(default)]
    pub master_kubelet: Option<KubeletConfigSpec>,
}

/// One subnet of the cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSubnetSpec {
    /// Subnet name
    pub name: String,
    /// Availability zone
    #[serde(default)]
    pub zone: String,
    /// Address range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

/// An etcd cluster and its members
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EtcdClusterSpec {
    /// Cluster name ("main", "events", ...)
    pub name: String,
    /// Members
    #[serde(default)]
    pub members: Vec<EtcdMemberSpec>,
}

/// One etcd member
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EtcdMemberSpec {
    /// Member name
    pub name: String,
    /// Instance group hosting the member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_group: Option<String>,
}
