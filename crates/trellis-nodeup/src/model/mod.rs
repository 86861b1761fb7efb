//! Cluster and node model
//!
//! Read-only inputs: the cluster spec, the instance group being provisioned,
//! and the node configuration the injected builder returns for it.

mod cluster;
mod components;
mod instance_group;
mod nodeup;

pub use cluster::{ClusterSpec, ClusterSubnetSpec, EtcdClusterSpec, EtcdMemberSpec};
pub use components::{
    CloudConfiguration, DockerConfig, KubeApiServerConfig, KubeControllerManagerConfig,
    KubeProxyConfig, KubeSchedulerConfig, KubeletConfigSpec,
};
pub use instance_group::{is_control_plane, InstanceGroup, InstanceGroupRole};
pub use nodeup::{Image, NodeUpConfig};
