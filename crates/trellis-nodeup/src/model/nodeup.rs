//! Per-instance-group node configuration
//!
//! Produced by the injected builder and written verbatim to `kube_env.yaml`
//! on the node. Empty fields are omitted, so a default value serializes to
//! `{}`.

use serde::{Deserialize, Serialize};

/// Configuration consumed by the node agent at boot
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpConfig {
    /// Tags selecting which node models apply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Assets to download, as `hash@url`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,

    /// Cluster name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    /// Base location of the cluster configuration store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_base: Option<String>,

    /// Instance group the node belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_group_name: Option<String>,

    /// Addon channels to apply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,

    /// Image hints the node should preload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
}

/// A container image to preload
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image reference
    pub name: String,
    /// Download location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Hash of the download
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}
