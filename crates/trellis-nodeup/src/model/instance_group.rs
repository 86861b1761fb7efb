//! Instance groups and their roles

use serde::{Deserialize, Serialize};

use trellis_common::Error;

/// Role of the machines in an instance group
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum InstanceGroupRole {
    /// Runs the control plane components
    #[serde(alias = "Master")]
    ControlPlane,
    /// Runs workloads
    #[serde(alias = "Node")]
    Worker,
    /// SSH jump host; gets no boot script
    Bastion,
}

impl InstanceGroupRole {
    /// Returns true if this role runs the control plane
    pub fn is_control_plane(&self) -> bool {
        matches!(self, Self::ControlPlane)
    }
}

/// Whether machines with `role` run the control plane
pub fn is_control_plane(role: InstanceGroupRole) -> bool {
    role.is_control_plane()
}

impl std::str::FromStr for InstanceGroupRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "controlplane" | "master" => Ok(Self::ControlPlane),
            "worker" | "node" => Ok(Self::Worker),
            "bastion" => Ok(Self::Bastion),
            _ => Err(Error::serialization_for_kind(
                "instance group role",
                format!("invalid role: {s}, expected one of: ControlPlane, Worker, Bastion"),
            )),
        }
    }
}

impl std::fmt::Display for InstanceGroupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ControlPlane => write!(f, "ControlPlane"),
            Self::Worker => write!(f, "Worker"),
            Self::Bastion => write!(f, "Bastion"),
        }
    }
}

/// A group of identically configured machines
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroup {
    /// Group name, used in logs and error messages
    pub name: String,

    /// Role of every machine in the group
    pub role: InstanceGroupRole,

    /// Machine type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,

    /// Machine image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Minimum group size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,

    /// Maximum group size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,

    /// Subnets the group launches into
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<String>,
}

impl InstanceGroup {
    /// Create a group with only a name and role set
    pub fn new(name: impl Into<String>, role: InstanceGroupRole) -> Self {
        Self {
            name: name.into(),
            role,
            machine_type: None,
            image: None,
            min_size: None,
            max_size: None,
            subnets: Vec::new(),
        }
    }

    /// Whether this group runs the control plane
    pub fn is_control_plane(&self) -> bool {
        is_control_plane(self.role)
    }
}
