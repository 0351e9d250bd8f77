// ABOUTME: Snapshots of engine objects rendered by the listing views.
// ABOUTME: Network, Checkpoint and Task, deserializable from engine-API-shaped JSON.

use crate::types::{Labels, NetworkId, NodeId, ServiceId, TaskId};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// A network as returned by a network listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Network {
    /// Network ID.
    #[serde(rename = "Id")]
    pub id: NetworkId,
    pub name: String,
    /// Driver (bridge, host, overlay, ...).
    pub driver: String,
    /// Scope (local, swarm, global).
    pub scope: String,
    #[serde(rename = "EnableIPv4")]
    pub enable_ipv4: bool,
    #[serde(rename = "EnableIPv6")]
    pub enable_ipv6: bool,
    pub internal: bool,
    pub labels: Labels,
    /// Creation time; absent on very old engines.
    pub created: Option<DateTime<Utc>>,
}

/// A container checkpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Checkpoint {
    pub name: String,
}

/// A swarm task: one scheduled instance of a service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Task {
    #[serde(rename = "ID")]
    pub id: TaskId,
    #[serde(rename = "ServiceID")]
    pub service_id: ServiceId,
    /// Replica slot; zero for global services.
    pub slot: u64,
    #[serde(rename = "NodeID")]
    pub node_id: NodeId,
    pub desired_state: TaskState,
    pub status: TaskStatus,
    pub spec: TaskSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskSpec {
    pub container_spec: ContainerSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerSpec {
    /// Image reference, possibly pinned by digest.
    pub image: String,
}

/// Observed status of a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskStatus {
    /// When the task entered `state`.
    pub timestamp: Option<DateTime<Utc>>,
    pub state: TaskState,
    pub err: String,
    pub port_status: PortStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PortStatus {
    pub ports: Vec<PortConfig>,
}

/// A port published by a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PortConfig {
    pub name: String,
    pub protocol: Protocol,
    /// Port inside the container.
    pub target_port: u32,
    /// Port on the swarm routing mesh or host.
    pub published_port: u32,
}

/// Network protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Sctp => write!(f, "sctp"),
        }
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    #[default]
    New,
    Allocated,
    Pending,
    Assigned,
    Accepted,
    Preparing,
    Ready,
    Starting,
    Running,
    Complete,
    Shutdown,
    Failed,
    Rejected,
    Remove,
    Orphaned,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::New => "new",
            TaskState::Allocated => "allocated",
            TaskState::Pending => "pending",
            TaskState::Assigned => "assigned",
            TaskState::Accepted => "accepted",
            TaskState::Preparing => "preparing",
            TaskState::Ready => "ready",
            TaskState::Starting => "starting",
            TaskState::Running => "running",
            TaskState::Complete => "complete",
            TaskState::Shutdown => "shutdown",
            TaskState::Failed => "failed",
            TaskState::Rejected => "rejected",
            TaskState::Remove => "remove",
            TaskState::Orphaned => "orphaned",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
