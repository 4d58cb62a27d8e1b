//! Target label names the built-in resource maps know about.

/// Injected by the sidecar from its configured project id.
pub const PROJECT_ID: &str = "_stackdriver_project_id";
/// Injected by the sidecar from its configured cluster location.
pub const KUBERNETES_LOCATION: &str = "_kubernetes_location";
/// Injected by the sidecar from its configured cluster name.
pub const KUBERNETES_CLUSTER_NAME: &str = "_kubernetes_cluster_name";

pub const KUBERNETES_NAMESPACE: &str = "__meta_kubernetes_namespace";
pub const KUBERNETES_POD_NAME: &str = "__meta_kubernetes_pod_name";
pub const KUBERNETES_POD_CONTAINER_NAME: &str = "__meta_kubernetes_pod_container_name";
pub const KUBERNETES_NODE_NAME: &str = "__meta_kubernetes_node_name";

pub const GCE_PROJECT: &str = "__meta_gce_project";
pub const GCE_ZONE: &str = "__meta_gce_zone";
pub const GCE_INSTANCE_ID: &str = "__meta_gce_instance_id";
