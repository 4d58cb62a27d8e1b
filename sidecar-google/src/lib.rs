mod catalog;
pub mod labels;
mod types;

pub use catalog::{gce_instance, k8s_container, k8s_node, k8s_pod, Catalog};
pub use types::MonitoredResource;
