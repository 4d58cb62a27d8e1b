use std::collections::HashSet;

use eyre::{bail, WrapErr};
use sidecar_core::{LabelTranslation, Labels, ResourceMap};

use crate::{labels, MonitoredResource};

pub fn k8s_container() -> eyre::Result<ResourceMap> {
    ResourceMap::builder("k8s_container")
        .constant(labels::PROJECT_ID, "project_id")
        .constant(labels::KUBERNETES_LOCATION, "location")
        .constant(labels::KUBERNETES_CLUSTER_NAME, "cluster_name")
        .constant(labels::KUBERNETES_NAMESPACE, "namespace_name")
        .constant(labels::KUBERNETES_POD_NAME, "pod_name")
        .constant(labels::KUBERNETES_POD_CONTAINER_NAME, "container_name")
        .build()
}

pub fn k8s_pod() -> eyre::Result<ResourceMap> {
    ResourceMap::builder("k8s_pod")
        .constant(labels::PROJECT_ID, "project_id")
        .constant(labels::KUBERNETES_LOCATION, "location")
        .constant(labels::KUBERNETES_CLUSTER_NAME, "cluster_name")
        .constant(labels::KUBERNETES_NAMESPACE, "namespace_name")
        .constant(labels::KUBERNETES_POD_NAME, "pod_name")
        .build()
}

pub fn k8s_node() -> eyre::Result<ResourceMap> {
    ResourceMap::builder("k8s_node")
        .constant(labels::PROJECT_ID, "project_id")
        .constant(labels::KUBERNETES_LOCATION, "location")
        .constant(labels::KUBERNETES_CLUSTER_NAME, "cluster_name")
        .constant(labels::KUBERNETES_NODE_NAME, "node_name")
        .build()
}

pub fn gce_instance() -> eyre::Result<ResourceMap> {
    ResourceMap::builder("gce_instance")
        .constant(labels::GCE_PROJECT, "project_id")
        .label(labels::GCE_ZONE, LabelTranslation::ZoneFromUrl)
        .constant(labels::GCE_INSTANCE_ID, "instance_id")
        .build()
}

/// Ordered set of resource maps. When several maps match a target, the
/// first one wins, so more specific maps must come first.
#[derive(Clone, Debug)]
pub struct Catalog {
    maps: Vec<ResourceMap>,
}

impl Catalog {
    pub fn new(maps: Vec<ResourceMap>) -> eyre::Result<Self> {
        let mut types = HashSet::with_capacity(maps.len());

        for map in maps.iter() {
            if !types.insert(map.r#type()) {
                bail!("Resource type '{}' is declared more than once", map.r#type())
            }
        }

        Ok(Self { maps })
    }

    pub fn builtin() -> eyre::Result<Self> {
        let maps = vec![k8s_container()?, k8s_pod()?, k8s_node()?, gce_instance()?];

        Catalog::new(maps).wrap_err("Invalid built-in resource catalog")
    }

    /// Appends `maps` after the current ones.
    pub fn extend(self, maps: Vec<ResourceMap>) -> eyre::Result<Self> {
        let mut all = self.maps;
        all.extend(maps);

        Catalog::new(all)
    }

    pub fn get(&self, r#type: &str) -> Option<&ResourceMap> {
        self.maps.iter().find(|m| m.r#type() == r#type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceMap> {
        self.maps.iter()
    }

    pub fn resolve(&self, target: &Labels) -> Option<MonitoredResource> {
        self.maps.iter().find_map(|map| {
            map.translate(target).map(|labels| MonitoredResource {
                r#type: map.r#type().to_string(),
                labels,
            })
        })
    }
}
