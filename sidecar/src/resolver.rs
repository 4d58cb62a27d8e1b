use std::sync::Arc;

use metrics::counter;
use sidecar_core::Labels;
use sidecar_google::{labels, Catalog, MonitoredResource};

/// Sidecar-level labels added to every target before it's matched against
/// the catalog.
#[derive(Clone, Debug, Default)]
pub struct ResolverOptions {
    pub(crate) project_id: Option<String>,
    pub(crate) kubernetes_location: Option<String>,
    pub(crate) kubernetes_cluster_name: Option<String>,
}

impl ResolverOptions {
    pub fn project_id(self, project_id: Option<String>) -> Self {
        Self { project_id, ..self }
    }

    pub fn kubernetes_location(self, kubernetes_location: Option<String>) -> Self {
        Self {
            kubernetes_location,
            ..self
        }
    }

    pub fn kubernetes_cluster_name(self, kubernetes_cluster_name: Option<String>) -> Self {
        Self {
            kubernetes_cluster_name,
            ..self
        }
    }
}

/// Finds the monitored resource of scrape targets.
#[derive(Clone)]
pub struct TargetResolver {
    catalog: Arc<Catalog>,
    injected: Vec<(&'static str, String)>,
}

impl TargetResolver {
    pub fn new(catalog: Arc<Catalog>, options: ResolverOptions) -> Self {
        let injected = [
            (labels::PROJECT_ID, options.project_id),
            (labels::KUBERNETES_LOCATION, options.kubernetes_location),
            (labels::KUBERNETES_CLUSTER_NAME, options.kubernetes_cluster_name),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
        .collect();

        Self { catalog, injected }
    }

    /// Labels the target already carries take precedence over injected ones.
    pub fn resolve(&self, target: &Labels) -> Option<MonitoredResource> {
        let mut labels = target.clone();

        for (name, value) in self.injected.iter() {
            if !labels.contains(name) {
                labels.insert(name, value);
            }
        }

        match self.catalog.resolve(&labels) {
            Some(resource) => {
                counter!("sidecar.resources.matched", 1);
                tracing::debug!(
                    target = "resolver",
                    "Target resolved to resource '{}'",
                    resource.r#type
                );

                Some(resource)
            }

            None => {
                counter!("sidecar.resources.unmatched", 1);
                tracing::debug!(
                    target = "resolver",
                    "No resource map matched target {:?}",
                    target
                );

                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use sidecar_core::Labels;
    use sidecar_google::{labels, Catalog};

    use super::{ResolverOptions, TargetResolver};

    fn resolver() -> TargetResolver {
        let options = ResolverOptions::default()
            .project_id(Some("my-project".to_string()))
            .kubernetes_location(Some("us-central1".to_string()))
            .kubernetes_cluster_name(Some("prod".to_string()));

        TargetResolver::new(Arc::new(Catalog::builtin().unwrap()), options)
    }

    fn pod_target() -> Labels {
        Labels::new()
            .with(labels::KUBERNETES_NAMESPACE, "kube-system")
            .with(labels::KUBERNETES_POD_NAME, "dns-0")
            .with(labels::KUBERNETES_POD_CONTAINER_NAME, "dnsmasq")
            .with("job", "kube-dns")
    }

    #[test]
    fn injects_sidecar_labels() {
        let resource = resolver().resolve(&pod_target()).unwrap();

        assert_eq!(resource.r#type, "k8s_container");
        assert_eq!(resource.labels["project_id"], "my-project");
        assert_eq!(resource.labels["location"], "us-central1");
        assert_eq!(resource.labels["cluster_name"], "prod");
        assert_eq!(resource.labels["container_name"], "dnsmasq");
        assert!(!resource.labels.contains_key("job"));
    }

    #[test]
    fn target_labels_take_precedence() {
        let target = pod_target().with(labels::PROJECT_ID, "other-project");
        let resource = resolver().resolve(&target).unwrap();

        assert_eq!(resource.labels["project_id"], "other-project");
    }

    #[test]
    fn kubernetes_needs_cluster_settings() {
        let resolver = TargetResolver::new(
            Arc::new(Catalog::builtin().unwrap()),
            ResolverOptions::default().project_id(Some("my-project".to_string())),
        );

        assert_eq!(resolver.resolve(&pod_target()), None);
    }

    #[test]
    fn empty_settings_are_not_injected() {
        let resolver = TargetResolver::new(
            Arc::new(Catalog::builtin().unwrap()),
            ResolverOptions::default()
                .project_id(Some(String::new()))
                .kubernetes_location(Some("us-central1".to_string()))
                .kubernetes_cluster_name(Some("prod".to_string())),
        );

        assert_eq!(resolver.resolve(&pod_target()), None);
    }

    #[test]
    fn gce_does_not_rely_on_injection() {
        let target = Labels::new()
            .with(labels::GCE_PROJECT, "gce-project")
            .with(labels::GCE_ZONE, "projects/gce-project/zones/asia-east1-b")
            .with(labels::GCE_INSTANCE_ID, "42");

        let resource = resolver().resolve(&target).unwrap();

        assert_eq!(resource.r#type, "gce_instance");
        assert_eq!(resource.labels["project_id"], "gce-project");
        assert_eq!(resource.labels["zone"], "asia-east1-b");
    }

    #[test]
    fn one_resolver_many_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TargetResolver>();

        let resolver = resolver();
        let target = pod_target();
        let expected = resolver.resolve(&target);
        assert!(expected.is_some());

        std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| resolver.resolve(&target)))
                .collect::<Vec<_>>();

            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn input_is_left_untouched() {
        let target = pod_target();
        let before = target.clone();

        resolver().resolve(&target);

        assert_eq!(target, before);
    }
}
