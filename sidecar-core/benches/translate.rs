use criterion::{criterion_group, criterion_main, Criterion};
use sidecar_core::{Labels, ResourceMap};
use std::hint::black_box;

fn benchmark_translate(c: &mut Criterion) {
    let map = ResourceMap::builder("gke_container")
        .constant("_stackdriver_project_id", "project_id")
        .constant("_kubernetes_location", "zone")
        .constant("_kubernetes_cluster_name", "cluster_name")
        .constant("_kubernetes_namespace", "namespace_id")
        .constant("_kubernetes_pod_name", "pod_id")
        .constant("_kubernetes_pod_node_name", "instance_id")
        .constant("_kubernetes_pod_container_name", "container_name")
        .build()
        .unwrap();

    let target = Labels::new()
        .with("_stackdriver_project_id", "1:anoeuh oeusoeh uasoeuh")
        .with("_kubernetes_location", "2:anoeuh oeusoeh uasoeuh")
        .with("_kubernetes_cluster_name", "3:anoeuh oeusoeh uasoeuh")
        .with("_kubernetes_namespace", "4:anoeuh oeusoeh uasoeuh")
        .with("_kubernetes_pod_name", "5:anoeuh oeusoeh uasoeuh")
        .with("_kubernetes_pod_node_name", "6:anoeuh oeusoeh uasoeuh")
        .with("_kubernetes_pod_container_name", "7:anoeuh oeusoeh uasoeuh")
        .with("ignored", "8:anoeuh oeusoeh uasoeuh");

    c.bench_function("resource_map_translate", |b| {
        b.iter(|| black_box(map.translate(black_box(&target))))
    });
}

criterion_group!(benches, benchmark_translate);
criterion_main!(benches);
