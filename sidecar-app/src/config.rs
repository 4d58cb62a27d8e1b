mod resources;

use std::path::Path;

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use sidecar::{ResolverOptions, StatusOptions};
use sidecar_google::Catalog;

use crate::config::resources::ResourceConfig;

#[derive(Deserialize, Serialize, Debug)]
pub struct Config {
    pub project_id: Option<String>,

    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default)]
    pub kubernetes: KubernetesConfig,

    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct KubernetesConfig {
    pub location: Option<String>,
    pub cluster_name: Option<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0:9091".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            listen_address: default_listen_address(),
            kubernetes: KubernetesConfig::default(),
            resources: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Error when reading config file {:?}", path))?;

        Config::parse(content.as_str())
            .wrap_err_with(|| format!("Error when parsing config file {:?}", path))
    }

    pub fn parse(content: &str) -> eyre::Result<Self> {
        toml::from_str(content).wrap_err("Invalid configuration")
    }

    /// Built-in resource maps followed by the configured ones.
    pub fn catalog(&self) -> eyre::Result<Catalog> {
        let mut maps = Vec::with_capacity(self.resources.len());

        for resource in self.resources.iter() {
            maps.push(resource.to_resource_map()?);
        }

        Catalog::builtin()?
            .extend(maps)
            .wrap_err("Invalid resource configuration")
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions::default()
            .project_id(self.project_id.clone())
            .kubernetes_location(self.kubernetes.location.clone())
            .kubernetes_cluster_name(self.kubernetes.cluster_name.clone())
    }

    pub fn status_options(&self) -> eyre::Result<StatusOptions> {
        let rendered = serde_json::to_string_pretty(self)
            .wrap_err("Error when rendering the configuration")?;

        Ok(StatusOptions::default()
            .project_id(self.project_id.clone())
            .cluster_location(self.kubernetes.location.clone())
            .cluster_name(self.kubernetes.cluster_name.clone())
            .config(rendered))
    }
}
