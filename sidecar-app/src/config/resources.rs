use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sidecar_core::{LabelTranslation, ResourceMap};

/// Extra resource map declared in the configuration file.
#[derive(Deserialize, Serialize, Debug)]
pub struct ResourceConfig {
    pub r#type: String,
    pub labels: HashMap<String, LabelTranslation>,
}

impl ResourceConfig {
    pub fn to_resource_map(&self) -> eyre::Result<ResourceMap> {
        ResourceMap::new(
            self.r#type.as_str(),
            self.labels
                .iter()
                .map(|(source, translation)| (source, translation.clone())),
        )
    }
}
