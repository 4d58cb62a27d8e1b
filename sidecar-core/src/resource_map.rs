use std::collections::{HashMap, HashSet};

use eyre::bail;
use serde::{Deserialize, Serialize};

use crate::Labels;

/// Destination labels produced by a successful [`ResourceMap::translate`].
pub type TranslatedLabels = HashMap<String, String>;

/// How a single source label turns into a monitored resource label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelTranslation {
    /// Renames the label, the value is kept verbatim.
    Constant(String),

    /// Produces the `zone` label out of the last path segment of a zone URL,
    /// e.g. `https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a`
    /// becomes `us-central1-a`. Values without a usable segment are kept as is.
    ZoneFromUrl,
}

const ZONE: &str = "zone";

impl LabelTranslation {
    pub fn constant(name: impl AsRef<str>) -> Self {
        LabelTranslation::Constant(name.as_ref().to_string())
    }

    /// Destination label name.
    pub fn name(&self) -> &str {
        match self {
            LabelTranslation::Constant(name) => name.as_str(),
            LabelTranslation::ZoneFromUrl => ZONE,
        }
    }

    pub fn apply<'a>(&'a self, value: &str) -> (&'a str, String) {
        match self {
            LabelTranslation::Constant(name) => (name.as_str(), value.to_string()),
            LabelTranslation::ZoneFromUrl => (ZONE, last_segment(value).to_string()),
        }
    }
}

/// Text after the last `/`, or the whole value when that text would be empty.
fn last_segment(value: &str) -> &str {
    match value.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => segment,
        _ => value,
    }
}

/// Describes which target labels identify a monitored resource type and how
/// they are renamed. Every declared source label is required.
#[derive(Clone, Debug)]
pub struct ResourceMap {
    r#type: String,
    label_map: HashMap<String, LabelTranslation>,
}

impl ResourceMap {
    pub fn builder(r#type: impl AsRef<str>) -> ResourceMapBuilder {
        ResourceMapBuilder {
            r#type: r#type.as_ref().to_string(),
            labels: Vec::new(),
        }
    }

    pub fn new<I, S>(r#type: impl AsRef<str>, labels: I) -> eyre::Result<Self>
    where
        I: IntoIterator<Item = (S, LabelTranslation)>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .fold(Self::builder(r#type), |builder, (source, translation)| {
                builder.label(source, translation)
            })
            .build()
    }

    pub fn r#type(&self) -> &str {
        self.r#type.as_str()
    }

    pub fn label_map(&self) -> &HashMap<String, LabelTranslation> {
        &self.label_map
    }

    /// Returns `None` as soon as one declared source label is missing from
    /// `target`. Target labels the map doesn't declare are dropped.
    pub fn translate(&self, target: &Labels) -> Option<TranslatedLabels> {
        let mut translated = HashMap::with_capacity(self.label_map.len());

        for (source, translation) in self.label_map.iter() {
            let (name, value) = translation.apply(target.get(source.as_str())?);
            translated.insert(name.to_string(), value);
        }

        Some(translated)
    }
}

pub struct ResourceMapBuilder {
    r#type: String,
    labels: Vec<(String, LabelTranslation)>,
}

impl ResourceMapBuilder {
    pub fn label(mut self, source: impl AsRef<str>, translation: LabelTranslation) -> Self {
        self.labels.push((source.as_ref().to_string(), translation));
        self
    }

    pub fn constant(self, source: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        self.label(source, LabelTranslation::constant(name))
    }

    pub fn build(self) -> eyre::Result<ResourceMap> {
        if self.r#type.is_empty() {
            bail!("Resource map type can't be empty")
        }

        if self.labels.is_empty() {
            bail!("Resource map '{}' doesn't declare any label", self.r#type)
        }

        let mut destinations = HashSet::with_capacity(self.labels.len());
        let mut label_map = HashMap::with_capacity(self.labels.len());

        for (source, translation) in self.labels {
            if translation.name().is_empty() {
                bail!(
                    "Resource map '{}': label '{}' translates to an empty label name",
                    self.r#type,
                    source
                )
            }

            if !destinations.insert(translation.name().to_string()) {
                bail!(
                    "Resource map '{}': label '{}' is produced more than once",
                    self.r#type,
                    translation.name()
                )
            }

            if label_map.contains_key(source.as_str()) {
                bail!(
                    "Resource map '{}': source label '{}' is declared more than once",
                    self.r#type,
                    source
                )
            }

            label_map.insert(source, translation);
        }

        Ok(ResourceMap {
            r#type: self.r#type,
            label_map,
        })
    }
}
