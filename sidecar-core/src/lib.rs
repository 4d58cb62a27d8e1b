mod labels;
mod resource_map;

pub use labels::Labels;
pub use resource_map::{LabelTranslation, ResourceMap, ResourceMapBuilder, TranslatedLabels};
