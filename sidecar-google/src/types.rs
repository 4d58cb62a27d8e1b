use std::collections::HashMap;

use serde::Serialize;

/// What the monitoring backend considers the producer of a time series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonitoredResource {
    pub r#type: String,
    pub labels: HashMap<String, String>,
}
