use std::{
    fmt::{self, Write},
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{response::Html, routing::get, Extension, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use sidecar_core::LabelTranslation;
use sidecar_google::Catalog;

#[derive(Clone, Debug, Default)]
pub struct StatusOptions {
    pub(crate) project_id: Option<String>,
    pub(crate) cluster_location: Option<String>,
    pub(crate) cluster_name: Option<String>,
    pub(crate) config: String,
}

impl StatusOptions {
    pub fn project_id(self, project_id: Option<String>) -> Self {
        Self { project_id, ..self }
    }

    pub fn cluster_location(self, cluster_location: Option<String>) -> Self {
        Self {
            cluster_location,
            ..self
        }
    }

    pub fn cluster_name(self, cluster_name: Option<String>) -> Self {
        Self {
            cluster_name,
            ..self
        }
    }

    /// Configuration as displayed on the page, verbatim.
    pub fn config(self, config: impl AsRef<str>) -> Self {
        Self {
            config: config.as_ref().to_string(),
            ..self
        }
    }
}

/// Diagnostic page served on `/statusz`.
pub struct StatusPage {
    server_name: String,
    started: DateTime<Utc>,
    clock: Instant,
    options: StatusOptions,
    catalog: Arc<Catalog>,
}

impl StatusPage {
    pub fn new(options: StatusOptions, catalog: Arc<Catalog>) -> Self {
        let server_name = std::env::args()
            .next()
            .as_deref()
            .and_then(|arg| Path::new(arg).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

        Self {
            server_name,
            started: Utc::now(),
            clock: Instant::now(),
            options,
            catalog,
        }
    }

    pub fn snapshot(&self) -> StatusData {
        StatusData {
            server_name: self.server_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_context: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
            uname: uname(),
            fd_limits: std::fs::read_to_string("/proc/self/limits")
                .ok()
                .and_then(|limits| parse_fd_limits(limits.as_str()))
                .unwrap_or_else(|| "unknown".to_string()),
            start_time: self.started,
            uptime: self.clock.elapsed(),
            // Set through the Kubernetes downward API, absent outside a pod.
            pod_name: non_empty_var("POD_NAME"),
            node_name: non_empty_var("NODE_NAME"),
            namespace_name: non_empty_var("NAMESPACE_NAME"),
            project_id: self.options.project_id.clone(),
            cluster_location: self.options.cluster_location.clone(),
            cluster_name: self.options.cluster_name.clone(),
            config: self.options.config.clone(),
            resources: describe_catalog(self.catalog.as_ref()),
        }
    }
}

pub fn router(page: Arc<StatusPage>) -> Router {
    Router::new()
        .route("/statusz", get(statusz))
        .layer(Extension(page))
}

async fn statusz(Extension(page): Extension<Arc<StatusPage>>) -> Html<String> {
    Html(render(&page.snapshot()))
}

/// Everything the page shows, captured at request time.
#[derive(Clone, Debug)]
pub struct StatusData {
    pub server_name: String,
    pub version: String,
    pub build_context: String,
    pub uname: String,
    pub fd_limits: String,
    pub start_time: DateTime<Utc>,
    pub uptime: Duration,
    pub pod_name: Option<String>,
    pub node_name: Option<String>,
    pub namespace_name: Option<String>,
    pub project_id: Option<String>,
    pub cluster_location: Option<String>,
    pub cluster_name: Option<String>,
    pub config: String,
    pub resources: Vec<ResourceDescription>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDescription {
    pub r#type: String,
    /// (source label, destination label, rule) sorted by source label.
    pub labels: Vec<(String, String, &'static str)>,
}

fn describe_catalog(catalog: &Catalog) -> Vec<ResourceDescription> {
    catalog
        .iter()
        .map(|map| {
            let mut labels = map
                .label_map()
                .iter()
                .map(|(source, translation)| {
                    let rule = match translation {
                        LabelTranslation::Constant(_) => "constant",
                        LabelTranslation::ZoneFromUrl => "zone from URL",
                    };

                    (source.clone(), translation.name().to_string(), rule)
                })
                .collect::<Vec<_>>();

            labels.sort();

            ResourceDescription {
                r#type: map.r#type().to_string(),
                labels,
            }
        })
        .collect()
}

pub fn render(data: &StatusData) -> String {
    let mut html = String::with_capacity(4_096);

    // Writing into a String never fails.
    let _ = write_page(&mut html, data);

    html
}

fn write_page(html: &mut String, data: &StatusData) -> fmt::Result {
    let server_name = escape(&data.server_name);

    writeln!(html, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(html, "<title>Status for {}</title>", server_name)?;
    writeln!(html, "</head>\n<body>")?;
    writeln!(html, "<h1>Status for {}</h1>", server_name)?;

    writeln!(html, "<table>")?;
    row(html, "Version", &data.version)?;
    row(html, "Build context", &data.build_context)?;
    row(html, "Host details", &data.uname)?;
    row(html, "FD limits", &data.fd_limits)?;
    row(
        html,
        "Started",
        &data.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;
    row(html, "Uptime", &format_uptime(data.uptime))?;
    optional_row(html, "Pod", data.pod_name.as_deref())?;
    optional_row(html, "Node", data.node_name.as_deref())?;
    optional_row(html, "Namespace", data.namespace_name.as_deref())?;
    writeln!(html, "</table>")?;

    writeln!(html, "<h2>GKE</h2>\n<table>")?;
    optional_row(html, "Project ID", data.project_id.as_deref())?;
    optional_row(html, "Cluster location", data.cluster_location.as_deref())?;
    optional_row(html, "Cluster name", data.cluster_name.as_deref())?;
    writeln!(html, "</table>")?;

    writeln!(html, "<h2>Monitored resources</h2>")?;
    for resource in data.resources.iter() {
        writeln!(html, "<h3>{}</h3>\n<table>", escape(&resource.r#type))?;
        writeln!(
            html,
            "<tr><th>Target label</th><th>Resource label</th><th>Rule</th></tr>"
        )?;

        for (source, destination, rule) in resource.labels.iter() {
            writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(source),
                escape(destination),
                rule
            )?;
        }

        writeln!(html, "</table>")?;
    }

    writeln!(html, "<h2>Configuration</h2>")?;
    writeln!(html, "<pre>{}</pre>", escape(&data.config))?;
    writeln!(html, "</body>\n</html>")
}

fn row(html: &mut String, name: &str, value: &str) -> fmt::Result {
    writeln!(html, "<tr><th>{}</th><td>{}</td></tr>", name, escape(value))
}

fn optional_row(html: &mut String, name: &str, value: Option<&str>) -> fmt::Result {
    match value {
        Some(value) => row(html, name, value),
        None => Ok(()),
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (days, hours, mins, secs) = (
        secs / 86_400,
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60,
    );

    if days > 0 {
        format!("{}d{}h{}m{}s", days, hours, mins, secs)
    } else if hours > 0 {
        format!("{}h{}m{}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m{}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn uname() -> String {
    let hostname = std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| non_empty_var("HOSTNAME"))
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "{} {} {}",
        std::env::consts::OS,
        hostname,
        std::env::consts::ARCH
    )
}

/// Extracts the open files limits out of a `/proc/<pid>/limits` listing.
fn parse_fd_limits(limits: &str) -> Option<String> {
    let line = limits.lines().find(|l| l.starts_with("Max open files"))?;
    let mut values = line["Max open files".len()..].split_whitespace();
    let soft = values.next()?;
    let hard = values.next()?;

    Some(format!("soft={}, hard={}", soft, hard))
}
