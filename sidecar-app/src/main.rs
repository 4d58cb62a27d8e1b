mod config;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use eyre::{bail, eyre, WrapErr};
use sidecar::{statusz, StatusPage, TargetResolver};
use sidecar_core::Labels;
use sidecar_google::Catalog;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(StructOpt, Debug)]
#[structopt(name = "sidecar", about = "Maps scrape targets to monitored resources")]
struct Args {
    /// Path to the TOML configuration file.
    #[structopt(long, global = true, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Serves the status page until interrupted.
    Serve,

    /// Prints the monitored resource of a target label set as JSON.
    Resolve {
        /// Target label, formatted as `name=value`. Can be repeated.
        #[structopt(long = "label", parse(try_from_str = parse_label))]
        labels: Vec<(String, String)>,
    },
}

fn parse_label(raw: &str) -> eyre::Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(eyre!("Expected a label formatted as 'name=value', got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::from_args();
    let config = match args.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let catalog = Arc::new(config.catalog()?);

    match args.command {
        Command::Serve => serve(config, catalog).await,
        Command::Resolve { labels } => resolve(config, catalog, labels),
    }
}

async fn serve(config: Config, catalog: Arc<Catalog>) -> eyre::Result<()> {
    let addr: SocketAddr = config
        .listen_address
        .parse()
        .wrap_err_with(|| format!("Invalid listen address '{}'", config.listen_address))?;

    for map in catalog.iter() {
        tracing::info!(
            target = "main-process",
            "Resource map '{}' loaded with {} labels",
            map.r#type(),
            map.label_map().len()
        );
    }

    let page = Arc::new(StatusPage::new(config.status_options()?, catalog));
    let server = axum::Server::try_bind(&addr)
        .wrap_err_with(|| format!("Error when binding {}", addr))?
        .serve(statusz::router(page).into_make_service());

    tracing::info!(target = "main-process", "Status page listening on {}", addr);

    server
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(target = "main-process", "Error when waiting for Ctrl-C: {}", e);
            }
        })
        .await
        .wrap_err("Status server exited unexpectedly")?;

    tracing::info!(target = "main-process", "Shutdown successfully");

    Ok(())
}

fn resolve(
    config: Config,
    catalog: Arc<Catalog>,
    labels: Vec<(String, String)>,
) -> eyre::Result<()> {
    let resolver = TargetResolver::new(catalog, config.resolver_options());
    let target = labels.into_iter().collect::<Labels>();

    let resource = match resolver.resolve(&target) {
        Some(resource) => resource,
        None => bail!("No resource map matched target {:?}", target),
    };

    let json =
        serde_json::to_string_pretty(&resource).wrap_err("Error when serializing resource")?;

    println!("{}", json);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_label;

    #[test]
    fn label_argument() {
        assert_eq!(
            parse_label("__meta_gce_zone=projects/p/zones/z").unwrap(),
            (
                "__meta_gce_zone".to_string(),
                "projects/p/zones/z".to_string()
            )
        );
        assert_eq!(
            parse_label("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_label("empty=").unwrap(), ("empty".to_string(), String::new()));
        assert!(parse_label("novalue").is_err());
        assert!(parse_label("=x").is_err());
    }
}
