//! Feature Probe
//!
//! Resolves a map click against live WMS/WFS endpoints, or lists the layers
//! a ZWS server offers, and prints the result as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use feature_discovery::{
    Click, ClickOutcome, Coordinator, DiscoveryConfig, DiscoveryListener, LayerCatalogClient,
    Notice, ReqwestTransport,
};
use ogc_common::{BoundingBox, CrsCode, MapPoint, Severity, ViewSnapshot};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "feature-probe")]
#[command(about = "Probe WMS/WFS feature discovery and the ZWS layer catalog")]
struct Args {
    /// YAML config file; defaults apply when absent
    #[arg(short, long, env = "FEATURE_PROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the WMS endpoint
    #[arg(long, env = "FEATURE_PROBE_WMS_URL")]
    wms_url: Option<String>,

    /// Override the WFS endpoint
    #[arg(long, env = "FEATURE_PROBE_WFS_URL")]
    wfs_url: Option<String>,

    /// Override the ZWS endpoint
    #[arg(long, env = "FEATURE_PROBE_ZWS_URL")]
    zws_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the layers offered by the ZWS catalog
    Layers,

    /// Resolve a click to a feature
    Pick {
        /// Visible extent as minx,miny,maxx,maxy
        #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
        bbox: BoundingBox,

        /// CRS of the extent and of --at
        #[arg(long, default_value = "EPSG:4326")]
        crs: CrsCode,

        /// Map width in pixels
        #[arg(long, default_value = "1024")]
        width: u32,

        /// Map height in pixels
        #[arg(long, default_value = "768")]
        height: u32,

        /// Clicked map coordinate as x,y
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true, conflicts_with = "pixel")]
        at: Option<(f64, f64)>,

        /// Clicked pixel offset as px,py; defaults to the map centre
        #[arg(long, value_parser = parse_pair)]
        pixel: Option<(f64, f64)>,

        /// Candidate layers in priority order; defaults to the configured list
        #[arg(long, value_delimiter = ',')]
        layers: Vec<String>,
    },
}

/// Logs every notice at a level matching its severity.
struct LogListener;

impl DiscoveryListener for LogListener {
    fn on_notice(&self, notice: &Notice) {
        match notice.severity() {
            Severity::Info => info!(%notice, "Discovery finished"),
            Severity::Error => warn!(%notice, "Discovery failed"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let config = load_config(&args)?;
    let transport = Arc::new(ReqwestTransport::new(&config)?);

    match args.command {
        Command::Layers => {
            let catalog = LayerCatalogClient::from_config(transport, &config)?;
            let layers = catalog.fetch_layers().await;
            println!("{}", serde_json::to_string_pretty(&layers)?);
        }
        Command::Pick {
            bbox,
            crs,
            width,
            height,
            at,
            pixel,
            layers,
        } => {
            let view = ViewSnapshot::new(width, height, bbox, crs);
            let click = build_click(view, at, pixel)?.with_layers(layers);

            let coordinator =
                Coordinator::new(transport, &config)?.with_listener(Arc::new(LogListener));
            match coordinator.click(click).await {
                ClickOutcome::Resolved(found) => {
                    println!("{}", serde_json::to_string_pretty(&found)?);
                }
                ClickOutcome::Failed(e) => return Err(anyhow!(e)),
                ClickOutcome::Superseded => bail!("click was superseded"),
            }
        }
    }

    Ok(())
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Args) -> Result<DiscoveryConfig> {
    let mut config = match &args.config {
        Some(path) => DiscoveryConfig::load(path)?,
        None => DiscoveryConfig::default(),
    };
    if let Some(url) = &args.wms_url {
        config.wms_url = url.clone();
    }
    if let Some(url) = &args.wfs_url {
        config.wfs_url = url.clone();
    }
    if let Some(url) = &args.zws_url {
        config.zws_url = url.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Place the click from `--at` or `--pixel`, falling back to the map centre.
fn build_click(
    view: ViewSnapshot,
    at: Option<(f64, f64)>,
    pixel: Option<(f64, f64)>,
) -> Result<Click> {
    if !view.is_valid() {
        bail!("--bbox and map size must describe a non-empty view");
    }
    let click = match (at, pixel) {
        (Some((x, y)), _) => {
            if !view.bbox.contains_point(x, y) {
                bail!("--at {x},{y} lies outside --bbox {}", view.bbox.to_wms_string());
            }
            Click::new(view, MapPoint::new(x, y, view.crs))
        }
        (None, Some((px, py))) => Click::at_pixel(view, px, py),
        (None, None) => {
            let (px, py) = (f64::from(view.width) / 2.0, f64::from(view.height) / 2.0);
            Click::at_pixel(view, px, py)
        }
    };
    Ok(click)
}

fn parse_bbox(value: &str) -> Result<BoundingBox, String> {
    BoundingBox::from_wms_string(value).map_err(|e| e.to_string())
}

fn parse_pair(value: &str) -> Result<(f64, f64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{s}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}
