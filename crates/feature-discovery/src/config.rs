//! Endpoint and query configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config.
//!
//! ```yaml
//! wms_url: http://maps.example.org/ws
//! feature_count: 10
//! spatial_tolerance:
//!   projected: 5.0
//!   geographic: 0.00005
//! request_timeout_secs: 15
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use ogc_common::{DiscoveryError, DiscoveryResult, LayerDescriptor};
use ogc_protocol::SpatialTolerance;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// WMS endpoint for GetFeatureInfo
    pub wms_url: String,
    /// WFS endpoint for spatial and by-id GetFeature
    pub wfs_url: String,
    /// ZWS endpoint for the layer catalog
    pub zws_url: String,
    /// FEATURE_COUNT sent with every GetFeatureInfo
    pub feature_count: u32,
    pub spatial_tolerance: SpatialTolerance,
    /// Per-request timeout. None leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
    /// Fetch the WFS geometry of a WMS hit that came back without one
    pub enrich_with_wfs: bool,
    /// Candidate layers used when a click names none
    pub default_layers: Vec<String>,
    /// Single descriptor returned when every catalog strategy fails
    pub fallback_layer: LayerDescriptor,
    pub auth: Option<BasicAuth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            wms_url: "http://localhost:6473/ws".to_string(),
            wfs_url: "http://localhost:6473/ws".to_string(),
            zws_url: "http://localhost:6473/zws".to_string(),
            feature_count: 10,
            spatial_tolerance: SpatialTolerance::default(),
            request_timeout_secs: None,
            enrich_with_wfs: true,
            default_layers: vec![
                "openlayers:teploset".to_string(),
                "mo:thermo".to_string(),
                "mo:vp".to_string(),
            ],
            fallback_layer: LayerDescriptor::default(),
            auth: None,
        }
    }
}

impl DiscoveryConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded discovery config");
        Ok(config)
    }

    pub fn validate(&self) -> DiscoveryResult<()> {
        self.wms_endpoint()?;
        self.wfs_endpoint()?;
        self.zws_endpoint()?;

        if self.feature_count == 0 {
            return Err(DiscoveryError::Config(
                "feature_count must be at least 1".to_string(),
            ));
        }
        let tolerance = &self.spatial_tolerance;
        if !(tolerance.projected > 0.0 && tolerance.geographic > 0.0) {
            return Err(DiscoveryError::Config(
                "spatial_tolerance values must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(DiscoveryError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.fallback_layer.name.is_empty() {
            return Err(DiscoveryError::Config(
                "fallback_layer.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn wms_endpoint(&self) -> DiscoveryResult<Url> {
        parse_endpoint("wms_url", &self.wms_url)
    }

    pub fn wfs_endpoint(&self) -> DiscoveryResult<Url> {
        parse_endpoint("wfs_url", &self.wfs_url)
    }

    pub fn zws_endpoint(&self) -> DiscoveryResult<Url> {
        parse_endpoint("zws_url", &self.zws_url)
    }
}

fn parse_endpoint(field: &str, value: &str) -> DiscoveryResult<Url> {
    let url = Url::parse(value)
        .map_err(|e| DiscoveryError::Config(format!("{field} '{value}' is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DiscoveryError::Config(format!(
            "{field} has unsupported scheme '{other}'"
        ))),
    }
}
