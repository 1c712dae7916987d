//! ZWS layer catalog client.

use std::sync::Arc;

use ogc_common::{DiscoveryError, DiscoveryResult, LayerDescriptor};
use ogc_protocol::{build_layer_list_query, parse_layer_list, LayerListStrategy};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::DiscoveryConfig;
use crate::transport::Transport;

/// Lists the tile layers a ZWS server offers.
///
/// Each request strategy is tried in order until one yields a non-empty
/// list. Failures never reach the caller; when every strategy fails the
/// configured fallback layer is returned on its own.
pub struct LayerCatalogClient<T> {
    transport: Arc<T>,
    endpoint: Url,
    fallback: LayerDescriptor,
}

impl<T: Transport> LayerCatalogClient<T> {
    pub fn new(transport: Arc<T>, endpoint: Url, fallback: LayerDescriptor) -> Self {
        Self {
            transport,
            endpoint,
            fallback,
        }
    }

    pub fn from_config(transport: Arc<T>, config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        Ok(Self::new(
            transport,
            config.zws_endpoint()?,
            config.fallback_layer.clone(),
        ))
    }

    /// Fetch the layer list. Never empty.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch_layers(&self) -> Vec<LayerDescriptor> {
        for strategy in LayerListStrategy::ALL {
            match self.try_strategy(strategy).await {
                Ok(layers) => {
                    info!(
                        strategy = strategy.name(),
                        count = layers.len(),
                        "Layer list loaded"
                    );
                    return layers;
                }
                Err(e) => debug!(strategy = strategy.name(), error = %e, "Layer list strategy failed"),
            }
        }

        warn!(
            fallback = %self.fallback.name,
            "All layer list strategies failed, using fallback layer"
        );
        vec![self.fallback.clone()]
    }

    async fn try_strategy(
        &self,
        strategy: LayerListStrategy,
    ) -> DiscoveryResult<Vec<LayerDescriptor>> {
        let query = build_layer_list_query(&self.endpoint, strategy);
        let response = self.transport.execute(&query).await?.error_for_status()?;

        match parse_layer_list(&response.body) {
            Some(layers) if !layers.is_empty() => Ok(layers),
            Some(_) => Err(DiscoveryError::Parse("layer list is empty".to_string())),
            None => Err(DiscoveryError::Parse(
                "response is not a layer list".to_string(),
            )),
        }
    }
}
