//! Resolve a map click to a single geographic feature.
//!
//! The [`Coordinator`] turns a click into concurrent WMS GetFeatureInfo
//! queries (one per candidate layer), keeps the first hit, falls back to WFS
//! spatial lookups, and publishes exactly one result per click. The
//! [`LayerCatalogClient`] lists ZWS tile layers for the layer selector.

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod scope;
pub mod transport;

pub use catalog::LayerCatalogClient;
pub use config::{BasicAuth, DiscoveryConfig};
pub use coordinator::{Click, ClickOutcome, Coordinator, DiscoveryListener, NoopListener, Notice};
pub use scope::CancellationScope;
pub use transport::{HttpResponse, ReqwestTransport, Transport};
