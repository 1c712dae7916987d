//! Common types shared by the feature-discovery crates.
//!
//! Everything here is plain data: coordinates tagged with their CRS, the
//! visible map view, and the feature shapes produced by parsing OGC responses.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod feature;
pub mod layer;
pub mod mercator;
pub mod point;
pub mod view;

pub use bbox::{BboxParseError, BoundingBox};
pub use crs::{CrsCode, CrsParseError};
pub use error::{DiscoveryError, DiscoveryResult, Severity};
pub use feature::{point_feature, FoundFeature, ParsedFeature, Properties};
pub use layer::LayerDescriptor;
pub use point::MapPoint;
pub use view::ViewSnapshot;
