//! Click-to-feature resolution.
//!
//! A click fans out one GetFeatureInfo query per candidate layer. The first
//! layer to answer with a feature wins and the rest are cancelled. When no
//! layer answers with a feature, WFS spatial queries are tried one layer at a
//! time. A newer click (or [`Coordinator::clear`]) cancels everything still in
//! flight for the previous one, and only the newest click may publish.

use std::fmt;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use ogc_common::{
    DiscoveryError, DiscoveryResult, FoundFeature, MapPoint, ParsedFeature, Severity,
    ViewSnapshot,
};
use ogc_protocol::{
    build_feature_by_id_query, build_feature_info_query, build_spatial_query,
    parse_feature_response, Query, SpatialTolerance,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::DiscoveryConfig;
use crate::scope::CancellationScope;
use crate::transport::Transport;

/// One user click: where, on which view, and which layers to ask.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub view: ViewSnapshot,
    pub point: MapPoint,
    /// Candidate layers in priority order. Empty means the configured defaults.
    pub layers: Vec<String>,
}

impl Click {
    pub fn new(view: ViewSnapshot, point: MapPoint) -> Self {
        Self {
            view,
            point,
            layers: Vec::new(),
        }
    }

    /// Click at a container pixel offset of `view`.
    pub fn at_pixel(view: ViewSnapshot, px: f64, py: f64) -> Self {
        Self::new(view, view.point_at(px, py))
    }

    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }
}

/// How a click ended, from the caller's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Published to the result slot. `None` means nothing was found.
    Resolved(Option<FoundFeature>),
    /// Published as a failure; the slot is empty.
    Failed(DiscoveryError),
    /// A newer click or a clear took over; nothing was published.
    Superseded,
}

/// User-facing message for a settled click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Found { typename: String },
    NothingFound,
    Error { message: String },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::Error { .. } => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Found { typename } => write!(f, "Found {typename}"),
            Notice::NothingFound => f.write_str("Nothing found"),
            Notice::Error { message } => f.write_str(message),
        }
    }
}

/// Observer of the result slot.
///
/// Called with the coordinator's state locked, so calls arrive in click order
/// and must not block.
pub trait DiscoveryListener: Send + Sync {
    fn on_progress(&self, _in_progress: bool) {}
    fn on_result(&self, _feature: Option<&FoundFeature>) {}
    fn on_notice(&self, _notice: &Notice) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl DiscoveryListener for NoopListener {}

#[derive(Default)]
struct SlotState {
    generation: u64,
    active: Option<CancellationToken>,
    found: Option<FoundFeature>,
    in_progress: bool,
}

enum RaceOutcome {
    Hit { index: usize, feature: ParsedFeature },
    Miss(Miss),
}

/// What the requests that produced no feature left behind.
#[derive(Default)]
struct Miss {
    /// Error from the last GetFeatureInfo to settle, cleared by a clean empty reply.
    last_error: Option<DiscoveryError>,
    /// Some WMS or WFS request got a well-formed empty answer.
    answered: bool,
}

impl Miss {
    fn into_error(self) -> DiscoveryError {
        match self.last_error {
            Some(e @ DiscoveryError::ServiceException(_)) => e,
            Some(e @ DiscoveryError::Transport { .. }) if !self.answered => e,
            _ => DiscoveryError::NotFound,
        }
    }
}

type LayerReply = (usize, DiscoveryResult<Option<ParsedFeature>>);

/// Owns the result slot and resolves clicks against WMS and WFS.
pub struct Coordinator<T> {
    transport: Arc<T>,
    wms: Url,
    wfs: Url,
    feature_count: u32,
    tolerance: SpatialTolerance,
    enrich_with_wfs: bool,
    default_layers: Vec<String>,
    listener: Arc<dyn DiscoveryListener>,
    state: Mutex<SlotState>,
}

impl<T: Transport> Coordinator<T> {
    pub fn new(transport: Arc<T>, config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            wms: config.wms_endpoint()?,
            wfs: config.wfs_endpoint()?,
            feature_count: config.feature_count,
            tolerance: config.spatial_tolerance,
            enrich_with_wfs: config.enrich_with_wfs,
            default_layers: config.default_layers.clone(),
            listener: Arc::new(NoopListener),
            state: Mutex::new(SlotState::default()),
        })
    }

    pub fn with_listener(mut self, listener: Arc<dyn DiscoveryListener>) -> Self {
        self.listener = listener;
        self
    }

    /// The feature currently in the result slot.
    pub async fn current(&self) -> Option<FoundFeature> {
        self.state.lock().await.found.clone()
    }

    pub async fn is_in_progress(&self) -> bool {
        self.state.lock().await.in_progress
    }

    /// Cancel any click in flight and empty the slot.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        if let Some(active) = state.active.take() {
            active.cancel();
        }
        state.generation += 1;
        state.found = None;
        if state.in_progress {
            state.in_progress = false;
            self.listener.on_progress(false);
        }
        self.listener.on_result(None);
    }

    /// Resolve a click and publish the result, unless a newer click or a
    /// clear arrives first.
    #[instrument(skip(self, click), fields(crs = %click.view.crs, x = click.point.x, y = click.point.y))]
    pub async fn click(&self, click: Click) -> ClickOutcome {
        let scope = CancellationScope::new();
        let generation = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.active.replace(scope.token()) {
                debug!("Cancelling previous click");
                previous.cancel();
            }
            state.generation += 1;
            state.found = None;
            state.in_progress = true;
            self.listener.on_progress(true);
            state.generation
        };

        let result = scope
            .run(self.resolve(&click, &scope))
            .await
            .and_then(|resolved| resolved);

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Click superseded, discarding result");
            return ClickOutcome::Superseded;
        }
        state.active = None;
        state.in_progress = false;

        let outcome = match result {
            Ok(found) => {
                state.found = Some(found.clone());
                self.listener.on_result(Some(&found));
                self.listener.on_notice(&Notice::Found {
                    typename: found.typename.clone(),
                });
                ClickOutcome::Resolved(Some(found))
            }
            Err(DiscoveryError::NotFound) => {
                debug!("Nothing found");
                state.found = None;
                self.listener.on_result(None);
                self.listener.on_notice(&Notice::NothingFound);
                ClickOutcome::Resolved(None)
            }
            Err(e) => {
                warn!(error = %e, "Feature discovery failed");
                state.found = None;
                self.listener.on_result(None);
                self.listener.on_notice(&Notice::Error {
                    message: e.to_string(),
                });
                ClickOutcome::Failed(e)
            }
        };
        self.listener.on_progress(false);
        outcome
    }

    async fn resolve(
        &self,
        click: &Click,
        scope: &CancellationScope,
    ) -> DiscoveryResult<FoundFeature> {
        if !click.view.is_valid() {
            return Err(DiscoveryError::Config(
                "map view has no visible extent".to_string(),
            ));
        }
        let layers = if click.layers.is_empty() {
            &self.default_layers
        } else {
            &click.layers
        };
        if layers.is_empty() {
            return Err(DiscoveryError::Config(
                "no candidate layers to query".to_string(),
            ));
        }

        let coordinate = click.point.to_lon_lat();

        match self.race_feature_info(click, layers, scope).await {
            RaceOutcome::Hit { index, feature } => {
                info!(layer = %layers[index], typename = %feature.typename, "Feature found");
                let mut found = FoundFeature::from_parsed(feature, coordinate);
                if self.enrich_with_wfs {
                    self.enrich(&mut found, scope).await;
                }
                Ok(found)
            }
            RaceOutcome::Miss(mut miss) => {
                let point = click.point.to_crs(click.view.crs);
                if let Some(feature) = self.spatial_fallback(point, layers, scope, &mut miss).await
                {
                    info!(typename = %feature.typename, "Feature found by spatial query");
                    return Ok(FoundFeature::from_parsed(feature, coordinate));
                }
                Err(miss.into_error())
            }
        }
    }

    /// One GetFeatureInfo per layer, concurrently. The first hit cancels the
    /// rest; hits that settled in the same poll go to the lowest layer index.
    async fn race_feature_info(
        &self,
        click: &Click,
        layers: &[String],
        scope: &CancellationScope,
    ) -> RaceOutcome {
        let race = scope.child();
        let pixel = click.view.pixel_of(click.point);

        let mut pending: FuturesUnordered<_> = layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                let query = build_feature_info_query(
                    &self.wms,
                    &click.view,
                    pixel,
                    std::slice::from_ref(layer),
                    self.feature_count,
                )
                .with_cancel(race.token());
                async move { (index, self.query_feature(&query).await) }
            })
            .collect();

        let mut miss = Miss::default();
        while let Some((index, reply)) = pending.next().await {
            match reply {
                Ok(Some(feature)) => {
                    let (index, feature) = lowest_ready_hit(&mut pending, index, feature);
                    race.cancel();
                    return RaceOutcome::Hit { index, feature };
                }
                Ok(None) => {
                    debug!(layer = %layers[index], "No feature on layer");
                    miss.last_error = None;
                    miss.answered = true;
                }
                Err(e) => {
                    warn!(layer = %layers[index], error = %e, "GetFeatureInfo failed");
                    miss.last_error = Some(e);
                }
            }
        }
        RaceOutcome::Miss(miss)
    }

    /// WFS GetFeature around the click, one layer at a time, keeping the first
    /// feature that carries geometry.
    async fn spatial_fallback(
        &self,
        point: MapPoint,
        layers: &[String],
        scope: &CancellationScope,
        miss: &mut Miss,
    ) -> Option<ParsedFeature> {
        for layer in layers {
            let query = build_spatial_query(&self.wfs, point, layer, &self.tolerance)
                .with_cancel(scope.token());
            match self.query_feature(&query).await {
                Ok(Some(feature)) if feature.has_geometry() => return Some(feature),
                Ok(Some(_)) => {
                    debug!(layer = %layer, "Spatial match has no geometry");
                    miss.answered = true;
                }
                Ok(None) => {
                    debug!(layer = %layer, "No spatial match");
                    miss.answered = true;
                }
                Err(e) => warn!(layer = %layer, error = %e, "GetFeature failed"),
            }
        }
        None
    }

    /// Attach WFS geometry to a WMS hit that came back without any.
    async fn enrich(&self, found: &mut FoundFeature, scope: &CancellationScope) {
        if found.geojson.is_some() {
            return;
        }
        let Some(fid) = found.fid.as_deref() else {
            return;
        };

        let query = build_feature_by_id_query(&self.wfs, &found.typename, fid)
            .with_cancel(scope.token());
        match self.query_feature(&query).await {
            Ok(Some(feature)) if feature.has_geometry() => {
                debug!(fid, "Geometry attached from WFS");
                found.geojson = feature.geojson;
            }
            Ok(_) => debug!(fid, "WFS returned no geometry"),
            Err(e) => warn!(fid, error = %e, "WFS lookup by id failed"),
        }
    }

    async fn query_feature(&self, query: &Query) -> DiscoveryResult<Option<ParsedFeature>> {
        let response = self.transport.execute(query).await?;
        if !response.is_success() {
            // An exception report outranks the status it arrived with.
            if let Err(e @ DiscoveryError::ServiceException(_)) =
                parse_feature_response(response.content_type.as_deref(), &response.body)
            {
                return Err(e);
            }
            return Err(DiscoveryError::http_status(response.status));
        }
        parse_feature_response(response.content_type.as_deref(), &response.body)
    }
}

/// Take every reply that is already complete and keep the hit with the lowest
/// layer index.
fn lowest_ready_hit<S>(
    pending: &mut S,
    index: usize,
    feature: ParsedFeature,
) -> (usize, ParsedFeature)
where
    S: Stream<Item = LayerReply> + Unpin,
{
    let mut best = (index, feature);
    while let Some(Some((index, reply))) = pending.next().now_or_never() {
        if let Ok(Some(feature)) = reply {
            if index < best.0 {
                best = (index, feature);
            }
        }
    }
    best
}
