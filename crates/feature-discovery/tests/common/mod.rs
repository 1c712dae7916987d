//! Scripted transport for driving the coordinator and catalog client.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use feature_discovery::{DiscoveryConfig, DiscoveryListener, HttpResponse, Notice, Transport};
use ogc_common::{
    BoundingBox, CrsCode, DiscoveryError, DiscoveryResult, FoundFeature, ViewSnapshot,
};
use ogc_protocol::Query;
use test_utils::fixtures::views;

type Matcher = Box<dyn Fn(&Query) -> bool + Send + Sync>;

enum Reply {
    Response(HttpResponse),
    Error(DiscoveryError),
}

struct Route {
    matcher: Matcher,
    reply: Reply,
    delay: Duration,
}

/// Answers queries from a list of routes; the first matching route wins and
/// unmatched queries get a 404. Every query is recorded with its token.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Vec<Route>,
    seen: Mutex<Vec<Query>>,
    completed: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<M>(self, matcher: M, response: HttpResponse) -> Self
    where
        M: Fn(&Query) -> bool + Send + Sync + 'static,
    {
        self.on_delayed(matcher, response, Duration::ZERO)
    }

    pub fn on_delayed<M>(mut self, matcher: M, response: HttpResponse, delay: Duration) -> Self
    where
        M: Fn(&Query) -> bool + Send + Sync + 'static,
    {
        self.routes.push(Route {
            matcher: Box::new(matcher),
            reply: Reply::Response(response),
            delay,
        });
        self
    }

    pub fn on_error<M>(mut self, matcher: M, error: DiscoveryError) -> Self
    where
        M: Fn(&Query) -> bool + Send + Sync + 'static,
    {
        self.routes.push(Route {
            matcher: Box::new(matcher),
            reply: Reply::Error(error),
            delay: Duration::ZERO,
        });
        self
    }

    /// Every query executed so far, in arrival order.
    pub fn queries(&self) -> Vec<Query> {
        self.seen.lock().unwrap().clone()
    }

    /// URLs of queries that ran to completion.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    /// GetFeatureInfo queries sent for `layer`.
    pub fn feature_info_queries(&self, layer: &str) -> Vec<Query> {
        self.queries()
            .into_iter()
            .filter(|q| feature_info_for(layer)(q))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, query: &Query) -> DiscoveryResult<HttpResponse> {
        self.seen.lock().unwrap().push(query.clone());

        let Some(route) = self.routes.iter().find(|r| (r.matcher)(query)) else {
            return Ok(HttpResponse {
                status: 404,
                content_type: None,
                body: String::new(),
            });
        };

        if query.cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }
        if !route.delay.is_zero() {
            tokio::select! {
                _ = query.cancel.cancelled() => return Err(DiscoveryError::Cancelled),
                _ = tokio::time::sleep(route.delay) => {}
            }
        }

        self.completed.lock().unwrap().push(query.url.to_string());
        match &route.reply {
            Reply::Response(response) => Ok(response.clone()),
            Reply::Error(error) => Err(error.clone()),
        }
    }
}

/// Records everything the coordinator publishes.
#[derive(Default)]
pub struct RecordingListener {
    pub progress: Mutex<Vec<bool>>,
    pub results: Mutex<Vec<Option<FoundFeature>>>,
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingListener {
    pub fn results(&self) -> Vec<Option<FoundFeature>> {
        self.results.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<bool> {
        self.progress.lock().unwrap().clone()
    }
}

impl DiscoveryListener for RecordingListener {
    fn on_progress(&self, in_progress: bool) {
        self.progress.lock().unwrap().push(in_progress);
    }

    fn on_result(&self, feature: Option<&FoundFeature>) {
        self.results.lock().unwrap().push(feature.cloned());
    }

    fn on_notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn feature_info_for(layer: &str) -> impl Fn(&Query) -> bool + Send + Sync + 'static {
    let layer = layer.to_string();
    move |q| {
        q.param("REQUEST").as_deref() == Some("GetFeatureInfo")
            && q.param("QUERY_LAYERS").as_deref() == Some(layer.as_str())
    }
}

pub fn spatial_for(layer: &str) -> impl Fn(&Query) -> bool + Send + Sync + 'static {
    let layer = layer.to_string();
    move |q| {
        q.param("request").as_deref() == Some("GetFeature")
            && q.param("typeName").as_deref() == Some(layer.as_str())
            && q.param("bbox").is_some()
    }
}

pub fn by_id(fid: &str) -> impl Fn(&Query) -> bool + Send + Sync + 'static {
    let fid = fid.to_string();
    move |q| q.param("featureId").as_deref() == Some(fid.as_str())
}

pub fn gml(body: &str) -> HttpResponse {
    HttpResponse::ok("application/vnd.ogc.gml", body)
}

/// Feature collection with a single attribute-only feature.
pub fn feature_gml(typename: &str, fid: &str, name: &str) -> String {
    format!(
        r#"<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs" xmlns:gml="http://www.opengis.net/gml" xmlns:t="http://test">
  <gml:featureMember>
    <{typename} gml:id="{fid}" xmlns:{prefix}="http://test/{prefix}">
      <t:name>{name}</t:name>
    </{typename}>
  </gml:featureMember>
</wfs:FeatureCollection>"#,
        prefix = typename.split(':').next().unwrap_or("t"),
    )
}

pub fn geographic_view() -> ViewSnapshot {
    let (min_x, min_y, max_x, max_y) = views::GEOGRAPHIC_BBOX;
    ViewSnapshot::new(
        views::SIZE.0,
        views::SIZE.1,
        BoundingBox::new(min_x, min_y, max_x, max_y),
        CrsCode::Epsg4326,
    )
}

pub fn config() -> DiscoveryConfig {
    DiscoveryConfig {
        wms_url: "http://gis.local/ws".to_string(),
        wfs_url: "http://gis.local/ws".to_string(),
        zws_url: "http://gis.local/zws".to_string(),
        enrich_with_wfs: false,
        ..Default::default()
    }
}

pub fn shared(transport: ScriptedTransport) -> Arc<ScriptedTransport> {
    Arc::new(transport)
}
