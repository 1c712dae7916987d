//! Click resolution against a scripted WMS/WFS.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use feature_discovery::{Click, ClickOutcome, Coordinator, DiscoveryConfig, HttpResponse, Notice};
use ogc_common::{mercator, BoundingBox, CrsCode, DiscoveryError, MapPoint, ViewSnapshot};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, responses};

const A: &str = "mo:a";
const B: &str = "mo:b";
const C: &str = "mo:c";

fn click() -> Click {
    Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A, B, C])
}

fn coordinator(
    transport: &Arc<ScriptedTransport>,
    config: &DiscoveryConfig,
) -> (Coordinator<ScriptedTransport>, Arc<RecordingListener>) {
    let listener = Arc::new(RecordingListener::default());
    let coordinator = Coordinator::new(transport.clone(), config)
        .unwrap()
        .with_listener(listener.clone());
    (coordinator, listener)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn test_first_hit_wins_and_cancels_the_rest() {
    let transport = shared(
        ScriptedTransport::new()
            .on_delayed(feature_info_for(A), gml(responses::EMPTY_COLLECTION), ms(50))
            .on_delayed(feature_info_for(B), gml(&feature_gml(B, "b.1", "Bee")), ms(10))
            .on_delayed(feature_info_for(C), gml(responses::EMPTY_COLLECTION), ms(100)),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator.click(click()).await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_eq!(found.typename, B);
    assert_eq!(found.fid.as_deref(), Some("b.1"));
    assert_eq!(found.props["name"], "Bee");
    assert_eq!(found.coordinate, [39.82, 64.55]);

    assert!(transport.feature_info_queries(A)[0].cancel.is_cancelled());
    assert!(transport.feature_info_queries(C)[0].cancel.is_cancelled());
    assert_eq!(transport.completed().len(), 1);
    // One GetFeatureInfo per layer and nothing else.
    assert_eq!(transport.queries().len(), 3);

    assert_eq!(coordinator.current().await, Some(found.clone()));
    assert!(!coordinator.is_in_progress().await);
    assert_eq!(listener.results(), vec![Some(found)]);
    assert_eq!(
        listener.notices(),
        vec![Notice::Found {
            typename: B.to_string()
        }]
    );
    assert_eq!(listener.progress(), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_first_responder_beats_layer_order() {
    let transport = shared(
        ScriptedTransport::new()
            .on_delayed(feature_info_for(A), gml(&feature_gml(A, "a.1", "Late")), ms(80))
            .on(feature_info_for(B), gml(responses::EMPTY_COLLECTION))
            .on(feature_info_for(C), gml(&feature_gml(C, "c.1", "Early"))),
    );
    let (coordinator, _) = coordinator(&transport, &config());

    let outcome = coordinator.click(click()).await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_eq!(found.typename, C);
    assert!(transport.feature_info_queries(A)[0].cancel.is_cancelled());
}

#[tokio::test]
async fn test_simultaneous_hits_go_to_lowest_index() {
    let transport = shared(
        ScriptedTransport::new()
            .on(feature_info_for(A), gml(&feature_gml(A, "a.1", "First")))
            .on(feature_info_for(B), gml(&feature_gml(B, "b.1", "Second")))
            .on(feature_info_for(C), gml(responses::EMPTY_COLLECTION)),
    );
    let (coordinator, _) = coordinator(&transport, &config());

    let outcome = coordinator.click(click()).await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_eq!(found.typename, A);
}

#[tokio::test]
async fn test_failing_layer_does_not_stop_the_race() {
    let transport = shared(
        ScriptedTransport::new()
            .on_error(feature_info_for(A), DiscoveryError::transport("connection reset"))
            .on(
                feature_info_for(B),
                HttpResponse {
                    status: 500,
                    content_type: None,
                    body: "Internal Server Error".to_string(),
                },
            )
            .on(feature_info_for(C), gml(&feature_gml(C, "c.9", "Valve"))),
    );
    let (coordinator, _) = coordinator(&transport, &config());

    let outcome = coordinator.click(click()).await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_eq!(found.fid.as_deref(), Some("c.9"));
}

#[tokio::test]
async fn test_spatial_fallback_walks_layers_in_order() {
    let transport = shared(
        ScriptedTransport::new()
            .on(feature_info_for(A), gml(responses::EMPTY_COLLECTION))
            .on(feature_info_for(B), gml(responses::EMPTY_COLLECTION))
            .on(feature_info_for(C), gml(responses::EMPTY_COLLECTION))
            .on(spatial_for(A), gml(responses::EMPTY_COLLECTION))
            // B has no route and answers 404.
            .on(spatial_for(C), gml(responses::WFS_POINT_GML2)),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator.click(click()).await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_eq!(found.typename, "mo:thermo");
    assert_eq!(found.fid.as_deref(), Some("thermo.5"));
    assert_eq!(found.props["title"], "Котельная");
    assert_eq!(found.coordinate, [39.82, 64.55]);
    let geojson = found.geojson.as_ref().expect("fallback result carries geometry");
    assert_eq!(geojson["geometry"]["coordinates"][0], 39.82);
    assert_eq!(geojson["geometry"]["coordinates"][1], 64.55);

    let spatial: Vec<_> = transport
        .queries()
        .into_iter()
        .filter(|q| q.param("request").as_deref() == Some("GetFeature"))
        .collect();
    let order: Vec<_> = spatial
        .iter()
        .map(|q| q.param("typeName").unwrap_or_default())
        .collect();
    assert_eq!(order, vec![A, B, C]);
    let bbox = spatial[0].param("bbox").unwrap();
    assert!(bbox.ends_with(",EPSG:4326"), "{bbox}");
    assert_eq!(spatial[0].param("maxFeatures").as_deref(), Some("1"));

    assert_eq!(
        listener.notices(),
        vec![Notice::Found {
            typename: "mo:thermo".to_string()
        }]
    );
}

#[tokio::test]
async fn test_spatial_match_without_geometry_is_skipped() {
    let transport = shared(
        ScriptedTransport::new()
            .on(feature_info_for(A), gml(responses::EMPTY_COLLECTION))
            .on(spatial_for(A), gml(&feature_gml(A, "a.2", "No geometry"))),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A]))
        .await;

    assert_eq!(outcome, ClickOutcome::Resolved(None));
    assert_eq!(listener.notices(), vec![Notice::NothingFound]);
    assert_eq!(listener.results(), vec![None]);
}

#[tokio::test(start_paused = true)]
async fn test_service_exception_from_last_candidate_is_reported() {
    let transport = shared(
        ScriptedTransport::new()
            .on(feature_info_for(A), gml(responses::EMPTY_COLLECTION))
            .on_delayed(
                feature_info_for(B),
                HttpResponse::ok("text/xml", responses::EXCEPTION_REPORT),
                ms(10),
            ),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A, B]))
        .await;

    let ClickOutcome::Failed(DiscoveryError::ServiceException(message)) = outcome else {
        panic!("expected a service exception, got {outcome:?}");
    };
    assert_eq!(message, "SRS EPSG:4326 is not supported by layer mo:thermo");
    assert_eq!(coordinator.current().await, None);

    let notices = listener.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0],
        Notice::Error {
            message: format!("WMS Error: {message}")
        }
    );
    assert_eq!(listener.results(), vec![None]);
}

#[tokio::test]
async fn test_service_exception_with_error_status_is_reported() {
    let transport = shared(ScriptedTransport::new().on(
        feature_info_for(A),
        HttpResponse {
            status: 500,
            content_type: Some("application/vnd.ogc.se_xml".to_string()),
            body: responses::EXCEPTION_REPORT.to_string(),
        },
    ));
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A]))
        .await;

    assert_eq!(
        outcome,
        ClickOutcome::Failed(DiscoveryError::ServiceException(
            "SRS EPSG:4326 is not supported by layer mo:thermo".to_string()
        ))
    );
    let notices = listener.notices();
    assert!(matches!(notices.as_slice(), [Notice::Error { .. }]), "{notices:?}");
}

#[tokio::test]
async fn test_unreachable_services_are_reported_as_failure() {
    let transport = shared(
        ScriptedTransport::new().on_error(|_| true, DiscoveryError::transport("connection refused")),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator.click(click()).await;

    assert_eq!(
        outcome,
        ClickOutcome::Failed(DiscoveryError::transport("connection refused"))
    );
    assert_eq!(
        listener.notices(),
        vec![Notice::Error {
            message: "Transport error: connection refused".to_string()
        }]
    );
    assert_eq!(listener.results(), vec![None]);
    assert_eq!(coordinator.current().await, None);
}

#[tokio::test]
async fn test_empty_answer_outranks_transport_errors() {
    let transport = shared(
        ScriptedTransport::new()
            .on(spatial_for(B), gml(responses::EMPTY_COLLECTION))
            .on_error(|_| true, DiscoveryError::transport("connection refused")),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator.click(click()).await;

    assert_eq!(outcome, ClickOutcome::Resolved(None));
    assert_eq!(listener.notices(), vec![Notice::NothingFound]);
}

#[tokio::test(start_paused = true)]
async fn test_earlier_service_exception_is_not_reported() {
    let transport = shared(
        ScriptedTransport::new()
            .on(
                feature_info_for(A),
                HttpResponse::ok("text/plain", responses::EXCEPTION_REPORT_BASE64),
            )
            .on_delayed(feature_info_for(B), gml(responses::EMPTY_COLLECTION), ms(10)),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let outcome = coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A, B]))
        .await;

    assert_eq!(outcome, ClickOutcome::Resolved(None));
    assert_eq!(listener.notices(), vec![Notice::NothingFound]);
}

#[tokio::test]
async fn test_mercator_click_is_published_as_lon_lat() {
    let (cx, cy) = mercator::forward(39.82, 64.55);
    let view = ViewSnapshot::new(
        1024,
        768,
        BoundingBox::new(cx - 2000.0, cy - 1500.0, cx + 2000.0, cy + 1500.0),
        CrsCode::Epsg3857,
    );
    let point = MapPoint::new(cx, cy, CrsCode::Epsg3857);
    let transport = shared(
        ScriptedTransport::new().on(feature_info_for(A), gml(&feature_gml(A, "a.1", "Pipe"))),
    );
    let (coordinator, _) = coordinator(&transport, &config());

    let outcome = coordinator
        .click(Click::new(view, point).with_layers([A]))
        .await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_coords_approx_eq!(
        (found.coordinate[0], found.coordinate[1]),
        (39.82, 64.55),
        1e-9
    );

    let query = &transport.queries()[0];
    assert_eq!(query.param("SRS").as_deref(), Some("EPSG:3857"));
    assert_eq!(query.param("X").as_deref(), Some("512"));
    assert_eq!(query.param("Y").as_deref(), Some("384"));
}

#[tokio::test(start_paused = true)]
async fn test_mercator_fallback_uses_projected_tolerance() {
    let (cx, cy) = mercator::forward(39.82, 64.55);
    let view = ViewSnapshot::new(
        800,
        600,
        BoundingBox::new(cx - 4000.0, cy - 3000.0, cx + 4000.0, cy + 3000.0),
        CrsCode::Epsg3857,
    );
    let transport = shared(
        ScriptedTransport::new()
            .on(feature_info_for(A), gml(responses::EMPTY_COLLECTION))
            .on(spatial_for(A), gml(responses::WFS_POINT_GML2)),
    );
    let (coordinator, _) = coordinator(&transport, &config());

    coordinator
        .click(Click::new(view, MapPoint::lon_lat(39.82, 64.55)).with_layers([A]))
        .await;

    let spatial = transport
        .queries()
        .into_iter()
        .find(|q| q.param("request").as_deref() == Some("GetFeature"))
        .unwrap();
    let bbox = spatial.param("bbox").unwrap();
    let parts: Vec<&str> = bbox.split(',').collect();
    assert_eq!(parts.len(), 5);
    assert_eq!(parts[4], "EPSG:3857");
    let min_x: f64 = parts[0].parse().unwrap();
    let max_x: f64 = parts[2].parse().unwrap();
    assert_approx_eq!(max_x - min_x, 10.0, 1e-6);
}

#[tokio::test(start_paused = true)]
async fn test_newer_click_supersedes_older() {
    const OLD: &str = "mo:old";
    const NEW: &str = "mo:new";
    let transport = shared(
        ScriptedTransport::new()
            .on_delayed(feature_info_for(OLD), gml(&feature_gml(OLD, "old.1", "Old")), ms(100))
            .on(feature_info_for(NEW), gml(&feature_gml(NEW, "new.1", "New"))),
    );
    let (coordinator, listener) = coordinator(&transport, &config());
    let point = MapPoint::lon_lat(39.82, 64.55);

    let (first, second) = tokio::join!(
        coordinator.click(Click::new(geographic_view(), point).with_layers([OLD])),
        async {
            tokio::time::sleep(ms(10)).await;
            coordinator
                .click(Click::new(geographic_view(), point).with_layers([NEW]))
                .await
        }
    );

    assert_eq!(first, ClickOutcome::Superseded);
    let ClickOutcome::Resolved(Some(found)) = second else {
        panic!("expected a feature, got {second:?}");
    };
    assert_eq!(found.typename, NEW);
    assert!(transport.feature_info_queries(OLD)[0].cancel.is_cancelled());

    // Give the stale request time it would have needed, then check the slot.
    tokio::time::sleep(ms(200)).await;
    assert_eq!(coordinator.current().await, Some(found.clone()));
    assert_eq!(listener.results(), vec![Some(found)]);
    assert_eq!(listener.progress(), vec![true, true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_clear_cancels_and_empties_slot() {
    let transport = shared(
        ScriptedTransport::new()
            .on_delayed(feature_info_for(A), gml(&feature_gml(A, "a.1", "Slow")), ms(100)),
    );
    let (coordinator, listener) = coordinator(&transport, &config());

    let (outcome, ()) = tokio::join!(
        coordinator.click(
            Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A])
        ),
        async {
            tokio::time::sleep(ms(10)).await;
            coordinator.clear().await;
        }
    );

    assert_eq!(outcome, ClickOutcome::Superseded);
    assert!(transport.feature_info_queries(A)[0].cancel.is_cancelled());
    assert_eq!(coordinator.current().await, None);
    assert!(!coordinator.is_in_progress().await);
    assert_eq!(listener.results(), vec![None]);
    assert_eq!(listener.progress(), vec![true, false]);
    assert!(listener.notices().is_empty());
}

#[tokio::test]
async fn test_clear_after_result() {
    let transport = shared(
        ScriptedTransport::new().on(feature_info_for(A), gml(&feature_gml(A, "a.1", "Pipe"))),
    );
    let (coordinator, _) = coordinator(&transport, &config());

    coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A]))
        .await;
    assert!(coordinator.current().await.is_some());

    coordinator.clear().await;
    assert_eq!(coordinator.current().await, None);
}

#[tokio::test]
async fn test_wms_hit_is_enriched_with_wfs_geometry() {
    let transport = shared(
        ScriptedTransport::new()
            .on(
                feature_info_for("mo:thermo"),
                gml(&feature_gml("mo:thermo", "thermo.5", "Boiler house")),
            )
            .on(by_id("thermo.5"), gml(responses::WFS_POINT_GML2)),
    );
    let config = DiscoveryConfig {
        enrich_with_wfs: true,
        ..config()
    };
    let (coordinator, _) = coordinator(&transport, &config);

    let outcome = coordinator
        .click(
            Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55))
                .with_layers(["mo:thermo"]),
        )
        .await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_eq!(found.props["name"], "Boiler house");
    let geojson = found.geojson.expect("geometry attached from WFS");
    assert_eq!(geojson["geometry"]["type"], "Point");
    assert_eq!(geojson["geometry"]["coordinates"][0], 39.82);

    let by_id_query = transport.queries().pop().unwrap();
    assert_eq!(by_id_query.param("typeName").as_deref(), Some("mo:thermo"));
    assert_eq!(by_id_query.param("featureId").as_deref(), Some("thermo.5"));
}

#[tokio::test]
async fn test_hit_with_geometry_is_not_enriched() {
    let transport = shared(
        ScriptedTransport::new().on(
            feature_info_for(A),
            gml(responses::FEATURE_INFO_GML),
        ),
    );
    let config = DiscoveryConfig {
        enrich_with_wfs: true,
        ..config()
    };
    let (coordinator, _) = coordinator(&transport, &config);

    let outcome = coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)).with_layers([A]))
        .await;

    let ClickOutcome::Resolved(Some(found)) = outcome else {
        panic!("expected a feature, got {outcome:?}");
    };
    assert_eq!(found.typename, "openlayers:teploset");
    assert_eq!(found.props["name"], "Магистраль 3");
    assert_eq!(transport.queries().len(), 1);
}

#[tokio::test]
async fn test_click_without_layers_uses_defaults() {
    let transport = shared(ScriptedTransport::new());
    let (coordinator, _) = coordinator(&transport, &config());

    let outcome = coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)))
        .await;

    // Nothing is routed, so every request ends in a 404.
    let ClickOutcome::Failed(DiscoveryError::Transport { status, .. }) = outcome else {
        panic!("expected a transport failure, got {outcome:?}");
    };
    assert_eq!(status, Some(404));
    for layer in test_utils::layers::DEFAULTS {
        assert_eq!(transport.feature_info_queries(layer).len(), 1, "{layer}");
    }
}

#[tokio::test]
async fn test_click_with_no_candidates_fails() {
    let transport = shared(ScriptedTransport::new());
    let config = DiscoveryConfig {
        default_layers: Vec::new(),
        ..config()
    };
    let (coordinator, listener) = coordinator(&transport, &config);

    let outcome = coordinator
        .click(Click::new(geographic_view(), MapPoint::lon_lat(39.82, 64.55)))
        .await;

    assert!(matches!(outcome, ClickOutcome::Failed(DiscoveryError::Config(_))));
    assert!(transport.queries().is_empty());
    assert_eq!(listener.notices().len(), 1);
}
