//! Unit tests for rr-dispatch.

#[cfg(test)]
mod helpers {
    use rr_core::{GeoPoint, NodeName, RouterConfig};
    use rr_spatial::{ConnectionTable, NodeTable};

    use crate::{
        ActiveIncident, DispatchObserver, DropReason, Incident, IncidentRouter, ReconcileReport,
        RouterBuilder,
    };

    pub const NEAR_START: GeoPoint = GeoPoint { lat: 13.6295, lon: 123.2405 };
    pub const SOUTH_WEST: GeoPoint = GeoPoint { lat: 13.60, lon: 123.20 };

    pub fn tables() -> (NodeTable, ConnectionTable) {
        let mut nodes = NodeTable::new();
        nodes.insert("defaultStartNode".into(), GeoPoint::new(13.629, 123.240));
        nodes.insert("W1".into(), GeoPoint::new(13.630, 123.241));
        nodes.insert("W2".into(), GeoPoint::new(13.628, 123.239));

        let mut conns = ConnectionTable::new();
        conns.insert(
            "defaultStartNode".into(),
            vec![NodeName::from("W1"), NodeName::from("W2")],
        );
        conns.insert("W1".into(), vec![NodeName::from("W2")]);
        (nodes, conns)
    }

    pub fn router() -> IncidentRouter<rr_spatial::DijkstraRouter, Recorder> {
        let (nodes, conns) = tables();
        RouterBuilder::new(RouterConfig::default())
            .tables(nodes, conns)
            .observer(Recorder::default())
            .build()
            .unwrap()
    }

    pub fn incident(id: &str, username: &str, pos: GeoPoint) -> Incident {
        Incident::new(id, username, pos)
    }

    /// Records observer callbacks as short strings.
    #[derive(Default)]
    pub struct Recorder {
        pub log: Vec<String>,
    }

    impl DispatchObserver for Recorder {
        fn on_inserted(&mut self, incident: &ActiveIncident, linked: &[NodeName]) {
            self.log.push(format!("insert {} ({})", incident.id, linked.len()));
        }
        fn on_moved(&mut self, incident: &ActiveIncident) {
            self.log.push(format!("move {}", incident.id));
        }
        fn on_removed(&mut self, id: &rr_core::IncidentId) {
            self.log.push(format!("remove {id}"));
        }
        fn on_dropped(&mut self, _incident: &Incident, reason: &DropReason) {
            self.log.push(format!("drop {reason}"));
        }
        fn on_snapshot(&mut self, report: &ReconcileReport) {
            self.log.push(format!(
                "snapshot {}/{}/{}",
                report.removed, report.inserted, report.dropped
            ));
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rr_core::{GeoPoint, NodeName, RouterConfig};
    use rr_spatial::{NodeTable, RoadGraph};

    use super::helpers::tables;
    use crate::{DispatchError, RouterBuilder};

    #[test]
    fn builds_from_tables() {
        let (nodes, conns) = tables();
        let router = RouterBuilder::new(RouterConfig::default())
            .tables(nodes, conns)
            .build()
            .unwrap();
        assert_eq!(router.graph().node_count(), 3);
        assert_eq!(router.active_count(), 0);
    }

    #[test]
    fn prebuilt_graph_wins_over_tables() {
        let (nodes, conns) = tables();
        let graph = RoadGraph::build_static(&nodes, &conns).unwrap();
        let router = RouterBuilder::new(RouterConfig::default())
            .graph(graph)
            .tables(NodeTable::new(), Default::default())
            .build()
            .unwrap();
        assert_eq!(router.graph().edge_count(), 6);
    }

    #[test]
    fn missing_start_node_rejected() {
        let (nodes, conns) = tables();
        let config = RouterConfig {
            start_node: NodeName::from("Depot"),
            ..RouterConfig::default()
        };
        let err = RouterBuilder::new(config).tables(nodes, conns).build().err().unwrap();
        assert!(matches!(err, DispatchError::UnknownNode(ref n) if n == "Depot"));
    }

    #[test]
    fn graph_or_tables_required() {
        let err = RouterBuilder::new(RouterConfig::default()).build().err().unwrap();
        assert!(matches!(err, DispatchError::MissingGraph));
    }

    #[test]
    fn empty_tables_have_no_start_node() {
        let err = RouterBuilder::new(RouterConfig::default())
            .tables(NodeTable::new(), Default::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::UnknownNode(ref n) if n == "defaultStartNode"));
    }

    #[test]
    fn zero_alternatives_rejected() {
        let (nodes, conns) = tables();
        let config = RouterConfig { alternative_count: 0, ..RouterConfig::default() };
        let err = RouterBuilder::new(config).tables(nodes, conns).build().err().unwrap();
        assert!(matches!(err, DispatchError::Core(_)));
    }

    #[test]
    fn missing_coordinate_is_fatal() {
        let (mut nodes, mut conns) = tables();
        nodes.insert("W3".into(), GeoPoint::new(13.61, 123.22));
        conns.insert("W3".into(), vec![NodeName::from("W9")]);
        let err = RouterBuilder::new(RouterConfig::default())
            .tables(nodes, conns)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::Spatial(_)));
    }
}

// ── Filter ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod filter {
    use rr_core::{GeoPoint, RouterConfig};

    use super::helpers::{NEAR_START, incident};
    use crate::{DropReason, Incident, IncidentFilter};

    fn check(i: &Incident) -> Result<(), DropReason> {
        let config = RouterConfig::default();
        IncidentFilter::new(&config).check(i).map(|_| ())
    }

    #[test]
    fn accepts_complete_incident() {
        let config = RouterConfig::default();
        let accepted = IncidentFilter::new(&config)
            .check(&incident("a1", " juan ", NEAR_START))
            .unwrap();
        assert_eq!(accepted.id, "a1");
        assert_eq!(accepted.username, "juan");
        assert_eq!(accepted.position, NEAR_START);
    }

    #[test]
    fn missing_or_blank_id() {
        let mut i = incident("a1", "juan", NEAR_START);
        i.id = None;
        assert_eq!(check(&i), Err(DropReason::MissingId));
        i.id = Some("  ".into());
        assert_eq!(check(&i), Err(DropReason::MissingId));
    }

    #[test]
    fn missing_or_blank_username() {
        let mut i = incident("a1", "juan", NEAR_START);
        i.username = None;
        assert_eq!(check(&i), Err(DropReason::MissingUsername));
        i.username = Some(String::new());
        assert_eq!(check(&i), Err(DropReason::MissingUsername));
    }

    #[test]
    fn missing_or_invalid_position() {
        let mut i = incident("a1", "juan", NEAR_START);
        i.longitude = None;
        assert_eq!(check(&i), Err(DropReason::MissingPosition));
        let i = incident("a1", "juan", GeoPoint::new(123.2, 13.6));
        assert_eq!(check(&i), Err(DropReason::MissingPosition));
    }

    #[test]
    fn denylist_is_exact_match() {
        for name in ["admin", " Admin ", "TEST", "placeholder", "Example", "demo"] {
            assert!(
                matches!(check(&incident("a1", name, NEAR_START)), Err(DropReason::Denylisted(_))),
                "{name:?} should be dropped"
            );
        }
        for name in ["admin2", "testing", "demo user", "juan"] {
            assert_eq!(check(&incident("a1", name, NEAR_START)), Ok(()), "{name:?} should pass");
        }
    }

    #[test]
    fn custom_denylist() {
        let config = RouterConfig {
            username_denylist: vec!["bot".into()],
            ..RouterConfig::default()
        };
        let f = IncidentFilter::new(&config);
        assert!(!f.accepts(&incident("a1", "Bot", NEAR_START)));
        assert!(f.accepts(&incident("a1", "admin", NEAR_START)));
    }
}

// ── Reconciliation ────────────────────────────────────────────────────────────

#[cfg(test)]
mod reconcile {
    use rr_core::{IncidentId, NodeName};

    use super::helpers::{NEAR_START, SOUTH_WEST, incident, router};
    use crate::{FeedEvent, Incident};

    #[test]
    fn created_links_k_nearest() {
        let mut r = router();
        let node = r.on_created(&incident("a1", "juan", NEAR_START)).unwrap();
        assert_eq!(node, "INCIDENT_a1");
        // All three waypoints (k = 3), both directions.
        assert_eq!(r.graph().adjacency().neighbors("INCIDENT_a1").count(), 3);
        assert_eq!(r.graph().edge_count(), 12);
        assert!(r.graph().adjacency().is_symmetric());
        assert_eq!(r.observer().log, vec!["insert a1 (3)"]);
    }

    #[test_log::test]
    fn duplicate_alert_is_idempotent() {
        let mut r = router();
        let alert = FeedEvent::SosAlert(incident("a1", "juan", NEAR_START));
        assert!(r.apply(alert.clone()));
        let edges_once = r.graph().adjacency().clone();
        assert!(r.apply(alert));

        assert_eq!(r.graph().incident_nodes().count(), 1);
        assert_eq!(r.active_count(), 1);
        assert_eq!(r.graph().adjacency(), &edges_once);
    }

    #[test]
    fn realert_at_new_position_relinks() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        r.on_created(&incident("a1", "juan", SOUTH_WEST));

        let active = r.incident(&IncidentId::from("a1")).unwrap();
        assert_eq!(active.position, SOUTH_WEST);
        assert_eq!(active.linked[0], NodeName::from("W2"));
        assert_eq!(r.graph().position("INCIDENT_a1"), Some(SOUTH_WEST));
    }

    #[test]
    fn filtered_alert_is_not_an_error() {
        let mut r = router();
        assert!(!r.apply(FeedEvent::SosAlert(incident("a1", "test", NEAR_START))));
        assert_eq!(r.graph().incident_nodes().count(), 0);
        assert_eq!(r.observer().log, vec!["drop denylisted username \"test\""]);
    }

    #[test]
    fn update_moves_coordinate_only() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        let edges = r.graph().adjacency().clone();

        assert!(r.apply(FeedEvent::SosUpdated(incident("a1", "juan", SOUTH_WEST))));
        assert_eq!(r.graph().position("INCIDENT_a1"), Some(SOUTH_WEST));
        assert_eq!(r.graph().adjacency(), &edges);
        assert_eq!(r.incident(&"a1".into()).unwrap().position, SOUTH_WEST);
    }

    #[test]
    fn update_unknown_is_noop() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        let edges = r.graph().adjacency().clone();
        assert!(!r.on_updated(&incident("zz", "maria", SOUTH_WEST)));
        assert_eq!(r.graph().adjacency(), &edges);
        assert_eq!(r.graph().position("INCIDENT_a1"), Some(NEAR_START));
    }

    #[test]
    fn update_without_position_is_noop() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        let update = Incident { latitude: None, ..incident("a1", "juan", SOUTH_WEST) };
        assert!(!r.on_updated(&update));
        assert_eq!(r.graph().position("INCIDENT_a1"), Some(NEAR_START));
    }

    #[test]
    fn update_falls_back_to_username() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        let update = Incident { id: None, ..incident("ignored", "juan", SOUTH_WEST) };
        assert!(r.on_updated(&update));
        assert_eq!(r.graph().position("INCIDENT_a1"), Some(SOUTH_WEST));
    }

    #[test]
    fn cancel_and_resolve_both_remove() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        r.on_created(&incident("a2", "maria", SOUTH_WEST));

        assert!(r.apply(FeedEvent::SosCancelled(incident("a1", "juan", NEAR_START))));
        assert!(r.apply(FeedEvent::SosResolved(incident("a2", "maria", SOUTH_WEST))));

        assert_eq!(r.active_count(), 0);
        assert_eq!(r.graph().incident_nodes().count(), 0);
        assert_eq!(r.graph().edge_count(), 6);
    }

    #[test]
    fn cancel_unknown_is_noop() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        assert!(!r.on_removed(&incident("zz", "maria", NEAR_START)));
        assert!(!r.on_removed(&Incident::default()));
        assert_eq!(r.active_count(), 1);
    }

    #[test]
    fn cancel_without_id_falls_back_to_username() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        let cancel = Incident {
            id: Some("  ".into()),
            username: Some("juan".into()),
            ..Incident::default()
        };
        assert!(r.on_removed(&cancel));
        assert!(!r.graph().contains("INCIDENT_a1"));
    }

    #[test]
    fn unknown_id_never_falls_back_to_username() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        let cancel = Incident {
            id: Some("stale-id".into()),
            username: Some("juan".into()),
            ..Incident::default()
        };
        assert!(!r.on_removed(&cancel));
        assert!(r.graph().contains("INCIDENT_a1"));
    }

    #[test_log::test]
    fn redelivered_events_leave_newer_incident_alone() {
        let mut r = router();
        assert!(r.apply(FeedEvent::SosAlert(incident("a0", "juan", NEAR_START))));
        assert!(r.apply(FeedEvent::SosCancelled(incident("a0", "juan", NEAR_START))));
        assert!(r.apply(FeedEvent::SosAlert(incident("a1", "juan", NEAR_START))));

        // At-least-once delivery replays events for the closed a0.
        assert!(!r.apply(FeedEvent::SosCancelled(incident("a0", "juan", NEAR_START))));
        assert!(!r.apply(FeedEvent::SosUpdated(incident("a0", "juan", SOUTH_WEST))));

        assert_eq!(r.active_incidents().map(|a| a.id.as_str()).collect::<Vec<_>>(), ["a1"]);
        assert_eq!(r.graph().position("INCIDENT_a1"), Some(NEAR_START));
        assert_eq!(r.observer().log, vec!["insert a0 (3)", "remove a0", "insert a1 (3)"]);
    }

    #[test]
    fn padded_id_is_the_same_incident() {
        let mut r = router();
        let padded = incident(" a1 ", "juan", NEAR_START);
        assert_eq!(padded.node_name(), Some(NodeName::from("INCIDENT_a1")));
        assert_eq!(r.on_created(&padded), Some(NodeName::from("INCIDENT_a1")));
        r.on_created(&incident("a1", "juan", SOUTH_WEST));

        assert_eq!(r.active_count(), 1);
        assert_eq!(r.graph().incident_nodes().count(), 1);
        assert!(r.on_updated(&incident("a1 ", "juan", NEAR_START)));
        assert!(r.on_removed(&incident("\ta1", "juan", NEAR_START)));
        assert_eq!(r.active_count(), 0);
    }

    #[test_log::test]
    fn snapshot_replaces_incident_set() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        r.on_created(&incident("a2", "maria", SOUTH_WEST));

        let report = r.apply_snapshot(vec![
            incident("b1", "pedro", NEAR_START),
            incident("b2", "demo", NEAR_START),
            Incident { id: None, ..incident("b3", "ana", NEAR_START) },
        ]);

        assert_eq!(report.removed, 2);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.dropped, 2);

        let nodes: Vec<&NodeName> = r.graph().incident_nodes().collect();
        assert_eq!(nodes, vec![&NodeName::from("INCIDENT_b1")]);
        assert_eq!(r.active_incidents().map(|a| a.id.as_str()).collect::<Vec<_>>(), ["b1"]);
        assert_eq!(r.observer().log.last().unwrap(), "snapshot 2/1/2");
    }

    #[test]
    fn empty_snapshot_clears_everything() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        assert!(r.apply(FeedEvent::Snapshot(Vec::new())));
        assert_eq!(r.active_count(), 0);
        assert_eq!(r.graph().edge_count(), 6);
    }

    #[test]
    fn snapshot_duplicate_ids_collapse() {
        let mut r = router();
        let report = r.apply_snapshot(vec![
            incident("a1", "juan", NEAR_START),
            incident("a1", "juan", SOUTH_WEST),
        ]);
        assert_eq!(report.inserted, 1);
        assert_eq!(r.graph().position("INCIDENT_a1"), Some(SOUTH_WEST));
    }
}

// ── Route queries ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use rr_core::{IncidentId, NodeName};

    use super::helpers::{NEAR_START, incident, router};
    use crate::DispatchError;

    #[test]
    fn route_to_incident_inserts_on_demand() {
        let mut r = router();
        let routes = r.route_to_incident(&incident("a1", "juan", NEAR_START)).unwrap();

        assert!(!routes.is_empty());
        assert!(routes.len() <= 3);
        assert_eq!(
            routes[0].nodes,
            vec![NodeName::from("defaultStartNode"), NodeName::from("INCIDENT_a1")]
        );
        for pair in routes.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
        for route in &routes {
            assert_eq!(r.graph().adjacency().path_distance(&route.nodes), Some(route.distance_km));
        }
        assert_eq!(r.active_count(), 1);
    }

    #[test]
    fn repeated_query_does_not_reinsert() {
        let mut r = router();
        let i = incident("a1", "juan", NEAR_START);
        let first = r.route_to_incident(&i).unwrap();
        let second = r.route_to_incident(&i).unwrap();
        assert_eq!(first, second);
        assert_eq!(r.observer().log, vec!["insert a1 (3)"]);
    }

    #[test]
    fn filtered_incident_yields_no_routes() {
        let mut r = router();
        let routes = r.route_to_incident(&incident("a1", "admin", NEAR_START)).unwrap();
        assert!(routes.is_empty());
        assert_eq!(r.active_count(), 0);
    }

    #[test]
    fn routes_to_waypoint() {
        let r = router();
        let routes = r.routes_to_node("W2").unwrap();
        assert_eq!(routes[0].nodes, vec![NodeName::from("defaultStartNode"), NodeName::from("W2")]);
        // Direct, via W1.
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn start_node_routes_to_itself() {
        let r = router();
        let routes = r.routes_to_node("defaultStartNode").unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].distance_km, 0.0);
    }

    #[test]
    fn unknown_targets_are_errors() {
        let r = router();
        assert!(matches!(r.routes_to_node("Nowhere"), Err(DispatchError::UnknownNode(_))));
        assert!(matches!(
            r.routes_to_incident_id(&IncidentId::from("zz")),
            Err(DispatchError::UnknownIncident(_))
        ));
    }

    #[test]
    fn closed_incident_no_longer_routable() {
        let mut r = router();
        r.on_created(&incident("a1", "juan", NEAR_START));
        assert!(r.routes_to_incident_id(&"a1".into()).is_ok());
        r.on_removed(&incident("a1", "juan", NEAR_START));
        assert!(r.routes_to_node("INCIDENT_a1").is_err());
    }
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod wire {
    use rr_core::IncidentId;

    use crate::{DispatchError, FeedEvent};

    #[test]
    fn snapshot_rows_use_underscore_id() {
        let line = r#"{"event":"snapshot","data":[
            {"_id":"a1","username":"juan","fullname":"Juan Cruz","latitude":13.6295,
             "longitude":123.2405,"address":"Naga","timestamp":"2024-01-01T00:00:00Z",
             "status":"active","userId":{"fullname":"Juan Cruz"}}
        ]}"#;
        let FeedEvent::Snapshot(rows) = FeedEvent::from_json(line).unwrap() else {
            panic!("expected snapshot");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, Some(IncidentId::from("a1")));
        assert_eq!(rows[0].display_name(), "Juan Cruz");
        assert_eq!(rows[0].latitude, Some(13.6295));
    }

    #[test]
    fn live_events_use_plain_id() {
        let alert = FeedEvent::from_json(
            r#"{"event":"sos-alert","data":{"id":"a2","username":"maria","latitude":13.63,"longitude":123.24}}"#,
        )
        .unwrap();
        assert_eq!(alert.kind(), "sos-alert");
        let FeedEvent::SosAlert(i) = alert else { panic!("expected alert") };
        assert_eq!(i.id, Some(IncidentId::from("a2")));
        assert_eq!(i.display_name(), "maria");

        for kind in ["sos-updated", "sos-cancelled", "sos-resolved"] {
            let line = format!(r#"{{"event":"{kind}","data":{{"id":"a2"}}}}"#);
            assert_eq!(FeedEvent::from_json(&line).unwrap().kind(), kind);
        }
    }

    #[test]
    fn sparse_payload_decodes() {
        let e = FeedEvent::from_json(r#"{"event":"sos-cancelled","data":{"username":"maria"}}"#)
            .unwrap();
        let FeedEvent::SosCancelled(i) = e else { panic!("expected cancel") };
        assert_eq!(i.id, None);
        assert_eq!(i.position(), None);
    }

    #[test]
    fn unknown_event_kind_is_decode_error() {
        let err = FeedEvent::from_json(r#"{"event":"sos-escalated","data":{}}"#).unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
    }

    #[test]
    fn route_serializes_with_distance() {
        let route = rr_spatial::Route {
            nodes:       vec!["defaultStartNode".into(), "W1".into()],
            distance_km: 0.15,
        };
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["nodes"][1], "W1");
        assert_eq!(json["distance_km"], 0.15);
    }
}

// ── Shared handle ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod shared {
    use std::sync::mpsc;
    use std::thread;

    use rr_core::{NodeName, RouterConfig};

    use super::helpers::{NEAR_START, SOUTH_WEST, incident, tables};
    use crate::{
        ActiveIncident, DispatchError, DispatchObserver, FeedEvent, RouterBuilder, SharedRouter,
    };

    fn shared() -> SharedRouter {
        let (nodes, conns) = tables();
        let router = RouterBuilder::new(RouterConfig::default())
            .tables(nodes, conns)
            .build()
            .unwrap();
        SharedRouter::new(router)
    }

    #[test_log::test]
    fn feed_pump_applies_events_in_order() {
        let shared = shared();
        let (tx, rx) = mpsc::channel();

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || shared.run_feed(rx))
        };

        tx.send(FeedEvent::SosAlert(incident("a1", "juan", NEAR_START))).unwrap();
        tx.send(FeedEvent::SosAlert(incident("a2", "maria", SOUTH_WEST))).unwrap();
        tx.send(FeedEvent::Snapshot(vec![incident("b1", "pedro", NEAR_START)])).unwrap();
        tx.send(FeedEvent::SosUpdated(incident("b1", "pedro", SOUTH_WEST))).unwrap();
        drop(tx);

        assert_eq!(writer.join().unwrap().unwrap(), 4);

        let (count, pos) = shared
            .with(|r| (r.active_count(), r.graph().position("INCIDENT_b1")))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(pos, Some(SOUTH_WEST));
    }

    #[test]
    fn readers_see_consistent_graph_during_feed() {
        let shared = shared();
        let (tx, rx) = mpsc::channel();
        let writer = {
            let shared = shared.clone();
            thread::spawn(move || shared.run_feed(rx))
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let routes = shared.routes_to_node("W1").unwrap();
                        assert!(!routes.is_empty());
                        for route in &routes {
                            assert_eq!(route.origin(), Some(&NodeName::from("defaultStartNode")));
                            assert_eq!(route.destination(), Some(&NodeName::from("W1")));
                        }
                    }
                })
            })
            .collect();

        for i in 0..50 {
            let id = format!("a{i}");
            tx.send(FeedEvent::SosAlert(incident(&id, "juan", NEAR_START))).unwrap();
            tx.send(FeedEvent::SosResolved(incident(&id, "juan", NEAR_START))).unwrap();
        }
        drop(tx);

        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(writer.join().unwrap().unwrap(), 100);
        assert_eq!(shared.with(|r| r.active_count()).unwrap(), 0);
    }

    #[test]
    fn route_to_incident_through_handle() {
        let shared = shared();
        let routes = shared.route_to_incident(&incident("a1", "juan", NEAR_START)).unwrap();
        assert!(!routes.is_empty());
        assert!(shared.routes_to_incident_id(&"a1".into()).is_ok());
    }

    struct Exploding;

    impl DispatchObserver for Exploding {
        fn on_inserted(&mut self, _incident: &ActiveIncident, _linked: &[NodeName]) {
            panic!("observer failure");
        }
    }

    #[test]
    fn panicked_writer_poisons_handle() {
        let (nodes, conns) = tables();
        let router = RouterBuilder::new(RouterConfig::default())
            .tables(nodes, conns)
            .observer(Exploding)
            .build()
            .unwrap();
        let shared = SharedRouter::new(router);

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                let _ = shared.apply(FeedEvent::SosAlert(incident("a1", "juan", NEAR_START)));
            })
        };
        assert!(writer.join().is_err());

        assert!(matches!(shared.routes_to_node("W1"), Err(DispatchError::Poisoned)));
        assert!(matches!(
            shared.apply(FeedEvent::Snapshot(Vec::new())),
            Err(DispatchError::Poisoned)
        ));
    }
}
