//! The `IncidentRouter`: keeps incident nodes in the road graph in step with
//! the SOS feed and answers route queries against it.

use std::collections::BTreeMap;

use log::{debug, info};

use rr_core::{GeoPoint, IncidentId, NodeName, RouterConfig};
use rr_spatial::{DijkstraRouter, RoadGraph, Route, Router, k_shortest_paths_with};

use crate::{
    AcceptedIncident, DispatchError, DispatchObserver, DispatchResult, FeedEvent, Incident,
    IncidentFilter, NoopObserver,
};

// ── Registry entries and reports ──────────────────────────────────────────────

/// An incident currently represented by a node in the routing graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveIncident {
    pub id:       IncidentId,
    pub username: String,
    /// Last reported position.  Edge weights still reflect the position at
    /// insertion time.
    pub position: GeoPoint,
    /// `INCIDENT_<id>`.
    pub node:     NodeName,
    /// Static waypoints the node was linked to, nearest first.
    pub linked:   Vec<NodeName>,
}

/// Outcome of [`IncidentRouter::apply_snapshot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Incident nodes cleared before the snapshot was applied.
    pub removed:  usize,
    /// Incident nodes present after the snapshot.
    pub inserted: usize,
    /// Snapshot rows rejected by the filter.
    pub dropped:  usize,
}

// ── IncidentRouter ────────────────────────────────────────────────────────────

/// Owns the road graph and the active-incident registry.
///
/// Every mutation takes `&mut self`; wrap in
/// [`SharedRouter`][crate::SharedRouter] to feed events from one thread while
/// serving queries from others.
///
/// Incident handling:
///
/// | Event           | Effect                                                   |
/// |-----------------|----------------------------------------------------------|
/// | `snapshot`      | clear all incident nodes, insert every accepted row      |
/// | `sos-alert`     | replace-then-insert the node, linked to k nearest        |
/// | `sos-updated`   | move the coordinate; edges are left as inserted          |
/// | `sos-cancelled` | remove the node                                          |
/// | `sos-resolved`  | remove the node                                          |
///
/// Updates and removals whose id is missing or unknown fall back to the
/// active incident with the same username.
///
/// Create via [`RouterBuilder`][crate::RouterBuilder].
pub struct IncidentRouter<R: Router = DijkstraRouter, O: DispatchObserver = NoopObserver> {
    config:   RouterConfig,
    graph:    RoadGraph,
    active:   BTreeMap<IncidentId, ActiveIncident>,
    router:   R,
    observer: O,
}

impl<R: Router, O: DispatchObserver> IncidentRouter<R, O> {
    pub(crate) fn from_parts(config: RouterConfig, graph: RoadGraph, router: R, observer: O) -> Self {
        Self {
            config,
            graph,
            active: BTreeMap::new(),
            router,
            observer,
        }
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The routing graph, static waypoints plus current incident nodes.
    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    /// Active incidents in id order.
    pub fn active_incidents(&self) -> impl Iterator<Item = &ActiveIncident> + '_ {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn incident(&self, id: &IncidentId) -> Option<&ActiveIncident> {
        self.active.get(id)
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    // ── Feed handling ─────────────────────────────────────────────────────

    /// Apply one feed event.  Returns `true` if the incident set changed.
    pub fn apply(&mut self, event: FeedEvent) -> bool {
        debug!("applying {} event", event.kind());
        match event {
            FeedEvent::Snapshot(incidents) => {
                self.apply_snapshot(incidents);
                true
            }
            FeedEvent::SosAlert(incident) => self.on_created(&incident).is_some(),
            FeedEvent::SosUpdated(incident) => self.on_updated(&incident),
            FeedEvent::SosCancelled(incident) | FeedEvent::SosResolved(incident) => {
                self.on_removed(&incident)
            }
        }
    }

    /// Replace the whole incident set with `incidents`.
    ///
    /// All incident nodes are removed first, whether or not they appear in
    /// the snapshot, so a wipe followed by the snapshot contents is the only
    /// observable state.  Rows sharing an id collapse to the last one.
    pub fn apply_snapshot(&mut self, incidents: Vec<Incident>) -> ReconcileReport {
        let stale: Vec<NodeName> = self.graph.incident_nodes().cloned().collect();
        let removed = stale.len();
        for node in &stale {
            self.graph.remove_node(node.as_str());
        }
        for id in std::mem::take(&mut self.active).into_keys() {
            self.observer.on_removed(&id);
        }

        let mut dropped = 0;
        for incident in &incidents {
            match self.screen(incident) {
                Some(accepted) => self.insert(accepted),
                None => dropped += 1,
            }
        }

        let report = ReconcileReport {
            removed,
            inserted: self.active.len(),
            dropped,
        };
        info!(
            "snapshot applied: cleared {}, active {}, dropped {}",
            report.removed, report.inserted, report.dropped
        );
        self.observer.on_snapshot(&report);
        report
    }

    /// Admit a new incident.  Returns its node name, or `None` if filtered.
    ///
    /// Idempotent: an incident already in the graph is removed and
    /// re-inserted at the new position, never duplicated.
    pub fn on_created(&mut self, incident: &Incident) -> Option<NodeName> {
        let accepted = self.screen(incident)?;
        self.insert(accepted);
        incident.node_name()
    }

    /// Move an active incident.  Edges are not recomputed.
    ///
    /// No-op (returns `false`) if the incident is unknown or the update has
    /// no valid position.
    pub fn on_updated(&mut self, incident: &Incident) -> bool {
        let Some(id) = self.resolve(incident) else {
            debug!("update for unknown incident from {}", incident.display_name());
            return false;
        };
        let Some(pos) = incident.position() else {
            debug!("update for {id} without a valid position");
            return false;
        };
        let Some(active) = self.active.get_mut(&id) else {
            return false;
        };

        self.graph.move_node(active.node.as_str(), pos);
        active.position = pos;
        debug!("moved {} to {pos}", active.node);
        self.observer.on_moved(active);
        true
    }

    /// Remove an incident's node.  Returns `false` if it was not active.
    pub fn on_removed(&mut self, incident: &Incident) -> bool {
        let Some(id) = self.resolve(incident) else {
            debug!("removal for unknown incident from {}", incident.display_name());
            return false;
        };
        let Some(active) = self.active.remove(&id) else {
            return false;
        };

        self.graph.remove_node(active.node.as_str());
        debug!("removed {}", active.node);
        self.observer.on_removed(&active.id);
        true
    }

    // ── Route queries ─────────────────────────────────────────────────────

    /// Up to `alternative_count` routes from the start node to `node`.
    ///
    /// An empty vector means `node` is in the graph but unreachable.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownNode`] if `node` is not in the graph.
    pub fn routes_to_node(&self, node: &str) -> DispatchResult<Vec<Route>> {
        if !self.graph.contains(node) {
            return Err(DispatchError::UnknownNode(NodeName::from(node)));
        }
        let routes = k_shortest_paths_with(
            &self.router,
            self.graph.adjacency(),
            self.config.start_node.as_str(),
            node,
            self.config.alternative_count,
        );
        debug!("{} route(s) from {} to {node}", routes.len(), self.config.start_node);
        Ok(routes)
    }

    /// Routes to an already-active incident.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownIncident`] if `id` is not active.
    pub fn routes_to_incident_id(&self, id: &IncidentId) -> DispatchResult<Vec<Route>> {
        let active = self
            .active
            .get(id)
            .ok_or_else(|| DispatchError::UnknownIncident(id.clone()))?;
        self.routes_to_node(active.node.as_str())
    }

    /// Routes to `incident`, inserting its node first if it is not active.
    ///
    /// An incident the filter rejects yields an empty vector.
    pub fn route_to_incident(&mut self, incident: &Incident) -> DispatchResult<Vec<Route>> {
        let existing = incident
            .id_key()
            .and_then(|id| self.active.get(id))
            .map(|active| active.node.clone());
        let node = match existing {
            Some(node) => node,
            None => match self.on_created(incident) {
                Some(node) => node,
                None => return Ok(Vec::new()),
            },
        };
        self.routes_to_node(node.as_str())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn screen(&mut self, incident: &Incident) -> Option<AcceptedIncident> {
        match IncidentFilter::new(&self.config).check(incident) {
            Ok(accepted) => Some(accepted),
            Err(reason) => {
                debug!("dropped incident from {}: {reason}", incident.display_name());
                self.observer.on_dropped(incident, &reason);
                None
            }
        }
    }

    fn insert(&mut self, accepted: AcceptedIncident) {
        let node = NodeName::incident(&accepted.id);
        let linked =
            self.graph
                .insert_node(node.clone(), accepted.position, self.config.incident_neighbors);
        let active = ActiveIncident {
            id: accepted.id,
            username: accepted.username,
            position: accepted.position,
            node,
            linked,
        };
        self.observer.on_inserted(&active, &active.linked);
        self.active.insert(active.id.clone(), active);
    }

    /// Active incident targeted by an update or removal.
    ///
    /// An event with an id matches that id only; a stale or redelivered id
    /// resolves to nothing.  The username is consulted only when the event
    /// carries no id at all.
    fn resolve(&self, incident: &Incident) -> Option<IncidentId> {
        if let Some(id) = incident.id_key() {
            return self.active.get_key_value(id).map(|(id, _)| id.clone());
        }
        let username = incident.username_key()?;
        self.active
            .values()
            .find(|a| a.username == username)
            .map(|a| a.id.clone())
    }
}
