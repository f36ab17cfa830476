//! Dispatch observer trait for progress reporting and data collection.

use log::info;

use rr_core::{IncidentId, NodeName};

use crate::{ActiveIncident, DropReason, Incident, ReconcileReport};

/// Callbacks invoked by [`IncidentRouter`][crate::IncidentRouter] whenever
/// the incident set changes.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: map marker sync
///
/// ```rust,ignore
/// struct Markers(HashMap<IncidentId, GeoPoint>);
///
/// impl DispatchObserver for Markers {
///     fn on_inserted(&mut self, incident: &ActiveIncident, _linked: &[NodeName]) {
///         self.0.insert(incident.id.clone(), incident.position);
///     }
///     fn on_removed(&mut self, id: &IncidentId) {
///         self.0.remove(id);
///     }
/// }
/// ```
pub trait DispatchObserver {
    /// An incident node was (re)inserted and linked to `linked`.
    fn on_inserted(&mut self, _incident: &ActiveIncident, _linked: &[NodeName]) {}

    /// An active incident's coordinate was updated.
    fn on_moved(&mut self, _incident: &ActiveIncident) {}

    /// An incident node was removed from the graph.
    fn on_removed(&mut self, _id: &IncidentId) {}

    /// An incident was rejected by the filter.
    fn on_dropped(&mut self, _incident: &Incident, _reason: &DropReason) {}

    /// A snapshot finished replacing the incident set.
    fn on_snapshot(&mut self, _report: &ReconcileReport) {}
}

/// A [`DispatchObserver`] that does nothing.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}

/// Reports every change at `info` level.
pub struct LogObserver;

impl DispatchObserver for LogObserver {
    fn on_inserted(&mut self, incident: &ActiveIncident, linked: &[NodeName]) {
        info!(
            "incident {} ({}) at {} linked to {} waypoint(s)",
            incident.id,
            incident.username,
            incident.position,
            linked.len()
        );
    }

    fn on_moved(&mut self, incident: &ActiveIncident) {
        info!("incident {} moved to {}", incident.id, incident.position);
    }

    fn on_removed(&mut self, id: &IncidentId) {
        info!("incident {id} closed");
    }

    fn on_dropped(&mut self, incident: &Incident, reason: &DropReason) {
        info!("ignored incident from {}: {reason}", incident.display_name());
    }

    fn on_snapshot(&mut self, report: &ReconcileReport) {
        info!(
            "snapshot: {} cleared, {} active, {} ignored",
            report.removed, report.inserted, report.dropped
        );
    }
}
