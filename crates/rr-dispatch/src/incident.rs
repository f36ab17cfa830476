//! Incident payloads from the SOS feed and the filter that admits them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rr_core::{GeoPoint, IncidentId, NodeName, RouterConfig};

// ── Feed payload ──────────────────────────────────────────────────────────────

/// One SOS incident as delivered by the feed.
///
/// Every field is optional on the wire; [`IncidentFilter`] decides whether
/// the record is usable.  Snapshot rows carry the identifier as `_id`, live
/// events as `id`; both decode into [`id`](Self::id).  Unknown fields are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(default, alias = "_id")]
    pub id: Option<IncidentId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Incident {
    /// Minimal incident with an id, a username and a position.
    pub fn new(id: impl Into<IncidentId>, username: impl Into<String>, pos: GeoPoint) -> Self {
        Self {
            id:        Some(id.into()),
            username:  Some(username.into()),
            latitude:  Some(pos.lat),
            longitude: Some(pos.lon),
            ..Self::default()
        }
    }

    /// Reported position, if both components are present and valid.
    pub fn position(&self) -> Option<GeoPoint> {
        let pos = GeoPoint::new(self.latitude?, self.longitude?);
        pos.is_valid().then_some(pos)
    }

    /// Graph node this incident maps to, if it carries a non-blank id.
    pub fn node_name(&self) -> Option<NodeName> {
        self.id_key().map(|id| NodeName::incident(&IncidentId::from(id)))
    }

    /// Human-readable reporter: full name, else username, else a placeholder.
    pub fn display_name(&self) -> &str {
        non_blank(self.fullname.as_deref())
            .or_else(|| non_blank(self.username.as_deref()))
            .unwrap_or("Unknown User")
    }

    /// Non-blank username, trimmed.
    pub(crate) fn username_key(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    /// Non-blank id, trimmed.
    pub(crate) fn id_key(&self) -> Option<&str> {
        non_blank(self.id.as_ref().map(IncidentId::as_str))
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// ── Filter ────────────────────────────────────────────────────────────────────

/// Why an incident was not admitted to the routing graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("missing incident id")]
    MissingId,

    #[error("missing username")]
    MissingUsername,

    #[error("missing or invalid coordinates")]
    MissingPosition,

    #[error("denylisted username {0:?}")]
    Denylisted(String),
}

/// An incident that passed [`IncidentFilter::check`], with its required
/// fields unwrapped.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedIncident {
    pub id:       IncidentId,
    pub username: String,
    pub position: GeoPoint,
}

/// Admission rules for feed incidents.
///
/// An incident is admitted only with a non-blank id, a non-blank username,
/// valid coordinates, and a username that is not on the configured denylist.
/// The denylist match is exact on the trimmed, lowercased username, so
/// `"Admin "` is dropped but `"admin2"` is not.
#[derive(Clone, Copy, Debug)]
pub struct IncidentFilter<'a> {
    config: &'a RouterConfig,
}

impl<'a> IncidentFilter<'a> {
    pub fn new(config: &'a RouterConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, incident: &Incident) -> Result<AcceptedIncident, DropReason> {
        let id = incident.id_key().ok_or(DropReason::MissingId)?;
        let username = incident.username_key().ok_or(DropReason::MissingUsername)?;
        if self.config.is_denylisted(username) {
            return Err(DropReason::Denylisted(username.to_owned()));
        }
        let position = incident.position().ok_or(DropReason::MissingPosition)?;
        Ok(AcceptedIncident {
            id: IncidentId::from(id),
            username: username.to_owned(),
            position,
        })
    }

    #[inline]
    pub fn accepts(&self, incident: &Incident) -> bool {
        self.check(incident).is_ok()
    }
}
