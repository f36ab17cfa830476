//! `rr-dispatch`: incident feed reconciliation and route queries.
//!
//! # Data flow
//!
//! ```text
//! feed (JSON) ──► FeedEvent ──► IncidentRouter::apply
//!                                 ├─ IncidentFilter::check   (drop placeholders)
//!                                 ├─ RoadGraph::insert_node  (link k nearest)
//!                                 └─ DispatchObserver hooks
//!
//! query ──► IncidentRouter::routes_to_node ──► k_shortest_paths (Yen over Dijkstra)
//! ```
//!
//! [`SharedRouter`] wraps the router in `Arc<RwLock<_>>` so one thread can
//! drain the feed while others serve route queries.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rr_core::RouterConfig;
//! use rr_dispatch::{FeedEvent, RouterBuilder};
//!
//! let mut router = RouterBuilder::new(RouterConfig::default())
//!     .tables(nodes, connections)
//!     .build()?;
//! router.apply(FeedEvent::from_json(line)?);
//! let routes = router.routes_to_node("INCIDENT_a1")?;
//! ```

pub mod builder;
pub mod error;
pub mod event;
pub mod incident;
pub mod manager;
pub mod observer;
pub mod shared;

#[cfg(test)]
mod tests;

pub use builder::RouterBuilder;
pub use error::{DispatchError, DispatchResult};
pub use event::FeedEvent;
pub use incident::{AcceptedIncident, DropReason, Incident, IncidentFilter};
pub use manager::{ActiveIncident, IncidentRouter, ReconcileReport};
pub use observer::{DispatchObserver, LogObserver, NoopObserver};
pub use shared::SharedRouter;
