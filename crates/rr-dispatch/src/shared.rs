//! Thread-safe handle around an [`IncidentRouter`].
//!
//! One writer applies feed events; any number of readers run route queries.
//! Each event holds the write lock for its whole duration, so a snapshot
//! wipe can never interleave with an incremental update, and every query
//! sees a single consistent graph.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use rr_core::IncidentId;
use rr_spatial::{DijkstraRouter, Route, Router};

use crate::{
    DispatchError, DispatchObserver, DispatchResult, FeedEvent, Incident, IncidentRouter,
    NoopObserver,
};

/// Cloneable, `Send + Sync` handle to a shared [`IncidentRouter`].
pub struct SharedRouter<R: Router = DijkstraRouter, O: DispatchObserver = NoopObserver> {
    inner: Arc<RwLock<IncidentRouter<R, O>>>,
}

impl<R: Router, O: DispatchObserver> Clone for SharedRouter<R, O> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<R: Router, O: DispatchObserver> From<IncidentRouter<R, O>> for SharedRouter<R, O> {
    fn from(router: IncidentRouter<R, O>) -> Self {
        Self::new(router)
    }
}

impl<R: Router, O: DispatchObserver> SharedRouter<R, O> {
    pub fn new(router: IncidentRouter<R, O>) -> Self {
        Self { inner: Arc::new(RwLock::new(router)) }
    }

    /// Apply one event under the write lock.
    pub fn apply(&self, event: FeedEvent) -> DispatchResult<bool> {
        Ok(self.write()?.apply(event))
    }

    /// Routes from the start node to `node`, under the read lock.
    pub fn routes_to_node(&self, node: &str) -> DispatchResult<Vec<Route>> {
        self.read()?.routes_to_node(node)
    }

    /// Routes to an active incident, under the read lock.
    pub fn routes_to_incident_id(&self, id: &IncidentId) -> DispatchResult<Vec<Route>> {
        self.read()?.routes_to_incident_id(id)
    }

    /// Routes to `incident`, inserting it if needed; takes the write lock.
    pub fn route_to_incident(&self, incident: &Incident) -> DispatchResult<Vec<Route>> {
        self.write()?.route_to_incident(incident)
    }

    /// Run `f` against the router under the read lock.
    pub fn with<T>(&self, f: impl FnOnce(&IncidentRouter<R, O>) -> T) -> DispatchResult<T> {
        let guard = self.read()?;
        Ok(f(&*guard))
    }

    /// Apply events from `feed` one at a time until every sender is dropped.
    ///
    /// Returns the number of events applied.  Intended to run on a dedicated
    /// thread as the single writer.
    pub fn run_feed(&self, feed: Receiver<FeedEvent>) -> DispatchResult<usize> {
        let mut applied = 0;
        for event in feed {
            self.apply(event)?;
            applied += 1;
        }
        debug!("feed closed after {applied} event(s)");
        Ok(applied)
    }

    fn read(&self) -> DispatchResult<RwLockReadGuard<'_, IncidentRouter<R, O>>> {
        self.inner.read().map_err(|_| {
            warn!("router lock poisoned (read)");
            DispatchError::Poisoned
        })
    }

    fn write(&self) -> DispatchResult<RwLockWriteGuard<'_, IncidentRouter<R, O>>> {
        self.inner.write().map_err(|_| {
            warn!("router lock poisoned (write)");
            DispatchError::Poisoned
        })
    }
}
