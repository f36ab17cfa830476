//! Fluent builder for constructing an [`IncidentRouter`].

use log::info;

use rr_core::RouterConfig;
use rr_spatial::{ConnectionTable, DijkstraRouter, NodeTable, RoadGraph, Router};

use crate::{DispatchError, DispatchObserver, DispatchResult, IncidentRouter, NoopObserver};

/// Fluent builder for [`IncidentRouter<R, O>`].
///
/// # Required inputs
///
/// - [`RouterConfig`]: start node, neighbour count, alternative count, denylist
/// - a road graph: `.graph(g)`, or `.tables(n, c)` to build one
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                               |
/// |----------------------|---------------------------------------|
/// | `.router(r)`         | [`DijkstraRouter`]                    |
/// | `.observer(o)`       | [`NoopObserver`]                      |
///
/// # Example
///
/// ```rust,ignore
/// let mut router = RouterBuilder::new(RouterConfig::default())
///     .tables(nodes, connections)
///     .observer(LogObserver)
///     .build()?;
/// router.apply(FeedEvent::SosAlert(incident));
/// ```
pub struct RouterBuilder<R: Router = DijkstraRouter, O: DispatchObserver = NoopObserver> {
    config:   RouterConfig,
    graph:    Option<RoadGraph>,
    tables:   Option<(NodeTable, ConnectionTable)>,
    router:   R,
    observer: O,
}

impl RouterBuilder {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            graph:    None,
            tables:   None,
            router:   DijkstraRouter,
            observer: NoopObserver,
        }
    }
}

impl<R: Router, O: DispatchObserver> RouterBuilder<R, O> {
    /// Use a pre-built static graph.  Takes precedence over [`tables`](Self::tables).
    pub fn graph(mut self, graph: RoadGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Build the static graph from a coordinate table and connection table.
    pub fn tables(mut self, nodes: NodeTable, connections: ConnectionTable) -> Self {
        self.tables = Some((nodes, connections));
        self
    }

    /// Replace the single-path router used under Yen's algorithm.
    pub fn router<R2: Router>(self, router: R2) -> RouterBuilder<R2, O> {
        RouterBuilder {
            config:   self.config,
            graph:    self.graph,
            tables:   self.tables,
            router,
            observer: self.observer,
        }
    }

    pub fn observer<O2: DispatchObserver>(self, observer: O2) -> RouterBuilder<R, O2> {
        RouterBuilder {
            config:   self.config,
            graph:    self.graph,
            tables:   self.tables,
            router:   self.router,
            observer,
        }
    }

    /// Validate inputs, build the static graph, and return a ready router.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Core`] if the configuration is invalid.
    /// - [`DispatchError::MissingGraph`] if neither `.graph(..)` nor
    ///   `.tables(..)` was given.
    /// - [`DispatchError::Spatial`] if a connection names a node without a
    ///   coordinate.
    /// - [`DispatchError::UnknownNode`] if the start node is not in the graph.
    pub fn build(self) -> DispatchResult<IncidentRouter<R, O>> {
        self.config.validate()?;

        let graph = match (self.graph, self.tables) {
            (Some(graph), _) => graph,
            (None, Some((nodes, connections))) => RoadGraph::build_static(&nodes, &connections)?,
            (None, None) => return Err(DispatchError::MissingGraph),
        };

        if !graph.contains(self.config.start_node.as_str()) {
            return Err(DispatchError::UnknownNode(self.config.start_node.clone()));
        }

        info!(
            "incident router ready: start {}, k={} neighbours, {} alternatives",
            self.config.start_node, self.config.incident_neighbors, self.config.alternative_count
        );
        Ok(IncidentRouter::from_parts(self.config, graph, self.router, self.observer))
    }
}
