//! `rr-spatial`: road graph store, shortest path, and K-shortest paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `Adjacency`, `RoadGraph`, `RoadGraphBuilder`, table types   |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`, `shortest_path`  |
//! | [`yen`]     | `k_shortest_paths`, `k_shortest_paths_with`                 |
//! | [`loader`]  | CSV loaders for the static coordinate/connection tables    |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Route`.                |

pub mod error;
pub mod graph;
pub mod loader;
pub mod router;
pub mod yen;


pub use error::{SpatialError, SpatialResult};
pub use graph::{Adjacency, ConnectionTable, NodeTable, RoadGraph, RoadGraphBuilder};
pub use loader::{load_connections_csv, load_connections_reader, load_nodes_csv, load_nodes_reader};
pub use router::{DijkstraRouter, Route, Router, shortest_path};
pub use yen::{k_shortest_paths, k_shortest_paths_with};
