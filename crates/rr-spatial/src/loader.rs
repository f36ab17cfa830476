//! CSV loaders for the static waypoint tables.
//!
//! # CSV formats
//!
//! Coordinates, one row per waypoint:
//!
//! ```csv
//! name,lat,lon
//! defaultStartNode,13.629,123.240
//! W1,13.630,123.241
//! ```
//!
//! Connections, one row per listed neighbour.  Each row becomes a
//! bidirectional road when the graph is built, so listing a pair once is
//! enough:
//!
//! ```csv
//! from,to
//! defaultStartNode,W1
//! defaultStartNode,W2
//! W1,W2
//! ```
//!
//! Loading does not cross-check the two tables; unknown names are reported by
//! [`RoadGraph::build_static`](crate::RoadGraph::build_static).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use rr_core::{GeoPoint, NodeName};

use crate::graph::{ConnectionTable, NodeTable};
use crate::{SpatialError, SpatialResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    name: String,
    lat:  f64,
    lon:  f64,
}

#[derive(Deserialize)]
struct ConnectionRecord {
    from: String,
    to:   String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the coordinate table from a CSV file.
pub fn load_nodes_csv(path: &Path) -> SpatialResult<NodeTable> {
    let file = std::fs::File::open(path)?;
    load_nodes_reader(file)
}

/// Like [`load_nodes_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or for tables embedded in
/// the binary.
pub fn load_nodes_reader<R: Read>(reader: R) -> SpatialResult<NodeTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut table = NodeTable::new();

    for (line, result) in csv_reader.deserialize::<NodeRecord>().enumerate() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let name = parse_name(&row.name, line)?;
        let pos = GeoPoint::new(row.lat, row.lon);
        if !pos.is_valid() {
            return Err(SpatialError::Parse(format!(
                "row {}: invalid coordinate {pos} for {name}",
                line + 1
            )));
        }
        if table.insert(name.clone(), pos).is_some() {
            return Err(SpatialError::Parse(format!(
                "row {}: duplicate node {name}",
                line + 1
            )));
        }
    }

    Ok(table)
}

/// Load the connection table from a CSV file.
pub fn load_connections_csv(path: &Path) -> SpatialResult<ConnectionTable> {
    let file = std::fs::File::open(path)?;
    load_connections_reader(file)
}

/// Like [`load_connections_csv`] but accepts any `Read` source.
pub fn load_connections_reader<R: Read>(reader: R) -> SpatialResult<ConnectionTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut table = ConnectionTable::new();

    for (line, result) in csv_reader.deserialize::<ConnectionRecord>().enumerate() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let from = parse_name(&row.from, line)?;
        let to = parse_name(&row.to, line)?;
        table.entry(from).or_default().push(to);
    }

    Ok(table)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_name(raw: &str, line: usize) -> SpatialResult<NodeName> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SpatialError::Parse(format!("row {}: empty node name", line + 1)));
    }
    Ok(NodeName::from(name))
}
