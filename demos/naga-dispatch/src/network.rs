//! Built-in waypoint network for the demo.
//!
//! Eight waypoints in central Naga City laid out in code, in the same shape
//! as the `nodes.csv` / `connections.csv` pair accepted by `--nodes` and
//! `--connections`.

use rr_core::{GeoPoint, NodeName};
use rr_spatial::{ConnectionTable, NodeTable};

const WAYPOINTS: [(&str, f64, f64); 8] = [
    ("defaultStartNode", 13.6218, 123.1948),
    ("PlazaRizal",       13.6235, 123.1862),
    ("Cathedral",        13.6268, 123.1889),
    ("Magsaysay",        13.6302, 123.1967),
    ("Panganiban",       13.6190, 123.1995),
    ("Triangulo",        13.6145, 123.2041),
    ("Diversion",        13.6331, 123.2089),
    ("Concepcion",       13.6120, 123.1880),
];

// One row per road; each becomes bidirectional when the graph is built.
const ROADS: [(&str, &str); 11] = [
    ("defaultStartNode", "PlazaRizal"),
    ("defaultStartNode", "Magsaysay"),
    ("defaultStartNode", "Panganiban"),
    ("PlazaRizal",       "Cathedral"),
    ("PlazaRizal",       "Concepcion"),
    ("Cathedral",        "Magsaysay"),
    ("Magsaysay",        "Diversion"),
    ("Panganiban",       "Triangulo"),
    ("Panganiban",       "Concepcion"),
    ("Triangulo",        "Diversion"),
    ("Concepcion",       "Triangulo"),
];

/// Coordinate and connection tables for the built-in network.
pub fn sample_tables() -> (NodeTable, ConnectionTable) {
    let nodes: NodeTable = WAYPOINTS
        .iter()
        .map(|&(name, lat, lon)| (NodeName::from(name), GeoPoint::new(lat, lon)))
        .collect();

    let mut connections = ConnectionTable::new();
    for (from, to) in ROADS {
        connections.entry(from.into()).or_default().push(to.into());
    }

    (nodes, connections)
}
