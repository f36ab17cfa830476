//! naga-dispatch: replay an SOS incident feed and print responder routes.
//!
//! Builds the waypoint graph (the built-in Naga City network, or CSV tables),
//! pumps a JSON-lines feed through a [`SharedRouter`] on a writer thread, and
//! prints up to K routes from the start node to each active incident as JSON.
//!
//! ```text
//! RUST_LOG=debug naga-dispatch --events feed.jsonl --incident a2
//! ```

mod network;

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{info, warn};
use serde_json::json;

use rr_core::{DEFAULT_START_NODE, IncidentId, NodeName, RouterConfig};
use rr_dispatch::{FeedEvent, LogObserver, RouterBuilder, SharedRouter};
use rr_spatial::{load_connections_csv, load_nodes_csv};

use network::sample_tables;

// ── Sample feed ───────────────────────────────────────────────────────────────

// A snapshot with one placeholder account, then live events: a new alert,
// a position update, and a cancellation matched by username only.
const SAMPLE_FEED: &str = r#"
{"event":"snapshot","data":[{"_id":"a1","username":"juan","fullname":"Juan Dela Cruz","latitude":13.6251,"longitude":123.1905},{"_id":"a0","username":"test","latitude":13.62,"longitude":123.19}]}
{"event":"sos-alert","data":{"id":"a2","username":"maria","fullname":"Maria Santos","latitude":13.6160,"longitude":123.2010,"address":"Triangulo"}}
{"event":"sos-alert","data":{"id":"a3","username":"pedro","latitude":13.6318,"longitude":123.2040}}
{"event":"sos-updated","data":{"id":"a2","username":"maria","latitude":13.6155,"longitude":123.2022}}
{"event":"sos-cancelled","data":{"username":"pedro"}}
"#;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "naga-dispatch",
    about = "Replay an SOS incident feed and print responder routes",
    version
)]
struct Args {
    /// Waypoint coordinate table (`name,lat,lon`).  Built-in network if omitted.
    #[arg(long, value_name = "path", requires = "connections")]
    nodes: Option<PathBuf>,

    /// Waypoint connection table (`from,to`).
    #[arg(long, value_name = "path", requires = "nodes")]
    connections: Option<PathBuf>,

    /// JSON-lines incident feed.  Built-in sample feed if omitted.
    #[arg(long, value_name = "path")]
    events: Option<PathBuf>,

    /// Route only to this incident id (default: every active incident).
    #[arg(long, value_name = "id")]
    incident: Option<String>,

    /// Origin waypoint for every route.
    #[arg(long, value_name = "name", default_value = DEFAULT_START_NODE)]
    start: String,

    /// Nearest waypoints each incident is linked to.
    #[arg(long, default_value_t = 3)]
    neighbors: usize,

    /// Maximum routes per incident.
    #[arg(long, default_value_t = 3)]
    alternatives: usize,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Static tables.
    let (nodes, connections) = match (&args.nodes, &args.connections) {
        (Some(n), Some(c)) => (
            load_nodes_csv(n).with_context(|| format!("loading {}", n.display()))?,
            load_connections_csv(c).with_context(|| format!("loading {}", c.display()))?,
        ),
        _ => sample_tables(),
    };

    // 2. Router.
    let config = RouterConfig {
        start_node:         NodeName::from(args.start.as_str()),
        incident_neighbors: args.neighbors,
        alternative_count:  args.alternatives,
        ..RouterConfig::default()
    };
    let router = RouterBuilder::new(config)
        .tables(nodes, connections)
        .observer(LogObserver)
        .build()?;
    info!(
        "graph: {} nodes, {} directed edges",
        router.graph().node_count(),
        router.graph().edge_count()
    );
    let shared = SharedRouter::new(router);

    // 3. Feed pump on a dedicated writer thread.
    let (tx, rx) = mpsc::channel();
    let writer = {
        let shared = shared.clone();
        thread::spawn(move || shared.run_feed(rx))
    };

    let feed: Box<dyn BufRead> = match &args.events {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(Cursor::new(SAMPLE_FEED)),
    };
    for (n, line) in feed.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match FeedEvent::from_json(&line) {
            Ok(event) => tx.send(event).context("feed thread stopped")?,
            Err(e) => warn!("line {}: {e}", n + 1),
        }
    }
    drop(tx);

    let applied = writer.join().map_err(|_| anyhow!("feed thread panicked"))??;
    info!("applied {applied} feed event(s)");

    // 4. Routes.
    let targets: Vec<IncidentId> = match &args.incident {
        Some(id) => vec![IncidentId::from(id.as_str())],
        None => shared.with(|r| r.active_incidents().map(|a| a.id.clone()).collect())?,
    };

    let mut report = Vec::with_capacity(targets.len());
    for id in &targets {
        let routes = shared.routes_to_incident_id(id)?;
        let polylines = shared.with(|r| {
            routes
                .iter()
                .map(|route| r.graph().path_positions(&route.nodes))
                .collect::<Vec<_>>()
        })?;
        report.push(json!({
            "incident":  id,
            "routes":    routes,
            "polylines": polylines,
        }));
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
