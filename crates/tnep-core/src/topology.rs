//! Candidate topology generation and graph analysis.
//!
//! [`generate_links`] performs an exhaustive pairwise scan (quadratic in the
//! node count, fine for tens of nodes) and keeps every pair within the
//! distance threshold. The resulting [`LinkSet`] is immutable; raising the
//! threshold means generating a new set.

use crate::{Grid, Kilometers, LineParams, Link, LinkId, Megawatts, NodeId};
use anyhow::{anyhow, Result};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use serde::Serialize;
use std::collections::HashSet;

/// Candidate links produced for one distance threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSet {
    links: Vec<Link>,
    max_distance: Option<Kilometers>,
}

impl LinkSet {
    /// Threshold this set was generated with (`None` = complete graph).
    pub fn max_distance(&self) -> Option<Kilometers> {
        self.max_distance
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.value())
    }

    /// Links with `node` as an endpoint.
    pub fn incident(&self, node: NodeId) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.touches(node))
    }

    pub fn contains_pair(&self, a: NodeId, b: NodeId) -> bool {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.links.iter().any(|l| l.from == lo && l.to == hi)
    }

    /// Unordered endpoint pairs, normalised as `(min, max)`.
    pub fn pairs(&self) -> HashSet<(NodeId, NodeId)> {
        self.links.iter().map(|l| (l.from, l.to)).collect()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

/// Generate every unordered node pair whose Euclidean distance is within
/// `max_distance` (inclusive). `None` yields the complete graph.
///
/// Links are numbered in scan order `(0,1), (0,2), …, (1,2), …` and always
/// stored with `from < to`.
pub fn generate_links(grid: &Grid, max_distance: Option<Kilometers>, params: &LineParams) -> LinkSet {
    let nodes = grid.nodes();
    let mut links = Vec::new();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            let distance = a.position.distance_to(&b.position);
            if let Some(limit) = max_distance {
                if distance > limit {
                    continue;
                }
            }
            links.push(Link {
                id: LinkId::new(links.len()),
                from: a.id,
                to: b.id,
                distance,
                capacity: params.capacity,
                cost_per_km: params.cost_per_km,
            });
        }
    }
    LinkSet {
        links,
        max_distance,
    }
}

/// Summary statistics of a link graph (density, degrees, components).
#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// A connected group of nodes in a built network.
#[derive(Debug, Clone, Serialize)]
pub struct Island {
    pub island_id: usize,
    pub members: Vec<NodeId>,
    pub capacity: Megawatts,
    pub demand: Megawatts,
}

impl Island {
    /// Demand in this island cannot be served from inside it.
    pub fn is_short(&self) -> bool {
        self.demand.value() > self.capacity.value() + 1e-9
    }
}

fn build_graph<'a>(grid: &Grid, links: impl IntoIterator<Item = &'a Link>) -> UnGraph<NodeId, LinkId> {
    let mut graph = UnGraph::with_capacity(grid.len(), 0);
    for node in grid.nodes() {
        graph.add_node(node.id);
    }
    for link in links {
        graph.add_edge(
            NodeIndex::new(link.from.value()),
            NodeIndex::new(link.to.value()),
            link.id,
        );
    }
    graph
}

pub fn graph_stats<'a>(grid: &Grid, links: impl IntoIterator<Item = &'a Link>) -> GraphStats {
    let graph = build_graph(grid, links);
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let degrees: Vec<usize> = graph.node_indices().map(|n| graph.edges(n).count()).collect();
    let n = node_count as f64;
    // each edge adds one to the degree of both endpoints
    let avg_degree = if node_count > 0 { 2.0 * edge_count as f64 / n } else { 0.0 };
    let density = if node_count > 1 { avg_degree / (n - 1.0) } else { 0.0 };
    GraphStats {
        node_count,
        edge_count,
        connected_components: connected_components(&graph),
        min_degree: degrees.iter().copied().min().unwrap_or(0),
        avg_degree,
        max_degree: degrees.iter().copied().max().unwrap_or(0),
        density,
    }
}

/// Split the graph spanned by `links` into connected groups with their
/// supply and demand totals. Islands are ordered by their lowest node id.
pub fn find_islands<'a>(grid: &Grid, links: impl IntoIterator<Item = &'a Link>) -> Vec<Island> {
    let graph = build_graph(grid, links);
    let mut seen = vec![false; graph.node_count()];
    let mut islands = Vec::new();
    for start in graph.node_indices() {
        if seen[start.index()] {
            continue;
        }
        let mut members = Vec::new();
        let mut bfs = Bfs::new(&graph, start);
        while let Some(ix) = bfs.next(&graph) {
            seen[ix.index()] = true;
            members.push(graph[ix]);
        }
        members.sort();
        let nodes = members.iter().filter_map(|id| grid.node(*id));
        let capacity: Megawatts = nodes.clone().map(|n| n.capacity()).sum();
        let demand: Megawatts = nodes.map(|n| n.demand()).sum();
        islands.push(Island {
            island_id: islands.len(),
            members,
            capacity,
            demand,
        });
    }
    islands
}

/// Export a link graph as Graphviz DOT.
pub fn export_graph<'a>(
    grid: &Grid,
    links: impl IntoIterator<Item = &'a Link>,
    format: &str,
) -> Result<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(grid, links)),
        other => Err(anyhow!("unsupported graph export format '{other}'")),
    }
}

fn render_dot<'a>(grid: &Grid, links: impl IntoIterator<Item = &'a Link>) -> String {
    let graph = build_graph(grid, links);
    let mut buffer = String::new();
    buffer.push_str("graph tnep_network {\n");
    for node in grid.nodes() {
        let shape = if node.is_station() { "box" } else { "ellipse" };
        buffer.push_str(&format!(
            "  n{} [label=\"{}\\n({:.0})\", shape={}, pos=\"{},{}!\"];\n",
            node.id,
            node.id,
            node.power.value(),
            shape,
            node.position.x,
            node.position.y
        ));
    }
    for edge in graph.edge_references() {
        let source = edge.source().index();
        let target = edge.target().index();
        buffer.push_str(&format!("  n{source} -- n{target};\n"));
    }
    buffer.push('}');
    buffer
}
