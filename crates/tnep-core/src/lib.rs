//! # tnep-core: Transmission Network Design Core
//!
//! Data structures for designing a transmission network that connects power
//! stations (generation) to cities (demand).
//!
//! ## Design Philosophy
//!
//! - **Nodes** are stations or cities placed on a plane. Power is signed:
//!   stations carry a non-negative generation capacity, cities a non-positive
//!   value whose magnitude is their demand.
//! - **Links** are candidate corridors between two distinct nodes. They are
//!   produced wholesale by the [`topology`] generator for a given maximum
//!   length and are never mutated afterwards.
//!
//! A [`Grid`] is validated once at construction. The only sanctioned
//! modification is [`Grid::with_station_outage`], which returns a private copy.
//!
//! ## Quick Start
//!
//! ```
//! use tnep_core::*;
//!
//! let grid = Grid::new(vec![
//!     Node::station(NodeId::new(0), 0.0, 0.0, Megawatts(100.0)),
//!     Node::station(NodeId::new(1), 10.0, 0.0, Megawatts(100.0)),
//!     Node::city(NodeId::new(2), 5.0, 0.0, Megawatts(150.0)),
//! ])?;
//!
//! let links = generate_links(&grid, Some(Kilometers(20.0)), &LineParams::default());
//! assert_eq!(links.len(), 3);
//! # Ok::<(), TnepError>(())
//! ```
//!
//! ## Modules
//!
//! - [`topology`] - candidate link generation and graph analysis
//! - [`diagnostics`] - non-fatal findings about input data
//! - [`units`] - MW / km newtypes

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod topology;
pub mod units;

pub use diagnostics::{diagnose_grid, DiagnosticIssue, Diagnostics, Severity};
pub use error::{TnepError, TnepResult};
pub use topology::{
    export_graph, find_islands, generate_links, graph_stats, GraphStats, Island, LinkSet,
};
pub use units::{Kilometers, Megawatts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(usize);

impl NodeId {
    #[inline]
    pub fn new(value: usize) -> Self {
        NodeId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl LinkId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LinkId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Planar coordinates in km.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Position) -> Kilometers {
        Kilometers((self.x - other.x).hypot(self.y - other.y))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Station,
    City,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Station => "station",
            NodeKind::City => "city",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generation or demand point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    /// Signed power: generation ceiling for stations (>= 0), negative demand for cities (<= 0)
    pub power: Megawatts,
}

impl Node {
    /// Station with the given generation capacity.
    pub fn station(id: NodeId, x: f64, y: f64, capacity: Megawatts) -> Self {
        Self {
            id,
            kind: NodeKind::Station,
            position: Position::new(x, y),
            power: capacity,
        }
    }

    /// City with the given demand magnitude, stored as negative power.
    pub fn city(id: NodeId, x: f64, y: f64, demand: Megawatts) -> Self {
        Self {
            id,
            kind: NodeKind::City,
            position: Position::new(x, y),
            power: -demand,
        }
    }

    #[inline]
    pub fn is_station(&self) -> bool {
        self.kind == NodeKind::Station
    }

    #[inline]
    pub fn is_city(&self) -> bool {
        self.kind == NodeKind::City
    }

    /// Generation ceiling (zero for cities).
    pub fn capacity(&self) -> Megawatts {
        if self.is_station() {
            self.power
        } else {
            Megawatts::ZERO
        }
    }

    /// Demand magnitude (zero for stations).
    pub fn demand(&self) -> Megawatts {
        if self.is_city() {
            -self.power
        } else {
            Megawatts::ZERO
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.id)
    }

    fn validate(&self) -> TnepResult<()> {
        if !self.position.is_finite() {
            return Err(TnepError::Validation(format!(
                "{} has non-finite coordinates",
                self.label()
            )));
        }
        if !self.power.is_finite() {
            return Err(TnepError::Validation(format!(
                "{} has non-finite power",
                self.label()
            )));
        }
        match self.kind {
            NodeKind::Station if self.power.value() < 0.0 => Err(TnepError::Validation(format!(
                "{} has negative generation capacity {}",
                self.label(),
                self.power
            ))),
            NodeKind::City if self.power.value() > 0.0 => Err(TnepError::Validation(format!(
                "{} has positive power {} (demand must be stored as negative)",
                self.label(),
                self.power
            ))),
            _ => Ok(()),
        }
    }
}

/// Fixed per-line technical and economic constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineParams {
    /// Transfer capacity of one built line
    pub capacity: Megawatts,
    /// Construction cost per km of one built line
    pub cost_per_km: f64,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            capacity: Megawatts(1000.0),
            cost_per_km: 1e6,
        }
    }
}

impl LineParams {
    pub fn validate(&self) -> TnepResult<()> {
        if !(self.capacity.is_finite() && self.capacity.value() > 0.0) {
            return Err(TnepError::Config(format!(
                "line capacity must be positive, got {}",
                self.capacity
            )));
        }
        if !(self.cost_per_km.is_finite() && self.cost_per_km >= 0.0) {
            return Err(TnepError::Config(format!(
                "cost per km must be non-negative, got {}",
                self.cost_per_km
            )));
        }
        Ok(())
    }
}

/// A candidate corridor between two distinct nodes (`from < to`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    pub distance: Kilometers,
    /// Capacity of a single built line
    pub capacity: Megawatts,
    pub cost_per_km: f64,
}

impl Link {
    /// Whether `node` is one of the endpoints.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.from == node {
            Some(self.to)
        } else if self.to == node {
            Some(self.from)
        } else {
            None
        }
    }

    /// Cost of building one line on this corridor.
    pub fn cost_per_circuit(&self) -> f64 {
        self.distance.value() * self.cost_per_km
    }
}

/// Validated, ordered list of nodes.
///
/// Node ids are dense and equal to their position in the list, so lookups
/// are by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    nodes: Vec<Node>,
}

impl Grid {
    pub fn new(nodes: Vec<Node>) -> TnepResult<Self> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id.value() != index {
                return Err(TnepError::Validation(format!(
                    "node ids must be assigned in load order: position {} holds id {}",
                    index, node.id
                )));
            }
            node.validate()?;
        }
        Ok(Self { nodes })
    }

    /// Build from raw `(x, y, capacity)` station and `(x, y, demand)` city
    /// records, assigning ids stations first then cities.
    pub fn from_records(stations: &[(f64, f64, f64)], cities: &[(f64, f64, f64)]) -> TnepResult<Self> {
        let mut nodes = Vec::with_capacity(stations.len() + cities.len());
        for &(x, y, capacity) in stations {
            nodes.push(Node::station(NodeId::new(nodes.len()), x, y, Megawatts(capacity)));
        }
        for &(x, y, demand) in cities {
            nodes.push(Node::city(NodeId::new(nodes.len()), x, y, Megawatts(demand)));
        }
        Self::new(nodes)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.value())
    }

    pub fn stations(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_station())
    }

    pub fn cities(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_city())
    }

    pub fn total_capacity(&self) -> Megawatts {
        self.stations().map(|n| n.capacity()).sum()
    }

    pub fn total_demand(&self) -> Megawatts {
        self.cities().map(|n| n.demand()).sum()
    }

    /// Copy of this grid with one station's generation forced to zero.
    pub fn with_station_outage(&self, station: NodeId) -> TnepResult<Grid> {
        match self.node(station) {
            Some(node) if node.is_station() => {}
            Some(node) => {
                return Err(TnepError::Validation(format!(
                    "cannot take {} out of service: not a station",
                    node.label()
                )))
            }
            None => {
                return Err(TnepError::Validation(format!(
                    "unknown node id {}",
                    station
                )))
            }
        }
        let mut nodes = self.nodes.clone();
        nodes[station.value()].power = Megawatts::ZERO;
        Ok(Grid { nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_node_grid() -> Grid {
        Grid::from_records(&[(0.0, 0.0, 100.0), (10.0, 0.0, 100.0)], &[(5.0, 0.0, 150.0)])
            .expect("valid grid")
    }

    #[test]
    fn test_city_stores_negative_power() {
        let city = Node::city(NodeId::new(0), 1.0, 2.0, Megawatts(250.0));
        assert_eq!(city.power, Megawatts(-250.0));
        assert_eq!(city.demand(), Megawatts(250.0));
        assert_eq!(city.capacity(), Megawatts::ZERO);
    }

    #[test]
    fn test_from_records_assigns_ids_stations_first() {
        let grid = three_node_grid();
        assert_eq!(grid.len(), 3);
        assert!(grid.node(NodeId::new(0)).unwrap().is_station());
        assert!(grid.node(NodeId::new(1)).unwrap().is_station());
        assert!(grid.node(NodeId::new(2)).unwrap().is_city());
        assert_eq!(grid.total_capacity(), Megawatts(200.0));
        assert_eq!(grid.total_demand(), Megawatts(150.0));
    }

    #[test]
    fn test_rejects_out_of_order_ids() {
        let err = Grid::new(vec![Node::station(NodeId::new(1), 0.0, 0.0, Megawatts(1.0))])
            .unwrap_err();
        assert!(matches!(err, TnepError::Validation(_)));
    }

    #[test]
    fn test_rejects_negative_station_capacity() {
        let err = Grid::from_records(&[(0.0, 0.0, -5.0)], &[]).unwrap_err();
        assert!(err.to_string().contains("negative generation capacity"));
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        assert!(Grid::from_records(&[(f64::NAN, 0.0, 5.0)], &[]).is_err());
    }

    #[test]
    fn test_station_outage_copies_grid() {
        let grid = three_node_grid();
        let outaged = grid.with_station_outage(NodeId::new(0)).unwrap();

        assert_eq!(outaged.node(NodeId::new(0)).unwrap().power, Megawatts::ZERO);
        assert_eq!(grid.node(NodeId::new(0)).unwrap().power, Megawatts(100.0));
        assert_eq!(outaged.total_capacity(), Megawatts(100.0));
    }

    #[test]
    fn test_station_outage_rejects_city() {
        let grid = three_node_grid();
        assert!(grid.with_station_outage(NodeId::new(2)).is_err());
        assert!(grid.with_station_outage(NodeId::new(9)).is_err());
    }

    #[test]
    fn test_link_endpoints() {
        let link = Link {
            id: LinkId::new(0),
            from: NodeId::new(1),
            to: NodeId::new(4),
            distance: Kilometers(10.0),
            capacity: Megawatts(1000.0),
            cost_per_km: 2.0,
        };
        assert!(link.touches(NodeId::new(4)));
        assert_eq!(link.other_end(NodeId::new(1)), Some(NodeId::new(4)));
        assert_eq!(link.other_end(NodeId::new(2)), None);
        assert_eq!(link.cost_per_circuit(), 20.0);
    }

    #[test]
    fn test_line_params_validation() {
        assert!(LineParams::default().validate().is_ok());
        let params = LineParams {
            capacity: Megawatts(0.0),
            ..LineParams::default()
        };
        assert!(params.validate().is_err());
    }
}
