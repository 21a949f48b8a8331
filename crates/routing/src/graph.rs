//! Road network graph and A* search.
//!
//! Every road vertex becomes a node; vertices shared by several roads (same
//! position to six decimals) are merged so routes can switch roads there.

use grvlfinder_geo::{haversine_distance_meters, nearest_within, Coordinate};
use grvlfinder_scoring::Road;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::debug;

/// How edges are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeWeighting {
    /// Length divided by `max(1, (score + 30) / 30)`, so well-scored roads look shorter
    #[default]
    ScoreWeighted,
    /// Plain length in meters
    Distance,
}

impl EdgeWeighting {
    /// Divisor applied to the length of a road with `score`
    fn factor(self, score: i32) -> f64 {
        match self {
            EdgeWeighting::ScoreWeighted => ((f64::from(score) + 30.0) / 30.0).max(1.0),
            EdgeWeighting::Distance => 1.0,
        }
    }

    fn weight(self, distance_m: f64, score: i32) -> f64 {
        distance_m / self.factor(score)
    }
}

/// Undirected road network.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    graph: UnGraph<Coordinate, f64>,
    index: HashMap<String, NodeIndex>,
    /// Largest length divisor of any edge; keeps the A* heuristic admissible
    max_factor: f64,
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self {
            graph: UnGraph::default(),
            index: HashMap::new(),
            max_factor: 1.0,
        }
    }
}

impl RoadGraph {
    /// Build the network from road geometries.
    #[must_use]
    pub fn build(roads: &[Road], weighting: EdgeWeighting) -> Self {
        let mut graph = Self::default();

        for road in roads {
            for pair in road.points.windows(2) {
                let a = graph.node_for(pair[0]);
                let b = graph.node_for(pair[1]);
                if a == b {
                    continue;
                }
                let distance = haversine_distance_meters(&pair[0], &pair[1]);
                graph.max_factor = graph.max_factor.max(weighting.factor(road.score));
                graph
                    .graph
                    .add_edge(a, b, weighting.weight(distance, road.score));
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ?weighting,
            "Road graph built"
        );
        graph
    }

    fn node_for(&mut self, point: Coordinate) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .index
            .entry(point.node_key())
            .or_insert_with(|| graph.add_node(point))
    }

    /// Number of distinct road vertices.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of road segments.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when no road contributed a segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Position of a node.
    #[must_use]
    pub fn position(&self, node: NodeIndex) -> Option<Coordinate> {
        self.graph.node_weight(node).copied()
    }

    /// Closest node strictly nearer than `max_m` meters to `point`.
    #[must_use]
    pub fn nearest_node(&self, point: &Coordinate, max_m: f64) -> Option<NodeIndex> {
        let positions: Vec<Coordinate> = self.graph.node_weights().copied().collect();
        nearest_within(point, &positions, max_m).map(|hit| NodeIndex::new(hit.index))
    }

    /// Cheapest path from `from` to `to` as node positions, both ends included.
    ///
    /// The heuristic is the straight-line distance to `to` divided by the largest
    /// score factor in the graph, so it never exceeds the true remaining cost. Gives
    /// up with `None` after `max_expansions` nodes have been expanded.
    #[must_use]
    pub fn astar(&self, from: NodeIndex, to: NodeIndex, max_expansions: usize) -> Option<Vec<Coordinate>> {
        let goal = self.position(to)?;
        let heuristic = |node: NodeIndex| {
            self.position(node)
                .map_or(f64::INFINITY, |p| haversine_distance_meters(&p, &goal) / self.max_factor)
        };

        let mut open = BinaryHeap::new();
        let mut cost: HashMap<NodeIndex, f64> = HashMap::from([(from, 0.0)]);
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut closed: HashSet<NodeIndex> = HashSet::new();
        let mut expansions = 0;

        open.push(Frontier {
            estimate: heuristic(from),
            node: from,
        });

        while let Some(Frontier { node, .. }) = open.pop() {
            if closed.contains(&node) {
                continue;
            }
            if expansions >= max_expansions {
                break;
            }
            expansions += 1;

            if node == to {
                debug!(expansions, "Path found");
                return Some(self.reconstruct(&parent, to));
            }
            closed.insert(node);

            let here = cost.get(&node).copied().unwrap_or(f64::INFINITY);
            for edge in self.graph.edges(node) {
                let next = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                if closed.contains(&next) {
                    continue;
                }

                let tentative = here + edge.weight();
                if cost.get(&next).is_none_or(|&known| tentative < known) {
                    cost.insert(next, tentative);
                    parent.insert(next, node);
                    open.push(Frontier {
                        estimate: tentative + heuristic(next),
                        node: next,
                    });
                }
            }
        }

        debug!(expansions, "No path found");
        None
    }

    fn reconstruct(&self, parent: &HashMap<NodeIndex, NodeIndex>, to: NodeIndex) -> Vec<Coordinate> {
        let mut nodes = vec![to];
        let mut current = to;
        while let Some(&previous) = parent.get(&current) {
            nodes.push(previous);
            current = previous;
        }
        nodes.reverse();
        nodes.into_iter().filter_map(|n| self.position(n)).collect()
    }
}

/// Open-set entry, ordered so the heap pops the lowest estimate first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    estimate: f64,
    node: NodeIndex,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
