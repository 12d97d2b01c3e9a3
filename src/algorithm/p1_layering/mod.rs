//! Builds the unit DAG and assigns every unit a generation, the row it is
//! drawn in.
//!
//! Generations are assigned in topological order (Kahn's algorithm), a unit
//! ends up one generation below its lowest parent unit. Parent links may
//! contain cycles, units on or below a cycle are never reached by the
//! topological sweep. A cycle may exist only between units, e.g. when a
//! person is the partner of their own parent and both end up in one unit. They are put into generation 0 and reported back to
//! the caller.
mod unit_graph;

use std::collections::{HashMap, VecDeque};

use log::{debug, info, warn};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction::{Incoming, Outgoing};

pub(super) use self::unit_graph::build_unit_graph;

use super::{Edge, Unit};

/// Assigns the generation of every unit and returns the units that could not
/// be reached because of cyclic parentage.
pub(super) fn assign_generations(graph: &mut StableDiGraph<Unit, Edge>) -> Vec<NodeIndex> {
    info!(target: "layering", "Assigning generations");
    let mut in_degree: HashMap<NodeIndex, usize> = graph.node_indices().map(|v| (v, 0)).collect();
    for v in graph.node_indices() {
        for child in graph.neighbors_directed(v, Outgoing) {
            if let Some(d) = in_degree.get_mut(&child) {
                *d += 1;
            }
        }
    }

    let mut queue = graph
        .node_indices()
        .filter(|v| in_degree[v] == 0)
        .collect::<VecDeque<_>>();

    while let Some(v) = queue.pop_front() {
        // parents still at -1 have not been processed
        let generation = graph
            .neighbors_directed(v, Incoming)
            .map(|p| graph[p].generation)
            .filter(|g| *g >= 0)
            .map(|g| g + 1)
            .max()
            .unwrap_or(0);
        graph[v].generation = generation;

        let mut children = graph.neighbors_directed(v, Outgoing).collect::<Vec<_>>();
        children.sort();
        for child in children {
            if let Some(d) = in_degree.get_mut(&child) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(child);
                }
            }
        }
    }

    let unreached = graph
        .node_indices()
        .filter(|v| graph[*v].generation < 0)
        .collect::<Vec<_>>();
    for v in &unreached {
        graph[*v].generation = 0;
    }
    if !unreached.is_empty() {
        warn!(target: "layering",
            "{} units could not be reached, parent links between units form a cycle", unreached.len());
    }

    debug!(target: "layering",
        "{} generations", graph.node_weights().map(|u| u.generation + 1).max().unwrap_or(0));
    unreached
}
