use std::collections::HashMap;

use log::{debug, info};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::graph::{FamilyGraph, PersonId};

use super::super::{Edge, Unit};

/// Adds an edge parent unit -> child unit for every parent link of every
/// member. Edges are stored once, repeated links increase their link count.
/// Parents that are not part of the graph are skipped.
pub(in crate::algorithm) fn build_unit_graph<G: FamilyGraph>(
    family: &G,
    graph: &mut StableDiGraph<Unit, Edge>,
    person_units: &HashMap<PersonId, NodeIndex>,
) {
    info!(target: "layering", "Deriving parent/child relations between units");
    for child in graph.node_indices().collect::<Vec<_>>() {
        for member in graph[child].members.clone() {
            let Some(parents) = family.parent_relationship(member) else {
                continue;
            };

            let mut parent_units = Vec::new();
            for parent in parents.people() {
                let Some(&parent_unit) = person_units.get(&parent) else {
                    continue;
                };
                if !graph[child].parent_persons.contains(&parent) {
                    graph[child].parent_persons.push(parent);
                }
                if !parent_units.contains(&parent_unit) {
                    parent_units.push(parent_unit);
                }
            }

            for parent_unit in parent_units {
                match graph.find_edge(parent_unit, child) {
                    Some(edge) => graph[edge].links += 1,
                    None => {
                        graph.add_edge(parent_unit, child, Edge::default());
                    }
                }
            }
        }
    }
    debug!(target: "layering",
        "{} units, {} parent/child relations", graph.node_count(), graph.edge_count());
}
