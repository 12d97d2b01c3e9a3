//! Partitions people into relationship units, the groups of people connected
//! through partner edges, and lays out every unit locally.
mod local_layout;

use std::collections::HashMap;

use log::{debug, info, trace};
use petgraph::graphmap::UnGraphMap;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::Bfs;

use crate::graph::{FamilyGraph, PersonId};

use super::{Edge, Unit};

/// Creates one unit per partner-connected cluster. Units are added in the
/// order of their lowest member id, so unit indices are stable across runs.
pub(super) fn build_units<G: FamilyGraph>(
    family: &G,
) -> (StableDiGraph<Unit, Edge>, HashMap<PersonId, NodeIndex>) {
    info!(target: "relationship_units", "Partitioning people into relationship units");
    let partners = partner_graph(family);
    let mut graph = StableDiGraph::new();
    let mut person_units = HashMap::new();

    for person in family.people() {
        if person_units.contains_key(&person.id()) {
            continue;
        }
        let mut members = Vec::new();
        let mut bfs = Bfs::new(&partners, person.id());
        while let Some(member) = bfs.next(&partners) {
            members.push(member);
        }

        let layout = local_layout::layout(family, &members);
        trace!(target: "relationship_units",
            "unit {members:?}: {}x{}", layout.width, layout.height);
        let unit = graph.add_node(Unit::new(members, layout.cells, layout.width, layout.height));
        for member in &graph[unit].members {
            person_units.insert(*member, unit);
        }
    }

    debug!(target: "relationship_units",
        "{} people in {} units", person_units.len(), graph.node_count());
    (graph, person_units)
}

/// Undirected graph of partner edges, edge weight is `is_marriage`.
/// Relationships to people that are not in the graph are skipped.
fn partner_graph<G: FamilyGraph>(family: &G) -> UnGraphMap<PersonId, bool> {
    let mut partners = UnGraphMap::new();
    for person in family.people() {
        partners.add_node(person.id());
    }
    for relationship in family.relationships() {
        let [a, b] = relationship.people();
        if a != b && partners.contains_node(a) && partners.contains_node(b) {
            partners.add_edge(a, b, relationship.is_marriage);
        }
    }
    partners
}
