use std::collections::HashMap;

use log::{info, warn};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{self, Incoming, Outgoing};

use p0_relationship_units as p0;
use p1_layering as p1;
use p2_reduce_crossings as p2;
use p3_calculate_coordinates as p3;
use p4_compression as p4;

use crate::configure::Config;
use crate::graph::{FamilyGraph, PersonId};
use crate::Layout;

mod p0_relationship_units;
mod p1_layering;
mod p2_reduce_crossings;
mod p3_calculate_coordinates;
mod p4_compression;

/// A relationship unit: people connected through partner edges, laid out as
/// one rigid block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unit {
    members: Vec<PersonId>,
    /// -1 until a generation was assigned
    generation: i32,
    local: Vec<(PersonId, (isize, isize))>,
    width: usize,
    height: usize,
    /// tracked parents of the members, in discovery order
    parent_persons: Vec<PersonId>,
    x: isize,
    y: isize,
}

impl Unit {
    fn new(members: Vec<PersonId>, local: Vec<(PersonId, (isize, isize))>, width: usize, height: usize) -> Self {
        Self {
            members,
            generation: -1,
            local,
            width,
            height,
            parent_persons: Vec::new(),
            x: 0,
            y: 0,
        }
    }

    #[cfg(test)]
    fn new_test(width: usize, height: usize, generation: i32) -> Self {
        Self {
            generation,
            ..Self::new(Vec::new(), Vec::new(), width, height)
        }
    }

    /// Global cells of all members.
    fn cells(&self) -> impl Iterator<Item = (PersonId, (isize, isize))> + '_ {
        self.local
            .iter()
            .map(move |(p, (lx, ly))| (*p, (self.x + lx, self.y + ly)))
    }
}

/// Parent to child relation between two units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    /// number of person level parent links that induce this edge
    links: usize,
}

impl Default for Edge {
    fn default() -> Self {
        Self { links: 1 }
    }
}

/// Represents the vertical direction in which a pass is run
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum VDir {
    Up,
    Down,
}

pub(super) fn start<G: FamilyGraph>(family: &G, config: &Config) -> Layout {
    info!(target: "layout", "Start layout with config {config:?}");
    let (mut graph, person_units) = p0::build_units(family);
    if graph.node_count() == 0 {
        return Layout::default();
    }
    p1::build_unit_graph(family, &mut graph, &person_units);
    let unreached = p1::assign_generations(&mut graph);

    let order = p2::ordering(&graph, config.max_iterations, config.transpose);
    p3::merge(&mut graph, &order, config.unit_spacing);
    if config.compress {
        p4::compress(&mut graph, &order, config.unit_spacing);
    }

    let (coordinates, width, height) = p3::collect_coordinates(&graph);
    let mut unreached = unreached
        .into_iter()
        .flat_map(|u| graph[u].members.iter().copied())
        .collect::<Vec<_>>();
    unreached.sort_unstable();
    if !unreached.is_empty() {
        warn!(target: "layout",
            "{} people are in units whose parent links form a cycle, placed in generation 0", unreached.len());
    }

    Layout {
        coordinates,
        width,
        height,
        unreached,
    }
}

/// Units directly related to `unit` in the given direction, sorted by index.
fn related_units(graph: &StableDiGraph<Unit, Edge>, unit: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
    let mut related = graph.neighbors_directed(unit, direction).collect::<Vec<_>>();
    related.sort();
    related.dedup();
    related
}

/// Parent units that are in a strictly lower generation.
fn upper_neighbours(graph: &StableDiGraph<Unit, Edge>, unit: NodeIndex) -> Vec<NodeIndex> {
    let generation = graph[unit].generation;
    related_units(graph, unit, Incoming)
        .into_iter()
        .filter(|p| graph[*p].generation < generation)
        .collect()
}

/// Child units that are in a strictly higher generation.
fn lower_neighbours(graph: &StableDiGraph<Unit, Edge>, unit: NodeIndex) -> Vec<NodeIndex> {
    let generation = graph[unit].generation;
    related_units(graph, unit, Outgoing)
        .into_iter()
        .filter(|c| graph[*c].generation > generation)
        .collect()
}

/// Sum of person level links over all edges in `direction`.
fn link_count(graph: &StableDiGraph<Unit, Edge>, unit: NodeIndex, direction: Direction) -> usize {
    graph
        .edges_directed(unit, direction)
        .map(|e| e.weight().links)
        .sum()
}

fn person_cells(graph: &StableDiGraph<Unit, Edge>) -> HashMap<PersonId, (isize, isize)> {
    graph.node_weights().flat_map(|u| u.cells()).collect()
}
