//! Removes the whitespace left by the merged grid.
//!
//! Units are centered below their parents and then above their children,
//! keeping the order of every row. Afterwards units are pulled up as long as
//! they stay below their parents and hit no other person.

use std::collections::HashSet;

use log::{debug, info, trace};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction::{Incoming, Outgoing};

use crate::util::{self, IterDir};

use super::{
    link_count, lower_neighbours, p2_reduce_crossings::Order, person_cells, upper_neighbours, Edge,
    Unit, VDir,
};

pub(super) fn compress(graph: &mut StableDiGraph<Unit, Edge>, order: &Order, unit_spacing: usize) {
    info!(target: "compression", "Compressing layout");
    center(graph, order, VDir::Down, unit_spacing);
    center(graph, order, VDir::Up, unit_spacing);
    compress_vertically(graph, order);
}

/// Consecutive units of a row that are placed next to each other.
#[derive(Debug, Clone, Copy)]
struct Block {
    first: usize,
    len: usize,
    span: isize,
    weight: f64,
    /// sum of weight * implied start of the block over all units
    weighted_start: f64,
}

impl Block {
    fn start(&self) -> f64 {
        self.weighted_start / self.weight
    }

    fn absorb(&mut self, other: Block) {
        self.weighted_start += other.weighted_start - other.weight * self.span as f64;
        self.weight += other.weight;
        self.span += other.span;
        self.len += other.len;
    }
}

fn round_half_up(v: f64) -> isize {
    (v + 0.5).floor() as isize
}

/// Left x at which `unit` is centered on the units it is related to in
/// direction `dir`, `None` if there are none.
fn ideal_x(graph: &StableDiGraph<Unit, Edge>, unit: NodeIndex, dir: VDir) -> Option<f64> {
    let related = match dir {
        VDir::Down => upper_neighbours(graph, unit),
        VDir::Up => lower_neighbours(graph, unit),
    };
    let min = related.iter().map(|r| graph[*r].x).min()?;
    let max = related
        .iter()
        .map(|r| graph[*r].x + graph[*r].width as isize - 1)
        .max()?;
    let center = round_half_up((min + max) as f64 / 2.);
    Some(center as f64 - (graph[unit].width as f64 - 1.) / 2.)
}

/// Shifts whole units horizontally towards their parents (`Down`) or
/// children (`Up`). Units that would overlap are grouped into blocks placed
/// at the weighted average of their members' targets.
fn center(graph: &mut StableDiGraph<Unit, Edge>, order: &Order, dir: VDir, unit_spacing: usize) {
    debug!(target: "compression", "Centering units, direction: {dir:?}");
    for rank in util::iterate(IterDir::from(dir), order.len()) {
        // row 0 has no parents to be centered on
        if dir == VDir::Down && rank == 0 {
            continue;
        }
        let row = &order[rank];
        let mut blocks: Vec<Block> = Vec::new();
        for (i, v) in row.iter().enumerate() {
            let ideal = ideal_x(graph, *v, dir).unwrap_or(match dir {
                VDir::Down => 0.,
                VDir::Up => graph[*v].x as f64,
            });
            let links = match dir {
                VDir::Down => link_count(graph, *v, Incoming),
                VDir::Up => link_count(graph, *v, Outgoing),
            };
            let weight = (links + 1) as f64;
            let mut block = Block {
                first: i,
                len: 1,
                span: (graph[*v].width + unit_spacing) as isize,
                weight,
                weighted_start: weight * ideal,
            };
            while let Some(prev) = blocks.last() {
                if block.start() >= prev.start() + prev.span as f64 {
                    break;
                }
                let mut merged = *prev;
                merged.absorb(block);
                block = merged;
                blocks.pop();
            }
            blocks.push(block);
        }

        let mut prev_end = isize::MIN;
        for block in blocks {
            let mut x = round_half_up(block.start()).max(prev_end);
            for v in &row[block.first..block.first + block.len] {
                trace!(target: "compression",
                    "unit {:?}: x {} -> {x}", graph[*v].members, graph[*v].x);
                graph[*v].x = x;
                x += (graph[*v].width + unit_spacing) as isize;
            }
            prev_end = x;
        }
    }
}

/// Pulls units up, generation by generation, as long as every member stays
/// below all parents of the unit and lands on a free cell.
fn compress_vertically(graph: &mut StableDiGraph<Unit, Edge>, order: &Order) {
    debug!(target: "compression", "Compressing vertically");
    let mut cells = person_cells(graph);
    let mut occupied = cells.values().copied().collect::<HashSet<_>>();

    for row in order.iter() {
        for v in row {
            let own = graph[*v].cells().map(|(_, c)| c).collect::<Vec<_>>();
            let Some(top) = own.iter().map(|(_, y)| *y).min() else {
                continue;
            };
            let ceiling = graph[*v]
                .parent_persons
                .iter()
                .filter_map(|p| cells.get(p))
                .map(|(_, y)| *y)
                .max()
                .unwrap_or(-1);
            let limit = top - ceiling - 1;

            for c in &own {
                occupied.remove(c);
            }
            let mut shift = 0;
            while shift < limit
                && own
                    .iter()
                    .all(|(x, y)| !occupied.contains(&(*x, *y - shift - 1)))
            {
                shift += 1;
            }

            if shift > 0 {
                trace!(target: "compression", "unit {:?} moves up by {shift}", graph[*v].members);
                graph[*v].y -= shift;
            }
            for (person, c) in graph[*v].cells() {
                occupied.insert(c);
                cells.insert(person, c);
            }
        }
    }
}
