//! Orders the units of every generation so that parent/child edges cross as
//! little as possible.
//!
//! The initial order places every unit below the median of its parents. It is
//! then improved by alternating downward and upward weighted median sweeps,
//! each followed by a transpose pass swapping adjacent units. The order with
//! the fewest crossings seen is kept.

use std::collections::HashMap;
use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use log::{debug, info, trace};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::util::{self, radix_sort, IterDir};

use super::{lower_neighbours, upper_neighbours, Edge, Unit, VDir};

/// Units of each generation, from left to right. Rows may be shorter than
/// [Order::width], missing slots are empty.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Order {
    _inner: Vec<Vec<NodeIndex>>,
    positions: HashMap<NodeIndex, usize>,
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::new();
        for row in &self._inner {
            for c in row {
                s.push_str(&c.index().to_string());
                s.push(',')
            }
            s.push('\n');
        }
        f.write_str(&s)
    }
}

impl Order {
    pub(super) fn new(layers: Vec<Vec<NodeIndex>>) -> Self {
        let mut positions = HashMap::new();
        for l in &layers {
            for (pos, v) in l.iter().enumerate() {
                positions.insert(*v, pos);
            }
        }
        Self {
            _inner: layers,
            positions,
        }
    }

    fn max_rank(&self) -> usize {
        self.len()
    }

    /// Number of columns, the size of the largest generation.
    pub(super) fn width(&self) -> usize {
        self.iter().map(|row| row.len()).max().unwrap_or(0)
    }

    /// The unit at the given slot, `None` if the slot is empty.
    pub(super) fn slot(&self, rank: usize, column: usize) -> Option<NodeIndex> {
        self._inner.get(rank).and_then(|row| row.get(column)).copied()
    }

    pub(super) fn position(&self, unit: NodeIndex) -> Option<usize> {
        self.positions.get(&unit).copied()
    }

    fn swap_with_next(&mut self, rank: usize, column: usize) {
        self._inner[rank].swap(column, column + 1);
        let (left, right) = (self._inner[rank][column], self._inner[rank][column + 1]);
        self.positions.insert(left, column);
        self.positions.insert(right, column + 1);
    }

    fn neighbour_positions(&self, neighbours: &[NodeIndex]) -> Vec<usize> {
        neighbours.iter().filter_map(|n| self.position(*n)).collect()
    }

    pub(super) fn crossings(&self, graph: &StableDiGraph<Unit, Edge>) -> usize {
        let mut cross_count = 0;
        for rank in 0..self.max_rank() {
            cross_count += self.bilayer_cross_count(graph, rank);
        }
        cross_count
    }

    /// Crossings between the edges going from `rank` to its child units in
    /// `rank + 1`.
    fn bilayer_cross_count(&self, graph: &StableDiGraph<Unit, Edge>, rank: usize) -> usize {
        let south_len = self.width();
        let mut len = south_len;
        let mut key_length = 0;
        while len > 0 {
            len /= 10;
            key_length += 1;
        }
        // endpoints ordered by source, then by target position
        let edge_endpoint_positions = self[rank]
            .iter()
            .flat_map(|v| {
                radix_sort(
                    self.neighbour_positions(&adjacent_neighbours(graph, *v, VDir::Down)),
                    key_length,
                )
            })
            .collect::<Vec<_>>();

        Self::count_crossings(edge_endpoint_positions, south_len)
    }

    fn count_crossings(endpoints: Vec<usize>, south_len: usize) -> usize {
        // build the accumulator tree
        let mut c = 0;
        while 1 << c < south_len {
            c += 1
        }
        let tree_size = (1 << (c + 1)) - 1;
        let first_index = (1 << c) - 1;
        let mut tree = vec![0; tree_size];

        let mut cross_count = 0;

        // traverse through the positions and adjust tree nodes
        for pos in endpoints {
            let mut index = pos + first_index;
            tree[index] += 1;
            while index > 0 {
                // traverse up the tree, incrementing the nodes of the tree
                // each time we visit them.
                //
                // When visiting a left node, add the value of the node on the right to
                // the cross count;
                if index % 2 == 1 {
                    cross_count += tree[index + 1]
                }
                index = (index - 1) / 2;
                tree[index] += 1;
            }
        }
        cross_count
    }

    /// Crossings between the edges of `left` and `right`, if `left` is placed
    /// directly before `right`. Counts the edges to parents and children.
    fn crossing_pair(&self, graph: &StableDiGraph<Unit, Edge>, left: NodeIndex, right: NodeIndex) -> usize {
        let inversions = |a: Vec<usize>, b: Vec<usize>| {
            a.iter()
                .map(|pa| b.iter().filter(|pb| pa > pb).count())
                .sum::<usize>()
        };
        [VDir::Up, VDir::Down]
            .into_iter()
            .map(|dir| {
                inversions(
                    self.neighbour_positions(&adjacent_neighbours(graph, left, dir)),
                    self.neighbour_positions(&adjacent_neighbours(graph, right, dir)),
                )
            })
            .sum()
    }
}

impl Deref for Order {
    type Target = Vec<Vec<NodeIndex>>;

    fn deref(&self) -> &Self::Target {
        &self._inner
    }
}

impl DerefMut for Order {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self._inner
    }
}

/// Neighbours in the generation directly above (`Up`) or below (`Down`).
fn adjacent_neighbours(graph: &StableDiGraph<Unit, Edge>, unit: NodeIndex, dir: VDir) -> Vec<NodeIndex> {
    let generation = graph[unit].generation;
    match dir {
        VDir::Up => upper_neighbours(graph, unit)
            .into_iter()
            .filter(|p| graph[*p].generation == generation - 1)
            .collect(),
        VDir::Down => lower_neighbours(graph, unit)
            .into_iter()
            .filter(|c| graph[*c].generation == generation + 1)
            .collect(),
    }
}

pub(super) fn ordering(graph: &StableDiGraph<Unit, Edge>, max_iterations: usize, transpose: bool) -> Order {
    info!(target: "crossing_reduction", "Start ordering units, max iterations: {max_iterations}, transpose: {transpose}");
    let order = init_order(graph);
    reduce_crossings_bilayer_sweep(graph, order, max_iterations, transpose)
}

/// Row 0 is ordered by unit index, every following row by the median position
/// of the parent units. Units without parents go last.
fn init_order(graph: &StableDiGraph<Unit, Edge>) -> Order {
    let max_rank = graph
        .node_weights()
        .map(|u| u.generation.max(0) as usize)
        .max()
        .unwrap_or(0);
    let mut order = vec![Vec::new(); max_rank + 1];
    for v in graph.node_indices() {
        order[graph[v].generation.max(0) as usize].push(v);
    }

    let mut positions = HashMap::new();
    for rank in 0..order.len() {
        if rank > 0 {
            let mut keyed = order[rank]
                .iter()
                .map(|v| {
                    let adjacent = upper_neighbours(graph, *v)
                        .iter()
                        .filter_map(|n| positions.get(n).copied())
                        .collect::<Vec<_>>();
                    (*v, median_value(adjacent))
                })
                .collect::<Vec<_>>();
            keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
            order[rank] = keyed.into_iter().map(|(v, _)| v).collect();
        }
        for (pos, v) in order[rank].iter().enumerate() {
            positions.insert(*v, pos);
        }
    }

    Order::new(order)
}

fn reduce_crossings_bilayer_sweep(
    graph: &StableDiGraph<Unit, Edge>,
    mut order: Order,
    max_iterations: usize,
    transpose: bool,
) -> Order {
    let mut best_crossings = order.crossings(graph);
    let mut best = order.clone();
    debug!(target: "crossing_reduction", "initial order has {best_crossings} crossings");

    for i in 0..max_iterations {
        if best_crossings == 0 {
            break;
        }
        let dir = if i % 2 == 0 { VDir::Down } else { VDir::Up };
        order = wmedian(graph, dir, &order);
        if transpose {
            self::transpose(graph, &mut order);
        }
        let crossings = order.crossings(graph);
        trace!(target: "crossing_reduction", "iteration {i}: {crossings} crossings");
        if crossings < best_crossings {
            best_crossings = crossings;
            best = order.clone();
        }
    }

    debug!(target: "crossing_reduction", "final order has {best_crossings} crossings");
    trace!(target: "crossing_reduction", "final order:\n{best}");
    best
}

/// One sweep over all ranks. Each rank is sorted by the weighted median of
/// the positions of its parents (moving down) or children (moving up).
fn wmedian(graph: &StableDiGraph<Unit, Edge>, dir: VDir, current: &Order) -> Order {
    let mut o = current._inner.clone();
    let mut positions = current.positions.clone();

    for rank in util::iterate(IterDir::from(dir), current.max_rank()) {
        let mut keyed = o[rank]
            .iter()
            .map(|v| {
                let neighbours = match dir {
                    VDir::Down => upper_neighbours(graph, *v),
                    VDir::Up => lower_neighbours(graph, *v),
                };
                let adjacent = neighbours
                    .iter()
                    .filter_map(|n| positions.get(n).copied())
                    .collect::<Vec<_>>();
                (*v, weighted_median(adjacent))
            })
            .collect::<Vec<_>>();
        // stable, equal medians keep their current order
        keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
        o[rank] = keyed.into_iter().map(|(v, _)| v).collect();
        o[rank].iter().enumerate().for_each(|(pos, v)| {
            positions.insert(*v, pos);
        });
    }

    Order {
        _inner: o,
        positions,
    }
}

/// Swaps adjacent units as long as this strictly reduces their crossings.
/// Every swap lowers the total crossing count, so the scans terminate.
fn transpose(graph: &StableDiGraph<Unit, Edge>, order: &mut Order) {
    loop {
        let mut improved = false;
        for rank in 0..order.max_rank() {
            for column in 0..order[rank].len().saturating_sub(1) {
                let v = order[rank][column];
                let w = order[rank][column + 1];
                if order.crossing_pair(graph, w, v) < order.crossing_pair(graph, v, w) {
                    order.swap_with_next(rank, column);
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
}

/// Upper median of the positions, `f64::MAX` if there are none.
fn median_value(mut adjacent: Vec<usize>) -> f64 {
    if adjacent.is_empty() {
        return f64::MAX;
    }
    adjacent.sort();
    adjacent[adjacent.len() / 2] as f64
}

fn weighted_median(mut adjacent: Vec<usize>) -> f64 {
    adjacent.sort();

    let length_p = adjacent.len();
    let m = length_p / 2;
    if length_p == 0 {
        f64::MAX
    } else if length_p % 2 == 1 {
        adjacent[m] as f64
    } else if length_p == 2 {
        (adjacent[0] + adjacent[1]) as f64 / 2.
    } else {
        let left = (adjacent[m - 1] - adjacent[0]) as f64;
        let right = (adjacent[length_p - 1] - adjacent[m]) as f64;
        if left + right == 0. {
            return (adjacent[m - 1] + adjacent[m]) as f64 / 2.;
        }
        (adjacent[m - 1] as f64 * right + adjacent[m] as f64 * left) / (left + right)
    }
}
