//! Merges the local layouts of all units into one global grid.
//!
//! Every generation is a band as high as its highest unit, every column of
//! the order as wide as its widest unit. A unit is put at the top left corner
//! of its slot.

use std::collections::BTreeMap;

use log::{debug, info, trace};
use petgraph::stable_graph::StableDiGraph;

use crate::graph::PersonId;

use super::{p2_reduce_crossings::Order, Edge, Unit};

pub(super) fn merge(graph: &mut StableDiGraph<Unit, Edge>, order: &Order, unit_spacing: usize) {
    info!(target: "coordinate_calculation", "Merging unit layouts, unit spacing: {unit_spacing}");
    let width = order.width();
    let mut row_heights = vec![0; order.len()];
    let mut column_widths = vec![0; width];
    for (rank, row) in order.iter().enumerate() {
        for (column, v) in row.iter().enumerate() {
            row_heights[rank] = row_heights[rank].max(graph[*v].height);
            column_widths[column] = column_widths[column].max(graph[*v].width);
        }
    }

    let row_offsets = offsets(&row_heights, 0);
    let column_offsets = offsets(&column_widths, unit_spacing);

    for (rank, y) in row_offsets.iter().enumerate() {
        for (column, x) in column_offsets.iter().enumerate() {
            let Some(v) = order.slot(rank, column) else {
                continue;
            };
            let unit = &mut graph[v];
            unit.x = *x;
            unit.y = *y;
            trace!(target: "coordinate_calculation",
                "unit {:?} at slot ({rank}, {column}): ({x}, {y})", unit.members);
        }
    }
}

/// Start of every band, the running sum of the sizes before it.
fn offsets(sizes: &[usize], spacing: usize) -> Vec<isize> {
    let mut offset = 0;
    sizes
        .iter()
        .map(|size| {
            let start = offset;
            offset += (size + spacing) as isize;
            start
        })
        .collect()
}

/// Global coordinates of every person, shifted so that the smallest x and y
/// are 0, together with the width and height of the grid.
pub(super) fn collect_coordinates(
    graph: &StableDiGraph<Unit, Edge>,
) -> (BTreeMap<PersonId, (isize, isize)>, usize, usize) {
    let mut coordinates = graph
        .node_weights()
        .flat_map(|u| u.cells())
        .collect::<BTreeMap<_, _>>();
    if coordinates.is_empty() {
        return (coordinates, 0, 0);
    }

    let min_x = coordinates.values().map(|(x, _)| *x).min().unwrap_or(0);
    let min_y = coordinates.values().map(|(_, y)| *y).min().unwrap_or(0);
    for (x, y) in coordinates.values_mut() {
        *x -= min_x;
        *y -= min_y;
    }
    let width = coordinates.values().map(|(x, _)| *x + 1).max().unwrap_or(0) as usize;
    let height = coordinates.values().map(|(_, y)| *y + 1).max().unwrap_or(0) as usize;

    debug!(target: "coordinate_calculation",
        "{} people on a {width}x{height} grid", coordinates.len());
    (coordinates, width, height)
}
