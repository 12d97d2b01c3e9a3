//! Layered layout of family trees.
//!
//! People connected through partner relationships are grouped into
//! relationship units, units are stacked in generations below their parents
//! and ordered to reduce crossing parent/child lines. The result places every
//! person on an integer grid.
//!
//! ```
//! use family_sugiyama::{layout, graph::FamilyTree};
//!
//! let mut tree = FamilyTree::new();
//! let a = tree.create_person("A");
//! let b = tree.create_person("B");
//! let c = tree.create_person("C");
//! tree.marry(a, b);
//! tree.set_parents(c, a, b);
//!
//! let layout = layout(&tree).unwrap();
//! assert_eq!(layout.coordinates[&c].1, 1);
//! assert_eq!((layout.width, layout.height), (2, 2));
//! ```
use std::collections::BTreeMap;

pub mod configure;
pub mod graph;

mod algorithm;
mod error;
mod util;

pub use configure::{Config, CyclePolicy, LayoutBuilder};
pub use error::LayoutError;
pub use graph::{FamilyGraph, FamilyTree, Person, PersonId, Relationship, RelationshipKey};

/// Grid coordinates of every person.
///
/// `(0, 0)` is the top left cell, y grows towards younger generations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub coordinates: BTreeMap<PersonId, (isize, isize)>,
    pub width: usize,
    pub height: usize,
    /// People in units whose parent links form a cycle, including a person
    /// partnered with their own parent. They were put into the first
    /// generation.
    pub unreached: Vec<PersonId>,
}

/// Starts configuring a layout of `family`.
pub fn from_graph<G: FamilyGraph>(family: &G) -> LayoutBuilder<'_, G> {
    LayoutBuilder::new(family)
}

/// Lays out `family` with the default [Config].
pub fn layout<G: FamilyGraph>(family: &G) -> Result<Layout, LayoutError> {
    from_graph(family).build()
}

#[cfg(test)]
mod check_visuals {
    use crate::{from_graph, layout, CyclePolicy, FamilyTree, LayoutError};

    fn tree_with(names: &[&str]) -> FamilyTree {
        let mut tree = FamilyTree::new();
        for name in names {
            tree.create_person(*name);
        }
        tree
    }

    #[test]
    fn married_couple() {
        let mut tree = tree_with(&["A", "B"]);
        tree.marry(0, 1);
        let layout = layout(&tree).unwrap();
        assert_eq!(layout.coordinates[&0], (0, 0));
        assert_eq!(layout.coordinates[&1], (1, 0));
        assert_eq!((layout.width, layout.height), (2, 1));
        assert!(layout.unreached.is_empty());
    }

    #[test]
    fn child_below_parents() {
        let mut tree = tree_with(&["A", "B", "C"]);
        tree.marry(0, 1);
        tree.set_parents(2, 0, 1);
        let layout = layout(&tree).unwrap();
        let (ax, ay) = layout.coordinates[&0];
        let (bx, by) = layout.coordinates[&1];
        let (cx, cy) = layout.coordinates[&2];
        assert_eq!((ay, by), (0, 0));
        assert_eq!(cy, 1);
        assert!(ax.min(bx) <= cx && cx <= ax.max(bx));
    }

    #[test]
    fn child_below_parents_without_compression() {
        let mut tree = tree_with(&["A", "B", "C"]);
        tree.marry(0, 1);
        tree.set_parents(2, 0, 1);
        let layout = from_graph(&tree).compress(false).build().unwrap();
        assert_eq!(layout.coordinates[&0], (0, 0));
        assert_eq!(layout.coordinates[&1], (1, 0));
        assert_eq!(layout.coordinates[&2], (0, 1));
    }

    #[test]
    fn siblings_share_a_row() {
        let mut tree = tree_with(&["A", "B", "C", "D", "E"]);
        tree.marry(0, 1);
        for child in 2..5 {
            tree.set_parents(child, 0, 1);
        }
        let layout = layout(&tree).unwrap();
        let mut xs = (2..5)
            .map(|c| {
                assert_eq!(layout.coordinates[&c].1, 1);
                layout.coordinates[&c].0
            })
            .collect::<Vec<_>>();
        xs.sort();
        xs.dedup();
        assert_eq!(xs.len(), 3);
    }

    #[test]
    fn cyclic_parentage_is_rejected() {
        // A is the parent of B and B the parent of A
        let mut tree = tree_with(&["A", "B", "C"]);
        tree.set_parents(1, 0, 0);
        tree.set_parents(0, 1, 1);
        match layout(&tree) {
            Err(LayoutError::CyclicParentage { unreached, layout }) => {
                assert_eq!(unreached, vec![0, 1]);
                assert_eq!(layout.unreached, unreached);
                assert_eq!(layout.coordinates.len(), 3);
                assert_eq!(layout.coordinates[&0].1, 0);
                assert_eq!(layout.coordinates[&1].1, 0);
            }
            other => panic!("expected cyclic parentage, got {other:?}"),
        }
    }

    #[test]
    fn cyclic_parentage_fallback() {
        let mut tree = tree_with(&["A", "B"]);
        tree.marry(0, 1);
        tree.set_parents(1, 0, 0);
        let layout = from_graph(&tree)
            .cycle_policy(CyclePolicy::Fallback)
            .build()
            .unwrap();
        assert_eq!(layout.unreached, vec![0, 1]);
        assert_eq!(layout.height, 1);
    }

    #[test]
    fn partner_of_own_parent_is_a_unit_cycle() {
        // person-level parentage is acyclic, but B shares a unit with A
        let mut tree = tree_with(&["A", "B"]);
        tree.partner(0, 1);
        tree.set_parents(1, 0, 0);
        let err = layout(&tree).unwrap_err();
        assert!(err.to_string().starts_with("unit-level parentage cycle"));
        assert!(matches!(err, LayoutError::CyclicParentage { ref unreached, .. } if *unreached == vec![0, 1]));
    }

    #[test]
    fn layouts_are_deterministic() {
        let mut tree = tree_with(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        tree.marry(0, 1);
        tree.partner(2, 3);
        tree.set_parents(4, 0, 1);
        tree.set_parents(5, 2, 3);
        tree.marry(4, 5);
        tree.set_parents(6, 4, 5);
        tree.set_parents(7, 0, 3);
        assert_eq!(layout(&tree).unwrap(), layout(&tree).unwrap());
    }

    #[test]
    fn married_children_stay_adjacent() {
        let mut tree = tree_with(&["A", "B", "C", "D", "E", "F"]);
        tree.marry(0, 1);
        tree.marry(2, 3);
        tree.set_parents(4, 0, 1);
        tree.set_parents(5, 2, 3);
        tree.marry(4, 5);
        let layout = layout(&tree).unwrap();
        let (ex, ey) = layout.coordinates[&4];
        let (fx, fy) = layout.coordinates[&5];
        assert_eq!(ey, fy);
        assert_eq!(ex.abs_diff(fx), 1);
        assert_eq!(ey, 1);
    }

    #[test]
    fn missing_parents_are_ignored() {
        let mut tree = tree_with(&["A", "B"]);
        tree.set_parents(1, 0, 7);
        let layout = layout(&tree).unwrap();
        assert_eq!(layout.coordinates[&1].1, 1);
    }
}

#[cfg(test)]
mod properties {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use crate::{from_graph, CyclePolicy, FamilyTree, Layout};

    /// People `0..n`, parents always have a lower id than their child.
    pub(crate) fn family() -> impl Strategy<Value = FamilyTree> {
        (1usize..32)
            .prop_flat_map(|n| {
                (
                    Just(n),
                    prop::collection::vec(prop::option::of((0..n, 0..n)), n),
                    prop::collection::vec((0..n, 0..n, any::<bool>()), 0..n),
                )
            })
            .prop_map(|(n, parents, partners)| {
                let mut tree = FamilyTree::new();
                for i in 0..n {
                    tree.create_person(format!("p{i}"));
                }
                for (child, p) in parents.into_iter().enumerate().skip(1) {
                    if let Some((a, b)) = p {
                        tree.set_parents(child as u32, (a % child) as u32, (b % child) as u32);
                    }
                }
                for (a, b, is_marriage) in partners {
                    if is_marriage {
                        tree.marry(a as u32, b as u32);
                    } else {
                        tree.partner(a as u32, b as u32);
                    }
                }
                tree
            })
    }

    fn run(tree: &FamilyTree) -> Layout {
        from_graph(tree)
            .cycle_policy(CyclePolicy::Fallback)
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_every_person_in_own_cell(tree in family()) {
            let layout = run(&tree);
            prop_assert_eq!(layout.coordinates.len(), tree.len());
            let cells = layout.coordinates.values().collect::<HashSet<_>>();
            prop_assert_eq!(cells.len(), tree.len());
            for (x, y) in layout.coordinates.values() {
                prop_assert!(*x >= 0 && (*x as usize) < layout.width);
                prop_assert!(*y >= 0 && (*y as usize) < layout.height);
            }
        }

        #[test]
        fn prop_children_below_parents(tree in family()) {
            let layout = run(&tree);
            prop_assume!(layout.unreached.is_empty());
            for person in 0..tree.len() as u32 {
                let Some(parents) = tree.parents(person) else {
                    continue;
                };
                for parent in parents.into_iter().flatten() {
                    prop_assert!(layout.coordinates[&parent.id()].1 < layout.coordinates[&person].1);
                }
            }
        }

        #[test]
        fn prop_layout_is_deterministic(tree in family()) {
            prop_assert_eq!(run(&tree), run(&tree));
        }

        #[test]
        fn prop_uncompressed_layout_is_valid(tree in family(), spacing in 0usize..3) {
            let layout = from_graph(&tree)
                .cycle_policy(CyclePolicy::Fallback)
                .compress(false)
                .unit_spacing(spacing)
                .build()
                .unwrap();
            let cells = layout.coordinates.values().collect::<HashSet<_>>();
            prop_assert_eq!(cells.len(), tree.len());
        }
    }
}
