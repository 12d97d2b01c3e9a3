use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use log::trace;

use crate::graph::{FamilyGraph, PersonId, Relationship};

#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct LocalLayout {
    pub(super) cells: Vec<(PersonId, (isize, isize))>,
    pub(super) width: usize,
    pub(super) height: usize,
}

pub(super) fn layout<G: FamilyGraph>(family: &G, members: &[PersonId]) -> LocalLayout {
    match members {
        [] => LocalLayout::default(),
        [single] => LocalLayout {
            cells: vec![(*single, (0, 0))],
            width: 1,
            height: 1,
        },
        // order may be revisited by later passes
        [left, right] => LocalLayout {
            cells: vec![(*left, (0, 0)), (*right, (1, 0))],
            width: 2,
            height: 1,
        },
        _ => complex_layout(family, members),
    }
}

/// Number of marriages and non-marriages of `person` inside the unit.
fn relationship_counts<G: FamilyGraph>(family: &G, person: PersonId, members: &[PersonId]) -> (usize, usize) {
    members
        .iter()
        .filter_map(|other| family.relationship(person, *other))
        .fold((0, 0), |(m, n), r| if r.is_marriage { (m + 1, n) } else { (m, n + 1) })
}

/// The member with the most relationships, then the largest branch, then the
/// lowest id.
fn choose_root<G: FamilyGraph>(family: &G, members: &[PersonId]) -> PersonId {
    let rank = |p: PersonId| {
        let (m, n) = relationship_counts(family, p, members);
        (m + n, m.max(n))
    };
    let mut root = members[0];
    let mut root_rank = rank(root);
    for &candidate in &members[1..] {
        let candidate_rank = rank(candidate);
        let better = match candidate_rank.cmp(&root_rank) {
            Ordering::Greater => true,
            Ordering::Equal => candidate < root,
            Ordering::Less => false,
        };
        if better {
            root = candidate;
            root_rank = candidate_rank;
        }
    }
    root
}

/// Lays out units of three or more people. Starting from the root, spouses are
/// placed to the right and other partners to the left of the person who
/// reached them first.
fn complex_layout<G: FamilyGraph>(family: &G, members: &[PersonId]) -> LocalLayout {
    let member_set = members.iter().copied().collect::<HashSet<_>>();
    let mut by_person: HashMap<PersonId, Vec<&Relationship>> = HashMap::new();
    for relationship in family.relationships_touching(members) {
        let [a, b] = relationship.people();
        if a == b || !member_set.contains(&a) || !member_set.contains(&b) {
            continue;
        }
        by_person.entry(a).or_default().push(relationship);
        by_person.entry(b).or_default().push(relationship);
    }
    for relationships in by_person.values_mut() {
        relationships.sort_by_key(|r| r.key());
    }

    let root = choose_root(family, members);
    trace!(target: "relationship_units", "complex unit {members:?}, root: {root}");

    // every partner is claimed by the first person reaching it
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    let mut claimed: HashMap<PersonId, (Vec<PersonId>, Vec<PersonId>)> = HashMap::new();
    while let Some(current) = queue.pop_front() {
        let (mut spouses, mut others) = (Vec::new(), Vec::new());
        for relationship in by_person.get(&current).into_iter().flatten() {
            let Some(other) = relationship.key().other(current) else {
                continue;
            };
            if !visited.insert(other) {
                continue;
            }
            if relationship.is_marriage {
                spouses.push(other);
            } else {
                others.push(other);
            }
            queue.push_back(other);
        }
        claimed.insert(current, (spouses, others));
    }

    let mut cells: HashMap<PersonId, (isize, isize)> = HashMap::from([(root, (0, 0))]);
    let mut occupied = HashSet::from([(0, 0)]);
    let mut queue = VecDeque::from([root]);
    while let Some(current) = queue.pop_front() {
        let (base_x, base_y) = cells[&current];
        let Some((spouses, others)) = claimed.get(&current) else {
            continue;
        };
        for (partners, step) in [(spouses, 1), (others, -1)] {
            let y = if partners.len() == 1 { base_y } else { base_y + 1 };
            for (i, partner) in partners.iter().enumerate() {
                let mut x = base_x + step * (i as isize + 1);
                while occupied.contains(&(x, y)) {
                    x += step;
                }
                occupied.insert((x, y));
                cells.insert(*partner, (x, y));
                queue.push_back(*partner);
            }
        }
    }

    // members the relationships did not reach go to the right of the first row
    let mut next_free = cells.values().map(|(x, _)| *x).max().unwrap_or(0) + 1;
    for member in members {
        if !cells.contains_key(member) {
            cells.insert(*member, (next_free, 0));
            next_free += 1;
        }
    }

    let min_x = cells.values().map(|(x, _)| *x).min().unwrap_or(0);
    let max_x = cells.values().map(|(x, _)| *x).max().unwrap_or(0);
    let max_y = cells.values().map(|(_, y)| *y).max().unwrap_or(0);

    LocalLayout {
        cells: members
            .iter()
            .map(|m| {
                let (x, y) = cells[m];
                (*m, (x - min_x, y))
            })
            .collect(),
        width: (max_x - min_x + 1) as usize,
        height: (max_y + 1) as usize,
    }
}
