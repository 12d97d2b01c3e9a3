//! The family graph the layout engine reads from.
//!
//! [FamilyGraph] is the read-only view the engine needs. [FamilyTree] is a
//! small in-memory store implementing it, keeping relationships sorted by
//! their normalized key so lookups are binary searches.
use std::collections::BTreeMap;
use std::fmt::Display;

pub type PersonId = u32;

/// Unordered pair of person ids, normalized so `first <= second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipKey {
    first: PersonId,
    second: PersonId,
}

impl RelationshipKey {
    pub fn new(a: PersonId, b: PersonId) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    pub fn first(&self) -> PersonId {
        self.first
    }

    pub fn second(&self) -> PersonId {
        self.second
    }

    pub fn people(&self) -> [PersonId; 2] {
        [self.first, self.second]
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.first == id || self.second == id
    }

    /// The other person of the pair, if `id` is part of it.
    pub fn other(&self, id: PersonId) -> Option<PersonId> {
        if self.first == id {
            Some(self.second)
        } else if self.second == id {
            Some(self.first)
        } else {
            None
        }
    }
}

/// A partner edge between two people.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    key: RelationshipKey,
    pub is_marriage: bool,
}

impl Relationship {
    pub fn new(a: PersonId, b: PersonId, is_marriage: bool) -> Self {
        Self {
            key: RelationshipKey::new(a, b),
            is_marriage,
        }
    }

    pub fn key(&self) -> RelationshipKey {
        self.key
    }

    pub fn people(&self) -> [PersonId; 2] {
        self.key.people()
    }

    pub fn has_person(&self, id: PersonId) -> bool {
        self.key.contains(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    id: PersonId,
    pub name: String,
    pub title: String,
    pub region: String,
    pub house: String,
    pub birth_year: String,
    pub death_year: String,
    pub is_monarch: bool,
    pub is_unknown: bool,
    parents: Option<RelationshipKey>,
}

impl Person {
    pub fn new(id: PersonId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn parents(&self) -> Option<RelationshipKey> {
        self.parents
    }

    pub fn set_parents(&mut self, parents: Option<RelationshipKey>) {
        self.parents = parents;
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_house(mut self, house: impl Into<String>) -> Self {
        self.house = house.into();
        self
    }

    pub fn with_years(mut self, birth: impl Into<String>, death: impl Into<String>) -> Self {
        self.birth_year = birth.into();
        self.death_year = death.into();
        self
    }

    pub fn with_parents(mut self, a: PersonId, b: PersonId) -> Self {
        self.parents = Some(RelationshipKey::new(a, b));
        self
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::new();
        if !self.title.is_empty() {
            s.push_str(&self.title);
            s.push(' ');
        }
        s.push_str(&self.name);
        if !self.region.is_empty() {
            s.push_str(" of ");
            s.push_str(&self.region);
        }
        if !self.house.is_empty() {
            s.push_str("\nHouse of ");
            s.push_str(&self.house);
        }
        // only the first word counts, "? (uncertain)" style notes are ignored
        let first_word = |y: &str| y.split(' ').next().unwrap_or("").to_string();
        if !first_word(&self.birth_year).is_empty() {
            s.push('\n');
            s.push_str(&self.birth_year);
            s.push_str(" - ");
            if first_word(&self.death_year).is_empty() {
                s.push_str("Present");
            } else {
                s.push_str(&self.death_year);
            }
        }
        f.write_str(&s)
    }
}

/// Read-only queries the layout engine runs against a family graph.
pub trait FamilyGraph {
    /// All people, in ascending id order.
    fn people(&self) -> Vec<&Person>;

    /// All partner relationships, in ascending key order.
    fn relationships(&self) -> Vec<&Relationship>;

    fn person(&self, id: PersonId) -> Option<&Person>;

    /// Relationship between `a` and `b`, regardless of argument order.
    fn relationship(&self, a: PersonId, b: PersonId) -> Option<&Relationship>;

    fn parent_relationship(&self, id: PersonId) -> Option<RelationshipKey> {
        self.person(id).and_then(Person::parents)
    }

    /// Every relationship with at least one endpoint in `people`.
    fn relationships_touching(&self, people: &[PersonId]) -> Vec<&Relationship> {
        self.relationships()
            .into_iter()
            .filter(|r| people.iter().any(|p| r.has_person(*p)))
            .collect()
    }
}

/// In-memory family graph.
#[derive(Debug, Clone, Default)]
pub struct FamilyTree {
    members: BTreeMap<PersonId, Person>,
    // sorted by key, at most one entry per key
    relationships: Vec<Relationship>,
    // never lowered, ids of removed people are not handed out again
    next_id: PersonId,
}

impl FamilyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next created person receives.
    pub fn next_id(&self) -> PersonId {
        self.next_id
    }

    pub fn create_person(&mut self, name: impl Into<String>) -> PersonId {
        let id = self.next_id;
        self.next_id += 1;
        self.members.insert(id, Person::new(id).with_name(name));
        id
    }

    /// Adds `member`, replacing any person with the same id.
    pub fn add_member(&mut self, member: Person) {
        self.next_id = self.next_id.max(member.id.saturating_add(1));
        self.members.insert(member.id, member);
    }

    pub fn member(&self, id: PersonId) -> Option<&Person> {
        self.members.get(&id)
    }

    pub fn member_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.members.get_mut(&id)
    }

    /// Removes the person and every relationship they are part of.
    pub fn remove_member(&mut self, id: PersonId) -> Option<Person> {
        let removed = self.members.remove(&id)?;
        self.relationships.retain(|r| !r.has_person(id));
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Inserts the relationship keeping the sort order. Does nothing if one of
    /// the two people is not in the tree; an existing relationship between the
    /// same people is replaced.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        let [a, b] = relationship.people();
        if a == b || !self.members.contains_key(&a) || !self.members.contains_key(&b) {
            return;
        }
        match self.search(relationship.key()) {
            Ok(i) => self.relationships[i] = relationship,
            Err(i) => self.relationships.insert(i, relationship),
        }
    }

    pub fn marry(&mut self, a: PersonId, b: PersonId) {
        self.add_relationship(Relationship::new(a, b, true));
    }

    pub fn partner(&mut self, a: PersonId, b: PersonId) {
        self.add_relationship(Relationship::new(a, b, false));
    }

    pub fn remove_relationship(&mut self, a: PersonId, b: PersonId) -> Option<Relationship> {
        self.search(RelationshipKey::new(a, b))
            .ok()
            .map(|i| self.relationships.remove(i))
    }

    /// Sets the parents of `child`. Does nothing if the child is unknown.
    pub fn set_parents(&mut self, child: PersonId, a: PersonId, b: PersonId) {
        if let Some(person) = self.members.get_mut(&child) {
            person.set_parents(Some(RelationshipKey::new(a, b)));
        }
    }

    /// The parent persons of `person`. `None` if the person has no parent
    /// link, a slot is `None` if that parent is not in the tree.
    pub fn parents(&self, person: PersonId) -> Option<[Option<&Person>; 2]> {
        let key = self.members.get(&person)?.parents()?;
        Some(key.people().map(|p| self.members.get(&p)))
    }

    fn search(&self, key: RelationshipKey) -> Result<usize, usize> {
        self.relationships.binary_search_by(|r| r.key().cmp(&key))
    }
}

impl FamilyGraph for FamilyTree {
    fn people(&self) -> Vec<&Person> {
        self.members.values().collect()
    }

    fn relationships(&self) -> Vec<&Relationship> {
        self.relationships.iter().collect()
    }

    fn person(&self, id: PersonId) -> Option<&Person> {
        self.members.get(&id)
    }

    fn relationship(&self, a: PersonId, b: PersonId) -> Option<&Relationship> {
        if a == b {
            return None;
        }
        self.search(RelationshipKey::new(a, b))
            .ok()
            .map(|i| &self.relationships[i])
    }
}

#[cfg(test)]
mod tests {
    use super::{FamilyGraph, FamilyTree, Person, Relationship, RelationshipKey};

    fn tree_with(n: u32) -> FamilyTree {
        let mut tree = FamilyTree::new();
        for i in 0..n {
            tree.create_person(format!("p{i}"));
        }
        tree
    }

    #[test]
    fn key_is_normalized() {
        let key = RelationshipKey::new(7, 3);
        assert_eq!(key.first(), 3);
        assert_eq!(key.second(), 7);
        assert_eq!(key.other(3), Some(7));
        assert_eq!(key.other(4), None);
        assert_eq!(Relationship::new(7, 3, true).key(), RelationshipKey::new(3, 7));
    }

    #[test]
    fn ids_are_assigned_monotonically() {
        let mut tree = tree_with(3);
        assert_eq!(tree.next_id(), 3);
        tree.remove_member(1);
        assert_eq!(tree.create_person("d"), 3);
    }

    #[test]
    fn ids_of_removed_newest_person_are_not_reused() {
        let mut tree = tree_with(3);
        tree.set_parents(0, 1, 2);
        tree.remove_member(2);
        assert_eq!(tree.create_person("d"), 3);
        let parents = tree.parents(0).unwrap();
        assert_eq!(parents[0].map(|p| p.id()), Some(1));
        assert!(parents[1].is_none());

        tree.add_member(Person::new(10));
        tree.remove_member(10);
        assert_eq!(tree.next_id(), 11);
        assert_eq!(tree.create_person("e"), 11);
    }

    #[test]
    fn relationships_stay_sorted_and_unique() {
        let mut tree = tree_with(5);
        tree.marry(4, 2);
        tree.partner(0, 3);
        tree.marry(1, 0);
        tree.partner(2, 4);
        let keys = tree
            .relationships()
            .iter()
            .map(|r| (r.key().first(), r.key().second(), r.is_marriage))
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![(0, 1, true), (0, 3, false), (2, 4, false)]);
    }

    #[test]
    fn relationship_lookup_ignores_argument_order() {
        let mut tree = tree_with(3);
        tree.marry(2, 0);
        assert!(tree.relationship(0, 2).is_some());
        assert!(tree.relationship(2, 0).is_some());
        assert!(tree.relationship(0, 1).is_none());
        assert!(tree.relationship(1, 1).is_none());
    }

    #[test]
    fn relationship_to_missing_person_is_ignored() {
        let mut tree = tree_with(2);
        tree.marry(0, 9);
        assert!(tree.relationships().is_empty());
    }

    #[test]
    fn remove_member_drops_relationships() {
        let mut tree = tree_with(3);
        tree.marry(0, 1);
        tree.partner(1, 2);
        tree.remove_member(1);
        assert!(tree.relationships().is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn relationships_touching_set() {
        let mut tree = tree_with(6);
        tree.marry(0, 1);
        tree.marry(2, 3);
        tree.partner(3, 4);
        let touching = tree.relationships_touching(&[3]);
        assert_eq!(touching.len(), 2);
        assert!(touching.iter().all(|r| r.has_person(3)));
    }

    #[test]
    fn parents_resolve_missing_members_to_none() {
        let mut tree = tree_with(2);
        tree.set_parents(1, 0, 5);
        let parents = tree.parents(1).unwrap();
        assert_eq!(parents[0].map(|p| p.id()), Some(0));
        assert!(parents[1].is_none());
        assert!(tree.parents(0).is_none());
        assert_eq!(tree.parent_relationship(1), Some(RelationshipKey::new(0, 5)));
    }

    #[test]
    fn label_formatting() {
        let p = Person::new(0)
            .with_title("King")
            .with_name("Arthur")
            .with_region("Camelot")
            .with_house("Pendragon")
            .with_years("480", "");
        assert_eq!(p.to_string(), "King Arthur of Camelot\nHouse of Pendragon\n480 - Present");
        assert_eq!(Person::new(1).with_name("Bob").to_string(), "Bob");
    }
}
