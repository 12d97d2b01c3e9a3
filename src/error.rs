use thiserror::Error;

use crate::{graph::PersonId, Layout};

#[derive(Debug, Error)]
pub enum LayoutError {
    /// Parent links between relationship units form a cycle, so some units
    /// could not be given a generation. This includes a person in the same
    /// unit as one of their parents. `layout` is the fallback layout with those units placed in
    /// generation 0.
    #[error("unit-level parentage cycle: {} people could not be assigned a generation", unreached.len())]
    CyclicParentage {
        unreached: Vec<PersonId>,
        layout: Box<Layout>,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },
}
