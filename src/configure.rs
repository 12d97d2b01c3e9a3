use std::env;

use log::{error, trace};

use crate::{algorithm, error::LayoutError, graph::FamilyGraph, Layout};

static ENV_MAX_ITERATIONS: &str = "RUST_FAMILY_MAX_ITER";
static ENV_TRANSPOSE: &str = "RUST_FAMILY_TRANSPOSE";
static ENV_COMPRESS: &str = "RUST_FAMILY_COMPRESS";
static ENV_UNIT_SPACING: &str = "RUST_FAMILY_UNIT_SPACING";
static ENV_CYCLE_POLICY: &str = "RUST_FAMILY_CYCLES";

macro_rules! read_env {
    ($field:expr, $cb:tt, $env:ident) => {
        match env::var($env).map($cb) {
            Ok(Ok(v)) => $field = v,
            Ok(Err(e)) => {
                error!(target: "initializing", "{e}");
            }
            _ => (),
        }
    };
}

/// What to do when parent links contain a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Return [LayoutError::CyclicParentage], carrying the fallback layout.
    #[default]
    Reject,
    /// Return the fallback layout, listing the affected people in
    /// [Layout::unreached].
    Fallback,
}

impl TryFrom<String> for CyclePolicy {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "reject" => Ok(Self::Reject),
            "fallback" => Ok(Self::Fallback),
            _ => Err(LayoutError::InvalidConfig {
                key: ENV_CYCLE_POLICY,
                value,
            }),
        }
    }
}

/// Parameters of a layout run.
///
/// - `max_iterations`: upper bound of median/transpose sweeps during crossing
///   reduction.
/// - `transpose`: swap adjacent units after each sweep if that removes
///   crossings.
/// - `compress`: run the centering and vertical compression passes after the
///   units have been merged into one grid.
/// - `unit_spacing`: number of empty columns between neighbouring units.
/// - `cycle_policy`: see [CyclePolicy].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub max_iterations: usize,
    pub transpose: bool,
    pub compress: bool,
    pub unit_spacing: usize,
    pub cycle_policy: CyclePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: 24,
            transpose: true,
            compress: true,
            unit_spacing: 0,
            cycle_policy: CyclePolicy::default(),
        }
    }
}

/// Configures a layout run, via the builder pattern.
///
/// # Example
/// ```
/// use family_sugiyama::{from_graph, graph::FamilyTree};
///
/// let mut tree = FamilyTree::new();
/// let a = tree.create_person("A");
/// let b = tree.create_person("B");
/// tree.marry(a, b);
///
/// let layout = from_graph(&tree)
///     .max_iterations(8) // at most 8 sweeps during crossing reduction
///     .unit_spacing(1) // leave one empty column between units
///     .build()
///     .unwrap();
/// assert_eq!(layout.coordinates[&a], (0, 0));
/// assert_eq!(layout.coordinates[&b], (1, 0));
/// ```
pub struct LayoutBuilder<'a, G: FamilyGraph> {
    config: Config,
    family: &'a G,
}

impl<'a, G: FamilyGraph> LayoutBuilder<'a, G> {
    pub(super) fn new(family: &'a G) -> Self {
        Self {
            config: Config::default(),
            family,
        }
    }

    /// Set the maximum number of ordering iterations, see [Config]
    pub fn max_iterations(mut self, v: usize) -> Self {
        trace!(target: "initializing",
            "Setting maximum iterations to: {v}");
        self.config.max_iterations = v;
        self
    }

    /// Use transpose to further reduce crossings, see [Config]
    pub fn transpose(mut self, v: bool) -> Self {
        trace!(target: "initializing",
            "Use transpose to further reduce crossings: {v}");
        self.config.transpose = v;
        self
    }

    /// Activate/deactivate compression, see [Config]
    pub fn compress(mut self, v: bool) -> Self {
        trace!(target: "initializing",
            "Compress layout: {v}");
        self.config.compress = v;
        self
    }

    /// Set the number of empty columns between units, see [Config]
    pub fn unit_spacing(mut self, v: usize) -> Self {
        trace!(target: "initializing",
            "Setting unit spacing to: {v}");
        self.config.unit_spacing = v;
        self
    }

    /// Set how cyclic parentage is reported, see [CyclePolicy]
    pub fn cycle_policy(mut self, v: CyclePolicy) -> Self {
        trace!(target: "initializing",
            "Cycle policy: {v:?}");
        self.config.cycle_policy = v;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        trace!(target: "initializing",
            "With config {:?}", config);
        self.config = config;
        self
    }

    /// Read in configuration values from environment variables.
    ///
    /// Envs that can be set include:
    ///
    /// | ENV | values | default | description |
    /// | --- | ------ | ------- | ----------- |
    /// | RUST_FAMILY_MAX_ITER     | integer, >= 0       | 24     | maximum number of crossing reduction sweeps |
    /// | RUST_FAMILY_TRANSPOSE    | y \| n              | y      | if adjacent units are swapped to further reduce crossings |
    /// | RUST_FAMILY_COMPRESS     | y \| n              | y      | if the merged layout is centered and compressed |
    /// | RUST_FAMILY_UNIT_SPACING | integer, >= 0       | 0      | empty columns between neighbouring units |
    /// | RUST_FAMILY_CYCLES       | reject \| fallback  | reject | how cyclic parentage is reported |
    pub fn configure_from_env(mut self) -> Self {
        let parse_bool = |x: String| match x.as_str() {
            "y" => Ok(true),
            "n" => Ok(false),
            _ => Err(LayoutError::InvalidConfig {
                key: "boolean env",
                value: x,
            }),
        };

        read_env!(
            self.config.max_iterations,
            (|x| x.parse::<usize>()),
            ENV_MAX_ITERATIONS
        );

        read_env!(self.config.transpose, parse_bool, ENV_TRANSPOSE);

        read_env!(self.config.compress, parse_bool, ENV_COMPRESS);

        read_env!(
            self.config.unit_spacing,
            (|x| x.parse::<usize>()),
            ENV_UNIT_SPACING
        );

        read_env!(
            self.config.cycle_policy,
            (TryFrom::try_from),
            ENV_CYCLE_POLICY
        );

        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the layout.
    pub fn build(self) -> Result<Layout, LayoutError> {
        let Self { config, family } = self;
        let layout = algorithm::start(family, &config);
        if layout.unreached.is_empty() {
            return Ok(layout);
        }
        match config.cycle_policy {
            CyclePolicy::Fallback => Ok(layout),
            CyclePolicy::Reject => Err(LayoutError::CyclicParentage {
                unreached: layout.unreached.clone(),
                layout: Box::new(layout),
            }),
        }
    }
}

#[test]
fn from_env() {
    use crate::{from_graph, graph::FamilyTree};
    use std::env;

    let tree = FamilyTree::new();
    env::set_var(ENV_MAX_ITERATIONS, "5");
    env::set_var(ENV_TRANSPOSE, "n");
    env::set_var(ENV_COMPRESS, "n");
    env::set_var(ENV_UNIT_SPACING, "2");
    env::set_var(ENV_CYCLE_POLICY, "fallback");
    let cfg = from_graph(&tree).configure_from_env();
    assert_eq!(cfg.config.max_iterations, 5);
    assert!(!cfg.config.transpose);
    assert!(!cfg.config.compress);
    assert_eq!(cfg.config.unit_spacing, 2);
    assert_eq!(cfg.config.cycle_policy, CyclePolicy::Fallback);

    // invalid values are ignored
    env::set_var(ENV_MAX_ITERATIONS, "1.5");
    env::set_var(ENV_TRANSPOSE, "maybe");
    env::set_var(ENV_CYCLE_POLICY, "flubbeldiflap");
    let cfg = from_graph(&tree).configure_from_env();
    let default = Config::default();
    assert_eq!(cfg.config.max_iterations, default.max_iterations);
    assert_eq!(cfg.config.transpose, default.transpose);
    assert_eq!(cfg.config.cycle_policy, default.cycle_policy);

    for key in [
        ENV_MAX_ITERATIONS,
        ENV_TRANSPOSE,
        ENV_COMPRESS,
        ENV_UNIT_SPACING,
        ENV_CYCLE_POLICY,
    ] {
        env::remove_var(key);
    }
}

#[test]
fn run_algo_empty_graph() {
    use crate::{from_graph, graph::FamilyTree};
    let tree = FamilyTree::new();
    let layout = from_graph(&tree).build().unwrap();
    assert!(layout.coordinates.is_empty());
    assert_eq!((layout.width, layout.height), (0, 0));
}
