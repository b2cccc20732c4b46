//! Morphed graph-coloring benchmark generator.
//!
//! A ring lattice and a G(n, m) random graph are blended edge-wise by a
//! mixing ratio, filtered on a greedy chromatic-number estimate, and the
//! survivors are written out as DIMACS CNF k-coloring formulas.

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;

pub mod cnf;
pub mod coloring;
pub mod config;
pub mod error;
pub mod generate;
pub mod morph;
pub mod pipeline;

pub use cnf::{encode_coloring, CnfFormula};
pub use coloring::estimate_chromatic_number;
pub use config::GeneratorConfig;
pub use error::{GcpError, Result};
pub use generate::{random_graph, ring_lattice};
pub use morph::morph_graphs;
pub use pipeline::{run_trial, InstancePipeline, TrialOutcome};

/// Undirected simple graph over dense vertex ids `0..n`.
pub type SimpleGraph = UnGraphMap<usize, ()>;

/// Undirected edge, always stored as `(min, max)`.
pub type Edge = (usize, usize);

/// =============== Stable edge order ===============

pub(crate) fn canonical(u: usize, v: usize) -> Edge {
    if u < v { (u, v) } else { (v, u) }
}

/// All edges of `g` as canonical pairs in ascending order.
pub fn stable_edges(g: &SimpleGraph) -> Vec<Edge> {
    g.all_edges()
        .map(|(u, v, _)| canonical(u, v))
        .sorted()
        .collect()
}

/// Empty graph on vertices `0..n`, added in ascending order.
pub fn empty_graph(n: usize) -> SimpleGraph {
    let mut g = SimpleGraph::with_capacity(n, 0);
    for v in 0..n {
        g.add_node(v);
    }
    g
}
