//! Greedy vertex coloring used as a chromatic-number proxy.
//!
//! The greedy count is an upper bound on the chromatic number, never the
//! exact value. Vertex order is fixed so that repeated runs agree.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::SimpleGraph;

/// Order in which the greedy heuristic visits vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColoringOrder {
    /// Degree descending, ties broken by ascending vertex id.
    #[default]
    LargestFirst,
    /// Ascending vertex id.
    Ascending,
}

impl ColoringOrder {
    fn vertices(self, g: &SimpleGraph) -> Vec<usize> {
        match self {
            ColoringOrder::LargestFirst => g
                .nodes()
                .sorted_by_key(|&v| (Reverse(g.neighbors(v).count()), v))
                .collect(),
            ColoringOrder::Ascending => g.nodes().sorted().collect(),
        }
    }
}

/// Greedy proper coloring; colors start at 0.
pub fn greedy_coloring(g: &SimpleGraph, order: ColoringOrder) -> HashMap<usize, usize> {
    let mut color: HashMap<usize, usize> = HashMap::with_capacity(g.node_count());
    for v in order.vertices(g) {
        // at most deg(v) colors can be blocked, so one of 0..=deg(v) is free
        let mut taken = vec![false; g.neighbors(v).count() + 1];
        for w in g.neighbors(v) {
            if let Some(&c) = color.get(&w) {
                if c < taken.len() {
                    taken[c] = true;
                }
            }
        }
        let c = taken.iter().position(|&t| !t).unwrap_or(taken.len());
        color.insert(v, c);
    }
    color
}

/// Number of distinct colors in `coloring`.
pub fn color_count(coloring: &HashMap<usize, usize>) -> usize {
    coloring.values().collect::<HashSet<_>>().len()
}

/// Upper bound on the chromatic number from a largest-first greedy coloring.
pub fn estimate_chromatic_number(g: &SimpleGraph) -> usize {
    color_count(&greedy_coloring(g, ColoringOrder::LargestFirst))
}

/// True when every vertex is colored and no edge joins two equal colors.
pub fn is_proper_coloring(g: &SimpleGraph, coloring: &HashMap<usize, usize>) -> bool {
    g.nodes().all(|v| coloring.contains_key(&v))
        && g.all_edges().all(|(u, v, _)| coloring[&u] != coloring[&v])
}
