//! Seed graphs for the morph: a deterministic ring lattice and a uniform
//! G(n, m) random graph over the same vertex set.

use itertools::Itertools;
use rand::seq::index;
use rand::Rng;

use crate::error::{GcpError, Result};
use crate::{canonical, empty_graph, SimpleGraph};

/// Largest possible edge count of a simple graph on `n` vertices.
pub fn max_edges(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Regular ring lattice: vertex `i` is joined to the `k / 2` vertices on each
/// side of it on the cycle `0..n`. Equivalent to a Watts-Strogatz graph with
/// rewiring probability zero.
pub fn ring_lattice(n: usize, k: usize) -> Result<SimpleGraph> {
    if n == 0 {
        return Err(GcpError::invalid("ring lattice needs at least one vertex"));
    }
    if k == 0 || k >= n {
        return Err(GcpError::invalid(format!(
            "ring lattice neighbor count must satisfy 0 < k < n, got k={} n={}",
            k, n
        )));
    }
    if k % 2 != 0 {
        return Err(GcpError::invalid(format!(
            "ring lattice neighbor count must be even, got k={}",
            k
        )));
    }

    let mut g = empty_graph(n);
    for i in 0..n {
        for j in 1..=k / 2 {
            g.add_edge(i, (i + j) % n, ());
        }
    }
    Ok(g)
}

/// Uniform random graph on `n` vertices with exactly `m` edges.
///
/// Sparse requests draw vertex pairs and reject repeats; once `m` passes half
/// of the complete-graph bound, `m` positions of the full pair list are
/// sampled without replacement instead.
pub fn random_graph<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Result<SimpleGraph> {
    if n == 0 {
        return Err(GcpError::invalid("random graph needs at least one vertex"));
    }
    let bound = max_edges(n);
    if m > bound {
        return Err(GcpError::invalid(format!(
            "random graph edge count {} exceeds the complete-graph bound {} for n={}",
            m, bound, n
        )));
    }

    let mut g = empty_graph(n);
    if m * 2 <= bound {
        while g.edge_count() < m {
            let u = rng.gen_range(0..n);
            let v = rng.gen_range(0..n);
            if u == v {
                continue;
            }
            let (a, b) = canonical(u, v);
            if !g.contains_edge(a, b) {
                g.add_edge(a, b, ());
            }
        }
    } else {
        let pairs: Vec<(usize, usize)> = (0..n).tuple_combinations().collect();
        for i in index::sample(rng, pairs.len(), m).into_iter() {
            let (u, v) = pairs[i];
            g.add_edge(u, v, ());
        }
    }
    Ok(g)
}
