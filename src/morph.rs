use std::collections::BTreeSet;

use rand::seq::index;
use rand::Rng;

use crate::error::{GcpError, Result};
use crate::{stable_edges, Edge, SimpleGraph};

/// Number of edges to draw from an exclusive set of size `available` when
/// keeping a `fraction` of it. Rounding can never push it past `available`.
fn sample_size(fraction: f64, available: usize) -> usize {
    ((fraction * available as f64).floor() as usize).min(available)
}

fn sample_edges<R: Rng + ?Sized>(pool: &[Edge], amount: usize, rng: &mut R) -> Vec<Edge> {
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// p-morph of `g1` and `g2`.
///
/// Edges shared by both graphs are always kept. Of the edges only `g1` has, a
/// `p` fraction is drawn uniformly; of those only `g2` has, a `1 - p`
/// fraction. The result lives on the vertex set of `g1`.
pub fn morph_graphs<R: Rng + ?Sized>(
    g1: &SimpleGraph,
    g2: &SimpleGraph,
    p: f64,
    rng: &mut R,
) -> Result<SimpleGraph> {
    if !(0.0..=1.0).contains(&p) {
        return Err(GcpError::invalid(format!(
            "morph ratio must lie in [0, 1], got {}",
            p
        )));
    }
    if g1.node_count() != g2.node_count() {
        return Err(GcpError::invalid(format!(
            "morph needs graphs on the same vertex set, got {} and {} vertices",
            g1.node_count(),
            g2.node_count()
        )));
    }

    let e1: BTreeSet<Edge> = stable_edges(g1).into_iter().collect();
    let e2: BTreeSet<Edge> = stable_edges(g2).into_iter().collect();

    let common: Vec<Edge> = e1.intersection(&e2).copied().collect();
    let only_g1: Vec<Edge> = e1.difference(&e2).copied().collect();
    let only_g2: Vec<Edge> = e2.difference(&e1).copied().collect();

    let from_g1 = sample_edges(&only_g1, sample_size(p, only_g1.len()), rng);
    let from_g2 = sample_edges(&only_g2, sample_size(1.0 - p, only_g2.len()), rng);

    log::trace!(
        "morph p={}: {} common, {}/{} from g1, {}/{} from g2",
        p,
        common.len(),
        from_g1.len(),
        only_g1.len(),
        from_g2.len(),
        only_g2.len()
    );

    let mut out =
        SimpleGraph::with_capacity(g1.node_count(), common.len() + from_g1.len() + from_g2.len());
    for v in g1.nodes() {
        out.add_node(v);
    }
    for (u, v) in common.into_iter().chain(from_g1).chain(from_g2) {
        out.add_edge(u, v, ());
    }
    Ok(out)
}
