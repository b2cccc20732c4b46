//! k-coloring as a DIMACS CNF formula.
//!
//! Vertex `v` (0-based) takes color `c` (1-based, `1..=k`) when variable
//! `v * k + c` is true. Per vertex the formula holds one at-least-one clause
//! and `C(k, 2)` at-most-one clauses; per edge it holds one conflict clause
//! per color.

use std::fmt;
use std::io::{self, Write};

use itertools::Itertools;

use crate::error::{GcpError, Result};
use crate::{stable_edges, Edge, SimpleGraph};

/// Clause list in DIMACS form: literals are nonzero, 1-based, negative when
/// negated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CnfFormula {
    pub num_vars: usize,
    pub clauses: Vec<Vec<i64>>,
}

/// Constraint a coloring clause encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    AtLeastOne { vertex: usize },
    AtMostOne { vertex: usize, colors: (usize, usize) },
    Conflict { edge: Edge, color: usize },
}

fn var(v: usize, c: usize, k: usize) -> i64 {
    (v * k + c) as i64
}

/// Inverse of `var`: (vertex, color). Literal 0 maps to vertex 0, color 0,
/// which no encoder clause uses.
fn vertex_color(literal: i64, k: usize) -> (usize, usize) {
    let Some(x) = (literal.unsigned_abs() as usize).checked_sub(1) else {
        return (0, 0);
    };
    (x / k, x % k + 1)
}

/// `|V| * (1 + C(k, 2)) + |E| * k`
pub fn expected_clause_count(num_vertices: usize, num_edges: usize, k: usize) -> usize {
    num_vertices * (1 + k * k.saturating_sub(1) / 2) + num_edges * k
}

/// Encode "`g` has a proper coloring with at most `k` colors".
///
/// Vertices are visited in ascending id order and edges in `stable_edges`
/// order, so equal inputs give identical formulas.
pub fn encode_coloring(g: &SimpleGraph, k: usize) -> Result<CnfFormula> {
    if k == 0 {
        return Err(GcpError::invalid("color count must be at least 1"));
    }
    let n = g.node_count();
    if let Some(v) = g.nodes().find(|&v| v >= n) {
        return Err(GcpError::invalid(format!(
            "vertex id {} outside the dense range 0..{}",
            v, n
        )));
    }

    let mut clauses: Vec<Vec<i64>> =
        Vec::with_capacity(expected_clause_count(n, g.edge_count(), k));

    for v in g.nodes().sorted() {
        clauses.push((1..=k).map(|c| var(v, c, k)).collect());
        for (i, j) in (1..=k).tuple_combinations() {
            clauses.push(vec![-var(v, i, k), -var(v, j, k)]);
        }
    }

    for (u, v) in stable_edges(g) {
        for c in 1..=k {
            clauses.push(vec![-var(u, c, k), -var(v, c, k)]);
        }
    }

    Ok(CnfFormula {
        num_vars: n * k,
        clauses,
    })
}

/// Which constraint an encoder clause stands for, or `None` if the clause
/// could not have come from `encode_coloring` with palette size `k`.
pub fn classify_clause(clause: &[i64], k: usize) -> Option<ClauseKind> {
    if k == 0 || clause.is_empty() || clause.contains(&0) {
        return None;
    }

    if clause.iter().all(|&l| l > 0) {
        if clause.len() != k {
            return None;
        }
        let (vertex, _) = vertex_color(clause[0], k);
        let expected = (1..=k).map(|c| var(vertex, c, k));
        return clause
            .iter()
            .copied()
            .eq(expected)
            .then_some(ClauseKind::AtLeastOne { vertex });
    }

    match clause {
        [a, b] if *a < 0 && *b < 0 => {
            let (u, cu) = vertex_color(*a, k);
            let (v, cv) = vertex_color(*b, k);
            if u == v && cu < cv {
                Some(ClauseKind::AtMostOne {
                    vertex: u,
                    colors: (cu, cv),
                })
            } else if u < v && cu == cv {
                Some(ClauseKind::Conflict {
                    edge: (u, v),
                    color: cu,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Per-vertex colors (1-based) from a model, `None` unless every vertex has
/// exactly one color.
pub fn decode_coloring(assignment: &[bool], num_vertices: usize, k: usize) -> Option<Vec<usize>> {
    (0..num_vertices)
        .map(|v| {
            (1..=k)
                .filter(|&c| assignment.get(v * k + c - 1).copied().unwrap_or(false))
                .exactly_one()
                .ok()
        })
        .collect()
}

impl CnfFormula {
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Evaluate under `assignment[i]` = value of variable `i + 1`; missing
    /// variables count as false and a literal `0` is never satisfied.
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        self.clauses.iter().all(|clause| {
            clause.iter().any(|&l| {
                let Some(index) = (l.unsigned_abs() as usize).checked_sub(1) else {
                    return false;
                };
                let value = assignment.get(index).copied().unwrap_or(false);
                if l > 0 { value } else { !value }
            })
        })
    }

    /// DIMACS text with a `c` line per comment ahead of the problem line.
    pub fn write_dimacs<W: Write>(&self, w: &mut W, comments: &[String]) -> io::Result<()> {
        for comment in comments {
            writeln!(w, "c {}", comment)?;
        }
        write!(w, "{}", self)?;
        w.flush()
    }

    pub fn to_dimacs_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.num_clauses())?;
        for clause in &self.clauses {
            writeln!(f, "{} 0", clause.iter().join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::empty_graph;
    use crate::generate::random_graph;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn graph(n: usize, edges: &[(usize, usize)]) -> SimpleGraph {
        let mut g = empty_graph(n);
        for &(u, v) in edges {
            g.add_edge(u, v, ());
        }
        g
    }

    /// Exhaustive search; only for tiny formulas.
    fn brute_force_model(f: &CnfFormula) -> Option<Vec<bool>> {
        assert!(f.num_vars <= 16);
        (0u32..1 << f.num_vars)
            .map(|bits| (0..f.num_vars).map(|i| bits >> i & 1 == 1).collect::<Vec<_>>())
            .find(|a| f.is_satisfied_by(a))
    }

    fn triangle() -> SimpleGraph {
        graph(3, &[(0, 1), (1, 2), (0, 2)])
    }

    #[test]
    fn single_edge_two_colors() {
        let f = encode_coloring(&graph(2, &[(0, 1)]), 2).unwrap();
        assert_eq!(f.num_vars, 4);
        assert_eq!(f.num_clauses(), 6);
        assert_eq!(
            f.to_dimacs_string(),
            "p cnf 4 6\n1 2 0\n-1 -2 0\n3 4 0\n-3 -4 0\n-1 -3 0\n-2 -4 0\n"
        );
    }

    #[test]
    fn triangle_is_not_two_colorable() {
        let f = encode_coloring(&triangle(), 2).unwrap();
        assert!(brute_force_model(&f).is_none());
    }

    #[test]
    fn triangle_is_three_colorable() {
        let f = encode_coloring(&triangle(), 3).unwrap();
        let model = brute_force_model(&f).expect("triangle has a 3-coloring");
        let colors = decode_coloring(&model, 3, 3).unwrap();
        assert_eq!(colors.iter().sorted().collect::<Vec<_>>(), vec![&1, &2, &3]);
    }

    #[test]
    fn models_decode_to_proper_colorings() {
        // path 0-1-2-3 with 2 colors has exactly two models
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let f = encode_coloring(&g, 2).unwrap();
        let models: Vec<Vec<usize>> = (0u32..1 << f.num_vars)
            .map(|bits| (0..f.num_vars).map(|i| bits >> i & 1 == 1).collect::<Vec<_>>())
            .filter(|a| f.is_satisfied_by(a))
            .map(|a| decode_coloring(&a, 4, 2).unwrap())
            .collect();
        assert_eq!(models.len(), 2);
        for colors in models {
            assert!(g.all_edges().all(|(u, v, _)| colors[u] != colors[v]));
        }
    }

    #[test]
    fn decode_rejects_vertices_without_a_single_color() {
        assert_eq!(decode_coloring(&[false, false], 1, 2), None);
        assert_eq!(decode_coloring(&[true, true], 1, 2), None);
        assert_eq!(decode_coloring(&[false, true], 1, 2), Some(vec![2]));
    }

    #[test]
    fn zero_colors_is_rejected() {
        assert!(matches!(
            encode_coloring(&triangle(), 0),
            Err(GcpError::InvalidParameter(_))
        ));
    }

    #[test]
    fn single_color_only_fits_edgeless_graphs() {
        let f = encode_coloring(&empty_graph(3), 1).unwrap();
        assert_eq!(f.clauses, vec![vec![1], vec![2], vec![3]]);
        assert!(f.is_satisfied_by(&[true, true, true]));

        let f = encode_coloring(&graph(2, &[(0, 1)]), 1).unwrap();
        assert!(brute_force_model(&f).is_none());
    }

    #[test]
    fn encoding_twice_gives_identical_bytes() {
        let mut rng = StdRng::seed_from_u64(8);
        let g = random_graph(30, 90, &mut rng).unwrap();
        let mut a = Vec::new();
        let mut b = Vec::new();
        encode_coloring(&g, 4).unwrap().write_dimacs(&mut a, &[]).unwrap();
        encode_coloring(&g, 4).unwrap().write_dimacs(&mut b, &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn comments_precede_the_problem_line() {
        let f = encode_coloring(&graph(2, &[(0, 1)]), 2).unwrap();
        let mut out = Vec::new();
        f.write_dimacs(&mut out, &["edge".to_string(), "k=2".to_string()])
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "c edge");
        assert_eq!(lines[1], "c k=2");
        assert_eq!(lines[2], "p cnf 4 6");
        assert_eq!(lines.len(), 3 + 6);
    }

    #[test]
    fn every_clause_classifies_back_to_its_constraint() {
        let mut rng = StdRng::seed_from_u64(13);
        let g = random_graph(25, 60, &mut rng).unwrap();
        let k = 4;
        let f = encode_coloring(&g, k).unwrap();

        let mut at_least = 0;
        let mut at_most = 0;
        let mut conflicts = Vec::new();
        for clause in &f.clauses {
            match classify_clause(clause, k).expect("encoder clause") {
                ClauseKind::AtLeastOne { vertex } => {
                    assert!(vertex < 25);
                    at_least += 1;
                }
                ClauseKind::AtMostOne { vertex, colors: (i, j) } => {
                    assert!(vertex < 25 && i < j && j <= k);
                    at_most += 1;
                }
                ClauseKind::Conflict { edge, color } => {
                    assert!(color >= 1 && color <= k);
                    conflicts.push(edge);
                }
            }
        }
        assert_eq!(at_least, 25);
        assert_eq!(at_most, 25 * k * (k - 1) / 2);
        let edges: Vec<Edge> = conflicts.into_iter().dedup().collect();
        assert_eq!(edges, stable_edges(&g));
    }

    #[test]
    fn zero_literal_is_never_satisfied() {
        let f = CnfFormula {
            num_vars: 1,
            clauses: vec![vec![0]],
        };
        assert!(!f.is_satisfied_by(&[true]));
        assert!(!f.is_satisfied_by(&[false]));

        let f = CnfFormula {
            num_vars: 1,
            clauses: vec![vec![0, 1]],
        };
        assert!(f.is_satisfied_by(&[true]));
        assert!(!f.is_satisfied_by(&[false]));
        assert_eq!(classify_clause(&[0, -1], 1), None);
    }

    #[test]
    fn foreign_clauses_do_not_classify() {
        assert_eq!(classify_clause(&[1, 3], 2), None);
        assert_eq!(classify_clause(&[-1, 3], 2), None);
        assert_eq!(classify_clause(&[-1, -4], 2), None);
        assert_eq!(classify_clause(&[], 2), None);
        assert_eq!(classify_clause(&[-2, -1], 2), None);
    }

    proptest! {
        #[test]
        fn clause_count_law(seed in any::<u64>(), n in 1usize..40, k in 1usize..7, density in 0.0f64..=1.0) {
            let mut rng = StdRng::seed_from_u64(seed);
            let m = (density * crate::generate::max_edges(n) as f64) as usize;
            let g = random_graph(n, m, &mut rng).unwrap();
            let f = encode_coloring(&g, k).unwrap();
            prop_assert_eq!(f.num_vars, n * k);
            prop_assert_eq!(f.num_clauses(), n * (1 + k * (k - 1) / 2) + m * k);
            prop_assert_eq!(f.num_clauses(), expected_clause_count(n, m, k));
            prop_assert!(f.clauses.iter().flatten().all(|&l| l != 0 && l.unsigned_abs() as usize <= f.num_vars));
        }
    }
}
