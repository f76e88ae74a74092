//! Size-graph simplification.
//!
//! The termination checker hands a clause's constraint graph and its rigid
//! variables to a [`SizeGraphOracle`], which assigns every vertex a
//! [`SizeExpr`] and reports the rigid variables that the graph forces into
//! contradictions. Preservation inference only relies on that contract.
//!
//! [`LongestPathOracle`] is the implementation used by the checker.
//!
//! # Algorithm
//!
//! Read every edge `from -> to` as "`to` is at least `weight` above
//! `from`", with weight 1 for strict edges and 0 otherwise, and every rigid
//! bound `r < b` as an edge of weight 1. The expression of a vertex maps
//! each rigid reachable upward to the longest-path gap between them.
//!
//! A rigid `r` is coherent when every gap in its expression is entailed by
//! its bound chain: `s` must be `r` itself at gap 0, or the ancestor
//! exactly `gap` bound steps above `r`.

use std::collections::{BTreeMap, BTreeSet};

use crate::{SConstraint, SizeBound, SizeVar};

/// Simplified size of one vertex: the rigid variables above it, each with
/// the minimum distance the graph demands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SizeExpr {
    pub above: BTreeMap<SizeVar, u32>,
}

impl SizeExpr {
    /// Whether `var` takes part in this expression.
    #[inline]
    pub fn mentions(&self, var: SizeVar) -> bool {
        self.above.contains_key(&var)
    }

    /// No rigid bounds the vertex from above.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.above.is_empty()
    }

    /// The rigid closest above the vertex; ties go to the lowest index.
    pub fn nearest_rigid(&self) -> Option<SizeVar> {
        self.above
            .iter()
            .min_by_key(|&(var, gap)| (*gap, *var))
            .map(|(var, _)| *var)
    }
}

/// Per-vertex assignment produced by [`SizeGraphOracle::simplify`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeSolution {
    pub exprs: BTreeMap<SizeVar, SizeExpr>,
    /// The rigid variables the solution was computed against.
    pub rigids: BTreeMap<SizeVar, SizeBound>,
}

impl SizeSolution {
    /// Expression of `var`; vertices the solver never saw are unbounded.
    pub fn expr(&self, var: SizeVar) -> SizeExpr {
        self.exprs.get(&var).cloned().unwrap_or_default()
    }

    #[inline]
    pub fn is_rigid(&self, var: SizeVar) -> bool {
        self.rigids.contains_key(&var)
    }
}

/// Contract of the graph-simplification collaborator.
pub trait SizeGraphOracle {
    /// Assign a size expression to every vertex of `graph`.
    fn simplify(&self, rigids: &[(SizeVar, SizeBound)], graph: &[SConstraint]) -> SizeSolution;

    /// Rigid variables forced into a contradiction by `solution`.
    fn incoherent_rigids(&self, solution: &SizeSolution, graph: &[SConstraint])
        -> BTreeSet<SizeVar>;
}

/// Longest-path simplifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct LongestPathOracle;

impl LongestPathOracle {
    pub fn new() -> Self {
        LongestPathOracle
    }
}

impl SizeGraphOracle for LongestPathOracle {
    #[tracing::instrument(level = "trace", skip_all, fields(
        rigids = rigids.len(),
        edges = graph.len(),
    ))]
    fn simplify(&self, rigids: &[(SizeVar, SizeBound)], graph: &[SConstraint]) -> SizeSolution {
        let rigid_map: BTreeMap<SizeVar, SizeBound> = rigids.iter().copied().collect();

        // Upward adjacency: vertex -> (successor, weight).
        let mut up: BTreeMap<SizeVar, Vec<(SizeVar, u32)>> = BTreeMap::new();
        let mut vertices: BTreeSet<SizeVar> = BTreeSet::new();
        for edge in graph {
            vertices.insert(edge.from);
            vertices.insert(edge.to);
            up.entry(edge.from)
                .or_default()
                .push((edge.to, edge.kind.weight()));
        }
        for (&rigid, bound) in &rigid_map {
            vertices.insert(rigid);
            if let SizeBound::Below(b) = bound {
                vertices.insert(*b);
                up.entry(rigid).or_default().push((*b, 1));
            }
        }

        // Gaps only exceed the vertex count on a strict cycle; saturate there.
        let cap = u32::try_from(vertices.len())
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1);

        let mut exprs: BTreeMap<SizeVar, SizeExpr> = vertices
            .iter()
            .map(|&v| {
                let mut expr = SizeExpr::default();
                if rigid_map.contains_key(&v) {
                    expr.above.insert(v, 0);
                }
                (v, expr)
            })
            .collect();

        // Monotone relaxation over a finite lattice (gaps are capped).
        let mut changed = true;
        while changed {
            changed = false;
            for (&from, succs) in &up {
                for &(to, weight) in succs {
                    let target: Vec<(SizeVar, u32)> = exprs
                        .get(&to)
                        .map(|e| e.above.iter().map(|(&r, &g)| (r, g)).collect())
                        .unwrap_or_default();
                    let Some(expr) = exprs.get_mut(&from) else {
                        continue;
                    };
                    for (rigid, gap) in target {
                        let candidate = gap.saturating_add(weight).min(cap);
                        match expr.above.get_mut(&rigid) {
                            Some(slot) if candidate <= *slot => {}
                            Some(slot) => {
                                *slot = candidate;
                                changed = true;
                            }
                            None => {
                                expr.above.insert(rigid, candidate);
                                changed = true;
                            }
                        }
                    }
                }
            }
        }

        SizeSolution {
            exprs,
            rigids: rigid_map,
        }
    }

    fn incoherent_rigids(
        &self,
        solution: &SizeSolution,
        _graph: &[SConstraint],
    ) -> BTreeSet<SizeVar> {
        let mut incoherent = BTreeSet::new();

        for &rigid in solution.rigids.keys() {
            let chain = bound_chain(rigid, &solution.rigids);
            let expr = solution.expr(rigid);
            for (&above, &gap) in &expr.above {
                let entailed = if above == rigid {
                    gap == 0
                } else {
                    chain.get(&above) == Some(&gap)
                };
                if !entailed {
                    tracing::trace!(%rigid, %above, gap, "unentailed size requirement");
                    incoherent.insert(rigid);
                    incoherent.insert(above);
                }
            }
        }

        incoherent
    }
}

/// Ancestors of `rigid` along its bounds, each with its step count.
fn bound_chain(rigid: SizeVar, rigids: &BTreeMap<SizeVar, SizeBound>) -> BTreeMap<SizeVar, u32> {
    let mut chain = BTreeMap::new();
    let mut current = rigid;
    let mut steps = 0u32;
    while let Some(SizeBound::Below(parent)) = rigids.get(&current) {
        steps += 1;
        if chain.insert(*parent, steps).is_some() || *parent == rigid {
            // Cyclic bounds: nothing further is entailed.
            break;
        }
        current = *parent;
    }
    chain
}
