//! Clause-by-clause refinement of preservation candidates.
//!
//! After each clause, every candidate `c` of a possibly-preserving
//! variable `v` is tested by merging the two: each occurrence of `v` in the
//! recursion matrix is renamed to the occurrence of `c` in the same row,
//! and the renamed clause graph is handed to the [`SizeGraphOracle`]. The
//! candidate survives only if the merge neither makes `c` incoherent nor
//! links `c`'s cluster to vertices that do not depend on it.
//!
//! A preserving equation holds in every clause, so one failing clause is
//! enough to drop a candidate for good. Candidate sets never grow.

use ori_sized::{SConstraint, SizeBound, SizeGraphOracle, SizeSolution, SizeVar};
use rustc_hash::FxHashMap;

use crate::context::AnalysisContext;
use crate::matrix::RecursionMatrix;
use crate::trace::{PreservationNote, RejectReason, Verdict};

/// Outcome of testing one candidate against one clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandidateCheck {
    Satisfiable,
    /// The oracle reported the candidate as an incoherent rigid.
    Incoherent,
    /// An edge of the merged graph ties a vertex that depends on the
    /// candidate to one that does not.
    Clustering,
}

impl CandidateCheck {
    fn verdict(self) -> Verdict {
        match self {
            CandidateCheck::Satisfiable => Verdict::Accepted,
            CandidateCheck::Incoherent => Verdict::Rejected(RejectReason::Incoherent),
            CandidateCheck::Clustering => Verdict::Rejected(RejectReason::Clustering),
        }
    }
}

/// Drop every candidate the current clause refutes.
#[tracing::instrument(level = "debug", skip_all, fields(
    function = ctx.current().raw(),
    edges = ctx.current_constraints().len(),
))]
pub fn refine_after_clause(ctx: &mut AnalysisContext, oracle: &dyn SizeGraphOracle) {
    let pending: Vec<(SizeVar, Vec<SizeVar>)> = ctx
        .candidates()
        .iter()
        .map(|(&var, candidates)| (var, candidates.clone()))
        .collect();

    for (var, candidates) in pending {
        let mut survivors = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let check = ctx.with_tentative_candidate(var, |ctx| {
                check_candidate(
                    oracle,
                    ctx.matrix(),
                    var,
                    candidate,
                    ctx.current_constraints(),
                    ctx.current_rigids(),
                )
            });
            tracing::debug!(%var, %candidate, ?check, "candidate checked");
            ctx.push_note(PreservationNote {
                function: ctx.current(),
                variable: var,
                candidate: Some(candidate),
                verdict: check.verdict(),
            });
            if check == CandidateCheck::Satisfiable {
                survivors.push(candidate);
            }
        }
        ctx.set_candidates(var, survivors);
    }
}

/// Whether `candidate` may still equal `preserving` given one clause.
pub fn check_satisfiable(
    oracle: &dyn SizeGraphOracle,
    matrix: &RecursionMatrix,
    preserving: SizeVar,
    candidate: SizeVar,
    graph: &[SConstraint],
    rigids: &[(SizeVar, SizeBound)],
) -> bool {
    check_candidate(oracle, matrix, preserving, candidate, graph, rigids)
        == CandidateCheck::Satisfiable
}

/// [`check_satisfiable`], reporting why a candidate fails.
///
/// # Panics
///
/// Panics if either variable is not a column of `matrix` (internal error).
pub fn check_candidate(
    oracle: &dyn SizeGraphOracle,
    matrix: &RecursionMatrix,
    preserving: SizeVar,
    candidate: SizeVar,
    graph: &[SConstraint],
    rigids: &[(SizeVar, SizeBound)],
) -> CandidateCheck {
    let from = matrix.column(preserving.index());
    let onto = matrix.column(candidate.index());
    let rename: FxHashMap<SizeVar, SizeVar> = from
        .iter()
        .copied()
        .zip(onto.iter().copied())
        .filter(|(a, b)| a != b)
        .collect();
    let renamed = |var: SizeVar| rename.get(&var).copied().unwrap_or(var);

    let merged: Vec<SConstraint> = graph.iter().map(|edge| edge.map_vars(renamed)).collect();
    // A renamed rigid now lives on as its image.
    let merged_rigids: Vec<(SizeVar, SizeBound)> = rigids
        .iter()
        .filter(|(var, _)| !rename.contains_key(var))
        .map(|&(var, bound)| match bound {
            SizeBound::Unbounded => (var, SizeBound::Unbounded),
            SizeBound::Below(target) => (var, SizeBound::Below(renamed(target))),
        })
        .collect();

    let solution = oracle.simplify(&merged_rigids, &merged);
    if oracle
        .incoherent_rigids(&solution, &merged)
        .contains(&candidate)
    {
        return CandidateCheck::Incoherent;
    }
    if merged
        .iter()
        .any(|edge| crosses_cluster(&solution, edge, candidate))
    {
        return CandidateCheck::Clustering;
    }
    CandidateCheck::Satisfiable
}

fn crosses_cluster(solution: &SizeSolution, edge: &SConstraint, candidate: SizeVar) -> bool {
    let depends = |var: SizeVar| {
        solution
            .exprs
            .get(&var)
            .is_some_and(|expr| expr.mentions(candidate))
    };
    edge.from != edge.to && depends(edge.from) != depends(edge.to)
}
