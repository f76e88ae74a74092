//! Driver for one preservation run.
//!
//! ```text
//! initial_candidates ─▶ [begin_clause ─▶ build ─▶ refine_after_clause]* ─▶ decide ─▶ reify ─▶ compact
//! ```
//!
//! The caller builds each clause's constraints through the
//! [`AnalysisContext`] handed to [`PreservationRun::check_clause`]; the run
//! owns everything else.

use std::collections::BTreeMap;

use ori_sized::{FnName, SizeGraphOracle, SizeSignature, SizeVar};

use crate::context::AnalysisContext;
use crate::decompose::initial_candidates;
use crate::options::PreservationOptions;
use crate::refine::refine_after_clause;
use crate::reify::{compact, decide, reify, Instantiation};
use crate::trace::{PreservationNote, Verdict};

/// Per-clause result visible to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClauseSummary {
    /// Resolution of every flexible vertex of the clause graph.
    pub flexibles: BTreeMap<SizeVar, Instantiation>,
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreservationOutcome {
    pub signature: SizeSignature,
    /// One decision per possibly-preserving variable, by original index.
    pub decisions: Vec<(SizeVar, Instantiation)>,
    /// Empty unless tracing is enabled in the options.
    pub notes: Vec<PreservationNote>,
}

/// Preservation inference for one function of a mutual block.
pub struct PreservationRun<'o> {
    ctx: AnalysisContext,
    signature: SizeSignature,
    oracle: &'o dyn SizeGraphOracle,
    options: PreservationOptions,
}

impl<'o> PreservationRun<'o> {
    pub fn new(
        mutual_block: Vec<FnName>,
        current: FnName,
        signature: SizeSignature,
        oracle: &'o dyn SizeGraphOracle,
        options: PreservationOptions,
    ) -> Self {
        let mut ctx = AnalysisContext::new(mutual_block, current, &signature);
        ctx.seed_candidates(initial_candidates(&signature));
        tracing::debug!(
            function = current.raw(),
            vars = signature.var_count(),
            preserving = ctx.candidates().len(),
            "preservation run started",
        );
        PreservationRun {
            ctx,
            signature,
            oracle,
            options,
        }
    }

    /// Process one clause.
    ///
    /// `build` records the clause's rigids, constraints and recursive calls.
    /// If it fails, its error is returned as is and the candidates are left
    /// untouched.
    pub fn check_clause<E>(
        &mut self,
        build: impl FnOnce(&mut AnalysisContext) -> Result<(), E>,
    ) -> Result<ClauseSummary, E> {
        self.ctx.begin_clause(&self.signature.bounds);
        build(&mut self.ctx)?;
        refine_after_clause(&mut self.ctx, self.oracle);

        let solution = self
            .oracle
            .simplify(self.ctx.current_rigids(), self.ctx.current_constraints());
        Ok(ClauseSummary {
            flexibles: self.ctx.resolve_flexibles(&solution),
        })
    }

    pub fn candidates(&self) -> &BTreeMap<SizeVar, Vec<SizeVar>> {
        self.ctx.candidates()
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.ctx
    }

    /// Decide every possibly-preserving variable and rewrite the signature.
    pub fn finish(self) -> PreservationOutcome {
        let enabled = self.options.preservation_enabled();
        let function = self.ctx.current();
        let (candidates, mut notes) = self.ctx.into_parts();

        let decisions: Vec<(SizeVar, Instantiation)> = candidates
            .iter()
            .map(|(&var, survivors)| (var, decide(var, survivors, enabled)))
            .collect();
        notes.extend(decisions.iter().map(|&(variable, decision)| PreservationNote {
            function,
            variable,
            candidate: None,
            verdict: Verdict::Decided(decision),
        }));

        let signature = compact(&reify(&decisions, &self.signature));
        tracing::debug!(function = function.raw(), %signature, "preservation run finished");

        if !self.options.trace_enabled() {
            notes.clear();
        }
        PreservationOutcome {
            signature,
            decisions,
            notes,
        }
    }
}

#[cfg(test)]
mod tests;
