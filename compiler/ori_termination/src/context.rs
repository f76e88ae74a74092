//! Mutable state of one preservation run.
//!
//! An [`AnalysisContext`] lives for the whole check of one mutual block and
//! has two tiers of state:
//!
//! - **Run-scoped** fields (variable counter, recursion matrix, candidate
//!   map, contravariant set, call records, notes) persist across clauses.
//! - **Clause-scoped** fields (constraints, rigids, local context, leaf
//!   rigids) are reset by [`AnalysisContext::begin_clause`].
//!
//! Speculative edits go through [`LocalBindingGuard`] and
//! [`TentativeCandidateGuard`], which restore the prior state when dropped.

use std::collections::{BTreeMap, BTreeSet};

use ori_sized::{
    FnName, GenericIdx, SConstraint, Size, SizeBound, SizeExpr, SizeSignature, SizeSolution,
    SizeType, SizeVar, Span,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::matrix::{MatrixRow, RecursionMatrix};
use crate::reify::Instantiation;
use crate::trace::PreservationNote;

mod guards;

pub use guards::{LocalBindingGuard, TentativeCandidateGuard};

/// A call from one member of the mutual block to another (or itself).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecursiveCall {
    pub caller: FnName,
    pub callee: FnName,
    pub domain: SmallVec<[Size; 4]>,
    pub codomain: SmallVec<[Size; 4]>,
    pub span: Span,
}

/// What a local binder stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalEntry {
    Sized(SizeType),
    Generic(GenericIdx),
}

/// A signature instantiated at one call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreshSignature {
    /// Fresh variable for each signature slot, in slot order.
    pub vars: MatrixRow,
    pub ty: SizeType,
}

#[derive(Clone, Debug, Default)]
struct ClauseState {
    constraints: Vec<SConstraint>,
    rigids: Vec<(SizeVar, SizeBound)>,
    /// Innermost binder last.
    locals: Vec<LocalEntry>,
    leaf_rigids: Vec<SizeVar>,
}

/// State of one preservation run over a mutual block.
#[derive(Clone, Debug)]
pub struct AnalysisContext {
    mutual_block: Vec<FnName>,
    current: FnName,
    calls: Vec<RecursiveCall>,
    all_constraints: Vec<SConstraint>,
    next_var: u32,
    bottom: BTreeSet<SizeVar>,
    contravariant: BTreeSet<SizeVar>,
    fallback: BTreeMap<SizeVar, Instantiation>,
    undefined_lower: BTreeSet<SizeVar>,
    matrix: RecursionMatrix,
    candidates: BTreeMap<SizeVar, Vec<SizeVar>>,
    notes: Vec<PreservationNote>,
    clause: ClauseState,
}

impl AnalysisContext {
    /// Start a run for `current`, whose sized signature is `signature`.
    ///
    /// The signature's own variables occupy `0..var_count()` and form row 0
    /// of the recursion matrix; fresh variables are numbered after them.
    pub fn new(mutual_block: Vec<FnName>, current: FnName, signature: &SizeSignature) -> Self {
        let next_var = u32::try_from(signature.var_count()).unwrap_or_else(|_| {
            panic!(
                "signature with {} size variables exceeds u32::MAX",
                signature.var_count()
            )
        });
        AnalysisContext {
            mutual_block,
            current,
            calls: Vec::new(),
            all_constraints: Vec::new(),
            next_var,
            bottom: BTreeSet::new(),
            contravariant: signature.contravariant.iter().copied().collect(),
            fallback: BTreeMap::new(),
            undefined_lower: BTreeSet::new(),
            matrix: RecursionMatrix::new(signature.vars()),
            candidates: BTreeMap::new(),
            notes: Vec::new(),
            clause: ClauseState::default(),
        }
    }

    // ── Clause lifecycle ────────────────────────────────────────────

    /// Reset the clause-scoped state for a new clause.
    ///
    /// Variable `i` becomes a rigid for `bounds[i]`. All of them start
    /// unbounded: the clause's patterns re-establish any ordering between
    /// them through [`record_constraint`](Self::record_constraint).
    pub fn begin_clause(&mut self, bounds: &[SizeBound]) {
        self.clause = ClauseState {
            rigids: (0..bounds.len())
                .map(|i| (SizeVar::from_index(i), SizeBound::Unbounded))
                .collect(),
            ..ClauseState::default()
        };
        tracing::trace!(rigids = bounds.len(), "begin clause");
    }

    /// Allocate a variable. Never returns the same one twice in a run.
    pub fn new_variable(&mut self) -> SizeVar {
        let var = SizeVar::new(self.next_var);
        self.next_var += 1;
        var
    }

    /// Allocate a variable and register it as a rigid of this clause.
    pub fn new_rigid(&mut self, bound: SizeBound) -> SizeVar {
        let var = self.new_variable();
        self.clause.rigids.push((var, bound));
        var
    }

    pub fn record_constraint(&mut self, edge: SConstraint) {
        tracing::trace!(%edge, "constraint");
        self.clause.constraints.push(edge);
        self.all_constraints.push(edge);
    }

    /// Add one occurrence of the analysed function to the recursion matrix.
    ///
    /// # Panics
    ///
    /// Panics if `sizes` does not have one entry per signature variable.
    pub fn record_recursive_call(&mut self, sizes: impl IntoIterator<Item = SizeVar>) {
        self.matrix.push_row(sizes);
    }

    /// Keep a call record for later consumers.
    ///
    /// # Panics
    ///
    /// Panics if the callee is not a member of the mutual block.
    pub fn record_call(&mut self, call: RecursiveCall) {
        assert!(
            self.mutual_block.contains(&call.callee),
            "internal error: call to fn#{} recorded as recursive outside its mutual block",
            call.callee.raw()
        );
        self.calls.push(call);
    }

    /// Instantiate `signature` with fresh variables.
    ///
    /// Bounded slots record `fresh < fresh_bound`, and fresh copies of
    /// contravariant slots join the persistent contravariant set. Two
    /// instantiations of the same signature never share a variable.
    ///
    /// # Panics
    ///
    /// Panics if the body or a bound mentions a variable the signature does
    /// not quantify over (internal error).
    pub fn freshen_signature(&mut self, signature: &SizeSignature) -> FreshSignature {
        let vars: MatrixRow = signature.vars().map(|_| self.new_variable()).collect();

        for (slot, bound) in signature.bounds.iter().enumerate() {
            if let SizeBound::Below(target) = *bound {
                let edge = SConstraint::lt(vars[slot], fresh_slot(&vars, target));
                self.record_constraint(edge);
            }
        }
        for &var in &signature.contravariant {
            self.contravariant.insert(fresh_slot(&vars, var));
        }

        let ty = signature.ty.map_sizes(|size| match size {
            Size::Undefined => Size::Undefined,
            Size::Defined(var) => Size::Defined(fresh_slot(&vars, var)),
        });
        FreshSignature { vars, ty }
    }

    /// Run `scope` with `entry` bound at position `index`.
    ///
    /// Entries at or above `index` move up by one for the duration of the
    /// scope; the previous local context is restored however `scope` exits.
    pub fn with_local_binding<T>(
        &mut self,
        index: usize,
        entry: LocalEntry,
        scope: impl FnOnce(&mut AnalysisContext) -> T,
    ) -> T {
        let mut guard = self.bind_local(index, entry);
        scope(&mut guard)
    }

    /// Run `scope` with `var`'s candidate list emptied, restoring it
    /// afterwards unconditionally.
    pub fn with_tentative_candidate<T>(
        &mut self,
        var: SizeVar,
        scope: impl FnOnce(&mut AnalysisContext) -> T,
    ) -> T {
        let mut guard = self.tentative_candidate(var);
        scope(&mut guard)
    }

    // ── Flexible resolution ─────────────────────────────────────────

    /// `var` stands for a constructor with no recursive argument.
    pub fn mark_bottom(&mut self, var: SizeVar) {
        self.bottom.insert(var);
    }

    /// `var` is a rigid for a pattern with no recursive position.
    pub fn add_leaf_rigid(&mut self, var: SizeVar) {
        self.clause.leaf_rigids.push(var);
    }

    pub fn mark_undefined_lower(&mut self, var: SizeVar) {
        self.undefined_lower.insert(var);
    }

    /// Last-resort resolution for `var`.
    pub fn set_fallback(&mut self, var: SizeVar, instantiation: Instantiation) {
        self.fallback.insert(var, instantiation);
    }

    /// Resolve every flexible vertex of the current clause graph.
    pub fn resolve_flexibles(&self, solution: &SizeSolution) -> BTreeMap<SizeVar, Instantiation> {
        let rigid: FxHashSet<SizeVar> = self.clause.rigids.iter().map(|&(var, _)| var).collect();
        let least_leaf = self.clause.leaf_rigids.iter().min().copied();

        self.clause
            .constraints
            .iter()
            .flat_map(|edge| [edge.from, edge.to])
            .filter(|var| !rigid.contains(var))
            .map(|var| (var, self.resolve_flexible(var, solution, least_leaf)))
            .collect()
    }

    fn resolve_flexible(
        &self,
        var: SizeVar,
        solution: &SizeSolution,
        least_leaf: Option<SizeVar>,
    ) -> Instantiation {
        if self.undefined_lower.contains(&var) {
            return Instantiation::Infinity;
        }
        if self.bottom.contains(&var) {
            if let Some(leaf) = least_leaf {
                return Instantiation::To(leaf);
            }
        }
        if let Some(rigid) = solution
            .exprs
            .get(&var)
            .and_then(SizeExpr::nearest_rigid)
        {
            return Instantiation::To(rigid);
        }
        self.fallback
            .get(&var)
            .copied()
            .unwrap_or(Instantiation::Infinity)
    }

    // ── Candidates and notes ────────────────────────────────────────

    /// Install the initial candidate map.
    pub fn seed_candidates(&mut self, candidates: BTreeMap<SizeVar, Vec<SizeVar>>) {
        self.candidates = candidates;
    }

    /// Replace `var`'s candidates with a subset of them.
    pub fn set_candidates(&mut self, var: SizeVar, survivors: Vec<SizeVar>) {
        debug_assert!(
            self.candidates
                .get(&var)
                .is_some_and(|old| survivors.iter().all(|s| old.contains(s))),
            "candidate sets only shrink"
        );
        self.candidates.insert(var, survivors);
    }

    pub fn candidates(&self) -> &BTreeMap<SizeVar, Vec<SizeVar>> {
        &self.candidates
    }

    pub fn push_note(&mut self, note: PreservationNote) {
        self.notes.push(note);
    }

    pub fn notes(&self) -> &[PreservationNote] {
        &self.notes
    }

    /// Split the run's results off the context.
    pub fn into_parts(self) -> (BTreeMap<SizeVar, Vec<SizeVar>>, Vec<PreservationNote>) {
        (self.candidates, self.notes)
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[inline]
    pub fn current(&self) -> FnName {
        self.current
    }

    #[inline]
    pub fn mutual_block(&self) -> &[FnName] {
        &self.mutual_block
    }

    pub fn calls(&self) -> &[RecursiveCall] {
        &self.calls
    }

    pub fn current_constraints(&self) -> &[SConstraint] {
        &self.clause.constraints
    }

    pub fn all_constraints(&self) -> &[SConstraint] {
        &self.all_constraints
    }

    pub fn current_rigids(&self) -> &[(SizeVar, SizeBound)] {
        &self.clause.rigids
    }

    pub fn leaf_rigids(&self) -> &[SizeVar] {
        &self.clause.leaf_rigids
    }

    pub fn locals(&self) -> &[LocalEntry] {
        &self.clause.locals
    }

    pub fn is_contravariant(&self, var: SizeVar) -> bool {
        self.contravariant.contains(&var)
    }

    pub fn matrix(&self) -> &RecursionMatrix {
        &self.matrix
    }
}

fn fresh_slot(vars: &[SizeVar], var: SizeVar) -> SizeVar {
    match vars.get(var.index()) {
        Some(&fresh) => fresh,
        None => panic!(
            "internal error: size variable {var} outside a signature of {} variables",
            vars.len()
        ),
    }
}
