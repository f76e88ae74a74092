//! Shared test utilities for the preservation passes.
//!
//! Clause builders model small first-order functions over naturals and
//! lists. Each one records what elaborating the clause would record: a
//! rigid per recursive pattern position, the recursive call's fresh
//! instantiation, and the `<=`/`<` edges between them. Only compiled in
//! test builds.

use std::convert::Infallible;

use ori_sized::{FnName, SConstraint, SizeBound, SizeSignature, SizeType, SizeVar};

use crate::context::AnalysisContext;
use crate::matrix::MatrixRow;

/// A clause body, as handed to `PreservationRun::check_clause`.
pub(crate) type Clause = fn(&mut AnalysisContext) -> Result<(), Infallible>;

/// Shorthand for `SizeVar::new(n)`.
pub(crate) fn s(n: u32) -> SizeVar {
    SizeVar::new(n)
}

/// Name of the analysed function.
pub(crate) const F: FnName = FnName::from_raw(1);

/// `D s0 -> ... -> D s{arity-1} -> D s{arity}`, all variables unbounded.
pub(crate) fn first_order(arity: u32) -> SizeSignature {
    let params = (0..arity).map(|i| SizeType::sized(s(i)));
    SizeSignature::new(
        vec![SizeBound::Unbounded; arity as usize + 1],
        [],
        SizeType::function(params, SizeType::sized(s(arity))),
    )
}

/// A fresh context for `signature`, seeded the way a run seeds it.
pub(crate) fn context_for(signature: &SizeSignature) -> AnalysisContext {
    let mut ctx = AnalysisContext::new(vec![F], F, signature);
    ctx.seed_candidates(crate::decompose::initial_candidates(signature));
    ctx.begin_clause(&signature.bounds);
    ctx
}

/// Instantiate `signature` at a recursive call site and record its row.
pub(crate) fn recursive_call(ctx: &mut AnalysisContext, signature: &SizeSignature) -> MatrixRow {
    let fresh = ctx.freshen_signature(signature);
    ctx.record_recursive_call(fresh.vars.iter().copied());
    fresh.vars
}

/// A constructor of size `t` wrapping `inner` once: `inner < t`, `t <= result`.
fn wrap(ctx: &mut AnalysisContext, inner: SizeVar, result: SizeVar) {
    let t = ctx.new_variable();
    ctx.record_constraint(SConstraint::lt(inner, t));
    ctx.record_constraint(SConstraint::le(t, result));
}

// ── copy : List s0 -> List s1 ───────────────────────────────────────

/// `copy [] = []`
pub(crate) fn copy_nil(ctx: &mut AnalysisContext) -> Result<(), Infallible> {
    let nil = ctx.new_rigid(SizeBound::Below(s(0)));
    ctx.add_leaf_rigid(nil);
    let t = ctx.new_variable();
    ctx.mark_bottom(t);
    ctx.record_constraint(SConstraint::le(t, s(1)));
    Ok(())
}

/// `copy (x :: xs) = x :: copy xs`
pub(crate) fn copy_cons(ctx: &mut AnalysisContext) -> Result<(), Infallible> {
    let xs = ctx.new_rigid(SizeBound::Below(s(0)));
    let call = recursive_call(ctx, &first_order(1));
    ctx.record_constraint(SConstraint::le(xs, call[0]));
    wrap(ctx, call[1], s(1));
    Ok(())
}

/// `grow (x :: xs) = x :: x :: grow xs`
pub(crate) fn grow_cons(ctx: &mut AnalysisContext) -> Result<(), Infallible> {
    let xs = ctx.new_rigid(SizeBound::Below(s(0)));
    let call = recursive_call(ctx, &first_order(1));
    ctx.record_constraint(SConstraint::le(xs, call[0]));
    let inner = ctx.new_variable();
    ctx.record_constraint(SConstraint::lt(call[1], inner));
    wrap(ctx, inner, s(1));
    Ok(())
}

// ── plus : Nat s0 -> Nat s1 -> Nat s2 ───────────────────────────────

/// `plus zero y = y`
pub(crate) fn plus_zero(ctx: &mut AnalysisContext) -> Result<(), Infallible> {
    ctx.record_constraint(SConstraint::le(s(1), s(2)));
    Ok(())
}

/// `plus (suc x) y = suc (plus x y)`
pub(crate) fn plus_suc(ctx: &mut AnalysisContext) -> Result<(), Infallible> {
    let x = ctx.new_rigid(SizeBound::Below(s(0)));
    let call = recursive_call(ctx, &first_order(2));
    ctx.record_constraint(SConstraint::le(x, call[0]));
    ctx.record_constraint(SConstraint::le(s(1), call[1]));
    wrap(ctx, call[2], s(2));
    Ok(())
}

// ── lockstep : Nat s0 -> Nat s1 -> Nat s2 ───────────────────────────

/// `lockstep zero zero = zero`
pub(crate) fn both_zero(ctx: &mut AnalysisContext) -> Result<(), Infallible> {
    let t = ctx.new_variable();
    ctx.mark_bottom(t);
    ctx.record_constraint(SConstraint::le(t, s(2)));
    Ok(())
}

/// `lockstep (suc x) (suc y) = suc (lockstep x y)`
pub(crate) fn both_suc(ctx: &mut AnalysisContext) -> Result<(), Infallible> {
    let x = ctx.new_rigid(SizeBound::Below(s(0)));
    let y = ctx.new_rigid(SizeBound::Below(s(1)));
    let call = recursive_call(ctx, &first_order(2));
    ctx.record_constraint(SConstraint::le(x, call[0]));
    ctx.record_constraint(SConstraint::le(y, call[1]));
    wrap(ctx, call[2], s(2));
    Ok(())
}
