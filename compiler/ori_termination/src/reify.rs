//! Committing preservation decisions into a signature.
//!
//! Once refinement has converged, every possibly-preserving variable is
//! [`decide`]d, [`reify`] rewrites the signature so each decided variable
//! either becomes its chosen source or stops being tracked, and
//! [`compact`] renumbers what is left densely in canonical order.

use ori_sized::{Size, SizeBound, SizeSignature, SizeVar};
use rustc_hash::FxHashMap;

use crate::decompose::decompose;

/// Final resolution of a size variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instantiation {
    /// The variable is the same size as this one.
    To(SizeVar),
    /// Unrelated or unknown; the occurrence stops being tracked.
    Infinity,
}

/// Resolve one possibly-preserving variable from its surviving candidates.
///
/// Only a single survivor is evidence of preservation. No survivors (no
/// evidence) and several survivors (ambiguous evidence) both resolve to
/// [`Instantiation::Infinity`], as does everything when `enabled` is off.
pub fn decide(var: SizeVar, survivors: &[SizeVar], enabled: bool) -> Instantiation {
    let decision = match survivors {
        [only] if enabled => Instantiation::To(*only),
        _ => Instantiation::Infinity,
    };
    tracing::debug!(
        %var,
        survivors = survivors.len(),
        enabled,
        ?decision,
        "preservation decision",
    );
    decision
}

/// Rewrite `signature` through the decisions in `mapping`.
///
/// `mapping` lists `(original index, decision)` pairs in ascending index
/// order. Every decided index is eliminated: indices above it shift down
/// by the number of eliminated indices below them, occurrences of a
/// decided variable become its target (itself shifted) or
/// [`Size::Undefined`] for `Infinity`.
///
/// # Panics
///
/// Panics if a decision targets another decided variable (internal error).
#[tracing::instrument(level = "debug", skip_all, fields(decisions = mapping.len()))]
pub fn reify(mapping: &[(SizeVar, Instantiation)], signature: &SizeSignature) -> SizeSignature {
    debug_assert!(
        mapping.windows(2).all(|w| w[0].0 < w[1].0),
        "reify mapping must be strictly ascending"
    );

    let eliminated: Vec<SizeVar> = mapping.iter().map(|&(var, _)| var).collect();
    let decision_of = |var: SizeVar| {
        eliminated
            .binary_search(&var)
            .ok()
            .map(|pos| mapping[pos].1)
    };
    let shift = |var: SizeVar| {
        let offset = eliminated.partition_point(|&e| e < var);
        SizeVar::from_index(var.index() - offset)
    };
    let renamed = |var: SizeVar| -> Option<SizeVar> {
        match decision_of(var) {
            None => Some(shift(var)),
            Some(Instantiation::Infinity) => None,
            Some(Instantiation::To(target)) => {
                assert!(
                    decision_of(target).is_none(),
                    "internal error: preservation target {target} of {var} was itself eliminated"
                );
                Some(shift(target))
            }
        }
    };

    let ty = signature.ty.map_sizes(|size| match size {
        Size::Undefined => Size::Undefined,
        Size::Defined(var) => renamed(var).map_or(Size::Undefined, Size::Defined),
    });

    let bounds = signature
        .vars()
        .zip(&signature.bounds)
        .filter(|&(var, _)| decision_of(var).is_none())
        .map(|(_, bound)| match bound {
            SizeBound::Unbounded => SizeBound::Unbounded,
            SizeBound::Below(b) => renamed(*b).map_or(SizeBound::Unbounded, SizeBound::Below),
        })
        .collect();

    let contravariant: Vec<SizeVar> = signature
        .contravariant
        .iter()
        .filter_map(|&var| renamed(var))
        .collect();

    SizeSignature::new(bounds, contravariant, ty)
}

/// Renumber the variables of `signature` densely from zero.
///
/// Surviving variables are the ones its type still mentions, in
/// negative-then-positive order, followed by any variable only reachable
/// as a bound, in the order the bounds reach it. Bounds and the contravariant set are remapped;
/// contravariant entries that no longer survive are dropped.
///
/// # Panics
///
/// Panics if a surviving variable has no recorded bound (internal error).
#[tracing::instrument(level = "debug", skip_all, fields(vars = signature.var_count()))]
pub fn compact(signature: &SizeSignature) -> SizeSignature {
    let decomposition = decompose(&signature.contravariant, &signature.ty);

    let mut order: Vec<SizeVar> = decomposition.ordered().collect();
    let mut index: FxHashMap<SizeVar, SizeVar> = FxHashMap::default();
    for (new, &old) in order.iter().enumerate() {
        index.insert(old, SizeVar::from_index(new));
    }

    // Bound targets must survive with the variables they bound.
    let mut cursor = 0;
    while cursor < order.len() {
        let var = order[cursor];
        let bound = bound_or_die(signature, var);
        if let SizeBound::Below(target) = bound {
            if !index.contains_key(&target) {
                index.insert(target, SizeVar::from_index(order.len()));
                order.push(target);
            }
        }
        cursor += 1;
    }

    let bounds = order
        .iter()
        .map(|&old| match bound_or_die(signature, old) {
            SizeBound::Unbounded => SizeBound::Unbounded,
            SizeBound::Below(target) => SizeBound::Below(index[&target]),
        })
        .collect();

    let ty = signature.ty.map_sizes(|size| match size {
        Size::Undefined => Size::Undefined,
        Size::Defined(var) => Size::Defined(index[&var]),
    });

    let contravariant: Vec<SizeVar> = signature
        .contravariant
        .iter()
        .filter_map(|var| index.get(var).copied())
        .collect();

    SizeSignature::new(bounds, contravariant, ty)
}

fn bound_or_die(signature: &SizeSignature, var: SizeVar) -> SizeBound {
    match signature.bound_of(var) {
        Some(bound) => bound,
        None => panic!(
            "internal error: surviving size variable {var} has no recorded bound ({} bounds)",
            signature.var_count()
        ),
    }
}
