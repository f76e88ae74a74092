//! Polarity decomposition of sized signatures.
//!
//! Splits the size variables used by a signature into two roles:
//!
//! - **positive**: variables that may be *preserving*: an output whose size
//!   might equal some input's size.
//! - **negative**: variables that may serve as the *candidate source* for a
//!   preserving variable.
//!
//! For inductive data the roles follow polarity directly: codomain
//! occurrences are positive, domain occurrences negative. Coinductive data
//! is observed rather than built, so preservation reasons from the codomain
//! back toward the domain and the roles swap:
//!
//! ```text
//! positive = inductive-codomain ∪ coinductive-domain
//! negative = inductive-domain   ∪ coinductive-codomain
//! ```

use std::collections::BTreeMap;

use ori_sized::{Polarity, SizeSignature, SizeType, SizeVar};
use rustc_hash::FxHashSet;

/// The two roles of a signature's size variables.
///
/// Each used variable appears in exactly one list, classified by its first
/// occurrence; both lists keep first-occurrence order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decomposition {
    pub positive: Vec<SizeVar>,
    pub negative: Vec<SizeVar>,
}

impl Decomposition {
    /// `negative` followed by `positive`: the canonical variable order of a
    /// compacted signature.
    pub fn ordered(&self) -> impl Iterator<Item = SizeVar> + '_ {
        self.negative.iter().chain(&self.positive).copied()
    }
}

/// Classify every size occurrence in `ty`.
pub fn decompose(coinductive: &[SizeVar], ty: &SizeType) -> Decomposition {
    let mut seen = FxHashSet::default();
    let mut result = Decomposition::default();

    ty.visit_sizes(|size, polarity| {
        let Some(var) = size.var() else {
            return;
        };
        if !seen.insert(var) {
            return;
        }
        let role = if coinductive.contains(&var) {
            polarity.flip()
        } else {
            polarity
        };
        match role {
            Polarity::Positive => result.positive.push(var),
            Polarity::Negative => result.negative.push(var),
        }
    });

    result
}

/// Seed the candidate map for a signature.
///
/// Every possibly-preserving variable starts with every candidate-source
/// variable of the same kind: an inductive result can only equal an
/// inductive argument, and likewise for coinductive ones.
pub fn initial_candidates(signature: &SizeSignature) -> BTreeMap<SizeVar, Vec<SizeVar>> {
    let decomposition = decompose(&signature.contravariant, &signature.ty);

    decomposition
        .positive
        .iter()
        .map(|&var| {
            let coinductive = signature.is_contravariant(var);
            let candidates = decomposition
                .negative
                .iter()
                .copied()
                .filter(|&source| signature.is_contravariant(source) == coinductive)
                .collect();
            (var, candidates)
        })
        .collect()
}
