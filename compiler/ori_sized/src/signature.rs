//! Sized function signatures.

use crate::{SizeBound, SizeType, SizeVar};

/// The sized signature of one function.
///
/// The signature's own size variables are `0..bounds.len()`; `bounds[i]`
/// is the bound of variable `i`. Variables listed in `contravariant` size
/// coinductive occurrences.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeSignature {
    pub bounds: Vec<SizeBound>,
    /// Sorted, without duplicates.
    pub contravariant: Vec<SizeVar>,
    pub ty: SizeType,
}

impl SizeSignature {
    pub fn new(
        bounds: Vec<SizeBound>,
        contravariant: impl IntoIterator<Item = SizeVar>,
        ty: SizeType,
    ) -> Self {
        let mut contravariant: Vec<SizeVar> = contravariant.into_iter().collect();
        contravariant.sort_unstable();
        contravariant.dedup();
        SizeSignature {
            bounds,
            contravariant,
            ty,
        }
    }

    /// Number of size variables the signature quantifies over.
    #[inline]
    pub fn var_count(&self) -> usize {
        self.bounds.len()
    }

    /// The signature's own variables, `0..var_count()`.
    pub fn vars(&self) -> impl Iterator<Item = SizeVar> {
        (0..self.bounds.len()).map(SizeVar::from_index)
    }

    #[inline]
    pub fn is_contravariant(&self, var: SizeVar) -> bool {
        self.contravariant.binary_search(&var).is_ok()
    }

    /// Bound of one of the signature's variables, if it has one recorded.
    #[inline]
    pub fn bound_of(&self, var: SizeVar) -> Option<SizeBound> {
        self.bounds.get(var.index()).copied()
    }
}

impl std::fmt::Display for SizeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, bound) in self.bounds.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let var = SizeVar::from_index(i);
            match bound {
                SizeBound::Unbounded => write!(f, "{var}")?,
                SizeBound::Below(b) => write!(f, "{var} < {b}")?,
            }
            if self.is_contravariant(var) {
                write!(f, " co")?;
            }
        }
        write!(f, "] {}", self.ty)
    }
}

#[cfg(test)]
mod tests;
