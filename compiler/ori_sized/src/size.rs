//! Sizes, rigid-variable bounds, and size-inequality edges.

use crate::SizeVar;

/// The size annotation on one data or record occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Size {
    /// Not tracked. Reads as "infinity" to the termination checker.
    Undefined,
    /// Tracked by a size variable.
    Defined(SizeVar),
}

impl Size {
    /// The variable behind this size, if tracked.
    #[inline]
    pub fn var(self) -> Option<SizeVar> {
        match self {
            Size::Undefined => None,
            Size::Defined(var) => Some(var),
        }
    }
}

/// Upper bound of a rigid variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeBound {
    Unbounded,
    /// Strictly below another variable: `self < var`.
    Below(SizeVar),
}

impl SizeBound {
    #[inline]
    pub fn bound_var(self) -> Option<SizeVar> {
        match self {
            SizeBound::Unbounded => None,
            SizeBound::Below(var) => Some(var),
        }
    }
}

/// Whether an edge demands a strict or non-strict inequality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// `from < to`
    Strict,
    /// `from <= to`
    NonStrict,
}

impl ConstraintKind {
    /// Longest-path weight of an edge of this kind.
    #[inline]
    pub fn weight(self) -> u32 {
        match self {
            ConstraintKind::Strict => 1,
            ConstraintKind::NonStrict => 0,
        }
    }
}

/// A directed edge of the size-inequality graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SConstraint {
    pub from: SizeVar,
    pub to: SizeVar,
    pub kind: ConstraintKind,
}

impl SConstraint {
    /// `from < to`
    #[inline]
    pub fn lt(from: SizeVar, to: SizeVar) -> Self {
        SConstraint {
            from,
            to,
            kind: ConstraintKind::Strict,
        }
    }

    /// `from <= to`
    #[inline]
    pub fn le(from: SizeVar, to: SizeVar) -> Self {
        SConstraint {
            from,
            to,
            kind: ConstraintKind::NonStrict,
        }
    }

    /// Rename both endpoints.
    #[inline]
    #[must_use]
    pub fn map_vars(self, mut f: impl FnMut(SizeVar) -> SizeVar) -> Self {
        SConstraint {
            from: f(self.from),
            to: f(self.to),
            kind: self.kind,
        }
    }
}

impl std::fmt::Display for SConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.kind {
            ConstraintKind::Strict => "<",
            ConstraintKind::NonStrict => "<=",
        };
        write!(f, "{} {op} {}", self.from, self.to)
    }
}
