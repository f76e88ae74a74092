//! Size-annotated types.
//!
//! A [`SizeType`] is the skeleton of a function type that the termination
//! checker cares about: which data occurrences carry which size, and on
//! which side of an arrow they sit.
//!
//! # Polarity
//!
//! The whole signature starts in [`Polarity::Positive`]. Crossing into the
//! domain of an [`Arrow`](SizeType::Arrow) flips polarity exactly once;
//! tree children and generic bodies keep the polarity of their parent.

use crate::stack::ensure_sufficient_stack;
use crate::{GenericIdx, Size, SizeVar};

/// Position of an occurrence relative to the arrows around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Codomain-like position.
    Positive,
    /// Domain-like position.
    Negative,
}

impl Polarity {
    #[inline]
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// A sized type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeType {
    /// A data or record occurrence with its size and its sized arguments.
    Tree { size: Size, children: Vec<SizeType> },
    /// A function type.
    Arrow {
        domain: Box<SizeType>,
        codomain: Box<SizeType>,
    },
    /// Abstraction over `arity` type parameters.
    ///
    /// The parameters themselves are not size occurrences.
    Generic { arity: u32, body: Box<SizeType> },
    /// Reference to a parameter bound by an enclosing `Generic`.
    GenericVar(GenericIdx),
}

impl SizeType {
    /// A sized leaf with no sized arguments.
    pub fn leaf(size: Size) -> Self {
        SizeType::Tree {
            size,
            children: Vec::new(),
        }
    }

    /// A leaf sized by `var`.
    pub fn sized(var: SizeVar) -> Self {
        Self::leaf(Size::Defined(var))
    }

    pub fn tree(size: Size, children: Vec<SizeType>) -> Self {
        SizeType::Tree { size, children }
    }

    pub fn arrow(domain: SizeType, codomain: SizeType) -> Self {
        SizeType::Arrow {
            domain: Box::new(domain),
            codomain: Box::new(codomain),
        }
    }

    /// Right-nested arrows: `params[0] -> params[1] -> ... -> result`.
    pub fn function(params: impl IntoIterator<Item = SizeType>, result: SizeType) -> Self {
        let params: Vec<SizeType> = params.into_iter().collect();
        params
            .into_iter()
            .rev()
            .fold(result, |codomain, domain| SizeType::arrow(domain, codomain))
    }

    pub fn generic(arity: u32, body: SizeType) -> Self {
        SizeType::Generic {
            arity,
            body: Box::new(body),
        }
    }

    /// Visit every size occurrence in left-to-right order with its polarity.
    pub fn visit_sizes(&self, mut f: impl FnMut(Size, Polarity)) {
        self.visit_sizes_at(Polarity::Positive, &mut f);
    }

    fn visit_sizes_at(&self, polarity: Polarity, f: &mut impl FnMut(Size, Polarity)) {
        ensure_sufficient_stack(|| match self {
            SizeType::Tree { size, children } => {
                f(*size, polarity);
                for child in children {
                    child.visit_sizes_at(polarity, f);
                }
            }
            SizeType::Arrow { domain, codomain } => {
                domain.visit_sizes_at(polarity.flip(), f);
                codomain.visit_sizes_at(polarity, f);
            }
            SizeType::Generic { body, .. } => body.visit_sizes_at(polarity, f),
            SizeType::GenericVar(_) => {}
        });
    }

    /// Rebuild the type with every size occurrence passed through `f`.
    #[must_use]
    pub fn map_sizes(&self, mut f: impl FnMut(Size) -> Size) -> SizeType {
        self.map_sizes_with(&mut f)
    }

    fn map_sizes_with(&self, f: &mut impl FnMut(Size) -> Size) -> SizeType {
        ensure_sufficient_stack(|| match self {
            SizeType::Tree { size, children } => SizeType::Tree {
                size: f(*size),
                children: children.iter().map(|c| c.map_sizes_with(f)).collect(),
            },
            SizeType::Arrow { domain, codomain } => SizeType::Arrow {
                domain: Box::new(domain.map_sizes_with(f)),
                codomain: Box::new(codomain.map_sizes_with(f)),
            },
            SizeType::Generic { arity, body } => SizeType::Generic {
                arity: *arity,
                body: Box::new(body.map_sizes_with(f)),
            },
            SizeType::GenericVar(idx) => SizeType::GenericVar(*idx),
        })
    }

    /// Every defined size variable, deduplicated, in first-occurrence order.
    pub fn used_vars(&self) -> Vec<SizeVar> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut vars = Vec::new();
        self.visit_sizes(|size, _| {
            if let Some(var) = size.var() {
                if seen.insert(var) {
                    vars.push(var);
                }
            }
        });
        vars
    }
}

impl std::fmt::Display for SizeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeType::Tree { size, children } => {
                match size {
                    Size::Undefined => write!(f, "#inf")?,
                    Size::Defined(var) => write!(f, "#{var}")?,
                }
                if !children.is_empty() {
                    write!(f, "[")?;
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{child}")?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            SizeType::Arrow { domain, codomain } => write!(f, "({domain} -> {codomain})"),
            SizeType::Generic { arity, body } => write!(f, "forall {arity}. {body}"),
            SizeType::GenericVar(idx) => write!(f, "g{}", idx.raw()),
        }
    }
}
