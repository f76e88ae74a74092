//! Sized-type model for the Ori termination checker.
//!
//! The termination checker annotates inductive and coinductive occurrences
//! with abstract size variables and tracks how sizes relate across calls.
//! This crate is the shared vocabulary of that analysis:
//!
//! - **Sizes** ([`Size`], [`SizeVar`]): an occurrence is either untracked
//!   or tracked by a variable.
//! - **Bounds and edges** ([`SizeBound`], [`SConstraint`]): rigid
//!   variables may sit strictly below another variable; the constraint graph
//!   is a flat list of `<` / `<=` edges.
//! - **Sized types and signatures** ([`SizeType`], [`SizeSignature`]).
//! - **Graph simplification** ([`SizeGraphOracle`], [`LongestPathOracle`]).
//!
//! # Crate Dependencies
//!
//! No `ori_*` dependencies. The analysis passes live in `ori_termination`.

pub mod graph;
mod ids;
mod signature;
mod size;
pub mod stack;
mod ty;

pub use graph::{LongestPathOracle, SizeExpr, SizeGraphOracle, SizeSolution};
pub use ids::{FnName, GenericIdx, SizeVar, Span};
pub use signature::SizeSignature;
pub use size::{ConstraintKind, SConstraint, Size, SizeBound};
pub use ty::{Polarity, SizeType};
