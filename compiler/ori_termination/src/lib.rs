//! Size-preservation inference for the Ori termination checker.
//!
//! The termination checker proves that recursive calls shrink their
//! arguments. This crate sharpens that reasoning by inferring when a
//! function's result is exactly as large as one of its arguments, and
//! rewriting the function's sized signature to say so.
//!
//! - **Context** ([`AnalysisContext`]): the mutable state of one run over a
//!   mutual block, with clause-scoped resets and rollback guards.
//! - **Decomposition** ([`decompose`]): splits a signature's variables into
//!   possibly-preserving and candidate-source roles, inverting them for
//!   coinductive data.
//! - **Refinement** ([`refine_after_clause`]): drops, clause by clause,
//!   every candidate the clause's constraint graph refutes.
//! - **Reification** ([`decide`], [`reify`], [`compact`]): commits the
//!   surviving evidence and renumbers the signature.
//! - **Driver** ([`PreservationRun`]): wires the above together.
//!
//! # Crate Dependencies
//!
//! `ori_termination` depends on `ori_sized` for the size model and the
//! graph-simplification oracle. Clause constraints are built by the caller
//! through the context; nothing here reads source code.

pub mod context;
pub mod decompose;
pub mod matrix;
pub mod options;
pub mod pipeline;
pub mod refine;
pub mod reify;
pub mod trace;

#[cfg(test)]
mod test_helpers;

pub use context::{
    AnalysisContext, FreshSignature, LocalBindingGuard, LocalEntry, RecursiveCall,
    TentativeCandidateGuard,
};
pub use decompose::{decompose, initial_candidates, Decomposition};
pub use matrix::{MatrixRow, RecursionMatrix};
pub use options::{OptionsError, PreservationOptions, SizeCheckFlags};
pub use pipeline::{ClauseSummary, PreservationOutcome, PreservationRun};
pub use refine::{check_candidate, check_satisfiable, refine_after_clause, CandidateCheck};
pub use reify::{compact, decide, reify, Instantiation};
pub use trace::{init_tracing, PreservationNote, RejectReason, Verdict};
