//! RAII guards for speculative context edits.
//!
//! Both guards hold `&mut AnalysisContext` and implement `Deref`/`DerefMut`,
//! so the guarded scope uses the context as usual. Dropping the guard puts
//! the edited field back, also while unwinding from a panic.
//!
//! ```text
//! {
//!     let mut scoped = ctx.bind_local(0, entry);
//!     scoped.record_constraint(edge);
//!     build_body(&mut scoped)?;
//! } // local context restored here, even on early return or panic
//! ```

use std::mem;
use std::ops::{Deref, DerefMut};

use ori_sized::SizeVar;

use super::{AnalysisContext, LocalEntry};

/// Restores the local context on drop.
pub struct LocalBindingGuard<'ctx> {
    ctx: &'ctx mut AnalysisContext,
    saved: Vec<LocalEntry>,
}

impl Drop for LocalBindingGuard<'_> {
    fn drop(&mut self) {
        self.ctx.clause.locals = mem::take(&mut self.saved);
    }
}

impl Deref for LocalBindingGuard<'_> {
    type Target = AnalysisContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for LocalBindingGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

/// Restores one variable's candidate list on drop.
pub struct TentativeCandidateGuard<'ctx> {
    ctx: &'ctx mut AnalysisContext,
    var: SizeVar,
    /// `None` when the variable had no entry before the guard.
    previous: Option<Vec<SizeVar>>,
}

impl Drop for TentativeCandidateGuard<'_> {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                self.ctx.candidates.insert(self.var, previous);
            }
            None => {
                self.ctx.candidates.remove(&self.var);
            }
        }
    }
}

impl Deref for TentativeCandidateGuard<'_> {
    type Target = AnalysisContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for TentativeCandidateGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl AnalysisContext {
    /// Bind `entry` at position `index` until the guard is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the local context.
    pub fn bind_local(&mut self, index: usize, entry: LocalEntry) -> LocalBindingGuard<'_> {
        let saved = self.clause.locals.clone();
        assert!(
            index <= saved.len(),
            "internal error: local binder {index} outside a context of {} entries",
            saved.len()
        );
        self.clause.locals.insert(index, entry);
        LocalBindingGuard { ctx: self, saved }
    }

    /// Treat `var` as merged away (no candidates) until the guard is dropped.
    pub fn tentative_candidate(&mut self, var: SizeVar) -> TentativeCandidateGuard<'_> {
        let previous = self.candidates.insert(var, Vec::new());
        TentativeCandidateGuard {
            ctx: self,
            var,
            previous,
        }
    }
}
