//! Decision notes and tracing setup.
//!
//! Every candidate acceptance or rejection and every final decision is
//! logged as a `tracing` event and recorded as a [`PreservationNote`] on
//! the analysis context. Notes are informational only; nothing reads
//! them back to make a decision.

use std::fmt;
use std::sync::Once;

use ori_sized::{FnName, SizeVar};

use crate::reify::Instantiation;

/// Why a candidate was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The oracle reported the candidate as an incoherent rigid.
    Incoherent,
    /// The merge tied the candidate's cluster to an unrelated one.
    Clustering,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
    Decided(Instantiation),
}

/// One entry of the decision trace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreservationNote {
    pub function: FnName,
    pub variable: SizeVar,
    /// The candidate under test; `None` for final decisions.
    pub candidate: Option<SizeVar>,
    pub verdict: Verdict,
}

impl fmt::Display for PreservationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{} {}: ", self.function.raw(), self.variable)?;
        match (self.candidate, self.verdict) {
            (Some(c), Verdict::Accepted) => write!(f, "candidate {c} kept"),
            (Some(c), Verdict::Rejected(RejectReason::Incoherent)) => {
                write!(f, "candidate {c} rejected (incoherent)")
            }
            (Some(c), Verdict::Rejected(RejectReason::Clustering)) => {
                write!(f, "candidate {c} rejected (clustering)")
            }
            (_, Verdict::Decided(Instantiation::To(target))) => {
                write!(f, "preserves {target}")
            }
            (_, Verdict::Decided(Instantiation::Infinity)) => write!(f, "not preserved"),
            (None, verdict) => write!(f, "{verdict:?}"),
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with
/// `RUST_LOG=ori_termination=debug` or `RUST_LOG=ori_sized=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
