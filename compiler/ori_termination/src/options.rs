//! Size-check options.
//!
//! Options can be set via the `ORI_SIZE_CHECK` environment variable, a
//! comma-separated list of flags:
//! - `preservation` - rewrite signatures with inferred size preservation
//! - `trace` - keep the per-candidate decision notes in the outcome
//! - `all` - everything above
//! - `none` - nothing (overrides the default)
//!
//! When the variable is unset, only `preservation` is enabled.
//!
//! Example: `ORI_SIZE_CHECK=preservation,trace ori check lib.ori`

use bitflags::bitflags;

/// Environment variable read by [`PreservationOptions::from_env`].
pub const ENV_VAR: &str = "ORI_SIZE_CHECK";

bitflags! {
    /// Feature switches for the size checker.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct SizeCheckFlags: u8 {
        /// Commit preservation decisions into the rewritten signature.
        const PRESERVATION = 1 << 0;
        /// Keep decision notes in [`PreservationOutcome`](crate::PreservationOutcome).
        const TRACE = 1 << 1;
    }
}

/// Configuration parse failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("unknown size-check flag `{flag}` in ORI_SIZE_CHECK (expected preservation, trace, all, or none)")]
    UnknownFlag { flag: String },
}

/// Options for one preservation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreservationOptions {
    pub flags: SizeCheckFlags,
}

impl Default for PreservationOptions {
    fn default() -> Self {
        PreservationOptions {
            flags: SizeCheckFlags::PRESERVATION,
        }
    }
}

impl PreservationOptions {
    pub fn new(flags: SizeCheckFlags) -> Self {
        PreservationOptions { flags }
    }

    #[inline]
    pub fn preservation_enabled(self) -> bool {
        self.flags.contains(SizeCheckFlags::PRESERVATION)
    }

    #[inline]
    pub fn trace_enabled(self) -> bool {
        self.flags.contains(SizeCheckFlags::TRACE)
    }

    /// Parse a comma-separated flag list. Blank entries are ignored.
    pub fn parse(s: &str) -> Result<Self, OptionsError> {
        let mut flags = SizeCheckFlags::empty();
        for part in s.split(',') {
            match part.trim().to_lowercase().as_str() {
                "" => {}
                "preservation" => flags |= SizeCheckFlags::PRESERVATION,
                "trace" => flags |= SizeCheckFlags::TRACE,
                "all" => flags |= SizeCheckFlags::all(),
                "none" => flags = SizeCheckFlags::empty(),
                _ => {
                    return Err(OptionsError::UnknownFlag {
                        flag: part.trim().to_string(),
                    })
                }
            }
        }
        Ok(PreservationOptions { flags })
    }

    /// Read options from [`ENV_VAR`], falling back to the defaults when unset.
    pub fn from_env() -> Result<Self, OptionsError> {
        match std::env::var(ENV_VAR) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(Self::default()),
        }
    }
}
