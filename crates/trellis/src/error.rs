//! Construction-time errors.
//!
//! The simulation itself never signals errors: once a world steps, invariant
//! violations are contract bugs and numerical degeneracies are absorbed by
//! convention (zero vectors normalize to `(F, 0, 0)`, risky divisors route
//! through `non_zero`). Everything that *can* be rejected is rejected while
//! bodies are being assembled, through this enum.

use thiserror::Error;

/// Errors reported while assembling bodies or filling shape templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A body must own at least one joint.
    #[error("a body needs at least one joint")]
    EmptyBody,

    /// A connection referenced a joint index outside the body's slice.
    #[error("connection {index} references joint {joint} outside the body")]
    ConnectionOutOfRange { index: usize, joint: usize },

    /// A connection joins a joint to itself or spans zero distance, so no
    /// rest length can be derived from it.
    #[error("connection {index} is degenerate (zero rest length)")]
    DegenerateConnection { index: usize },

    /// A shape template was given less joint or connection storage than the
    /// shape needs.
    #[error("shape needs {needed} {kind} slots but only {provided} were provided")]
    SliceTooSmall {
        kind: &'static str,
        needed: usize,
        provided: usize,
    },
}
