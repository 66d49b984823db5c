#![forbid(unsafe_code)]

//! Logging support for the gesture pipeline.
//!
//! With the `tracing` feature, `trace!` is re-exported from `tracing`.
//! Without it, the same name expands to nothing so call sites compile
//! unchanged and cost nothing.

#[cfg(feature = "tracing")]
pub use tracing::trace;

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
}
