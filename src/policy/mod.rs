//! **UNBOUND-RESOLUTION POLICIES: PLUGGABLE HANDLING OF KEYS WITH NO RULE**

pub mod builtin;

pub use builtin::{AutoConstructPolicy, StrictPolicy, SubstitutePolicy};

use crate::keys::TypeKey;
use crate::signatures::types::Instance;

/// Outcome of consulting a policy for a key no binding rule covers.
pub enum UnboundOutcome {
    /// Proceed with default auto-construction of the key.
    Construct,
    /// Refuse resolution; the engine reports a configuration error
    /// carrying `reason`.
    Reject { reason: String },
    /// Use the supplied value. It enters the singleton cache like any
    /// constructed instance.
    Supply(Instance),
}

/// **DECIDES WHAT HAPPENS WHEN A REQUESTED KEY HAS NO BINDING RULE**
///
/// The engine consults the policy exactly once per unbound key per
/// resolution, after the binding table lookup misses and before any
/// auto-construction starts. Implementations must be cheap and
/// side-effect free; the engine may call them from multiple threads.
pub trait UnboundPolicy: Send + Sync {
    fn resolve_unbound(&self, key: &TypeKey) -> UnboundOutcome;

    /// Short name for diagnostics.
    fn label(&self) -> &'static str;
}
