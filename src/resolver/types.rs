use crate::keys::TypeKey;
use crate::signatures::types::Instance;

/// Singleton cache key: the requested type key plus the identity of the
/// binding rule that applied, if any. Two resolutions share an instance
/// exactly when both components match, so replacing a rule with an
/// identically-configured one still yields a fresh singleton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub(crate) key: TypeKey,
    pub(crate) rule: Option<u64>,
}

/// Cache slot state. `Building` marks an in-flight construction that other
/// threads wait on instead of starting a duplicate.
pub(crate) enum Slot {
    Ready(Instance),
    Building,
}

/// Whether a key was asked for directly (root request, binding target,
/// type-pin) or inferred from a declared parameter type. The distinction
/// decides which error kind a downstream failure surfaces as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    Explicit,
    Implicit,
}
