//! **BUILT-IN POLICIES: AUTO-CONSTRUCT, STRICT, SUBSTITUTE**

use crate::keys::TypeKey;
use crate::policy::{UnboundOutcome, UnboundPolicy};
use crate::signatures::types::{Injectable, Instance};
use std::collections::HashMap;
use std::sync::Arc;

/// **DEFAULT POLICY: UNBOUND KEYS ARE CONSTRUCTED FROM THEIR SIGNATURES**
///
/// Matches the zero-configuration workflow: any constructible type with a
/// known signature resolves without a rule.
pub struct AutoConstructPolicy;

impl UnboundPolicy for AutoConstructPolicy {
    fn resolve_unbound(&self, _key: &TypeKey) -> UnboundOutcome {
        UnboundOutcome::Construct
    }

    fn label(&self) -> &'static str {
        "auto-construct"
    }
}

/// **STRICT POLICY: EVERY RESOLVED KEY MUST HAVE AN EXPLICIT RULE**
///
/// Rejects all implicit resolution, surfacing wiring gaps at the point of
/// first use instead of deep inside a construction chain. Declared
/// parameter defaults still apply; they are part of the signature, not an
/// implicit resolution.
pub struct StrictPolicy;

impl UnboundPolicy for StrictPolicy {
    fn resolve_unbound(&self, key: &TypeKey) -> UnboundOutcome {
        UnboundOutcome::Reject {
            reason: format!("no binding declared for {} and strict policy forbids implicit construction", key),
        }
    }

    fn label(&self) -> &'static str {
        "strict"
    }
}

type StubFactory = Arc<dyn Fn() -> Instance + Send + Sync>;

/// **SUBSTITUTE POLICY: UNBOUND KEYS ARE SATISFIED FROM STAND-IN FACTORIES**
///
/// For test doubles: each registered stub factory produces the value used
/// whenever its key is requested without a rule. Keys with no stub are
/// rejected, so a missing double is an error rather than a silently
/// constructed real dependency.
pub struct SubstitutePolicy {
    stubs: HashMap<TypeKey, StubFactory>,
}

impl SubstitutePolicy {
    pub fn new() -> Self {
        SubstitutePolicy {
            stubs: HashMap::new(),
        }
    }

    /// Registers a stand-in for `T`.
    pub fn with_stub<T, F>(self, make: F) -> Self
    where
        T: Injectable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.with_stub_for_key(TypeKey::of::<T>(), move || Instance::new(make()))
    }

    /// Registers a stand-in under an explicit key.
    pub fn with_stub_for_key<F>(mut self, key: TypeKey, make: F) -> Self
    where
        F: Fn() -> Instance + Send + Sync + 'static,
    {
        self.stubs.insert(key, Arc::new(make));
        self
    }

    pub fn stub_count(&self) -> usize {
        self.stubs.len()
    }
}

impl Default for SubstitutePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl UnboundPolicy for SubstitutePolicy {
    fn resolve_unbound(&self, key: &TypeKey) -> UnboundOutcome {
        match self.stubs.get(key) {
            Some(make) => UnboundOutcome::Supply(make()),
            None => UnboundOutcome::Reject {
                reason: format!("no stand-in registered for {}", key),
            },
        }
    }

    fn label(&self) -> &'static str {
        "substitute"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::types::Blueprint;

    struct Service {
        port: u16,
    }

    impl Injectable for Service {
        fn blueprint() -> Blueprint {
            Blueprint::leaf(|| Service { port: 80 })
        }
    }

    #[test]
    fn test_auto_construct_always_constructs() {
        let policy = AutoConstructPolicy;
        match policy.resolve_unbound(&TypeKey::of::<Service>()) {
            UnboundOutcome::Construct => {}
            _ => panic!("Wrong outcome"),
        }
    }

    #[test]
    fn test_strict_rejects_with_key_in_reason() {
        let policy = StrictPolicy;
        match policy.resolve_unbound(&TypeKey::of::<Service>()) {
            UnboundOutcome::Reject { reason } => assert!(reason.contains("Service")),
            _ => panic!("Wrong outcome"),
        }
    }

    #[test]
    fn test_substitute_supplies_registered_stub() {
        let policy = SubstitutePolicy::new().with_stub(|| Service { port: 9999 });
        match policy.resolve_unbound(&TypeKey::of::<Service>()) {
            UnboundOutcome::Supply(instance) => {
                let service = instance.downcast::<Service>().unwrap();
                assert_eq!(service.port, 9999);
            }
            _ => panic!("Wrong outcome"),
        }
    }

    #[test]
    fn test_substitute_rejects_unknown_key() {
        let policy = SubstitutePolicy::new();
        match policy.resolve_unbound(&TypeKey::of::<Service>()) {
            UnboundOutcome::Reject { reason } => assert!(reason.contains("stand-in")),
            _ => panic!("Wrong outcome"),
        }
    }
}
