//! **RESOLUTION ENGINE: RULE SELECTION, CONSTRUCTION AND THE SINGLETON CACHE**
//!
//! The engine is frozen at creation: it consumes a `Configuration` and from
//! then on only reads the binding table and signature registry. All mutable
//! state is the singleton cache, guarded by one mutex plus a condvar that
//! serializes concurrent constructions of the same cache key.

use crate::bindings::table::BindingTable;
use crate::bindings::types::{BindingRule, Strategy};
use crate::bindings::Configuration;
use crate::errors::{error_codes, InjectorError};
use crate::keys::TypeKey;
use crate::locks::{lock_mutex, wait_on};
use crate::policy::{UnboundOutcome, UnboundPolicy};
use crate::resolver::types::{CacheKey, RequestKind, Slot};
use crate::signatures::types::{Blueprint, Injectable, Instance, ParamSpec, ResolvedArgs};
use crate::signatures::SignatureRegistry;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use tracing::{debug, trace};

/// **THE INJECTOR: FROZEN CONFIGURATION PLUS A CONCURRENCY-SAFE CACHE**
///
/// Resolution walks: rule selection (parent scope beats global), cache
/// probe under `(key, applied-rule-id)`, then construction with cycle
/// detection along the active call chain. Constructed values are cached;
/// a failed construction leaves nothing behind, so a later request may
/// retry it.
pub struct Injector {
    table: BindingTable,
    signatures: SignatureRegistry,
    policy: Arc<dyn UnboundPolicy>,
    cache: Mutex<HashMap<CacheKey, Slot>>,
    build_done: Condvar,
}

impl Injector {
    /// Consumes the configuration; the move is the freeze point.
    pub fn new(config: Configuration) -> Self {
        let (rules, seeds, policy) = config.freeze();
        debug!(
            rules = rules.len(),
            seeds = seeds.len(),
            policy = policy.label(),
            "injector created"
        );
        Injector {
            table: BindingTable::from_rules(rules),
            signatures: SignatureRegistry::from_seeds(seeds),
            policy,
            cache: Mutex::new(HashMap::new()),
            build_done: Condvar::new(),
        }
    }

    /// Resolves `T` and hands back a shared reference to its singleton.
    pub fn get<T: Injectable>(&self) -> Result<Arc<T>, InjectorError> {
        self.signatures.record::<T>()?;
        self.get_key(&TypeKey::of::<T>())?.downcast::<T>()
    }

    /// Resolves an arbitrary key: aliases, optional and union shapes,
    /// generic forms, or plain types addressed dynamically.
    pub fn get_key(&self, key: &TypeKey) -> Result<Instance, InjectorError> {
        let mut ctx = ResolveCtx {
            injector: self,
            chain: Vec::new(),
            current: None,
        };
        ctx.resolve(key, None, RequestKind::Explicit)
    }

    /// Serializable view of the frozen binding table.
    pub fn describe(&self) -> serde_json::Value {
        serde_json::to_value(self.table.describe()).unwrap_or_default()
    }

    /// Serializable view of the singleton cache, for diagnostics.
    pub fn cache_snapshot(&self) -> Result<serde_json::Value, InjectorError> {
        let cache = lock_mutex(&self.cache, "Injector::cache_snapshot")?;
        let mut entries: Vec<serde_json::Value> = cache
            .iter()
            .map(|(cache_key, slot)| {
                serde_json::json!({
                    "key": cache_key.key.to_string(),
                    "rule": cache_key.rule,
                    "state": match slot {
                        Slot::Ready(instance) => format!("ready: {}", instance.type_name()),
                        Slot::Building => "building".to_string(),
                    },
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry["key"].as_str().unwrap_or_default().to_string());
        Ok(serde_json::Value::Array(entries))
    }

    pub fn rule_count(&self) -> usize {
        self.table.len()
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }
}

/// Per-resolution state threaded through the construction graph: the active
/// call chain for cycle detection and the type currently being built, which
/// parent-scoped rules match against. Build closures receive it for
/// reentrant `get` calls.
pub struct ResolveCtx<'a> {
    injector: &'a Injector,
    chain: Vec<TypeKey>,
    current: Option<TypeKey>,
}

impl<'a> ResolveCtx<'a> {
    /// Reentrant typed resolution from inside a build closure. The value
    /// resolves as a dependency of the type under construction, so its
    /// parent-scoped rules apply.
    pub fn get<T: Injectable>(&mut self) -> Result<Arc<T>, InjectorError> {
        self.injector.signatures.record::<T>()?;
        let key = TypeKey::of::<T>();
        let parent = self.current.clone();
        self.resolve(&key, parent.as_ref(), RequestKind::Explicit)?
            .downcast::<T>()
    }

    /// Reentrant keyed resolution from inside a build closure.
    pub fn get_key(&mut self, key: &TypeKey) -> Result<Instance, InjectorError> {
        let parent = self.current.clone();
        self.resolve(key, parent.as_ref(), RequestKind::Explicit)
    }

    fn resolve(
        &mut self,
        key: &TypeKey,
        parent: Option<&TypeKey>,
        kind: RequestKind,
    ) -> Result<Instance, InjectorError> {
        let rule = self.injector.table.lookup(key, parent);
        let cache_key = CacheKey {
            key: key.clone(),
            rule: rule.as_ref().map(|r| r.id()),
        };
        trace!(key = %key, rule = ?cache_key.rule, "resolving");

        let mut cache = lock_mutex(&self.injector.cache, "ResolveCtx::resolve")?;
        loop {
            let in_flight = match cache.get(&cache_key) {
                Some(Slot::Ready(instance)) => {
                    trace!(key = %key, "cache hit");
                    return Ok(instance.clone());
                }
                Some(Slot::Building) => true,
                None => false,
            };
            if self.chain.iter().any(|seen| seen == key) {
                let mut cycle: Vec<String> =
                    self.chain.iter().map(|k| k.to_string()).collect();
                cycle.push(key.to_string());
                return Err(InjectorError::circular(cycle));
            }
            if in_flight {
                // Another thread is constructing this key. Wait and re-probe;
                // a failed construction clears the slot, so we may end up
                // claiming it ourselves.
                cache = wait_on(&self.injector.build_done, cache, "ResolveCtx::resolve")?;
            } else {
                cache.insert(cache_key.clone(), Slot::Building);
                break;
            }
        }
        drop(cache);

        self.chain.push(key.clone());
        let built = self.build(key, rule.as_deref(), kind);
        self.chain.pop();

        let mut cache = lock_mutex(&self.injector.cache, "ResolveCtx::resolve")?;
        match &built {
            Ok(instance) => {
                debug!(key = %key, rule = ?cache_key.rule, "constructed");
                cache.insert(cache_key, Slot::Ready(instance.clone()));
            }
            Err(err) => {
                debug!(key = %key, error = %err, "construction failed");
                cache.remove(&cache_key);
            }
        }
        self.injector.build_done.notify_all();
        drop(cache);
        built
    }

    fn build(
        &mut self,
        key: &TypeKey,
        rule: Option<&BindingRule>,
        kind: RequestKind,
    ) -> Result<Instance, InjectorError> {
        let applied = match rule {
            Some(rule) => rule,
            None => {
                return match self.injector.policy.resolve_unbound(key) {
                    UnboundOutcome::Construct => self.auto_construct(key, kind),
                    UnboundOutcome::Reject { reason } => Err(InjectorError::configuration(
                        error_codes::STRICT_POLICY_MISS,
                        reason,
                    )),
                    UnboundOutcome::Supply(instance) => Ok(instance),
                };
            }
        };

        match applied.strategy() {
            Strategy::UseInstance(instance) => Ok(instance.clone()),
            Strategy::ConstructSelf => {
                let structural = key.structural_target().clone();
                if structural.is_guessable_shape() {
                    return Err(InjectorError::configuration(
                        error_codes::UNRESOLVABLE_SHAPE,
                        format!(
                            "{} is bound to itself but constructing it would require guessing a member",
                            key
                        ),
                    ));
                }
                let blueprint = self.introspect_required(&structural)?;
                self.build_from(&blueprint, &structural, Some(applied), kind)
            }
            Strategy::ConstructClass { target, blueprint } => {
                self.injector
                    .signatures
                    .record_deferred(target.clone(), *blueprint)?;
                let target = target.clone();
                let blueprint = self.introspect_required(&target)?;
                self.build_from(&blueprint, &target, Some(applied), kind)
            }
            Strategy::UseConstructor(blueprint) => {
                let blueprint = Arc::clone(blueprint);
                self.build_from(&blueprint, key, Some(applied), kind)
            }
        }
    }

    /// Default construction of an unbound key from its own signature.
    fn auto_construct(
        &mut self,
        key: &TypeKey,
        kind: RequestKind,
    ) -> Result<Instance, InjectorError> {
        let structural = key.structural_target().clone();
        if structural.is_primitive() {
            return Err(InjectorError::configuration(
                error_codes::NOT_CONSTRUCTIBLE,
                format!(
                    "{} is a primitive; supply it through a literal override or an instance binding",
                    key
                ),
            ));
        }
        if structural.is_guessable_shape() {
            return Err(InjectorError::configuration(
                error_codes::UNRESOLVABLE_SHAPE,
                format!(
                    "{} has no binding and constructing it would require guessing a member",
                    key
                ),
            ));
        }
        let blueprint = self.introspect_required(&structural)?;
        self.build_from(&blueprint, &structural, None, kind)
    }

    /// Resolves a blueprint's parameters in declared order and invokes it.
    /// `owner` is the type being constructed; its parent-scoped rules apply
    /// to every parameter.
    fn build_from(
        &mut self,
        blueprint: &Blueprint,
        owner: &TypeKey,
        rule: Option<&BindingRule>,
        kind: RequestKind,
    ) -> Result<Instance, InjectorError> {
        let mut args = ResolvedArgs::with_capacity(blueprint.params().len());
        for param in blueprint.params() {
            let value = match self.resolve_param(param, owner, rule) {
                Ok(value) => value,
                Err(err) if kind == RequestKind::Implicit && err.is_configuration() => {
                    // An implicitly-constructed dependency with an unresolvable
                    // parameter is an instantiation failure of the dependency,
                    // not a configuration gap of the caller.
                    return Err(InjectorError::instantiation(
                        error_codes::MISSING_VALUE,
                        format!(
                            "cannot construct {}: parameter '{}' unresolvable ({})",
                            owner,
                            param.name(),
                            err
                        ),
                    ));
                }
                Err(err) => return Err(err),
            };
            args.push(param.name(), value);
        }

        let previous = self.current.replace(owner.clone());
        let result = blueprint.invoke(&args, self);
        self.current = previous;
        result
    }

    /// One declared parameter. Precedence: literal override, type-pin, any
    /// binding for the declared key, evaluated-once default, implicit
    /// resolution of the declared key.
    fn resolve_param(
        &mut self,
        param: &ParamSpec,
        owner: &TypeKey,
        rule: Option<&BindingRule>,
    ) -> Result<Instance, InjectorError> {
        if let Some(rule) = rule {
            if let Some(value) = rule.literal(param.name()) {
                return Ok(value.clone());
            }
            if let Some(pin) = rule.pin(param.name()) {
                if let Some(thunk) = pin.blueprint {
                    self.injector
                        .signatures
                        .record_deferred(pin.key.clone(), thunk)?;
                }
                let pin_key = pin.key.clone();
                return self.resolve(&pin_key, Some(owner), RequestKind::Explicit);
            }
        }

        let declared = param.declared_key();
        if let Some(thunk) = param.blueprint_thunk() {
            self.injector
                .signatures
                .record_deferred(declared.clone(), thunk)?;
        }
        // A declared binding outranks a declared default.
        if self.injector.table.lookup(&declared, Some(owner)).is_some() {
            return self.resolve(&declared, Some(owner), RequestKind::Explicit);
        }
        if let Some(default) = param.default_value() {
            return Ok(default);
        }
        self.resolve(&declared, Some(owner), RequestKind::Implicit)
    }

    fn introspect_required(&self, key: &TypeKey) -> Result<Arc<Blueprint>, InjectorError> {
        match self.injector.signatures.introspect(key)? {
            Some(blueprint) => Ok(blueprint),
            None => Err(InjectorError::configuration(
                error_codes::NOT_CONSTRUCTIBLE,
                format!("no constructor signature known for {}", key),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        marker: u32,
    }

    impl Injectable for Leaf {
        fn blueprint() -> Blueprint {
            Blueprint::leaf(|| Leaf { marker: 11 })
        }
    }

    struct Holder {
        leaf: Arc<Leaf>,
    }

    impl Injectable for Holder {
        fn blueprint() -> Blueprint {
            Blueprint::new(vec![ParamSpec::of::<Leaf>("leaf")], |args, _ctx| {
                Ok(Instance::new(Holder {
                    leaf: args.arc::<Leaf>("leaf")?,
                }))
            })
        }
    }

    #[test]
    fn test_zero_configuration_resolution() {
        let injector = Injector::new(Configuration::new());
        let holder = injector.get::<Holder>().unwrap();
        assert_eq!(holder.leaf.marker, 11);
    }

    #[test]
    fn test_dependency_is_shared_with_direct_request() {
        let injector = Injector::new(Configuration::new());
        let holder = injector.get::<Holder>().unwrap();
        let leaf = injector.get::<Leaf>().unwrap();
        assert!(Arc::ptr_eq(&holder.leaf, &leaf));
    }

    #[test]
    fn test_reentrant_context_resolution() {
        struct Dynamic {
            leaf: Arc<Leaf>,
        }

        impl Injectable for Dynamic {
            fn blueprint() -> Blueprint {
                Blueprint::new(Vec::new(), |_args, ctx| {
                    Ok(Instance::new(Dynamic { leaf: ctx.get::<Leaf>()? }))
                })
            }
        }

        let injector = Injector::new(Configuration::new());
        let dynamic = injector.get::<Dynamic>().unwrap();
        let leaf = injector.get::<Leaf>().unwrap();
        assert!(Arc::ptr_eq(&dynamic.leaf, &leaf));
    }

    #[test]
    fn test_cache_snapshot_lists_ready_entries() {
        let injector = Injector::new(Configuration::new());
        injector.get::<Leaf>().unwrap();
        let snapshot = injector.cache_snapshot().unwrap();
        let entries = snapshot.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0]["state"]
            .as_str()
            .unwrap()
            .starts_with("ready"));
        assert!(entries[0]["rule"].is_null());
    }

    #[test]
    fn test_failed_construction_is_not_cached() {
        struct Broken;

        impl Injectable for Broken {
            fn blueprint() -> Blueprint {
                Blueprint::new(Vec::new(), |_args, _ctx| {
                    Err(InjectorError::instantiation(
                        error_codes::CONSTRUCTOR_FAILED,
                        "boom",
                    ))
                })
            }
        }

        let injector = Injector::new(Configuration::new());
        assert!(injector.get::<Broken>().is_err());
        let snapshot = injector.cache_snapshot().unwrap();
        assert!(snapshot.as_array().unwrap().is_empty());
    }
}
