use crate::bindings::types::{BindingRule, PinTarget, Scope, Strategy};
use crate::errors::{error_codes, InjectorError};
use crate::keys::TypeKey;
use crate::policy::{AutoConstructPolicy, SubstitutePolicy, UnboundPolicy};
use crate::signatures::registry::SignatureEntry;
use crate::signatures::types::{Blueprint, Injectable, Instance};
use std::sync::Arc;

/// Mutable binding configuration. Handing it to `Injector::new` consumes it,
/// which is the freeze point: no mutation after an engine starts resolving
/// is expressible.
///
/// Registering a second rule for the same `(key, scope)` pair replaces the
/// first (deterministic last-wins).
pub struct Configuration {
    rules: Vec<BindingRule>,
    seeds: Vec<(TypeKey, SignatureEntry)>,
    policy: Arc<dyn UnboundPolicy>,
    next_rule_id: u64,
}

impl Configuration {
    pub fn new() -> Self {
        Configuration {
            rules: Vec::new(),
            seeds: Vec::new(),
            policy: Arc::new(AutoConstructPolicy),
            next_rule_id: 1,
        }
    }

    /// Configuration that rejects every implicitly-resolved dependency,
    /// forcing all wiring to be declared explicitly.
    pub fn strict() -> Self {
        Configuration::new().with_policy(crate::policy::StrictPolicy)
    }

    /// Configuration that satisfies unbound dependencies from the given
    /// stand-in factories, for test-double workflows.
    pub fn substituting(policy: SubstitutePolicy) -> Self {
        Configuration::new().with_policy(policy)
    }

    pub fn with_policy(mut self, policy: impl UnboundPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Seeds the signature registry with `T`'s constructor so the engine can
    /// auto-construct it when requested by key.
    pub fn register<T: Injectable>(&mut self) {
        self.seeds
            .push((TypeKey::of::<T>(), SignatureEntry::Deferred(T::blueprint)));
    }

    /// Seeds an explicit blueprint for a key Rust cannot express as a plain
    /// type: generic bases, parameterizations, aliases.
    pub fn register_key(&mut self, key: TypeKey, blueprint: Blueprint) {
        self.seeds
            .push((key, SignatureEntry::Ready(Arc::new(blueprint))));
    }

    /// Opens a binding declaration for a constructible type. Fails
    /// immediately when the target normalizes to a non-bindable primitive.
    pub fn bind<T: Injectable>(&mut self) -> Result<ScopeBuilder<'_>, InjectorError> {
        self.register::<T>();
        self.bind_key(TypeKey::of::<T>())
    }

    /// Opens a binding declaration for an arbitrary key: plain types without
    /// a blueprint, optional/union shapes, aliases, generic forms.
    pub fn bind_key(&mut self, key: TypeKey) -> Result<ScopeBuilder<'_>, InjectorError> {
        if key.is_primitive() {
            return Err(InjectorError::configuration(
                error_codes::PRIMITIVE_BINDING,
                format!(
                    "primitive type {} cannot be bound; supply it via with_value or a type-pin on a consumer's rule",
                    key
                ),
            ));
        }
        Ok(ScopeBuilder { config: self, key })
    }

    pub fn describe(&self) -> serde_json::Value {
        let described: Vec<_> = self.rules.iter().map(|rule| rule.describe()).collect();
        serde_json::to_value(&described).unwrap_or_default()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub(crate) fn freeze(
        self,
    ) -> (
        Vec<BindingRule>,
        Vec<(TypeKey, SignatureEntry)>,
        Arc<dyn UnboundPolicy>,
    ) {
        (self.rules, self.seeds, self.policy)
    }

    fn insert_rule(&mut self, key: TypeKey, scope: Scope) -> usize {
        let id = self.next_rule_id;
        self.next_rule_id += 1;
        let rule = BindingRule::new(id, key, scope);
        let existing = self
            .rules
            .iter()
            .position(|r| r.key() == rule.key() && r.scope() == rule.scope());
        match existing {
            Some(index) => {
                self.rules[index] = rule;
                index
            }
            None => {
                self.rules.push(rule);
                self.rules.len() - 1
            }
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope selection step of the fluent builder.
pub struct ScopeBuilder<'a> {
    config: &'a mut Configuration,
    key: TypeKey,
}

impl<'a> ScopeBuilder<'a> {
    pub fn globally(self) -> RuleBuilder<'a> {
        let index = self.config.insert_rule(self.key, Scope::Global);
        RuleBuilder {
            config: self.config,
            index,
        }
    }

    pub fn for_parent<P: Send + Sync + 'static>(self) -> RuleBuilder<'a> {
        self.for_parent_key(TypeKey::of::<P>())
    }

    pub fn for_parent_key(self, parent: TypeKey) -> RuleBuilder<'a> {
        let index = self.config.insert_rule(self.key, Scope::Parent(parent));
        RuleBuilder {
            config: self.config,
            index,
        }
    }
}

/// Strategy and override step of the fluent builder. Every method returns
/// the builder, so declarations chain like the rest of the configuration
/// surface.
pub struct RuleBuilder<'a> {
    config: &'a mut Configuration,
    index: usize,
}

impl<'a> RuleBuilder<'a> {
    /// Satisfy the bound key by constructing a different concrete class.
    pub fn to_class<C: Injectable>(self) -> Self {
        self.config.rules[self.index].set_strategy(Strategy::ConstructClass {
            target: TypeKey::of::<C>(),
            blueprint: C::blueprint,
        });
        self
    }

    /// Satisfy the bound key with a pre-built value.
    pub fn to_instance<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.config.rules[self.index].set_strategy(Strategy::UseInstance(Instance::new(value)));
        self
    }

    /// Satisfy the bound key with an existing shared value, preserving its
    /// pointer identity.
    pub fn to_shared<T: Send + Sync + 'static>(self, value: Arc<T>) -> Self {
        self.config.rules[self.index]
            .set_strategy(Strategy::UseInstance(Instance::from_arc(value)));
        self
    }

    /// Satisfy the bound key by invoking a factory blueprint. The factory's
    /// own parameters are resolved and injected like any constructor's.
    pub fn to_constructor(self, blueprint: Blueprint) -> Self {
        self.config.rules[self.index]
            .set_strategy(Strategy::UseConstructor(Arc::new(blueprint)));
        self
    }

    /// Literal override for a named parameter; used verbatim, no resolution.
    pub fn with_value<T: Send + Sync + 'static>(self, name: &'static str, value: T) -> Self {
        self.config.rules[self.index].add_value(name, Instance::new(value));
        self
    }

    /// Literal override handing an existing shared value to the parameter.
    pub fn with_shared<T: Send + Sync + 'static>(self, name: &'static str, value: Arc<T>) -> Self {
        self.config.rules[self.index].add_value(name, Instance::from_arc(value));
        self
    }

    /// Pins a named parameter to resolve as a different constructible type
    /// than its declared one.
    pub fn with_arg_type<T: Injectable>(self, name: &'static str) -> Self {
        self.config.rules[self.index].add_pin(
            name,
            PinTarget {
                key: TypeKey::of::<T>(),
                blueprint: Some(T::blueprint),
            },
        );
        self
    }

    /// Pins a named parameter to resolve as an explicit key.
    pub fn with_arg_key(self, name: &'static str, key: TypeKey) -> Self {
        self.config.rules[self.index].add_pin(
            name,
            PinTarget {
                key,
                blueprint: None,
            },
        );
        self
    }
}
