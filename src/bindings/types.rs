use crate::keys::TypeKey;
use crate::signatures::types::{Blueprint, BlueprintThunk, Instance};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Where a rule applies: to any requester, or only when the target is
/// requested as a dependency of one specific owning type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Parent(TypeKey),
}

/// A type-pin recorded for a named parameter: the parameter resolves as
/// `key` instead of its declared type. The pin carries the substitute's
/// blueprint when it is auto-constructible.
pub struct PinTarget {
    pub(crate) key: TypeKey,
    pub(crate) blueprint: Option<BlueprintThunk>,
}

/// Terminal resolution strategy of a binding rule.
pub enum Strategy {
    /// Construct the bound key's own signature (the default when no
    /// terminal method is called on the builder).
    ConstructSelf,
    /// Construct a different concrete class to satisfy the bound key.
    ConstructClass {
        target: TypeKey,
        blueprint: BlueprintThunk,
    },
    /// Hand out a pre-built value.
    UseInstance(Instance),
    /// Invoke a factory blueprint, whose own parameters are injected too.
    UseConstructor(Arc<Blueprint>),
}

impl Strategy {
    fn label(&self) -> String {
        match self {
            Strategy::ConstructSelf => "construct-self".to_string(),
            Strategy::ConstructClass { target, .. } => format!("to-class {}", target),
            Strategy::UseInstance(instance) => format!("to-instance {}", instance.type_name()),
            Strategy::UseConstructor(_) => "to-constructor".to_string(),
        }
    }
}

/// One configured binding. Identity (`id`), not content, feeds the cache
/// key: two resolutions share a singleton iff the same rule was selected.
pub struct BindingRule {
    id: u64,
    key: TypeKey,
    scope: Scope,
    strategy: Strategy,
    values: HashMap<&'static str, Instance>,
    pins: HashMap<&'static str, PinTarget>,
}

impl BindingRule {
    pub(crate) fn new(id: u64, key: TypeKey, scope: Scope) -> Self {
        BindingRule {
            id,
            key,
            scope,
            strategy: Strategy::ConstructSelf,
            values: HashMap::new(),
            pins: HashMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub(crate) fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub(crate) fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    pub(crate) fn add_value(&mut self, name: &'static str, value: Instance) {
        self.values.insert(name, value);
    }

    pub(crate) fn add_pin(&mut self, name: &'static str, pin: PinTarget) {
        self.pins.insert(name, pin);
    }

    /// Literal override for a named parameter, used verbatim.
    pub(crate) fn literal(&self, name: &str) -> Option<&Instance> {
        self.values.get(name)
    }

    pub(crate) fn pin(&self, name: &str) -> Option<&PinTarget> {
        self.pins.get(name)
    }

    pub fn describe(&self) -> BindingDescription {
        let mut values: Vec<String> = self.values.keys().map(|k| k.to_string()).collect();
        values.sort();
        let mut pins: Vec<String> = self
            .pins
            .iter()
            .map(|(name, pin)| format!("{} -> {}", name, pin.key))
            .collect();
        pins.sort();
        BindingDescription {
            key: self.key.to_string(),
            scope: match &self.scope {
                Scope::Global => "global".to_string(),
                Scope::Parent(parent) => format!("parent {}", parent),
            },
            strategy: self.strategy.label(),
            values,
            pins,
        }
    }
}

/// Serializable snapshot of one rule, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct BindingDescription {
    pub key: String,
    pub scope: String,
    pub strategy: String,
    pub values: Vec<String>,
    pub pins: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Consumer;

    #[test]
    fn test_rule_identity_is_id_not_content() {
        let key = TypeKey::of::<Consumer>();
        let first = BindingRule::new(1, key.clone(), Scope::Global);
        let second = BindingRule::new(2, key, Scope::Global);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_describe_reports_scope_and_strategy() {
        let mut rule = BindingRule::new(
            7,
            TypeKey::of::<Consumer>(),
            Scope::Parent(TypeKey::of::<u8>()),
        );
        rule.add_value("label", Instance::new("x".to_string()));
        let description = rule.describe();
        assert!(description.scope.starts_with("parent"));
        assert_eq!(description.strategy, "construct-self");
        assert_eq!(description.values, vec!["label".to_string()]);
    }
}
