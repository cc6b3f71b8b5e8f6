use crate::bindings::types::{BindingDescription, BindingRule, Scope};
use crate::keys::TypeKey;
use std::collections::HashMap;
use std::sync::Arc;

/// Frozen rule store. Built once from a consumed `Configuration`; read-only
/// afterwards, so concurrent lookups need no synchronization.
pub struct BindingTable {
    rules: HashMap<(TypeKey, Scope), Arc<BindingRule>>,
}

impl BindingTable {
    pub(crate) fn from_rules(rules: Vec<BindingRule>) -> Self {
        let mut table = HashMap::with_capacity(rules.len());
        for rule in rules {
            let slot = (rule.key().clone(), rule.scope().clone());
            table.insert(slot, Arc::new(rule));
        }
        BindingTable { rules: table }
    }

    /// Pure lookup: an exact rule scoped to `parent` wins, otherwise the
    /// global rule, otherwise absent.
    pub fn lookup(&self, key: &TypeKey, parent: Option<&TypeKey>) -> Option<Arc<BindingRule>> {
        if let Some(parent) = parent {
            let scoped = (key.clone(), Scope::Parent(parent.clone()));
            if let Some(rule) = self.rules.get(&scoped) {
                return Some(Arc::clone(rule));
            }
        }
        self.rules
            .get(&(key.clone(), Scope::Global))
            .map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn describe(&self) -> Vec<BindingDescription> {
        let mut described: Vec<BindingDescription> =
            self.rules.values().map(|rule| rule.describe()).collect();
        described.sort_by(|a, b| (a.key.clone(), a.scope.clone()).cmp(&(b.key.clone(), b.scope.clone())));
        described
    }
}
