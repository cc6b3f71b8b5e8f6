use crate::errors::InjectorError;
use crate::keys::TypeKey;
use crate::locks::{lock_read, lock_write};
use crate::signatures::types::{Blueprint, BlueprintThunk, Injectable};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub(crate) enum SignatureEntry {
    Deferred(BlueprintThunk),
    Ready(Arc<Blueprint>),
}

/// Constructor signature store. Thunks recorded at configuration or
/// declaration time are evaluated on first introspection, never eagerly.
pub struct SignatureRegistry {
    entries: RwLock<HashMap<TypeKey, SignatureEntry>>,
}

impl SignatureRegistry {
    pub(crate) fn from_seeds(seeds: Vec<(TypeKey, SignatureEntry)>) -> Self {
        let mut entries = HashMap::with_capacity(seeds.len());
        for (key, entry) in seeds {
            entries.insert(key, entry);
        }
        SignatureRegistry {
            entries: RwLock::new(entries),
        }
    }

    pub(crate) fn record<T: Injectable>(&self) -> Result<(), InjectorError> {
        self.record_deferred(TypeKey::of::<T>(), T::blueprint)
    }

    /// Records a thunk for `key` unless a signature is already known. Later
    /// recordings never displace an evaluated blueprint, so every engine
    /// sees one stable signature per key.
    pub(crate) fn record_deferred(
        &self,
        key: TypeKey,
        thunk: BlueprintThunk,
    ) -> Result<(), InjectorError> {
        let mut entries = lock_write(&self.entries, "SignatureRegistry::record_deferred")?;
        entries.entry(key).or_insert(SignatureEntry::Deferred(thunk));
        Ok(())
    }

    pub(crate) fn introspect(
        &self,
        key: &TypeKey,
    ) -> Result<Option<Arc<Blueprint>>, InjectorError> {
        {
            let entries = lock_read(&self.entries, "SignatureRegistry::introspect")?;
            match entries.get(key) {
                Some(SignatureEntry::Ready(blueprint)) => return Ok(Some(Arc::clone(blueprint))),
                Some(SignatureEntry::Deferred(_)) => {}
                None => return Ok(None),
            }
        }

        // Upgrade the thunk outside the read lock; evaluation is pure.
        let mut entries = lock_write(&self.entries, "SignatureRegistry::introspect")?;
        let entry = match entries.get(key) {
            Some(SignatureEntry::Ready(blueprint)) => return Ok(Some(Arc::clone(blueprint))),
            Some(SignatureEntry::Deferred(thunk)) => *thunk,
            None => return Ok(None),
        };
        let blueprint = Arc::new(entry());
        entries.insert(key.clone(), SignatureEntry::Ready(Arc::clone(&blueprint)));
        Ok(Some(blueprint))
    }

    pub(crate) fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(_) => 0,
        }
    }
}
