//! # INJECTOR CORE LIBRARY
//!
//! **RUNTIME DEPENDENCY-RESOLUTION ENGINE**
//!
//! **ARCHITECTURE**: Frozen binding tables, introspectable constructor
//! signatures and a rule-identity-keyed singleton cache
//! **GUARANTEE**: Thread-safe resolution with cycle detection; one
//! construction per cache key under concurrency
//! **POLICIES**: Pluggable handling of keys with no binding rule

pub mod api;
pub mod bindings;
pub mod errors;
pub mod keys;
pub mod policy;
pub mod resolver;
pub mod signatures;

pub(crate) mod locks;
