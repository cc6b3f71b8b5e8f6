pub use crate::bindings::{BindingDescription, Configuration, RuleBuilder, Scope, ScopeBuilder};
pub use crate::errors::{error_codes, InjectorError};
pub use crate::keys::TypeKey;
pub use crate::policy::{
    AutoConstructPolicy, StrictPolicy, SubstitutePolicy, UnboundOutcome, UnboundPolicy,
};
pub use crate::resolver::{Injector, ResolveCtx};
pub use crate::signatures::{Blueprint, BlueprintThunk, Injectable, Instance, ParamSpec, ResolvedArgs};
