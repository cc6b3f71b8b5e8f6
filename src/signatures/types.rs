use crate::errors::{error_codes, InjectorError};
use crate::keys::TypeKey;
use crate::resolver::ResolveCtx;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A resolved value held by the singleton cache. Cloning shares the
/// underlying allocation, which is exactly the singleton contract.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Instance {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wraps an existing shared value without re-allocating, preserving
    /// pointer identity for callers that hold the same `Arc`.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Instance {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectorError> {
        self.value.clone().downcast::<T>().map_err(|_| {
            InjectorError::instantiation(
                error_codes::TYPE_MISMATCH,
                format!(
                    "resolved instance holds {} but {} was requested",
                    self.type_name,
                    std::any::type_name::<T>()
                ),
            )
        })
    }

    pub fn holds<T: Send + Sync + 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance<{}>", self.type_name)
    }
}

/// Constructor blueprint thunk. Kept as a plain function pointer so deferred
/// introspection stays `Copy` and the registry can evaluate it lazily at
/// first resolution, which is what keeps cyclic type graphs representable.
pub type BlueprintThunk = fn() -> Blueprint;

/// A constructible type that can describe its own constructor.
pub trait Injectable: Send + Sync + Sized + 'static {
    fn blueprint() -> Blueprint;
}

/// One declared constructor parameter: name, declared type key (deferred),
/// optionally the declared type's own blueprint, and an evaluated-once
/// default value.
pub struct ParamSpec {
    name: &'static str,
    key: Arc<dyn Fn() -> TypeKey + Send + Sync>,
    blueprint: Option<BlueprintThunk>,
    default: Option<Instance>,
}

impl ParamSpec {
    /// Parameter whose declared type is itself constructible. The blueprint
    /// travels with the declaration, the Rust analog of a readable
    /// constructor signature.
    pub fn of<T: Injectable>(name: &'static str) -> Self {
        ParamSpec {
            name,
            key: Arc::new(|| TypeKey::of::<T>()),
            blueprint: Some(T::blueprint),
            default: None,
        }
    }

    /// Parameter declared as a plain type with no constructor of its own:
    /// primitives, trait handles, anything only a binding can satisfy.
    pub fn declared<T: Send + Sync + 'static>(name: &'static str) -> Self {
        ParamSpec {
            name,
            key: Arc::new(|| TypeKey::of::<T>()),
            blueprint: None,
            default: None,
        }
    }

    /// Parameter addressed by an explicit key expression: optional, union,
    /// alias or generic shapes. The key is evaluated at first resolution.
    pub fn keyed(
        name: &'static str,
        key: impl Fn() -> TypeKey + Send + Sync + 'static,
    ) -> Self {
        ParamSpec {
            name,
            key: Arc::new(key),
            blueprint: None,
            default: None,
        }
    }

    /// Attaches a default value, evaluated once. Every construction that
    /// falls back to the default receives the identical instance.
    pub fn with_default<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.default = Some(Instance::new(value));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn declared_key(&self) -> TypeKey {
        (self.key)()
    }

    pub(crate) fn blueprint_thunk(&self) -> Option<BlueprintThunk> {
        self.blueprint
    }

    pub(crate) fn default_value(&self) -> Option<Instance> {
        self.default.clone()
    }
}

type BuildFn =
    Arc<dyn Fn(&ResolvedArgs, &mut ResolveCtx<'_>) -> Result<Instance, InjectorError> + Send + Sync>;

/// Ordered parameter list plus the build closure invoked with the resolved
/// arguments. The closure also receives a reentrant resolution context.
pub struct Blueprint {
    params: Vec<ParamSpec>,
    build: BuildFn,
}

impl Blueprint {
    pub fn new(
        params: Vec<ParamSpec>,
        build: impl Fn(&ResolvedArgs, &mut ResolveCtx<'_>) -> Result<Instance, InjectorError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Blueprint {
            params,
            build: Arc::new(build),
        }
    }

    /// Zero-parameter blueprint for leaf types.
    pub fn leaf<T, F>(make: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Blueprint::new(Vec::new(), move |_args, _ctx| Ok(Instance::new(make())))
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub(crate) fn invoke(
        &self,
        args: &ResolvedArgs,
        ctx: &mut ResolveCtx<'_>,
    ) -> Result<Instance, InjectorError> {
        (self.build)(args, ctx)
    }
}

/// Arguments assembled by the engine, in declared order, addressable by
/// parameter name from the build closure.
pub struct ResolvedArgs {
    args: Vec<(&'static str, Instance)>,
}

impl ResolvedArgs {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        ResolvedArgs {
            args: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: Instance) {
        self.args.push((name, value));
    }

    pub fn instance(&self, name: &str) -> Result<&Instance, InjectorError> {
        self.args
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| {
                InjectorError::instantiation(
                    error_codes::MISSING_VALUE,
                    format!("no resolved argument named '{}'", name),
                )
            })
    }

    /// Shared handle to a resolved dependency.
    pub fn arc<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, InjectorError> {
        self.instance(name)?.downcast::<T>()
    }

    /// Owned copy of a resolved value, for primitives and other clonable
    /// literals.
    pub fn value<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<T, InjectorError> {
        self.arc::<T>(name).map(|v| (*v).clone())
    }

    /// Reads an optional dependency: accepts either a literal
    /// `Option<Arc<T>>` override or a normally resolved `T`.
    pub fn optional_arc<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<T>>, InjectorError> {
        let instance = self.instance(name)?;
        if instance.holds::<Option<Arc<T>>>() {
            return instance.downcast::<Option<Arc<T>>>().map(|v| (*v).clone());
        }
        instance.downcast::<T>().map(Some)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
