pub mod engine;
pub(crate) mod types;

pub use engine::{Injector, ResolveCtx};
