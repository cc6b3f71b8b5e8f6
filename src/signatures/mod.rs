pub mod registry;
pub mod types;

pub use registry::SignatureRegistry;
pub use types::{Blueprint, BlueprintThunk, Injectable, Instance, ParamSpec, ResolvedArgs};
