pub mod builder;
pub mod table;
pub mod types;

pub use builder::{Configuration, RuleBuilder, ScopeBuilder};
pub use table::BindingTable;
pub use types::{BindingDescription, BindingRule, Scope};
