mod catalog;
mod engine;

pub use catalog::{CATALOG, RuleSpec};
pub use engine::{IMPORTANT_PRIORITY, Rule, RuleEngine};
