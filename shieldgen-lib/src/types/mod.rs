#![allow(unreachable_pub)]

mod error;
mod outcome;
mod rule;

pub use error::ErrorKind;
pub use outcome::FetchOutcome;
pub use rule::{Action, Condition, RESOURCE_TYPES, RULE_ID_BASE, RULE_PRIORITY, Rule, build_rules};

/// The shieldgen `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
