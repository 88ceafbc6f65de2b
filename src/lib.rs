//! # Weir
//!
//! Composable rule chains and keyed-container validation.
//!
//! A [`Rule`] inspects one dynamically typed [`Value`]. Rules are composed
//! into chains evaluated left to right with first-failure semantics, and a
//! [`MapRule`] binds chains to the keys of a container, collecting every
//! per-key violation into one deterministic, structured [`Errors`].
//!
//! ## Quick Example
//!
//! ```rust
//! use weir::prelude::*;
//! use weir::rule::{length, required};
//!
//! let user = Value::from([
//!     ("Name", Value::from("name")),
//!     ("Value", Value::from("demo")),
//! ]);
//!
//! let rule = map(vec![
//!     key!("Name", required()),
//!     key!("Value", required(), length(5, 10)),
//!     key!("Nick").optional(),
//! ]);
//!
//! match validate(&user, &rules![rule]) {
//!     Ok(()) => println!("valid"),
//!     Err(err) => assert_eq!(err.to_string(), "Value: the length must be between 5 and 10."),
//! }
//! ```
//!
//! ## Errors
//!
//! Violations (a missing key, a failed rule) are collected per key. Faults
//! ([`InternalError`]: duplicate key declarations, cancelled contexts,
//! broken rules) abort the call and are returned verbatim.
//!
//! ## Features
//!
//! - `tracing`: debug and warn events at the engine seams
//! - `serde`: `Serialize` for values and errors, `From<serde_json::Value>`
//! - `proptest`: `Arbitrary` strategies in [`testing`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod chain;
pub mod context;
pub mod error;
pub mod introspect;
pub mod map;
pub mod rule;
pub mod semigroup;
pub mod testing;
pub mod value;

// Re-exports
pub use chain::{validate, validate_with_context, Validator};
pub use context::Context;
pub use error::{Error, Errors, FaultKind, InternalError, RuleError};
pub use introspect::{default_materializer, Materializer};
pub use map::{key, map, validate_map, KeyRules, MapRule};
pub use rule::{BoxedRule, Rule};
pub use semigroup::Semigroup;
pub use value::{Key, KeyKind, Validatable, Value, ValueMap};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::chain::{validate, validate_with_context, Validator};
    pub use crate::context::Context;
    pub use crate::error::{Error, Errors, InternalError, RuleError};
    pub use crate::map::{map, validate_map, KeyRules, MapRule};
    pub use crate::rule::{BoxedRule, Rule};
    pub use crate::semigroup::Semigroup;
    pub use crate::value::{Key, Validatable, Value, ValueMap};
    pub use crate::{key, rules};
}
