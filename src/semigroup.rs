//! Semigroup trait for merging validation results
//!
//! A Semigroup is a type with an associative binary operation. The map
//! validator uses it to fold per-key results into one structured error.
//!
//! # Mathematical Properties
//!
//! For a type to be a valid Semigroup, the `combine` operation must be associative:
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use weir::{Errors, RuleError, Semigroup};
//!
//! let mut a = Errors::new();
//! a.insert("A", RuleError::new("code", "error xyz"));
//! let mut b = Errors::new();
//! b.insert("B", RuleError::new("code", "error abc"));
//!
//! assert_eq!(a.combine(b).to_string(), "A: error xyz; B: error abc.");
//! ```

/// A type that supports an associative binary operation
///
/// # Laws
///
/// Implementations must satisfy the associativity law:
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
///
/// # Note on Ownership
///
/// The `combine` method takes `self` by value, not by reference. If you need to
/// preserve the original values, you must clone them before combining.
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}
