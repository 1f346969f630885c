//! Errors raised by the tree and its building blocks.
//!
//! Every variant is a contract violation on the caller's side (or an internal
//! consistency failure); ordinary misses such as searching for an absent key
//! are reported through `Option`/`bool` results instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
/// Errors that can occur while building, tuning or repairing a
/// [`ScapegoatTree`][crate::ScapegoatTree].
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum TreeError {
    /// A child was attached on the wrong side of its parent: left children
    /// must compare strictly less than the parent, right children strictly
    /// greater.
    #[error("child key violates the binary search tree order.")]
    InvalidTreeOrder,
    /// The balance factor must lie in `$[0.5, 1]$`.
    #[error("alpha must be in [0.5, 1.0], got {alpha}.")]
    InvalidAlpha {
        /// The rejected value.
        alpha: f64,
    },
    /// The inclusive range `[lo, hi]` does not describe a slice of the list.
    #[error("invalid range [{lo}, {hi}] for a list of length {len}.")]
    InvalidRange {
        /// Lower bound (inclusive).
        lo: usize,
        /// Upper bound (inclusive).
        hi: usize,
        /// Length of the list the range was applied to.
        len: usize,
    },
    /// The scapegoat search was handed an empty insertion path.
    #[error("the path must not be empty.")]
    EmptyPath,
    /// Every node on the path is alpha-weight-balanced.
    #[error("scapegoat node wasn't found; the tree should be unbalanced.")]
    ScapegoatNotFound,
}
