//! Weight balance of a scapegoat tree.
//!
//! A node of size `$n$` is _alpha-weight-balanced_ when neither of its
//! children holds more than `$\alpha n$` nodes. A subtree is balanced when
//! every node in it is. With `$\alpha = 1/2$` this forces both halves of
//! every subtree to differ by at most one node; with `$\alpha = 1$` any
//! shape qualifies and balancing is effectively disabled.
//!
//! A balanced tree of `$n$` nodes is never taller than
//! `$\log_{1/\alpha}(n)$`, which is the bound the tree checks insertions
//! against (see [`depth_bound`]).

use crate::{error::TreeError, node::Node};

/// The balance factor used when none is specified.
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Validate a balance factor, which must lie in `$[0.5, 1]$`.
///
/// # Errors
///
/// Returns [`TreeError::InvalidAlpha`] for any other value, `NaN` included.
#[inline]
pub fn check_alpha(alpha: f64) -> Result<f64, TreeError> {
    if (0.5..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(TreeError::InvalidAlpha { alpha })
    }
}

/// Check whether the subtree rooted at `node` is alpha-weight-balanced.
///
/// The predicate applies to every node of the subtree, not just its root. An
/// empty subtree is balanced.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::{Node, is_alpha_weight_balanced};
///
/// let chain = Node::with_children(1, None, Some(Box::new(Node::new(2)))).unwrap();
/// assert!(is_alpha_weight_balanced(Some(&chain), 0.5));
///
/// let longer = Node::with_children(0, None, Some(Box::new(chain))).unwrap();
/// assert!(!is_alpha_weight_balanced(Some(&longer), 0.5));
/// assert!(is_alpha_weight_balanced(Some(&longer), 1.0));
/// ```
#[must_use]
pub fn is_alpha_weight_balanced<K>(node: Option<&Node<K>>, alpha: f64) -> bool {
    if alpha >= 1.0 {
        return true;
    }
    node.is_none_or(|node| balanced_size(node, alpha).is_some())
}

/// Size of the subtree if it is balanced, `None` as soon as one node is not.
///
/// Nodes are visited in post-order from an explicit stack, each one once its
/// children's sizes sit on top of `sizes`.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "Subtree sizes are far below 2^52, the weight limit is fractional"
)]
fn balanced_size<K>(root: &Node<K>, alpha: f64) -> Option<usize> {
    let mut pending = vec![(root, false)];
    let mut sizes = Vec::new();
    while let Some((node, visited)) = pending.pop() {
        if !visited {
            pending.push((node, true));
            pending.extend(node.left().map(|child| (child, false)));
            pending.extend(node.right().map(|child| (child, false)));
            continue;
        }

        // The left child was pushed first, so its size was computed last.
        let left = if node.left().is_some() { sizes.pop()? } else { 0 };
        let right = if node.right().is_some() { sizes.pop()? } else { 0 };
        let size = left + right + 1;
        let limit = alpha * size as f64;
        if left as f64 > limit || right as f64 > limit {
            return None;
        }
        sizes.push(size);
    }
    sizes.pop()
}

/// The amortized depth bound `$\log_{1/\alpha}(n)$` for a tree whose size has
/// peaked at `size`.
///
/// An insertion path holding more nodes than this bound means that the tree
/// has grown taller than any alpha-weight-balanced tree of that size could be.
/// With `alpha = 1` the bound is infinite.
#[must_use]
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "The bound is a real-valued logarithm"
)]
pub fn depth_bound(size: usize, alpha: f64) -> f64 {
    if alpha >= 1.0 {
        return f64::INFINITY;
    }
    (size as f64).ln() / (1.0 / alpha).ln()
}
