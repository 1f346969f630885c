//! A scapegoat tree is a self-balancing binary search tree with amortized
//! `O(log(n))` insertion and deletion, and worst-case `O(log(n))` search, which
//! keeps no balance information in its nodes.
//!
//! Rather than rotating after every change, the tree lets itself drift until
//! some subtree is no longer _alpha-weight-balanced_, that is until one child
//! of a node holds more than `alpha` times the nodes under it. The offending
//! subtree, the scapegoat, is then flattened and rebuilt perfectly balanced:
//!
//! ```text
//!       3                          3
//!      / \                        / \
//!     2   5                      1   5
//!    /     \        ----->      / \   \
//!   1       6                 -1   2   6
//!  /
//! -1
//! ```
//!
//! Inserting `-1` unbalances node `2`: two nodes now hang on its left and none
//! on its right. Node `2` becomes the scapegoat, and its subtree is rebuilt
//! around its median key `1`.
//!
//! The balance factor `alpha` lies in `[0.5, 1]`. Lower values keep the tree
//! shallower at the cost of more frequent rebuilds; `alpha = 1` disables
//! rebalancing altogether.
//!
//! ```
//! use scapegoat_tree::ScapegoatTree;
//!
//! let mut tree = ScapegoatTree::with_alpha(0.75).unwrap();
//! tree.extend([8, 3, 10, 1, 6, 14]);
//! assert!(tree.contains(&6));
//! assert!(tree.delete(&3));
//! assert_eq!(tree.to_string(), "[1, 6, 8, 10, 14]");
//! assert!(tree.is_alpha_weight_balanced());
//! ```
//!
//! The building blocks of the tree, [`Node`], [`find_scapegoat`],
//! [`flatten`] and [`rebuild_from_sorted`], are exposed as well.

mod balance;
mod error;
mod node;
mod rebuild;
mod scapegoat;
mod tree;

pub use balance::{DEFAULT_ALPHA, check_alpha, depth_bound, is_alpha_weight_balanced};
pub use error::TreeError;
pub use node::{IntoIter, Iter, Node};
pub use rebuild::{flatten, rebuild, rebuild_from_sorted};
pub use scapegoat::find_scapegoat;
pub use tree::ScapegoatTree;
