//! Flattening a subtree into its sorted keys and rebuilding a subtree of
//! minimal height from sorted keys.
//!
//! Together they are how a scapegoat tree restores balance: the offending
//! subtree is flattened and replaced by a freshly built one. The keys survive
//! a rebuild, the nodes holding them do not.

use crate::{
    error::TreeError,
    node::{IntoIter, Link, Node},
};

/// Append the keys of `subtree` to `out` in increasing order, consuming the
/// subtree.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::{Node, flatten};
///
/// let root = Node::with_children(2, Some(Box::new(Node::new(1))), None).unwrap();
/// let mut keys = vec![0];
/// flatten(Some(Box::new(root)), &mut keys);
/// assert_eq!(keys, vec![0, 1, 2]);
/// ```
#[inline]
pub fn flatten<K>(subtree: Option<Box<Node<K>>>, out: &mut Vec<K>) {
    out.extend(IntoIter::new(subtree));
}

/// Build a subtree of minimal height from the inclusive range `keys[lo..=hi]`,
/// which must be sorted in strictly increasing order.
///
/// The middle key `keys[(lo + hi) / 2]` becomes the root, and both halves are
/// built the same way. The range `lo = 1, hi = 0` stands for "nothing" and
/// yields an empty subtree whatever the length of `keys`; this is how an
/// empty list is rebuilt.
///
/// # Errors
///
/// - [`TreeError::InvalidRange`] if `lo > hi` (other than `lo = 1, hi = 0`)
///   or if `hi` is out of bounds.
/// - [`TreeError::InvalidTreeOrder`] if `keys[lo..=hi]` is not strictly
///   increasing. Keys outside the range are not looked at.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::rebuild_from_sorted;
///
/// let root = rebuild_from_sorted(vec![1, 2, 3, 4, 5], 0, 4).unwrap().unwrap();
/// assert_eq!(format!("{root:#}"), "(3 (1 _ (2)) (4 _ (5)))");
///
/// assert!(rebuild_from_sorted(Vec::<u8>::new(), 1, 0).unwrap().is_none());
/// ```
pub fn rebuild_from_sorted<K>(
    keys: Vec<K>,
    lo: usize,
    hi: usize,
) -> Result<Option<Box<Node<K>>>, TreeError>
where
    K: Ord,
{
    if lo == 1 && hi == 0 {
        return Ok(None);
    }
    let len = keys.len();
    if lo > hi || hi >= len {
        return Err(TreeError::InvalidRange { lo, hi, len });
    }
    let sorted = keys
        .get(lo..=hi)
        .is_some_and(|range| range.windows(2).all(|pair| pair[0] < pair[1]));
    if !sorted {
        return Err(TreeError::InvalidTreeOrder);
    }

    let mut keys = keys.into_iter().skip(lo);
    Ok(build(&mut keys, hi - lo + 1))
}

/// Build a subtree out of the next `count` keys, consumed in order: first the
/// left half, then the root, then the right half.
///
/// The keys must be strictly increasing. The recursion is as deep as the
/// subtree it builds, which is logarithmic in `count`.
fn build<K, I>(keys: &mut I, count: usize) -> Link<K>
where
    I: Iterator<Item = K>,
{
    if count == 0 {
        return None;
    }
    let left_count = (count - 1) / 2;
    let left = build(keys, left_count);
    let Some(key) = keys.next() else {
        unreachable!("the range was checked against the length of the list");
    };
    let right = build(keys, count - 1 - left_count);
    Some(Box::new(Node::from_parts(key, left, right)))
}

/// Replace `subtree` by a height-balanced subtree holding the same keys.
///
/// Attachment order is enforced on every [`Node`], so the flattened keys are
/// always strictly increasing and the rebuild cannot fail.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::{Node, rebuild};
///
/// let middle = Node::with_children(2, Some(Box::new(Node::new(1))), None).unwrap();
/// let chain = Node::with_children(3, Some(Box::new(middle)), None).unwrap();
/// let root = rebuild(Some(Box::new(chain))).unwrap();
/// assert_eq!(format!("{root:#}"), "(2 (1) (3))");
/// ```
#[must_use]
pub fn rebuild<K>(subtree: Option<Box<Node<K>>>) -> Option<Box<Node<K>>> {
    let mut keys = Vec::new();
    flatten(subtree, &mut keys);
    let count = keys.len();
    build(&mut keys.into_iter(), count)
}
