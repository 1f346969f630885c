//! Locating the scapegoat of an insertion.

use crate::{balance::is_alpha_weight_balanced, error::TreeError, node::Node};

/// Pop ancestors off `path`, deepest first, until one of them is not
/// alpha-weight-balanced, and return it.
///
/// `path` holds the nodes visited by an insertion from the root down to the
/// new leaf, so popping yields the deepest node first. On success `path` is
/// left holding the ancestors of the scapegoat: its parent is `path.last()`,
/// and an empty `path` means the scapegoat is the root.
///
/// # Errors
///
/// - [`TreeError::EmptyPath`] if `path` is empty.
/// - [`TreeError::ScapegoatNotFound`] if every node on the path is balanced,
///   which means the caller should not have gone looking for a scapegoat.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::{Node, find_scapegoat};
///
/// let leaf = Node::new(3);
/// let middle = Node::with_children(2, None, Some(Box::new(leaf))).unwrap();
/// let root = Node::with_children(1, None, Some(Box::new(middle))).unwrap();
///
/// let middle = root.right().unwrap();
/// let leaf = middle.right().unwrap();
/// let mut path = vec![&root, middle, leaf];
///
/// let scapegoat = find_scapegoat(&mut path, 0.5).unwrap();
/// assert_eq!(scapegoat.key(), &1);
/// assert!(path.is_empty());
/// ```
pub fn find_scapegoat<'a, K>(
    path: &mut Vec<&'a Node<K>>,
    alpha: f64,
) -> Result<&'a Node<K>, TreeError> {
    if path.is_empty() {
        return Err(TreeError::EmptyPath);
    }
    while let Some(node) = path.pop() {
        if !is_alpha_weight_balanced(Some(node), alpha) {
            return Ok(node);
        }
    }
    Err(TreeError::ScapegoatNotFound)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use anyhow::{Result, bail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::find_scapegoat;
    use crate::{error::TreeError, node::Node};

    /// Insert `keys` one after the other without any rebalancing.
    fn naive(first: i32, keys: &[i32]) -> Result<Node<i32>> {
        fn insert(mut node: Box<Node<i32>>, key: i32) -> Result<Box<Node<i32>>> {
            let (child, left) = match key.cmp(node.key()) {
                Ordering::Less => (node.take_left(), true),
                Ordering::Greater => (node.take_right(), false),
                Ordering::Equal => bail!("duplicate key {key}"),
            };
            let child = match child {
                Some(child) => insert(child, key)?,
                None => Box::new(Node::new(key)),
            };
            if left {
                node.set_left(Some(child))?;
            } else {
                node.set_right(Some(child))?;
            }
            Ok(node)
        }

        let mut root = Box::new(Node::new(first));
        for &key in keys {
            root = insert(root, key)?;
        }
        Ok(*root)
    }

    /// The nodes visited while searching for `key`, root first.
    fn path_to<'a>(root: &'a Node<i32>, key: i32) -> Vec<&'a Node<i32>> {
        let mut path = Vec::new();
        let mut current = Some(root);
        while let Some(node) = current {
            path.push(node);
            current = match key.cmp(node.key()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => None,
            };
        }
        path
    }

    #[rstest]
    #[case(8, &[1, 13, 10, 20, 19, 22, 29], 0.57, 13, 1)]
    #[case(3, &[2, 1, 5, 6, -1], 0.5, 2, 1)]
    #[case(1, &[2, 3], 0.5, 1, 0)]
    #[case(1, &[2, 3, 4], 0.7, 1, 0)]
    fn finds_deepest_unbalanced_ancestor(
        #[case] first: i32,
        #[case] keys: &[i32],
        #[case] alpha: f64,
        #[case] expected: i32,
        #[case] ancestors: usize,
    ) -> Result<()> {
        let root = naive(first, keys)?;
        let Some(&last) = keys.last() else {
            bail!("no keys");
        };
        let mut path = path_to(&root, last);

        let scapegoat = find_scapegoat(&mut path, alpha)?;
        assert_eq!(scapegoat.key(), &expected);
        assert_eq!(path.len(), ancestors);
        Ok(())
    }

    #[rstest]
    #[case(19, &[10, 8, 13, 1, 22, 20, 29], 0.57)]
    #[case(3, &[2, 1, 5, 6], 0.5)]
    #[case(1, &[2, 3, 4, 5, 6], 1.0)]
    fn balanced_path_has_no_scapegoat(
        #[case] first: i32,
        #[case] keys: &[i32],
        #[case] alpha: f64,
    ) -> Result<()> {
        let root = naive(first, keys)?;
        let Some(&last) = keys.last() else {
            bail!("no keys");
        };
        let mut path = path_to(&root, last);

        assert_eq!(
            find_scapegoat(&mut path, alpha).err(),
            Some(TreeError::ScapegoatNotFound)
        );
        assert!(path.is_empty());
        Ok(())
    }

    #[test]
    fn empty_path() {
        let mut path: Vec<&Node<i32>> = Vec::new();
        assert_eq!(
            find_scapegoat(&mut path, 0.5).err(),
            Some(TreeError::EmptyPath)
        );
    }
}
