//! The building block of a [`ScapegoatTree`][crate::ScapegoatTree].
//!
//! A node owns its key and up to two children. There are no parent links and
//! no cached metadata: the size of a subtree is obtained by walking it, and
//! ancestors are recovered by the tree through an explicit path of [`Side`]s.
//!
//! The binary search tree order is enforced whenever a child is attached, so
//! a node can never hold a left child whose key is not strictly smaller (or a
//! right child whose key is not strictly greater) than its own.

use std::{borrow::Borrow, cmp::Ordering, fmt, iter::FusedIterator};

use crate::{balance, error::TreeError};

/// An owned, possibly empty, subtree.
pub(crate) type Link<K> = Option<Box<Node<K>>>;

/// A child link owned by a node.
///
/// Dropping it frees the subtree one node at a time, so that dropping a
/// degenerate (list-like) subtree does not recurse.
struct Subtree<K>(Link<K>);

impl<K> Drop for Subtree<K> {
    fn drop(&mut self) {
        let Some(root) = self.0.take() else {
            return;
        };
        let mut pending = vec![root];
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.0.take());
            pending.extend(node.right.0.take());
        }
    }
}

impl<K> fmt::Debug for Subtree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The child of a node that a step along a path descends into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

// ////////////////////////////////////////////////////////////////////////////
// Node
// ////////////////////////////////////////////////////////////////////////////

/// A node of a scapegoat tree, exclusively owning its children.
#[derive(Debug)]
pub struct Node<K> {
    key: K,
    left: Subtree<K>,
    right: Subtree<K>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K> Node<K> {
    /// Create a new leaf holding `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::Node;
    ///
    /// let node = Node::new(7);
    /// assert_eq!(node.key(), &7);
    /// assert_eq!(node.size(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(key: K) -> Self {
        Node {
            key,
            left: Subtree(None),
            right: Subtree(None),
        }
    }

    /// Join `key` with two subtrees without checking their order.
    pub(crate) fn from_parts(key: K, left: Link<K>, right: Link<K>) -> Self {
        Node {
            key,
            left: Subtree(left),
            right: Subtree(right),
        }
    }

    /// The key stored in this node.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// The left child, if any.
    #[inline]
    #[must_use]
    pub fn left(&self) -> Option<&Self> {
        self.left.0.as_deref()
    }

    /// The right child, if any.
    #[inline]
    #[must_use]
    pub fn right(&self) -> Option<&Self> {
        self.right.0.as_deref()
    }

    /// Detach and return the left subtree.
    #[inline]
    pub fn take_left(&mut self) -> Option<Box<Self>> {
        self.left.0.take()
    }

    /// Detach and return the right subtree.
    #[inline]
    pub fn take_right(&mut self) -> Option<Box<Self>> {
        self.right.0.take()
    }

    pub(crate) fn child(&self, side: Side) -> Option<&Self> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> Option<&mut Self> {
        match side {
            Side::Left => self.left.0.as_deref_mut(),
            Side::Right => self.right.0.as_deref_mut(),
        }
    }

    pub(crate) fn link_mut(&mut self, side: Side) -> &mut Link<K> {
        match side {
            Side::Left => &mut self.left.0,
            Side::Right => &mut self.right.0,
        }
    }

    /// Number of nodes in the subtree rooted here.
    ///
    /// The size is not cached, so this walks the whole subtree.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// The node holding the smallest key of this subtree.
    #[must_use]
    pub fn smallest(&self) -> &Self {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// The node holding the largest key of this subtree.
    #[must_use]
    pub fn largest(&self) -> &Self {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// The tallest height `$\lfloor \log_{1/\alpha}(n) \rfloor$` an
    /// `alpha`-weight-balanced subtree of this size may have.
    ///
    /// With `alpha = 1` no height is too tall and the result is infinite.
    #[inline]
    #[must_use]
    pub fn alpha_height(&self, alpha: f64) -> f64 {
        balance::depth_bound(self.size(), alpha).floor()
    }

    /// Iterate over the keys of this subtree in increasing order.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::Node;
    ///
    /// let root = Node::with_children(
    ///     2,
    ///     Some(Box::new(Node::new(1))),
    ///     Some(Box::new(Node::new(3))),
    /// )
    /// .unwrap();
    /// assert!(root.iter().copied().eq(1..=3));
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(Some(self))
    }
}

impl<K> Node<K>
where
    K: Ord,
{
    /// Create a node with the given children, validating the order of both.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTreeOrder`] if `left` is not strictly
    /// smaller or `right` is not strictly greater than `key`.
    pub fn with_children(
        key: K,
        left: Option<Box<Self>>,
        right: Option<Box<Self>>,
    ) -> Result<Self, TreeError> {
        let mut node = Node::new(key);
        node.set_left(left)?;
        node.set_right(right)?;
        Ok(node)
    }

    /// Attach `child` as the left subtree, replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTreeOrder`] if the child's key is not
    /// strictly smaller than this node's key. The node is left untouched.
    #[inline]
    pub fn set_left(&mut self, child: Option<Box<Self>>) -> Result<(), TreeError> {
        self.set_child(Side::Left, child)
    }

    /// Attach `child` as the right subtree, replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTreeOrder`] if the child's key is not
    /// strictly greater than this node's key. The node is left untouched.
    #[inline]
    pub fn set_right(&mut self, child: Option<Box<Self>>) -> Result<(), TreeError> {
        self.set_child(Side::Right, child)
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Box<Self>>) -> Result<(), TreeError> {
        let expected = match side {
            Side::Left => Ordering::Less,
            Side::Right => Ordering::Greater,
        };
        if let Some(node) = child.as_deref() {
            if node.key.cmp(&self.key) != expected {
                return Err(TreeError::InvalidTreeOrder);
            }
        }
        *self.link_mut(side) = child;
        Ok(())
    }

    /// Find the node holding `key` in this subtree.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::Node;
    ///
    /// let root = Node::with_children(1, Some(Box::new(Node::new(-1))), None).unwrap();
    /// assert_eq!(root.search(&-1).map(Node::key), Some(&-1));
    /// assert!(root.search(&2).is_none());
    /// ```
    pub fn search<Q>(&self, key: &Q) -> Option<&Self>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self;
        loop {
            current = match key.cmp(current.key.borrow()) {
                Ordering::Less => current.left()?,
                Ordering::Greater => current.right()?,
                Ordering::Equal => return Some(current),
            };
        }
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

/// By default only the key is printed. The alternate form (`{:#}`) prints the
/// shape of the whole subtree as an s-expression, `(key left right)`, with
/// `_` standing in for a missing child and leaves printed as `(key)`.
impl<K> fmt::Display for Node<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(f, "{}", self.key);
        }

        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            let node = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(node) => node,
            };
            write!(f, "({}", node.key)?;
            if node.left().is_none() && node.right().is_none() {
                f.write_str(")")?;
                continue;
            }
            pending.push(Piece::Text(")"));
            for child in [node.right(), node.left()] {
                pending.push(child.map_or(Piece::Text("_"), Piece::Node));
                pending.push(Piece::Text(" "));
            }
        }
        Ok(())
    }
}

/// Work left to print in the alternate form of [`Node`]'s `Display`.
enum Piece<'a, K> {
    Node(&'a Node<K>),
    Text(&'static str),
}

impl<K> IntoIterator for Node<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    #[inline]
    fn into_iter(self) -> IntoIter<K> {
        IntoIter::new(Some(Box::new(self)))
    }
}

impl<'a, K> IntoIterator for &'a Node<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    #[inline]
    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

// /////////////////////////////////
// Iterators
// /////////////////////////////////
// Both iterators keep the pending left spine on an explicit stack so that
// degenerate (list-like) trees do not recurse.

/// In-order iterator over the keys of a subtree, by reference.
#[derive(Clone, Debug)]
pub struct Iter<'a, K> {
    stack: Vec<&'a Node<K>>,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(root: Option<&'a Node<K>>) -> Self {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<K>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right());
        Some(&node.key)
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

/// In-order iterator over the keys of a subtree, consuming the nodes.
#[derive(Debug)]
pub struct IntoIter<K> {
    stack: Vec<Box<Node<K>>>,
}

impl<K> IntoIter<K> {
    pub(crate) fn new(root: Link<K>) -> Self {
        let mut iter = IntoIter { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Link<K>) {
        while let Some(mut node) = link {
            link = node.left.0.take();
            self.stack.push(node);
        }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let Node { key, mut right, .. } = *node;
        self.push_left_spine(right.0.take());
        Some(key)
    }
}

impl<K> FusedIterator for IntoIter<K> {}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::Node;
    use crate::error::TreeError;

    fn leaf<K>(key: K) -> Option<Box<Node<K>>> {
        Some(Box::new(Node::new(key)))
    }

    /// Builds `(3 (1 (-1) (2)) (6 (5) _))`.
    fn sample() -> Result<Node<i32>> {
        Ok(Node::with_children(
            3,
            Some(Box::new(Node::with_children(1, leaf(-1), leaf(2))?)),
            Some(Box::new(Node::with_children(6, leaf(5), None)?)),
        )?)
    }

    #[rstest]
    #[case(2, 1)]
    #[case("B", "A")]
    fn right_setter_rejects_smaller_key<K: Ord + Copy>(#[case] parent: K, #[case] child: K) {
        let mut node = Node::new(parent);
        assert_eq!(node.set_right(leaf(child)), Err(TreeError::InvalidTreeOrder));
        assert!(node.right().is_none());
    }

    #[rstest]
    #[case(1, 2)]
    #[case("A", "B")]
    fn right_setter_accepts_greater_key<K: Ord + Copy + std::fmt::Debug>(
        #[case] parent: K,
        #[case] child: K,
    ) -> Result<()> {
        let mut node = Node::new(parent);
        node.set_right(leaf(child))?;
        assert_eq!(node.right().map(Node::key), Some(&child));
        Ok(())
    }

    #[rstest]
    #[case(1, 2)]
    #[case("A", "B")]
    fn left_setter_rejects_greater_key<K: Ord + Copy>(#[case] parent: K, #[case] child: K) {
        let mut node = Node::new(parent);
        assert_eq!(node.set_left(leaf(child)), Err(TreeError::InvalidTreeOrder));
        assert!(node.left().is_none());
    }

    #[rstest]
    #[case(2, 1)]
    #[case("B", "A")]
    fn left_setter_accepts_smaller_key<K: Ord + Copy + std::fmt::Debug>(
        #[case] parent: K,
        #[case] child: K,
    ) -> Result<()> {
        let mut node = Node::new(parent);
        node.set_left(leaf(child))?;
        assert_eq!(node.left().map(Node::key), Some(&child));
        Ok(())
    }

    #[rstest]
    fn setters_reject_equal_key(#[values(true, false)] left: bool) {
        let mut node = Node::new(4);
        let result = if left {
            node.set_left(leaf(4))
        } else {
            node.set_right(leaf(4))
        };
        assert_eq!(result, Err(TreeError::InvalidTreeOrder));
    }

    #[test]
    fn failed_attachment_keeps_previous_child() -> Result<()> {
        let mut node = Node::new(4);
        node.set_left(leaf(2))?;
        assert!(node.set_left(leaf(9)).is_err());
        assert_eq!(node.left().map(Node::key), Some(&2));
        Ok(())
    }

    #[test]
    fn with_children_validates_both_sides() {
        assert_eq!(
            Node::with_children(5, leaf(7), None).err(),
            Some(TreeError::InvalidTreeOrder)
        );
        assert_eq!(
            Node::with_children(5, None, leaf(3)).err(),
            Some(TreeError::InvalidTreeOrder)
        );
    }

    #[test]
    fn size_counts_every_node() -> Result<()> {
        assert_eq!(Node::new(0).size(), 1);
        assert_eq!(sample()?.size(), 6);
        Ok(())
    }

    #[test]
    fn smallest_and_largest() -> Result<()> {
        let root = sample()?;
        assert_eq!(root.smallest().key(), &-1);
        assert_eq!(root.largest().key(), &6);

        let lone = Node::new("x");
        assert_eq!(lone.smallest().key(), &"x");
        assert_eq!(lone.largest().key(), &"x");
        Ok(())
    }

    #[rstest]
    #[case(-1, true)]
    #[case(2, true)]
    #[case(5, true)]
    #[case(3, true)]
    #[case(0, false)]
    #[case(4, false)]
    #[case(7, false)]
    fn search(#[case] key: i32, #[case] found: bool) -> Result<()> {
        let root = sample()?;
        let result = root.search(&key);
        assert_eq!(result.is_some(), found);
        if let Some(node) = result {
            assert_eq!(node.key(), &key);
        }
        Ok(())
    }

    #[test]
    fn search_with_borrowed_key() {
        let root = Node::new(String::from("m"));
        assert!(root.search("m").is_some());
        assert!(root.search("z").is_none());
    }

    #[test]
    fn iteration_is_sorted_and_restartable() -> Result<()> {
        let root = sample()?;
        let first: Vec<_> = root.iter().copied().collect();
        let second: Vec<_> = (&root).into_iter().copied().collect();
        assert_eq!(first, vec![-1, 1, 2, 3, 5, 6]);
        assert_eq!(first, second);
        assert_eq!(root.into_iter().collect::<Vec<_>>(), vec![-1, 1, 2, 3, 5, 6]);
        Ok(())
    }

    #[test]
    fn partially_consumed_into_iter_drops_cleanly() -> Result<()> {
        let mut iter = sample()?.into_iter();
        assert_eq!(iter.next(), Some(-1));
        assert_eq!(iter.next(), Some(1));
        drop(iter);
        Ok(())
    }

    /// A right-leaning chain `0 -> 1 -> ... -> len - 1`.
    fn chain(len: u32) -> Result<Node<u32>> {
        let mut root = Node::new(len - 1);
        for key in (0..len - 1).rev() {
            let mut parent = Node::new(key);
            parent.set_right(Some(Box::new(root)))?;
            root = parent;
        }
        Ok(root)
    }

    #[test]
    fn dropping_a_long_chain_does_not_overflow() -> Result<()> {
        let root = chain(300_000)?;
        assert_eq!(root.largest().key(), &299_999);
        drop(root);

        let mut root = chain(300_000)?;
        let detached = root.take_right();
        assert_eq!(detached.as_deref().map(Node::key), Some(&1));
        drop(detached);
        assert_eq!(root.size(), 1);
        Ok(())
    }

    #[test]
    fn display_of_a_long_chain_does_not_overflow() -> Result<()> {
        let rendered = format!("{:#}", chain(300_000)?);
        assert!(rendered.starts_with("(0 _ (1 _ (2 _ "));
        assert!(rendered.contains("(299998 _ (299999))"));
        assert_eq!(rendered.matches(')').count(), 300_000);
        Ok(())
    }

    #[test]
    fn degenerate_chain_does_not_overflow() -> Result<()> {
        let mut root = Node::new(0_u32);
        for key in 1..100_000 {
            let mut parent = Node::new(key);
            parent.set_left(Some(Box::new(root)))?;
            root = parent;
        }
        assert_eq!(root.size(), 100_000);
        assert_eq!(root.smallest().key(), &0);
        assert_eq!(root.into_iter().count(), 100_000);
        Ok(())
    }

    #[rstest]
    #[case(1, 0.5, 0.0)]
    #[case(6, 0.5, 2.0)]
    #[case(8, 0.5, 3.0)]
    #[case(10, 0.7, 6.0)]
    fn alpha_height(#[case] size: u32, #[case] alpha: f64, #[case] expected: f64) -> Result<()> {
        let mut root = Node::new(0);
        for key in 1..size {
            let mut parent = Node::new(key);
            parent.set_left(Some(Box::new(root)))?;
            root = parent;
        }
        assert_eq!(root.size(), usize::try_from(size)?);
        assert_eq!(root.alpha_height(alpha), expected);
        Ok(())
    }

    #[test]
    fn alpha_height_is_unbounded_without_balancing() {
        assert!(Node::new(1).alpha_height(1.0).is_infinite());
    }

    #[test]
    fn display() -> Result<()> {
        let root = sample()?;
        assert_eq!(format!("{root}"), "3");
        insta::assert_snapshot!(format!("{root:#}"), @"(3 (1 (-1) (2)) (6 (5) _))");
        Ok(())
    }
}
