//! The scapegoat tree.

use std::{borrow::Borrow, cmp::Ordering, fmt, iter};

use crate::{
    balance::{self, DEFAULT_ALPHA},
    error::TreeError,
    node::{IntoIter, Iter, Link, Node, Side},
    rebuild::rebuild,
    scapegoat::find_scapegoat,
};

// ////////////////////////////////////////////////////////////////////////////
// ScapegoatTree
// ////////////////////////////////////////////////////////////////////////////

/// A binary search tree with amortized `$O(\log n)$` search, insertion and
/// deletion that stores no balance information in its nodes.
///
/// Instead of rotating after every change, the tree waits until it has
/// drifted too far from weight balance and then rebuilds a whole subtree
/// (the _scapegoat_) into a perfectly balanced one:
///
/// - After an insertion, the deepest ancestor of the new leaf that is no
///   longer alpha-weight-balanced is rebuilt, and so on up the insertion path
///   until every ancestor is balanced again. This is attempted whenever the
///   new leaf lies deeper than `$\log_{1/\alpha}(\text{max\_size})$` or the
///   tree lost its balance.
/// - After a deletion, if the tree shrank below `alpha * max_size` nodes, the
///   whole tree is rebuilt and `max_size` is reset to the current size.
///   Otherwise unbalanced ancestors of the removed node are rebuilt in place.
///
/// Duplicate keys are not stored: inserting a key that is already present is
/// a no-op.
///
/// A callback registered with
/// [`set_unbalanced_hook`][ScapegoatTree::set_unbalanced_hook] is invoked once
/// for every insertion or deletion that rebuilds part of the tree.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let mut tree = ScapegoatTree::new();
/// for key in [5, 3, 8, 1, 4] {
///     assert!(tree.insert(key));
/// }
/// assert!(!tree.insert(3));
/// assert!(tree.contains(&4));
/// assert!(tree.delete(&4));
/// assert!(tree.iter().copied().eq([1, 3, 5, 8]));
/// assert!(tree.is_alpha_weight_balanced());
/// ```
pub struct ScapegoatTree<K> {
    root: Link<K>,
    /// Number of nodes in the tree.
    size: usize,
    /// Largest `size` since the last full rebuild.
    max_size: usize,
    alpha: f64,
    on_unbalanced: Option<Box<dyn FnMut() + Send>>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K> ScapegoatTree<K> {
    /// Create an empty tree with the default balance factor of `0.5`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree: ScapegoatTree<i64> = ScapegoatTree::new();
    /// assert!(tree.root().is_none());
    /// assert_eq!(tree.alpha(), 0.5);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::empty(DEFAULT_ALPHA)
    }

    /// Create an empty tree with the given balance factor.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidAlpha`] unless `alpha` lies in `$[0.5, 1]$`.
    #[inline]
    pub fn with_alpha(alpha: f64) -> Result<Self, TreeError> {
        Ok(Self::empty(balance::check_alpha(alpha)?))
    }

    /// Create a tree holding a single key, with the default balance factor.
    #[inline]
    #[must_use]
    pub fn with_key(key: K) -> Self {
        let mut tree = Self::new();
        tree.plant(key);
        tree
    }

    /// Create a tree holding a single key, with the given balance factor.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidAlpha`] unless `alpha` lies in `$[0.5, 1]$`.
    #[inline]
    pub fn with_key_and_alpha(key: K, alpha: f64) -> Result<Self, TreeError> {
        let mut tree = Self::with_alpha(alpha)?;
        tree.plant(key);
        Ok(tree)
    }

    /// Wrap an existing subtree. Both `size` and `max_size` are set to the
    /// number of nodes in `node`.
    ///
    /// The subtree is taken as is. If it is not alpha-weight-balanced,
    /// insertions and deletions only repair the paths they walk through.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidAlpha`] unless `alpha` lies in `$[0.5, 1]$`.
    pub fn from_node(node: Node<K>, alpha: f64) -> Result<Self, TreeError> {
        let mut tree = Self::with_alpha(alpha)?;
        tree.size = node.size();
        tree.max_size = tree.size;
        tree.root = Some(Box::new(node));
        Ok(tree)
    }

    fn empty(alpha: f64) -> Self {
        ScapegoatTree {
            root: None,
            size: 0,
            max_size: 0,
            alpha,
            on_unbalanced: None,
        }
    }

    fn plant(&mut self, key: K) {
        self.root = Some(Box::new(Node::new(key)));
        self.size = 1;
        self.max_size = 1;
    }

    /// The root of the tree, if any.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&Node<K>> {
        self.root.as_deref()
    }

    /// Number of keys in the tree.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The largest size the tree has reached since it was last rebuilt as a
    /// whole.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// The balance factor.
    #[inline]
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of keys in the tree; the same as [`size`][ScapegoatTree::size].
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the tree holds no keys.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Replace the balance factor.
    ///
    /// The tree is not rebuilt; the new factor applies from the next
    /// insertion or deletion onwards.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidAlpha`] unless `alpha` lies in
    /// `$[0.5, 1]$`, in which case the current factor is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::with_key(1);
    /// assert!(tree.tune(9.9).is_err());
    /// assert_eq!(tree.alpha(), 0.5);
    /// tree.tune(0.75).unwrap();
    /// assert_eq!(tree.alpha(), 0.75);
    /// ```
    #[inline]
    pub fn tune(&mut self, alpha: f64) -> Result<(), TreeError> {
        self.alpha = balance::check_alpha(alpha)?;
        Ok(())
    }

    /// Register a callback invoked every time an insertion or deletion has to
    /// rebuild part of the tree. Any previously registered callback is
    /// replaced.
    ///
    /// The callback runs in the middle of the operation and cannot reach the
    /// tree itself.
    #[inline]
    pub fn set_unbalanced_hook<F>(&mut self, hook: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_unbalanced = Some(Box::new(hook));
    }

    /// Remove the callback registered with
    /// [`set_unbalanced_hook`][ScapegoatTree::set_unbalanced_hook].
    #[inline]
    pub fn clear_unbalanced_hook(&mut self) {
        self.on_unbalanced = None;
    }

    /// Returns `true` if every node of the tree is alpha-weight-balanced. An
    /// empty tree is balanced.
    #[inline]
    #[must_use]
    pub fn is_alpha_weight_balanced(&self) -> bool {
        balance::is_alpha_weight_balanced(self.root(), self.alpha)
    }

    /// Remove every key.
    #[inline]
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
        self.max_size = 0;
    }

    /// Iterate over the keys in increasing order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root())
    }

    /// The smallest key, if any.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.root().map(|root| root.smallest().key())
    }

    /// The largest key, if any.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.root().map(|root| root.largest().key())
    }

    fn grow(&mut self) {
        self.size += 1;
        self.max_size = self.max_size.max(self.size);
    }

    fn notify_unbalanced(&mut self) {
        if let Some(hook) = self.on_unbalanced.as_mut() {
            hook();
        }
    }

    /// The nodes met when following `directions` from the root, root
    /// included. Stops early if the path runs out of nodes.
    fn path_to(&self, directions: &[Side]) -> Vec<&Node<K>> {
        let mut path = Vec::with_capacity(directions.len() + 1);
        let mut steps = directions.iter();
        let mut current = self.root();
        while let Some(node) = current {
            path.push(node);
            current = steps.next().and_then(|&side| node.child(side));
        }
        path
    }

    fn node_mut(&mut self, directions: &[Side]) -> Option<&mut Node<K>> {
        let mut current = self.root.as_deref_mut()?;
        for &side in directions {
            current = current.child_mut(side)?;
        }
        Some(current)
    }

    /// The link holding the node reached by `directions`.
    fn link_mut(&mut self, directions: &[Side]) -> &mut Link<K> {
        match directions.split_last() {
            None => &mut self.root,
            Some((&side, parent)) => match self.node_mut(parent) {
                Some(parent) => parent.link_mut(side),
                None => unreachable!("the path was recorded on this tree"),
            },
        }
    }
}

impl<K> ScapegoatTree<K>
where
    K: Ord,
{
    /// Find the node holding `key`.
    #[inline]
    pub fn search<Q>(&self, key: &Q) -> Option<&Node<K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root()?.search(key)
    }

    /// Returns `true` if the tree holds `key`.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Insert `key`, rebuilding part of the tree if it became unbalanced.
    ///
    /// Returns `false`, leaving the tree untouched, if `key` is already
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::with_key(3);
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    /// assert_eq!(tree.size(), 2);
    /// ```
    #[expect(
        clippy::expect_used,
        reason = "Nodes are only attached at the position the descent found for their key"
    )]
    pub fn insert(&mut self, key: K) -> bool {
        self.try_insert(key)
            .expect("attaching along the search path preserves the tree order")
    }

    fn try_insert(&mut self, key: K) -> Result<bool, TreeError> {
        // The descent doubles as the membership check.
        let mut directions = Vec::new();
        let mut current = self.root();
        while let Some(node) = current {
            let side = match key.cmp(node.key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Ok(false),
            };
            directions.push(side);
            current = node.child(side);
        }

        let Some((&side, parent)) = directions.split_last() else {
            self.plant(key);
            return Ok(true);
        };
        let Some(parent) = self.node_mut(parent) else {
            unreachable!("the path was recorded on this tree");
        };
        parent.set_child(side, Some(Box::new(Node::new(key))))?;
        self.grow();

        // The path runs from the root to the new leaf, both included.
        let depth = directions.len() + 1;
        let bound = balance::depth_bound(self.max_size, self.alpha);
        #[expect(
            clippy::as_conversions,
            clippy::cast_precision_loss,
            reason = "Depths are tiny compared to 2^52"
        )]
        let too_deep = depth as f64 > bound;
        if too_deep {
            tracing::trace!(depth, bound, "insertion exceeded the depth bound");
        }
        if too_deep || !self.is_alpha_weight_balanced() {
            self.rebalance_path(&directions)?;
        }
        Ok(true)
    }

    /// Remove `key`, rebuilding part or all of the tree if it became
    /// unbalanced.
    ///
    /// Returns `false` if `key` is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree: ScapegoatTree<_> = [2, 1, 3].into_iter().collect();
    /// assert!(tree.delete(&2));
    /// assert!(!tree.delete(&2));
    /// assert_eq!(tree.to_string(), "[1, 3]");
    /// ```
    #[expect(
        clippy::expect_used,
        reason = "Nodes are only attached at the position the descent found for their key"
    )]
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.try_delete(key)
            .expect("attaching along the search path preserves the tree order")
    }

    fn try_delete<Q>(&mut self, key: &Q) -> Result<bool, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut directions = Vec::new();
        let mut current = self.root();
        loop {
            let Some(node) = current else {
                return Ok(false);
            };
            let side = match key.cmp(node.key().borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => break,
            };
            directions.push(side);
            current = node.child(side);
        }

        Self::unlink(self.link_mut(&directions), &mut directions)?;
        self.size -= 1;

        if self.root.is_none() {
            return Ok(true);
        }

        #[expect(
            clippy::as_conversions,
            clippy::cast_precision_loss,
            clippy::float_arithmetic,
            reason = "Sizes are tiny compared to 2^52, alpha is fractional"
        )]
        let shrunk = (self.size as f64) < self.alpha * self.max_size as f64;
        if shrunk {
            tracing::debug!(
                size = self.size,
                max_size = self.max_size,
                "tree shrank too far, rebuilding it whole"
            );
            self.notify_unbalanced();
            self.rebuild_at(&[]);
            self.max_size = self.size;
        } else {
            self.rebalance_path(&directions)?;
        }
        Ok(true)
    }

    /// Remove the node held by `link`.
    ///
    /// A node with two children takes the key of its in-order predecessor,
    /// which is removed from the left subtree instead. `directions` is
    /// extended to the position the removed node occupied, so that it covers
    /// every node whose subtree shrank.
    fn unlink(link: &mut Link<K>, directions: &mut Vec<Side>) -> Result<(), TreeError> {
        let Some(mut node) = link.take() else {
            return Ok(());
        };
        match (node.take_left(), node.take_right()) {
            (None, None) => {}
            (Some(child), None) | (None, Some(child)) => *link = Some(child),
            (Some(left), Some(right)) => {
                let mut left = Some(left);
                directions.push(Side::Left);
                let Some(mut predecessor) = Self::pop_largest(&mut left, directions) else {
                    unreachable!("the left subtree is not empty");
                };
                predecessor.set_left(left)?;
                predecessor.set_right(Some(right))?;
                *link = Some(predecessor);
            }
        }
        Ok(())
    }

    /// Detach the node with the largest key under `link`, splicing its left
    /// subtree into its place.
    fn pop_largest(mut link: &mut Link<K>, directions: &mut Vec<Side>) -> Option<Box<Node<K>>> {
        while link.as_ref()?.right().is_some() {
            directions.push(Side::Right);
            link = link.as_mut()?.link_mut(Side::Right);
        }
        let mut node = link.take()?;
        *link = node.take_left();
        Some(node)
    }

    /// Rebuild, deepest first, every ancestor on `directions` that is not
    /// alpha-weight-balanced, until the whole path is balanced.
    ///
    /// Returns the number of subtrees rebuilt.
    fn rebalance_path(&mut self, directions: &[Side]) -> Result<usize, TreeError> {
        let mut limit = directions.len();
        let mut rebuilt = 0;
        loop {
            let mut path = self.path_to(&directions[..limit]);
            if path.is_empty() {
                break;
            }
            let depth = match find_scapegoat(&mut path, self.alpha) {
                Ok(_) => path.len(),
                Err(TreeError::ScapegoatNotFound) => break,
                Err(err) => return Err(err),
            };

            if rebuilt == 0 {
                self.notify_unbalanced();
            }
            self.rebuild_at(&directions[..depth]);
            rebuilt += 1;

            match depth.checked_sub(1) {
                Some(parent) => limit = parent,
                None => break,
            }
        }
        Ok(rebuilt)
    }

    /// Flatten the subtree reached by `directions` and put a balanced rebuild
    /// of it in its place.
    fn rebuild_at(&mut self, directions: &[Side]) {
        let link = self.link_mut(directions);
        let subtree = rebuild(link.take());
        tracing::debug!(
            depth = directions.len(),
            size = subtree.as_deref().map_or(0, Node::size),
            "rebuilt subtree"
        );
        *link = subtree;
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K> Default for ScapegoatTree<K> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for ScapegoatTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScapegoatTree")
            .field("keys", &DebugKeys(self))
            .field("size", &self.size)
            .field("max_size", &self.max_size)
            .field("alpha", &self.alpha)
            .finish_non_exhaustive()
    }
}

struct DebugKeys<'a, K>(&'a ScapegoatTree<K>);

impl<K> fmt::Debug for DebugKeys<'_, K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Prints the keys in order, `[1, 2, 3]`. The alternate form (`{:#}`) prints
/// the shape of the tree instead, see [`Node`].
impl<K> fmt::Display for ScapegoatTree<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return match self.root() {
                Some(root) => write!(f, "{root:#}"),
                None => write!(f, "_"),
            };
        }

        write!(f, "[")?;
        for (i, key) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "]")
    }
}

impl<K> Extend<K> for ScapegoatTree<K>
where
    K: Ord,
{
    #[inline]
    fn extend<I: IntoIterator<Item = K>>(&mut self, iterable: I) {
        for key in iterable {
            self.insert(key);
        }
    }
}

impl<K> iter::FromIterator<K> for ScapegoatTree<K>
where
    K: Ord,
{
    #[inline]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut tree = ScapegoatTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K> IntoIterator for ScapegoatTree<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    #[inline]
    fn into_iter(mut self) -> IntoIter<K> {
        IntoIter::new(self.root.take())
    }
}

impl<'a, K> IntoIterator for &'a ScapegoatTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    #[inline]
    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
