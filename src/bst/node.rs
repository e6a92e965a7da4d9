//! Tree nodes.

use std::fmt;

use crate::ReferenceCounter;
use crate::generic::GenericKey;

/// An owned, possibly empty subtree.
pub(crate) type Link<V> = Option<Box<Node<V>>>;

/// One key of an [`AvlTree`](super::AvlTree), its optional value and its
/// children.
///
/// A node exclusively owns its children. The value is *shared*: the tree
/// holds one reference-counted handle to it, so removing the node or dropping
/// the tree never destroys a value another structure still refers to.
///
/// The balance factor is the height of the right subtree minus the height of
/// the left subtree, always one of `-1`, `0` or `+1` between public calls.
pub struct Node<V> {
    pub(crate) key: GenericKey,
    pub(crate) value: Option<ReferenceCounter<V>>,
    pub(crate) left: Link<V>,
    pub(crate) right: Link<V>,
    pub(crate) balance: i8,
}

impl<V> Node<V> {
    /// Creates a leaf with no value.
    pub(crate) const fn new(key: GenericKey) -> Self {
        Self {
            key,
            value: None,
            left: None,
            right: None,
            balance: 0,
        }
    }

    /// Returns the key stored in this node.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &GenericKey {
        &self.key
    }

    /// Returns the value attached to this node, if any.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.value.as_deref()
    }

    /// Returns the shared handle to the value attached to this node, if any.
    #[inline]
    #[must_use]
    pub const fn shared_value(&self) -> Option<&ReferenceCounter<V>> {
        self.value.as_ref()
    }

    /// Attaches `value` to this node, replacing any previous value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::AvlTree;
    ///
    /// let mut tree = AvlTree::new("int");
    /// tree.insert(1).set_value("one");
    /// tree.insert(1).set_value("uno");
    /// assert_eq!(tree.find(1).and_then(|node| node.value()), Some(&"uno"));
    /// ```
    #[inline]
    pub fn set_value(&mut self, value: V) {
        self.value = Some(ReferenceCounter::new(value));
    }

    /// Attaches an already shared value to this node.
    #[inline]
    pub fn set_shared_value(&mut self, value: ReferenceCounter<V>) {
        self.value = Some(value);
    }

    /// Detaches and returns the value of this node.
    #[inline]
    pub const fn take_value(&mut self) -> Option<ReferenceCounter<V>> {
        self.value.take()
    }

    /// Returns the left child.
    #[inline]
    #[must_use]
    pub fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    /// Returns the right child.
    #[inline]
    #[must_use]
    pub fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    /// Returns the balance factor: right height minus left height.
    #[inline]
    #[must_use]
    pub const fn balance_factor(&self) -> i8 {
        self.balance
    }

    /// Copies this subtree node by node.
    ///
    /// Keys are copied, values are shared and balance factors are kept as
    /// they are instead of being recomputed.
    pub(crate) fn deep_copy(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            left: copy_link(self.left.as_deref()),
            right: copy_link(self.right.as_deref()),
            balance: self.balance,
        }
    }
}

/// Copies an optional subtree with [`Node::deep_copy`].
pub(crate) fn copy_link<V>(node: Option<&Node<V>>) -> Link<V> {
    node.map(|node| Box::new(node.deep_copy()))
}

/// Height of a subtree; an empty subtree has height 0.
pub(crate) fn height<V>(node: Option<&Node<V>>) -> usize {
    node.map_or(0, |node| {
        1 + height(node.left.as_deref()).max(height(node.right.as_deref()))
    })
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Node")
            .field("key", &self.key)
            .field("value", &self.value())
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn leaf(key: i32) -> Box<Node<&'static str>> {
        Box::new(Node::new(GenericKey::from(key)))
    }

    #[rstest]
    fn test_new_node_is_a_balanced_leaf() {
        let node: Node<()> = Node::new(GenericKey::from(1));
        assert!(node.left().is_none());
        assert!(node.right().is_none());
        assert!(node.value().is_none());
        assert_eq!(node.balance_factor(), 0);
    }

    #[rstest]
    fn test_take_value_detaches_shared_value() {
        let mut node = Node::new(GenericKey::from(1));
        let shared = ReferenceCounter::new("payload");
        node.set_shared_value(ReferenceCounter::clone(&shared));
        assert_eq!(ReferenceCounter::strong_count(&shared), 2);

        let taken = node.take_value();
        assert!(node.value().is_none());
        drop(taken);
        assert_eq!(ReferenceCounter::strong_count(&shared), 1);
    }

    #[rstest]
    fn test_deep_copy_shares_values_but_not_nodes() {
        let mut root = leaf(2);
        root.left = Some(leaf(1));
        root.balance = -1;
        root.set_value("two");

        let mut copy = root.deep_copy();
        assert_eq!(copy.balance_factor(), -1);
        assert_eq!(copy.left().map(Node::key), Some(&GenericKey::from(1)));
        assert!(ReferenceCounter::ptr_eq(
            root.shared_value().unwrap(),
            copy.shared_value().unwrap()
        ));

        copy.left = None;
        assert!(root.left().is_some());
    }

    #[rstest]
    fn test_height_counts_levels() {
        let mut root = leaf(2);
        assert_eq!(height(Some(&*root)), 1);
        let mut left = leaf(1);
        left.left = Some(leaf(0));
        root.left = Some(left);
        assert_eq!(height(Some(&*root)), 3);
        assert_eq!(height::<()>(None), 0);
    }
}
