//! Traversals and snapshot iterators.
//!
//! Every iterator here is materialised when it is created: the tree is walked
//! once, the visited nodes are collected, and iteration then only reads that
//! list. [`NodeIterator`] borrows the tree, so the borrow checker rules out
//! mutation while it is alive. [`Snapshot`] owns copies of the keys and
//! shared value handles, so the tree can be modified freely while a snapshot
//! is being consumed.

use std::vec;

use super::node::Node;
use super::tree::AvlTree;
use crate::ReferenceCounter;
use crate::generic::GenericKey;

/// The order in which a traversal visits nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Node, then left subtree, then right subtree.
    PreOrder,
    /// Left subtree, then node, then right subtree: ascending key order.
    #[default]
    InOrder,
    /// Left subtree, then right subtree, then node.
    PostOrder,
}

fn walk<'a, V, F>(node: Option<&'a Node<V>>, order: TraversalOrder, visitor: &mut F)
where
    F: FnMut(&'a Node<V>),
{
    let Some(node) = node else {
        return;
    };
    if order == TraversalOrder::PreOrder {
        visitor(node);
    }
    walk(node.left.as_deref(), order, visitor);
    if order == TraversalOrder::InOrder {
        visitor(node);
    }
    walk(node.right.as_deref(), order, visitor);
    if order == TraversalOrder::PostOrder {
        visitor(node);
    }
}

fn walk_mut<V, F>(node: Option<&mut Node<V>>, order: TraversalOrder, visitor: &mut F)
where
    F: FnMut(&mut Node<V>),
{
    let Some(node) = node else {
        return;
    };
    if order == TraversalOrder::PreOrder {
        visitor(node);
    }
    walk_mut(node.left.as_deref_mut(), order, visitor);
    if order == TraversalOrder::InOrder {
        visitor(node);
    }
    walk_mut(node.right.as_deref_mut(), order, visitor);
    if order == TraversalOrder::PostOrder {
        visitor(node);
    }
}

impl<V> AvlTree<V> {
    /// Calls `visitor` once for every node, in the given order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::{AvlTree, TraversalOrder};
    ///
    /// let mut tree: AvlTree<()> = AvlTree::new("int");
    /// for key in [2, 1, 3] {
    ///     tree.insert(key);
    /// }
    ///
    /// let mut visited = Vec::new();
    /// tree.traverse(TraversalOrder::PostOrder, |node| visited.push(tree.key_string(node)));
    /// assert_eq!(visited, ["1", "3", "2"]);
    /// ```
    pub fn traverse<F>(&self, order: TraversalOrder, mut visitor: F)
    where
        F: FnMut(&Node<V>),
    {
        walk(self.root.as_deref(), order, &mut visitor);
    }

    /// Calls `visitor` once for every node, in the given order, allowing the
    /// node values to be replaced or detached.
    ///
    /// Keys and links cannot be changed through the visitor.
    pub fn traverse_mut<F>(&mut self, order: TraversalOrder, mut visitor: F)
    where
        F: FnMut(&mut Node<V>),
    {
        walk_mut(self.root.as_deref_mut(), order, &mut visitor);
    }

    /// Returns an iterator over the nodes in the given order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::{AvlTree, TraversalOrder};
    ///
    /// let mut tree: AvlTree<()> = AvlTree::new("int");
    /// for key in 1..=3 {
    ///     tree.insert(key);
    /// }
    ///
    /// let mut nodes = tree.nodes(TraversalOrder::PreOrder);
    /// assert_eq!(nodes.len(), 3);
    /// assert_eq!(nodes.next().map(|node| tree.key_string(node)), Some("2".to_string()));
    /// ```
    #[must_use]
    pub fn nodes(&self, order: TraversalOrder) -> NodeIterator<'_, V> {
        let mut nodes = Vec::with_capacity(self.count);
        walk(self.root.as_deref(), order, &mut |node| nodes.push(node));
        NodeIterator {
            nodes,
            current_index: 0,
        }
    }

    /// Returns an iterator over the nodes in ascending key order.
    #[must_use]
    pub fn iter(&self) -> NodeIterator<'_, V> {
        self.nodes(TraversalOrder::InOrder)
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &GenericKey> {
        self.iter().map(Node::key)
    }

    /// Captures the keys and values of the tree in the given order.
    ///
    /// The snapshot shares the values with the tree but is otherwise
    /// detached from it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::{AvlTree, TraversalOrder};
    /// use cslib::generic::GenericKey;
    ///
    /// let mut tree = AvlTree::new("int");
    /// for key in 1..=4 {
    ///     tree.insert(key).set_value(key * 100);
    /// }
    ///
    /// let snapshot = tree.snapshot(TraversalOrder::InOrder);
    /// tree.clear();
    ///
    /// let keys: Vec<GenericKey> = snapshot.map(|entry| entry.key).collect();
    /// assert_eq!(keys.len(), 4);
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn snapshot(&self, order: TraversalOrder) -> Snapshot<V> {
        let mut entries = Vec::with_capacity(self.count);
        walk(self.root.as_deref(), order, &mut |node: &Node<V>| {
            entries.push(Entry {
                key: node.key.clone(),
                value: node.value.clone(),
            });
        });
        Snapshot {
            entries: entries.into_iter(),
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over the nodes of an [`AvlTree`] in a fixed order.
///
/// Created by [`AvlTree::nodes`] and [`AvlTree::iter`].
pub struct NodeIterator<'a, V> {
    nodes: Vec<&'a Node<V>>,
    current_index: usize,
}

impl<'a, V> Iterator for NodeIterator<'a, V> {
    type Item = &'a Node<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.current_index).copied()?;
        self.current_index += 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.nodes.len().saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<V> ExactSizeIterator for NodeIterator<'_, V> {
    fn len(&self) -> usize {
        self.nodes.len().saturating_sub(self.current_index)
    }
}

impl<'a, V> IntoIterator for &'a AvlTree<V> {
    type Item = &'a Node<V>;
    type IntoIter = NodeIterator<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One key and its value, detached from the tree.
#[derive(Debug)]
pub struct Entry<V> {
    /// The key.
    pub key: GenericKey,
    /// The value handle shared with the tree at snapshot time.
    pub value: Option<ReferenceCounter<V>>,
}

impl<V> Clone for Entry<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// An owning iterator over the entries an [`AvlTree`] held when
/// [`AvlTree::snapshot`] was called.
#[derive(Debug)]
pub struct Snapshot<V> {
    entries: vec::IntoIter<Entry<V>>,
}

impl<V> Iterator for Snapshot<V> {
    type Item = Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<V> ExactSizeIterator for Snapshot<V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tree_of(keys: &[i32]) -> AvlTree<i32> {
        let mut tree = AvlTree::new("int");
        for &key in keys {
            tree.insert(key).set_value(key);
        }
        tree
    }

    fn keys_in(tree: &AvlTree<i32>, order: TraversalOrder) -> Vec<i32> {
        tree.nodes(order)
            .map(|node| i32::try_from(node.key()).unwrap())
            .collect()
    }

    #[rstest]
    #[case(TraversalOrder::PreOrder, vec![4, 2, 1, 3, 6, 5, 7])]
    #[case(TraversalOrder::InOrder, vec![1, 2, 3, 4, 5, 6, 7])]
    #[case(TraversalOrder::PostOrder, vec![1, 3, 2, 5, 7, 6, 4])]
    fn test_orders_on_perfect_tree(#[case] order: TraversalOrder, #[case] expected: Vec<i32>) {
        let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        assert_eq!(keys_in(&tree, order), expected);
    }

    #[rstest]
    fn test_default_order_is_in_order() {
        assert_eq!(TraversalOrder::default(), TraversalOrder::InOrder);
    }

    #[rstest]
    fn test_iterator_reports_exhaustion_and_length() {
        let tree = tree_of(&[1, 2]);
        let mut iterator = tree.iter();
        assert_eq!(iterator.len(), 2);
        iterator.next();
        iterator.next();
        assert_eq!(iterator.len(), 0);
        assert!(iterator.next().is_none());
        assert!(iterator.next().is_none());
    }

    #[rstest]
    fn test_empty_tree_yields_nothing() {
        let tree: AvlTree<i32> = AvlTree::new("int");
        assert_eq!(tree.iter().count(), 0);
        assert_eq!(tree.snapshot(TraversalOrder::PreOrder).len(), 0);
    }

    #[rstest]
    fn test_snapshot_survives_mutation() {
        let mut tree = tree_of(&[10, 20, 30]);
        let snapshot = tree.snapshot(TraversalOrder::InOrder);
        tree.remove(20);
        tree.insert(25);

        let seen: Vec<(GenericKey, Option<i32>)> = snapshot
            .map(|entry| (entry.key, entry.value.map(|value| *value)))
            .collect();
        assert_eq!(
            seen,
            vec![
                (GenericKey::Int(10), Some(10)),
                (GenericKey::Int(20), Some(20)),
                (GenericKey::Int(30), Some(30)),
            ]
        );
    }

    #[rstest]
    fn test_traverse_mut_replaces_values() {
        let mut tree = tree_of(&[1, 2, 3]);
        tree.traverse_mut(TraversalOrder::PreOrder, |node| {
            let doubled = node.value().map_or(0, |value| value * 2);
            node.set_value(doubled);
        });
        let values: Vec<i32> = tree.iter().filter_map(Node::value).copied().collect();
        assert_eq!(values, vec![2, 4, 6]);
    }

    #[rstest]
    fn test_into_iterator_for_reference() {
        let tree = tree_of(&[3, 1, 2]);
        let mut total = 0;
        for node in &tree {
            total += node.value().copied().unwrap_or_default();
        }
        assert_eq!(total, 6);
    }
}
