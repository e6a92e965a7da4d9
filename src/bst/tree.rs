//! The AVL tree engine.
//!
//! The tree keeps a balance factor in every node and repairs it on the way
//! back up from each insertion or removal. The recursive helpers report how
//! the height of the subtree they worked on changed:
//!
//! - insertion returns `true` when the subtree grew by one level,
//! - removal returns `true` when the subtree shrank by one level.
//!
//! A parent uses that answer to update its own factor, and rotates when the
//! factor reaches `±2`.

use std::cmp::Ordering;
use std::fmt;

use super::node::{Link, Node, copy_link, height};
use super::rotation::{
    BoxedSink, RotationDirection, RotationEvent, RotationSink, SinkBound, rotate_left, rotate_right,
};
use crate::generic::{CompareFn, GenericKey, KeyDescriptor, KeyType, lookup};

// =============================================================================
// Tree Configuration
// =============================================================================

/// Per-tree key handling and tracing, shared by every engine routine.
///
/// The engine functions are methods of this type rather than of the tree so
/// that they can borrow the configuration and the node graph independently.
pub(crate) struct TreeConfig {
    pub(crate) base_type: String,
    pub(crate) descriptor: KeyDescriptor,
    sink: Option<BoxedSink>,
}

impl TreeConfig {
    fn new(base_type: &str, descriptor: KeyDescriptor) -> Self {
        Self {
            base_type: base_type.to_owned(),
            descriptor,
            sink: None,
        }
    }

    pub(crate) fn key_string(&self, key: &GenericKey) -> String {
        (self.descriptor.to_string)(key)
    }

    // =========================================================================
    // Rotation with tracing
    // =========================================================================

    fn rotate<V>(&mut self, slot: &mut Box<Node<V>>, direction: RotationDirection) {
        if self.sink.is_some() || tracing::enabled!(target: "cslib::bst", tracing::Level::TRACE) {
            let event = RotationEvent {
                direction,
                pivot: self.key_string(&slot.key),
            };
            tracing::trace!(
                target: "cslib::bst",
                direction = %event.direction,
                pivot = %event.pivot,
                "rotation"
            );
            if let Some(sink) = self.sink.as_mut() {
                sink.record(&event);
            }
        }
        match direction {
            RotationDirection::Left => rotate_left(slot),
            RotationDirection::Right => rotate_right(slot),
        }
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Inserts `key` below `slot` unless it is already present.
    ///
    /// Returns `true` when the height of the subtree increased.
    fn insert_into<V>(&mut self, slot: &mut Link<V>, key: GenericKey, count: &mut usize) -> bool {
        let Some(node) = slot.as_mut() else {
            *slot = Some(Box::new(Node::new(key)));
            *count += 1;
            return true;
        };

        match (self.descriptor.compare)(&key, &node.key) {
            Ordering::Equal => false,
            Ordering::Less => {
                if !self.insert_into(&mut node.left, key, count) {
                    return false;
                }
                match node.balance {
                    1 => {
                        node.balance = 0;
                        false
                    }
                    0 => {
                        node.balance = -1;
                        true
                    }
                    _ => {
                        self.fix_left_imbalance(node);
                        false
                    }
                }
            }
            Ordering::Greater => {
                if !self.insert_into(&mut node.right, key, count) {
                    return false;
                }
                match node.balance {
                    -1 => {
                        node.balance = 0;
                        false
                    }
                    0 => {
                        node.balance = 1;
                        true
                    }
                    _ => {
                        self.fix_right_imbalance(node);
                        false
                    }
                }
            }
        }
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes `key` from below `slot` if present.
    ///
    /// Returns `true` when the height of the subtree decreased.
    fn remove_from<V>(&mut self, slot: &mut Link<V>, key: &GenericKey, count: &mut usize) -> bool {
        let ordering = match slot.as_deref() {
            None => return false,
            Some(node) => (self.descriptor.compare)(key, &node.key),
        };
        if ordering == Ordering::Equal {
            return self.remove_target(slot, count);
        }

        let Some(node) = slot.as_mut() else {
            return false;
        };
        let delta = if ordering == Ordering::Less {
            i8::from(self.remove_from(&mut node.left, key, count))
        } else {
            -i8::from(self.remove_from(&mut node.right, key, count))
        };
        if delta == 0 {
            return false;
        }

        self.adjust_balance(node, delta);
        // After a rotation `node` is the new subtree root; a zero factor there
        // means the subtree lost a level either way.
        node.balance == 0
    }

    /// Removes the node held in `slot`.
    ///
    /// Returns `true` when the height of the subtree decreased.
    fn remove_target<V>(&mut self, slot: &mut Link<V>, count: &mut usize) -> bool {
        let Some(node) = slot.as_mut() else {
            return false;
        };

        if node.left.is_none() || node.right.is_none() {
            let child = match node.left.take() {
                Some(left) => Some(left),
                None => node.right.take(),
            };
            *slot = child;
            *count -= 1;
            return true;
        }

        // Two children: the in-order predecessor takes the node's place and is
        // then removed from the left subtree, where it has no right child.
        let Some(left) = node.left.as_deref() else {
            return false;
        };
        let predecessor = rightmost(left);
        let (key, value) = (predecessor.key.clone(), predecessor.value.clone());
        node.key = key.clone();
        node.value = value;

        if self.remove_from(&mut node.left, &key, count) {
            self.adjust_balance(node, 1);
            node.balance == 0
        } else {
            false
        }
    }

    /// Adds `delta` to the balance factor of `slot` and rotates if the node
    /// is now out of balance.
    fn adjust_balance<V>(&mut self, slot: &mut Box<Node<V>>, delta: i8) {
        slot.balance += delta;
        if slot.balance < -1 {
            self.fix_left_imbalance(slot);
        } else if slot.balance > 1 {
            self.fix_right_imbalance(slot);
        }
    }

    // =========================================================================
    // Rebalancing
    // =========================================================================

    /// Repairs a node whose left subtree is two levels taller than its right.
    fn fix_left_imbalance<V>(&mut self, slot: &mut Box<Node<V>>) {
        let child_balance = slot.left.as_ref().map_or(0, |child| child.balance);
        match child_balance {
            1 => {
                let grandchild_balance = slot
                    .left
                    .as_ref()
                    .and_then(|child| child.right.as_ref())
                    .map_or(0, |grandchild| grandchild.balance);
                if let Some(child) = slot.left.as_mut() {
                    self.rotate(child, RotationDirection::Left);
                }
                self.rotate(slot, RotationDirection::Right);
                slot.balance = 0;
                let (left, right) = double_rotation_factors(grandchild_balance);
                set_balance(&mut slot.left, left);
                set_balance(&mut slot.right, right);
            }
            0 => {
                self.rotate(slot, RotationDirection::Right);
                slot.balance = 1;
                set_balance(&mut slot.right, -1);
            }
            _ => {
                self.rotate(slot, RotationDirection::Right);
                slot.balance = 0;
                set_balance(&mut slot.right, 0);
            }
        }
    }

    /// Repairs a node whose right subtree is two levels taller than its left.
    fn fix_right_imbalance<V>(&mut self, slot: &mut Box<Node<V>>) {
        let child_balance = slot.right.as_ref().map_or(0, |child| child.balance);
        match child_balance {
            -1 => {
                let grandchild_balance = slot
                    .right
                    .as_ref()
                    .and_then(|child| child.left.as_ref())
                    .map_or(0, |grandchild| grandchild.balance);
                if let Some(child) = slot.right.as_mut() {
                    self.rotate(child, RotationDirection::Right);
                }
                self.rotate(slot, RotationDirection::Left);
                slot.balance = 0;
                let (left, right) = double_rotation_factors(grandchild_balance);
                set_balance(&mut slot.left, left);
                set_balance(&mut slot.right, right);
            }
            0 => {
                self.rotate(slot, RotationDirection::Left);
                slot.balance = -1;
                set_balance(&mut slot.left, 1);
            }
            _ => {
                self.rotate(slot, RotationDirection::Left);
                slot.balance = 0;
                set_balance(&mut slot.left, 0);
            }
        }
    }
}

/// Balance factors of the left and right children of the new subtree root
/// after a double rotation, given the old factor of that root.
const fn double_rotation_factors(old_balance: i8) -> (i8, i8) {
    match old_balance {
        -1 => (0, 1),
        0 => (0, 0),
        _ => (-1, 0),
    }
}

fn set_balance<V>(link: &mut Link<V>, balance: i8) {
    if let Some(node) = link.as_mut() {
        node.balance = balance;
    }
}

fn rightmost<V>(mut node: &Node<V>) -> &Node<V> {
    while let Some(right) = node.right.as_deref() {
        node = right;
    }
    node
}

fn find_in<'a, V>(
    node: Option<&'a Node<V>>,
    key: &GenericKey,
    compare: CompareFn,
) -> Option<&'a Node<V>> {
    node.and_then(|node| match compare(key, &node.key) {
        Ordering::Less => find_in(node.left.as_deref(), key, compare),
        Ordering::Greater => find_in(node.right.as_deref(), key, compare),
        Ordering::Equal => Some(node),
    })
}

fn find_in_mut<'a, V>(
    mut current: Option<&'a mut Node<V>>,
    key: &GenericKey,
    compare: CompareFn,
) -> Option<&'a mut Node<V>> {
    while let Some(node) = current {
        match compare(key, &node.key) {
            Ordering::Less => current = node.left.as_deref_mut(),
            Ordering::Greater => current = node.right.as_deref_mut(),
            Ordering::Equal => return Some(node),
        }
    }
    None
}

// =============================================================================
// AvlTree Definition
// =============================================================================

/// A self-balancing binary search tree of unique [`GenericKey`]s, each node
/// optionally carrying a shared value of type `V`.
///
/// The key type is chosen by name at construction (see
/// [`KeyType::from_name`]); keys passed to later operations are normalised to
/// that type first, so `tree.insert(5)` on a `"long"` tree stores
/// `GenericKey::Long(5)`.
///
/// Inserting a key that is already present returns the existing node and
/// leaves its value alone; assign values explicitly through the returned
/// node. Looking up or removing an absent key is not an error.
///
/// # Time Complexity
///
/// | Operation         | Complexity |
/// |-------------------|------------|
/// | `find`            | O(log N)   |
/// | `insert`          | O(log N)   |
/// | `remove`          | O(log N)   |
/// | `clear`           | O(N)       |
/// | `clone`           | O(N)       |
/// | `traverse`        | O(N)       |
/// | `len`/`is_empty`  | O(1)       |
///
/// # Examples
///
/// ```rust
/// use cslib::bst::{AvlTree, TraversalOrder};
///
/// let mut tree: AvlTree<String> = AvlTree::new("int");
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     tree.insert(key).set_value(format!("#{key}"));
/// }
///
/// assert_eq!(tree.len(), 7);
/// assert_eq!(tree.find(4).and_then(|node| node.value()), Some(&"#4".to_string()));
///
/// tree.remove(5);
/// let keys: Vec<String> = tree
///     .nodes(TraversalOrder::InOrder)
///     .map(|node| tree.key_string(node))
///     .collect();
/// assert_eq!(keys, ["1", "3", "4", "7", "8", "9"]);
/// ```
pub struct AvlTree<V> {
    pub(crate) config: TreeConfig,
    pub(crate) root: Link<V>,
    pub(crate) count: usize,
}

impl<V> AvlTree<V> {
    /// Creates an empty tree for keys of the named type.
    ///
    /// Unknown type names are accepted and treated as pointer keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::AvlTree;
    /// use cslib::generic::KeyType;
    ///
    /// let tree: AvlTree<()> = AvlTree::new("EventCategory");
    /// assert_eq!(tree.base_type(), "EventCategory");
    /// assert_eq!(tree.key_type(), KeyType::Pointer);
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        Self::with_descriptor(type_name, lookup(type_name))
    }

    /// Creates an empty tree with an explicit key descriptor.
    ///
    /// `type_name` is only recorded; the descriptor decides key handling.
    #[must_use]
    pub fn with_descriptor(type_name: &str, descriptor: KeyDescriptor) -> Self {
        Self {
            config: TreeConfig::new(type_name, descriptor),
            root: None,
            count: 0,
        }
    }

    /// Creates an empty tree that reports every rotation to `sink`.
    #[must_use]
    pub fn with_sink<S>(type_name: &str, sink: S) -> Self
    where
        S: RotationSink + SinkBound + 'static,
    {
        let mut tree = Self::new(type_name);
        tree.set_sink(sink);
        tree
    }

    /// Reports every later rotation to `sink`, replacing any previous sink.
    pub fn set_sink<S>(&mut self, sink: S)
    where
        S: RotationSink + SinkBound + 'static,
    {
        self.config.sink = Some(Box::new(sink));
    }

    /// Stops reporting rotations.
    pub fn remove_sink(&mut self) {
        self.config.sink = None;
    }

    /// Returns the key type name the tree was created with.
    #[inline]
    #[must_use]
    pub fn base_type(&self) -> &str {
        &self.config.base_type
    }

    /// Returns the byte size of the key representation.
    #[inline]
    #[must_use]
    pub const fn base_type_size(&self) -> usize {
        self.config.descriptor.size
    }

    /// Returns the resolved key type.
    #[inline]
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        self.config.descriptor.key_type
    }

    /// Returns the key descriptor in use.
    #[inline]
    #[must_use]
    pub const fn descriptor(&self) -> &KeyDescriptor {
        &self.config.descriptor
    }

    /// Returns the key comparison function.
    #[inline]
    #[must_use]
    pub const fn compare_fn(&self) -> CompareFn {
        self.config.descriptor.compare
    }

    /// Replaces the key comparison function.
    ///
    /// The standard key types never need this. It is meant for pointer keys
    /// that should be ordered by the records they point to, and must be
    /// called while the tree is still empty: keys already stored are not
    /// reordered.
    pub fn set_compare_fn(&mut self, compare: CompareFn) {
        self.config.descriptor.compare = compare;
    }

    /// Returns the number of keys in the tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the tree holds no keys.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&Node<V>> {
        self.root.as_deref()
    }

    /// Returns the number of levels in the tree; 0 when empty.
    #[must_use]
    pub fn height(&self) -> usize {
        height(self.root.as_deref())
    }

    /// Returns the textual form of the key of `node`.
    #[must_use]
    pub fn key_string(&self, node: &Node<V>) -> String {
        self.config.key_string(&node.key)
    }

    /// Converts `key` to the tree's key representation, exactly as every
    /// operation does before using a key.
    #[must_use]
    pub fn normalize_key<K: Into<GenericKey>>(&self, key: K) -> GenericKey {
        (self.config.descriptor.fetch)(key.into())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Finds the node holding `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::AvlTree;
    ///
    /// let mut tree: AvlTree<()> = AvlTree::new("string");
    /// tree.insert("delta");
    /// assert!(tree.find("delta").is_some());
    /// assert!(tree.find("gamma").is_none());
    /// ```
    #[must_use]
    pub fn find<K: Into<GenericKey>>(&self, key: K) -> Option<&Node<V>> {
        self.find_from_arg(key.into())
    }

    /// Same as [`find`](Self::find), taking an already packaged key.
    #[must_use]
    pub fn find_from_arg(&self, any: GenericKey) -> Option<&Node<V>> {
        let key = (self.config.descriptor.fetch)(any);
        find_in(self.root.as_deref(), &key, self.config.descriptor.compare)
    }

    /// Finds the node holding `key` for updating its value.
    pub fn find_mut<K: Into<GenericKey>>(&mut self, key: K) -> Option<&mut Node<V>> {
        self.find_mut_from_arg(key.into())
    }

    /// Same as [`find_mut`](Self::find_mut), taking an already packaged key.
    pub fn find_mut_from_arg(&mut self, any: GenericKey) -> Option<&mut Node<V>> {
        let key = (self.config.descriptor.fetch)(any);
        let compare = self.config.descriptor.compare;
        find_in_mut(self.root.as_deref_mut(), &key, compare)
    }

    /// Returns `true` if the tree holds `key`.
    #[must_use]
    pub fn contains_key<K: Into<GenericKey>>(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    // =========================================================================
    // Insertion and Removal
    // =========================================================================

    /// Inserts `key` if absent and returns its node.
    ///
    /// An existing node is returned unchanged, value included.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::AvlTree;
    ///
    /// let mut tree = AvlTree::new("int");
    /// tree.insert(7).set_value("first");
    ///
    /// let node = tree.insert(7);
    /// assert_eq!(node.value(), Some(&"first"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert<K: Into<GenericKey>>(&mut self, key: K) -> &mut Node<V> {
        self.insert_from_arg(key.into())
    }

    /// Same as [`insert`](Self::insert), taking an already packaged key.
    pub fn insert_from_arg(&mut self, any: GenericKey) -> &mut Node<V> {
        let key = (self.config.descriptor.fetch)(any);
        self.config.insert_into(&mut self.root, key.clone(), &mut self.count);
        let compare = self.config.descriptor.compare;
        let Some(node) = find_in_mut(self.root.as_deref_mut(), &key, compare) else {
            unreachable!("a key is reachable right after it is inserted");
        };
        node
    }

    /// Removes `key` if present.
    ///
    /// Returns `true` if a node was removed. The value of the removed node is
    /// released by the tree but not otherwise touched.
    pub fn remove<K: Into<GenericKey>>(&mut self, key: K) -> bool {
        self.remove_from_arg(key.into())
    }

    /// Same as [`remove`](Self::remove), taking an already packaged key.
    pub fn remove_from_arg(&mut self, any: GenericKey) -> bool {
        let key = (self.config.descriptor.fetch)(any);
        let before = self.count;
        self.config.remove_from(&mut self.root, &key, &mut self.count);
        self.count < before
    }

    /// Removes every node, leaving an empty tree.
    pub fn clear(&mut self) {
        tracing::debug!(target: "cslib::bst", released = self.count, "clearing tree");
        free_subtree(self.root.take());
        self.count = 0;
    }
}

/// Releases a subtree children first.
fn free_subtree<V>(link: Link<V>) {
    if let Some(mut node) = link {
        free_subtree(node.left.take());
        free_subtree(node.right.take());
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<V> Clone for AvlTree<V> {
    /// Copies the node structure of the tree.
    ///
    /// Keys are copied and values shared. The copy has no rotation sink.
    fn clone(&self) -> Self {
        tracing::debug!(target: "cslib::bst", entries = self.count, "cloning tree");
        Self {
            config: TreeConfig::new(&self.config.base_type, self.config.descriptor),
            root: copy_link(self.root.as_deref()),
            count: self.count,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for AvlTree<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_map()
            .entries(self.iter().map(|node| (node.key(), node.value())))
            .finish()
    }
}

impl<V> fmt::Display for AvlTree<V> {
    /// Writes the keys in order, e.g. `{1, 3, 4}`.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for node in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{}", self.key_string(node))?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bst::TraversalOrder;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::{Arc, Mutex};

    fn int_tree(keys: &[i32]) -> AvlTree<i32> {
        let mut tree = AvlTree::new("int");
        for &key in keys {
            tree.insert(key).set_value(key * 10);
        }
        tree
    }

    fn in_order(tree: &AvlTree<i32>) -> Vec<i32> {
        tree.keys().map(|key| i32::try_from(key).unwrap()).collect()
    }

    fn factors(tree: &AvlTree<i32>) -> Vec<i8> {
        tree.nodes(TraversalOrder::PreOrder)
            .map(Node::balance_factor)
            .collect()
    }

    fn root_key(tree: &AvlTree<i32>) -> Option<String> {
        tree.root().map(|node| tree.key_string(node))
    }

    // =========================================================================
    // Insert rebalancing cases
    // =========================================================================

    #[rstest]
    fn test_left_left_case_rotates_right() {
        let tree = int_tree(&[3, 2, 1]);
        assert_eq!(root_key(&tree), Some("2".into()));
        assert_eq!(factors(&tree), vec![0, 0, 0]);
    }

    #[rstest]
    fn test_left_right_case_double_rotates() {
        let tree = int_tree(&[3, 1, 2]);
        assert_eq!(root_key(&tree), Some("2".into()));
        assert_eq!(factors(&tree), vec![0, 0, 0]);
    }

    #[rstest]
    fn test_right_left_case_double_rotates() {
        let tree = int_tree(&[1, 3, 2]);
        assert_eq!(root_key(&tree), Some("2".into()));
        assert!(tree.validate().is_ok());
    }

    #[rstest]
    #[case(&[50, 20, 80, 10, 30, 25])] // grandchild leans left
    #[case(&[50, 20, 80, 10, 30, 35])] // grandchild leans right
    #[case(&[50, 20, 80, 10, 60, 90, 70])]
    #[case(&[50, 20, 80, 60, 90, 55])]
    #[case(&[50, 20, 80, 60, 90, 65])]
    fn test_double_rotation_factor_cases(#[case] keys: &[i32]) {
        let tree = int_tree(keys);
        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(tree.len(), keys.len());
    }

    #[rstest]
    fn test_insert_existing_key_keeps_value_and_count() {
        let mut tree = int_tree(&[1, 2, 3]);
        let node = tree.insert(2);
        assert_eq!(node.value(), Some(&20));
        assert_eq!(tree.len(), 3);
    }

    // =========================================================================
    // Removal rebalancing cases
    // =========================================================================

    #[rstest]
    fn test_remove_leaf_with_rotation_where_sibling_is_balanced() {
        // Removing 1 leaves 2 with a right child whose factor is 0.
        let mut tree = int_tree(&[2, 1, 4, 3, 5]);
        assert!(tree.remove(1));
        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(in_order(&tree), vec![2, 3, 4, 5]);
        assert_eq!(tree.root().map(Node::balance_factor), Some(-1));
    }

    #[rstest]
    fn test_remove_propagates_height_change_through_double_rotation() {
        let mut tree = int_tree(&[8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15, 16]);
        for key in [9, 11, 10, 13] {
            assert!(tree.remove(key));
            assert_eq!(tree.validate(), Ok(()));
        }
        assert_eq!(tree.len(), 12);
    }

    #[rstest]
    fn test_remove_two_child_node_moves_predecessor_value() {
        let mut tree = int_tree(&[10, 20, 30, 40, 50]);
        assert!(tree.remove(20));
        assert_eq!(in_order(&tree), vec![10, 30, 40, 50]);
        assert_eq!(tree.find(10).and_then(Node::value), Some(&100));
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_remove_absent_key_is_a_no_op() {
        let mut tree = int_tree(&[1, 2, 3]);
        assert!(!tree.remove(9));
        assert_eq!(tree.len(), 3);
        let mut empty: AvlTree<i32> = AvlTree::new("int");
        assert!(!empty.remove(1));
    }

    // =========================================================================
    // Key handling
    // =========================================================================

    #[rstest]
    fn test_native_and_packaged_keys_reach_the_same_node() {
        let mut tree: AvlTree<i32> = AvlTree::new("long");
        tree.insert(5).set_value(1);
        tree.insert_from_arg(GenericKey::Long(5)).set_value(2);
        assert_eq!(tree.len(), 1);
        let node = tree.find_from_arg(GenericKey::Int(5));
        assert_eq!(node.and_then(Node::value), Some(&2));
        assert_eq!(tree.root().map(Node::key), Some(&GenericKey::Long(5)));
    }

    #[rstest]
    fn test_custom_compare_fn_reverses_order() {
        fn descending(left: &GenericKey, right: &GenericKey) -> Ordering {
            right.cmp(left)
        }
        let mut tree: AvlTree<i32> = AvlTree::new("int");
        tree.set_compare_fn(descending);
        for key in [2, 3, 1] {
            tree.insert(key);
        }
        assert_eq!(in_order(&tree), vec![3, 2, 1]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_sink_receives_rotations_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&events);
        let mut tree: AvlTree<()> = AvlTree::with_sink("int", move |event: &RotationEvent| {
            recorder.lock().unwrap().push(event.clone());
        });
        for key in [30, 10, 20] {
            tree.insert(key);
        }
        let events = events.lock().unwrap();
        assert_eq!(
            events.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["rotateLeft around 10", "rotateRight around 30"]
        );
    }

    #[rstest]
    fn test_each_rotation_formats_its_pivot_once() {
        static FORMATTED: AtomicUsize = AtomicUsize::new(0);
        fn counting_to_string(key: &GenericKey) -> String {
            FORMATTED.fetch_add(1, AtomicOrdering::Relaxed);
            (lookup("long").to_string)(key)
        }

        let descriptor = KeyDescriptor {
            to_string: counting_to_string,
            ..lookup("long")
        };
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&events);
        let mut tree: AvlTree<()> = AvlTree::with_descriptor("long", descriptor);
        tree.set_sink(move |event: &RotationEvent| {
            recorder.lock().unwrap().push(event.to_string());
        });
        for key in [30, 10, 20] {
            tree.insert(key);
        }

        assert_eq!(
            *events.lock().unwrap(),
            vec!["rotateLeft around 10L", "rotateRight around 30L"]
        );
        assert_eq!(FORMATTED.load(AtomicOrdering::Relaxed), 2);
    }

    #[cfg(not(feature = "arc"))]
    #[rstest]
    fn test_single_threaded_sink_needs_no_locking() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let pivots = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&pivots);
        let mut tree: AvlTree<()> = AvlTree::with_sink("int", move |event: &RotationEvent| {
            recorder.borrow_mut().push(event.pivot.clone());
        });
        for key in 1..=7 {
            tree.insert(key);
        }
        assert_eq!(*pivots.borrow(), vec!["1", "3", "2", "5"]);
    }

    #[rstest]
    fn test_clone_does_not_carry_the_sink() {
        let events = Arc::new(Mutex::new(0_usize));
        let counter = Arc::clone(&events);
        let mut tree: AvlTree<()> = AvlTree::with_sink("int", move |_: &RotationEvent| {
            *counter.lock().unwrap() += 1;
        });
        tree.insert(1);
        let mut copy = tree.clone();
        for key in 2..=10 {
            copy.insert(key);
        }
        assert_eq!(*events.lock().unwrap(), 0);
    }

    #[rstest]
    fn test_clear_resets_root_and_count() {
        let mut tree = int_tree(&[4, 2, 6]);
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        tree.insert(1);
        assert_eq!(tree.len(), 1);
    }

    #[rstest]
    fn test_display_lists_keys_in_order() {
        let tree = int_tree(&[3, 1, 2]);
        assert_eq!(tree.to_string(), "{1, 2, 3}");
        let empty: AvlTree<i32> = AvlTree::new("int");
        assert_eq!(empty.to_string(), "{}");
    }
}
