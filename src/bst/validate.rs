//! Structural self-checks.

use std::cmp::Ordering;

use super::node::Node;
use super::tree::{AvlTree, TreeConfig};
use crate::error::InvariantViolation;
use crate::generic::GenericKey;

struct Bounds<'a> {
    lower: Option<&'a GenericKey>,
    upper: Option<&'a GenericKey>,
}

impl<V> AvlTree<V> {
    /// Checks every structural invariant of the tree.
    ///
    /// - Keys are strictly ordered by the tree's comparison function.
    /// - Every stored balance factor equals the measured height difference.
    /// - No two sibling subtrees differ in height by more than one.
    /// - The recorded count equals the number of reachable nodes.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cslib::bst::AvlTree;
    ///
    /// let mut tree: AvlTree<()> = AvlTree::new("double");
    /// for key in [0.5, -1.0, 2.25, 8.0, 3.5] {
    ///     tree.insert(key);
    /// }
    /// assert!(tree.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut reachable = 0;
        check_subtree(
            &self.config,
            self.root.as_deref(),
            &Bounds {
                lower: None,
                upper: None,
            },
            &mut reachable,
        )?;
        if reachable != self.count {
            return Err(InvariantViolation::CountMismatch {
                recorded: self.count,
                reachable,
            });
        }
        Ok(())
    }
}

/// Checks the subtree at `node` and returns its height.
fn check_subtree<V>(
    config: &TreeConfig,
    node: Option<&Node<V>>,
    bounds: &Bounds<'_>,
    reachable: &mut usize,
) -> Result<isize, InvariantViolation> {
    let Some(node) = node else {
        return Ok(0);
    };
    *reachable += 1;

    let compare = config.descriptor.compare;
    for (bound, required) in [
        (bounds.lower, Ordering::Greater),
        (bounds.upper, Ordering::Less),
    ] {
        if let Some(ancestor) = bound
            && compare(&node.key, ancestor) != required
        {
            return Err(InvariantViolation::Unordered {
                key: config.key_string(&node.key),
                ancestor: config.key_string(ancestor),
            });
        }
    }

    let left = check_subtree(
        config,
        node.left.as_deref(),
        &Bounds {
            lower: bounds.lower,
            upper: Some(&node.key),
        },
        reachable,
    )?;
    let right = check_subtree(
        config,
        node.right.as_deref(),
        &Bounds {
            lower: Some(&node.key),
            upper: bounds.upper,
        },
        reachable,
    )?;

    let difference = right - left;
    if difference.abs() > 1 {
        return Err(InvariantViolation::Imbalanced {
            key: config.key_string(&node.key),
            difference,
        });
    }
    if isize::from(node.balance) != difference {
        return Err(InvariantViolation::BalanceFactorMismatch {
            key: config.key_string(&node.key),
            stored: node.balance,
            actual: difference,
        });
    }
    Ok(1 + left.max(right))
}
