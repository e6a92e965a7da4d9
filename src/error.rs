//! Error types.
//!
//! None of the tree or map operations fail: an absent key is reported as
//! `None` or handled as a no-op, and an unknown key-type name falls back to
//! pointer semantics. The errors here cover the two places where a caller
//! asks a question that can have a negative answer:
//!
//! - [`KeyConversionError`]: extracting a typed value from a
//!   [`GenericKey`](crate::generic::GenericKey) that holds another variant.
//! - [`InvariantViolation`]: the result of
//!   [`AvlTree::validate`](crate::bst::AvlTree::validate).

use thiserror::Error;

use crate::generic::KeyType;

/// A [`GenericKey`](crate::generic::GenericKey) did not hold the requested
/// representation.
///
/// # Examples
///
/// ```rust
/// use cslib::error::KeyConversionError;
/// use cslib::generic::{GenericKey, KeyType};
///
/// let key = GenericKey::from("alpha");
/// let result = i32::try_from(&key);
/// assert_eq!(
///     result,
///     Err(KeyConversionError { expected: KeyType::Int, found: KeyType::Str })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected a key of type {expected}, found {found}")]
pub struct KeyConversionError {
    /// The representation the caller asked for.
    pub expected: KeyType,
    /// The representation the key actually holds.
    pub found: KeyType,
}

/// A structural invariant of an AVL tree that does not hold.
///
/// Every public tree operation restores all invariants before it returns, so
/// a violation indicates either a bug in the engine or a comparator that is
/// not a consistent total order (for example one swapped in with
/// [`AvlTree::set_compare_fn`](crate::bst::AvlTree::set_compare_fn) after
/// keys were inserted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A key in a left subtree does not compare less than its ancestor, or a
    /// key in a right subtree does not compare greater.
    #[error("key {key} is out of order relative to ancestor {ancestor}")]
    Unordered {
        /// The offending key, as produced by the tree's to-string function.
        key: String,
        /// The ancestor it was compared against.
        ancestor: String,
    },

    /// The stored balance factor differs from the measured height difference.
    #[error("node {key} stores balance factor {stored} but its subtrees differ by {actual}")]
    BalanceFactorMismatch {
        /// The node key.
        key: String,
        /// The balance factor stored in the node.
        stored: i8,
        /// Right height minus left height, measured.
        actual: isize,
    },

    /// The subtrees of a node differ in height by more than one.
    #[error("node {key} is out of balance: subtree heights differ by {difference}")]
    Imbalanced {
        /// The node key.
        key: String,
        /// Right height minus left height, measured.
        difference: isize,
    },

    /// The recorded element count differs from the number of reachable nodes.
    #[error("tree records {recorded} entries but {reachable} nodes are reachable")]
    CountMismatch {
        /// The count the tree records.
        recorded: usize,
        /// The number of nodes reachable from the root.
        reachable: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_key_conversion_error_display() {
        let error = KeyConversionError {
            expected: KeyType::Double,
            found: KeyType::Bool,
        };
        assert_eq!(
            error.to_string(),
            "expected a key of type double, found bool"
        );
    }

    #[rstest]
    fn test_count_mismatch_display() {
        let error = InvariantViolation::CountMismatch {
            recorded: 3,
            reachable: 2,
        };
        assert_eq!(
            error.to_string(),
            "tree records 3 entries but 2 nodes are reachable"
        );
    }
}
