//! # cslib
//!
//! A small teaching-style collections library built around a generic
//! self-balancing binary search tree.
//!
//! ## Overview
//!
//! - **Generic keys**: [`generic::GenericKey`] holds one of a closed set of
//!   primitive key representations, and the key-type registry resolves a
//!   type name such as `"int"` or `"string"` to the functions needed to
//!   compare, normalise, store and print keys of that type.
//! - **AVL tree**: [`bst::AvlTree`] stores unique keys with an optional
//!   shared value per node and keeps itself balanced with rotations.
//! - **Map**: [`map::Map`] is a string-keyed map layered directly on the tree.
//!
//! ## Feature Flags
//!
//! - `arc`: share node values through `Arc` instead of `Rc`
//! - `serde`: serialization support for keys, key types and maps
//! - `full`: enable every optional feature except `arc`
//!
//! ## Example
//!
//! ```rust
//! use cslib::prelude::*;
//!
//! let mut tree: AvlTree<&str> = AvlTree::new("int");
//! for key in [5, 3, 8] {
//!     tree.insert(key);
//! }
//! tree.insert(3).set_value("three");
//!
//! let keys: Vec<String> = tree.nodes(TraversalOrder::InOrder)
//!     .map(|node| tree.key_string(node))
//!     .collect();
//! assert_eq!(keys, vec!["3", "5", "8"]);
//! assert_eq!(tree.find(3).and_then(|node| node.value()), Some(&"three"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use cslib::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bst::*;
    pub use crate::error::*;
    pub use crate::generic::*;
    pub use crate::map::*;
}

pub mod bst;
pub mod error;
pub mod generic;
pub mod map;

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer used for values attached to tree nodes.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`, which allows
/// trees and maps of `Send + Sync` values to move between threads.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`.
#[cfg(feature = "arc")]
pub type ReferenceCounter<T> = std::sync::Arc<T>;

/// Reference-counted smart pointer used for values attached to tree nodes.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`, which allows
/// trees and maps of `Send + Sync` values to move between threads.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`.
#[cfg(not(feature = "arc"))]
pub type ReferenceCounter<T> = std::rc::Rc<T>;

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(bst::AvlTree<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(map::Map<String>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(bst::AvlTree<i32>: Send, Sync);
