//! Self-balancing binary search tree over polymorphic keys.
//!
//! [`AvlTree`] stores unique [`GenericKey`](crate::generic::GenericKey)s
//! ordered by the comparison function of the key type chosen at
//! construction. Each [`Node`] can carry one shared value.
//!
//! # Rotation tracing
//!
//! Every rotation is emitted as a `tracing` event at trace level with target
//! `cslib::bst`. A tree can additionally be given its own [`RotationSink`],
//! which receives each [`RotationEvent`] synchronously:
//!
//! ```rust
//! use cslib::bst::{AvlTree, WriterSink};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct SharedLog(Arc<Mutex<Vec<u8>>>);
//!
//! impl std::io::Write for SharedLog {
//!     fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
//!         self.0.lock().unwrap().extend_from_slice(bytes);
//!         Ok(bytes.len())
//!     }
//!
//!     fn flush(&mut self) -> std::io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let log = SharedLog::default();
//! let mut tree: AvlTree<()> = AvlTree::with_sink("int", WriterSink::new(log.clone()));
//! for key in [3, 2, 1] {
//!     tree.insert(key);
//! }
//!
//! let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
//! assert_eq!(text, "rotateRight around 3\n");
//! ```

mod iter;
mod node;
mod rotation;
mod tree;
mod validate;

pub use iter::{Entry, NodeIterator, Snapshot, TraversalOrder};
pub use node::Node;
pub use rotation::{
    RotationDirection, RotationEvent, RotationSink, SinkBound, TracingSink, WriterSink,
};
pub use tree::AvlTree;
